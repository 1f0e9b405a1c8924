// CaseSleuth - ui/panels/split.rs
//
// Vertical split hosting the discovery results (top) and details (bottom).
//
// egui is immediate mode, so the split holds no widgets: it stores the last
// laid-out height and the divider position, and the discovery panel reads
// them back every frame.

use crate::app::auxiliary::SplitContainer;
use crate::util::error::CollaboratorError;
use std::cell::Cell;

#[derive(Debug)]
pub struct EguiSplit {
    extent: Cell<i32>,
    divider: Cell<i32>,
}

impl EguiSplit {
    /// A split whose details area starts fully hidden.
    pub fn new(extent: i32) -> Self {
        let extent = extent.max(0);
        Self {
            extent: Cell::new(extent),
            divider: Cell::new(extent),
        }
    }

    /// Record the height available this frame. A divider sitting at the old
    /// bottom edge follows the new one so a hidden details area stays hidden
    /// across window resizes.
    pub fn set_extent(&self, extent: i32) {
        let extent = extent.max(0);
        let old = self.extent.replace(extent);
        let divider = self.divider.get();
        if divider >= old || divider > extent {
            self.divider.set(extent);
        }
    }

    /// Height of the details area implied by the divider.
    pub fn details_height(&self) -> i32 {
        (self.extent.get() - self.divider.get()).max(0)
    }
}

impl SplitContainer for EguiSplit {
    fn extent(&self) -> i32 {
        self.extent.get()
    }

    fn divider_location(&self) -> i32 {
        self.divider.get()
    }

    fn set_divider_location(&self, position: i32) -> Result<(), CollaboratorError> {
        if position < 0 {
            return Err(CollaboratorError::new(
                "egui_split",
                format!("divider position {position} is negative"),
            ));
        }
        self.divider.set(position.min(self.extent.get()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_divider_follows_resize() {
        let split = EguiSplit::new(400);
        split.set_extent(600);
        assert_eq!(split.divider_location(), 600);
        assert_eq!(split.details_height(), 0);
    }

    #[test]
    fn test_open_divider_keeps_position_on_grow() {
        let split = EguiSplit::new(400);
        split.set_divider_location(250).unwrap();
        split.set_extent(600);
        assert_eq!(split.divider_location(), 250);
        assert_eq!(split.details_height(), 350);
    }

    #[test]
    fn test_shrink_clamps_divider() {
        let split = EguiSplit::new(400);
        split.set_divider_location(350).unwrap();
        split.set_extent(300);
        assert_eq!(split.divider_location(), 300);
    }

    #[test]
    fn test_negative_position_is_rejected() {
        let split = EguiSplit::new(400);
        assert!(split.set_divider_location(-1).is_err());
        assert_eq!(split.divider_location(), 400);
    }
}
