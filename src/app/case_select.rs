// CaseSleuth - app/case_select.rs
//
// Multi-user case selection dialog. Wraps a case browser (the table of
// known cases with check boxes) and tells interested parties which cases the
// user confirmed.

use crate::core::model::{ItemRef, SelectionSet};
use crate::core::selection::SelectionSource;
use crate::util::error::CollaboratorError;
use std::cell::{Cell, RefCell};

pub const CASES_SOURCE_ID: &str = "cases.browser";

/// Table of cases the user can tick.
pub trait CaseBrowser {
    /// Replace the listed cases.
    fn display_cases(&mut self, cases: Vec<ItemRef>);

    fn all_cases(&self) -> Vec<ItemRef>;

    /// Ticked cases, in listing order.
    fn selected(&self) -> Vec<ItemRef>;

    /// Tick exactly `cases`. Fails if any of them is not listed.
    fn set_selected(&mut self, cases: &[ItemRef]) -> Result<(), CollaboratorError>;
}

/// In-memory [`CaseBrowser`].
#[derive(Debug, Default)]
pub struct CaseListing {
    cases: Vec<ItemRef>,
    ticked: Vec<bool>,
}

impl CaseBrowser for CaseListing {
    fn display_cases(&mut self, cases: Vec<ItemRef>) {
        self.ticked = vec![false; cases.len()];
        self.cases = cases;
    }

    fn all_cases(&self) -> Vec<ItemRef> {
        self.cases.clone()
    }

    fn selected(&self) -> Vec<ItemRef> {
        self.cases
            .iter()
            .zip(&self.ticked)
            .filter(|(_, ticked)| **ticked)
            .map(|(case, _)| case.clone())
            .collect()
    }

    fn set_selected(&mut self, cases: &[ItemRef]) -> Result<(), CollaboratorError> {
        if let Some(unknown) = cases.iter().find(|c| !self.cases.contains(c)) {
            return Err(CollaboratorError::new(
                "case_listing",
                format!("case '{unknown}' is not listed"),
            ));
        }
        for (case, ticked) in self.cases.iter().zip(self.ticked.iter_mut()) {
            *ticked = cases.contains(case);
        }
        Ok(())
    }
}

type CaseListener = Box<dyn FnMut(&[ItemRef])>;

/// Dialog state around a [`CaseBrowser`].
pub struct CaseSelectionPanel {
    browser: RefCell<Box<dyn CaseBrowser>>,
    listeners: RefCell<Vec<CaseListener>>,
    visible: Cell<bool>,
}

impl CaseSelectionPanel {
    pub fn new(browser: Box<dyn CaseBrowser>) -> Self {
        Self {
            browser: RefCell::new(browser),
            listeners: RefCell::new(Vec::new()),
            visible: Cell::new(false),
        }
    }

    pub fn show(&self) {
        self.visible.set(true);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Reload the listed cases. Ticks on cases that are still listed survive.
    pub fn refresh(&self, cases: Vec<ItemRef>) {
        let mut browser = self.browser.borrow_mut();
        let kept: Vec<ItemRef> = browser
            .selected()
            .into_iter()
            .filter(|c| cases.contains(c))
            .collect();
        let count = cases.len();
        browser.display_cases(cases);
        if let Err(e) = browser.set_selected(&kept) {
            tracing::warn!(error = %e, "Could not restore case selection after refresh");
        }
        tracing::debug!(cases = count, kept = kept.len(), "Case list refreshed");
    }

    pub fn all_cases(&self) -> Vec<ItemRef> {
        self.browser.borrow().all_cases()
    }

    pub fn selected(&self) -> Vec<ItemRef> {
        self.browser.borrow().selected()
    }

    pub fn select_all(&self) {
        let mut browser = self.browser.borrow_mut();
        let all = browser.all_cases();
        if let Err(e) = browser.set_selected(&all) {
            tracing::warn!(error = %e, "Select all failed");
        }
    }

    pub fn deselect_all(&self) {
        if let Err(e) = self.browser.borrow_mut().set_selected(&[]) {
            tracing::warn!(error = %e, "Deselect all failed");
        }
    }

    pub fn set_selections(&self, cases: &[ItemRef]) -> Result<(), CollaboratorError> {
        self.browser.borrow_mut().set_selected(cases)
    }

    /// Register a callback receiving the confirmed cases.
    pub fn subscribe_to_new_case_selections<F>(&self, listener: F)
    where
        F: FnMut(&[ItemRef]) + 'static,
    {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Hand the ticked cases to every listener, then hide the dialog.
    pub fn confirm(&self) {
        let selected = self.selected();
        tracing::info!(cases = selected.len(), "Case selection confirmed");
        for listener in self.listeners.borrow_mut().iter_mut() {
            listener(&selected);
        }
        self.visible.set(false);
    }

    /// Hide the dialog without notifying anyone.
    pub fn cancel(&self) {
        tracing::debug!("Case selection cancelled");
        self.visible.set(false);
    }
}

impl SelectionSource for CaseSelectionPanel {
    fn source_id(&self) -> &str {
        CASES_SOURCE_ID
    }

    fn current_selection(&self) -> SelectionSet {
        SelectionSet::from_items(self.selected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn cases(ids: &[&str]) -> Vec<ItemRef> {
        ids.iter().map(|s| ItemRef::new(*s)).collect()
    }

    fn panel() -> CaseSelectionPanel {
        let panel = CaseSelectionPanel::new(Box::new(CaseListing::default()));
        panel.refresh(cases(&["case-a", "case-b", "case-c"]));
        panel.show();
        panel
    }

    #[test]
    fn test_confirm_notifies_then_hides() {
        let panel = panel();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        panel.subscribe_to_new_case_selections(move |c| sink.borrow_mut().push(c.to_vec()));

        panel.set_selections(&cases(&["case-c", "case-a"])).unwrap();
        panel.confirm();

        assert_eq!(*received.borrow(), vec![cases(&["case-a", "case-c"])]);
        assert!(!panel.is_visible());
    }

    #[test]
    fn test_cancel_hides_without_notifying() {
        let panel = panel();
        let calls = Rc::new(Cell::new(0));
        let sink = Rc::clone(&calls);
        panel.subscribe_to_new_case_selections(move |_| sink.set(sink.get() + 1));

        panel.select_all();
        panel.cancel();

        assert_eq!(calls.get(), 0);
        assert!(!panel.is_visible());
    }

    #[test]
    fn test_select_all_and_deselect_all() {
        let panel = panel();
        panel.select_all();
        assert_eq!(panel.current_selection().len(), 3);
        panel.deselect_all();
        assert!(panel.current_selection().is_empty());
    }

    #[test]
    fn test_refresh_keeps_surviving_ticks() {
        let panel = panel();
        panel.set_selections(&cases(&["case-a", "case-b"])).unwrap();

        panel.refresh(cases(&["case-b", "case-d"]));

        assert_eq!(panel.selected(), cases(&["case-b"]));
        assert_eq!(panel.all_cases().len(), 2);
    }

    #[test]
    fn test_refresh_while_open_then_confirm() {
        let panel = panel();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        panel.subscribe_to_new_case_selections(move |c| sink.borrow_mut().push(c.to_vec()));
        panel.set_selections(&cases(&["case-a", "case-c"])).unwrap();

        panel.refresh(cases(&["case-c", "case-d"]));
        assert!(panel.is_visible());
        assert_eq!(panel.selected(), cases(&["case-c"]));
        panel.set_selections(&cases(&["case-c", "case-d"])).unwrap();
        panel.confirm();

        assert_eq!(*received.borrow(), vec![cases(&["case-c", "case-d"])]);
    }

    #[test]
    fn test_unknown_case_is_rejected() {
        let panel = panel();
        assert!(panel.set_selections(&cases(&["case-z"])).is_err());
        assert!(panel.selected().is_empty());
    }
}
