// CaseSleuth - ui/panels/case_select.rs
//
// Multi-user case selection dialog.
// Rendered as a centred, non-collapsible window while the panel is visible.

use crate::app::case_select::CaseSelectionPanel;
use crate::core::model::ItemRef;

/// Render the case selection dialog (if the panel is visible).
///
/// `list_cases` is queried again when the user presses Refresh; ticks on
/// cases that are still listed survive the refresh.
pub fn render(ctx: &egui::Context, panel: &CaseSelectionPanel, list_cases: impl Fn() -> Vec<ItemRef>) {
    if !panel.is_visible() {
        return;
    }

    let mut open = true;
    egui::Window::new("Open Multi-User Case")
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .min_width(360.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let cases = panel.all_cases();
            let selected = panel.selected();

            egui::ScrollArea::vertical()
                .id_salt("case_list")
                .max_height(300.0)
                .show(ui, |ui| {
                    for case in &cases {
                        let mut checked = selected.contains(case);
                        if ui.checkbox(&mut checked, case.as_str()).changed() {
                            let next: Vec<_> = cases
                                .iter()
                                .filter(|c| if *c == case { checked } else { selected.contains(c) })
                                .cloned()
                                .collect();
                            if let Err(e) = panel.set_selections(&next) {
                                tracing::warn!(error = %e, "Case tick failed");
                            }
                        }
                    }
                });

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Select All").clicked() {
                    panel.select_all();
                }
                if ui.button("Deselect All").clicked() {
                    panel.deselect_all();
                }
                if ui.button("Refresh").clicked() {
                    panel.refresh(list_cases());
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Cancel").clicked() {
                        panel.cancel();
                    }
                    if ui.button("Open").clicked() {
                        panel.confirm();
                    }
                });
            });
        });

    if !open {
        panel.cancel();
    }
}
