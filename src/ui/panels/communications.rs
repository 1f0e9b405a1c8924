// CaseSleuth - ui/panels/communications.rs
//
// Communications page: filters sidebar, Browse / Visualize tabs, and a
// status line showing the view-level selection.

use crate::app::communications_view::{
    AccountsBrowser, CommunicationsView, CvtTab, VisualizationPanel,
};
use crate::core::selection::SelectionSource;
use crate::ui::theme;
use crate::util::constants;

/// Render the communications page into `ui`.
pub fn render(ui: &mut egui::Ui, view: &CommunicationsView) {
    egui::SidePanel::left("cvt_filters")
        .default_width(constants::FILTERS_PANE_WIDTH)
        .resizable(true)
        .show_inside(ui, |ui| render_filters(ui, view));

    egui::TopBottomPanel::bottom("cvt_selection")
        .show_inside(ui, |ui| {
            let selection = view.selection();
            ui.label(
                egui::RichText::new(format!(
                    "{} selected in {}",
                    selection.len(),
                    view.active_tab().label()
                ))
                .color(theme::STATUS_MUTED),
            );
        });

    egui::CentralPanel::default().show_inside(ui, |ui| {
        ui.horizontal(|ui| {
            for tab in [CvtTab::Browse, CvtTab::Visualize] {
                if ui
                    .selectable_label(view.active_tab() == tab, tab.label())
                    .clicked()
                {
                    if let Err(e) = view.select_tab(tab) {
                        tracing::warn!(error = %e, "Tab switch failed");
                    }
                }
            }
        });
        ui.separator();

        match view.active_tab() {
            CvtTab::Browse => render_browser(ui, view.browser()),
            CvtTab::Visualize => render_visualization(ui, view.visualization()),
        }
    });
}

fn render_filters(ui: &mut egui::Ui, view: &CommunicationsView) {
    ui.heading("Filters");
    ui.separator();

    ui.label("Account contains:");
    let mut text = view.filters().filter();
    if ui.text_edit_singleline(&mut text).changed() {
        view.filters().set_filter(text);
    }
    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            view.filters().apply();
        }
        if ui.button("Clear").clicked() {
            view.filters().set_filter("");
            view.filters().apply();
        }
    });
}

fn render_browser(ui: &mut egui::Ui, browser: &AccountsBrowser) {
    let selection = browser.current_selection();
    ui.horizontal(|ui| {
        ui.add_enabled_ui(!selection.is_empty(), |ui| {
            if ui.button("Pin to visualization").clicked() {
                browser.pin_selected();
            }
        });
    });

    let accounts = browser.visible_accounts();
    if accounts.is_empty() {
        ui.label(egui::RichText::new("No accounts match the current filter.").weak());
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("cvt_accounts")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for account in &accounts {
                let is_selected = selection.items().contains(account);
                if ui.selectable_label(is_selected, account.as_str()).clicked() {
                    browser.select(vec![account.clone()]);
                }
            }
        });
}

fn render_visualization(ui: &mut egui::Ui, visualization: &VisualizationPanel) {
    let pinned = visualization.pinned();
    ui.horizontal(|ui| {
        ui.label(format!("{} pinned", pinned.len()));
        if ui.small_button("Clear").clicked() {
            visualization.clear();
        }
    });

    if pinned.is_empty() {
        ui.label(egui::RichText::new("Pin accounts from the Browse tab.").weak());
        return;
    }

    let selection = visualization.current_selection();
    egui::ScrollArea::vertical()
        .id_salt("cvt_pinned")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for item in &pinned {
                let is_selected = selection.items().contains(item);
                let text = egui::RichText::new(item.as_str()).color(theme::PINNED);
                if ui.selectable_label(is_selected, text).clicked() {
                    visualization.select(vec![item.clone()]);
                }
            }
        });
}
