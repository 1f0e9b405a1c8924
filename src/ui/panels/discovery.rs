// CaseSleuth - ui/panels/discovery.rs
//
// Discovery page: search bar, group list sidebar, results over details.
//
// The results/details boundary is the EguiSplit divider, moved by the
// view's auxiliary-area transitions. This panel only reads it back.

use crate::app::auxiliary::SplitContainer;
use crate::app::discovery_view::{DetailsPanel, DiscoveryView, GroupListPanel, ResultsPanel};
use crate::core::model::SearchCriteria;
use crate::core::selection::SelectionSource;
use crate::ui::panels::split::EguiSplit;
use crate::ui::theme;
use crate::util::constants;

/// Attribute groupings offered in the search bar.
pub const GROUP_BY_OPTIONS: &[&str] = &["file size", "file type", "parent folder"];

/// Render the discovery page into `ui`.
pub fn render(ui: &mut egui::Ui, view: &mut DiscoveryView, split: &EguiSplit, group_by: &mut String) {
    let mut start_search = false;
    let mut cancel_search = false;

    ui.horizontal(|ui| {
        egui::ComboBox::from_label("Group by")
            .selected_text(group_by.as_str())
            .show_ui(ui, |ui| {
                for option in GROUP_BY_OPTIONS {
                    ui.selectable_value(group_by, (*option).to_string(), *option);
                }
            });
        if view.search().is_active() {
            ui.spinner();
            if ui.button("Cancel").clicked() {
                cancel_search = true;
            }
        } else if ui.button("Search").clicked() {
            start_search = true;
        }
    });
    ui.separator();

    egui::SidePanel::left("discovery_groups")
        .default_width(constants::GROUP_LIST_WIDTH)
        .resizable(true)
        .show_inside(ui, |ui| render_groups(ui, view.group_list()));

    egui::CentralPanel::default().show_inside(ui, |ui| {
        split.set_extent(ui.available_height().max(0.0) as i32);

        let results_height = split.divider_location() as f32;
        ui.allocate_ui(egui::vec2(ui.available_width(), results_height), |ui| {
            egui::ScrollArea::vertical()
                .id_salt("discovery_results")
                .max_height(results_height)
                .auto_shrink([false; 2])
                .show(ui, |ui| render_results(ui, view.results()));
        });

        if split.details_height() as f32 > theme::DIVIDER_HANDLE_HEIGHT {
            ui.separator();
            render_details(ui, view.details(), view.results());
        }
    });

    if cancel_search {
        view.cancel_search();
    }
    if start_search {
        view.reset();
        view.start_search(SearchCriteria {
            group_by: group_by.clone(),
            filters: Vec::new(),
        });
    }
}

fn render_groups(ui: &mut egui::Ui, groups: &GroupListPanel) {
    ui.heading("Groups");
    ui.separator();

    if groups.is_searching() {
        ui.label("Searching\u{2026}");
        return;
    }
    let listed = groups.groups();
    if listed.is_empty() {
        ui.label(egui::RichText::new("Run a search to list groups.").weak());
        return;
    }

    let selected = groups.selected_key();
    egui::ScrollArea::vertical()
        .id_salt("discovery_groups_scroll")
        .show(ui, |ui| {
            for group in &listed {
                let is_selected = selected.as_deref() == Some(group.key.as_str());
                let label = format!("{} ({})", group.key, group.size());
                if ui.selectable_label(is_selected, label).clicked() {
                    if let Err(e) = groups.select_group(&group.key) {
                        tracing::warn!(error = %e, "Group selection failed");
                    }
                }
            }
        });
}

fn render_results(ui: &mut egui::Ui, results: &ResultsPanel) {
    let Some(group) = results.group() else {
        ui.centered_and_justified(|ui| {
            ui.label("Select a group to list its files.");
        });
        return;
    };

    ui.label(egui::RichText::new(format!("{}: {} files", group.key, group.size())).strong());
    let selection = results.current_selection();
    for item in &group.items {
        let is_selected = selection.items().contains(item);
        let response = ui.add_sized(
            [ui.available_width(), theme::ROW_HEIGHT],
            egui::SelectableLabel::new(is_selected, item.as_str()),
        );
        if response.clicked() {
            if is_selected {
                results.clear_selection();
            } else if let Err(e) = results.select_item(item) {
                tracing::warn!(error = %e, "Result selection failed");
            }
        }
    }
}

fn render_details(ui: &mut egui::Ui, details: &DetailsPanel, results: &ResultsPanel) {
    ui.horizontal(|ui| {
        ui.heading("Details");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("Hide").clicked() {
                results.clear_selection();
            }
        });
    });

    match details.item() {
        Some(item) => {
            egui::Grid::new("discovery_detail_grid")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    ui.label("File:");
                    ui.label(egui::RichText::new(item.as_str()).monospace());
                    ui.end_row();

                    if let Some(group) = results.group() {
                        ui.label("Group:");
                        ui.label(group.key);
                        ui.end_row();
                    }
                });
        }
        None => {
            ui.label(egui::RichText::new("Select a result to view details.").weak());
        }
    }
}
