// CaseSleuth - gui.rs
//
// Top-level eframe::App implementation.
// Owns the event channel and the three views, switches between them through
// their lifecycle hooks, and drives transitions and search polling each frame.

use crate::app::auxiliary::TransitionSettings;
use crate::app::case_select::{CaseListing, CaseSelectionPanel};
use crate::app::communications_view::CommunicationsView;
use crate::app::coordinator::Lifecycle;
use crate::app::discovery_view::DiscoveryView;
use crate::app::search::{BackgroundSearch, SearchJob};
use crate::core::channel::EventChannel;
use crate::core::model::{GroupSummary, ItemRef, SearchCriteria, UiEvent};
use crate::platform::config::AppConfig;
use crate::ui;
use crate::ui::panels::split::EguiSplit;
use crate::util::constants;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which composite view fills the central area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ActiveView {
    Discovery,
    Communications,
}

impl ActiveView {
    fn label(self) -> &'static str {
        match self {
            Self::Discovery => "Discovery",
            Self::Communications => "Communications",
        }
    }
}

/// Built-in sample records: (path, size in bytes).
const DEMO_FILES: &[(&str, u64)] = &[
    ("/evidence/photos/IMG_0001.jpg", 2_400_000),
    ("/evidence/photos/IMG_0002.jpg", 2_100_000),
    ("/evidence/photos/thumb_0001.png", 48_000),
    ("/evidence/docs/invoice_march.pdf", 310_000),
    ("/evidence/docs/notes.txt", 4_200),
    ("/evidence/docs/contacts.csv", 18_500),
    ("/evidence/downloads/setup.exe", 14_800_000),
    ("/evidence/downloads/archive.zip", 6_300_000),
    ("/evidence/downloads/readme.txt", 1_100),
];

const DEMO_ACCOUNTS: &[&str] = &[
    "alice@example.com",
    "bob@example.com",
    "+1 555 0100",
    "+1 555 0199",
    "carol.skype",
    "dave@test.org",
];

const DEMO_CASES: &[&str] = &["2026-0142 Harbor Street", "2026-0157 Fleet Audit", "2026-0163 Lab Intake"];

/// The CaseSleuth application.
pub struct CaseSleuthApp {
    channel: Rc<EventChannel<UiEvent>>,
    discovery: DiscoveryView,
    communications: CommunicationsView,
    cases: CaseSelectionPanel,
    split: Rc<EguiSplit>,
    active: ActiveView,
    group_by: String,
    open_cases: Rc<RefCell<Vec<ItemRef>>>,
    config_warnings: Vec<String>,
    dark_mode: bool,
    status_message: String,
}

impl CaseSleuthApp {
    pub fn new(config: &AppConfig, config_warnings: Vec<String>, initial: ActiveView) -> Self {
        let channel = Rc::new(EventChannel::with_failure_limit(
            "ui",
            config.max_recorded_failures,
        ));
        let settings = TransitionSettings {
            step_size: config.step_size_px,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            shown_position: config.results_area_min_px,
        };

        let split = Rc::new(EguiSplit::new(0));
        let discovery = DiscoveryView::new(
            Rc::clone(&channel),
            split.clone(),
            settings,
            Box::new(BackgroundSearch::new(demo_search_job())),
        );

        let communications = CommunicationsView::new(Rc::clone(&channel));
        communications
            .browser()
            .set_accounts(DEMO_ACCOUNTS.iter().map(|a| ItemRef::new(*a)).collect());

        let cases = CaseSelectionPanel::new(Box::new(CaseListing::default()));
        let open_cases = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&open_cases);
        cases.subscribe_to_new_case_selections(move |selected| {
            *sink.borrow_mut() = selected.to_vec();
        });

        let mut app = Self {
            channel,
            discovery,
            communications,
            cases,
            split,
            active: initial,
            group_by: ui::panels::discovery::GROUP_BY_OPTIONS[0].to_string(),
            open_cases,
            config_warnings,
            dark_mode: config.dark_mode,
            status_message: "Ready.".to_string(),
        };
        app.view_mut(initial).on_open();
        tracing::info!(view = initial.label(), "Initial view opened");
        app
    }

    fn view_mut(&mut self, view: ActiveView) -> &mut dyn Lifecycle {
        match view {
            ActiveView::Discovery => &mut self.discovery,
            ActiveView::Communications => &mut self.communications,
        }
    }

    /// Close the current view and open `to`.
    fn switch_view(&mut self, to: ActiveView) {
        if self.active == to {
            self.view_mut(to).on_activate();
            return;
        }
        let from = self.active;
        self.view_mut(from).on_close();
        self.view_mut(to).on_open();
        self.active = to;
        tracing::debug!(from = from.label(), to = to.label(), "View switched");
    }

    fn open_case_dialog(&mut self) {
        self.cases.refresh(demo_cases());
        self.cases.show();
    }
}

impl eframe::App for CaseSleuthApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply(ctx, self.dark_mode);

        // Search progress and details transitions.
        let now = Instant::now();
        if let Err(e) = self.discovery.poll(now) {
            tracing::warn!(error = %e, "Details transition stopped");
            self.status_message = format!("Details transition stopped: {e}");
        }
        if let Some(wait) = self.discovery.time_until_next_tick(now) {
            ctx.request_repaint_after(wait);
        } else if self.discovery.search().is_active() {
            ctx.request_repaint_after(Duration::from_millis(constants::SEARCH_POLL_INTERVAL_MS));
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Multi-User Case\u{2026}").clicked() {
                        self.open_case_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    for view in [ActiveView::Discovery, ActiveView::Communications] {
                        if ui.radio(self.active == view, view.label()).clicked() {
                            self.switch_view(view);
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    if ui.checkbox(&mut self.dark_mode, "Dark mode").changed() {
                        ui.close_menu();
                    }
                });
                ui.menu_button("Diagnostics", |ui| {
                    let failures = self.channel.failures();
                    if failures.is_empty() {
                        ui.label("No handler failures recorded.");
                    }
                    for failure in failures.iter().rev().take(20) {
                        ui.label(format!(
                            "{} {} on {}: {}",
                            failure.at.format("%H:%M:%S"),
                            failure.subscriber,
                            failure.kind,
                            failure.error
                        ));
                    }
                    if !failures.is_empty() && ui.button("Clear").clicked() {
                        self.channel.clear_failures();
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
                for warning in &self.config_warnings {
                    ui.separator();
                    ui.label(egui::RichText::new(warning).color(ui::theme::STATUS_WARNING));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let failures = self.channel.failures().len();
                    if failures > 0 {
                        ui.label(
                            egui::RichText::new(format!("{failures} handler failure(s)"))
                                .color(ui::theme::STATUS_WARNING),
                        );
                        ui.separator();
                    }
                    let open_cases = self.open_cases.borrow();
                    if !open_cases.is_empty() {
                        ui.label(format!("{} case(s) open", open_cases.len()));
                    }
                });
            });
        });

        // Central area: the active composite view.
        egui::CentralPanel::default().show(ctx, |ui| match self.active {
            ActiveView::Discovery => {
                ui::panels::discovery::render(ui, &mut self.discovery, &self.split, &mut self.group_by)
            }
            ActiveView::Communications => {
                ui::panels::communications::render(ui, &self.communications)
            }
        });

        ui::panels::case_select::render(ctx, &self.cases, demo_cases);

        // Keep frames coming while the drawer animates.
        if self.discovery.is_animating() {
            ctx.request_repaint();
        }
    }
}

/// Built-in search over [`DEMO_FILES`], paced so progress and cancellation
/// are visible.
fn demo_cases() -> Vec<ItemRef> {
    DEMO_CASES.iter().map(|c| ItemRef::new(*c)).collect()
}

fn demo_search_job() -> SearchJob {
    Arc::new(
        |criteria: &SearchCriteria, cancel: &AtomicBool| -> Result<Vec<GroupSummary>, String> {
            let mut groups: BTreeMap<String, Vec<ItemRef>> = BTreeMap::new();
            for (path, size) in DEMO_FILES {
                if cancel.load(Ordering::Relaxed) {
                    return Ok(Vec::new());
                }
                std::thread::sleep(Duration::from_millis(constants::DEMO_SEARCH_STEP_MS));
                let key = demo_group_key(&criteria.group_by, path, *size)?;
                groups.entry(key).or_default().push(ItemRef::new(*path));
            }
            Ok(groups
                .into_iter()
                .map(|(key, items)| GroupSummary { key, items })
                .collect())
        },
    )
}

fn demo_group_key(group_by: &str, path: &str, size: u64) -> Result<String, String> {
    let path = Path::new(path);
    match group_by {
        "file size" => Ok(match size {
            0..=99_999 => "under 100 KB",
            100_000..=999_999 => "100 KB to 1 MB",
            _ => "over 1 MB",
        }
        .to_string()),
        "file type" => Ok(path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "(none)".to_string())),
        "parent folder" => Ok(path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "/".to_string())),
        other => Err(format!("unsupported grouping '{other}'")),
    }
}
