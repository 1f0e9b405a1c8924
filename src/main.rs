// CaseSleuth - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and validation
// 3. Logging initialisation (debug mode support)
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use casesleuth::app;

pub use casesleuth::core;
pub use casesleuth::platform;
pub use casesleuth::ui;
pub use casesleuth::util;

use clap::Parser;
use std::path::PathBuf;

/// CaseSleuth - coordinated discovery, communications and case views.
#[derive(Parser, Debug)]
#[command(name = "CaseSleuth", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Directory containing config.toml (defaults to the platform config dir).
    #[arg(short = 'c', long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// View shown at startup.
    #[arg(long = "view", value_enum, default_value_t = gui::ActiveView::Discovery)]
    view: gui::ActiveView,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "CaseSleuth stopped");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> util::error::Result<()> {
    // Config comes first so its [logging] section can shape the subscriber.
    let platform_paths = match cli.config_dir {
        Some(dir) => platform::config::PlatformPaths::from_cli_dir(dir)?,
        None => platform::config::PlatformPaths::resolve(),
    };
    let (config, config_errors) = platform::config::load_config(&platform_paths.config_dir);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %platform_paths.config_file().display(),
        "CaseSleuth starting"
    );

    let config_warnings: Vec<String> = config_errors.iter().map(|e| e.to_string()).collect();
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let initial_view = cli.view;
    eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(gui::CaseSleuthApp::new(
                &config,
                config_warnings,
                initial_view,
            )))
        }),
    )?;
    Ok(())
}
