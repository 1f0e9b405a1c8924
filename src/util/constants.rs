// CaseSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "CaseSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "CaseSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Transition driver
// =============================================================================

/// Pixels the details divider moves per animation tick.
pub const DEFAULT_ANIMATION_STEP_PX: i32 = 10;

/// Smallest accepted step. A zero step would never converge.
pub const MIN_ANIMATION_STEP_PX: i32 = 1;

/// Largest accepted step.
pub const MAX_ANIMATION_STEP_PX: i32 = 200;

/// Interval between animation ticks (ms). Roughly one frame at 60 Hz.
pub const DEFAULT_TRANSITION_TICK_MS: u64 = 16;

/// Minimum user-configurable tick interval (ms).
pub const MIN_TRANSITION_TICK_MS: u64 = 1;

/// Maximum user-configurable tick interval (ms).
pub const MAX_TRANSITION_TICK_MS: u64 = 1_000;

/// Height the results area keeps when the details area is fully shown (px).
/// This is the lower bound of the details divider.
pub const DEFAULT_RESULTS_AREA_MIN_PX: i32 = 250;

/// Minimum user-configurable results area height (px).
pub const MIN_RESULTS_AREA_MIN_PX: i32 = 50;

/// Maximum user-configurable results area height (px).
pub const MAX_RESULTS_AREA_MIN_PX: i32 = 2_000;

// =============================================================================
// Event channel
// =============================================================================

/// Number of subscriber failures retained for diagnostics before the oldest
/// record is discarded.
pub const DEFAULT_MAX_RECORDED_FAILURES: usize = 256;

/// Hard upper bound on retained failure records.
pub const ABSOLUTE_MAX_RECORDED_FAILURES: usize = 10_000;

// =============================================================================
// Layout
// =============================================================================

/// Initial width of the discovery group list (px).
pub const GROUP_LIST_WIDTH: f32 = 250.0;

/// Initial width of the communications filters pane (px).
pub const FILTERS_PANE_WIDTH: f32 = 256.0;

// =============================================================================
// Configuration
// =============================================================================

/// Config file name (lives in the config directory).
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default log level when neither RUST_LOG, --debug, nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Shell
// =============================================================================

/// Repaint interval while a discovery search runs in the background (ms).
pub const SEARCH_POLL_INTERVAL_MS: u64 = 100;

/// Simulated per-record cost of the built-in demo search (ms).
pub const DEMO_SEARCH_STEP_MS: u64 = 40;
