// CaseSleuth - platform/config.rs
//
// Platform-specific configuration directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for CaseSleuth configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/casesleuth/ or %APPDATA%\CaseSleuth\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Use an explicit directory (from `--config-dir`).
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Like [`Self::with_config_dir`], but rejects a path naming something
    /// other than a directory. A directory that does not exist yet is fine:
    /// it simply holds no config.toml.
    pub fn from_cli_dir(config_dir: PathBuf) -> Result<Self, ConfigError> {
        if config_dir.exists() && !config_dir.is_dir() {
            return Err(ConfigError::Io {
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "--config-dir must name a directory",
                ),
                path: config_dir,
            });
        }
        Ok(Self::with_config_dir(config_dir))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub animation: AnimationSection,
    pub channel: ChannelSection,
    pub ui: UiSection,
    pub logging: LoggingSection,
}

/// `[animation]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnimationSection {
    /// Pixels the details divider moves per tick.
    pub step_size_px: Option<i32>,
    /// Milliseconds between ticks.
    pub tick_interval_ms: Option<u64>,
    /// Height the results area keeps when details are shown.
    pub results_area_min_px: Option<i32>,
}

/// `[channel]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ChannelSection {
    /// Subscriber failures retained for diagnostics.
    pub max_recorded_failures: Option<usize>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Animation --
    pub step_size_px: i32,
    pub tick_interval_ms: u64,
    pub results_area_min_px: i32,

    // -- Channel --
    pub max_recorded_failures: usize,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            step_size_px: constants::DEFAULT_ANIMATION_STEP_PX,
            tick_interval_ms: constants::DEFAULT_TRANSITION_TICK_MS,
            results_area_min_px: constants::DEFAULT_RESULTS_AREA_MIN_PX,
            max_recorded_failures: constants::DEFAULT_MAX_RECORDED_FAILURES,
            dark_mode: true,
            log_level: None,
            log_file: None,
        }
    }
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns the validated config and every non-fatal problem found. A missing
/// file is the first-run case: defaults, no warnings. An unreadable or
/// unparseable file yields defaults plus one warning; the application still
/// starts but the user is told.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<ConfigError>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<ConfigError> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(source) => {
            warnings.push(ConfigError::Io {
                path: config_path,
                source,
            });
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            warnings.push(ConfigError::TomlParse {
                path: config_path,
                source,
            });
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let mut config = AppConfig::default();

    // -- Animation: step_size_px --
    if let Some(step) = raw.animation.step_size_px {
        if (constants::MIN_ANIMATION_STEP_PX..=constants::MAX_ANIMATION_STEP_PX).contains(&step) {
            config.step_size_px = step;
        } else {
            warnings.push(out_of_range(
                "animation.step_size_px",
                step,
                format!(
                    "{}-{} (using default {})",
                    constants::MIN_ANIMATION_STEP_PX,
                    constants::MAX_ANIMATION_STEP_PX,
                    constants::DEFAULT_ANIMATION_STEP_PX
                ),
            ));
        }
    }

    // -- Animation: tick_interval_ms --
    if let Some(ms) = raw.animation.tick_interval_ms {
        if (constants::MIN_TRANSITION_TICK_MS..=constants::MAX_TRANSITION_TICK_MS).contains(&ms) {
            config.tick_interval_ms = ms;
        } else {
            warnings.push(out_of_range(
                "animation.tick_interval_ms",
                ms,
                format!(
                    "{}-{} (using default {})",
                    constants::MIN_TRANSITION_TICK_MS,
                    constants::MAX_TRANSITION_TICK_MS,
                    constants::DEFAULT_TRANSITION_TICK_MS
                ),
            ));
        }
    }

    // -- Animation: results_area_min_px --
    if let Some(px) = raw.animation.results_area_min_px {
        if (constants::MIN_RESULTS_AREA_MIN_PX..=constants::MAX_RESULTS_AREA_MIN_PX).contains(&px)
        {
            config.results_area_min_px = px;
        } else {
            warnings.push(out_of_range(
                "animation.results_area_min_px",
                px,
                format!(
                    "{}-{} (using default {})",
                    constants::MIN_RESULTS_AREA_MIN_PX,
                    constants::MAX_RESULTS_AREA_MIN_PX,
                    constants::DEFAULT_RESULTS_AREA_MIN_PX
                ),
            ));
        }
    }

    // -- Channel: max_recorded_failures --
    if let Some(max) = raw.channel.max_recorded_failures {
        if (1..=constants::ABSOLUTE_MAX_RECORDED_FAILURES).contains(&max) {
            config.max_recorded_failures = max;
        } else {
            warnings.push(out_of_range(
                "channel.max_recorded_failures",
                max,
                format!(
                    "1-{} (using default {})",
                    constants::ABSOLUTE_MAX_RECORDED_FAILURES,
                    constants::DEFAULT_MAX_RECORDED_FAILURES
                ),
            ));
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            _ => warnings.push(out_of_range(
                "ui.theme",
                theme,
                "\"dark\" or \"light\" (using default dark)".to_string(),
            )),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(out_of_range(
                "logging.level",
                level,
                "error, warn, info, debug or trace (using default info)".to_string(),
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}
