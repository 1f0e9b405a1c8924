// CaseSleuth - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation: every failure names the subsystem and
// the collaborator that produced it.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all CaseSleuth operations.
#[derive(Debug)]
pub enum CaseSleuthError {
    /// A transition driver stopped because its step callback failed.
    Transition(TransitionError),

    /// An external collaborator (panel, container, search) reported a failure.
    Collaborator(CollaboratorError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// The native window could not be created.
    Launch(eframe::Error),
}

impl fmt::Display for CaseSleuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transition(e) => write!(f, "Transition error: {e}"),
            Self::Collaborator(e) => write!(f, "Collaborator error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Launch(e) => write!(f, "Failed to launch GUI: {e}"),
        }
    }
}

impl std::error::Error for CaseSleuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transition(e) => Some(e),
            Self::Collaborator(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Launch(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// A failure raised by code outside the engine: an event handler, a step
/// callback writing to a container, or a domain collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorError {
    /// Short static name of the failing collaborator (e.g. "results_panel").
    pub collaborator: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self {
            collaborator,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.collaborator, self.reason)
    }
}

impl std::error::Error for CollaboratorError {}

impl From<CollaboratorError> for CaseSleuthError {
    fn from(e: CollaboratorError) -> Self {
        Self::Collaborator(e)
    }
}

// ---------------------------------------------------------------------------
// Transition errors
// ---------------------------------------------------------------------------

/// Errors surfaced by a transition driver to the code that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The step callback failed; the driver stopped at `position`.
    StepFailed {
        position: i32,
        source: CollaboratorError,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepFailed { position, source } => {
                write!(f, "step callback failed at position {position}: {source}")
            }
        }
    }
}

impl std::error::Error for TransitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StepFailed { source, .. } => Some(source),
        }
    }
}

impl From<TransitionError> for CaseSleuthError {
    fn from(e: TransitionError) -> Self {
        Self::Transition(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for CaseSleuthError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<eframe::Error> for CaseSleuthError {
    fn from(e: eframe::Error) -> Self {
        Self::Launch(e)
    }
}

/// Convenience type alias for CaseSleuth results.
pub type Result<T> = std::result::Result<T, CaseSleuthError>;
