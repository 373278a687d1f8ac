use tracing::{error, warn};

use crate::error::Result;

/// Log level for a component that failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

pub(crate) fn log_not_configured(component: &str) {
    warn!(component, "component not configured, running degraded");
}

/// A fitted component that either loaded or is missing.
///
/// Missing components are a supported operating mode, not an error: the
/// pipeline keeps answering with `Unknown` outlier status or raw values.
#[derive(Debug, Clone)]
pub enum Artifact<T> {
    Loaded(T),
    Absent,
}

impl<T> Artifact<T> {
    /// Turns a loader outcome into an artifact. `None` means nothing was
    /// configured. Every absent outcome is logged here and nowhere else.
    pub fn from_load(component: &str, severity: Severity, outcome: Option<Result<T>>) -> Self {
        match outcome {
            Some(Ok(value)) => Artifact::Loaded(value),
            Some(Err(e)) => {
                match severity {
                    Severity::Warn => {
                        warn!(component, error = %e, "component unavailable, running degraded")
                    }
                    Severity::Error => {
                        error!(component, error = %e, "component unavailable, running degraded")
                    }
                }
                Artifact::Absent
            }
            None => {
                log_not_configured(component);
                Artifact::Absent
            }
        }
    }

    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            Artifact::Loaded(value) => Some(value),
            Artifact::Absent => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Artifact::Loaded(_))
    }
}

impl<T> From<Option<T>> for Artifact<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Artifact::Loaded(v),
            None => Artifact::Absent,
        }
    }
}
