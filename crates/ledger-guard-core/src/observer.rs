use crate::error::{ErrorKind, GuardError};
use crate::policy::Action;
use semver::Version;
use std::fmt;

// ---------------------------------------------------------------------------
// Stage / StageEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReadVersion,
    Decide,
    Check,
    Reset,
    WriteMarker,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ReadVersion => "read_version",
            Stage::Decide => "decide",
            Stage::Check => "check",
            Stage::Reset => "reset",
            Stage::WriteMarker => "write_marker",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ReadOnly,
    WouldDowngrade,
}

/// One transition of a lifecycle run.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    VersionLoaded {
        stored: Option<Version>,
    },
    Decided {
        action: Action,
        stored: Option<Version>,
        checkpoint: Version,
    },
    Checked,
    Reset,
    MarkerWritten {
        version: Version,
    },
    MarkerSkipped {
        reason: SkipReason,
    },
    Failed {
        stage: Stage,
        kind: ErrorKind,
        message: String,
    },
}

impl StageEvent {
    pub(crate) fn failed(stage: Stage, error: &GuardError) -> Self {
        StageEvent::Failed {
            stage,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// LifecycleObserver
// ---------------------------------------------------------------------------

pub trait LifecycleObserver {
    fn on_stage(&self, event: &StageEvent);
}

impl LifecycleObserver for () {
    fn on_stage(&self, _event: &StageEvent) {}
}

impl<F> LifecycleObserver for F
where
    F: Fn(&StageEvent),
{
    fn on_stage(&self, event: &StageEvent) {
        self(event)
    }
}

/// Reports every stage through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn on_stage(&self, event: &StageEvent) {
        match event {
            StageEvent::VersionLoaded { stored: None } => {
                tracing::info!("DB version not found in DB");
            }
            StageEvent::VersionLoaded {
                stored: Some(version),
            } => {
                tracing::info!(%version, "DB version loaded");
            }
            StageEvent::Decided {
                action,
                stored,
                checkpoint,
            } => {
                let stored = stored.as_ref().map(|v| v.to_string());
                tracing::info!(%action, ?stored, %checkpoint, "lifecycle action selected");
            }
            StageEvent::Checked => tracing::info!("database check passed"),
            StageEvent::Reset => tracing::info!("database checked and reset if corrupted"),
            StageEvent::MarkerWritten { version } => {
                tracing::info!(%version, "DB version updated");
            }
            StageEvent::MarkerSkipped { reason } => {
                tracing::debug!(?reason, "DB version left unchanged");
            }
            StageEvent::Failed {
                stage,
                kind: ErrorKind::VerificationStopped,
                ..
            } => {
                tracing::info!(%stage, "database verification stopped");
            }
            StageEvent::Failed {
                stage,
                kind,
                message,
            } => {
                tracing::error!(%stage, ?kind, error = %message, "lifecycle check failed");
            }
        }
    }
}
