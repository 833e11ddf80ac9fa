use crate::config::CheckConfig;
use crate::error::{GuardError, Result};
use semver::Version;
use std::fmt;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What the lifecycle run does with the database before handing it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    DoNothing,
    DoCheck,
    DoResetCorrupt,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::DoNothing => "nothing",
            Action::DoCheck => "check",
            Action::DoResetCorrupt => "reset_corrupt",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Decide what to do with a database whose persisted marker is `stored`.
///
/// A stored version newer than the checkpoint is rejected outright: an
/// older build must not touch a database laid out by a newer one. Otherwise
/// a missing or older marker, or `force_verify`, selects a verification,
/// escalated to a reset when `reset_corrupt_db` is set.
///
/// Versions are compared by SemVer precedence, so build metadata never
/// makes two versions unequal.
pub fn decide(config: &CheckConfig, stored: Option<&Version>) -> Result<Action> {
    let checkpoint = &config.checkpoint_version;

    if let Some(stored) = stored {
        if stored.cmp_precedence(checkpoint).is_gt() {
            return Err(GuardError::IncompatibleVersion {
                stored: stored.clone(),
                checkpoint: checkpoint.clone(),
            });
        }
    }

    if should_verify(stored, checkpoint) || config.force_verify {
        if config.reset_corrupt_db {
            return Ok(Action::DoResetCorrupt);
        }
        return Ok(Action::DoCheck);
    }

    Ok(Action::DoNothing)
}

/// A database that was never stamped, or stamped by an older build, must
/// be verified.
pub fn should_verify(stored: Option<&Version>, checkpoint: &Version) -> bool {
    match stored {
        None => true,
        Some(stored) => stored.cmp_precedence(checkpoint).is_lt(),
    }
}
