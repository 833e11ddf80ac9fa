//! Startup lifecycle run: read the stored version marker, decide, verify or
//! reset, then stamp the checkpoint version.
//!
//! A run moves through `Pending → Resolved(Action) → Terminated` exactly
//! once. The states are distinct types that consume each other, so a run
//! cannot be resumed or replayed:
//!
//! ```text
//! LifecycleRun ──resolve──▶ ResolvedRun ──execute──▶ Result<Handle>
//!  (pending)    get_db_version   (action)   check | reset
//!               + decide                    + set_db_version
//! ```

use crate::config::CheckConfig;
use crate::error::Result;
use crate::observer::{LifecycleObserver, SkipReason, Stage, StageEvent};
use crate::policy::{decide, Action};
use crate::signal::StopSignal;
use crate::surface::{DbHandle, DbSurface};
use semver::Version;

/// Run the full lifecycle check and hand back the handle that is safe to
/// use. Every surface error aborts the run and is returned unchanged; the
/// handle is not returned on failure.
pub fn run_lifecycle_check<S: DbSurface>(
    handle: S::Handle,
    config: &CheckConfig,
    surface: &S,
    stop: &StopSignal,
    observer: &dyn LifecycleObserver,
) -> Result<S::Handle> {
    LifecycleRun::new(handle, config)
        .resolve(surface, observer)?
        .execute(surface, stop, observer)
}

// ---------------------------------------------------------------------------
// LifecycleRun (pending)
// ---------------------------------------------------------------------------

pub struct LifecycleRun<'a, H> {
    handle: H,
    config: &'a CheckConfig,
}

impl<'a, H: DbHandle> LifecycleRun<'a, H> {
    pub fn new(handle: H, config: &'a CheckConfig) -> Self {
        Self { handle, config }
    }

    /// Read the stored marker and pick the action.
    pub fn resolve<S>(
        self,
        surface: &S,
        observer: &dyn LifecycleObserver,
    ) -> Result<ResolvedRun<'a, H>>
    where
        S: DbSurface<Handle = H>,
    {
        let stored = surface
            .get_db_version(&self.handle)
            .inspect_err(|e| observer.on_stage(&StageEvent::failed(Stage::ReadVersion, e)))?;
        observer.on_stage(&StageEvent::VersionLoaded {
            stored: stored.clone(),
        });

        let action = decide(self.config, stored.as_ref())
            .inspect_err(|e| observer.on_stage(&StageEvent::failed(Stage::Decide, e)))?;
        observer.on_stage(&StageEvent::Decided {
            action,
            stored: stored.clone(),
            checkpoint: self.config.checkpoint_version.clone(),
        });

        Ok(ResolvedRun {
            handle: self.handle,
            config: self.config,
            stored,
            action,
        })
    }
}

// ---------------------------------------------------------------------------
// ResolvedRun
// ---------------------------------------------------------------------------

pub struct ResolvedRun<'a, H> {
    handle: H,
    config: &'a CheckConfig,
    stored: Option<Version>,
    action: Action,
}

impl<H: DbHandle> ResolvedRun<'_, H> {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn stored_version(&self) -> Option<&Version> {
        self.stored.as_ref()
    }

    /// Carry out the chosen action and, if the database was verified or
    /// reset, stamp the checkpoint version.
    pub fn execute<S>(
        self,
        surface: &S,
        stop: &StopSignal,
        observer: &dyn LifecycleObserver,
    ) -> Result<H>
    where
        S: DbSurface<Handle = H>,
    {
        let ResolvedRun {
            handle,
            config,
            stored,
            action,
        } = self;

        let handle = match action {
            Action::DoNothing => return Ok(handle),
            Action::DoCheck => {
                surface
                    .check_database(&handle, stop)
                    .inspect_err(|e| observer.on_stage(&StageEvent::failed(Stage::Check, e)))?;
                observer.on_stage(&StageEvent::Checked);
                handle
            }
            Action::DoResetCorrupt => {
                let handle = surface
                    .reset_corrupt_db(handle, stop)
                    .inspect_err(|e| observer.on_stage(&StageEvent::failed(Stage::Reset, e)))?;
                observer.on_stage(&StageEvent::Reset);
                handle
            }
        };

        update_marker(surface, handle, stored.as_ref(), config, observer)
    }
}

/// Stamp the checkpoint version unless the handle is read-only or the
/// write would move the marker backwards. Equal versions are rewritten.
fn update_marker<S: DbSurface>(
    surface: &S,
    handle: S::Handle,
    stored: Option<&Version>,
    config: &CheckConfig,
    observer: &dyn LifecycleObserver,
) -> Result<S::Handle> {
    let checkpoint = &config.checkpoint_version;

    if handle.is_read_only() {
        observer.on_stage(&StageEvent::MarkerSkipped {
            reason: SkipReason::ReadOnly,
        });
        return Ok(handle);
    }

    if stored.is_some_and(|stored| stored.cmp_precedence(checkpoint).is_gt()) {
        observer.on_stage(&StageEvent::MarkerSkipped {
            reason: SkipReason::WouldDowngrade,
        });
        return Ok(handle);
    }

    surface
        .set_db_version(&handle, checkpoint)
        .inspect_err(|e| observer.on_stage(&StageEvent::failed(Stage::WriteMarker, e)))?;
    observer.on_stage(&StageEvent::MarkerWritten {
        version: checkpoint.clone(),
    });

    Ok(handle)
}
