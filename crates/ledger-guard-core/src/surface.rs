//! The capabilities a lifecycle run needs from the database layer.
//!
//! The orchestrator only ever talks to a [`DbSurface`]; the redb-backed
//! [`RedbSurface`](crate::store::RedbSurface) is the production
//! implementation and tests substitute a recording fake.

use crate::error::Result;
use crate::signal::StopSignal;
use semver::Version;

/// A live database handle as seen by the lifecycle run.
pub trait DbHandle {
    fn is_read_only(&self) -> bool;
}

pub trait DbSurface {
    type Handle: DbHandle;

    /// The persisted version marker, or `None` if the database was never
    /// stamped.
    fn get_db_version(&self, db: &Self::Handle) -> Result<Option<Version>>;

    /// Passive integrity scan. Returns `VerificationStopped` if `stop`
    /// fires mid-scan.
    fn check_database(&self, db: &Self::Handle, stop: &StopSignal) -> Result<()>;

    /// Scan and, if corrupted, rebuild. Consumes the handle; the returned
    /// one is the only valid handle afterwards (it may be the same
    /// database when nothing was wrong).
    fn reset_corrupt_db(&self, db: Self::Handle, stop: &StopSignal) -> Result<Self::Handle>;

    /// Persist `version` as the marker. Must be atomic.
    fn set_db_version(&self, db: &Self::Handle, version: &Version) -> Result<()>;
}
