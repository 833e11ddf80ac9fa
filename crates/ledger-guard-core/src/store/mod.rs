//! redb-backed ledger index and the production [`DbSurface`].

pub mod chain;
pub mod ledger;
pub mod marker;
mod reset;

pub use chain::{verify_chain, ChainStats};
pub use ledger::LedgerDb;
pub use marker::{get_db_version, set_db_version};

use semver::Version;

use crate::error::Result;
use crate::signal::StopSignal;
use crate::surface::DbSurface;

const PROGRESS_EVERY: u64 = 100_000;

/// Lifecycle operations against a [`LedgerDb`]. Failures are returned
/// without logging; report them through a
/// [`LifecycleObserver`](crate::observer::LifecycleObserver).
#[derive(Debug, Clone, Copy, Default)]
pub struct RedbSurface;

impl DbSurface for RedbSurface {
    type Handle = LedgerDb;

    fn get_db_version(&self, db: &LedgerDb) -> Result<Option<Version>> {
        get_db_version(db)
    }

    fn check_database(&self, db: &LedgerDb, stop: &StopSignal) -> Result<()> {
        let stats = chain::verify_chain_with(db, stop, |seq| {
            if seq > 0 && seq % PROGRESS_EVERY == 0 {
                tracing::debug!(blocks = seq, "verifying database chain");
            }
        })?;
        tracing::info!(blocks = stats.blocks, path = ?db.path(), "database chain verified");
        Ok(())
    }

    fn reset_corrupt_db(&self, db: LedgerDb, stop: &StopSignal) -> Result<LedgerDb> {
        tracing::info!(path = ?db.path(), "checking database and resetting if corrupted");
        reset::reset_corrupt_db(db, stop)
    }

    fn set_db_version(&self, db: &LedgerDb, version: &Version) -> Result<()> {
        set_db_version(db, version)
    }
}
