//! `ledger-guard-core` decides on process startup whether the ledger
//! index can be used as-is, must be verified, or must be reset, and keeps
//! its schema version marker moving forward only.
//!
//! ```text
//! GuardConfig ─▶ CheckConfig ─┐
//!                             ▼
//! LedgerDb ─▶ run_lifecycle_check ─▶ decide (pure)
//!                 │
//!                 ▼
//!            DbSurface: get_db_version → check | reset → set_db_version
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use ledger_guard_core::{
//!     checkpoint_version, run_lifecycle_check, CheckConfig, LedgerDb, RedbSurface,
//!     StopSignal, TracingObserver,
//! };
//!
//! let db = LedgerDb::open("data/ledger.db".as_ref(), false)?;
//! let config = CheckConfig::new(checkpoint_version()?).with_force_verify(true);
//! let db = run_lifecycle_check(db, &config, &RedbSurface, &StopSignal::new(), &TracingObserver)?;
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observer;
pub mod policy;
pub mod signal;
pub mod store;
pub mod surface;

pub use config::{checkpoint_version, CheckConfig, GuardConfig, DB_CHECKPOINT_VERSION};
pub use error::{ErrorKind, GuardError, Result};
pub use lifecycle::{run_lifecycle_check, LifecycleRun, ResolvedRun};
pub use observer::{LifecycleObserver, SkipReason, Stage, StageEvent, TracingObserver};
pub use policy::{decide, Action};
pub use signal::StopSignal;
pub use store::{LedgerDb, RedbSurface};
pub use surface::{DbHandle, DbSurface};
pub use semver::Version;
