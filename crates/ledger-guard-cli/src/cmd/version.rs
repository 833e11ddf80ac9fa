use crate::output::{print_fields, print_json};
use anyhow::Context;
use ledger_guard_core::config::GuardConfig;
use ledger_guard_core::{checkpoint_version, GuardError, LedgerDb, LifecycleRun, RedbSurface};
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput {
    db_path: String,
    checkpoint_version: String,
    db_version: Option<String>,
    /// What `check` would do with the same flags.
    planned_action: String,
}

/// Report the stored and checkpoint versions and the planned action.
/// The database is always opened read-only.
pub fn run(config: &GuardConfig, json: bool) -> anyhow::Result<()> {
    let checkpoint = checkpoint_version()?;
    let check = config.check_config(checkpoint.clone());

    let db = LedgerDb::open(&config.db_path, true)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;

    let (db_version, planned_action) =
        match LifecycleRun::new(db, &check).resolve(&RedbSurface, &()) {
            Ok(resolved) => (
                resolved.stored_version().map(|v| v.to_string()),
                resolved.action().to_string(),
            ),
            Err(GuardError::IncompatibleVersion { stored, .. }) => {
                (Some(stored.to_string()), "incompatible".to_string())
            }
            Err(e) => return Err(e.into()),
        };

    let output = VersionOutput {
        db_path: config.db_path.display().to_string(),
        checkpoint_version: checkpoint.to_string(),
        db_version,
        planned_action,
    };

    if json {
        print_json(&output)?;
    } else {
        print_fields(&[
            ("path", output.db_path),
            ("db version", output.db_version.unwrap_or_else(|| "none".into())),
            ("checkpoint", output.checkpoint_version),
            ("planned action", output.planned_action),
        ]);
    }

    Ok(())
}
