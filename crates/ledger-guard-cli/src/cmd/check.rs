use crate::output::{print_fields, print_json};
use anyhow::Context;
use ledger_guard_core::config::GuardConfig;
use ledger_guard_core::store::get_db_version;
use ledger_guard_core::{
    checkpoint_version, run_lifecycle_check, DbHandle, LedgerDb, RedbSurface, StopSignal,
    TracingObserver,
};
use serde::Serialize;

#[derive(Serialize)]
struct CheckOutput {
    db_path: String,
    read_only: bool,
    checkpoint_version: String,
    db_version: Option<String>,
    blocks: u64,
}

pub fn run(config: &GuardConfig, stop: &StopSignal, json: bool) -> anyhow::Result<()> {
    let checkpoint = checkpoint_version()?;
    let check = config.check_config(checkpoint.clone());

    let db = LedgerDb::open(&config.db_path, config.read_only)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;

    let db = run_lifecycle_check(db, &check, &RedbSurface, stop, &TracingObserver)?;

    let db_version = get_db_version(&db)?.map(|v| v.to_string());
    let output = CheckOutput {
        db_path: db.path().display().to_string(),
        read_only: db.is_read_only(),
        checkpoint_version: checkpoint.to_string(),
        db_version,
        blocks: db.block_count()?,
    };

    if json {
        print_json(&output)?;
    } else {
        println!("Database ready.");
        print_fields(&[
            ("path", output.db_path),
            ("db version", output.db_version.unwrap_or_else(|| "none".into())),
            ("checkpoint", output.checkpoint_version),
            ("blocks", output.blocks.to_string()),
            ("read-only", output.read_only.to_string()),
        ]);
    }

    Ok(())
}
