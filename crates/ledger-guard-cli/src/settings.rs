use anyhow::Context;
use clap::Args;
use ledger_guard_core::config::{GuardConfig, WarnLevel};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "ledger-guard.yaml";

/// Operator flags shared by every subcommand. Each flag can only turn a
/// behaviour on; the config file supplies the baseline.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckFlags {
    /// Verify the database even if its version matches this build
    #[arg(long)]
    pub force_verify: bool,

    /// Reset the database if verification finds it corrupted
    #[arg(long)]
    pub reset_corrupt_db: bool,

    /// Open the database read-only (the version marker is never written)
    #[arg(long)]
    pub read_only: bool,
}

/// Resolve the effective configuration.
///
/// Priority for the database path:
/// 1. `--db` flag / `LEDGER_GUARD_DB` env var
/// 2. `db_path` in the config file
/// 3. `ledger.db` in the current directory
pub fn resolve(
    config_path: Option<&Path>,
    db: Option<&Path>,
    flags: &CheckFlags,
) -> anyhow::Result<GuardConfig> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = GuardConfig::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;

    if let Some(db) = db {
        config.db_path = db.to_path_buf();
    }
    config.force_verify |= flags.force_verify;
    config.reset_corrupt_db |= flags.reset_corrupt_db;
    config.read_only |= flags.read_only;

    let warnings = config.validate();
    for w in &warnings {
        tracing::warn!("config: {}", w.message);
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }

    Ok(config)
}
