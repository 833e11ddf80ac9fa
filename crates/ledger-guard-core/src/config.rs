use crate::error::{GuardError, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Schema version of the ledger index written by this build.
///
/// Bump this whenever the on-disk layout changes in a way that requires
/// existing databases to be re-verified on first start.
pub const DB_CHECKPOINT_VERSION: &str = "0.25.0";

pub const DEFAULT_DB_FILE: &str = "ledger.db";

pub fn checkpoint_version() -> Result<Version> {
    Version::parse(DB_CHECKPOINT_VERSION)
        .map_err(|e| GuardError::Config(format!("checkpoint version: {e}")))
}

// ---------------------------------------------------------------------------
// CheckConfig
// ---------------------------------------------------------------------------

/// Inputs of one lifecycle run. The checkpoint is always supplied by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Verify even when the stored version matches the checkpoint.
    pub force_verify: bool,
    /// Escalate a verification into a reset of a corrupted database.
    pub reset_corrupt_db: bool,
    pub checkpoint_version: Version,
}

impl CheckConfig {
    pub fn new(checkpoint_version: Version) -> Self {
        Self {
            force_verify: false,
            reset_corrupt_db: false,
            checkpoint_version,
        }
    }

    pub fn with_force_verify(mut self, force_verify: bool) -> Self {
        self.force_verify = force_verify;
        self
    }

    pub fn with_reset_corrupt_db(mut self, reset_corrupt_db: bool) -> Self {
        self.reset_corrupt_db = reset_corrupt_db;
        self
    }
}

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// GuardConfig
// ---------------------------------------------------------------------------

/// Operator settings read from a YAML file. Command-line flags are layered
/// on top by the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub force_verify: bool,
    #[serde(default)]
    pub reset_corrupt_db: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            read_only: false,
            force_verify: false,
            reset_corrupt_db: false,
        }
    }
}

impl GuardConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: GuardConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.db_path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "db_path is empty".to_string(),
            });
        }

        if self.read_only && self.reset_corrupt_db {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "reset_corrupt_db has no effect on a read-only database; a corrupt DB will fail startup instead".to_string(),
            });
        }

        warnings
    }

    pub fn check_config(&self, checkpoint_version: Version) -> CheckConfig {
        CheckConfig::new(checkpoint_version)
            .with_force_verify(self.force_verify)
            .with_reset_corrupt_db(self.reset_corrupt_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_checkpoint_parses() {
        let v = checkpoint_version().unwrap();
        assert_eq!(v.to_string(), DB_CHECKPOINT_VERSION);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = GuardConfig::load(&dir.path().join("guard.yaml")).unwrap();
        assert_eq!(cfg, GuardConfig::default());
        assert_eq!(cfg.db_path, PathBuf::from(DEFAULT_DB_FILE));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guard.yaml");
        std::fs::write(&path, "force_verify: true\ndb_path: /var/lib/ledger/index.db\n").unwrap();

        let cfg = GuardConfig::load(&path).unwrap();
        assert!(cfg.force_verify);
        assert!(!cfg.reset_corrupt_db);
        assert!(!cfg.read_only);
        assert_eq!(cfg.db_path, PathBuf::from("/var/lib/ledger/index.db"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("guard.yaml");
        std::fs::write(&path, "force_verify: [not, a, bool]\n").unwrap();
        assert!(matches!(
            GuardConfig::load(&path),
            Err(GuardError::Yaml(_))
        ));
    }

    #[test]
    fn validate_warns_on_read_only_reset() {
        let cfg = GuardConfig {
            read_only: true,
            reset_corrupt_db: true,
            ..GuardConfig::default()
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }

    #[test]
    fn check_config_carries_flags() {
        let cfg = GuardConfig {
            force_verify: true,
            reset_corrupt_db: true,
            ..GuardConfig::default()
        };
        let check = cfg.check_config(Version::new(1, 2, 3));
        assert!(check.force_verify);
        assert!(check.reset_corrupt_db);
        assert_eq!(check.checkpoint_version, Version::new(1, 2, 3));
    }
}
