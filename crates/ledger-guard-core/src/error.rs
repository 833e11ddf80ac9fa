use semver::Version;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error(
        "cannot use newer DB version={stored} with older checkpoint version={checkpoint}: upgrade the software"
    )]
    IncompatibleVersion { stored: Version, checkpoint: Version },

    #[error("failed to read DB version: {0}")]
    VersionRead(String),

    #[error("database is corrupted: {0}; re-run with reset enabled")]
    CorruptDb(String),

    #[error("database verification failed: {0}")]
    Verification(String),

    #[error("database reset failed: {0}")]
    Reset(String),

    #[error("failed to write DB version: {0}")]
    MarkerWrite(String),

    #[error("database verification stopped")]
    VerificationStopped,

    #[error("database not found at {0:?}")]
    DatabaseNotFound(PathBuf),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("database is read-only: refusing to {0}")]
    ReadOnly(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure classes an operator acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IncompatibleVersion,
    VersionReadFailure,
    VerificationFailure,
    ResetFailure,
    MarkerWriteFailure,
    VerificationStopped,
    Other,
}

impl GuardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IncompatibleVersion { .. } => ErrorKind::IncompatibleVersion,
            Self::VersionRead(_) => ErrorKind::VersionReadFailure,
            Self::CorruptDb(_) | Self::Verification(_) => ErrorKind::VerificationFailure,
            Self::Reset(_) => ErrorKind::ResetFailure,
            Self::MarkerWrite(_) => ErrorKind::MarkerWriteFailure,
            Self::VerificationStopped => ErrorKind::VerificationStopped,
            Self::DatabaseNotFound(_)
            | Self::Storage(_)
            | Self::ReadOnly(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Yaml(_) => ErrorKind::Other,
        }
    }

    /// True for the cooperative-cancellation sentinel. A stop is an
    /// operator-initiated abort, not an integrity incident.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::VerificationStopped)
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_is_not_a_verification_failure() {
        let err = GuardError::VerificationStopped;
        assert!(err.is_stopped());
        assert_eq!(err.kind(), ErrorKind::VerificationStopped);

        let corrupt = GuardError::CorruptDb("block 3: parent hash mismatch".into());
        assert!(!corrupt.is_stopped());
        assert_eq!(corrupt.kind(), ErrorKind::VerificationFailure);
    }

    #[test]
    fn incompatible_version_message_asks_for_upgrade() {
        let err = GuardError::IncompatibleVersion {
            stored: Version::new(2, 0, 0),
            checkpoint: Version::new(1, 0, 0),
        };
        let msg = err.to_string();
        assert!(msg.contains("2.0.0"), "msg: {msg}");
        assert!(msg.contains("1.0.0"), "msg: {msg}");
        assert!(msg.contains("upgrade"), "msg: {msg}");
    }
}
