use redb::{Database, ReadableTable};

use crate::error::{GuardError, Result};
use crate::signal::StopSignal;

use super::ledger::{block_hash, LedgerDb, BLOCKS, GENESIS_PARENT, HASH_LEN};

/// Outcome of a clean scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStats {
    pub blocks: u64,
}

enum ScanError {
    Corrupt(String),
    Stopped,
    Storage(redb::Error),
}

impl From<redb::TransactionError> for ScanError {
    fn from(e: redb::TransactionError) -> Self {
        ScanError::Storage(e.into())
    }
}

impl From<redb::TableError> for ScanError {
    fn from(e: redb::TableError) -> Self {
        ScanError::Storage(e.into())
    }
}

impl From<redb::StorageError> for ScanError {
    fn from(e: redb::StorageError) -> Self {
        ScanError::Storage(e.into())
    }
}

/// Walk every block in key order and check that sequence numbers are
/// contiguous from 0 and that each record links to its predecessor's hash.
///
/// The stop signal is polled before each block; a stop returns
/// `VerificationStopped` without a verdict.
pub fn verify_chain(db: &LedgerDb, stop: &StopSignal) -> Result<ChainStats> {
    verify_chain_with(db, stop, |_| {})
}

/// [`verify_chain`], calling `on_block` with each sequence number once the
/// block has passed its checks.
pub(crate) fn verify_chain_with(
    db: &LedgerDb,
    stop: &StopSignal,
    on_block: impl FnMut(u64),
) -> Result<ChainStats> {
    match scan(&db.db, stop, on_block) {
        Ok(stats) => Ok(stats),
        Err(ScanError::Corrupt(reason)) => Err(GuardError::CorruptDb(reason)),
        Err(ScanError::Stopped) => Err(GuardError::VerificationStopped),
        Err(ScanError::Storage(e)) => Err(GuardError::Verification(e.to_string())),
    }
}

fn scan(
    db: &Database,
    stop: &StopSignal,
    mut on_block: impl FnMut(u64),
) -> std::result::Result<ChainStats, ScanError> {
    if stop.is_stopped() {
        return Err(ScanError::Stopped);
    }

    let rt = db.begin_read()?;
    let table = match rt.open_table(BLOCKS) {
        Ok(table) => table,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(ChainStats { blocks: 0 }),
        Err(e) => return Err(e.into()),
    };

    let mut expected = 0u64;
    let mut parent = GENESIS_PARENT;
    for entry in table.iter()? {
        if stop.is_stopped() {
            return Err(ScanError::Stopped);
        }
        let (k, v) = entry?;
        let seq = k.value();
        let value = v.value();

        if seq != expected {
            return Err(ScanError::Corrupt(format!(
                "block {expected} missing (next stored block is {seq})"
            )));
        }
        if value.len() < HASH_LEN {
            return Err(ScanError::Corrupt(format!(
                "block {seq} record is {} bytes, shorter than its parent hash",
                value.len()
            )));
        }
        if value[..HASH_LEN] != parent {
            return Err(ScanError::Corrupt(format!("block {seq} parent hash mismatch")));
        }

        parent = block_hash(value);
        expected += 1;
        on_block(seq);
    }

    Ok(ChainStats { blocks: expected })
}
