//! The ledger index database handle.
//!
//! # Table design
//!
//! ```text
//! meta   : &str -> &str    "db_version" -> semver string
//! blocks : u64  -> &[u8]   seq -> [ parent_hash: 32 bytes | payload ]
//! ```
//!
//! `parent_hash` is the SHA-256 of the previous block's full value (all
//! zeroes for block 0), so a scan in key order can detect gaps, truncated
//! records and rewritten history.

use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};
use sha2::{Digest, Sha256};

use crate::error::{GuardError, Result};
use crate::surface::DbHandle;

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

pub(crate) const META: TableDefinition<&str, &str> = TableDefinition::new("meta");
pub(crate) const BLOCKS: TableDefinition<u64, &[u8]> = TableDefinition::new("blocks");

pub(crate) const HASH_LEN: usize = 32;
pub(crate) const GENESIS_PARENT: [u8; HASH_LEN] = [0u8; HASH_LEN];

pub(crate) fn block_hash(value: &[u8]) -> [u8; HASH_LEN] {
    Sha256::digest(value).into()
}

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// An open ledger index. Read-only handles never write: marker updates,
/// appends and resets are refused.
pub struct LedgerDb {
    pub(crate) db: Database,
    path: PathBuf,
    read_only: bool,
}

impl LedgerDb {
    /// Open the database at `path`.
    ///
    /// A writable open creates the file and both tables if missing. A
    /// read-only open requires an existing file and creates nothing.
    pub fn open(path: &Path, read_only: bool) -> Result<Self> {
        if read_only {
            if !path.exists() {
                return Err(GuardError::DatabaseNotFound(path.to_path_buf()));
            }
            let db = Database::open(path).map_err(|e| GuardError::Storage(e.to_string()))?;
            return Ok(Self {
                db,
                path: path.to_path_buf(),
                read_only,
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path).map_err(|e| GuardError::Storage(e.to_string()))?;
        ensure_tables(&db).map_err(|e| GuardError::Storage(e.to_string()))?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
            read_only,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `payload` as the next block, linked to the current tip.
    /// Returns the new block's sequence number.
    pub fn append_block(&self, payload: &[u8]) -> Result<u64> {
        if self.read_only {
            return Err(GuardError::ReadOnly("append a block"));
        }
        append(&self.db, payload).map_err(|e| GuardError::Storage(e.to_string()))
    }

    /// Number of stored blocks (tip sequence + 1).
    pub fn block_count(&self) -> Result<u64> {
        count(&self.db).map_err(|e| GuardError::Storage(e.to_string()))
    }
}

impl DbHandle for LedgerDb {
    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl std::fmt::Debug for LedgerDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerDb")
            .field("path", &self.path)
            .field("read_only", &self.read_only)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// redb helpers
// ---------------------------------------------------------------------------

fn ensure_tables(db: &Database) -> std::result::Result<(), redb::Error> {
    let wt = db.begin_write()?;
    wt.open_table(META)?;
    wt.open_table(BLOCKS)?;
    wt.commit()?;
    Ok(())
}

fn append(db: &Database, payload: &[u8]) -> std::result::Result<u64, redb::Error> {
    let wt = db.begin_write()?;
    let seq = {
        let mut table = wt.open_table(BLOCKS)?;
        let (seq, parent) = match table.last()? {
            Some((k, v)) => (k.value() + 1, block_hash(v.value())),
            None => (0, GENESIS_PARENT),
        };
        let mut value = Vec::with_capacity(HASH_LEN + payload.len());
        value.extend_from_slice(&parent);
        value.extend_from_slice(payload);
        table.insert(seq, value.as_slice())?;
        seq
    };
    wt.commit()?;
    Ok(seq)
}

fn count(db: &Database) -> std::result::Result<u64, redb::Error> {
    let rt = db.begin_read()?;
    let table = match rt.open_table(BLOCKS) {
        Ok(table) => table,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let tip = table.last()?.map(|(k, _)| k.value());
    Ok(tip.map_or(0, |seq| seq + 1))
}
