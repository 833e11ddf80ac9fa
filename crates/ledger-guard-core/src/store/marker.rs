use redb::{Database, ReadableTable};
use semver::Version;

use crate::error::{GuardError, Result};
use crate::surface::DbHandle;

use super::ledger::{LedgerDb, META};

pub(crate) const DB_VERSION_KEY: &str = "db_version";

/// The version marker stored in `meta`, or `None` if the table or key is
/// missing.
pub fn get_db_version(db: &LedgerDb) -> Result<Option<Version>> {
    let raw = read_marker(&db.db).map_err(|e| GuardError::VersionRead(e.to_string()))?;
    raw.map(|s| {
        Version::parse(&s)
            .map_err(|e| GuardError::VersionRead(format!("invalid stored version {s:?}: {e}")))
    })
    .transpose()
}

/// Persist `version` as the marker in a single write transaction.
pub fn set_db_version(db: &LedgerDb, version: &Version) -> Result<()> {
    if db.is_read_only() {
        return Err(GuardError::ReadOnly("write the DB version"));
    }
    write_marker(&db.db, &version.to_string()).map_err(|e| GuardError::MarkerWrite(e.to_string()))
}

fn read_marker(db: &Database) -> std::result::Result<Option<String>, redb::Error> {
    let rt = db.begin_read()?;
    let table = match rt.open_table(META) {
        Ok(table) => table,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let value = table.get(DB_VERSION_KEY)?.map(|v| v.value().to_string());
    Ok(value)
}

pub(crate) fn write_marker(db: &Database, value: &str) -> std::result::Result<(), redb::Error> {
    let wt = db.begin_write()?;
    {
        let mut table = wt.open_table(META)?;
        table.insert(DB_VERSION_KEY, value)?;
    }
    wt.commit()?;
    Ok(())
}
