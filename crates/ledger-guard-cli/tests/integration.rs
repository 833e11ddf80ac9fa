#![allow(deprecated)]
use assert_cmd::Command;
use ledger_guard_core::store::{get_db_version, set_db_version};
use ledger_guard_core::{LedgerDb, Version, DB_CHECKPOINT_VERSION};
use predicates::prelude::*;
use tempfile::TempDir;

fn guard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ledger-guard").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("LEDGER_GUARD_DB")
        .env_remove("LEDGER_GUARD_CONFIG")
        .env("RUST_LOG", "warn");
    cmd
}

fn stored_version(dir: &TempDir) -> Option<Version> {
    let db = LedgerDb::open(&dir.path().join("ledger.db"), true).unwrap();
    get_db_version(&db).unwrap()
}

// ---------------------------------------------------------------------------
// ledger-guard check
// ---------------------------------------------------------------------------

#[test]
fn check_creates_and_stamps_a_new_database() {
    let dir = TempDir::new().unwrap();
    guard(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database ready"));

    assert!(dir.path().join("ledger.db").exists());
    assert_eq!(
        stored_version(&dir),
        Some(Version::parse(DB_CHECKPOINT_VERSION).unwrap())
    );
}

#[test]
fn check_json_reports_versions() {
    let dir = TempDir::new().unwrap();
    let out = guard(&dir).args(["check", "--json"]).output().unwrap();
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["checkpoint_version"], DB_CHECKPOINT_VERSION);
    assert_eq!(value["db_version"], DB_CHECKPOINT_VERSION);
    assert_eq!(value["read_only"], false);
}

#[test]
fn check_read_only_requires_existing_database() {
    let dir = TempDir::new().unwrap();
    guard(&dir)
        .args(["check", "--read-only"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
    assert!(!dir.path().join("ledger.db").exists());
}

#[test]
fn check_read_only_does_not_stamp() {
    let dir = TempDir::new().unwrap();
    {
        let db = LedgerDb::open(&dir.path().join("ledger.db"), false).unwrap();
        db.append_block(b"genesis").unwrap();
    }

    guard(&dir).args(["check", "--read-only"]).assert().success();
    assert_eq!(stored_version(&dir), None);
}

#[test]
fn check_refuses_newer_database() {
    let dir = TempDir::new().unwrap();
    {
        let db = LedgerDb::open(&dir.path().join("ledger.db"), false).unwrap();
        set_db_version(&db, &Version::new(99, 0, 0)).unwrap();
    }

    guard(&dir)
        .args(["check", "--force-verify", "--reset-corrupt-db"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("upgrade the software"));

    assert_eq!(stored_version(&dir), Some(Version::new(99, 0, 0)));
}

#[test]
fn check_uses_db_path_from_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("ledger-guard.yaml"),
        "db_path: data/index.db\nforce_verify: true\n",
    )
    .unwrap();

    guard(&dir).arg("check").assert().success();
    assert!(dir.path().join("data/index.db").exists());
}

#[test]
fn db_flag_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ledger-guard.yaml"), "db_path: from-file.db\n").unwrap();

    guard(&dir).args(["check", "--db", "from-flag.db"]).assert().success();
    assert!(dir.path().join("from-flag.db").exists());
    assert!(!dir.path().join("from-file.db").exists());
}

// ---------------------------------------------------------------------------
// ledger-guard version
// ---------------------------------------------------------------------------

#[test]
fn version_plans_check_for_unstamped_database() {
    let dir = TempDir::new().unwrap();
    drop(LedgerDb::open(&dir.path().join("ledger.db"), false).unwrap());

    let out = guard(&dir).args(["version", "--json"]).output().unwrap();
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["db_version"], serde_json::Value::Null);
    assert_eq!(value["planned_action"], "check");
    assert_eq!(stored_version(&dir), None);
}

#[test]
fn version_plans_nothing_after_check() {
    let dir = TempDir::new().unwrap();
    guard(&dir).arg("check").assert().success();

    guard(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing"));

    guard(&dir)
        .args(["version", "--force-verify", "--reset-corrupt-db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset_corrupt"));
}

#[test]
fn version_reports_incompatible_database() {
    let dir = TempDir::new().unwrap();
    {
        let db = LedgerDb::open(&dir.path().join("ledger.db"), false).unwrap();
        set_db_version(&db, &Version::new(99, 0, 0)).unwrap();
    }

    guard(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("incompatible"))
        .stdout(predicate::str::contains("99.0.0"));
}

#[test]
fn version_on_missing_database_fails() {
    let dir = TempDir::new().unwrap();
    guard(&dir).arg("version").assert().failure().code(1);
}
