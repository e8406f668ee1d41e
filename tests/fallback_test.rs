use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let journal = common::journal(&["deposit,,amina,,100000,,finance,,"]);

    let mut cmd = Command::new(cargo_bin!("coffee-workflow"));
    cmd.arg(journal.path())
        .arg("--roster")
        .arg(common::ROSTER_PATH)
        .arg("--db-path")
        .arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "falling back to in-memory storage",
        ));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let journal = common::journal(&["deposit,,amina,,100000,,finance,,"]);
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("coffee-workflow"));
    cmd.arg(journal.path())
        .arg("--roster")
        .arg(common::ROSTER_PATH)
        .arg("--db-path")
        .arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("falling back").not())
        .stderr(predicate::str::contains("using persistent storage"));
}
