#![allow(dead_code)]

use chrono::NaiveDate;
use seogwipean_core::SqliteConnectionFactory;
use tempfile::TempDir;

/// File-backed database that lives as long as the returned value.
pub struct TestDb {
    _dir: TempDir,
    pub factory: SqliteConnectionFactory,
}

pub fn test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let factory = SqliteConnectionFactory::new(dir.path().join("seogwipean.sqlite3"));
    TestDb { _dir: dir, factory }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
