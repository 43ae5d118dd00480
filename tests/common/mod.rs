//! Temporary SQLite databases for integration tests.
#![allow(dead_code)]

use food_rush::db::{DbPool, connect_and_migrate};
use tempfile::TempDir;

/// Migrated database living in a temporary directory, removed on drop.
pub struct TestDb {
    pool: DbPool,
    // Held so the directory outlives the pool.
    _dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let url = path.to_str().expect("utf-8 path").to_string();
        let pool = connect_and_migrate(&url).expect("migrate test database");
        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}
