use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Text;
use food_rush::db::{establish_connection_pool, run_migrations};

mod common;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}

#[test]
fn test_creates_and_removes_db_files() {
    let test_db = common::TestDb::new("test_connection.db");
    let conn = test_db.pool().get();
    assert!(conn.is_ok());
}

#[test]
fn test_pooled_connections_use_wal() {
    let test_db = common::TestDb::new("test_wal.db");
    let mut conn = test_db.pool().get().unwrap();
    let mode = sql_query("PRAGMA journal_mode")
        .get_result::<JournalMode>(&mut conn)
        .unwrap();
    assert_eq!(mode.journal_mode.to_lowercase(), "wal");
}

#[test]
fn test_migrations_run_once() {
    let dir = tempfile::tempdir().unwrap();
    let url = dir.path().join("test_migrations.db");
    let pool = establish_connection_pool(url.to_str().unwrap()).unwrap();

    assert_eq!(run_migrations(&pool).unwrap(), 3);
    assert_eq!(run_migrations(&pool).unwrap(), 0);
}
