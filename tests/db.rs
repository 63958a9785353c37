use diesel::prelude::*;
use pushkind_facilities::db::run_migrations;
use pushkind_facilities::schema::statuses;

mod common;

#[test]
fn test_creates_and_removes_db_files() {
    let test_db = common::TestDb::new();
    let pool = test_db.pool();
    let conn = pool.get();
    assert!(conn.is_ok());
}

#[test]
fn migrations_are_idempotent_and_seed_presets() {
    let test_db = common::TestDb::new();
    let pool = test_db.pool();
    run_migrations(&pool).expect("already applied migrations should be skipped");

    let mut conn = pool.get().expect("should acquire connection");
    let names: Vec<String> = statuses::table
        .select(statuses::name)
        .order(statuses::id)
        .load(&mut conn)
        .expect("should load statuses");
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], "New");
}

#[test]
fn foreign_keys_are_enforced() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.pool().get().expect("should acquire connection");
    let enabled: Vec<i32> = diesel::sql_query("PRAGMA foreign_keys")
        .load::<ForeignKeys>(&mut conn)
        .expect("should read pragma")
        .into_iter()
        .map(|row| row.foreign_keys)
        .collect();
    assert_eq!(enabled, vec![1]);
}

#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    foreign_keys: i32,
}
