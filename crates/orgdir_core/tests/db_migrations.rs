use orgdir_core::db::migrations::latest_version;
use orgdir_core::db::{open_db, open_db_in_memory, DbError};
use orgdir_core::{RepoError, SqliteOrganizationRepository};
use rusqlite::Connection;

const DIRECTORY_TABLES: [&str; 5] = [
    "organizations",
    "buildings",
    "occupations",
    "organization_occupations",
    "phone_numbers",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in DIRECTORY_TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orgdir.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO organizations (name) VALUES ('Аптека 36,6');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM organizations;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteOrganizationRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
}

#[test]
fn unicode_lower_function_folds_cyrillic() {
    let conn = open_db_in_memory().unwrap();
    let lowered: String = conn
        .query_row("SELECT unicode_lower('Кофемания АРБАТ');", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(lowered, "кофемания арбат");
}

#[test]
fn schema_checks_reject_invalid_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO organizations (name) VALUES ('Чайхана');", [])
        .unwrap();

    assert!(conn
        .execute("INSERT INTO organizations (name) VALUES ('   ');", [])
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO buildings (address, latitude, longitude, organization_id)
             VALUES ('nowhere', 91.0, 0.0, 1);",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO phone_numbers (value, is_primary, type, organization_id)
             VALUES ('8-800-555-35-35', 1, 'work', 1);",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO phone_numbers (value, is_primary, type, organization_id)
             VALUES ('+74951234567', 1, 'pager', 1);",
            [],
        )
        .is_err());
}

#[test]
fn root_occupation_names_are_unique_despite_null_parent() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO occupations (name) VALUES ('Еда');", [])
        .unwrap();

    assert!(conn
        .execute("INSERT INTO occupations (name) VALUES ('Еда');", [])
        .is_err());
    // Same name under a different parent is allowed.
    conn.execute(
        "INSERT INTO occupations (name, parent_id) VALUES ('Еда', 1);",
        [],
    )
    .unwrap();
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
