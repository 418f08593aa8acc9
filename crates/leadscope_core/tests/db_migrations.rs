mod common;

use leadscope_core::db::migrations::{current_user_version, latest_version};
use leadscope_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    for table in ["identities", "organizations", "agents", "categories", "leads"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO categories (id, name, organization_id) VALUES ('c1', 'Hot', 'missing-org');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leadscope.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_first).unwrap(), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), latest_version());
    assert_table_exists(&conn_second, "leads");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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
fn schema_refuses_to_move_a_lead_between_organizations() {
    let conn = common::setup();
    let first = common::signup(&conn, "first");
    let second = common::signup(&conn, "second");
    let lead = common::leads(&conn)
        .create_lead(&first, &common::lead_fields("Grace"))
        .unwrap();

    let err = conn
        .execute(
            "UPDATE leads SET organization_id = ?2 WHERE id = ?1;",
            [lead.id.to_string(), second.organization_id.to_string()],
        )
        .unwrap_err();
    assert!(err.to_string().contains("lead organization is immutable"));
}

#[test]
fn schema_refuses_cross_organization_agent_on_lead() {
    let conn = common::setup();
    let first = common::signup(&conn, "first");
    let second = common::signup(&conn, "second");
    let (foreign_agent, _) = common::hire(&conn, &second, "outsider");
    let lead = common::leads(&conn)
        .create_lead(&first, &common::lead_fields("Grace"))
        .unwrap();

    let err = conn
        .execute(
            "UPDATE leads SET agent_id = ?2 WHERE id = ?1;",
            [lead.id.to_string(), foreign_agent.id.to_string()],
        )
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("lead agent must belong to the lead organization"));
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
