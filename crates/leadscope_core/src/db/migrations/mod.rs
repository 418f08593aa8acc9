//! Schema migrations for the CRM store.
//!
//! # Responsibility
//! - Keep the ordered list of tenancy and lead schema steps.
//! - Bring a connection up to the latest schema in one transaction.
//!
//! # Invariants
//! - Versions are strictly increasing; `PRAGMA user_version` records the
//!   last applied one.
//! - A database written by a newer binary is never touched.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "tenancy",
        sql: include_str!("0001_tenancy.sql"),
    },
    Migration {
        version: 2,
        name: "leads",
        sql: include_str!("0002_leads.sql"),
    },
];

/// Latest schema version this binary can produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies every migration newer than the recorded `user_version`.
///
/// # Side effects
/// - Emits one `db_migrate` event per applied version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let recorded = current_user_version(conn)?;
    let latest = latest_version();
    if recorded > latest {
        error!(
            "event=db_migrate module=db status=error db_version={recorded} latest_supported={latest}"
        );
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: recorded,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > recorded)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    for migration in pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(())
}

/// Schema version currently recorded in the database.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
