//! Schema history of the medication key-value database.
//!
//! # Invariants
//! - Steps run in ascending `version`, all inside one transaction.
//! - `PRAGMA user_version` equals the last applied step.
//! - After version 2, the medication collection key always exists, so a
//!   fresh install reads `[]` rather than a missing value.

use crate::repo::medication_repo::MEDICATIONS_KEY;
use crate::store::{StoreError, StoreResult};
use log::info;
use rusqlite::{params, Connection, Transaction};

enum Step {
    Sql(&'static str),
    Native(fn(&Transaction<'_>) -> rusqlite::Result<()>),
}

struct Migration {
    version: u32,
    name: &'static str,
    step: Step,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "kv_store",
        step: Step::Sql(include_str!("0001_kv_store.sql")),
    },
    Migration {
        version: 2,
        name: "seed_medications",
        step: Step::Native(seed_medications),
    },
];

/// Returns the latest schema version this binary knows how to produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the connection's schema up to `latest_version()`.
///
/// # Errors
/// - `StoreError::UnsupportedSchemaVersion` when the file is from a newer
///   build; the file is left untouched.
/// - `StoreError::Sqlite` when a step fails; nothing is applied.
pub fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        match &migration.step {
            Step::Sql(sql) => tx.execute_batch(sql)?,
            Step::Native(apply) => apply(&tx)?,
        }
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;
    Ok(())
}

/// Reads `PRAGMA user_version` from the connection.
pub fn schema_version(conn: &Connection) -> StoreResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Creates an empty medication collection unless one is already stored.
fn seed_medications(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO kv_store (key, value) VALUES (?1, '[]');",
        params![MEDICATIONS_KEY],
    )?;
    Ok(())
}
