//! Annotation store schema versions.
//!
//! # Invariants
//! - Schema steps are listed in strictly increasing version order.
//! - `PRAGMA user_version` always names the last applied step.
//! - Pending steps run inside one transaction; a failure applies none.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` pairs in apply order.
const SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_annotations.sql"))];

/// Returns the newest schema version this build can open.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings the store schema up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store was written by a newer build.
/// - `Sqlite` when a step fails; the store keeps its previous version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }

    let pending: Vec<&(u32, &str)> = SCHEMA_STEPS
        .iter()
        .filter(|(version, _)| *version > stored)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        stored,
        latest,
        pending.len()
    );
    Ok(())
}
