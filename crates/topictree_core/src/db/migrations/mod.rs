//! Schema steps for the topic database.
//!
//! Steps are numbered contiguously from 1 and the highest applied number is
//! kept in `PRAGMA user_version`. Step 2 seeds the ROOT sentinel. Because
//! every parsed subject-heading chain hangs under that row, each open checks
//! that it is still present and active, even when no step is pending.

use crate::db::{DbError, DbResult};
use crate::model::topic::ROOT_TOPIC_ID;
use log::info;
use rusqlite::{Connection, OptionalExtension};

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static SCHEMA_STEPS: [SchemaStep; 2] = [
    SchemaStep {
        version: 1,
        name: "topics",
        sql: include_str!("0001_topics.sql"),
    },
    SchemaStep {
        version: 2,
        name: "root_topic",
        sql: include_str!("0002_root_topic.sql"),
    },
];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Brings `conn` to [`latest_version`] in one transaction, then verifies the
/// ROOT sentinel.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let pending = pending_steps(db_version)?;

    if !pending.is_empty() {
        let tx = conn.transaction()?;
        for step in pending {
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
        }
        tx.commit()?;
        info!(
            "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
            db_version,
            latest_version(),
            pending
                .iter()
                .map(|step| step.name)
                .collect::<Vec<_>>()
                .join(",")
        );
    }

    ensure_root_topic(conn)
}

/// Fails with [`DbError::MissingRootTopic`] unless the sentinel row is active.
pub fn ensure_root_topic(conn: &Connection) -> DbResult<()> {
    let is_deleted: Option<i64> = conn
        .query_row(
            "SELECT is_deleted FROM topics WHERE id = ?1;",
            [ROOT_TOPIC_ID.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match is_deleted {
        Some(0) => Ok(()),
        _ => Err(DbError::MissingRootTopic(ROOT_TOPIC_ID)),
    }
}

fn pending_steps(db_version: u32) -> DbResult<&'static [SchemaStep]> {
    let latest = latest_version();
    if db_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: latest,
        });
    }
    Ok(&SCHEMA_STEPS[db_version as usize..])
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, SCHEMA_STEPS};
    use crate::db::DbError;

    #[test]
    fn steps_are_numbered_contiguously_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
    }

    #[test]
    fn pending_steps_start_after_the_stored_version() {
        assert_eq!(pending_steps(0).unwrap().len(), SCHEMA_STEPS.len());
        assert_eq!(pending_steps(1).unwrap()[0].name, "root_topic");
        assert!(pending_steps(latest_version()).unwrap().is_empty());
        assert!(matches!(
            pending_steps(latest_version() + 1),
            Err(DbError::UnsupportedSchemaVersion { .. })
        ));
    }
}
