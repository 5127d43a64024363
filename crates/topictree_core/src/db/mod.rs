//! Topic database bootstrap.
//!
//! # Responsibility
//! - Hand out SQLite connections that are configured, migrated and anchored
//!   on the ROOT sentinel topic.
//! - Describe bootstrap failures with [`DbError`].
//!
//! # Invariants
//! - A connection returned by [`open_db`] or [`open_db_in_memory`] holds the
//!   latest schema and an active ROOT sentinel row.
//! - Databases written by a newer build are never modified.

use crate::model::topic::TopicId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or preparing the topic database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// `PRAGMA user_version` is past every schema step this build knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The ROOT sentinel row was removed or soft-deleted after seeding.
    MissingRootTopic(TopicId),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "topic schema version {db_version} was written by a newer build (this build supports up to {latest_supported})"
            ),
            Self::MissingRootTopic(id) => {
                write!(f, "ROOT topic {id} is missing or deleted")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
