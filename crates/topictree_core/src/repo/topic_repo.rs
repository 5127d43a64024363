//! Topic store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and lookup primitives over topic nodes and entity links.
//! - Keep SQL details and the raw level codec inside the repository boundary.
//! - Let callers demarcate atomic multi-step writes via `with_transaction`.
//!
//! # Invariants
//! - Only active (`is_deleted=0`) rows are returned.
//! - `find_topic` matches `(name, level, parent_id)` with NULL-aware equality.
//! - Link listing preserves link insertion order.
//! - Entity read paths (linked ids, entity tags) skip rows that fail to decode
//!   and log them instead of failing the whole listing.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::level::{TagKind, TopicLevel, TAG_LEVEL_THRESHOLD};
use crate::model::topic::{EntityId, EntityTopicLink, LinkId, NewTopic, TopicId, TopicNode};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TOPIC_COLUMNS: &str = "id, name, parent_id, level, type, created_at, modified_at, is_deleted";

const TAGS_DEFAULT_LIMIT: u32 = 10;
const TAGS_LIMIT_MAX: u32 = 50;

/// Result type used by topic store operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from topic store operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target topic does not exist or is soft-deleted.
    NotFound(TopicId),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "topic not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid topic data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "topic store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "topic store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "topic store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Selects which active links a bulk unlink touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFilter {
    /// Every link of one entity.
    Entity(EntityId),
    /// Links between one entity and one topic.
    EntityTopic(EntityId, TopicId),
}

/// Filters for hierarchical topic listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicListQuery {
    /// Substring match on the topic name.
    pub name_contains: Option<String>,
    /// Exact level. `None` lists every hierarchical level (`< 100`).
    pub level: Option<TopicLevel>,
    /// Exact parent.
    pub parent_id: Option<TopicId>,
}

/// Filters and paging for flat tag listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagListQuery {
    /// Substring match on the tag name.
    pub name_contains: Option<String>,
    /// Exact tag category. `None` lists every category.
    pub kind: Option<TagKind>,
    /// Maximum rows to return. Defaults to 10 and clamps to 50.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
    /// Oldest first when set; newest first otherwise.
    pub ascending: bool,
}

/// Replacement values for one topic row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicUpdate {
    pub name: String,
    pub parent_id: Option<TopicId>,
    pub level: Option<TopicLevel>,
    pub type_label: Option<String>,
}

/// Storage contract consumed by every taxonomy component.
pub trait TopicStore {
    /// Inserts one topic node and returns its new id.
    fn insert_topic(&self, topic: &NewTopic) -> RepoResult<TopicId>;
    /// Loads one active topic by id.
    fn get_topic(&self, id: TopicId) -> RepoResult<Option<TopicNode>>;
    /// Loads every active topic among `ids`.
    fn list_topics_by_ids(&self, ids: &[TopicId]) -> RepoResult<Vec<TopicNode>>;
    /// Finds the first active topic matching the `(name, level, parent)` triple.
    fn find_topic(
        &self,
        name: &str,
        level: Option<TopicLevel>,
        parent_id: Option<TopicId>,
    ) -> RepoResult<Option<TopicNode>>;
    /// Replaces mutable fields of one active topic and touches `modified_at`.
    fn update_topic(&self, id: TopicId, update: &TopicUpdate) -> RepoResult<()>;
    /// Soft-deletes one topic. Returns whether a row changed.
    fn soft_delete_topic(&self, id: TopicId) -> RepoResult<bool>;
    /// Lists hierarchical topics ordered by level.
    fn list_topics(&self, query: &TopicListQuery) -> RepoResult<Vec<TopicNode>>;
    /// Lists parentless flat tags ordered by creation time.
    fn list_tags(&self, query: &TagListQuery) -> RepoResult<Vec<TopicNode>>;
    /// Lists distinct `(type, level)` pairs of classified active topics,
    /// ordered by level. Pairs with an unknown level code are skipped.
    fn list_topic_types(&self) -> RepoResult<Vec<(String, TopicLevel)>>;
    /// Inserts one link row without checking for an existing one.
    fn insert_link(&self, entity_id: EntityId, topic_id: TopicId) -> RepoResult<LinkId>;
    /// Finds the oldest active link for the pair.
    fn find_link(
        &self,
        entity_id: EntityId,
        topic_id: TopicId,
    ) -> RepoResult<Option<EntityTopicLink>>;
    /// Returns whether an active link exists for the pair.
    fn link_exists(&self, entity_id: EntityId, topic_id: TopicId) -> RepoResult<bool>;
    /// Soft-deletes matching active links. Returns affected row count.
    fn delete_links(&self, filter: LinkFilter) -> RepoResult<usize>;
    /// Lists active links of one entity in insertion order.
    fn list_links(&self, entity_id: EntityId) -> RepoResult<Vec<EntityTopicLink>>;
    /// Lists distinct linked topic ids of one entity in first-link order.
    ///
    /// Link rows whose topic id does not decode are skipped.
    fn list_linked_topic_ids(&self, entity_id: EntityId) -> RepoResult<Vec<TopicId>>;
    /// Lists active linked topics whose raw level is at least `level_threshold`.
    ///
    /// Topic rows that do not decode (unknown level code, bad uuid) are skipped.
    fn list_tags_for_entity(
        &self,
        entity_id: EntityId,
        level_threshold: i64,
    ) -> RepoResult<Vec<TopicNode>>;
    /// Runs `f` atomically. Any error rolls back every write made inside it.
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed topic store.
#[derive(Clone, Copy)]
pub struct SqliteTopicStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicStore<'conn> {
    /// Creates store from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_topic_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TopicStore for SqliteTopicStore<'_> {
    fn insert_topic(&self, topic: &NewTopic) -> RepoResult<TopicId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO topics (id, name, parent_id, level, type, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, 0);",
            params![
                id.to_string(),
                topic.name.as_str(),
                topic.parent_id.map(|value| value.to_string()),
                topic.level.map(TopicLevel::raw),
                topic.type_label.as_deref(),
            ],
        )?;
        Ok(id)
    }

    fn get_topic(&self, id: TopicId) -> RepoResult<Option<TopicNode>> {
        let sql = format!(
            "SELECT {TOPIC_COLUMNS}
             FROM topics
             WHERE id = ?1
               AND is_deleted = 0;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }

    fn list_topics_by_ids(&self, ids: &[TopicId]) -> RepoResult<Vec<TopicNode>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {TOPIC_COLUMNS}
             FROM topics
             WHERE id IN ({placeholders})
               AND is_deleted = 0
             ORDER BY rowid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(ids.iter().map(ToString::to_string)))?;
        collect_topics(&mut rows)
    }

    fn find_topic(
        &self,
        name: &str,
        level: Option<TopicLevel>,
        parent_id: Option<TopicId>,
    ) -> RepoResult<Option<TopicNode>> {
        let sql = format!(
            "SELECT {TOPIC_COLUMNS}
             FROM topics
             WHERE name = ?1
               AND level IS ?2
               AND parent_id IS ?3
               AND is_deleted = 0
             ORDER BY rowid ASC
             LIMIT 1;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![
            name,
            level.map(TopicLevel::raw),
            parent_id.map(|value| value.to_string()),
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }

    fn update_topic(&self, id: TopicId, update: &TopicUpdate) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET name = ?2,
                 parent_id = ?3,
                 level = ?4,
                 type = ?5,
                 modified_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            params![
                id.to_string(),
                update.name.as_str(),
                update.parent_id.map(|value| value.to_string()),
                update.level.map(TopicLevel::raw),
                update.type_label.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn soft_delete_topic(&self, id: TopicId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET is_deleted = 1,
                 modified_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn list_topics(&self, query: &TopicListQuery) -> RepoResult<Vec<TopicNode>> {
        let mut sql = format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE is_deleted = 0");
        let mut bind_values: Vec<Value> = Vec::new();

        match query.level {
            Some(level) => {
                sql.push_str(" AND level = ?");
                bind_values.push(Value::Integer(level.raw()));
            }
            None => {
                sql.push_str(" AND level < ?");
                bind_values.push(Value::Integer(TAG_LEVEL_THRESHOLD));
            }
        }
        if let Some(name) = query.name_contains.as_ref() {
            sql.push_str(" AND instr(name, ?) > 0");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(parent_id) = query.parent_id {
            sql.push_str(" AND parent_id = ?");
            bind_values.push(Value::Text(parent_id.to_string()));
        }
        sql.push_str(" ORDER BY level ASC, rowid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        collect_topics(&mut rows)
    }

    fn list_tags(&self, query: &TagListQuery) -> RepoResult<Vec<TopicNode>> {
        let mut sql = format!(
            "SELECT {TOPIC_COLUMNS} FROM topics WHERE is_deleted = 0 AND parent_id IS NULL"
        );
        let mut bind_values: Vec<Value> = Vec::new();

        match query.kind {
            Some(kind) => {
                sql.push_str(" AND level = ?");
                bind_values.push(Value::Integer(kind.raw()));
            }
            None => {
                sql.push_str(" AND level >= ?");
                bind_values.push(Value::Integer(TAG_LEVEL_THRESHOLD));
            }
        }
        if let Some(name) = query.name_contains.as_ref() {
            sql.push_str(" AND instr(name, ?) > 0");
            bind_values.push(Value::Text(name.clone()));
        }
        if query.ascending {
            sql.push_str(" ORDER BY created_at ASC, rowid ASC");
        } else {
            sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        }
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_tag_limit(query.limit))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        collect_topics(&mut rows)
    }

    fn list_topic_types(&self) -> RepoResult<Vec<(String, TopicLevel)>> {
        let mut stmt = self.conn.prepare(
            "SELECT type, level
             FROM topics
             WHERE type IS NOT NULL
               AND level IS NOT NULL
               AND is_deleted = 0
             GROUP BY type, level
             ORDER BY level ASC, MIN(rowid) ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut types = Vec::new();
        while let Some(row) = rows.next()? {
            let label: String = row.get(0)?;
            let raw: i64 = row.get(1)?;
            match TopicLevel::from_raw(raw) {
                Ok(level) => types.push((label, level)),
                Err(err) => {
                    log::warn!(
                        "event=topic_types module=repo status=degraded type={label} reason={err}"
                    );
                }
            }
        }
        Ok(types)
    }

    fn insert_link(&self, entity_id: EntityId, topic_id: TopicId) -> RepoResult<LinkId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO entity_topic_links (id, entity_id, topic_id, is_deleted)
             VALUES (?1, ?2, ?3, 0);",
            params![id.to_string(), entity_id.to_string(), topic_id.to_string()],
        )?;
        Ok(id)
    }

    fn find_link(
        &self,
        entity_id: EntityId,
        topic_id: TopicId,
    ) -> RepoResult<Option<EntityTopicLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, entity_id, topic_id, created_at, is_deleted
             FROM entity_topic_links
             WHERE entity_id = ?1
               AND topic_id = ?2
               AND is_deleted = 0
             ORDER BY rowid ASC
             LIMIT 1;",
        )?;
        let mut rows = stmt.query([entity_id.to_string(), topic_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_link_row(row)?));
        }
        Ok(None)
    }

    fn link_exists(&self, entity_id: EntityId, topic_id: TopicId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM entity_topic_links
                WHERE entity_id = ?1
                  AND topic_id = ?2
                  AND is_deleted = 0
            );",
            [entity_id.to_string(), topic_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_links(&self, filter: LinkFilter) -> RepoResult<usize> {
        let changed = match filter {
            LinkFilter::Entity(entity_id) => self.conn.execute(
                "UPDATE entity_topic_links
                 SET is_deleted = 1
                 WHERE entity_id = ?1
                   AND is_deleted = 0;",
                [entity_id.to_string()],
            )?,
            LinkFilter::EntityTopic(entity_id, topic_id) => self.conn.execute(
                "UPDATE entity_topic_links
                 SET is_deleted = 1
                 WHERE entity_id = ?1
                   AND topic_id = ?2
                   AND is_deleted = 0;",
                [entity_id.to_string(), topic_id.to_string()],
            )?,
        };
        Ok(changed)
    }

    fn list_links(&self, entity_id: EntityId) -> RepoResult<Vec<EntityTopicLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, entity_id, topic_id, created_at, is_deleted
             FROM entity_topic_links
             WHERE entity_id = ?1
               AND is_deleted = 0
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([entity_id.to_string()])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_link_row(row)?);
        }
        Ok(links)
    }

    fn list_linked_topic_ids(&self, entity_id: EntityId) -> RepoResult<Vec<TopicId>> {
        let mut stmt = self.conn.prepare(
            "SELECT topic_id
             FROM entity_topic_links
             WHERE entity_id = ?1
               AND is_deleted = 0
             GROUP BY topic_id
             ORDER BY MIN(rowid) ASC;",
        )?;
        let mut rows = stmt.query([entity_id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            match parse_uuid(&value, "entity_topic_links.topic_id") {
                Ok(id) => ids.push(id),
                Err(RepoError::InvalidData(message)) => {
                    log::warn!(
                        "event=linked_topics module=repo status=degraded entity_id={entity_id} reason={message}"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Ok(ids)
    }

    fn list_tags_for_entity(
        &self,
        entity_id: EntityId,
        level_threshold: i64,
    ) -> RepoResult<Vec<TopicNode>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                t.id AS id,
                t.name AS name,
                t.parent_id AS parent_id,
                t.level AS level,
                t.type AS type,
                t.created_at AS created_at,
                t.modified_at AS modified_at,
                t.is_deleted AS is_deleted
             FROM topics t
             WHERE t.is_deleted = 0
               AND t.level >= ?2
               AND EXISTS (
                 SELECT 1
                 FROM entity_topic_links l
                 WHERE l.topic_id = t.id
                   AND l.entity_id = ?1
                   AND l.is_deleted = 0
               )
             ORDER BY t.level ASC, t.name ASC, t.rowid ASC;",
        )?;
        let mut rows = stmt.query(params![entity_id.to_string(), level_threshold])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            match parse_topic_row(row) {
                Ok(topic) => tags.push(topic),
                Err(RepoError::InvalidData(message)) => {
                    log::warn!(
                        "event=entity_tags module=repo status=degraded entity_id={entity_id} reason={message}"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Ok(tags)
    }

    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        if !self.conn.is_autocommit() {
            // Caller already demarcated the transaction.
            return f(self);
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = f(self)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

/// Normalizes tag list limit: 0 or absent means 10, values above 50 clamp.
pub fn normalize_tag_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => TAGS_DEFAULT_LIMIT,
        Some(value) => value.min(TAGS_LIMIT_MAX),
    }
}

fn collect_topics(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<TopicNode>> {
    let mut topics = Vec::new();
    while let Some(row) = rows.next()? {
        topics.push(parse_topic_row(row)?);
    }
    Ok(topics)
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<TopicNode> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "topics.id")?;

    let parent_id = row
        .get::<_, Option<String>>("parent_id")?
        .map(|value| parse_uuid(&value, "topics.parent_id"))
        .transpose()?;

    let level = row
        .get::<_, Option<i64>>("level")?
        .map(|raw| {
            TopicLevel::from_raw(raw).map_err(|err| {
                RepoError::InvalidData(format!("{err} in topics.level for topic {id}"))
            })
        })
        .transpose()?;

    Ok(TopicNode {
        id,
        name: row.get("name")?,
        parent_id,
        level,
        type_label: row.get("type")?,
        created_at: row.get("created_at")?,
        modified_at: row.get("modified_at")?,
        is_deleted: parse_deleted_flag(row.get("is_deleted")?, "topics.is_deleted")?,
    })
}

fn parse_link_row(row: &Row<'_>) -> RepoResult<EntityTopicLink> {
    let id_text: String = row.get("id")?;
    let entity_text: String = row.get("entity_id")?;
    let topic_text: String = row.get("topic_id")?;
    Ok(EntityTopicLink {
        id: parse_uuid(&id_text, "entity_topic_links.id")?,
        entity_id: parse_uuid(&entity_text, "entity_topic_links.entity_id")?,
        topic_id: parse_uuid(&topic_text, "entity_topic_links.topic_id")?,
        created_at: row.get("created_at")?,
        is_deleted: parse_deleted_flag(row.get("is_deleted")?, "entity_topic_links.is_deleted")?,
    })
}

fn parse_deleted_flag(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid is_deleted value `{other}` in {column}"
        ))),
    }
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn ensure_topic_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let required: [(&'static str, &[&'static str]); 2] = [
        (
            "topics",
            &[
                "id",
                "name",
                "parent_id",
                "level",
                "type",
                "created_at",
                "modified_at",
                "is_deleted",
            ],
        ),
        (
            "entity_topic_links",
            &["id", "entity_id", "topic_id", "created_at", "is_deleted"],
        ),
    ];

    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1
             FROM sqlite_master
             WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::normalize_tag_limit;

    #[test]
    fn tag_limit_defaults_and_clamps() {
        assert_eq!(normalize_tag_limit(None), 10);
        assert_eq!(normalize_tag_limit(Some(0)), 10);
        assert_eq!(normalize_tag_limit(Some(25)), 25);
        assert_eq!(normalize_tag_limit(Some(500)), 50);
    }
}
