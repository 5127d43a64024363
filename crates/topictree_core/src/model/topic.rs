//! Topic node, entity link and read models.
//!
//! # Responsibility
//! - Define the canonical topic record shared by hierarchy and tag use-cases.
//! - Define the import payload and the path/tree projections handed to
//!   indexing and display collaborators.
//!
//! # Invariants
//! - A node is hierarchical when its level is [`TopicLevel::Hierarchical`].
//! - A node is a flat tag when it has no parent and a [`TopicLevel::Tag`] level.
//! - The ROOT sentinel has neither, so traversals stop at it.

use crate::model::level::TopicLevel;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one topic node.
pub type TopicId = Uuid;

/// Identifier of a cataloged entity (book/document) owned by another service.
pub type EntityId = Uuid;

/// Stable identifier of one entity-topic link row.
pub type LinkId = Uuid;

/// Well-known sentinel every parsed subject-heading chain hangs under.
///
/// Seeded by migration 2 with `parent_id NULL` and `level NULL`.
pub const ROOT_TOPIC_ID: TopicId = Uuid::from_u128(1);

/// Persisted topic node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicNode {
    pub id: TopicId,
    pub name: String,
    /// `None` for roots, flat tags and the ROOT sentinel.
    pub parent_id: Option<TopicId>,
    /// `None` only for unclassified rows such as the ROOT sentinel.
    pub level: Option<TopicLevel>,
    /// Optional free-form label; serialized as `type` to match storage naming.
    #[serde(rename = "type")]
    pub type_label: Option<String>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub modified_at: i64,
    pub is_deleted: bool,
}

impl TopicNode {
    /// Returns whether traversal code should treat this node as part of the
    /// subject hierarchy.
    pub fn is_hierarchical(&self) -> bool {
        matches!(self.level, Some(TopicLevel::Hierarchical(_)))
    }

    /// Returns whether this node is a flat tag.
    pub fn is_tag(&self) -> bool {
        self.parent_id.is_none() && self.level.is_some_and(TopicLevel::is_tag)
    }

    /// Hierarchical depth, when the node belongs to the hierarchy.
    pub fn depth(&self) -> Option<u8> {
        self.level.and_then(TopicLevel::depth)
    }
}

/// Write model for inserting one topic node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopic {
    pub name: String,
    pub parent_id: Option<TopicId>,
    pub level: Option<TopicLevel>,
    pub type_label: Option<String>,
}

impl NewTopic {
    /// Draft for a hierarchical node under `parent_id`.
    pub fn hierarchical(
        name: impl Into<String>,
        parent_id: Option<TopicId>,
        level: TopicLevel,
    ) -> Self {
        Self {
            name: name.into(),
            parent_id,
            level: Some(level),
            type_label: None,
        }
    }

    /// Applies the parentless-node default: no parent and no level means a
    /// generic flat tag.
    pub fn with_default_level(mut self) -> Self {
        if self.parent_id.is_none() && self.level.is_none() {
            self.level = Some(TopicLevel::DEFAULT_TAG);
        }
        self
    }
}

/// Persisted association between an entity and a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTopicLink {
    pub id: LinkId,
    pub entity_id: EntityId,
    pub topic_id: TopicId,
    pub created_at: i64,
    pub is_deleted: bool,
}

/// Curated nested taxonomy payload accepted by the hierarchy importer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicImport {
    pub title: String,
    #[serde(default)]
    pub children: Vec<TopicImport>,
}

impl TopicImport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TopicImport>) -> Self {
        self.children = children;
        self
    }
}

/// Label stored on topics of level `level`, offered as a picker option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicType {
    pub value: String,
    pub label: String,
    pub level: i64,
}

impl TopicType {
    /// Option offered before any topic carries a type label.
    pub fn fallback() -> Self {
        Self {
            value: "通用标签".to_string(),
            label: "自定义标签".to_string(),
            level: TopicLevel::DEFAULT_TAG.raw(),
        }
    }
}

/// Formatted ancestry of one topic linked to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPath {
    pub topic_id: TopicId,
    /// Node names from root to leaf joined with `" > "`.
    pub path: String,
    /// Zero-based depth of the leaf within its chain.
    pub level_size: usize,
}

/// Display tree node assembled for one entity's topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTreeNode {
    pub id: TopicId,
    pub name: String,
    pub parent_id: Option<TopicId>,
    pub level: u8,
    pub children: Vec<TopicTreeNode>,
}
