//! Ancestry resolution over parent links.
//!
//! # Responsibility
//! - Walk `parent_id` links upward and return the root-to-node chain.
//! - Degrade gracefully on corrupt data instead of failing or looping.
//!
//! # Invariants
//! - Only hierarchical nodes appear in a chain.
//! - A walk never revisits an id and never exceeds its depth bound.
//! - Malformed or orphaned rows end the walk; only storage failures propagate.

use crate::model::topic::{TopicId, TopicNode};
use crate::repo::topic_repo::{RepoError, RepoResult, TopicStore};
use log::warn;
use std::collections::{HashSet, VecDeque};

/// Default bound on chain length. Hierarchical levels stop at 99.
pub const DEFAULT_MAX_ANCESTRY_DEPTH: usize = 100;

/// Data problem that cut an ancestry walk short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// Parent links loop back to an id already in the chain.
    Cycle { repeated: TopicId },
    /// Chain reached the configured bound with parents still pending.
    DepthLimit { limit: usize },
    /// A parent id points at a missing or soft-deleted topic.
    DanglingParent { parent_id: TopicId },
    /// A row on the path could not be decoded.
    InvalidRow { topic_id: TopicId, message: String },
}

impl IntegrityIssue {
    fn code(&self) -> &'static str {
        match self {
            Self::Cycle { .. } => "cycle",
            Self::DepthLimit { .. } => "depth_limit",
            Self::DanglingParent { .. } => "dangling_parent",
            Self::InvalidRow { .. } => "invalid_row",
        }
    }
}

/// Root-to-node chain plus the reason the walk stopped early, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AncestryWalk {
    pub nodes: Vec<TopicNode>,
    pub issue: Option<IntegrityIssue>,
}

/// Resolves ancestor chains for single topics.
pub struct AncestryResolver<S: TopicStore> {
    store: S,
    max_depth: usize,
}

impl<S: TopicStore> AncestryResolver<S> {
    pub fn new(store: S) -> Self {
        Self::with_max_depth(store, DEFAULT_MAX_ANCESTRY_DEPTH)
    }

    pub fn with_max_depth(store: S, max_depth: usize) -> Self {
        Self {
            store,
            max_depth: max_depth.max(1),
        }
    }

    /// Returns hierarchical ancestors of `topic_id` ordered root first,
    /// ending with the topic itself. Empty when the topic is missing or is
    /// not hierarchical.
    pub fn get_ancestors(&self, topic_id: TopicId) -> RepoResult<Vec<TopicNode>> {
        Ok(self.walk(topic_id)?.nodes)
    }

    /// Same walk as [`Self::get_ancestors`], also reporting integrity issues.
    pub fn walk(&self, topic_id: TopicId) -> RepoResult<AncestryWalk> {
        walk_ancestors(&self.store, topic_id, self.max_depth)
    }
}

pub(crate) fn walk_ancestors<S: TopicStore>(
    store: &S,
    topic_id: TopicId,
    max_depth: usize,
) -> RepoResult<AncestryWalk> {
    let start = match load(store, topic_id)? {
        Loaded::Node(node) if node.is_hierarchical() => node,
        Loaded::Node(_) | Loaded::Missing => return Ok(AncestryWalk::default()),
        Loaded::Invalid(message) => {
            return Ok(degraded(
                topic_id,
                Vec::new(),
                IntegrityIssue::InvalidRow { topic_id, message },
            ))
        }
    };

    let mut visited = HashSet::from([start.id]);
    let mut cursor = start.parent_id;
    let mut chain = VecDeque::from([start]);

    while let Some(parent_id) = cursor {
        if chain.len() >= max_depth {
            let issue = IntegrityIssue::DepthLimit { limit: max_depth };
            return Ok(degraded(topic_id, chain.into(), issue));
        }
        if !visited.insert(parent_id) {
            let issue = IntegrityIssue::Cycle {
                repeated: parent_id,
            };
            return Ok(degraded(topic_id, chain.into(), issue));
        }

        match load(store, parent_id)? {
            Loaded::Node(parent) if parent.is_hierarchical() => {
                cursor = parent.parent_id;
                chain.push_front(parent);
            }
            // Sentinels and tags terminate the chain without being part of it.
            Loaded::Node(_) => break,
            Loaded::Missing => {
                let issue = IntegrityIssue::DanglingParent { parent_id };
                return Ok(degraded(topic_id, chain.into(), issue));
            }
            Loaded::Invalid(message) => {
                let issue = IntegrityIssue::InvalidRow {
                    topic_id: parent_id,
                    message,
                };
                return Ok(degraded(topic_id, chain.into(), issue));
            }
        }
    }

    Ok(AncestryWalk {
        nodes: chain.into(),
        issue: None,
    })
}

enum Loaded {
    Node(TopicNode),
    Missing,
    Invalid(String),
}

fn load<S: TopicStore>(store: &S, topic_id: TopicId) -> RepoResult<Loaded> {
    match store.get_topic(topic_id) {
        Ok(Some(node)) => Ok(Loaded::Node(node)),
        Ok(None) => Ok(Loaded::Missing),
        Err(RepoError::InvalidData(message)) => Ok(Loaded::Invalid(message)),
        Err(err) => Err(err),
    }
}

fn degraded(topic_id: TopicId, nodes: Vec<TopicNode>, issue: IntegrityIssue) -> AncestryWalk {
    warn!(
        "event=ancestry_walk module=ancestry status=degraded topic_id={} issue={} kept={}",
        topic_id,
        issue.code(),
        nodes.len()
    );
    AncestryWalk {
        nodes,
        issue: Some(issue),
    }
}
