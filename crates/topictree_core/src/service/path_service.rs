//! Human-readable topic paths for search indexing.
//!
//! # Responsibility
//! - Format the ancestry of every topic linked to an entity as `A > B > C`.
//! - Report the zero-based depth (`level_size`) used for facet bucketing.
//!
//! # Invariants
//! - Topics whose ancestry resolves empty (tags, sentinels, orphans) are omitted.
//! - No depth cap is applied here; facet consumers drop `level_size > 4`.

use crate::model::topic::{EntityId, TopicId, TopicNode, TopicPath};
use crate::repo::topic_repo::{RepoResult, TopicStore};
use crate::service::ancestry::{walk_ancestors, DEFAULT_MAX_ANCESTRY_DEPTH};
use log::debug;

/// Separator placed between node names in a formatted path.
pub const PATH_SEPARATOR: &str = " > ";

/// Formats ancestry chains for topics linked to one entity.
pub struct PathFormatter<S: TopicStore> {
    store: S,
    max_depth: usize,
}

impl<S: TopicStore> PathFormatter<S> {
    pub fn new(store: S) -> Self {
        Self::with_max_depth(store, DEFAULT_MAX_ANCESTRY_DEPTH)
    }

    pub fn with_max_depth(store: S, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    /// Returns one path per linked hierarchical topic, in link order.
    pub fn get_entity_topic_paths(&self, entity_id: EntityId) -> RepoResult<Vec<TopicPath>> {
        collect_entity_paths(&self.store, entity_id, self.max_depth)
    }
}

pub(crate) fn collect_entity_paths<S: TopicStore>(
    store: &S,
    entity_id: EntityId,
    max_depth: usize,
) -> RepoResult<Vec<TopicPath>> {
    let topic_ids = store.list_linked_topic_ids(entity_id)?;
    let mut paths = Vec::with_capacity(topic_ids.len());
    for topic_id in &topic_ids {
        let walk = walk_ancestors(store, *topic_id, max_depth)?;
        if let Some(path) = format_path(*topic_id, &walk.nodes) {
            paths.push(path);
        }
    }
    debug!(
        "event=topic_paths module=path status=ok entity_id={} linked={} paths={}",
        entity_id,
        topic_ids.len(),
        paths.len()
    );
    Ok(paths)
}

/// Joins a root-first chain into a [`TopicPath`]. `None` for an empty chain.
pub fn format_path(topic_id: TopicId, ancestors: &[TopicNode]) -> Option<TopicPath> {
    if ancestors.is_empty() {
        return None;
    }
    let path = ancestors
        .iter()
        .map(|node| node.name.as_str())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR);
    Some(TopicPath {
        topic_id,
        path,
        level_size: ancestors.len() - 1,
    })
}
