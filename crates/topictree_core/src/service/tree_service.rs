//! Per-entity topic forest assembly for display.
//!
//! # Responsibility
//! - Collect the hierarchical ancestors of every topic linked to an entity.
//! - Group the collected node set by `parent_id` into owned display trees.
//!
//! # Invariants
//! - Nodes whose parent is outside the collected set become forest roots.
//! - Unrelated subject chains stay separate roots; nothing is merged.
//! - Sibling order follows first appearance in link order.

use crate::model::topic::{EntityId, TopicId, TopicNode, TopicTreeNode};
use crate::repo::topic_repo::{RepoResult, TopicStore};
use crate::service::ancestry::{walk_ancestors, DEFAULT_MAX_ANCESTRY_DEPTH};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Builds topic forests for entities.
pub struct TreeAssembler<S: TopicStore> {
    store: S,
    max_depth: usize,
}

impl<S: TopicStore> TreeAssembler<S> {
    pub fn new(store: S) -> Self {
        Self::with_max_depth(store, DEFAULT_MAX_ANCESTRY_DEPTH)
    }

    pub fn with_max_depth(store: S, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    /// Returns the forest of hierarchical topics reachable from the entity's
    /// links. Empty when the entity only carries tags or nothing at all.
    pub fn get_entity_topic_tree(&self, entity_id: EntityId) -> RepoResult<Vec<TopicTreeNode>> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for topic_id in self.store.list_linked_topic_ids(entity_id)? {
            let walk = walk_ancestors(&self.store, topic_id, self.max_depth)?;
            nodes.extend(walk.nodes.into_iter().filter(|node| seen.insert(node.id)));
        }

        let node_count = nodes.len();
        let forest = assemble_forest(nodes);
        debug!(
            "event=topic_tree module=tree status=ok entity_id={} nodes={} roots={}",
            entity_id,
            node_count,
            forest.len()
        );
        Ok(forest)
    }
}

/// Groups a flat node set into trees by `parent_id`.
///
/// Nodes caught in a parent cycle with no member outside the cycle have no
/// root to hang from and are left out.
pub fn assemble_forest(nodes: Vec<TopicNode>) -> Vec<TopicTreeNode> {
    let present: HashSet<TopicId> = nodes.iter().map(|node| node.id).collect();
    let mut children_of: HashMap<TopicId, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (index, node) in nodes.iter().enumerate() {
        match node.parent_id {
            Some(parent_id) if parent_id != node.id && present.contains(&parent_id) => {
                children_of.entry(parent_id).or_default().push(index);
            }
            _ => roots.push(index),
        }
    }

    roots
        .into_iter()
        .map(|index| build_tree(index, &nodes, &children_of))
        .collect()
}

fn build_tree(
    index: usize,
    nodes: &[TopicNode],
    children_of: &HashMap<TopicId, Vec<usize>>,
) -> TopicTreeNode {
    let node = &nodes[index];
    let children = children_of
        .get(&node.id)
        .map(|indexes| {
            indexes
                .iter()
                .map(|child| build_tree(*child, nodes, children_of))
                .collect()
        })
        .unwrap_or_default();

    TopicTreeNode {
        id: node.id,
        name: node.name.clone(),
        parent_id: node.parent_id,
        level: node.depth().unwrap_or_default(),
        children,
    }
}
