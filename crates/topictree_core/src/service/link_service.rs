//! Entity-topic association use-cases.
//!
//! # Responsibility
//! - Add and remove entity links idempotently.
//! - Answer tag-only queries for one entity.
//!
//! # Invariants
//! - At most one active link exists per `(entity, topic)` pair created here.
//! - Removal is a soft delete.

use crate::model::level::TAG_LEVEL_THRESHOLD;
use crate::model::topic::{EntityId, LinkId, TopicId, TopicNode};
use crate::repo::topic_repo::{LinkFilter, RepoResult, TopicStore};
use log::info;

/// Idempotent link maintenance between entities and topics.
pub struct EntityTopicLinker<S: TopicStore> {
    store: S,
}

impl<S: TopicStore> EntityTopicLinker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Links `entity_id` to `topic_id`, returning the existing link id when
    /// an active link is already present.
    pub fn add_link(&self, entity_id: EntityId, topic_id: TopicId) -> RepoResult<LinkId> {
        let (link_id, _) = add_link_in(&self.store, entity_id, topic_id)?;
        Ok(link_id)
    }

    /// Soft-deletes the active link(s) for the pair. Returns whether any row
    /// changed.
    pub fn remove_link(&self, entity_id: EntityId, topic_id: TopicId) -> RepoResult<bool> {
        let changed = self
            .store
            .delete_links(LinkFilter::EntityTopic(entity_id, topic_id))?;
        info!(
            "event=topic_unlink module=link status=ok entity_id={} topic_id={} changed={}",
            entity_id, topic_id, changed
        );
        Ok(changed > 0)
    }

    /// Soft-deletes every active link of the entity.
    pub fn remove_all_links(&self, entity_id: EntityId) -> RepoResult<bool> {
        let changed = self.store.delete_links(LinkFilter::Entity(entity_id))?;
        info!(
            "event=topic_unlink_all module=link status=ok entity_id={} changed={}",
            entity_id, changed
        );
        Ok(changed > 0)
    }

    /// Returns linked flat tags (`level >= 100`) only.
    pub fn get_tags_for_entity(&self, entity_id: EntityId) -> RepoResult<Vec<TopicNode>> {
        tags_for_entity(&self.store, entity_id)
    }
}

/// Find-before-insert link creation. The flag is `true` when a row was added.
pub(crate) fn add_link_in<S: TopicStore>(
    store: &S,
    entity_id: EntityId,
    topic_id: TopicId,
) -> RepoResult<(LinkId, bool)> {
    if let Some(existing) = store.find_link(entity_id, topic_id)? {
        return Ok((existing.id, false));
    }
    let link_id = store.insert_link(entity_id, topic_id)?;
    info!(
        "event=topic_link module=link status=ok entity_id={} topic_id={} link_id={}",
        entity_id, topic_id, link_id
    );
    Ok((link_id, true))
}

pub(crate) fn tags_for_entity<S: TopicStore>(
    store: &S,
    entity_id: EntityId,
) -> RepoResult<Vec<TopicNode>> {
    store.list_tags_for_entity(entity_id, TAG_LEVEL_THRESHOLD)
}
