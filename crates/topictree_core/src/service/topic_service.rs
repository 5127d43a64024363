//! Topic administration use-cases.
//!
//! # Responsibility
//! - Create, edit, soft-delete and list topic nodes outside the parse/import
//!   flows.
//! - Enforce the level defaulting rule and parent integrity on every write.
//!
//! # Invariants
//! - Parentless drafts without a level become generic flat tags.
//! - Tag levels are only accepted on parentless nodes.
//! - Re-parenting never makes a node its own ancestor.
//! - The ROOT sentinel (and a configured hierarchy root) is never edited or
//!   deleted through this facade.

use crate::model::level::{TagKind, TopicLevel};
use crate::model::topic::{NewTopic, TopicId, TopicNode, TopicType, ROOT_TOPIC_ID};
use crate::repo::topic_repo::{
    normalize_tag_limit, RepoResult, TagListQuery, TopicListQuery, TopicStore, TopicUpdate,
};
use crate::service::ancestry::{walk_ancestors, DEFAULT_MAX_ANCESTRY_DEPTH};
use crate::service::error::{TopicServiceError, ValidationError};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashSet;

/// One page of flat tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagPage {
    pub items: Vec<TopicNode>,
    /// Limit actually applied after defaulting and clamping.
    pub limit: u32,
    pub offset: u32,
}

/// Administrative topic facade.
pub struct TopicService<S: TopicStore> {
    store: S,
    max_depth: usize,
    root_topic_id: TopicId,
}

impl<S: TopicStore> TopicService<S> {
    pub fn new(store: S) -> Self {
        Self::with_max_depth(store, DEFAULT_MAX_ANCESTRY_DEPTH)
    }

    pub fn with_max_depth(store: S, max_depth: usize) -> Self {
        Self {
            store,
            max_depth,
            root_topic_id: ROOT_TOPIC_ID,
        }
    }

    /// Protects `root_topic_id` in addition to the ROOT sentinel.
    pub fn with_root_topic(mut self, root_topic_id: TopicId) -> Self {
        self.root_topic_id = root_topic_id;
        self
    }

    /// Creates one topic from `draft` and returns the stored row.
    pub fn create_topic(&self, draft: NewTopic) -> Result<TopicNode, TopicServiceError> {
        let draft = normalize_draft(draft)?;
        self.store.with_transaction(|store| {
            if let Some(parent_id) = draft.parent_id {
                ensure_parent_exists(store, parent_id)?;
            }
            let topic_id = store.insert_topic(&draft)?;
            info!(
                "event=topic_admin module=topic status=ok action=create topic_id={} level={:?}",
                topic_id,
                draft.level.map(TopicLevel::raw)
            );
            read_back(store, topic_id)
        })
    }

    /// Replaces name, parent, level and type of one topic.
    pub fn update_topic(
        &self,
        topic_id: TopicId,
        changes: NewTopic,
    ) -> Result<TopicNode, TopicServiceError> {
        self.ensure_mutable(topic_id)?;
        let changes = normalize_draft(changes)?;
        self.store.with_transaction(|store| {
            store
                .get_topic(topic_id)?
                .ok_or(TopicServiceError::TopicNotFound(topic_id))?;

            if let Some(parent_id) = changes.parent_id {
                if parent_id == topic_id || would_create_cycle(store, topic_id, parent_id)? {
                    return Err(TopicServiceError::CycleDetected {
                        topic_id,
                        parent_id,
                    });
                }
            }

            store.update_topic(
                topic_id,
                &TopicUpdate {
                    name: changes.name,
                    parent_id: changes.parent_id,
                    level: changes.level,
                    type_label: changes.type_label,
                },
            )?;
            info!(
                "event=topic_admin module=topic status=ok action=update topic_id={}",
                topic_id
            );
            read_back(store, topic_id)
        })
    }

    /// Soft-deletes one topic. Links and children are left untouched.
    pub fn delete_topic(&self, topic_id: TopicId) -> Result<bool, TopicServiceError> {
        self.ensure_mutable(topic_id)?;
        let changed = self.store.soft_delete_topic(topic_id)?;
        info!(
            "event=topic_admin module=topic status=ok action=delete topic_id={} changed={}",
            topic_id, changed
        );
        Ok(changed)
    }

    /// Creates one parentless tag of `kind` per name in a single transaction.
    /// Names are trimmed and not deduplicated; any blank name rejects the batch.
    pub fn import_tags(
        &self,
        names: &[String],
        kind: TagKind,
    ) -> Result<usize, TopicServiceError> {
        let drafts = names
            .iter()
            .map(|name| {
                normalize_draft(NewTopic {
                    name: name.clone(),
                    parent_id: None,
                    level: Some(TopicLevel::Tag(kind)),
                    type_label: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let imported = self.store.with_transaction(|store| {
            for draft in &drafts {
                store.insert_topic(draft)?;
            }
            Ok::<_, TopicServiceError>(drafts.len())
        })?;
        info!(
            "event=topic_admin module=topic status=ok action=import_tags level={} count={}",
            kind.raw(),
            imported
        );
        Ok(imported)
    }

    /// Lists the distinct type labels in use, ordered by level. Falls back to
    /// a single generic option when no topic carries a label.
    pub fn list_topic_types(&self) -> RepoResult<Vec<TopicType>> {
        let types: Vec<TopicType> = self
            .store
            .list_topic_types()?
            .into_iter()
            .map(|(label, level)| TopicType {
                value: label.clone(),
                label,
                level: level.raw(),
            })
            .collect();
        if types.is_empty() {
            return Ok(vec![TopicType::fallback()]);
        }
        Ok(types)
    }

    pub fn get_topic(&self, topic_id: TopicId) -> Result<Option<TopicNode>, TopicServiceError> {
        Ok(self.store.get_topic(topic_id)?)
    }

    /// Returns the root-first hierarchical chain ending at `topic_id`.
    pub fn get_topic_with_parents(&self, topic_id: TopicId) -> RepoResult<Vec<TopicNode>> {
        Ok(walk_ancestors(&self.store, topic_id, self.max_depth)?.nodes)
    }

    /// Lists hierarchical topics ordered by level.
    pub fn list_topics(&self, query: &TopicListQuery) -> RepoResult<Vec<TopicNode>> {
        self.store.list_topics(query)
    }

    /// Lists one page of parentless flat tags.
    pub fn list_tags(&self, query: &TagListQuery) -> RepoResult<TagPage> {
        let items = self.store.list_tags(query)?;
        Ok(TagPage {
            items,
            limit: normalize_tag_limit(query.limit),
            offset: query.offset,
        })
    }

    fn ensure_mutable(&self, topic_id: TopicId) -> Result<(), TopicServiceError> {
        if topic_id == ROOT_TOPIC_ID || topic_id == self.root_topic_id {
            warn!(
                "event=topic_admin module=topic status=rejected topic_id={} reason=protected_root",
                topic_id
            );
            return Err(TopicServiceError::ProtectedTopic(topic_id));
        }
        Ok(())
    }
}

fn normalize_draft(draft: NewTopic) -> Result<NewTopic, ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::BlankName);
    }
    let draft = NewTopic {
        name: name.to_string(),
        ..draft
    }
    .with_default_level();

    if draft.parent_id.is_some() && draft.level.is_some_and(TopicLevel::is_tag) {
        return Err(ValidationError::TagWithParent);
    }
    Ok(draft)
}

fn ensure_parent_exists<S: TopicStore>(
    store: &S,
    parent_id: TopicId,
) -> Result<(), TopicServiceError> {
    store
        .get_topic(parent_id)?
        .map(|_| ())
        .ok_or(TopicServiceError::ParentNotFound(parent_id))
}

fn read_back<S: TopicStore>(store: &S, topic_id: TopicId) -> Result<TopicNode, TopicServiceError> {
    store
        .get_topic(topic_id)?
        .ok_or(TopicServiceError::TopicNotFound(topic_id))
}

/// Walks up from `candidate_parent_id`; reaching `topic_id` or revisiting a
/// node means the move would close a loop.
fn would_create_cycle<S: TopicStore>(
    store: &S,
    topic_id: TopicId,
    candidate_parent_id: TopicId,
) -> Result<bool, TopicServiceError> {
    let mut visited = HashSet::new();
    let mut cursor = Some(candidate_parent_id);
    while let Some(current) = cursor {
        if current == topic_id || !visited.insert(current) {
            return Ok(true);
        }
        let node = store
            .get_topic(current)?
            .ok_or(TopicServiceError::ParentNotFound(current))?;
        cursor = node.parent_id;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::normalize_draft;
    use crate::model::level::{TagKind, TopicLevel};
    use crate::model::topic::{NewTopic, ROOT_TOPIC_ID};
    use crate::service::error::ValidationError;

    fn draft(name: &str, parent: bool, level: Option<TopicLevel>) -> NewTopic {
        NewTopic {
            name: name.to_string(),
            parent_id: parent.then_some(ROOT_TOPIC_ID),
            level,
            type_label: None,
        }
    }

    #[test]
    fn names_are_trimmed_and_blank_names_rejected() {
        let normalized = normalize_draft(draft("  刑法 ", false, None)).unwrap();
        assert_eq!(normalized.name, "刑法");
        assert_eq!(normalized.level, Some(TopicLevel::Tag(TagKind::Generic)));
        assert_eq!(
            normalize_draft(draft("  ", false, None)),
            Err(ValidationError::BlankName)
        );
    }

    #[test]
    fn tag_level_under_parent_is_rejected() {
        let tagged = draft("x", true, Some(TopicLevel::Tag(TagKind::DocumentType)));
        assert_eq!(normalize_draft(tagged), Err(ValidationError::TagWithParent));
        let child = draft("x", true, Some(TopicLevel::Hierarchical(1)));
        assert!(normalize_draft(child).is_ok());
    }
}
