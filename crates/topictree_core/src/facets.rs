//! Search facet projection.
//!
//! Buckets an entity's formatted topic paths by depth into `lvl0..lvl4` and
//! collects its flat tag names, ready for a hierarchical-facet search index.

use crate::model::topic::{EntityId, TopicNode, TopicPath};
use crate::repo::topic_repo::{RepoResult, TopicStore};
use crate::service::ancestry::DEFAULT_MAX_ANCESTRY_DEPTH;
use crate::service::link_service::tags_for_entity;
use crate::service::path_service::collect_entity_paths;
use log::debug;
use serde::Serialize;

/// Deepest `level_size` a facet bucket exists for.
pub const MAX_FACET_LEVEL: usize = 4;

/// Facet document fragment for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopicFacets {
    pub lvl0: Vec<String>,
    pub lvl1: Vec<String>,
    pub lvl2: Vec<String>,
    pub lvl3: Vec<String>,
    pub lvl4: Vec<String>,
    pub tags: Vec<String>,
}

impl TopicFacets {
    /// Buckets `paths` by `level_size`, dropping anything deeper than
    /// [`MAX_FACET_LEVEL`]. Duplicate paths are kept once.
    pub fn from_parts(paths: &[TopicPath], tags: &[TopicNode]) -> Self {
        let mut facets = Self::default();
        for path in paths {
            if let Some(bucket) = facets.bucket_mut(path.level_size) {
                if !bucket.contains(&path.path) {
                    bucket.push(path.path.clone());
                }
            }
        }
        for tag in tags {
            if !facets.tags.contains(&tag.name) {
                facets.tags.push(tag.name.clone());
            }
        }
        facets
    }

    fn bucket_mut(&mut self, level_size: usize) -> Option<&mut Vec<String>> {
        match level_size {
            0 => Some(&mut self.lvl0),
            1 => Some(&mut self.lvl1),
            2 => Some(&mut self.lvl2),
            3 => Some(&mut self.lvl3),
            4 => Some(&mut self.lvl4),
            _ => None,
        }
    }
}

/// Projects stored links of one entity into [`TopicFacets`].
pub struct FacetProjector<S: TopicStore> {
    store: S,
    max_depth: usize,
}

impl<S: TopicStore> FacetProjector<S> {
    pub fn new(store: S) -> Self {
        Self::with_max_depth(store, DEFAULT_MAX_ANCESTRY_DEPTH)
    }

    pub fn with_max_depth(store: S, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    pub fn project(&self, entity_id: EntityId) -> RepoResult<TopicFacets> {
        let paths = collect_entity_paths(&self.store, entity_id, self.max_depth)?;
        let tags = tags_for_entity(&self.store, entity_id)?;
        let dropped = paths
            .iter()
            .filter(|path| path.level_size > MAX_FACET_LEVEL)
            .count();
        debug!(
            "event=facet_project module=facets status=ok entity_id={} paths={} tags={} dropped={}",
            entity_id,
            paths.len(),
            tags.len(),
            dropped
        );
        Ok(TopicFacets::from_parts(&paths, &tags))
    }
}

#[cfg(test)]
mod tests {
    use super::TopicFacets;
    use crate::model::level::{TagKind, TopicLevel};
    use crate::model::topic::{TopicNode, TopicPath};
    use uuid::Uuid;

    fn path(text: &str, level_size: usize) -> TopicPath {
        TopicPath {
            topic_id: Uuid::new_v4(),
            path: text.to_string(),
            level_size,
        }
    }

    #[test]
    fn paths_bucket_by_depth_and_deep_paths_drop() {
        let paths = vec![
            path("A", 0),
            path("A > B", 1),
            path("A > B", 1),
            path("A > B > C > D > E", 4),
            path("A > B > C > D > E > F", 5),
        ];
        let tag = TopicNode {
            id: Uuid::new_v4(),
            name: "教材".to_string(),
            parent_id: None,
            level: Some(TopicLevel::Tag(TagKind::DocumentType)),
            type_label: None,
            created_at: 0,
            modified_at: 0,
            is_deleted: false,
        };

        let facets = TopicFacets::from_parts(&paths, &[tag]);
        assert_eq!(facets.lvl0, vec!["A"]);
        assert_eq!(facets.lvl1, vec!["A > B"]);
        assert!(facets.lvl2.is_empty());
        assert_eq!(facets.lvl4, vec!["A > B > C > D > E"]);
        assert_eq!(facets.tags, vec!["教材"]);
    }
}
