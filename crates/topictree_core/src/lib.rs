//! Topic hierarchy and subject-heading engine.
//!
//! Maintains a catalog-wide subject taxonomy in SQLite, turns subject-heading
//! strings into hierarchical topic chains, links cataloged entities to topics,
//! and reconstructs per-entity paths, trees and search facets.

pub mod config;
pub mod db;
pub mod facets;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, EngineConfig, LoggingConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use facets::{FacetProjector, TopicFacets};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::level::{TagKind, TopicLevel};
pub use model::topic::{
    EntityId, EntityTopicLink, LinkId, NewTopic, TopicId, TopicImport, TopicNode, TopicPath,
    TopicTreeNode, TopicType, ROOT_TOPIC_ID,
};
pub use repo::topic_repo::{
    LinkFilter, RepoError, RepoResult, SqliteTopicStore, TagListQuery, TopicListQuery,
    TopicStore, TopicUpdate,
};
pub use service::ancestry::{AncestryResolver, AncestryWalk, IntegrityIssue};
pub use service::error::{TopicServiceError, ValidationError};
pub use service::hierarchy_import::{parse_import_payload, HierarchyImporter};
pub use service::link_service::EntityTopicLinker;
pub use service::path_service::PathFormatter;
pub use service::subject_parser::{ParseReport, SubjectHeadingParser};
pub use service::topic_service::{TagPage, TopicService};
pub use service::tree_service::TreeAssembler;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
