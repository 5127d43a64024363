//! Taxonomy use-case services.
//!
//! # Responsibility
//! - Orchestrate [`crate::repo::topic_repo::TopicStore`] calls into the
//!   parse, import, link, ancestry, path, tree and admin use-cases.
//! - Keep the CLI and other callers decoupled from storage details.

pub mod ancestry;
pub mod error;
pub mod hierarchy_import;
pub mod link_service;
pub mod path_service;
pub mod subject_parser;
pub mod topic_service;
pub mod tree_service;
