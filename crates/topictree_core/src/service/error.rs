//! Error types shared by taxonomy services.
//!
//! # Invariants
//! - Validation failures are raised before any mutation.
//! - Storage failures inside a write transaction void the whole call.

use crate::model::level::{InvalidLevel, MAX_HIERARCHY_DEPTH};
use crate::model::topic::TopicId;
use crate::repo::topic_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Import node title is blank after cleaning. `path` locates the node as
    /// child indexes from the payload root (empty for the root itself).
    BlankTitle { path: Vec<usize> },
    /// Topic name is blank after trim.
    BlankName,
    /// Chain or payload is nested deeper than a hierarchical level can encode.
    DepthExceeded { depth: usize },
    /// Flat tag levels are only valid on parentless nodes.
    TagWithParent,
    /// Raw level code outside the known ranges.
    InvalidLevel(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle { path } if path.is_empty() => {
                write!(f, "import title must not be blank")
            }
            Self::BlankTitle { path } => {
                write!(f, "import title must not be blank at child path {path:?}")
            }
            Self::BlankName => write!(f, "topic name must not be blank"),
            Self::DepthExceeded { depth } => write!(
                f,
                "hierarchy depth {depth} exceeds maximum level {MAX_HIERARCHY_DEPTH}"
            ),
            Self::TagWithParent => write!(f, "tag levels require a parentless topic"),
            Self::InvalidLevel(raw) => write!(f, "invalid topic level code {raw}"),
        }
    }
}

impl Error for ValidationError {}

impl From<InvalidLevel> for ValidationError {
    fn from(value: InvalidLevel) -> Self {
        Self::InvalidLevel(value.0)
    }
}

/// Errors from taxonomy service operations.
#[derive(Debug)]
pub enum TopicServiceError {
    /// Input failed validation; nothing was written.
    Validation(ValidationError),
    /// Target topic does not exist.
    TopicNotFound(TopicId),
    /// Referenced parent does not exist.
    ParentNotFound(TopicId),
    /// Re-parenting would make a topic its own ancestor.
    CycleDetected {
        topic_id: TopicId,
        parent_id: TopicId,
    },
    /// The hierarchy root anchors every parsed chain and is read-only.
    ProtectedTopic(TopicId),
    /// Import payload text is not a valid `{title, children}` document.
    InvalidImportPayload(String),
    /// Repository-level failure; the enclosing transaction was rolled back.
    Storage(RepoError),
}

impl Display for TopicServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent topic not found: {id}"),
            Self::CycleDetected {
                topic_id,
                parent_id,
            } => write!(
                f,
                "re-parenting would create cycle: topic {topic_id} under parent {parent_id}"
            ),
            Self::ProtectedTopic(id) => {
                write!(f, "topic {id} is the hierarchy root and cannot be modified")
            }
            Self::InvalidImportPayload(message) => {
                write!(f, "invalid import payload: {message}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TopicServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for TopicServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TopicServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(topic_id) => Self::TopicNotFound(topic_id),
            other => Self::Storage(other),
        }
    }
}
