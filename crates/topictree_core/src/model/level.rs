//! Typed level code for topic nodes.
//!
//! Storage keeps a single nullable integer that doubles as hierarchical depth
//! (`0..=99`) and flat-tag category (`100..=103`). Core code works with
//! [`TopicLevel`]; the raw integer only exists in the SQLite row codec.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Deepest hierarchical level that can be represented.
pub const MAX_HIERARCHY_DEPTH: u8 = 99;

/// Lowest raw level value reserved for flat tags.
pub const TAG_LEVEL_THRESHOLD: i64 = 100;

/// Category of a flat (non-hierarchical) tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// Free-form custom tag (raw 100).
    Generic,
    /// Document/book type tag (raw 101).
    DocumentType,
    /// Practice-subject tag (raw 102).
    PracticeSubject,
    /// Any other classification (raw 103).
    Other,
}

impl TagKind {
    /// Returns the raw storage value for this category.
    pub fn raw(self) -> i64 {
        match self {
            Self::Generic => 100,
            Self::DocumentType => 101,
            Self::PracticeSubject => 102,
            Self::Other => 103,
        }
    }

    /// Decodes a raw tag category, rejecting hierarchical and unknown codes.
    pub fn from_raw(raw: i64) -> Result<Self, InvalidLevel> {
        match TopicLevel::from_raw(raw)? {
            TopicLevel::Tag(kind) => Ok(kind),
            TopicLevel::Hierarchical(_) => Err(InvalidLevel(raw)),
        }
    }
}

/// Classification of one topic node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum TopicLevel {
    /// Node inside the subject hierarchy at the given depth.
    Hierarchical(u8),
    /// Flat tag outside the hierarchy.
    Tag(TagKind),
}

/// Raw level value that has no [`TopicLevel`] meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLevel(pub i64);

impl Display for InvalidLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid topic level code {}", self.0)
    }
}

impl Error for InvalidLevel {}

impl TopicLevel {
    /// Level assigned to parentless nodes created without an explicit level.
    pub const DEFAULT_TAG: Self = Self::Tag(TagKind::Generic);

    /// Decodes a raw storage value.
    pub fn from_raw(raw: i64) -> Result<Self, InvalidLevel> {
        match raw {
            0..=99 => Ok(Self::Hierarchical(raw as u8)),
            100 => Ok(Self::Tag(TagKind::Generic)),
            101 => Ok(Self::Tag(TagKind::DocumentType)),
            102 => Ok(Self::Tag(TagKind::PracticeSubject)),
            103 => Ok(Self::Tag(TagKind::Other)),
            other => Err(InvalidLevel(other)),
        }
    }

    /// Builds a hierarchical level, rejecting depths past [`MAX_HIERARCHY_DEPTH`].
    pub fn hierarchical(depth: usize) -> Option<Self> {
        u8::try_from(depth)
            .ok()
            .filter(|depth| *depth <= MAX_HIERARCHY_DEPTH)
            .map(Self::Hierarchical)
    }

    /// Encodes this level for storage.
    pub fn raw(self) -> i64 {
        match self {
            Self::Hierarchical(depth) => i64::from(depth),
            Self::Tag(kind) => kind.raw(),
        }
    }

    /// Hierarchical depth, if any.
    pub fn depth(self) -> Option<u8> {
        match self {
            Self::Hierarchical(depth) => Some(depth),
            Self::Tag(_) => None,
        }
    }

    pub fn is_tag(self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidLevel, TagKind, TopicLevel};

    #[test]
    fn raw_codes_split_at_one_hundred() {
        assert_eq!(TopicLevel::from_raw(0), Ok(TopicLevel::Hierarchical(0)));
        assert_eq!(TopicLevel::from_raw(99), Ok(TopicLevel::Hierarchical(99)));
        assert_eq!(
            TopicLevel::from_raw(100),
            Ok(TopicLevel::Tag(TagKind::Generic))
        );
        assert_eq!(
            TopicLevel::from_raw(102),
            Ok(TopicLevel::Tag(TagKind::PracticeSubject))
        );
        assert_eq!(TopicLevel::from_raw(104), Err(InvalidLevel(104)));
        assert_eq!(TopicLevel::from_raw(-1), Err(InvalidLevel(-1)));
    }

    #[test]
    fn encoding_matches_decoding() {
        for raw in [0, 1, 42, 99, 100, 101, 102, 103] {
            let level = TopicLevel::from_raw(raw).expect("known raw level");
            assert_eq!(level.raw(), raw);
        }
    }

    #[test]
    fn hierarchical_rejects_depth_past_limit() {
        assert_eq!(TopicLevel::hierarchical(3), Some(TopicLevel::Hierarchical(3)));
        assert_eq!(TopicLevel::hierarchical(100), None);
        assert_eq!(TopicLevel::hierarchical(usize::MAX), None);
    }

    #[test]
    fn tag_kind_accepts_only_tag_codes() {
        assert_eq!(TagKind::from_raw(101), Ok(TagKind::DocumentType));
        assert_eq!(TagKind::from_raw(5), Err(InvalidLevel(5)));
        assert_eq!(TagKind::from_raw(104), Err(InvalidLevel(104)));
    }

    #[test]
    fn depth_is_only_defined_for_hierarchy() {
        assert_eq!(TopicLevel::Hierarchical(2).depth(), Some(2));
        assert_eq!(TopicLevel::Tag(TagKind::Other).depth(), None);
        assert!(TopicLevel::DEFAULT_TAG.is_tag());
    }
}
