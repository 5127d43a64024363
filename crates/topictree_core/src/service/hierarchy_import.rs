//! Bulk import of curated nested taxonomies.
//!
//! # Responsibility
//! - Normalize loosely formatted JSON payloads into [`TopicImport`] trees.
//! - Persist a payload as a fresh subtree in one transaction.
//!
//! # Invariants
//! - Titles are cleaned before validation; blank or too-deep payloads are
//!   rejected before any write.
//! - Every payload node becomes a new row; nothing is reused.
//! - The payload root has no parent and level 0; children get `depth`.

use crate::model::level::TopicLevel;
use crate::model::topic::{NewTopic, TopicId, TopicImport};
use crate::repo::topic_repo::TopicStore;
use crate::service::error::{TopicServiceError, ValidationError};
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const EOL_MARKER: &str = "<EOL>";

/// Imports nested taxonomies without deduplication.
pub struct HierarchyImporter<S: TopicStore> {
    store: S,
}

impl<S: TopicStore> HierarchyImporter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates one node per payload entry and returns the new root id.
    ///
    /// # Errors
    /// - [`ValidationError::BlankTitle`] when any cleaned title is empty.
    /// - [`ValidationError::DepthExceeded`] when nesting passes level 99.
    /// - Storage errors roll back every node created by this call.
    pub fn import_hierarchy(&self, payload: &TopicImport) -> Result<TopicId, TopicServiceError> {
        let mut path = Vec::new();
        let cleaned = prepare_node(payload, 0, &mut path)?;
        let node_count = count_nodes(&cleaned);
        let started_at = Instant::now();
        info!(
            "event=hierarchy_import module=import status=start nodes={}",
            node_count
        );

        let result = self
            .store
            .with_transaction(|store| create_subtree(store, &cleaned, None, 0));

        match result {
            Ok(root_id) => {
                info!(
                    "event=hierarchy_import module=import status=ok root_id={} nodes={} duration_ms={}",
                    root_id,
                    node_count,
                    started_at.elapsed().as_millis()
                );
                Ok(root_id)
            }
            Err(err) => {
                error!(
                    "event=hierarchy_import module=import status=error nodes={} error={}",
                    node_count, err
                );
                Err(err)
            }
        }
    }

    /// Normalizes and parses `raw`, then imports it.
    pub fn import_json(&self, raw: &str) -> Result<TopicId, TopicServiceError> {
        let payload = parse_import_payload(raw)?;
        self.import_hierarchy(&payload)
    }
}

fn create_subtree<S: TopicStore>(
    store: &S,
    node: &TopicImport,
    parent_id: Option<TopicId>,
    depth: u8,
) -> Result<TopicId, TopicServiceError> {
    let level = TopicLevel::Hierarchical(depth);
    let topic_id = store.insert_topic(&NewTopic::hierarchical(
        node.title.as_str(),
        parent_id,
        level,
    ))?;
    for child in &node.children {
        create_subtree(store, child, Some(topic_id), depth + 1)?;
    }
    Ok(topic_id)
}

/// Returns a cleaned copy of `node`, checking titles and depth on the way.
fn prepare_node(
    node: &TopicImport,
    depth: usize,
    path: &mut Vec<usize>,
) -> Result<TopicImport, ValidationError> {
    if TopicLevel::hierarchical(depth).is_none() {
        return Err(ValidationError::DepthExceeded { depth });
    }
    let title = clean_title(&node.title);
    if title.is_empty() {
        return Err(ValidationError::BlankTitle { path: path.clone() });
    }

    let mut children = Vec::with_capacity(node.children.len());
    for (index, child) in node.children.iter().enumerate() {
        path.push(index);
        children.push(prepare_node(child, depth + 1, path)?);
        path.pop();
    }
    Ok(TopicImport { title, children })
}

fn count_nodes(node: &TopicImport) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}

/// Strips `<EOL>` markers, trims, and collapses whitespace runs.
pub fn clean_title(raw: &str) -> String {
    let without_markers = raw.replace(EOL_MARKER, "");
    WHITESPACE_RE
        .replace_all(without_markers.trim(), " ")
        .into_owned()
}

/// Rewrites a hand-edited payload into parseable JSON.
///
/// Removes one pair of wrapping quotes, literal `\r`/`\n` escapes and every
/// remaining backslash, maps full-width punctuation to ASCII, drops `<EOL>`
/// markers and collapses whitespace.
pub fn normalize_import_json(raw: &str) -> String {
    let unwrapped = raw
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .unwrap_or(raw);
    let unescaped = unwrapped
        .replace("\\r", "")
        .replace("\\n", "")
        .replace('\\', "");
    let ascii: String = unescaped.chars().map(ascii_punctuation).collect();
    let without_markers = ascii.replace(EOL_MARKER, "");
    WHITESPACE_RE
        .replace_all(&without_markers, " ")
        .trim()
        .to_string()
}

fn ascii_punctuation(ch: char) -> char {
    match ch {
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2018}' | '\u{2019}' => '\'',
        '：' => ':',
        '，' | '、' => ',',
        '【' => '[',
        '】' => ']',
        '｛' => '{',
        '｝' => '}',
        '（' => '(',
        '）' => ')',
        other => other,
    }
}

/// Normalizes `raw` with [`normalize_import_json`] and decodes it.
pub fn parse_import_payload(raw: &str) -> Result<TopicImport, TopicServiceError> {
    let normalized = normalize_import_json(raw);
    serde_json::from_str(&normalized)
        .map_err(|err| TopicServiceError::InvalidImportPayload(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{clean_title, normalize_import_json, parse_import_payload, prepare_node};
    use crate::model::topic::TopicImport;
    use crate::service::error::{TopicServiceError, ValidationError};

    #[test]
    fn titles_lose_markers_and_extra_whitespace() {
        assert_eq!(clean_title("  劳动<EOL>法 \t 总论\n"), "劳动法 总论");
        assert_eq!(clean_title("<EOL> "), "");
    }

    #[test]
    fn normalization_unwraps_and_maps_full_width_punctuation() {
        let raw = "\"｛\\\"title\\\"：\\\"A\\\"，\\\"children\\\"：【】｝\"";
        assert_eq!(
            normalize_import_json(raw),
            r#"{"title":"A","children":[]}"#
        );
    }

    #[test]
    fn normalized_payload_decodes() {
        let payload = parse_import_payload("{“title”：“A”，“children”：【{“title”：“B<EOL>”}】}")
            .expect("payload should decode");
        assert_eq!(
            payload,
            TopicImport::new("A").with_children(vec![TopicImport::new("B")])
        );
    }

    #[test]
    fn garbage_payload_is_reported() {
        let err = parse_import_payload("not json").unwrap_err();
        assert!(matches!(err, TopicServiceError::InvalidImportPayload(_)));
    }

    #[test]
    fn blank_child_title_reports_its_path() {
        let payload = TopicImport::new("A").with_children(vec![
            TopicImport::new("B"),
            TopicImport::new("C").with_children(vec![TopicImport::new(" <EOL> ")]),
        ]);
        let err = prepare_node(&payload, 0, &mut Vec::new()).unwrap_err();
        assert_eq!(err, ValidationError::BlankTitle { path: vec![1, 0] });
    }

    #[test]
    fn nesting_past_level_limit_is_rejected() {
        let mut payload = TopicImport::new("leaf");
        for _ in 0..100 {
            payload = TopicImport::new("n").with_children(vec![payload]);
        }
        let err = prepare_node(&payload, 0, &mut Vec::new()).unwrap_err();
        assert_eq!(err, ValidationError::DepthExceeded { depth: 100 });
    }
}
