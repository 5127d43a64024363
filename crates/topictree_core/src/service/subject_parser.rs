//! Subject-heading string ingestion.
//!
//! # Responsibility
//! - Parse `A--B--C, D--E` strings into find-or-create topic chains.
//! - Link the entity to ROOT and to every chain node in one transaction.
//!
//! # Invariants
//! - Groups split on `,`; keywords split on `--`; trailing empty keywords drop.
//! - Level is assigned positionally from the right: `level = len - index`.
//! - Blank keywords are skipped without shifting the levels of the others.
//! - Each group restarts at ROOT; nodes are reused per `(name, level, parent)`.
//! - Every call with non-blank input appends a ROOT link, even when one exists.
//! - Trimming strips ASCII whitespace and control characters (`<= U+0020`)
//!   only; full-width spaces such as U+3000 are part of the keyword.

use crate::model::level::TopicLevel;
use crate::model::topic::{EntityId, NewTopic, TopicId, ROOT_TOPIC_ID};
use crate::repo::topic_repo::TopicStore;
use crate::service::error::{TopicServiceError, ValidationError};
use crate::service::link_service::add_link_in;
use log::{error, info};
use serde::Serialize;
use std::time::Instant;

/// Separator between independent subject groups.
pub const GROUP_SEPARATOR: char = ',';

/// Separator between keywords inside one group.
pub const KEYWORD_SEPARATOR: &str = "--";

/// Counters describing what one parse call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    /// Non-empty groups processed.
    pub groups: usize,
    pub topics_created: usize,
    pub topics_reused: usize,
    /// Chain links added, excluding the ROOT link.
    pub links_created: usize,
    /// Chain node ids in processing order (rightmost keyword of each group first).
    pub topic_ids: Vec<TopicId>,
}

/// One keyword with its resolved level, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedKeyword<'a> {
    name: &'a str,
    level: TopicLevel,
}

/// Parses subject-heading strings into the topic hierarchy.
pub struct SubjectHeadingParser<S: TopicStore> {
    store: S,
    root_topic_id: TopicId,
}

impl<S: TopicStore> SubjectHeadingParser<S> {
    pub fn new(store: S) -> Self {
        Self::with_root(store, ROOT_TOPIC_ID)
    }

    /// Uses `root_topic_id` as the anchor of every chain.
    pub fn with_root(store: S, root_topic_id: TopicId) -> Self {
        Self {
            store,
            root_topic_id,
        }
    }

    /// Ingests `raw` for `entity_id`. Returns `false` only for blank input.
    pub fn parse_subject_headings(
        &self,
        entity_id: EntityId,
        raw: &str,
    ) -> Result<bool, TopicServiceError> {
        Ok(self.parse_with_report(entity_id, raw)?.is_some())
    }

    /// Same as [`Self::parse_subject_headings`], returning change counters.
    /// `None` means the input was blank and nothing was written.
    pub fn parse_with_report(
        &self,
        entity_id: EntityId,
        raw: &str,
    ) -> Result<Option<ParseReport>, TopicServiceError> {
        if trim_heading(raw).is_empty() {
            info!(
                "event=subject_parse module=parser status=skip entity_id={} reason=blank_input",
                entity_id
            );
            return Ok(None);
        }

        let groups = plan_groups(raw)?;
        let started_at = Instant::now();
        info!(
            "event=subject_parse module=parser status=start entity_id={} groups={}",
            entity_id,
            groups.len()
        );

        let result = self.store.with_transaction(|store| {
            store.insert_link(entity_id, self.root_topic_id)?;
            let mut report = ParseReport {
                groups: groups.len(),
                ..ParseReport::default()
            };
            for keywords in &groups {
                self.apply_group(store, entity_id, keywords, &mut report)?;
            }
            Ok::<_, TopicServiceError>(report)
        });

        match result {
            Ok(report) => {
                info!(
                    "event=subject_parse module=parser status=ok entity_id={} created={} reused={} linked={} duration_ms={}",
                    entity_id,
                    report.topics_created,
                    report.topics_reused,
                    report.links_created,
                    started_at.elapsed().as_millis()
                );
                Ok(Some(report))
            }
            Err(err) => {
                error!(
                    "event=subject_parse module=parser status=error entity_id={} error={}",
                    entity_id, err
                );
                Err(err)
            }
        }
    }

    fn apply_group(
        &self,
        store: &S,
        entity_id: EntityId,
        keywords: &[PlannedKeyword<'_>],
        report: &mut ParseReport,
    ) -> Result<(), TopicServiceError> {
        let mut parent_id = self.root_topic_id;
        for keyword in keywords {
            let existing = store.find_topic(keyword.name, Some(keyword.level), Some(parent_id))?;
            let topic_id = match existing {
                Some(existing) => {
                    report.topics_reused += 1;
                    existing.id
                }
                None => {
                    let draft =
                        NewTopic::hierarchical(keyword.name, Some(parent_id), keyword.level);
                    let created = store.insert_topic(&draft)?;
                    info!(
                        "event=topic_create module=parser status=ok topic_id={} parent_id={} level={}",
                        created,
                        parent_id,
                        keyword.level.raw()
                    );
                    report.topics_created += 1;
                    created
                }
            };

            let (_, linked) = add_link_in(store, entity_id, topic_id)?;
            if linked {
                report.links_created += 1;
            }
            report.topic_ids.push(topic_id);
            parent_id = topic_id;
        }
        Ok(())
    }
}

/// Splits a group into keywords, dropping trailing empty pieces only.
///
/// `"a--b--"` yields `["a", "b"]`; `"--a"` yields `["", "a"]`.
pub fn split_keywords(group: &str) -> Vec<&str> {
    let mut keywords: Vec<&str> = group.split(KEYWORD_SEPARATOR).collect();
    while keywords.last().is_some_and(|keyword| keyword.is_empty()) {
        keywords.pop();
    }
    keywords
}

/// Strips leading and trailing characters at or below U+0020.
fn trim_heading(text: &str) -> &str {
    text.trim_matches(|c: char| c <= '\u{20}')
}

/// Validates the whole input and resolves levels before any write happens.
fn plan_groups(raw: &str) -> Result<Vec<Vec<PlannedKeyword<'_>>>, ValidationError> {
    let mut groups = Vec::new();
    for group in raw.split(GROUP_SEPARATOR) {
        let group = trim_heading(group);
        if group.is_empty() {
            continue;
        }
        let keywords = split_keywords(group);
        let len = keywords.len();
        let mut planned = Vec::with_capacity(len);
        for (index, keyword) in keywords.into_iter().enumerate().rev() {
            let name = trim_heading(keyword);
            if name.is_empty() {
                continue;
            }
            let depth = len - index;
            let level =
                TopicLevel::hierarchical(depth).ok_or(ValidationError::DepthExceeded { depth })?;
            planned.push(PlannedKeyword { name, level });
        }
        if !planned.is_empty() {
            groups.push(planned);
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::{plan_groups, split_keywords, trim_heading, PlannedKeyword};
    use crate::model::level::TopicLevel;
    use crate::service::error::ValidationError;

    fn planned(name: &str, depth: u8) -> PlannedKeyword<'_> {
        PlannedKeyword {
            name,
            level: TopicLevel::Hierarchical(depth),
        }
    }

    #[test]
    fn split_drops_only_trailing_empty_keywords() {
        assert_eq!(split_keywords("a--b--c"), vec!["a", "b", "c"]);
        assert_eq!(split_keywords("a--b----"), vec!["a", "b"]);
        assert_eq!(split_keywords("--a"), vec!["", "a"]);
        assert_eq!(split_keywords("a----b"), vec!["a", "", "b"]);
        assert!(split_keywords("").is_empty());
    }

    #[test]
    fn levels_are_assigned_from_the_right() {
        let groups = plan_groups("法学--劳动法--劳动合同").unwrap();
        assert_eq!(
            groups,
            vec![vec![
                planned("劳动合同", 1),
                planned("劳动法", 2),
                planned("法学", 3),
            ]]
        );
    }

    #[test]
    fn blank_keywords_keep_positional_levels() {
        let groups = plan_groups("A-- --B").unwrap();
        assert_eq!(groups, vec![vec![planned("B", 1), planned("A", 3)]]);
    }

    #[test]
    fn blank_groups_are_skipped_and_names_trimmed() {
        let groups = plan_groups(" , X-- Y ,,").unwrap();
        assert_eq!(groups, vec![vec![planned("Y", 1), planned("X", 2)]]);
        assert!(plan_groups(" , -- ,").unwrap().is_empty());
    }

    #[test]
    fn trimming_keeps_full_width_spaces() {
        assert_eq!(trim_heading("\t 劳动法\u{3000}\n"), "劳动法\u{3000}");
        assert_eq!(trim_heading("\u{3000}"), "\u{3000}");
        let groups = plan_groups("\u{3000}劳动法 -- 劳动合同").unwrap();
        assert_eq!(
            groups,
            vec![vec![planned("劳动合同", 1), planned("\u{3000}劳动法", 2)]]
        );
    }

    #[test]
    fn overlong_chain_is_rejected() {
        let raw = vec!["k"; 100].join("--");
        assert_eq!(
            plan_groups(&raw),
            Err(ValidationError::DepthExceeded { depth: 100 })
        );
        let fits = vec!["k"; 99].join("--");
        assert_eq!(plan_groups(&fits).unwrap()[0].len(), 99);
    }
}
