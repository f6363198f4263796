//! Course structure and the chunk-fragment wire schema
//!
//! The generation capability returns free-form text that is supposed to be
//! strict JSON matching [`ChunkFragment`]. It is treated as an untrusted
//! payload: parsed into typed values, then sanitized against the note ids
//! actually supplied to the pipeline. Anything that does not conform is a
//! recoverable parse failure, not a crash.
//!
//! Field names are camelCase on the wire, matching the JSON contract the
//! prompt asks the model to honor.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One deliverable lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSection {
    /// Hierarchical number, "topic.section" after reconciliation
    pub number: String,
    pub title: String,
    pub learning_content: String,
    pub story: String,
    pub reflection_question: String,
    /// Source notes this lesson was derived from
    #[serde(default)]
    pub note_ids: Vec<i64>,
    /// Always true in this pipeline; kept for a future curation step
    #[serde(default)]
    pub selected: bool,
}

/// A group of sections under a shared heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTopic {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<CourseSection>,
    #[serde(default)]
    pub related_note_ids: Vec<i64>,
}

/// The fully assembled (and, after reconciliation, renumbered) course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAnalysis {
    pub topics: Vec<CourseTopic>,
    #[serde(default)]
    pub unused_note_ids: Vec<i64>,
    pub recommended_lessons: usize,
    pub total_notes_processed: usize,
}

impl CourseAnalysis {
    /// An analysis with no content, returned when the input has no
    /// qualifying entries.
    pub fn empty() -> Self {
        Self {
            topics: Vec::new(),
            unused_note_ids: Vec::new(),
            recommended_lessons: 0,
            total_notes_processed: 0,
        }
    }

    /// Total sections across all topics
    pub fn section_count(&self) -> usize {
        self.topics.iter().map(|t| t.sections.len()).sum()
    }
}

/// Per-chunk analysis fragment returned by the generation capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFragment {
    #[serde(default)]
    pub topics: Vec<CourseTopic>,
    #[serde(default)]
    pub unused_note_ids: Vec<i64>,
}

impl ChunkFragment {
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.unused_note_ids.is_empty()
    }
}

/// Parse a raw generation response into a fragment.
///
/// Returns `None` when the text is not valid JSON or does not match the
/// fragment shape; the caller logs and substitutes an empty fragment.
pub fn parse_fragment(raw: &str, allowed_note_ids: &HashSet<i64>) -> Option<ChunkFragment> {
    let body = strip_code_fences(raw);
    let mut fragment: ChunkFragment = serde_json::from_str(body).ok()?;
    sanitize_fragment(&mut fragment, allowed_note_ids);
    Some(fragment)
}

/// Enforce the parts of the schema serde cannot: every note id must be one
/// the pipeline was given, and `selected` is forced true.
fn sanitize_fragment(fragment: &mut ChunkFragment, allowed_note_ids: &HashSet<i64>) {
    for topic in &mut fragment.topics {
        topic
            .related_note_ids
            .retain(|id| allowed_note_ids.contains(id));
        for section in &mut topic.sections {
            section.note_ids.retain(|id| allowed_note_ids.contains(id));
            section.selected = true;
        }
    }
    fragment
        .unused_note_ids
        .retain(|id| allowed_note_ids.contains(id));
}

/// Strip a surrounding Markdown code fence, which some models add despite
/// instructions to return bare JSON.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end_matches('`').trim()
}
