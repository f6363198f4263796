//! Fragment aggregation
//!
//! Folds the per-chunk fragments, in chunk order, into one unreconciled
//! [`CourseAnalysis`]. Topics are concatenated as-is: fragments from
//! different chunks stay distinct even when their topic titles collide.

use std::collections::HashSet;

use crate::course::schema::{ChunkFragment, CourseAnalysis};

/// Combine fragments into a single analysis.
///
/// `recommended_lessons` and `total_notes_processed` come from the
/// authoritative pre-chunking computation, never from summing fragments.
pub fn combine_fragments(
    fragments: Vec<ChunkFragment>,
    target_lessons: usize,
    total_entries: usize,
) -> CourseAnalysis {
    let mut topics = Vec::new();
    let mut unused_note_ids = Vec::new();
    let mut seen = HashSet::new();

    for fragment in fragments {
        topics.extend(fragment.topics);
        for id in fragment.unused_note_ids {
            if seen.insert(id) {
                unused_note_ids.push(id);
            }
        }
    }

    CourseAnalysis {
        topics,
        unused_note_ids,
        recommended_lessons: target_lessons,
        total_notes_processed: total_entries,
    }
}
