//! Target lesson count calculation
//!
//! Pure mapping from (total qualifying entries, processing style) to the
//! number of lessons the finished course must contain.

use crate::types::ProcessingStyle;

/// Fraction of entries kept as lessons under the balanced style.
const BALANCED_RATIO: f64 = 0.70;
/// Fraction of entries kept as lessons under heavy synthesis.
const SYNTHESIZED_RATIO: f64 = 0.30;

/// Compute the target lesson count for a given entry total and style.
pub fn target_lesson_count(total_entries: usize, style: ProcessingStyle) -> usize {
    match style {
        ProcessingStyle::Granular => total_entries,
        ProcessingStyle::Balanced => scaled(total_entries, BALANCED_RATIO),
        ProcessingStyle::Synthesized => scaled(total_entries, SYNTHESIZED_RATIO),
    }
}

fn scaled(total_entries: usize, ratio: f64) -> usize {
    (total_entries as f64 * ratio).ceil() as usize
}
