//! Course synthesis pipeline
//!
//! Turns a set of free-text notes into a structured course:
//! notes → chunks → concurrent per-chunk generation → aggregated analysis
//! → count-reconciled, renumbered course.
//!
//! The pipeline holds no state between invocations and persists nothing;
//! storage, identity, and transport retries belong to the collaborators
//! behind the [`TextGeneration`] seam and the notes source.

pub mod aggregate;
pub mod chunker;
pub mod reconcile;
pub mod schema;
pub mod synthesis;
pub mod target;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::llm::TextGeneration;
use crate::types::{Note, ProcessingStyle};

pub use schema::{CourseAnalysis, CourseSection, CourseTopic};

/// The single fatal failure of [`CourseAnalyzer::analyze`].
///
/// Only a generation transport failure surfaces here; malformed content,
/// unreachable reconciliation targets, and empty input all degrade to a
/// best-effort result instead.
#[derive(Debug, thiserror::Error)]
#[error("course analysis failed after {duration_ms} ms ({note_count} notes, {style} style): {source}")]
pub struct AnalysisError {
    pub duration_ms: u128,
    pub note_count: usize,
    pub style: ProcessingStyle,
    #[source]
    pub source: anyhow::Error,
}

/// Orchestrates the course synthesis pipeline over a generation capability.
#[derive(Clone)]
pub struct CourseAnalyzer {
    generator: Arc<dyn TextGeneration>,
    chunk_size: usize,
}

impl CourseAnalyzer {
    pub fn new(generator: Arc<dyn TextGeneration>) -> Self {
        Self {
            generator,
            chunk_size: chunker::CHUNK_SIZE,
        }
    }

    /// Override the chunk size (mainly for tests and tuning)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Analyze notes into a fully reconciled course.
    ///
    /// All-or-nothing over the chunk fan-out: one transport failure discards
    /// every sibling fragment and fails the call.
    pub async fn analyze(
        &self,
        notes: &[Note],
        style: ProcessingStyle,
    ) -> std::result::Result<CourseAnalysis, AnalysisError> {
        let started = Instant::now();
        self.run_pipeline(notes, style)
            .await
            .map_err(|source| AnalysisError {
                duration_ms: started.elapsed().as_millis(),
                note_count: notes.len(),
                style,
                source,
            })
    }

    async fn run_pipeline(
        &self,
        notes: &[Note],
        style: ProcessingStyle,
    ) -> Result<CourseAnalysis> {
        info!("Starting note analysis: {} notes, {} style", notes.len(), style);

        // Authoritative entry count, computed once before chunking
        let total_entries = chunker::count_entries(notes);
        if total_entries == 0 {
            info!("No qualifying entries; returning empty analysis");
            return Ok(CourseAnalysis::empty());
        }

        let target = target::target_lesson_count(total_entries, style);
        let chunks = chunker::chunk_notes(notes, self.chunk_size);
        let allowed_note_ids: HashSet<i64> = notes.iter().map(|n| n.id).collect();

        info!(
            "Targeting {} lessons from {} entries across {} chunks",
            target,
            total_entries,
            chunks.len()
        );

        // Fan out one stateless generation task per chunk and join on all of
        // them; the first transport error aborts the whole batch.
        let fragments = try_join_all(chunks.iter().map(|chunk| {
            synthesis::synthesize_chunk(self.generator.as_ref(), chunk, style, &allowed_note_ids)
        }))
        .await
        .context("Generation capability failed for a chunk")?;

        let mut analysis = aggregate::combine_fragments(fragments, target, total_entries);
        reconcile::adjust_lesson_count(&mut analysis, target);

        if analysis.section_count() != target {
            warn!(
                "Reconciliation fell short: {} sections against a target of {}",
                analysis.section_count(),
                target
            );
        }

        Ok(analysis)
    }

    /// Generate a concise, engaging summary of one note.
    pub async fn summarize_note(&self, note: &Note) -> Result<String> {
        info!("Generating summary for note {}", note.id);
        self.generator
            .generate(
                "Create a concise, engaging summary of this note that captures \
                 the key insights and learning points.",
                &note.content,
            )
            .await
            .context("Failed to generate note summary")
    }

    /// Suggest topic categories covering the given notes.
    ///
    /// Unparseable responses degrade to an empty list; only a transport
    /// failure is an error.
    pub async fn suggest_topics(&self, notes: &[Note]) -> Result<Vec<String>> {
        info!("Suggesting topics for {} notes", notes.len());
        let payload = serde_json::to_string(
            &notes
                .iter()
                .map(|n| serde_json::json!({ "content": n.content, "tags": n.tags }))
                .collect::<Vec<_>>(),
        )
        .context("Failed to serialize notes payload")?;

        let raw = self
            .generator
            .generate(
                "Analyze these notes and suggest relevant topic categories. \
                 Provide your response as a JSON array of topic strings.",
                &payload,
            )
            .await
            .context("Failed to suggest topics from notes")?;

        Ok(parse_topic_suggestions(&raw))
    }
}

/// Parse a topic-suggestion response: either a bare JSON array of strings or
/// an object with a `topics` array. Anything else yields an empty list.
fn parse_topic_suggestions(raw: &str) -> Vec<String> {
    let value: serde_json::Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(err) => {
            warn!("Discarding malformed topic suggestions: {}", err);
            return Vec::new();
        }
    };

    let items = match &value {
        serde_json::Value::Array(items) => items.as_slice(),
        serde_json::Value::Object(map) => map
            .get("topics")
            .and_then(|t| t.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| item.as_str().map(String::from))
        .collect()
}
