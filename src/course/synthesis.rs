//! Per-chunk synthesis calls
//!
//! Builds the generation instruction for a chunk, serializes the chunk as
//! the payload, and turns the raw response into a validated fragment.
//!
//! Failure handling follows the batch contract: a transport error from the
//! generation capability is propagated (and fails the whole analysis),
//! while malformed content degrades to an empty fragment with a warning.

use anyhow::Result;
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::course::chunker::NoteChunk;
use crate::course::schema::{parse_fragment, ChunkFragment};
use crate::llm::TextGeneration;
use crate::types::ProcessingStyle;

/// Style-specific merge/split bias for the instruction.
fn style_guidelines(style: ProcessingStyle) -> &'static str {
    match style {
        ProcessingStyle::Granular => {
            "1. Create one lesson per entry\n\
             2. Keep entries as-is\n\
             3. Ensure every entry becomes a lesson"
        }
        ProcessingStyle::Balanced => {
            "1. Balance between preserving original content and synthesis\n\
             2. Combine related entries when appropriate\n\
             3. Moderate level of summarization"
        }
        ProcessingStyle::Synthesized => {
            "1. Focus on synthesizing and condensing content\n\
             2. Combine related concepts into unified lessons\n\
             3. Extract core learning points from longer entries"
        }
    }
}

/// Build the fixed instruction for a chunk's generation request.
pub fn build_instruction(style: ProcessingStyle, chunk: &NoteChunk) -> String {
    format!(
        r#"Analyze and organize the provided entries into a coherent course structure. Mark all sections as selected. Include the noteId in each section's noteIds array.
Guidelines for the {style} processing style:
{guidelines}
Each lesson must include:
- A clear title (max 100 chars)
- Learning content (max 500 chars)
- An illustrative story/example
- A reflection question
- Source note IDs (array of note IDs)

Return the response as a JSON object with this structure (no additional text):
{{
  "topics": [{{
    "title": "Topic Name",
    "sections": [{{
      "number": "1.1",
      "title": "Lesson Title",
      "learningContent": "Content",
      "story": "Story",
      "reflectionQuestion": "Question",
      "noteIds": [{note_id}],
      "selected": true
    }}],
    "relatedNoteIds": []
  }}],
  "unusedNoteIds": []
}}"#,
        style = style,
        guidelines = style_guidelines(style),
        note_id = chunk.note_id,
    )
}

/// Serialize a chunk as the request payload.
pub fn chunk_payload(chunk: &NoteChunk) -> String {
    json!({
        "id": chunk.note_id,
        "title": chunk.note_title,
        "tags": chunk.tags,
        "content": chunk.entries,
    })
    .to_string()
}

/// Run one chunk through the generation capability.
///
/// Returns `Err` only when the capability itself fails; unparseable content
/// resolves to an empty fragment.
pub async fn synthesize_chunk(
    generator: &dyn TextGeneration,
    chunk: &NoteChunk,
    style: ProcessingStyle,
    allowed_note_ids: &HashSet<i64>,
) -> Result<ChunkFragment> {
    debug!(
        "Synthesizing chunk: note {} ({} entries)",
        chunk.note_id,
        chunk.entries.len()
    );

    let instruction = build_instruction(style, chunk);
    let payload = chunk_payload(chunk);
    let raw = generator.generate(&instruction, &payload).await?;

    match parse_fragment(&raw, allowed_note_ids) {
        Some(fragment) => Ok(fragment),
        None => {
            warn!(
                "Discarding malformed generation response for note {} ({} chars)",
                chunk.note_id,
                raw.len()
            );
            Ok(ChunkFragment::default())
        }
    }
}
