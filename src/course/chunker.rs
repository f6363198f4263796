//! Note chunking
//!
//! Splits note bodies into qualifying entries (non-trivial trimmed lines)
//! and groups them into bounded-size chunks, each tagged with its source
//! note. Chunks are the unit of generation work.

use crate::types::Note;

/// Maximum entries per chunk. Small enough to stay well inside the
/// generation model's token limits.
pub const CHUNK_SIZE: usize = 15;

/// Lines this short are treated as noise, not entries.
const MIN_ENTRY_LEN: usize = 3;

/// A bounded group of entries from a single note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteChunk {
    pub note_id: i64,
    pub note_title: String,
    pub tags: Vec<String>,
    pub entries: Vec<String>,
}

/// Extract the qualifying entries from a note body: split on line breaks,
/// trim, and drop anything shorter than three characters.
pub fn qualifying_entries(content: &str) -> Vec<String> {
    content
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| line.len() >= MIN_ENTRY_LEN)
        .map(String::from)
        .collect()
}

/// Count qualifying entries across all notes.
///
/// This is the authoritative total used by the target calculator; it is
/// computed once per pipeline run, never re-derived per chunk.
pub fn count_entries(notes: &[Note]) -> usize {
    notes
        .iter()
        .map(|note| qualifying_entries(&note.content).len())
        .sum()
}

/// Chunk every note into runs of at most `chunk_size` entries.
///
/// Output preserves input note order, then text order within each note.
/// A note with no qualifying entries contributes no chunks.
pub fn chunk_notes(notes: &[Note], chunk_size: usize) -> Vec<NoteChunk> {
    debug_assert!(chunk_size > 0);
    notes
        .iter()
        .flat_map(|note| {
            let entries = qualifying_entries(&note.content);
            entries
                .chunks(chunk_size)
                .map(|group| NoteChunk {
                    note_id: note.id,
                    note_title: note.title.clone(),
                    tags: note.tags.clone(),
                    entries: group.to_vec(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
