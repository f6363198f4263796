//! Shared types used across modules
//!
//! This module contains types that are used by multiple modules
//! to avoid circular dependencies.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A user note as supplied by the notes source.
///
/// Notes are owned by an external collaborator (the notes store); the
/// pipeline treats them as immutable input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Note {
    pub fn new(id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }
}

/// Processing style: governs how densely notes are condensed into lessons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStyle {
    /// One lesson per entry, content kept as-is
    Granular,
    /// Moderate synthesis, related entries combined when appropriate
    Balanced,
    /// Heavy synthesis, related concepts condensed into unified lessons
    Synthesized,
}

impl ProcessingStyle {
    /// Parse from a lowercase style name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "granular" => Some(ProcessingStyle::Granular),
            "balanced" => Some(ProcessingStyle::Balanced),
            "synthesized" => Some(ProcessingStyle::Synthesized),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProcessingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStyle::Granular => write!(f, "granular"),
            ProcessingStyle::Balanced => write!(f, "balanced"),
            ProcessingStyle::Synthesized => write!(f, "synthesized"),
        }
    }
}
