//! Courseloom - Note-to-Course Synthesis Library
//!
//! Ingests free-text notes and synthesizes them into a structured course:
//! a tree of topics, each containing lessons with learning content, an
//! illustrative story, a reflection question, and source note references.
//!
//! The pipeline chunks note text deterministically, fans out one generation
//! request per chunk, validates and aggregates the fragments, then merges or
//! splits lessons until the total matches the target for the chosen
//! processing style.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use courseloom::{Config, CourseAnalyzer, OpenRouterClient, ProcessingStyle};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let client = OpenRouterClient::from_config(&config)?;
//!     let analyzer = CourseAnalyzer::new(Arc::new(client));
//!     let course = analyzer.analyze(&notes, ProcessingStyle::Balanced).await?;
//!     println!("{} lessons", course.section_count());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod course;
pub mod llm;
pub mod types;

// Re-export commonly used types for convenience
pub use config::Config;
pub use course::{AnalysisError, CourseAnalysis, CourseAnalyzer, CourseSection, CourseTopic};
pub use llm::{OpenRouterClient, TextGeneration};
pub use types::{Note, ProcessingStyle};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
