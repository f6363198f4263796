//! CLI interface for courseloom

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::course::{chunker, target, CourseAnalyzer};
use crate::llm::OpenRouterClient;
use crate::types::{Note, ProcessingStyle};

#[derive(Parser)]
#[command(name = "courseloom")]
#[command(about = "Synthesize free-text notes into a structured course", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze notes into a reconciled course
    Analyze {
        /// Path to a JSON file containing an array of notes
        notes: PathBuf,
        /// Processing style (lesson density)
        #[arg(short, long, value_enum, default_value_t = ProcessingStyle::Balanced)]
        style: ProcessingStyle,
        /// Write the course JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show chunking and target lesson count without calling the provider
    Preview {
        /// Path to a JSON file containing an array of notes
        notes: PathBuf,
        /// Processing style (lesson density)
        #[arg(short, long, value_enum, default_value_t = ProcessingStyle::Balanced)]
        style: ProcessingStyle,
    },
    /// Generate a summary for a single note
    Summarize {
        /// Path to a JSON file containing an array of notes
        notes: PathBuf,
        /// Id of the note to summarize
        #[arg(short = 'i', long)]
        note_id: i64,
    },
    /// Suggest topic categories covering the notes
    Topics {
        /// Path to a JSON file containing an array of notes
        notes: PathBuf,
    },
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { notes, style, output } => {
            let notes = load_notes(&notes)?;
            let analyzer = analyzer_from(&config)?;

            let analysis = analyzer.analyze(&notes, style).await?;
            let json = serde_json::to_string_pretty(&analysis)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "Wrote {} topics / {} lessons to {}",
                        analysis.topics.len(),
                        analysis.section_count(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }
        Commands::Preview { notes, style } => {
            let notes = load_notes(&notes)?;
            let total_entries = chunker::count_entries(&notes);
            let chunks = chunker::chunk_notes(&notes, config.analysis.chunk_size);
            let target = target::target_lesson_count(total_entries, style);

            println!("Notes:          {}", notes.len());
            println!("Entries:        {}", total_entries);
            println!("Chunks:         {}", chunks.len());
            println!("Target lessons: {} ({} style)", target, style);
            for chunk in &chunks {
                println!(
                    "  note {:>4}  {:<30}  {} entries",
                    chunk.note_id,
                    truncate(&chunk.note_title, 30),
                    chunk.entries.len()
                );
            }
        }
        Commands::Summarize { notes, note_id } => {
            let notes = load_notes(&notes)?;
            let note = notes
                .iter()
                .find(|n| n.id == note_id)
                .with_context(|| format!("No note with id {}", note_id))?;
            let analyzer = analyzer_from(&config)?;
            println!("{}", analyzer.summarize_note(note).await?);
        }
        Commands::Topics { notes } => {
            let notes = load_notes(&notes)?;
            let analyzer = analyzer_from(&config)?;
            let topics = analyzer.suggest_topics(&notes).await?;
            if topics.is_empty() {
                println!("No topic suggestions returned");
            } else {
                for topic in topics {
                    println!("- {}", topic);
                }
            }
        }
    }

    Ok(())
}

fn analyzer_from(config: &Config) -> Result<CourseAnalyzer> {
    let client = OpenRouterClient::from_config(config)?.with_temperature(0.1);
    Ok(CourseAnalyzer::new(Arc::new(client)).with_chunk_size(config.analysis.chunk_size))
}

fn load_notes(path: &Path) -> Result<Vec<Note>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read notes file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse notes file {}", path.display()))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
