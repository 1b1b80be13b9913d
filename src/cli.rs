// src/cli.rs
// Command-line surface: argument parsing, input reading and report rendering.

use std::fmt::Write as _;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, ChunkStrategy, ChunkingConfig};
use crate::error::ConfigResult;
use crate::pipeline::PipelineReport;
use crate::summarizer::SummaryBounds;

#[derive(Debug, Parser)]
#[command(
    name = "briefly",
    version,
    about = "Split long text into chunks and summarize them with a hosted model"
)]
pub struct Cli {
    /// Read configuration from this env file instead of ./.env
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize text from a file or stdin
    Summarize(SummarizeArgs),
    /// Show how the text would be chunked, without calling the model
    Chunk(ChunkArgs),
    /// Run the JSON API server
    Serve,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input file; reads stdin when omitted
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl InputArgs {
    pub fn read(&self) -> std::io::Result<String> {
        match &self.file {
            Some(path) => std::fs::read_to_string(path),
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

#[derive(Debug, Args, Default)]
pub struct ChunkingArgs {
    /// Chunking policy: words or tokens
    #[arg(long)]
    pub strategy: Option<ChunkStrategy>,

    /// Path to a tokenizer.json for token chunking
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,

    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Tokens repeated between neighbouring chunks
    #[arg(long)]
    pub overlap: Option<usize>,

    #[arg(long)]
    pub max_words: Option<usize>,
}

impl ChunkingArgs {
    /// Flags win over environment values.
    pub fn apply(&self, config: &mut ChunkingConfig) {
        if let Some(path) = &self.tokenizer {
            config.tokenizer_path = Some(path.clone());
            if self.strategy.is_none() {
                config.strategy = ChunkStrategy::Tokens;
            }
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(n) = self.max_tokens {
            config.max_tokens = n;
        }
        if let Some(n) = self.overlap {
            config.overlap = n;
        }
        if let Some(n) = self.max_words {
            config.max_words = n;
        }
    }
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    /// Max summary length per chunk
    #[arg(long, value_parser = clap::value_parser!(u32).range(50..=300))]
    pub max_length: Option<u32>,

    /// Min summary length per chunk
    #[arg(long)]
    pub min_length: Option<u32>,

    /// Skip the second pass over the joined chunk summaries
    #[arg(long)]
    pub no_condense: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

impl SummarizeArgs {
    pub fn bounds(&self, defaults: SummaryBounds) -> ConfigResult<SummaryBounds> {
        SummaryBounds::new(
            self.min_length.unwrap_or(defaults.min_length),
            self.max_length.unwrap_or(defaults.max_length),
        )
    }
}

#[derive(Debug, Args)]
pub struct ChunkArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    /// Print chunks as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn load_config(cli: &Cli) -> ConfigResult<AppConfig> {
    match &cli.env_file {
        Some(path) => AppConfig::from_env_file(path),
        None => AppConfig::from_env(),
    }
}

/// Plain-text rendering: progress lines, then the final summary.
pub fn render_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Processing {} chunks", report.chunks.len());
    for chunk in &report.chunks {
        let _ = writeln!(out, "Chunk {}: {}", chunk.index + 1, chunk.preview);
    }
    for warning in &report.warnings {
        let _ = writeln!(out, "⚠️ {}", warning);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary");
    let _ = writeln!(out, "{}", report.final_text());
    out
}
