// src/pipeline.rs
// Chunk -> summarize each chunk in order -> join -> optional condensation pass.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::chunker::{normalize_input, Chunk, Chunker};
use crate::error::PipelineError;
use crate::summarizer::{truncate_chars, Summarizer, SummaryBounds, SummaryOutcome};

/// Characters of each chunk result kept in the report preview.
pub const PREVIEW_CHARS: usize = 200;

pub const PARTIAL_RESULT_WARNING: &str =
    "One or more chunks returned errors; see above. Result below may be partial.";

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Bounds for each chunk call.
    pub bounds: SummaryBounds,
    /// Run a second pass over the joined chunk summaries.
    pub condense: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            bounds: SummaryBounds::default(),
            condense: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    pub index: usize,
    pub words: usize,
    pub preview: String,
    pub outcome: SummaryOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub model: String,
    pub chunker: String,
    pub chunks: Vec<ChunkReport>,
    /// Every chunk result joined with single spaces.
    pub combined: String,
    /// Second-pass summary, when it ran and succeeded.
    pub condensed: Option<String>,
    /// At least one chunk failed.
    pub partial: bool,
    pub warnings: Vec<String>,
}

impl PipelineReport {
    /// The text to show as "the summary".
    pub fn final_text(&self) -> &str {
        self.condensed.as_deref().unwrap_or(&self.combined)
    }

    pub fn failed_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.outcome.is_failure()).count()
    }
}

pub struct SummarizePipeline {
    chunker: Box<dyn Chunker>,
    summarizer: Arc<dyn Summarizer>,
    options: PipelineOptions,
}

impl SummarizePipeline {
    pub fn new(
        chunker: Box<dyn Chunker>,
        summarizer: Arc<dyn Summarizer>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            chunker,
            summarizer,
            options,
        }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Split the input without calling the remote model.
    pub fn chunk(&self, text: &str) -> Result<Vec<Chunk>, PipelineError> {
        if normalize_input(text).is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        Ok(self.chunker.chunk(text)?)
    }

    pub async fn run(&self, text: &str) -> Result<PipelineReport, PipelineError> {
        self.run_with_bounds(text, self.options.bounds).await
    }

    /// Same as `run`, with per-request length bounds.
    #[instrument(skip(self, text), fields(input_len = text.len()))]
    pub async fn run_with_bounds(
        &self,
        text: &str,
        bounds: SummaryBounds,
    ) -> Result<PipelineReport, PipelineError> {
        let chunks = self.chunk(text)?;
        info!(chunks = chunks.len(), chunker = self.chunker.name(), "Processing chunks");

        let mut reports = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let outcome = self.summarizer.summarize(&chunk.text, bounds).await;
            let rendered = outcome.rendered();
            info!(
                chunk = chunk.index + 1,
                failed = outcome.is_failure(),
                "Chunk {}: {}",
                chunk.index + 1,
                truncate_chars(&rendered, PREVIEW_CHARS)
            );
            reports.push(ChunkReport {
                index: chunk.index,
                words: chunk.word_count(),
                preview: truncate_chars(&rendered, PREVIEW_CHARS),
                outcome,
            });
        }

        let combined = reports
            .iter()
            .map(|r| r.outcome.rendered())
            .collect::<Vec<_>>()
            .join(" ");

        let partial = reports.iter().any(|r| r.outcome.is_failure());
        let mut warnings = Vec::new();
        let mut condensed = None;

        if partial {
            warn!(
                failed = reports.iter().filter(|r| r.outcome.is_failure()).count(),
                "Skipping condensation pass"
            );
            warnings.push(PARTIAL_RESULT_WARNING.to_string());
        } else if self.options.condense && !combined.is_empty() {
            match self.summarizer.summarize(&combined, bounds.condensed()).await {
                SummaryOutcome::Success { summary } if !summary.trim().is_empty() => {
                    condensed = Some(summary);
                }
                SummaryOutcome::Success { .. } => {
                    warnings.push("Condensation pass returned an empty summary.".to_string());
                }
                SummaryOutcome::Failure { error } => {
                    warn!(error = %error, "Condensation pass failed");
                    warnings.push(format!("Condensation pass failed: {}", error));
                }
            }
        }

        Ok(PipelineReport {
            model: self.summarizer.model_name().to_string(),
            chunker: self.chunker.name().to_string(),
            chunks: reports,
            combined,
            condensed,
            partial,
            warnings,
        })
    }
}
