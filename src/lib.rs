pub mod api;
pub mod chunker;
pub mod cli;
pub mod config;
pub mod error;
pub mod monitoring;
pub mod pipeline;
pub mod summarizer;

pub use chunker::{Chunk, Chunker, HfTokenizer, TokenChunker, TokenCodec, WordChunker};
pub use config::{AppConfig, ChunkStrategy, ChunkingConfig, InferenceConfig};
pub use error::{ChunkingError, ConfigError, PipelineError};
pub use pipeline::{PipelineOptions, PipelineReport, SummarizePipeline};
pub use summarizer::{HfInferenceClient, Summarizer, SummaryBounds, SummaryFailure, SummaryOutcome};
