// src/error.rs
// Error types for configuration, chunking and the summarize pipeline.

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Problems found while building the immutable runtime configuration.
/// Surfaced before any pipeline work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HF_API_KEY not found. Set environment variable HF_API_KEY or add it to a .env file.")]
    MissingCredential,

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown chunk strategy: {0} (expected \"words\" or \"tokens\")")]
    UnknownStrategy(String),

    #[error("Token chunking requires TOKENIZER_PATH to point at a tokenizer.json file")]
    TokenizerPathMissing,

    #[error("Failed to load tokenizer from {path}: {reason}")]
    TokenizerLoad { path: String, reason: String },

    #[error("Invalid chunking window: {0}")]
    InvalidWindow(#[from] ChunkingError),

    #[error("Failed to read env file {path}: {reason}")]
    EnvFile { path: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Invalid summary bounds: min_length {min} exceeds max_length {max}")]
    InvalidBounds { min: u32, max: u32 },
}

/// Failures raised by a `Chunker` before any text leaves the process.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("window size must be greater than zero")]
    ZeroWindow,

    #[error("overlap ({overlap}) must be smaller than max_tokens ({max_tokens})")]
    OverlapTooLarge { max_tokens: usize, overlap: usize },

    #[error("tokenizer failed: {0}")]
    Tokenizer(String),
}

/// Errors that stop a pipeline run before the first remote call.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Please paste some text first.")]
    EmptyInput,

    #[error("Chunking failed: {0}")]
    Chunking(#[from] ChunkingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_message_names_both_values() {
        let err = ChunkingError::OverlapTooLarge {
            max_tokens: 10,
            overlap: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_chunking_error_wraps_into_config_error() {
        let err: ConfigError = ChunkingError::ZeroWindow.into();
        assert!(matches!(err, ConfigError::InvalidWindow(ChunkingError::ZeroWindow)));
    }
}
