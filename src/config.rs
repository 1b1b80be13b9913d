// src/config.rs
// Runtime configuration, loaded once before the first call and immutable afterwards.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::chunker::{
    Chunker, HfTokenizer, TokenChunker, WordChunker, DEFAULT_MAX_TOKENS, DEFAULT_MAX_WORDS,
    DEFAULT_OVERLAP,
};
use crate::error::{ConfigError, ConfigResult};
use crate::summarizer::{SummaryBounds, DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};

pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_API_BASE: &str = "https://router.huggingface.co/hf-inference/models";

/// Where the remote model lives and how hard to try reaching it.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Total attempts on transport failure
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            retry_delay: Duration::ZERO,
        }
    }
}

impl InferenceConfig {
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), self.model)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    Words,
    Tokens,
}

impl FromStr for ChunkStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "words" | "word" => Ok(ChunkStrategy::Words),
            "tokens" | "token" => Ok(ChunkStrategy::Tokens),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub strategy: ChunkStrategy,
    pub tokenizer_path: Option<PathBuf>,
    pub max_tokens: usize,
    pub overlap: usize,
    pub max_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Words,
            tokenizer_path: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            overlap: DEFAULT_OVERLAP,
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

impl ChunkingConfig {
    /// Build the configured chunking policy. Window checks run here so a bad
    /// overlap never reaches a pipeline run.
    pub fn build_chunker(&self) -> ConfigResult<Box<dyn Chunker>> {
        match self.strategy {
            ChunkStrategy::Words => Ok(Box::new(WordChunker::new(self.max_words)?)),
            ChunkStrategy::Tokens => {
                let path = self
                    .tokenizer_path
                    .as_ref()
                    .ok_or(ConfigError::TokenizerPathMissing)?;
                let codec = HfTokenizer::from_file(path)?;
                Ok(Box::new(TokenChunker::new(codec, self.max_tokens, self.overlap)?))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub inference: InferenceConfig,
    pub chunking: ChunkingConfig,
    pub summary: SummaryBounds,
    pub condense: bool,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    /// Load `.env` (if any) and then read the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Values from the given env file win; the process environment fills the gaps.
    pub fn from_env_file(path: &Path) -> ConfigResult<Self> {
        let file_vars = read_env_file(path)?;
        Self::from_lookup(|key| file_vars.get(key).cloned().or_else(|| env::var(key).ok()))
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = InferenceConfig::default();
        let inference = InferenceConfig {
            api_key: lookup("HF_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("HF_MODEL").unwrap_or(defaults.model),
            api_base: lookup("HF_API_BASE").unwrap_or(defaults.api_base),
            timeout: Duration::from_secs(parse_var(&lookup, "HF_TIMEOUT_SECS", 30u64)?),
            max_attempts: parse_var(&lookup, "HF_MAX_ATTEMPTS", 3u32)?,
            retry_delay: Duration::from_millis(parse_var(&lookup, "HF_RETRY_DELAY_MS", 0u64)?),
        };
        if inference.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HF_MAX_ATTEMPTS".to_string(),
                value: "0".to_string(),
            });
        }

        let tokenizer_path = lookup("TOKENIZER_PATH").map(PathBuf::from);
        let strategy = match lookup("CHUNK_STRATEGY") {
            Some(raw) => raw.parse()?,
            None if tokenizer_path.is_some() => ChunkStrategy::Tokens,
            None => ChunkStrategy::Words,
        };
        let chunking = ChunkingConfig {
            strategy,
            tokenizer_path,
            max_tokens: parse_var(&lookup, "CHUNK_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            overlap: parse_var(&lookup, "CHUNK_OVERLAP", DEFAULT_OVERLAP)?,
            max_words: parse_var(&lookup, "CHUNK_MAX_WORDS", DEFAULT_MAX_WORDS)?,
        };

        let summary = SummaryBounds::new(
            parse_var(&lookup, "SUMMARY_MIN_LENGTH", DEFAULT_MIN_LENGTH)?,
            parse_var(&lookup, "SUMMARY_MAX_LENGTH", DEFAULT_MAX_LENGTH)?,
        )?;

        Ok(Self {
            inference,
            chunking,
            summary,
            condense: parse_bool(&lookup, "CONDENSE", true)?,
            host: lookup("BACKEND_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var(&lookup, "BACKEND_PORT", 3010u16)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_env_file(path: &Path) -> ConfigResult<HashMap<String, String>> {
    let env_file_error = |reason: String| ConfigError::EnvFile {
        path: path.display().to_string(),
        reason,
    };
    let iter = dotenvy::from_path_iter(path).map_err(|e| env_file_error(e.to_string()))?;
    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| env_file_error(e.to_string()))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> ConfigResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        },
        None => Ok(default),
    }
}
