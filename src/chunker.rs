// src/chunker.rs
// Splits pasted text into pieces small enough for the remote model's input limit.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{ChunkingError, ConfigError};

pub const DEFAULT_MAX_TOKENS: usize = 900;
pub const DEFAULT_OVERLAP: usize = 60;
pub const DEFAULT_MAX_WORDS: usize = 500;

/// One piece of the input, identified only by its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Chunking policy. Implementations are stateless, so the same text always
/// yields the same sequence.
pub trait Chunker: Send + Sync {
    fn chunk(&self, text: &str) -> Result<Vec<Chunk>, ChunkingError>;
    fn name(&self) -> &'static str;
}

/// Unify line endings and strip surrounding whitespace.
pub fn normalize_input(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}

fn into_chunks(pieces: impl IntoIterator<Item = String>) -> Vec<Chunk> {
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, text })
        .collect()
}

/// Consecutive runs of up to `max_words` whitespace-delimited words.
#[derive(Debug, Clone)]
pub struct WordChunker {
    max_words: usize,
}

impl WordChunker {
    pub fn new(max_words: usize) -> Result<Self, ChunkingError> {
        if max_words == 0 {
            return Err(ChunkingError::ZeroWindow);
        }
        Ok(Self { max_words })
    }
}

impl Chunker for WordChunker {
    fn chunk(&self, text: &str) -> Result<Vec<Chunk>, ChunkingError> {
        let normalized = normalize_input(text);
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let chunks = into_chunks(words.chunks(self.max_words).map(|run| run.join(" ")));
        debug!(words = words.len(), chunks = chunks.len(), "Word chunking complete");
        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "words"
    }
}

/// Model-specific text <-> token id mapping.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ChunkingError>;
    fn decode(&self, ids: &[u32]) -> Result<String, ChunkingError>;
}

/// `TokenCodec` backed by a Hugging Face `tokenizer.json`.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| ConfigError::TokenizerLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { inner })
    }
}

impl TokenCodec for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ChunkingError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| ChunkingError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, ChunkingError> {
        self.inner
            .decode(ids, true)
            .map_err(|e| ChunkingError::Tokenizer(e.to_string()))
    }
}

/// Sliding windows of `max_tokens` tokens that advance by
/// `max_tokens - overlap`, so neighbouring chunks share `overlap` tokens.
pub struct TokenChunker<T: TokenCodec> {
    codec: T,
    max_tokens: usize,
    overlap: usize,
}

impl<T: TokenCodec> TokenChunker<T> {
    /// Rejects windows that could never make forward progress.
    pub fn new(codec: T, max_tokens: usize, overlap: usize) -> Result<Self, ChunkingError> {
        if max_tokens == 0 {
            return Err(ChunkingError::ZeroWindow);
        }
        if overlap >= max_tokens {
            return Err(ChunkingError::OverlapTooLarge { max_tokens, overlap });
        }
        Ok(Self {
            codec,
            max_tokens,
            overlap,
        })
    }

    fn step(&self) -> usize {
        self.max_tokens - self.overlap
    }
}

impl<T: TokenCodec> Chunker for TokenChunker<T> {
    fn chunk(&self, text: &str) -> Result<Vec<Chunk>, ChunkingError> {
        let normalized = normalize_input(text);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let tokens = self.codec.encode(&normalized)?;
        let mut pieces = Vec::new();
        let mut start = 0;
        while start < tokens.len() {
            let end = (start + self.max_tokens).min(tokens.len());
            let decoded = self.codec.decode(&tokens[start..end])?;
            let piece = decoded.trim();
            if !piece.is_empty() {
                pieces.push(piece.to_string());
            }
            start += self.step();
        }

        debug!(
            tokens = tokens.len(),
            max_tokens = self.max_tokens,
            overlap = self.overlap,
            chunks = pieces.len(),
            "Token chunking complete"
        );
        Ok(into_chunks(pieces))
    }

    fn name(&self) -> &'static str {
        "tokens"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// One token per whitespace-delimited word; ids index into a shared vocabulary.
    #[derive(Default)]
    struct WordCodec {
        vocab: Mutex<Vec<String>>,
    }

    impl TokenCodec for WordCodec {
        fn encode(&self, text: &str) -> Result<Vec<u32>, ChunkingError> {
            let mut vocab = self.vocab.lock().unwrap();
            Ok(text
                .split_whitespace()
                .map(|w| match vocab.iter().position(|v| v == w) {
                    Some(i) => i as u32,
                    None => {
                        vocab.push(w.to_string());
                        (vocab.len() - 1) as u32
                    }
                })
                .collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String, ChunkingError> {
            let vocab = self.vocab.lock().unwrap();
            Ok(ids
                .iter()
                .map(|&i| vocab[i as usize].as_str())
                .collect::<Vec<_>>()
                .join(" "))
        }
    }

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_word_chunks_respect_bound_and_rebuild_input() {
        let text = "The quick brown fox\njumps over\r\n the lazy dog and keeps running";
        let chunker = WordChunker::new(3).unwrap();
        let chunks = chunker.chunk(text).unwrap();

        assert!(chunks.iter().all(|c| c.word_count() <= 3));
        let rebuilt: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.text.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .collect();
        let original: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_word_chunker_emits_trailing_partial_run() {
        let chunks = WordChunker::new(4).unwrap().chunk(&numbered_words(10)).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].text, "w8 w9");
        assert_eq!(chunks.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let words = WordChunker::new(5).unwrap();
        assert!(words.chunk("").unwrap().is_empty());
        assert!(words.chunk("  \r\n\t ").unwrap().is_empty());

        let tokens = TokenChunker::new(WordCodec::default(), 5, 1).unwrap();
        assert!(tokens.chunk("   ").unwrap().is_empty());
    }

    #[test]
    fn test_zero_word_window_rejected() {
        assert_eq!(WordChunker::new(0).unwrap_err(), ChunkingError::ZeroWindow);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_window() {
        assert!(matches!(
            TokenChunker::new(WordCodec::default(), 10, 10),
            Err(ChunkingError::OverlapTooLarge { max_tokens: 10, overlap: 10 })
        ));
        assert!(matches!(
            TokenChunker::new(WordCodec::default(), 0, 0),
            Err(ChunkingError::ZeroWindow)
        ));
    }

    #[test]
    fn test_token_windows_stay_within_bound() {
        let codec = WordCodec::default();
        let chunker = TokenChunker::new(WordCodec::default(), 7, 2).unwrap();
        let chunks = chunker.chunk(&numbered_words(30)).unwrap();

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(codec.encode(&chunk.text).unwrap().len() <= 7);
        }
    }

    #[test]
    fn test_consecutive_token_windows_share_overlap() {
        let chunker = TokenChunker::new(WordCodec::default(), 6, 2).unwrap();
        let chunks = chunker.chunk(&numbered_words(15)).unwrap();

        // windows: [0,6) [4,10) [8,14) [12,15)
        assert_eq!(chunks.len(), 4);
        for pair in chunks.windows(2) {
            let prev: Vec<&str> = pair[0].text.split_whitespace().collect();
            let next: Vec<&str> = pair[1].text.split_whitespace().collect();
            let shared = 2.min(next.len());
            assert_eq!(&prev[prev.len() - 2..], &next[..shared]);
        }
        assert_eq!(chunks[3].text, "w12 w13 w14");
    }

    #[test]
    fn test_window_reaching_the_end_is_followed_by_its_overlap_tail() {
        let chunker = TokenChunker::new(WordCodec::default(), 6, 2).unwrap();
        let chunks = chunker.chunk(&numbered_words(10)).unwrap();

        // windows start every 4 tokens until the start passes the end: 0, 4, 8
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["w0 w1 w2 w3 w4 w5", "w4 w5 w6 w7 w8 w9", "w8 w9"]);
    }

    #[test]
    fn test_short_text_is_a_single_token_window() {
        let chunker = TokenChunker::new(WordCodec::default(), 900, 60).unwrap();
        let chunks = chunker.chunk("Once upon a time.").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Once upon a time.");
    }

    #[test]
    fn test_normalize_input() {
        assert_eq!(normalize_input("  a\r\nb \n"), "a\nb");
    }
}
