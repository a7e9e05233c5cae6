//! Token-aware recursive text splitting.
//!
//! Text is split on the coarsest separator present (paragraphs, then lines, then
//! words, then characters), and adjacent pieces are greedily merged back while
//! the running token count stays within the chunk budget. Chunks never overlap.

use std::fmt;

use tiktoken_rs::CoreBPE;
use tracing::debug;

/// Default chunk budget, in tokens.
pub const DEFAULT_CHUNK_TOKENS: usize = 1000;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, thiserror::Error)]
#[error("tokenizer unavailable for model '{model}': {message}")]
pub struct TokenizerError {
    pub model: String,
    pub message: String,
}

/// Splits text into chunks of at most `chunk_tokens` tokens of the model's encoding.
pub struct TokenSplitter {
    bpe: CoreBPE,
    chunk_tokens: usize,
}

impl fmt::Debug for TokenSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSplitter")
            .field("chunk_tokens", &self.chunk_tokens)
            .finish_non_exhaustive()
    }
}

impl TokenSplitter {
    /// Use the model's encoding, or `cl100k_base` for models tiktoken doesn't know.
    pub fn for_model(model: &str, chunk_tokens: usize) -> Result<Self, TokenizerError> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(err) => {
                debug!(model, error = %err, "unknown model encoding, using cl100k_base");
                tiktoken_rs::cl100k_base().map_err(|e| TokenizerError {
                    model: model.to_string(),
                    message: e.to_string(),
                })?
            }
        };
        Ok(Self {
            bpe,
            chunk_tokens: chunk_tokens.max(1),
        })
    }

    pub fn chunk_tokens(&self) -> usize {
        self.chunk_tokens
    }

    /// Number of tokens in `text`.
    pub fn token_len(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Split `text` into ordered, trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(idx).copied().unwrap_or("");
        let finer = separators.get(idx + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in pieces {
            if self.token_len(piece) < self.chunk_tokens {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if finer.is_empty() {
                push_trimmed(&mut chunks, piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    /// Greedily join small pieces while the budget allows.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = self.token_len(separator);
        let mut out = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = self.token_len(piece);
            let joiner = if current.is_empty() { 0 } else { sep_len };
            if !current.is_empty() && total + joiner + len > self.chunk_tokens {
                push_trimmed(&mut out, current.join(separator));
                current.clear();
                total = 0;
            }
            let joiner = if current.is_empty() { 0 } else { sep_len };
            current.push(piece);
            total += joiner + len;
        }
        if !current.is_empty() {
            push_trimmed(&mut out, current.join(separator));
        }
        out
    }
}

fn push_trimmed(out: &mut Vec<String>, chunk: String) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
