//! Token counting and token-bounded truncation.
//!
//! The pipeline only talks to [`TokenService`]. Production code uses the
//! `cl100k_base` BPE from tiktoken; the character estimator is the fallback when
//! the BPE tables cannot be loaded and keeps tests deterministic.

use log::warn;
use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;

pub trait TokenService: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;

    /// Longest prefix of `text` (on a char boundary) costing at most `max_tokens`.
    fn truncate_to_tokens(&self, text: &str, max_tokens: usize) -> String {
        if self.count_tokens(text) <= max_tokens {
            return text.to_string();
        }

        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(text.len()))
            .collect();

        // bounds[lo] always fits: the empty prefix costs nothing
        let (mut lo, mut hi) = (0usize, bounds.len() - 1);
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if self.count_tokens(&text[..bounds[mid]]) <= max_tokens {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        text[..bounds[lo]].to_string()
    }
}

// ============ Estimator ============

/// Fixed chars-per-token estimate, rounded up.
#[derive(Debug, Clone, Copy)]
pub struct EstimatingTokenService {
    pub chars_per_token: usize,
}

impl EstimatingTokenService {
    pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for EstimatingTokenService {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHARS_PER_TOKEN)
    }
}

impl TokenService for EstimatingTokenService {
    fn count_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }

    fn truncate_to_tokens(&self, text: &str, max_tokens: usize) -> String {
        let max_chars = max_tokens.saturating_mul(self.chars_per_token);
        text.chars().take(max_chars).collect()
    }
}

// ============ Tiktoken ============

static CL100K: Lazy<Option<CoreBPE>> = Lazy::new(|| match tiktoken_rs::cl100k_base() {
    Ok(bpe) => Some(bpe),
    Err(err) => {
        warn!("cl100k_base tokenizer unavailable, falling back to estimates: {}", err);
        None
    }
});

/// BPE-accurate counts using the shared `cl100k_base` encoder.
#[derive(Clone, Copy)]
pub struct TiktokenService {
    bpe: &'static CoreBPE,
}

impl TiktokenService {
    pub fn shared() -> Option<Self> {
        CL100K.as_ref().map(|bpe| Self { bpe })
    }
}

impl TokenService for TiktokenService {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }
}

static DEFAULT_SERVICE: Lazy<Box<dyn TokenService>> = Lazy::new(|| match TiktokenService::shared() {
    Some(service) => Box::new(service),
    None => Box::new(EstimatingTokenService::default()),
});

/// Process-wide token service: tiktoken when available, the estimator otherwise.
pub fn default_token_service() -> &'static dyn TokenService {
    DEFAULT_SERVICE.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimator_rounds_up() {
        let tokens = EstimatingTokenService::new(4);
        assert_eq!(tokens.count_tokens(""), 0);
        assert_eq!(tokens.count_tokens("abc"), 1);
        assert_eq!(tokens.count_tokens("abcde"), 2);
    }

    #[test]
    fn test_estimator_truncates_on_char_boundary() {
        let tokens = EstimatingTokenService::new(1);
        assert_eq!(tokens.truncate_to_tokens("héllo", 2), "hé");
    }

    #[test]
    fn test_default_truncation_fits_budget() {
        let service = default_token_service();
        let text = "The quick brown fox jumps over the lazy dog, again and again and again.";
        let cut = service.truncate_to_tokens(text, 5);
        assert!(service.count_tokens(&cut) <= 5);
        assert!(text.starts_with(&cut));
        assert!(cut.len() < text.len());
    }

    struct WordCounter;

    impl TokenService for WordCounter {
        fn count_tokens(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    #[test]
    fn test_binary_search_truncation_is_monotonic() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda";
        let mut previous = 0;
        for budget in 0..14 {
            let cut = WordCounter.truncate_to_tokens(text, budget);
            assert!(WordCounter.count_tokens(&cut) <= budget);
            assert!(cut.len() >= previous);
            previous = cut.len();
        }
        assert_eq!(WordCounter.truncate_to_tokens(text, 2), "alpha beta ");
    }
}
