//! Tunables for literal trimming, loadable from JSON.

use serde::{Deserialize, Serialize};

use super::error::LiteralError;
use super::profile::PlaceholderThresholds;

pub const DEFAULT_MAX_TOKENS: usize = 40;
pub const DEFAULT_NESTED_BUDGET_FLOOR: usize = 4;
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralOptions {
    /// Token ceiling for the rendered form of any single literal.
    pub max_tokens: usize,
    /// Overrides the registry's savings-to-placeholder ratio when set.
    pub min_savings_ratio: Option<f64>,
    /// Overrides the registry's absolute minimum saving when set.
    pub min_saved_tokens: Option<usize>,
    /// Smallest sub-budget handed to a nested literal.
    pub nested_budget_floor: usize,
    pub max_nesting_depth: usize,
    pub skip_block_init: bool,
    pub skip_implicit_sequences: bool,
}

impl Default for LiteralOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            min_savings_ratio: None,
            min_saved_tokens: None,
            nested_budget_floor: DEFAULT_NESTED_BUDGET_FLOOR,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            skip_block_init: false,
            skip_implicit_sequences: false,
        }
    }
}

impl LiteralOptions {
    pub fn from_json(json: &str) -> Result<Self, LiteralError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Registry thresholds with any overrides from these options applied.
    pub fn thresholds(&self, base: PlaceholderThresholds) -> PlaceholderThresholds {
        PlaceholderThresholds {
            min_savings_ratio: self.min_savings_ratio.unwrap_or(base.min_savings_ratio),
            min_saved_tokens: self.min_saved_tokens.unwrap_or(base.min_saved_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = LiteralOptions::from_json(r#"{"max_tokens": 12}"#).unwrap();
        assert_eq!(options.max_tokens, 12);
        assert_eq!(options.nested_budget_floor, DEFAULT_NESTED_BUDGET_FLOOR);
        assert!(!options.skip_block_init);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = LiteralOptions::from_json("{max_tokens: }").unwrap_err();
        assert!(matches!(err, LiteralError::InvalidOptions(_)));
    }

    #[test]
    fn test_threshold_overrides() {
        let base = PlaceholderThresholds::default();
        let options = LiteralOptions {
            min_savings_ratio: Some(3.5),
            ..LiteralOptions::default()
        };
        let merged = options.thresholds(base);
        assert_eq!(merged.min_savings_ratio, 3.5);
        assert_eq!(merged.min_saved_tokens, base.min_saved_tokens);
    }
}
