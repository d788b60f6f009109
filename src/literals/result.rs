//! Per-literal outcomes and file-level metrics.

use std::ops::Range;

use serde::Serialize;

use super::formatter::FormattedResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimKind {
    String,
    Collection,
    ImplicitSequence,
    BlockInit,
}

/// Outcome of trimming one literal node.
#[derive(Debug, Clone, Serialize)]
pub struct TrimResult {
    pub kind: TrimKind,
    pub label: &'static str,
    pub text: String,
    /// Original source span the text replaces.
    pub range: Range<usize>,
    pub original_tokens: usize,
    pub trimmed_tokens: usize,
    pub saved_tokens: usize,
    pub elements_kept: usize,
    pub elements_removed: usize,
    pub comment: Option<String>,
    pub comment_offset: Option<usize>,
    pub placeholders: usize,
    /// Source nodes removed as a group (statements, fragments); comments describing
    /// literals inside the range go with them.
    pub replaced_nodes: Vec<Range<usize>>,
}

impl TrimResult {
    pub fn from_formatted(kind: TrimKind, label: &'static str, original_tokens: usize, formatted: FormattedResult, trimmed_tokens: usize) -> Self {
        Self {
            kind,
            label,
            original_tokens,
            trimmed_tokens,
            saved_tokens: original_tokens.saturating_sub(trimmed_tokens),
            elements_kept: formatted.elements_kept,
            elements_removed: formatted.elements_removed,
            comment: formatted.comment,
            comment_offset: formatted.comment_offset,
            placeholders: formatted.placeholders,
            replaced_nodes: Vec::new(),
            range: formatted.range,
            text: formatted.text,
        }
    }
}

/// Aggregate counters over every trim that survived into the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiteralMetrics {
    pub strings_trimmed: usize,
    pub collections_trimmed: usize,
    pub blocks_trimmed: usize,
    pub tokens_saved: usize,
    pub bytes_saved: usize,
    pub placeholders: usize,
}

impl LiteralMetrics {
    pub fn from_trims(trims: &[TrimResult], original_len: usize, optimized_len: usize) -> Self {
        let mut metrics = Self {
            bytes_saved: original_len.saturating_sub(optimized_len),
            ..Self::default()
        };
        for trim in trims {
            match trim.kind {
                TrimKind::String | TrimKind::ImplicitSequence => metrics.strings_trimmed += 1,
                TrimKind::Collection => metrics.collections_trimmed += 1,
                TrimKind::BlockInit => metrics.blocks_trimmed += 1,
            }
            metrics.tokens_saved += trim.saved_tokens;
            metrics.placeholders += trim.placeholders;
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trim(kind: TrimKind, saved: usize) -> TrimResult {
        TrimResult {
            kind,
            label: "literal",
            text: String::new(),
            range: 0..0,
            original_tokens: saved + 5,
            trimmed_tokens: 5,
            saved_tokens: saved,
            elements_kept: 1,
            elements_removed: 2,
            comment: None,
            comment_offset: None,
            placeholders: 1,
            replaced_nodes: Vec::new(),
        }
    }

    #[test]
    fn test_metrics_aggregate() {
        let trims = vec![
            trim(TrimKind::String, 10),
            trim(TrimKind::ImplicitSequence, 4),
            trim(TrimKind::Collection, 20),
            trim(TrimKind::BlockInit, 7),
        ];
        let metrics = LiteralMetrics::from_trims(&trims, 500, 320);
        assert_eq!(metrics.strings_trimmed, 2);
        assert_eq!(metrics.collections_trimmed, 1);
        assert_eq!(metrics.blocks_trimmed, 1);
        assert_eq!(metrics.tokens_saved, 41);
        assert_eq!(metrics.bytes_saved, 180);
        assert_eq!(metrics.placeholders, 4);
    }

    #[test]
    fn test_metrics_serialize() {
        let json = serde_json::to_value(LiteralMetrics::default()).unwrap();
        assert_eq!(json["tokens_saved"], 0);
        let kind = serde_json::to_value(TrimKind::BlockInit).unwrap();
        assert_eq!(kind, "block_init");
    }
}
