//! Create-then-populate blocks: an empty container followed by statements filling it.
//!
//! Literal arguments inside the statements are trimmed before this runs (they are
//! deeper in the tree), so statement costs are measured on their composed text.

use log::trace;
use tree_sitter::Node;

use super::{LiteralProcessor, ProcessContext};
use crate::literals::common::removed_summary;
use crate::literals::error::LiteralError;
use crate::literals::profile::LiteralProfile;
use crate::literals::result::{TrimKind, TrimResult};
use crate::literals::selector::select_flat;

const LABEL: &str = "initializer block";

pub struct BlockInitProcessor;

impl LiteralProcessor for BlockInitProcessor {
    fn name(&self) -> &'static str {
        "block-init"
    }

    fn applies(&self, profile: &LiteralProfile, _node: Node, _source: &[u8]) -> bool {
        matches!(profile, LiteralProfile::BlockInit(_))
    }

    fn process(
        &self,
        ctx: &ProcessContext,
        node: Node,
        profile: &LiteralProfile,
        budget: usize,
    ) -> Result<Option<TrimResult>, LiteralError> {
        let LiteralProfile::BlockInit(block) = profile else {
            return Ok(None);
        };

        let init_text = ctx.node_text(node);
        let Some(var) = block.container_name(&init_text) else {
            return Ok(None);
        };
        let mutation = block.mutation_pattern(var);

        let mut statements = Vec::new();
        let mut sibling = node.next_named_sibling();
        while let Some(stmt) = sibling {
            sibling = stmt.next_named_sibling();
            if stmt.kind().contains("comment") {
                continue;
            }
            let text = ctx.node_text(stmt);
            if !mutation.is_match(text.trim()) {
                break;
            }
            statements.push((stmt.start_byte()..stmt.end_byte(), text));
        }
        trace!("{} populating statements for `{}`", statements.len(), var);
        if statements.len() <= block.min_elements {
            return Ok(None);
        }

        let costs: Vec<usize> = statements.iter().map(|(_, t)| ctx.tokens.count_tokens(t)).collect();
        let init_tokens = ctx.tokens.count_tokens(&init_text);
        let original_tokens = init_tokens + costs.iter().sum::<usize>();
        if original_tokens <= budget {
            return Ok(None);
        }

        let comments = ctx.registry.comments();
        let estimate = comments
            .line_comment(&removed_summary(statements.len(), original_tokens))
            .map_or(0, |c| ctx.tokens.count_tokens(&c));
        let selection = select_flat(
            &costs,
            budget.saturating_sub(init_tokens + estimate),
            block.min_elements,
        );
        let Some(&first_removed) = selection.removed.first() else {
            return Ok(None);
        };

        let placeholder = comments
            .line_comment(&removed_summary(selection.removed_count(), selection.tokens_removed))
            .ok_or_else(|| LiteralError::unparsable("block initializer", "language has no line comments"))?;
        let placeholder_tokens = ctx.tokens.count_tokens(&placeholder);
        let trimmed_tokens = original_tokens - selection.tokens_removed + placeholder_tokens;
        if trimmed_tokens >= original_tokens || !ctx.thresholds.justified(selection.tokens_removed, placeholder_tokens) {
            return Err(LiteralError::PlaceholderBelowThreshold {
                saved: selection.tokens_removed,
                placeholder: placeholder_tokens,
            });
        }

        let start = statements[first_removed].0.start;
        let end = statements.last().map_or(start, |(range, _)| range.end);
        Ok(Some(TrimResult {
            kind: TrimKind::BlockInit,
            label: LABEL,
            text: placeholder,
            range: start..end,
            original_tokens,
            trimmed_tokens,
            saved_tokens: original_tokens - trimmed_tokens,
            elements_kept: selection.kept_count(),
            elements_removed: selection.removed_count(),
            comment: None,
            comment_offset: None,
            placeholders: 1,
            replaced_nodes: selection
                .removed
                .iter()
                .map(|&idx| statements[idx].0.clone())
                .collect(),
        }))
    }
}
