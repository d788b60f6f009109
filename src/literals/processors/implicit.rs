//! Adjacent string fragments joined without a separator (`"a" "b" "c"`).

use tree_sitter::Node;

use super::{LiteralProcessor, ProcessContext};
use crate::literals::common::{literal_summary, ASCII_ELLIPSIS, ELLIPSIS};
use crate::literals::error::LiteralError;
use crate::literals::formatter::place_comment;
use crate::literals::profile::{LiteralProfile, StringProfile};
use crate::literals::result::{TrimKind, TrimResult};
use crate::literals::selector::select_flat;
use crate::literals::structure::string_delimiters;

pub struct ImplicitSequenceProcessor;

impl ImplicitSequenceProcessor {
    fn fragment_profile<'r>(ctx: &'r ProcessContext, kind: &str) -> Option<&'r StringProfile> {
        ctx.registry.profiles.iter().find_map(|p| match p {
            LiteralProfile::String(sp) if sp.matcher.kinds.contains(&kind) => Some(sp),
            _ => None,
        })
    }
}

impl LiteralProcessor for ImplicitSequenceProcessor {
    fn name(&self) -> &'static str {
        "implicit-sequence"
    }

    fn applies(&self, profile: &LiteralProfile, _node: Node, _source: &[u8]) -> bool {
        profile.implicit_sequence().is_some()
    }

    fn process(
        &self,
        ctx: &ProcessContext,
        node: Node,
        profile: &LiteralProfile,
        budget: usize,
    ) -> Result<Option<TrimResult>, LiteralError> {
        let Some(sequence) = profile.implicit_sequence() else {
            return Ok(None);
        };

        let original = ctx.node_text(node);
        let original_tokens = ctx.tokens.count_tokens(&original);
        if original_tokens <= budget {
            return Ok(None);
        }

        let mut cursor = node.walk();
        let fragments: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|child| sequence.fragment_kinds.contains(&child.kind()))
            .collect();
        if fragments.len() < 2 {
            return Ok(None);
        }

        let texts: Vec<String> = fragments.iter().map(|f| ctx.node_text(*f)).collect();
        let costs: Vec<usize> = texts.iter().map(|t| ctx.tokens.count_tokens(t)).collect();
        let selection = select_flat(
            &costs,
            budget.saturating_sub(ctx.tokens.count_tokens(ELLIPSIS)),
            sequence.min_elements.max(1),
        );
        if !selection.is_trimmed() {
            return Ok(None);
        }
        let Some(&last) = selection.kept.last() else {
            return Ok(None);
        };

        let last_node = fragments[last];
        let string_profile = Self::fragment_profile(ctx, last_node.kind())
            .ok_or_else(|| LiteralError::unparsable("implicit sequence", "no string profile for fragment"))?;
        let last_text = &texts[last];
        let (opening, closing) = string_delimiters(last_text, string_profile)
            .filter(|(open, close)| open.len() + close.len() <= last_text.len())
            .ok_or_else(|| LiteralError::unparsable("implicit sequence", "fragment delimiters"))?;
        let inner = &last_text[opening.len()..last_text.len() - closing.len()];
        let is_bytes = string_profile
            .byte_prefix
            .is_some_and(|b| opening.chars().take_while(|c| c.is_ascii_alphabetic()).any(|c| c.eq_ignore_ascii_case(&b)));
        let marker = if is_bytes { ASCII_ELLIPSIS } else { ELLIPSIS };

        let lead = ctx.editor.render_range(node.start_byte(), last_node.start_byte());
        let text = format!("{}{}{}{}{}", lead, opening, inner, marker, closing);

        let removed = selection.tokens_removed;
        let placement = place_comment(
            ctx.source,
            node.end_byte(),
            &literal_summary(sequence.label, removed),
            ctx.registry.comments(),
        );
        let comment_tokens = placement.as_ref().map_or(0, |(_, c)| ctx.tokens.count_tokens(c));
        let placeholder_tokens = ctx.tokens.count_tokens(marker) + comment_tokens;
        let trimmed_tokens = ctx.tokens.count_tokens(&text) + comment_tokens;

        if trimmed_tokens >= original_tokens || !ctx.thresholds.justified(removed, placeholder_tokens) {
            return Err(LiteralError::PlaceholderBelowThreshold {
                saved: removed,
                placeholder: placeholder_tokens,
            });
        }

        let (comment_offset, comment) = match placement {
            Some((offset, comment)) => (Some(offset), Some(comment)),
            None => (None, None),
        };
        Ok(Some(TrimResult {
            kind: TrimKind::ImplicitSequence,
            label: sequence.label,
            text,
            range: node.start_byte()..node.end_byte(),
            original_tokens,
            trimmed_tokens,
            saved_tokens: original_tokens - trimmed_tokens,
            elements_kept: selection.kept_count(),
            elements_removed: selection.removed_count(),
            comment,
            comment_offset,
            placeholders: 1,
            replaced_nodes: selection
                .removed
                .iter()
                .map(|&idx| fragments[idx].start_byte()..fragments[idx].end_byte())
                .collect(),
        }))
    }
}
