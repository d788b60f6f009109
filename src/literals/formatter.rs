//! Result formatting: turn a selection back into valid source text.

use std::ops::Range;

use super::common::{line_end, literal_summary, removed_summary, ASCII_ELLIPSIS, ELLIPSIS, MAX_INTERPOLATION_EXTENSION};
use super::elements::{Element, ElementList};
use super::error::LiteralError;
use super::interpolation::InterpolationAnalyzer;
use super::profile::{CollectionProfile, CommentSyntax, LanguageRegistry, PlaceholderStyle, PlaceholderThresholds, StringProfile};
use super::selector::{DfsSelection, NestedSelection};
use super::structure::ParsedLiteral;
use super::tokens::TokenService;

/// Replacement text for one literal plus its out-of-band summary.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedResult {
    pub text: String,
    pub range: Range<usize>,
    /// Comment text (with its leading spacing) and the source offset it goes at.
    pub comment: Option<String>,
    pub comment_offset: Option<usize>,
    pub tokens_removed: usize,
    pub placeholder_tokens: usize,
    pub elements_kept: usize,
    pub elements_removed: usize,
    pub placeholders: usize,
}

/// Where a summary comment for the literal ending at `node_end` goes, and its text.
///
/// Closing punctuation to end of line gets a trailing line comment; otherwise the comment
/// goes inline after the literal, or at end of line when only line comments exist.
pub fn place_comment(source: &str, node_end: usize, summary: &str, comments: CommentSyntax) -> Option<(usize, String)> {
    if !comments.has_any() {
        return None;
    }
    let eol = line_end(source, node_end);
    let rest = source.get(node_end..eol)?;
    let rest_trimmed = rest.trim_end();
    let only_closers = rest_trimmed
        .chars()
        .all(|c| c.is_whitespace() || matches!(c, ';' | ',' | ')' | ']' | '}'));
    let spacing = if comments.block.is_some() { " " } else { "  " };

    if only_closers {
        if let Some(comment) = comments.line_comment(summary) {
            return Some((node_end + rest_trimmed.len(), format!("{}{}", spacing, comment)));
        }
    }
    if let Some(comment) = comments.block_comment(summary) {
        return Some((node_end, format!(" {}", comment)));
    }
    if rest_trimmed.ends_with('\\') {
        return None;
    }
    comments
        .line_comment(summary)
        .map(|comment| (node_end + rest_trimmed.len(), format!("{}{}", spacing, comment)))
}

/// Shorten `cut` so it never ends inside an escape sequence.
pub fn escape_safe_cut(content: &str, cut: usize) -> usize {
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < cut {
        if bytes[i] == b'\\' {
            let end = i + escape_len(&bytes[i..]);
            if end > cut {
                return i;
            }
            i = end;
        } else {
            i += 1;
        }
    }
    cut
}

fn escape_len(rest: &[u8]) -> usize {
    let braced = || rest.iter().position(|&b| b == b'}').map_or(rest.len() + 1, |p| p + 1);
    match rest.get(1) {
        None => 1,
        Some(b'x') => 4,
        Some(b'u') if rest.get(2) == Some(&b'{') => braced(),
        Some(b'N') if rest.get(2) == Some(&b'{') => braced(),
        Some(b'u') => 6,
        Some(b'U') => 10,
        Some(b'0'..=b'7') => 1 + rest[1..].iter().take(3).take_while(|b| (b'0'..=b'7').contains(b)).count(),
        Some(&lead) => 1 + utf8_len(lead),
    }
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

/// Rendered collection text and what its placeholders cost.
struct Rendered {
    text: String,
    placeholder_tokens: usize,
    placeholders: usize,
    end_style: bool,
}

pub struct ResultFormatter<'a> {
    pub registry: &'a LanguageRegistry,
    pub tokens: &'a dyn TokenService,
    pub thresholds: PlaceholderThresholds,
    pub source: &'a str,
}

impl<'a> ResultFormatter<'a> {
    pub fn new(
        registry: &'a LanguageRegistry,
        tokens: &'a dyn TokenService,
        thresholds: PlaceholderThresholds,
        source: &'a str,
    ) -> Self {
        Self {
            registry,
            tokens,
            thresholds,
            source,
        }
    }

    // ============ Strings ============

    /// Truncate a string literal to `budget`, keeping interpolations and escapes whole.
    pub fn format_string(
        &self,
        parsed: &ParsedLiteral,
        profile: &StringProfile,
        budget: usize,
    ) -> Result<Option<FormattedResult>, LiteralError> {
        let content = parsed.content.as_str();
        let marker = if is_byte_string(&parsed.opening, profile.byte_prefix) {
            ASCII_ELLIPSIS
        } else {
            ELLIPSIS
        };

        let overhead = self.tokens.count_tokens(&parsed.head())
            + self.tokens.count_tokens(&parsed.closing)
            + self.tokens.count_tokens(marker);
        let kept = self.tokens.truncate_to_tokens(content, budget.saturating_sub(overhead));
        if kept.len() >= content.len() {
            return Ok(None);
        }

        let cut = escape_safe_cut(content, kept.len());
        let cut = InterpolationAnalyzer::analyze(content, &parsed.opening, profile.interpolation)
            .adjust_cut(cut, MAX_INTERPOLATION_EXTENSION)?;
        if cut >= content.len() {
            return Ok(None);
        }

        let text = format!("{}{}{}{}", parsed.head(), &content[..cut], marker, parsed.closing);
        let removed = self
            .tokens
            .count_tokens(content)
            .saturating_sub(self.tokens.count_tokens(&content[..cut]));
        let summary = literal_summary(profile.label, removed);

        self.finish(parsed, text, removed, self.tokens.count_tokens(marker), Some(summary), (1, 0), 1)
            .map(Some)
    }

    // ============ Collections ============

    /// Rebuild a collection from its selection, nested trims included.
    pub fn format_collection(
        &self,
        parsed: &ParsedLiteral,
        profile: &CollectionProfile,
        list: &ElementList,
        dfs: &DfsSelection,
    ) -> Result<Option<FormattedResult>, LiteralError> {
        if !dfs.is_trimmed() {
            return Ok(None);
        }

        let rendered = self.render_collection(parsed, profile, list, dfs, false)?;
        let new_tokens = self.tokens.count_tokens(&rendered.text);
        let removed = parsed
            .original_tokens
            .saturating_sub(new_tokens.saturating_sub(rendered.placeholder_tokens));
        let summary = rendered.end_style.then(|| literal_summary(profile.label, removed));

        self.finish(
            parsed,
            rendered.text,
            removed,
            rendered.placeholder_tokens,
            summary,
            (dfs.selection.kept_count(), dfs.selection.removed_count()),
            rendered.placeholders,
        )
        .map(Some)
    }

    /// Place the summary, then enforce the strict-saving and placeholder thresholds.
    fn finish(
        &self,
        parsed: &ParsedLiteral,
        text: String,
        removed: usize,
        inline_placeholder_tokens: usize,
        summary: Option<String>,
        (elements_kept, elements_removed): (usize, usize),
        placeholders: usize,
    ) -> Result<FormattedResult, LiteralError> {
        let placement = summary
            .and_then(|s| place_comment(self.source, parsed.range.end, &s, self.registry.comments()));
        let comment_tokens = placement.as_ref().map_or(0, |(_, c)| self.tokens.count_tokens(c));
        let placeholder_tokens = inline_placeholder_tokens + comment_tokens;
        let new_tokens = self.tokens.count_tokens(&text) + comment_tokens;

        if new_tokens >= parsed.original_tokens || !self.thresholds.justified(removed, placeholder_tokens) {
            return Err(LiteralError::PlaceholderBelowThreshold {
                saved: removed,
                placeholder: placeholder_tokens,
            });
        }

        let (comment_offset, comment) = match placement {
            Some((offset, comment)) => (Some(offset), Some(comment)),
            None => (None, None),
        };
        Ok(FormattedResult {
            text,
            range: parsed.range.clone(),
            comment,
            comment_offset,
            tokens_removed: removed,
            placeholder_tokens,
            elements_kept,
            elements_removed,
            placeholders,
        })
    }

    fn render_collection(
        &self,
        parsed: &ParsedLiteral,
        profile: &CollectionProfile,
        list: &ElementList,
        dfs: &DfsSelection,
        nested: bool,
    ) -> Result<Rendered, LiteralError> {
        let mut placeholder_tokens = 0;
        let mut placeholders = 0;
        let mut items = Vec::with_capacity(dfs.selection.kept.len());
        for &idx in &dfs.selection.kept {
            let element = &list.elements[idx];
            let text = match dfs.nested.get(&idx) {
                Some(sub) => {
                    let (text, sub_rendered) = self.substitute_nested(element, sub)?;
                    placeholder_tokens += sub_rendered.placeholder_tokens;
                    placeholders += sub_rendered.placeholders;
                    text
                }
                None => element.text.clone(),
            };
            items.push((text, element.trailing_comment.as_deref()));
        }

        if !dfs.selection.is_trimmed() {
            let text = self.assemble(parsed, profile, list, items, None, None);
            return Ok(Rendered {
                text,
                placeholder_tokens,
                placeholders,
                end_style: false,
            });
        }

        let style = self
            .effective_style(parsed, profile, list, dfs)
            .ok_or_else(|| LiteralError::unparsable("collection", "no placeholder form for this language"))?;
        let comments = self.registry.comments();
        let summary = removed_summary(dfs.selection.removed_count(), dfs.selection.tokens_removed);
        placeholders += 1;

        let mut text = match style {
            PlaceholderStyle::End => {
                let element = profile.placeholder_element.unwrap_or(ELLIPSIS);
                placeholder_tokens += self.tokens.count_tokens(element);
                self.assemble(parsed, profile, list, items, Some(element), None)
            }
            PlaceholderStyle::MiddleComment => {
                let comment = if parsed.multiline {
                    comments.line_comment(&summary).or_else(|| comments.block_comment(&summary))
                } else {
                    comments.block_comment(&summary)
                }
                .ok_or_else(|| LiteralError::unparsable("collection", "language has no comments"))?;
                placeholder_tokens += self.tokens.count_tokens(&comment);
                self.assemble(parsed, profile, list, items, None, Some(&comment))
            }
        };

        let end_style = style == PlaceholderStyle::End;
        if nested && end_style {
            let saved = parsed.original_tokens.saturating_sub(self.tokens.count_tokens(&text));
            if let Some(comment) = comments.block_comment(&literal_summary(profile.label, saved)) {
                placeholder_tokens += self.tokens.count_tokens(&comment) + 1;
                text.push(' ');
                text.push_str(&comment);
            }
        }

        Ok(Rendered {
            text,
            placeholder_tokens,
            placeholders,
            end_style,
        })
    }

    /// Element text with its nested literal replaced by the trimmed rendering.
    fn substitute_nested(&self, element: &Element, sub: &NestedSelection) -> Result<(String, Rendered), LiteralError> {
        let profile = self
            .registry
            .profiles
            .get(sub.profile)
            .and_then(|p| p.collection())
            .ok_or_else(|| LiteralError::unparsable("collection", "nested profile is not a collection"))?;
        let rendered = self.render_collection(&sub.parsed, profile, &sub.elements, &sub.selection, true)?;
        let text = format!(
            "{}{}{}",
            &element.text[..sub.offset],
            rendered.text,
            &element.text[sub.offset + sub.len..]
        );
        Ok((text, rendered))
    }

    /// End placeholder unless it would break a typed collection or the profile prefers a comment.
    fn effective_style(
        &self,
        parsed: &ParsedLiteral,
        profile: &CollectionProfile,
        list: &ElementList,
        dfs: &DfsSelection,
    ) -> Option<PlaceholderStyle> {
        let comments = self.registry.comments();
        if profile.style == PlaceholderStyle::End && profile.placeholder_element.is_some() {
            let kept_strings = dfs
                .selection
                .kept
                .iter()
                .all(|&idx| self.is_string_like(&list.elements[idx].raw));
            if profile.kv_separator.is_some() || kept_strings || comments.block.is_none() {
                return Some(PlaceholderStyle::End);
            }
        }

        let comment_fits = comments.block.is_some() || (parsed.multiline && comments.line.is_some());
        if comment_fits {
            Some(PlaceholderStyle::MiddleComment)
        } else {
            profile.placeholder_element.map(|_| PlaceholderStyle::End)
        }
    }

    fn is_string_like(&self, raw: &str) -> bool {
        let body = raw.trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim_start_matches('#');
        self.registry.lexical.quotes.iter().any(|q| body.starts_with(q))
    }

    /// Lay out kept items, then either a placeholder element or a middle comment.
    fn assemble(
        &self,
        parsed: &ParsedLiteral,
        profile: &CollectionProfile,
        list: &ElementList,
        items: Vec<(String, Option<&str>)>,
        placeholder: Option<&str>,
        middle_comment: Option<&str>,
    ) -> String {
        let sep = profile.separator;
        let mut out = parsed.head();

        if parsed.multiline {
            let indent = &parsed.element_indent;
            let count = items.len();
            for (pos, (text, trailing)) in items.into_iter().enumerate() {
                let is_last = pos + 1 == count && placeholder.is_none();
                out.push('\n');
                out.push_str(indent);
                out.push_str(&text);
                if !is_last || list.trailing_separator {
                    out.push_str(sep);
                }
                if let Some(comment) = trailing {
                    out.push(' ');
                    out.push_str(comment);
                }
            }
            if let Some(element) = placeholder {
                out.push('\n');
                out.push_str(indent);
                out.push_str(element);
                if list.trailing_separator {
                    out.push_str(sep);
                }
            }
            if let Some(comment) = middle_comment {
                out.push('\n');
                out.push_str(indent);
                out.push_str(comment);
            }
            out.push('\n');
            out.push_str(&parsed.base_indent);
        } else {
            let content = parsed.content.as_str();
            let pad_left = &content[..content.len() - content.trim_start().len()];
            let pad_right = &content[content.trim_end().len()..];

            let mut parts: Vec<String> = items.into_iter().map(|(text, _)| text).collect();
            if let Some(element) = placeholder {
                parts.push(element.to_string());
            }
            let mut joined = parts.join(&format!("{} ", sep));
            if list.trailing_separator && !parts.is_empty() {
                joined.push_str(sep);
            }
            if let Some(comment) = middle_comment {
                if !joined.is_empty() {
                    joined.push(' ');
                }
                joined.push_str(comment);
            }
            out.push_str(pad_left);
            out.push_str(&joined);
            out.push_str(pad_right);
        }

        out.push_str(&parsed.closing);
        out
    }
}

fn is_byte_string(opening: &str, byte_prefix: Option<char>) -> bool {
    let Some(prefix) = byte_prefix else {
        return false;
    };
    opening
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .any(|c| c.eq_ignore_ascii_case(&prefix))
}
