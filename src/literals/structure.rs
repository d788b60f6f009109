//! Structural parsing: delimiters, content span, indentation and wrapper of one literal.

use std::ops::Range;

use super::common::leading_whitespace;
use super::elements::Scanner;
use super::error::LiteralError;
use super::profile::{CollectionProfile, LexicalRules, StringProfile};
use super::tokens::TokenService;

/// One literal, split into its structural parts.
///
/// `text` is the literal as currently rendered (inner edits already applied);
/// `range` is the span it occupies in the original source.
#[derive(Debug, Clone)]
pub struct ParsedLiteral {
    pub text: String,
    pub range: Range<usize>,
    pub wrapper: String,
    pub opening: String,
    pub closing: String,
    pub content: String,
    pub multiline: bool,
    pub base_indent: String,
    pub element_indent: String,
    pub original_tokens: usize,
}

impl ParsedLiteral {
    /// Wrapper plus opening delimiter, i.e. everything before the content.
    pub fn head(&self) -> String {
        format!("{}{}", self.wrapper, self.opening)
    }

    /// Tokens spent on wrapper and delimiters.
    pub fn frame_tokens(&self, tokens: &dyn TokenService) -> usize {
        tokens.count_tokens(&self.head()) + tokens.count_tokens(&self.closing)
    }
}

// ============ Strings ============

/// Split a string literal into prefix+quote, content and closing quote.
pub fn parse_string(
    text: &str,
    range: Range<usize>,
    base_indent: &str,
    profile: &StringProfile,
    tokens: &dyn TokenService,
) -> Result<ParsedLiteral, LiteralError> {
    let (opening, closing) = string_delimiters(text, profile)
        .ok_or_else(|| LiteralError::unparsable("string", "no recognised quote"))?;

    if text.len() < opening.len() + closing.len() || !text.ends_with(&closing) {
        return Err(LiteralError::unparsable("string", "closing quote missing"));
    }
    let content = &text[opening.len()..text.len() - closing.len()];

    Ok(ParsedLiteral {
        text: text.to_string(),
        range,
        wrapper: String::new(),
        multiline: content.contains('\n'),
        content: content.to_string(),
        opening,
        closing,
        base_indent: base_indent.to_string(),
        element_indent: base_indent.to_string(),
        original_tokens: tokens.count_tokens(text),
    })
}

/// Opening (prefix letters, raw hashes, quote) and closing delimiter of a string.
pub fn string_delimiters(text: &str, profile: &StringProfile) -> Option<(String, String)> {
    let prefix_len = text
        .find(|c: char| !profile.prefix_chars.contains(c))
        .unwrap_or(text.len());
    let prefix = &text[..prefix_len];
    let rest = &text[prefix_len..];

    if profile.raw_hashes && prefix.contains('r') {
        let hashes = rest.len() - rest.trim_start_matches('#').len();
        let after = &rest[hashes..];
        if after.starts_with('"') {
            let hash_str = "#".repeat(hashes);
            return Some((
                format!("{}{}\"", prefix, hash_str),
                format!("\"{}", hash_str),
            ));
        }
        return None;
    }

    profile
        .quotes
        .iter()
        .find(|quote| rest.starts_with(**quote))
        .map(|quote| (format!("{}{}", prefix, quote), quote.to_string()))
}

// ============ Collections ============

/// Split a delimited collection into wrapper, delimiters and content.
///
/// Fails when no profile delimiter fits both ends, or when the opening bracket
/// does not close exactly at the end of the literal.
pub fn parse_collection(
    text: &str,
    range: Range<usize>,
    base_indent: &str,
    profile: &CollectionProfile,
    lexical: &LexicalRules,
    indent_unit: &str,
    tokens: &dyn TokenService,
) -> Result<ParsedLiteral, LiteralError> {
    let trimmed = text.trim_end();
    let (wrapper, opening, closing) = collection_delimiters(trimmed, profile)
        .ok_or_else(|| LiteralError::unparsable("collection", "delimiters do not match"))?;

    let start = wrapper.len() + opening.len();
    let end = trimmed.len() - closing.len();
    if start > end {
        return Err(LiteralError::unparsable("collection", "delimiters overlap"));
    }
    let content = &trimmed[start..end];

    if !Scanner::new(content, lexical).is_balanced() {
        return Err(LiteralError::unparsable("collection", "unbalanced content"));
    }

    let multiline = content.contains('\n');
    let element_indent = if multiline {
        detect_element_indent(content).unwrap_or_else(|| format!("{}{}", base_indent, indent_unit))
    } else {
        format!("{}{}", base_indent, indent_unit)
    };

    Ok(ParsedLiteral {
        text: trimmed.to_string(),
        range,
        wrapper: wrapper.to_string(),
        opening: opening.to_string(),
        closing: closing.to_string(),
        content: content.to_string(),
        multiline,
        base_indent: base_indent.to_string(),
        element_indent,
        original_tokens: tokens.count_tokens(trimmed),
    })
}

/// Wrapper tag and the longest profile delimiter pair fitting `text`.
pub fn collection_delimiters<'t>(
    text: &'t str,
    profile: &CollectionProfile,
) -> Option<(&'t str, &'static str, &'static str)> {
    let wrapper_len = profile
        .matcher
        .wrapper
        .as_ref()
        .and_then(|re| re.find(text))
        .filter(|m| m.start() == 0)
        .map_or(0, |m| m.end());

    // nested composite literals may omit the type prefix; calls never omit the callee
    let mut candidates = vec![wrapper_len];
    if profile.matcher.callee_field.is_none() && wrapper_len > 0 {
        candidates.push(0);
    } else if profile.matcher.callee_field.is_some() && wrapper_len == 0 {
        return None;
    }

    for offset in candidates {
        let rest = &text[offset..];
        let best = profile
            .delimiters
            .iter()
            .filter(|(open, close)| {
                rest.len() >= open.len() + close.len() && rest.starts_with(open) && rest.ends_with(close)
            })
            .max_by_key(|(open, _)| open.len());
        if let Some((open, close)) = best {
            return Some((&text[..offset], open, close));
        }
    }
    None
}

/// Indentation of the first non-blank content line after the opening line.
fn detect_element_indent(content: &str) -> Option<String> {
    content
        .lines()
        .skip(1)
        .find(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literals::profile::{NodeMatch, PlaceholderStyle};
    use crate::literals::tokens::EstimatingTokenService;
    use crate::literals::{python, rust_lang};

    fn tokens() -> EstimatingTokenService {
        EstimatingTokenService::new(4)
    }

    fn rust_string() -> StringProfile {
        match &rust_lang::REGISTRY.profiles[0] {
            crate::literals::profile::LiteralProfile::String(p) => p.clone(),
            other => panic!("expected string profile, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_parse_raw_string() {
        let parsed = parse_string("r#\"a \"quoted\" b\"#", 0..17, "", &rust_string(), &tokens()).unwrap();
        assert_eq!(parsed.opening, "r#\"");
        assert_eq!(parsed.closing, "\"#");
        assert_eq!(parsed.content, "a \"quoted\" b");
    }

    #[test]
    fn test_parse_prefixed_python_string() {
        let profile = match &python::REGISTRY.profiles[0] {
            crate::literals::profile::LiteralProfile::String(p) => p.clone(),
            other => panic!("expected string profile, got {}", other.kind_name()),
        };
        let parsed = parse_string("f'''hi {name}'''", 0..16, "", &profile, &tokens()).unwrap();
        assert_eq!(parsed.opening, "f'''");
        assert_eq!(parsed.content, "hi {name}");
    }

    #[test]
    fn test_parse_multiline_collection_indent() {
        let profile = CollectionProfile::new(NodeMatch::kinds(&["list"]), &[("[", "]")], "literal list");
        let text = "[\n        1,\n        2,\n    ]";
        let parsed = parse_collection(text, 0..text.len(), "    ", &profile, &python::REGISTRY.lexical, "    ", &tokens()).unwrap();
        assert!(parsed.multiline);
        assert_eq!(parsed.element_indent, "        ");
        assert_eq!(parsed.base_indent, "    ");
    }

    #[test]
    fn test_wrapper_is_detected() {
        let profile = CollectionProfile::new(NodeMatch::kinds(&["composite_literal"]).wrapped(r"^\[[^\]]*\][^{]+"), &[("{", "}")], "literal slice")
            .style(PlaceholderStyle::MiddleComment);
        let text = "[]string{\"a\", \"b\"}";
        let parsed = parse_collection(text, 0..text.len(), "", &profile, &python::REGISTRY.lexical, "\t", &tokens()).unwrap();
        assert_eq!(parsed.wrapper, "[]string");
        assert_eq!(parsed.content, "\"a\", \"b\"");
        assert!(!parsed.multiline);
        assert_eq!(parsed.element_indent, "\t");
    }

    #[test]
    fn test_disjoint_brackets_are_rejected() {
        let profile = CollectionProfile::new(NodeMatch::kinds(&["list"]), &[("[", "]")], "literal list");
        let err = parse_collection("[1] + [2]", 0..9, "", &profile, &python::REGISTRY.lexical, "    ", &tokens()).unwrap_err();
        assert!(matches!(err, LiteralError::UnparsableLiteral { .. }));
    }
}
