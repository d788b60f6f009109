//! Element parsing: split literal content into top-level elements.
//!
//! A single left-to-right scan tracks quote state, bracket depth and comments so
//! separators inside nested strings or nested literals are ignored. Elements whose
//! value is itself a complete delimited literal are flagged for recursive trimming.

use super::common::is_ident_byte;
use super::profile::{CollectionProfile, LanguageRegistry, LexicalRules};
use super::structure::collection_delimiters;
use super::tokens::TokenService;

/// Chars a `'x'` style literal may span before we decide it was a lifetime.
const MAX_CHAR_LITERAL_LEN: usize = 12;

// ============ Scanner ============

/// Lexical cursor helpers over literal content.
pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    lexical: &'a LexicalRules,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, lexical: &'a LexicalRules) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            lexical,
        }
    }

    /// End (exclusive) of the comment starting at `i`; line comments stop before the newline.
    pub fn skip_comment(&self, i: usize) -> Option<usize> {
        let rest = &self.bytes[i..];
        if let Some(prefix) = self.lexical.comments.line {
            if rest.starts_with(prefix.as_bytes()) {
                let end = rest.iter().position(|&b| b == b'\n').map_or(self.bytes.len(), |p| i + p);
                return Some(end);
            }
        }
        if let Some((open, close)) = self.lexical.comments.block {
            if rest.starts_with(open.as_bytes()) {
                let body = &self.text[i + open.len()..];
                let end = body.find(close).map_or(self.bytes.len(), |p| i + open.len() + p + close.len());
                return Some(end);
            }
        }
        None
    }

    /// End (exclusive) of the string or char literal starting at `i`.
    pub fn skip_string(&self, i: usize) -> Option<usize> {
        if self.lexical.raw_strings {
            if let Some(end) = self.skip_raw_string(i) {
                return Some(end);
            }
        }

        if let Some(quote) = self.lexical.char_quote {
            if self.bytes[i] == quote as u8 {
                return self.skip_char_literal(i);
            }
        }

        let quote = self
            .lexical
            .quotes
            .iter()
            .find(|q| self.bytes[i..].starts_with(q.as_bytes()))?;
        let mut j = i + quote.len();
        while j < self.bytes.len() {
            if self.bytes[j] == b'\\' {
                j += 2;
                continue;
            }
            if self.bytes[j..].starts_with(quote.as_bytes()) {
                return Some(j + quote.len());
            }
            j += 1;
        }
        Some(self.bytes.len())
    }

    fn skip_raw_string(&self, i: usize) -> Option<usize> {
        if self.bytes[i] != b'r' {
            return None;
        }
        let at_word_start = i == 0
            || !is_ident_byte(self.bytes[i - 1])
            || (self.bytes[i - 1] == b'b' && (i < 2 || !is_ident_byte(self.bytes[i - 2])));
        if !at_word_start {
            return None;
        }
        let hashes = self.bytes[i + 1..].iter().take_while(|&&b| b == b'#').count();
        let quote_at = i + 1 + hashes;
        if self.bytes.get(quote_at) != Some(&b'"') {
            return None;
        }
        let closing = format!("\"{}", "#".repeat(hashes));
        let body = &self.text[quote_at + 1..];
        Some(body.find(&closing).map_or(self.bytes.len(), |p| quote_at + 1 + p + closing.len()))
    }

    fn skip_char_literal(&self, i: usize) -> Option<usize> {
        let limit = (i + MAX_CHAR_LITERAL_LEN).min(self.bytes.len());
        let mut j = i + 1;
        while j < limit {
            match self.bytes[j] {
                b'\\' => j += 2,
                b'\'' if j > i + 1 => return Some(j + 1),
                b'\n' => return None,
                _ => j += 1,
            }
        }
        // a lifetime or a lone quote: not a literal
        None
    }

    /// Opening and closing brackets pair up and never close past the start.
    pub fn is_balanced(&self) -> bool {
        let mut depth: usize = 0;
        let mut i = 0;
        while i < self.bytes.len() {
            if let Some(end) = self.skip_comment(i).or_else(|| self.skip_string(i)) {
                i = end;
                continue;
            }
            match self.bytes[i] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            i += 1;
        }
        depth == 0
    }

    /// Byte offsets of top-level occurrences of `needle`.
    pub fn top_level_positions(&self, needle: &str) -> Vec<usize> {
        let mut found = Vec::new();
        if needle.is_empty() {
            return found;
        }
        let mut depth: usize = 0;
        let mut i = 0;
        while i < self.bytes.len() {
            if let Some(end) = self.skip_comment(i).or_else(|| self.skip_string(i)) {
                i = end;
                continue;
            }
            match self.bytes[i] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            if depth == 0 && self.bytes[i..].starts_with(needle.as_bytes()) {
                found.push(i);
                i += needle.len();
                continue;
            }
            i += 1;
        }
        found
    }

    /// Start of a line comment that runs to the end of the text, if any.
    pub fn trailing_line_comment(&self) -> Option<usize> {
        let mut i = 0;
        while i < self.bytes.len() {
            if let Some(end) = self.skip_comment(i) {
                let is_line = self
                    .lexical
                    .comments
                    .line
                    .is_some_and(|prefix| self.bytes[i..].starts_with(prefix.as_bytes()));
                if is_line && self.text[end..].trim().is_empty() {
                    return Some(i);
                }
                i = end;
                continue;
            }
            if let Some(end) = self.skip_string(i) {
                i = end;
                continue;
            }
            i += 1;
        }
        None
    }
}

// ============ Elements ============

/// Span of a nested literal inside an element's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestedRef {
    pub offset: usize,
    pub len: usize,
    /// Index of the matching collection profile in the registry.
    pub profile: usize,
}

#[derive(Debug, Clone)]
pub struct Element {
    /// Element text without surrounding whitespace or trailing line comment.
    pub text: String,
    /// `text` without leading comment lines.
    pub raw: String,
    /// Offsets of `text` within the literal content.
    pub start: usize,
    pub end: usize,
    pub tokens: usize,
    pub depth: usize,
    pub nested: Option<NestedRef>,
    pub trailing_comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ElementList {
    pub elements: Vec<Element>,
    /// Original content ended with a separator after the last element.
    pub trailing_separator: bool,
}

impl ElementList {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn total_tokens(&self) -> usize {
        self.elements.iter().map(|e| e.tokens).sum()
    }
}

pub struct ElementParser<'a> {
    pub registry: &'a LanguageRegistry,
    pub tokens: &'a dyn TokenService,
}

impl<'a> ElementParser<'a> {
    pub fn new(registry: &'a LanguageRegistry, tokens: &'a dyn TokenService) -> Self {
        Self { registry, tokens }
    }

    /// Split `content` into elements, grouping paired arguments into tuples.
    pub fn parse(&self, content: &str, profile: &CollectionProfile, depth: usize) -> ElementList {
        let lexical = &self.registry.lexical;
        let scanner = Scanner::new(content, lexical);
        let separators = scanner.top_level_positions(profile.separator);

        let mut bounds = Vec::with_capacity(separators.len() + 1);
        let mut seg_start = 0;
        for pos in separators {
            bounds.push((seg_start, pos));
            seg_start = pos + profile.separator.len();
        }
        bounds.push((seg_start, content.len()));

        let mut list = ElementList::default();
        let last_segment = bounds.len() - 1;
        for (idx, (start, end)) in bounds.into_iter().enumerate() {
            let mut start = start;

            // `a, // note` : the comment after a separator belongs to the element before it
            if idx > 0 {
                if let Some((comment, resume)) = same_line_comment(content, start, end, lexical) {
                    if let Some(prev) = list.elements.last_mut() {
                        prev.trailing_comment = Some(comment);
                    }
                    start = resume;
                }
            }

            let segment = &content[start..end];
            let trimmed = segment.trim();
            if trimmed.is_empty() {
                if idx == last_segment && idx > 0 {
                    list.trailing_separator = true;
                }
                continue;
            }

            let lead = segment.len() - segment.trim_start().len();
            let elem_start = start + lead;
            let mut elem_end = elem_start + trimmed.len();
            let mut trailing_comment = None;

            let element_scanner = Scanner::new(trimmed, lexical);
            if let Some(comment_at) = element_scanner.trailing_line_comment() {
                trailing_comment = Some(trimmed[comment_at..].trim().to_string());
                elem_end = elem_start + trimmed[..comment_at].trim_end().len();
            }

            let text = &content[elem_start..elem_end];
            if text.is_empty() {
                // comment-only segment: keep it attached to the previous element
                if let (Some(prev), Some(comment)) = (list.elements.last_mut(), trailing_comment) {
                    if prev.trailing_comment.is_none() {
                        prev.trailing_comment = Some(comment);
                    }
                }
                continue;
            }

            let raw_offset = text.len() - strip_leading_comments(text, lexical).len();
            let raw = &text[raw_offset..];
            let nested = self
                .nested_value(raw, profile)
                .map(|(offset, len, profile)| NestedRef {
                    offset: raw_offset + offset,
                    len,
                    profile,
                });

            list.elements.push(Element {
                text: text.to_string(),
                raw: raw.to_string(),
                start: elem_start,
                end: elem_end,
                tokens: self.tokens.count_tokens(text),
                depth,
                nested,
                trailing_comment,
            });
        }

        if profile.tuple_size > 1 {
            list.elements = self.group_tuples(content, list.elements, profile.tuple_size);
        }
        list
    }

    /// Merge runs of `size` adjacent elements so they are kept or dropped together.
    pub fn group_tuples(&self, content: &str, elements: Vec<Element>, size: usize) -> Vec<Element> {
        elements
            .chunks(size)
            .map(|chunk| {
                let first = &chunk[0];
                let last = &chunk[chunk.len() - 1];
                let text = &content[first.start..last.end];
                Element {
                    text: text.to_string(),
                    raw: text.to_string(),
                    start: first.start,
                    end: last.end,
                    tokens: self.tokens.count_tokens(text),
                    depth: first.depth,
                    nested: None,
                    trailing_comment: last.trailing_comment.clone(),
                }
            })
            .collect()
    }

    /// Offset, length and profile of a nested literal forming the element's value.
    fn nested_value(&self, raw: &str, profile: &CollectionProfile) -> Option<(usize, usize, usize)> {
        let lexical = &self.registry.lexical;
        let value_offset = match profile.kv_separator {
            Some(kv) => {
                let pos = *Scanner::new(raw, lexical).top_level_positions(kv).first()?;
                let after = &raw[pos + kv.len()..];
                pos + kv.len() + (after.len() - after.trim_start().len())
            }
            None => 0,
        };
        let value = &raw[value_offset..];
        self.detect_nested(value)
            .map(|profile_idx| (value_offset, value.len(), profile_idx))
    }

    /// Registry index of a collection profile whose delimiters enclose all of `text`.
    ///
    /// Profiles sharing delimiters (a Python set and a dictionary) are told apart by
    /// whether the content has a top-level key separator.
    pub fn detect_nested(&self, text: &str) -> Option<usize> {
        let lexical = &self.registry.lexical;
        let mut fallback = None;
        for (idx, candidate) in self.registry.collections() {
            let Some((wrapper, open, close)) = collection_delimiters(text, candidate) else {
                continue;
            };
            let inner = &text[wrapper.len() + open.len()..text.len() - close.len()];
            let scanner = Scanner::new(inner, lexical);
            if !scanner.is_balanced() {
                continue;
            }
            let keyed = self
                .registry
                .collections()
                .filter_map(|(_, p)| p.kv_separator)
                .any(|kv| !scanner.top_level_positions(kv).is_empty());
            if candidate.kv_separator.is_some() == keyed {
                return Some(idx);
            }
            fallback.get_or_insert(idx);
        }
        fallback
    }
}

/// A comment on the same line right after a separator, and where the element resumes.
fn same_line_comment(content: &str, start: usize, end: usize, lexical: &LexicalRules) -> Option<(String, usize)> {
    let segment = &content[start..end];
    let line = segment.split('\n').next().unwrap_or("");
    let lead = line.len() - line.trim_start().len();
    if lead >= line.len() {
        return None;
    }
    let scanner = Scanner::new(segment, lexical);
    let comment_end = scanner.skip_comment(lead)?;
    let comment = &segment[lead..comment_end];
    if comment.contains('\n') {
        return None;
    }
    Some((comment.trim().to_string(), start + comment_end))
}

/// `text` with any leading comments (and the whitespace after them) removed.
fn strip_leading_comments<'t>(text: &'t str, lexical: &LexicalRules) -> &'t str {
    let mut rest = text;
    loop {
        let scanner = Scanner::new(rest, lexical);
        match scanner.skip_comment(0) {
            Some(end) if end > 0 => rest = rest[end..].trim_start(),
            _ => return rest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literals::profile::LiteralProfile;
    use crate::literals::tokens::EstimatingTokenService;
    use crate::literals::{go, python, rust_lang, typescript};

    fn collection(registry: &LanguageRegistry, label: &str) -> CollectionProfile {
        registry
            .profiles
            .iter()
            .find_map(|p| match p {
                LiteralProfile::Sequence(c) | LiteralProfile::Mapping(c) | LiteralProfile::FactoryCall(c)
                    if c.label == label =>
                {
                    Some(c.clone())
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no profile labelled {}", label))
    }

    #[test]
    fn test_split_respects_strings_and_brackets() {
        let tokens = EstimatingTokenService::default();
        let parser = ElementParser::new(&python::REGISTRY, &tokens);
        let profile = collection(&python::REGISTRY, "literal list");
        let list = parser.parse(r#""a,b", [1, 2], (3, 4), 'c'"#, &profile, 0);
        let texts: Vec<&str> = list.elements.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec![r#""a,b""#, "[1, 2]", "(3, 4)", "'c'"]);
        assert!(!list.trailing_separator);
        assert!(list.elements[1].nested.is_some());
        assert!(list.elements[0].nested.is_none());
    }

    #[test]
    fn test_trailing_separator_and_comments() {
        let tokens = EstimatingTokenService::default();
        let parser = ElementParser::new(&rust_lang::REGISTRY, &tokens);
        let profile = collection(&rust_lang::REGISTRY, "literal array");
        let content = "\n    1, // first\n    // lead\n    2,\n    3 // last\n";
        let list = parser.parse(content, &profile, 0);
        assert_eq!(list.len(), 3);
        assert_eq!(list.elements[0].trailing_comment.as_deref(), Some("// first"));
        assert_eq!(list.elements[1].text, "// lead\n    2");
        assert_eq!(list.elements[1].raw, "2");
        assert_eq!(list.elements[2].text, "3");
        assert_eq!(list.elements[2].trailing_comment.as_deref(), Some("// last"));
        assert!(!list.trailing_separator);
    }

    #[test]
    fn test_mapping_value_is_nested() {
        let tokens = EstimatingTokenService::default();
        let parser = ElementParser::new(&typescript::REGISTRY, &tokens);
        let profile = collection(&typescript::REGISTRY, "literal object");
        let list = parser.parse(" a: [1, 2, 3], b: 'x:y' ", &profile, 0);
        assert_eq!(list.len(), 2);
        let nested = list.elements[0].nested.expect("array value is nested");
        assert_eq!(&list.elements[0].text[nested.offset..nested.offset + nested.len], "[1, 2, 3]");
        assert!(list.elements[1].nested.is_none());
    }

    #[test]
    fn test_rust_raw_strings_and_chars() {
        let tokens = EstimatingTokenService::default();
        let parser = ElementParser::new(&rust_lang::REGISTRY, &tokens);
        let profile = collection(&rust_lang::REGISTRY, "literal array");
        let list = parser.parse(r##"r#"a, "b""#, ',', '\'', x"##, &profile, 0);
        assert_eq!(list.len(), 4);
        assert_eq!(list.elements[1].text, "','");
    }

    #[test]
    fn test_paired_arguments_are_grouped() {
        let tokens = EstimatingTokenService::default();
        let parser = ElementParser::new(&go::REGISTRY, &tokens);
        let profile = collection(&go::REGISTRY, "literal replacer");
        let list = parser.parse(r#""a", "b", "c", "d""#, &profile, 0);
        assert_eq!(list.len(), 2);
        assert_eq!(list.elements[0].text, r#""a", "b""#);
        assert_eq!(list.elements[1].text, r#""c", "d""#);
    }

    #[test]
    fn test_go_nested_literal_without_type() {
        let tokens = EstimatingTokenService::default();
        let parser = ElementParser::new(&go::REGISTRY, &tokens);
        assert!(parser.detect_nested("{1, 2}").is_some());
        assert!(parser.detect_nested("[]int{1, 2}").is_some());
        assert!(parser.detect_nested("Point{X: 1}").is_none());
        assert!(parser.detect_nested("{1} + {2}").is_none());
    }

    #[test]
    fn test_python_braces_pick_dict_or_set_by_shape() {
        let tokens = EstimatingTokenService::default();
        let parser = ElementParser::new(&python::REGISTRY, &tokens);
        let label = |text: &str| {
            let idx = parser.detect_nested(text).unwrap();
            python::REGISTRY.profiles[idx].collection().map(|c| c.label)
        };
        assert_eq!(label(r#"{"a": 1, "b": {1, 2}}"#), Some("literal dict"));
        assert_eq!(label("{1, 2}"), Some("literal set"));
        assert_eq!(label(r#"{"a:b", x[1:2]}"#), Some("literal set"));
    }

    #[test]
    fn test_balance_ignores_strings_and_comments() {
        let lexical = &python::REGISTRY.lexical;
        assert!(Scanner::new("'[', 1  # ]\n", lexical).is_balanced());
        assert!(!Scanner::new("1] + [2", lexical).is_balanced());
    }
}
