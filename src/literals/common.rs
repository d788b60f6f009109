//! Common helpers shared by the literal parsers, formatters and processors.

use tree_sitter::Node;

// ============ Placeholder Vocabulary ============

pub const ELLIPSIS: &str = "…";
pub const ASCII_ELLIPSIS: &str = "...";
const MINUS: char = '−';

/// Longest log preview of a literal's text.
pub const MAX_PREVIEW_LEN: usize = 60;

/// Farthest a string cut may be pushed forward to close an interpolation.
pub const MAX_INTERPOLATION_EXTENSION: usize = 256;

/// `literal array (−12 tokens)`
pub fn literal_summary(label: &str, removed_tokens: usize) -> String {
    format!("{} ({}{} tokens)", label, MINUS, removed_tokens)
}

/// `… (5 more, −12 tokens)`
pub fn removed_summary(removed_count: usize, removed_tokens: usize) -> String {
    format!("{} ({} more, {}{} tokens)", ELLIPSIS, removed_count, MINUS, removed_tokens)
}

// ============ Text Utilities ============

/// Get text content of a tree-sitter node
pub fn get_node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    let start = node.start_byte();
    let end = node.end_byte();
    let slice = source.get(start..end).unwrap_or(&[]);
    std::str::from_utf8(slice).unwrap_or("")
}

/// Truncate a line to a maximum length, adding "..." if truncated
pub fn truncate_line(line: &str, max_len: usize) -> String {
    let mut out = String::new();
    let mut truncated = false;
    for (count, ch) in line.chars().enumerate() {
        if count >= max_len {
            truncated = true;
            break;
        }
        out.push(ch);
    }
    if truncated {
        out.push_str("...");
    }
    out
}

/// Single-line preview of a literal for log messages.
pub fn preview(text: &str) -> String {
    let first = text.lines().next().unwrap_or("");
    truncate_line(first.trim(), MAX_PREVIEW_LEN)
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source.as_bytes()[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1)
}

/// Byte offset of the line break ending the line containing `offset` (or EOF).
pub fn line_end(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source.as_bytes()[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(source.len(), |pos| offset + pos)
}

/// Leading whitespace of the line containing `offset`.
pub fn line_indent(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    leading_whitespace(&source[start..line_end(source, offset)])
}

pub fn leading_whitespace(text: &str) -> &str {
    let end = text
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(text.len());
    &text[..end]
}

pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
