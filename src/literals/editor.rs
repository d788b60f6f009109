//! Composable document edits keyed by byte range.
//!
//! Inner literals are edited first; an outer literal reads its current text through
//! [`LiteralEditor::render_range`], so the inner replacement is already part of it, and
//! its own replacement then swallows the inner one.

use std::collections::BTreeMap;
use std::ops::Range;

use super::error::LiteralError;

#[derive(Debug, Clone)]
struct Replacement {
    end: usize,
    text: String,
}

#[derive(Debug, Clone)]
struct Insertion {
    offset: usize,
    text: String,
    /// Span of the literal this comment describes.
    anchor: Range<usize>,
    seq: usize,
}

enum Event<'e> {
    Insert(&'e str),
    Replace(usize, &'e str),
}

pub struct LiteralEditor<'a> {
    source: &'a str,
    replacements: BTreeMap<usize, Replacement>,
    insertions: Vec<Insertion>,
    next_seq: usize,
}

impl<'a> LiteralEditor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            replacements: BTreeMap::new(),
            insertions: Vec::new(),
            next_seq: 0,
        }
    }

    /// Current text of `start..end` with every edit strictly inside it applied.
    pub fn render_range(&self, start: usize, end: usize) -> String {
        self.render(start, end, false)
    }

    /// The whole document with every edit applied.
    pub fn apply(&self) -> String {
        self.render(0, self.source.len(), true)
    }

    /// Register a replacement of `start..end`, swallowing edits it contains.
    ///
    /// A comment sitting past the end of the range but describing a swallowed literal
    /// survives only while that literal's replacement text is still part of `text`. With
    /// `keep_outside_comments` unset, every comment describing a literal inside the range
    /// is dropped.
    pub fn replace(&mut self, start: usize, end: usize, text: String, keep_outside_comments: bool) -> Result<(), LiteralError> {
        for (&s, existing) in self.replacements.range(..end) {
            let overlaps = s < end && start < existing.end;
            let swallows = start <= s && existing.end <= end;
            if overlaps && !swallows {
                return Err(LiteralError::OverlappingEdit { start, end });
            }
        }

        let contained: Vec<usize> = self
            .replacements
            .range(start..end)
            .filter(|(_, r)| r.end <= end)
            .map(|(&s, _)| s)
            .collect();
        let mut dropped: Vec<Range<usize>> = Vec::new();
        for s in contained {
            if let Some(swallowed) = self.replacements.remove(&s) {
                if !text.contains(&swallowed.text) {
                    dropped.push(s..swallowed.end);
                }
            }
        }

        self.insertions.retain(|ins| {
            let inside = start < ins.offset && ins.offset < end;
            let anchored = start <= ins.anchor.start && ins.anchor.end <= end;
            let orphaned = dropped.contains(&ins.anchor);
            !(inside || orphaned || (!keep_outside_comments && anchored))
        });

        self.replacements.insert(start, Replacement { end, text });
        Ok(())
    }

    /// Register text inserted at `offset`, describing the literal at `anchor`.
    pub fn insert(&mut self, offset: usize, text: String, anchor: Range<usize>) -> Result<(), LiteralError> {
        let splits_replacement = self
            .replacements
            .range(..offset)
            .any(|(&s, r)| s < offset && offset < r.end);
        if splits_replacement {
            return Err(LiteralError::OverlappingEdit {
                start: offset,
                end: offset,
            });
        }
        self.insertions.push(Insertion {
            offset,
            text,
            anchor,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        Ok(())
    }

    /// Whether a replacement of exactly `range` survives in the edit set.
    pub fn has_replacement(&self, range: &Range<usize>) -> bool {
        self.replacements
            .get(&range.start)
            .is_some_and(|r| r.end == range.end)
    }

    fn render(&self, start: usize, end: usize, inclusive: bool) -> String {
        let mut events: Vec<(usize, u8, usize, Event<'_>)> = Vec::new();
        for (&s, r) in self.replacements.range(start..end) {
            if r.end <= end {
                events.push((s, 1, 0, Event::Replace(r.end, &r.text)));
            }
        }
        for ins in &self.insertions {
            let within = if inclusive {
                start <= ins.offset && ins.offset <= end
            } else {
                start < ins.offset && ins.offset < end
            };
            if within {
                events.push((ins.offset, 0, ins.seq, Event::Insert(&ins.text)));
            }
        }
        // insertions before a replacement starting at the same offset
        events.sort_by_key(|(pos, order, seq, _)| (*pos, *order, *seq));

        let mut out = String::with_capacity(end.saturating_sub(start));
        let mut pos = start;
        for (at, _, _, event) in events {
            if at < pos {
                continue;
            }
            out.push_str(&self.source[pos..at]);
            pos = at;
            match event {
                Event::Insert(text) => out.push_str(text),
                Event::Replace(rep_end, text) => {
                    out.push_str(text);
                    pos = rep_end;
                }
            }
        }
        out.push_str(&self.source[pos..end]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_edits_compose() {
        let source = "x = [[1, 2, 3], 4]";
        let mut editor = LiteralEditor::new(source);
        editor.replace(5, 14, "[1]".to_string(), true).unwrap();

        let outer = editor.render_range(4, 18);
        assert_eq!(outer, "[[1], 4]");

        editor.replace(4, 18, "[[1]]".to_string(), true).unwrap();
        assert!(!editor.has_replacement(&(5..14)));
        assert!(editor.has_replacement(&(4..18)));
        assert_eq!(editor.apply(), "x = [[1]]");
    }

    #[test]
    fn test_partial_overlap_is_rejected() {
        let mut editor = LiteralEditor::new("abcdefghij");
        editor.replace(2, 6, "X".to_string(), true).unwrap();
        let err = editor.replace(4, 8, "Y".to_string(), true).unwrap_err();
        assert!(matches!(err, LiteralError::OverlappingEdit { start: 4, end: 8 }));
        assert!(editor.replace(3, 5, "Z".to_string(), true).is_err());
        assert!(editor.insert(4, "!".to_string(), 4..4).is_err());
    }

    #[test]
    fn test_insertions_order_and_boundaries() {
        let source = "f(\"abc\");";
        let mut editor = LiteralEditor::new(source);
        editor.replace(2, 7, "\"a…\"".to_string(), true).unwrap();
        editor.insert(9, " // s".to_string(), 2..7).unwrap();
        editor.insert(7, " /* t */".to_string(), 2..7).unwrap();
        assert_eq!(editor.apply(), "f(\"a…\" /* t */); // s");
        assert_eq!(editor.render_range(0, 9), "f(\"a…\" /* t */);");
    }

    #[test]
    fn test_statement_replacement_drops_anchored_comments() {
        let source = "a;\nb;\nc;\n";
        let mut editor = LiteralEditor::new(source);
        editor.insert(5, " // inner".to_string(), 3..5).unwrap();
        editor.insert(8, " // keep".to_string(), 6..8).unwrap();
        editor.replace(3, 5, "// gone".to_string(), false).unwrap();
        assert_eq!(editor.apply(), "a;\n// gone\nc; // keep\n");
    }

    #[test]
    fn test_comment_follows_swallowed_literal() {
        let source = "xs = [1, \"abcdef\"]\n";
        fn inner(editor: &mut LiteralEditor<'_>) {
            editor.replace(9, 17, "\"ab…\"".to_string(), true).unwrap();
            editor.insert(18, "  # literal string".to_string(), 9..17).unwrap();
        }

        let mut keeping = LiteralEditor::new(source);
        inner(&mut keeping);
        let outer = keeping.render_range(5, 18);
        assert_eq!(outer, "[1, \"ab…\"]");
        keeping.replace(5, 18, outer, true).unwrap();
        assert_eq!(keeping.apply(), "xs = [1, \"ab…\"]  # literal string\n");

        let mut dropping = LiteralEditor::new(source);
        inner(&mut dropping);
        dropping.replace(5, 18, "[1, \"…\"]".to_string(), true).unwrap();
        dropping.insert(18, "  # literal list".to_string(), 5..18).unwrap();
        assert_eq!(dropping.apply(), "xs = [1, \"…\"]  # literal list\n");
    }
}
