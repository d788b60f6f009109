//! Declarative literal profiles.
//!
//! A [`LanguageRegistry`] is pure data: an ordered list of [`LiteralProfile`]s plus the
//! lexical rules the element scanner needs. Behaviour lives in the parser, selector and
//! formatter modules, which dispatch on the profile variant.

use regex::Regex;
use tree_sitter::Node;

use super::common::get_node_text;

// ============ Placeholder Policy ============

/// Where the "what was removed" marker goes in a trimmed collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Placeholder element as the last item, summary comment after the closing delimiter.
    End,
    /// Summary comment right after the last kept element.
    MiddleComment,
}

/// Global savings thresholds for placeholder emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderThresholds {
    pub min_savings_ratio: f64,
    pub min_saved_tokens: usize,
}

impl PlaceholderThresholds {
    /// Whether removing `removed` tokens pays for a placeholder costing `placeholder` tokens.
    pub fn justified(&self, removed: usize, placeholder: usize) -> bool {
        removed >= self.min_saved_tokens
            && removed as f64 >= self.min_savings_ratio * placeholder as f64
    }
}

impl Default for PlaceholderThresholds {
    fn default() -> Self {
        Self {
            min_savings_ratio: 2.0,
            min_saved_tokens: 1,
        }
    }
}

// ============ Lexical Rules ============

#[derive(Debug, Clone, Copy)]
pub struct CommentSyntax {
    pub line: Option<&'static str>,
    pub block: Option<(&'static str, &'static str)>,
}

impl CommentSyntax {
    pub const C_LIKE: Self = Self {
        line: Some("//"),
        block: Some(("/*", "*/")),
    };
    pub const HASH: Self = Self {
        line: Some("#"),
        block: None,
    };
    pub const NONE: Self = Self {
        line: None,
        block: None,
    };

    pub fn has_any(&self) -> bool {
        self.line.is_some() || self.block.is_some()
    }

    pub fn line_comment(&self, text: &str) -> Option<String> {
        self.line.map(|prefix| format!("{} {}", prefix, text))
    }

    pub fn block_comment(&self, text: &str) -> Option<String> {
        self.block.map(|(open, close)| format!("{} {} {}", open, text, close))
    }
}

/// What the element scanner must know to skip strings and comments.
#[derive(Debug, Clone, Copy)]
pub struct LexicalRules {
    /// Quote sequences, longest first.
    pub quotes: &'static [&'static str],
    /// Single-char literal quote that only counts when it closes within a few chars (Rust `'a'`).
    pub char_quote: Option<char>,
    /// `r#"..."#` raw strings.
    pub raw_strings: bool,
    pub comments: CommentSyntax,
}

// ============ Node Matching ============

/// Which syntax nodes a profile claims.
#[derive(Debug, Clone)]
pub struct NodeMatch {
    pub kinds: &'static [&'static str],
    /// Field holding the callee for call/macro shaped literals.
    pub callee_field: Option<&'static str>,
    pub callees: &'static [&'static str],
    pub skip_parents: &'static [&'static str],
    /// Ancestors looked through when checking `skip_parents`.
    pub skip_through: &'static [&'static str],
    /// Must match at the start of the node text; the match becomes the wrapper tag.
    pub wrapper: Option<Regex>,
}

impl NodeMatch {
    pub fn kinds(kinds: &'static [&'static str]) -> Self {
        Self {
            kinds,
            callee_field: None,
            callees: &[],
            skip_parents: &[],
            skip_through: &[],
            wrapper: None,
        }
    }

    pub fn calls(kinds: &'static [&'static str], field: &'static str, callees: &'static [&'static str]) -> Self {
        Self {
            callee_field: Some(field),
            callees,
            ..Self::kinds(kinds)
        }
    }

    pub fn skipping(mut self, parents: &'static [&'static str]) -> Self {
        self.skip_parents = parents;
        self
    }

    pub fn through(mut self, kinds: &'static [&'static str]) -> Self {
        self.skip_through = kinds;
        self
    }

    pub fn wrapped(mut self, pattern: &str) -> Self {
        self.wrapper = Some(compile(pattern));
        self
    }

    pub fn matches(&self, node: Node, source: &[u8]) -> bool {
        if !self.kinds.contains(&node.kind()) {
            return false;
        }
        let mut parent = node.parent();
        while let Some(p) = parent.filter(|p| self.skip_through.contains(&p.kind())) {
            parent = p.parent();
        }
        if parent.is_some_and(|p| self.skip_parents.contains(&p.kind())) {
            return false;
        }
        if let Some(field) = self.callee_field {
            let Some(callee) = node.child_by_field_name(field) else {
                return false;
            };
            let name = get_node_text(callee, source);
            if !self.callees.contains(&name) {
                return false;
            }
        }
        if let Some(wrapper) = &self.wrapper {
            if !wrapper.is_match(get_node_text(node, source)) {
                return false;
            }
        }
        true
    }
}

/// Compile a built-in pattern; these are constants, so failure is a programming error.
pub fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in literal pattern must compile")
}

// ============ Profiles ============

/// Embedded-expression marker inside strings, e.g. `${...}` or f-string `{...}`.
#[derive(Debug, Clone, Copy)]
pub struct InterpolationMarker {
    pub prefix: &'static str,
    pub open: char,
    pub close: char,
    /// Only active when one of these letters appears in the string prefix (`f` for Python).
    pub required_prefix: Option<&'static str>,
    /// Only active for this opening quote (backtick template strings).
    pub only_quote: Option<&'static str>,
    /// `{{` / `}}` are literal braces rather than region markers.
    pub doubled_escape: bool,
}

#[derive(Debug, Clone)]
pub struct StringProfile {
    pub matcher: NodeMatch,
    /// Letters allowed before the opening quote (`rbfu`, `L`, ...).
    pub prefix_chars: &'static str,
    pub quotes: &'static [&'static str],
    pub raw_hashes: bool,
    pub interpolation: &'static [InterpolationMarker],
    /// Prefix letter marking byte strings, which only accept an ASCII ellipsis.
    pub byte_prefix: Option<char>,
    pub label: &'static str,
}

#[derive(Debug, Clone)]
pub struct CollectionProfile {
    pub matcher: NodeMatch,
    pub delimiters: &'static [(&'static str, &'static str)],
    pub separator: &'static str,
    pub kv_separator: Option<&'static str>,
    pub placeholder_element: Option<&'static str>,
    pub label: &'static str,
    pub min_elements: usize,
    /// Paired-argument factories keep this many adjacent arguments together.
    pub tuple_size: usize,
    pub style: PlaceholderStyle,
    /// Elements are syntax children, not delimiter-bounded text (implicit concatenation).
    pub external_extraction: bool,
    pub fragment_kinds: &'static [&'static str],
}

impl CollectionProfile {
    pub fn new(matcher: NodeMatch, delimiters: &'static [(&'static str, &'static str)], label: &'static str) -> Self {
        Self {
            matcher,
            delimiters,
            separator: ",",
            kv_separator: None,
            placeholder_element: Some("\"…\""),
            label,
            min_elements: 1,
            tuple_size: 1,
            style: PlaceholderStyle::End,
            external_extraction: false,
            fragment_kinds: &[],
        }
    }

    pub fn keyed(mut self, kv_separator: &'static str, placeholder: Option<&'static str>) -> Self {
        self.kv_separator = Some(kv_separator);
        self.placeholder_element = placeholder;
        self
    }

    pub fn style(mut self, style: PlaceholderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn placeholder(mut self, placeholder: Option<&'static str>) -> Self {
        self.placeholder_element = placeholder;
        self
    }

    pub fn tuples(mut self, tuple_size: usize) -> Self {
        self.tuple_size = tuple_size.max(1);
        self
    }

    pub fn min_elements(mut self, min_elements: usize) -> Self {
        self.min_elements = min_elements;
        self
    }

    pub fn fragments(mut self, kinds: &'static [&'static str]) -> Self {
        self.external_extraction = true;
        self.fragment_kinds = kinds;
        self.separator = "";
        self
    }
}

/// Create-then-populate statement blocks.
#[derive(Debug, Clone)]
pub struct BlockInitProfile {
    pub matcher: NodeMatch,
    /// Matches the creating statement; the `var` group names the container.
    pub init: Regex,
    /// Populating-statement pattern with `{var}` placeholders.
    pub mutation: &'static str,
    pub min_elements: usize,
}

impl BlockInitProfile {
    /// The creating-statement pattern also narrows which nodes the matcher claims.
    pub fn new(matcher: NodeMatch, init: &str, mutation: &'static str) -> Self {
        Self {
            matcher: matcher.wrapped(init),
            init: compile(init),
            mutation,
            min_elements: 1,
        }
    }

    /// Name of the container created by `statement`, if it is a creating statement.
    pub fn container_name<'t>(&self, statement: &'t str) -> Option<&'t str> {
        self.init
            .captures(statement.trim())
            .and_then(|caps| caps.name("var"))
            .map(|m| m.as_str())
    }

    /// Pattern matching statements that populate `var`.
    pub fn mutation_pattern(&self, var: &str) -> Regex {
        compile(&self.mutation.replace("{var}", &regex::escape(var)))
    }
}

#[derive(Debug, Clone)]
pub enum LiteralProfile {
    String(StringProfile),
    Sequence(CollectionProfile),
    Mapping(CollectionProfile),
    FactoryCall(CollectionProfile),
    BlockInit(BlockInitProfile),
}

impl LiteralProfile {
    pub fn matcher(&self) -> &NodeMatch {
        match self {
            Self::String(p) => &p.matcher,
            Self::Sequence(p) | Self::Mapping(p) | Self::FactoryCall(p) => &p.matcher,
            Self::BlockInit(p) => &p.matcher,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::FactoryCall(_) => "factory call",
            Self::BlockInit(_) => "block initializer",
        }
    }

    /// Delimiter-bounded collection handled by the generic parse/select/format chain.
    pub fn collection(&self) -> Option<&CollectionProfile> {
        match self {
            Self::Sequence(p) | Self::Mapping(p) | Self::FactoryCall(p) if !p.external_extraction => Some(p),
            _ => None,
        }
    }

    pub fn implicit_sequence(&self) -> Option<&CollectionProfile> {
        match self {
            Self::Sequence(p) if p.external_extraction => Some(p),
            _ => None,
        }
    }
}

// ============ Registry ============

pub struct LanguageRegistry {
    pub name: &'static str,
    pub profiles: Vec<LiteralProfile>,
    pub lexical: LexicalRules,
    pub indent_unit: &'static str,
    pub thresholds: PlaceholderThresholds,
}

impl LanguageRegistry {
    pub fn comments(&self) -> CommentSyntax {
        self.lexical.comments
    }

    /// First profile claiming `node`, in registry order.
    pub fn profile_for(&self, node: Node, source: &[u8]) -> Option<usize> {
        self.profiles
            .iter()
            .position(|profile| profile.matcher().matches(node, source))
    }

    pub fn collections(&self) -> impl Iterator<Item = (usize, &CollectionProfile)> {
        self.profiles
            .iter()
            .enumerate()
            .filter_map(|(idx, profile)| profile.collection().map(|p| (idx, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_reject_small_savings() {
        let thresholds = PlaceholderThresholds::default();
        assert!(!thresholds.justified(3, 4));
        assert!(thresholds.justified(8, 4));
        assert!(!thresholds.justified(0, 0));
    }

    #[test]
    fn test_block_init_container_name() {
        let profile = BlockInitProfile::new(
            NodeMatch::kinds(&["let_declaration"]),
            r"^let\s+mut\s+(?P<var>\w+)\s*=\s*HashMap::new\(\)\s*;$",
            r"^{var}\.insert\(",
        );
        assert_eq!(profile.container_name("let mut m = HashMap::new();"), Some("m"));
        assert_eq!(profile.container_name("let m = 1;"), None);
        assert!(profile.mutation_pattern("m").is_match("m.insert(1, 2);"));
        assert!(!profile.mutation_pattern("m").is_match("mm.insert(1, 2);"));
    }

    #[test]
    fn test_comment_rendering() {
        assert_eq!(CommentSyntax::C_LIKE.block_comment("x"), Some("/* x */".to_string()));
        assert_eq!(CommentSyntax::HASH.line_comment("x"), Some("# x".to_string()));
        assert_eq!(CommentSyntax::HASH.block_comment("x"), None);
        assert!(!CommentSyntax::NONE.has_any());
    }
}
