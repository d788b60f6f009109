//! Python literal profiles.
//!
//! Handles Python files (.py, .pyw, .pyi):
//! - Strings with `rbfu` prefixes and f-string `{...}` interpolation (docstrings skipped)
//! - Implicitly concatenated strings
//! - List, tuple, set and dict displays, plus `dict(k=v, ...)` calls
//! - `x = {}` / `x = []` followed by `x[k] = v` / `x.append(...)` statements

use once_cell::sync::Lazy;

use super::profile::{
    BlockInitProfile, CollectionProfile, CommentSyntax, InterpolationMarker, LanguageRegistry, LexicalRules,
    LiteralProfile, NodeMatch, PlaceholderThresholds, StringProfile,
};

const QUOTES: &[&str] = &["\"\"\"", "'''", "\"", "'"];

const FSTRING: InterpolationMarker = InterpolationMarker {
    prefix: "",
    open: '{',
    close: '}',
    required_prefix: Some("fF"),
    only_quote: None,
    doubled_escape: true,
};

/// Docstrings and bare string statements are documentation, not data.
const DOCSTRING_PARENTS: &[&str] = &["expression_statement"];

pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(|| LanguageRegistry {
    name: "python",
    profiles: vec![
        LiteralProfile::String(StringProfile {
            matcher: NodeMatch::kinds(&["string"])
                .skipping(DOCSTRING_PARENTS)
                .through(&["concatenated_string"]),
            prefix_chars: "rbfuRBFU",
            quotes: QUOTES,
            raw_hashes: false,
            interpolation: &[FSTRING],
            byte_prefix: Some('b'),
            label: "literal string",
        }),
        LiteralProfile::Sequence(
            CollectionProfile::new(
                NodeMatch::kinds(&["concatenated_string"]).skipping(DOCSTRING_PARENTS),
                &[],
                "literal string",
            )
            .fragments(&["string"]),
        ),
        LiteralProfile::Sequence(CollectionProfile::new(NodeMatch::kinds(&["list"]), &[("[", "]")], "literal list")),
        LiteralProfile::Sequence(CollectionProfile::new(NodeMatch::kinds(&["tuple"]), &[("(", ")")], "literal tuple")),
        LiteralProfile::Sequence(CollectionProfile::new(NodeMatch::kinds(&["set"]), &[("{", "}")], "literal set")),
        LiteralProfile::Mapping(
            CollectionProfile::new(NodeMatch::kinds(&["dictionary"]), &[("{", "}")], "literal dict")
                .keyed(":", Some("\"…\": \"…\"")),
        ),
        LiteralProfile::FactoryCall(
            CollectionProfile::new(
                NodeMatch::calls(&["call"], "function", &["dict"]).wrapped(r"^dict\s*"),
                &[("(", ")")],
                "literal dict",
            )
            .keyed("=", Some("**{\"…\": \"…\"}")),
        ),
        LiteralProfile::BlockInit(BlockInitProfile::new(
            NodeMatch::kinds(&["expression_statement"]),
            r"^(?P<var>[A-Za-z_]\w*)\s*=\s*(?:\{\}|\[\]|dict\(\)|list\(\)|set\(\))$",
            r"^(?:{var}\[[^\n]*\]\s*=[^=]|{var}\.(?:append|add|update|extend|insert|setdefault)\()",
        )),
    ],
    lexical: LexicalRules {
        quotes: QUOTES,
        char_quote: None,
        raw_strings: false,
        comments: CommentSyntax::HASH,
    },
    indent_unit: "    ",
    thresholds: PlaceholderThresholds::default(),
});
