//! JSON literal profiles. JSON has no comments, so trims leave only the
//! placeholder element behind.

use once_cell::sync::Lazy;

use super::profile::{
    CollectionProfile, CommentSyntax, LanguageRegistry, LexicalRules, LiteralProfile, NodeMatch,
    PlaceholderThresholds, StringProfile,
};

const QUOTES: &[&str] = &["\""];

pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(|| LanguageRegistry {
    name: "json",
    profiles: vec![
        LiteralProfile::String(StringProfile {
            matcher: NodeMatch::kinds(&["string"]),
            prefix_chars: "",
            quotes: QUOTES,
            raw_hashes: false,
            interpolation: &[],
            byte_prefix: None,
            label: "literal string",
        }),
        LiteralProfile::Sequence(CollectionProfile::new(NodeMatch::kinds(&["array"]), &[("[", "]")], "literal array")),
        LiteralProfile::Mapping(
            CollectionProfile::new(NodeMatch::kinds(&["object"]), &[("{", "}")], "literal object")
                .keyed(":", Some("\"…\": \"…\"")),
        ),
    ],
    lexical: LexicalRules {
        quotes: QUOTES,
        char_quote: None,
        raw_strings: false,
        comments: CommentSyntax::NONE,
    },
    indent_unit: "  ",
    thresholds: PlaceholderThresholds::default(),
});
