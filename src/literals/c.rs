//! C literal profiles: string literals, adjacent string concatenation and brace
//! initializer lists.

use once_cell::sync::Lazy;

use super::profile::{
    CollectionProfile, CommentSyntax, LanguageRegistry, LexicalRules, LiteralProfile, NodeMatch,
    PlaceholderThresholds, StringProfile,
};

const QUOTES: &[&str] = &["\""];

pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(|| LanguageRegistry {
    name: "c",
    profiles: vec![
        LiteralProfile::String(StringProfile {
            matcher: NodeMatch::kinds(&["string_literal"]),
            prefix_chars: "LuU8",
            quotes: QUOTES,
            raw_hashes: false,
            interpolation: &[],
            byte_prefix: None,
            label: "literal string",
        }),
        LiteralProfile::Sequence(
            CollectionProfile::new(NodeMatch::kinds(&["concatenated_string"]), &[], "literal string")
                .fragments(&["string_literal"]),
        ),
        LiteralProfile::Sequence(CollectionProfile::new(
            NodeMatch::kinds(&["initializer_list"]),
            &[("{", "}")],
            "literal initializer",
        )),
    ],
    lexical: LexicalRules {
        quotes: QUOTES,
        char_quote: Some('\''),
        raw_strings: false,
        comments: CommentSyntax::C_LIKE,
    },
    indent_unit: "    ",
    thresholds: PlaceholderThresholds::default(),
});
