//! Rust literal profiles.
//!
//! Strings (plain, byte and raw), array expressions, `vec![...]`, the maplit
//! `hashmap!{k => v}` family, `json!({...})`, and `let mut m = HashMap::new();`
//! followed by `m.insert(...)` statements.

use once_cell::sync::Lazy;

use super::profile::{
    BlockInitProfile, CollectionProfile, CommentSyntax, LanguageRegistry, LexicalRules, LiteralProfile, NodeMatch,
    PlaceholderStyle, PlaceholderThresholds, StringProfile,
};

const QUOTES: &[&str] = &["\""];

pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(|| LanguageRegistry {
    name: "rust",
    profiles: vec![
        LiteralProfile::String(StringProfile {
            matcher: NodeMatch::kinds(&["string_literal", "raw_string_literal"]),
            prefix_chars: "brc",
            quotes: QUOTES,
            raw_hashes: true,
            interpolation: &[],
            byte_prefix: Some('b'),
            label: "literal string",
        }),
        LiteralProfile::Sequence(CollectionProfile::new(
            NodeMatch::kinds(&["array_expression"]),
            &[("[", "]")],
            "literal array",
        )),
        LiteralProfile::Sequence(CollectionProfile::new(
            NodeMatch::calls(&["macro_invocation"], "macro", &["vec"]).wrapped(r"^vec!\s*"),
            &[("[", "]"), ("(", ")")],
            "literal vec",
        )),
        LiteralProfile::Mapping(
            CollectionProfile::new(
                NodeMatch::calls(&["macro_invocation"], "macro", &["hashmap", "btreemap"])
                    .wrapped(r"^(?:hashmap|btreemap)!\s*"),
                &[("{", "}"), ("[", "]"), ("(", ")")],
                "literal map",
            )
            .keyed("=>", None)
            .style(PlaceholderStyle::MiddleComment),
        ),
        LiteralProfile::Mapping(
            CollectionProfile::new(
                NodeMatch::calls(&["macro_invocation"], "macro", &["json"]).wrapped(r"^json!\s*\(\s*"),
                &[("{", "})")],
                "literal json",
            )
            .keyed(":", Some("\"…\": \"…\"")),
        ),
        LiteralProfile::BlockInit(BlockInitProfile::new(
            NodeMatch::kinds(&["let_declaration"]),
            r"^let\s+mut\s+(?P<var>\w+)(?:\s*:\s*[^=]+)?\s*=\s*(?:[A-Z]\w*(?:::<[^>]*>)?::(?:new\(\)|with_capacity\([^)]*\))|vec!\[\])\s*;$",
            r"^{var}\.(?:insert|push|push_str|push_back|extend)\(",
        )),
    ],
    lexical: LexicalRules {
        quotes: QUOTES,
        char_quote: Some('\''),
        raw_strings: true,
        comments: CommentSyntax::C_LIKE,
    },
    indent_unit: "    ",
    thresholds: PlaceholderThresholds::default(),
});
