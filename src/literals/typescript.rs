//! TypeScript / JavaScript literal profiles.
//!
//! Shared by .ts, .tsx, .js and .jsx: both grammars name literal nodes the same way.

use once_cell::sync::Lazy;

use super::profile::{
    BlockInitProfile, CollectionProfile, CommentSyntax, InterpolationMarker, LanguageRegistry, LexicalRules,
    LiteralProfile, NodeMatch, PlaceholderThresholds, StringProfile,
};

const QUOTES: &[&str] = &["`", "\"", "'"];

const TEMPLATE: InterpolationMarker = InterpolationMarker {
    prefix: "$",
    open: '{',
    close: '}',
    required_prefix: None,
    only_quote: Some("`"),
    doubled_escape: false,
};

pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(|| LanguageRegistry {
    name: "typescript",
    profiles: vec![
        LiteralProfile::String(StringProfile {
            // JSX attributes cannot take a trailing comment
            matcher: NodeMatch::kinds(&["string", "template_string"]).skipping(&["jsx_attribute"]),
            prefix_chars: "",
            quotes: QUOTES,
            raw_hashes: false,
            interpolation: &[TEMPLATE],
            byte_prefix: None,
            label: "literal string",
        }),
        LiteralProfile::Sequence(CollectionProfile::new(NodeMatch::kinds(&["array"]), &[("[", "]")], "literal array")),
        LiteralProfile::Mapping(
            CollectionProfile::new(NodeMatch::kinds(&["object"]), &[("{", "}")], "literal object")
                .keyed(":", Some("\"…\": \"…\"")),
        ),
        LiteralProfile::FactoryCall(CollectionProfile::new(
            NodeMatch::calls(&["call_expression"], "function", &["Array.of"]).wrapped(r"^Array\.of\s*"),
            &[("(", ")")],
            "literal array",
        )),
        LiteralProfile::BlockInit(BlockInitProfile::new(
            NodeMatch::kinds(&["lexical_declaration", "variable_declaration"]),
            r"^(?:const|let|var)\s+(?P<var>[A-Za-z_$][\w$]*)(?:\s*:\s*[^=]+)?\s*=\s*(?:new\s+(?:Map|Set|Array)(?:<[^>]*>)?\(\)|\[\]|\{\})\s*;?$",
            r"^(?:{var}\.(?:set|add|push)\(|{var}\[[^\n]*\]\s*=[^=])",
        )),
    ],
    lexical: LexicalRules {
        quotes: QUOTES,
        char_quote: None,
        raw_strings: false,
        comments: CommentSyntax::C_LIKE,
    },
    indent_unit: "  ",
    thresholds: PlaceholderThresholds::default(),
});
