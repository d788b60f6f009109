//! Go literal profiles.
//!
//! Go composites are typed, so trimmed collections carry a comment instead of a
//! placeholder element. Nested composites may omit their type (`[][]int{{1, 2}}`).

use once_cell::sync::Lazy;

use super::profile::{
    BlockInitProfile, CollectionProfile, CommentSyntax, LanguageRegistry, LexicalRules, LiteralProfile, NodeMatch,
    PlaceholderStyle, PlaceholderThresholds, StringProfile,
};

const QUOTES: &[&str] = &["\"", "`"];

pub static REGISTRY: Lazy<LanguageRegistry> = Lazy::new(|| LanguageRegistry {
    name: "go",
    profiles: vec![
        LiteralProfile::String(StringProfile {
            matcher: NodeMatch::kinds(&["interpreted_string_literal", "raw_string_literal"]),
            prefix_chars: "",
            quotes: QUOTES,
            raw_hashes: false,
            interpolation: &[],
            byte_prefix: None,
            label: "literal string",
        }),
        LiteralProfile::Sequence(
            CollectionProfile::new(
                NodeMatch::kinds(&["composite_literal"]).wrapped(r"^\[[^\]]*\][^{]*"),
                &[("{", "}")],
                "literal slice",
            )
            .style(PlaceholderStyle::MiddleComment)
            .placeholder(None),
        ),
        LiteralProfile::Mapping(
            CollectionProfile::new(
                NodeMatch::kinds(&["composite_literal"]).wrapped(r"^map\[[^{]*"),
                &[("{", "}")],
                "literal map",
            )
            .keyed(":", None)
            .style(PlaceholderStyle::MiddleComment),
        ),
        LiteralProfile::FactoryCall(
            CollectionProfile::new(
                NodeMatch::calls(&["call_expression"], "function", &["strings.NewReplacer"])
                    .wrapped(r"^strings\.NewReplacer\s*"),
                &[("(", ")")],
                "literal replacer",
            )
            .tuples(2)
            .style(PlaceholderStyle::MiddleComment)
            .placeholder(None),
        ),
        LiteralProfile::BlockInit(BlockInitProfile::new(
            NodeMatch::kinds(&["short_var_declaration"]),
            r"^(?P<var>\w+)\s*:=\s*(?:make\((?:map\[|\[\])[^\n]*\)|map\[[^\n]*\]\w*\{\}|\[\][\w.*]+\{\})$",
            r"^(?:{var}\[[^\n]*\]\s*=[^=]|{var}\s*=\s*append\(\s*{var}\s*,)",
        )),
    ],
    lexical: LexicalRules {
        quotes: QUOTES,
        char_quote: Some('\''),
        raw_strings: false,
        comments: CommentSyntax::C_LIKE,
    },
    indent_unit: "\t",
    thresholds: PlaceholderThresholds::default(),
});
