//! Tests for the literals module
//!
//! End-to-end runs over real snippets in each supported language. Token counts use the
//! character estimator so expected outputs are exact.

use crate::literals::{optimize_literals_with, parse_source, EstimatingTokenService, LiteralOptimization, LiteralOptions, SupportedLanguage};
use crate::{optimize_batch_with, SourceFile};
use proptest::prelude::*;

fn optimize(content: &str, extension: &str, max_tokens: usize, chars_per_token: usize) -> LiteralOptimization {
    let options = LiteralOptions::default().with_max_tokens(max_tokens);
    optimize_with(content, extension, &options, chars_per_token)
}

fn optimize_with(content: &str, extension: &str, options: &LiteralOptions, chars_per_token: usize) -> LiteralOptimization {
    optimize_literals_with(content, extension, options, &EstimatingTokenService::new(chars_per_token))
}

fn assert_parses(text: &str, extension: &str) {
    let language = SupportedLanguage::from_extension(extension).expect("supported extension");
    let tree = parse_source(text, language).expect("parser available");
    assert!(!tree.root_node().has_error(), "output no longer parses:\n{}", text);
}

#[test]
fn test_python_list_end_placeholder() {
    let items: Vec<String> = (0..20).map(|i| format!("\"item{:02}\"", i)).collect();
    let code = format!("NAMES = [{}]\n", items.join(", "));

    let result = optimize(&code, "py", 30, 4);
    println!("Optimized:\n{}", result.text);
    assert_eq!(
        result.text,
        "NAMES = [\"item00\", \"item01\", \"item02\", \"item03\", \"item04\", \"item05\", \"item06\", \"…\"]  # literal list (−32 tokens)\n"
    );
    assert_eq!(result.metrics.collections_trimmed, 1);
    assert_eq!(result.trims[0].elements_kept, 7);
    assert_eq!(result.trims[0].elements_removed, 13);
    assert!(result.optimized_tokens < result.original_tokens);
    assert_parses(&result.text, "py");
}

#[test]
fn test_template_string_keeps_interpolation_whole() {
    let content = format!("Hello ${{user.name}}, {}", "welcome back to the dashboard. ".repeat(4));
    let code = format!("const msg = `{}`;\n", content);

    let result = optimize(&code, "ts", 5, 4);
    println!("Optimized:\n{}", result.text);
    assert!(result.text.contains("`Hello ${user.name}…`;"));
    assert!(result.text.contains("; // literal string (−31 tokens)"));
    assert_eq!(result.metrics.strings_trimmed, 1);
    assert_parses(&result.text, "ts");
}

#[test]
fn test_nested_value_trimmed_within_its_share() {
    let ports: Vec<String> = (1..=20).map(|i| format!("{}", 8000 + i)).collect();
    let code = format!(
        "const config = {{\n  name: \"svc\",\n  ports: [{}],\n  region: \"us-east-1\",\n  owner: \"platform\",\n  tier: \"gold\",\n}};\n",
        ports.join(", ")
    );
    let options = LiteralOptions {
        max_tokens: 120,
        min_savings_ratio: Some(1.0),
        ..LiteralOptions::default()
    };

    let result = optimize_with(&code, "ts", &options, 1);
    println!("Optimized:\n{}", result.text);
    assert!(result.text.contains("  name: \"svc\",\n"));
    assert!(result.text.contains("  ports: [8001 /* … (19 more, −114 tokens) */],\n"));
    assert!(result
        .text
        .contains("  region: \"us-east-1\",\n  \"…\": \"…\",\n}; // literal object (−146 tokens)"));
    assert!(!result.text.contains("owner"));
    assert_eq!(result.trims.len(), 1);
    assert_eq!(result.metrics.placeholders, 2);
    assert_parses(&result.text, "ts");
}

#[test]
fn test_inner_string_trim_survives_outer_list_trim() {
    let long = "x".repeat(200);
    let rest = vec!["\"b\""; 30].join(", ");
    let code = format!("ITEMS = [\"{}\", {}]\n", long, rest);

    let result = optimize(&code, "py", 60, 1);
    println!("Optimized:\n{}", result.text);
    let kept_string = format!("\"{}…\"", "x".repeat(57));
    assert!(result.text.starts_with(&format!("ITEMS = [{}, \"…\"]", kept_string)));
    assert!(result.text.contains("  # literal string (−143 tokens)"));
    assert!(result.text.contains("  # literal list (−"));
    // the string trim is folded into the list trim
    assert_eq!(result.trims.len(), 1);
    assert_parses(&result.text, "py");
}

#[test]
fn test_comment_of_dropped_inner_trim_goes_with_it() {
    let long = "x".repeat(200);
    let head = vec!["\"b\""; 30].join(", ");
    let code = format!("ITEMS = [{}, \"{}\"]\n", head, long);

    let result = optimize(&code, "py", 60, 1);
    println!("Optimized:\n{}", result.text);
    assert!(result.text.starts_with("ITEMS = [\"b\", \"b\", "));
    assert!(!result.text.contains("xxx"));
    assert!(!result.text.contains("literal string"));
    assert!(result.text.contains("\"…\"]  # literal list (−"));
    assert_eq!(result.trims.len(), 1);
    assert_parses(&result.text, "py");
}

#[test]
fn test_python_dicts_inside_list_keep_dict_placeholder() {
    let pairs: Vec<String> = (0..6).map(|i| format!("\"k{}\": \"v{}\"", i, i)).collect();
    let ints: Vec<String> = (2..=15).map(|i| i.to_string()).collect();
    let code = format!("ROWS = [{{{}}}, {}]\n", pairs.join(", "), ints.join(", "));

    let result = optimize(&code, "py", 80, 1);
    println!("Optimized:\n{}", result.text);
    assert_eq!(
        result.text,
        "ROWS = [{\"k0\": \"v0\", \"…\": \"…\"}, 2, 3, 4, \"…\"]  # literal list (−95 tokens)\n"
    );
    assert_eq!(result.metrics.placeholders, 2);
    assert_parses(&result.text, "py");
}

#[test]
fn test_go_nested_row_trimmed_in_place() {
    let row: Vec<String> = (1..=20).map(|i| i.to_string()).collect();
    let code = format!(
        "package main\n\nvar grid = [][]int{{\n\t{{{}}},\n\t{{1, 2, 3}},\n\t{{4, 5, 6}},\n}}\n",
        row.join(", ")
    );

    let result = optimize(&code, "go", 104, 1);
    println!("Optimized:\n{}", result.text);
    assert_eq!(
        result.text,
        "package main\n\nvar grid = [][]int{\n\t{1, 2 /* … (18 more, −65 tokens) */},\n\t{1, 2, 3},\n\t{4, 5, 6},\n}\n"
    );
    assert_eq!(result.trims.len(), 1);
    assert_parses(&result.text, "go");
}

#[test]
fn test_rust_nested_array_trimmed_in_place() {
    let row: Vec<String> = (1..=40).map(|i| i.to_string()).collect();
    let code = format!(
        "fn main() {{\n    let grid = [[{}], [1, 2, 3], [4, 5, 6]];\n}}\n",
        row.join(", ")
    );

    let result = optimize(&code, "rs", 160, 1);
    println!("Optimized:\n{}", result.text);
    let kept: Vec<String> = (1..=20).map(|i| i.to_string()).collect();
    let expected = format!(
        "    let grid = [[{} /* … (20 more, −80 tokens) */], [1, 2, 3], [4, 5, 6]];\n",
        kept.join(", ")
    );
    assert!(result.text.contains(&expected));
    assert_eq!(result.trims.len(), 1);
    assert_parses(&result.text, "rs");
}

#[test]
fn test_small_saving_is_not_worth_a_placeholder() {
    let code = "x = \"abcdefghij\"\n";
    let result = optimize(code, "py", 10, 1);
    assert_eq!(result.text, code);
    assert!(!result.is_modified());
    assert_eq!(result.savings_ratio(), 0.0);
}

#[test]
fn test_python_docstring_untouched() {
    let code = format!("def f():\n    \"\"\"{}\"\"\"\n    return 1\n", "Long description. ".repeat(20));
    let result = optimize(&code, "py", 10, 4);
    assert_eq!(result.text, code);
}

#[test]
fn test_python_concatenated_docstring_untouched() {
    let part = "Long description. ".repeat(10);
    let code = format!("def f():\n    \"{}\" \"{}\"\n    return 1\n", part, part);
    let result = optimize(&code, "py", 10, 4);
    assert_eq!(result.text, code);
    assert!(!result.is_modified());
}

#[test]
fn test_python_block_initializer() {
    let keys = ["alpha", "bravo", "delta", "gamma", "kappa", "omega", "sigma", "theta"];
    let mut code = String::from("CONFIG = {}\n");
    for (i, key) in keys.iter().enumerate() {
        code.push_str(&format!("CONFIG[\"{}\"] = {}\n", key, i + 1));
    }

    let result = optimize(&code, "py", 100, 1);
    println!("Optimized:\n{}", result.text);
    assert_eq!(
        result.text,
        "CONFIG = {}\nCONFIG[\"alpha\"] = 1\nCONFIG[\"bravo\"] = 2\nCONFIG[\"delta\"] = 3\n# … (5 more, −95 tokens)\n"
    );
    assert_eq!(result.metrics.blocks_trimmed, 1);
    assert_parses(&result.text, "py");

    let skipped = LiteralOptions {
        max_tokens: 100,
        skip_block_init: true,
        ..LiteralOptions::default()
    };
    assert_eq!(optimize_with(&code, "py", &skipped, 1).text, code);
}

#[test]
fn test_rust_block_initializer() {
    let keys = ["alpha", "bravo", "delta", "gamma", "kappa", "omega", "sigma", "theta"];
    let mut code = String::from("fn build() -> HashMap<String, u32> {\n    let mut m = HashMap::new();\n");
    for (i, key) in keys.iter().enumerate() {
        code.push_str(&format!("    m.insert(\"{}\", {});\n", key, i + 1));
    }
    code.push_str("    m\n}\n");

    let result = optimize(&code, "rs", 120, 1);
    println!("Optimized:\n{}", result.text);
    assert!(result.text.contains(
        "    let mut m = HashMap::new();\n    m.insert(\"alpha\", 1);\n    m.insert(\"bravo\", 2);\n    m.insert(\"delta\", 3);\n    // … (5 more, −105 tokens)\n    m\n}"
    ));
    assert_parses(&result.text, "rs");
}

#[test]
fn test_python_implicit_concatenation() {
    let parts = ["first", "second", "third", "fourth", "fifth", "sixth"];
    let mut code = String::from("message = (\n");
    for part in parts {
        code.push_str(&format!("    \"{:<6} part of the message \"\n", part));
    }
    code.push_str(")\n");

    let result = optimize(&code, "py", 70, 1);
    println!("Optimized:\n{}", result.text);
    assert!(result.text.contains("\"first  part of the message \"\n    \"second part of the message …\"  # literal string (−116 tokens)\n)"));
    assert!(!result.text.contains("third"));
    assert_eq!(result.trims[0].elements_removed, 4);
    assert_parses(&result.text, "py");
}

#[test]
fn test_json_placeholder_without_comments() {
    let numbers: Vec<String> = (1..=30).map(|i| i.to_string()).collect();
    let code = format!("{{\"items\": [{}]}}\n", numbers.join(", "));

    let result = optimize(&code, "json", 40, 1);
    println!("Optimized:\n{}", result.text);
    assert_eq!(result.text, "{\"items\": [1, 2, 3, 4, \"…\"]}\n");
    assert!(!result.text.contains("//"));
    assert_eq!(result.trims.len(), 1);
    assert_parses(&result.text, "json");
}

#[test]
fn test_go_slice_middle_comment() {
    let items: String = (0..12).map(|i| format!("\t\"name{:02}\",\n", i)).collect();
    let code = format!("package main\n\nvar names = []string{{\n{}}}\n", items);

    let result = optimize(&code, "go", 80, 1);
    println!("Optimized:\n{}", result.text);
    assert_eq!(
        result.text,
        "package main\n\nvar names = []string{\n\t\"name00\",\n\t\"name01\",\n\t\"name02\",\n\t// … (9 more, −99 tokens)\n}\n"
    );
    assert_parses(&result.text, "go");
}

#[test]
fn test_rust_byte_string_ascii_marker() {
    let code = format!("const DATA: &[u8] = b\"{}\";\n", "x".repeat(200));

    let result = optimize(&code, "rs", 50, 1);
    println!("Optimized:\n{}", result.text);
    assert_eq!(
        result.text,
        format!("const DATA: &[u8] = b\"{}...\"; // literal string (−156 tokens)\n", "x".repeat(44))
    );
    assert!(!result.text.contains('…'));
    assert_parses(&result.text, "rs");
}

#[test]
fn test_c_initializer_list() {
    let names: Vec<String> = (0..20).map(|i| format!("\"name{:02}\"", i)).collect();
    let code = format!("static const char *names[] = {{{}}};\n", names.join(", "));

    let result = optimize(&code, "c", 80, 1);
    println!("Optimized:\n{}", result.text);
    assert!(result
        .text
        .contains("{\"name00\", \"name01\", \"name02\", \"name03\", \"…\"}; // literal initializer (−"));
    assert_parses(&result.text, "c");
}

#[test]
fn test_batch_runs_each_file_independently() {
    let items: Vec<String> = (0..20).map(|i| format!("\"item{:02}\"", i)).collect();
    let files = vec![
        SourceFile {
            path: "pkg/names.py".to_string(),
            content: format!("NAMES = [{}]\n", items.join(", ")),
        },
        SourceFile {
            path: "README".to_string(),
            content: "plain text".to_string(),
        },
    ];

    let options = LiteralOptions::default().with_max_tokens(30);
    let results = optimize_batch_with(&files, &options, &EstimatingTokenService::default());
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].path, "pkg/names.py");
    assert_eq!(results[0].language.as_deref(), Some("Python"));
    assert_eq!(results[0].metrics.collections_trimmed, 1);
    assert!(results[0].savings_ratio > 0.0);
    assert_eq!(results[1].text, "plain text");
    assert!(results[1].language.is_none());
}

proptest! {
    #[test]
    fn prop_trimmed_python_lists_still_parse(values in prop::collection::vec(0u32..100_000, 1..60), budget in 4usize..60) {
        let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let code = format!("values = [{}]\n", items.join(", "));
        let result = optimize(&code, "py", budget, 4);

        let tree = parse_source(&result.text, SupportedLanguage::Python).expect("parser available");
        prop_assert!(!tree.root_node().has_error(), "broken output:\n{}", result.text);
        prop_assert!(result.optimized_tokens <= result.original_tokens);
        if result.trims.is_empty() {
            prop_assert_eq!(&result.text, &code);
        }
    }
}
