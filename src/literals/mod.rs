//! Literal trimming: token-budgeted shrinking of oversized literals in source code
//!
//! Long strings, arrays, maps, factory-call argument lists and create-then-populate
//! blocks are cut down to a per-literal token budget. The result still parses, and a
//! short comment records how much was removed.
//!
//! ## Architecture
//!
//! ```text
//! literals/
//! ├── mod.rs          - Entry point, language dispatch
//! ├── profile.rs      - Declarative literal profiles and registries
//! ├── structure.rs    - Delimiters, content span, indentation
//! ├── elements.rs     - Top-level element splitting
//! ├── interpolation.rs- Embedded-expression regions in strings
//! ├── selector.rs     - Budget selection (flat and DFS)
//! ├── formatter.rs    - Reconstruction and placeholders
//! ├── processors/     - Implicit sequences, block initializers
//! ├── editor.rs       - Composable range edits
//! ├── pipeline.rs     - Per-file orchestration
//! └── python.rs, typescript.rs, rust_lang.rs, go.rs, c.rs, json.rs
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use literals::{optimize_literals, LiteralOptions};
//!
//! let result = optimize_literals(source, "py", &LiteralOptions::default());
//! println!("{}", result.text);
//! ```

pub mod c;
pub mod common;
pub mod editor;
pub mod elements;
pub mod error;
pub mod formatter;
pub mod go;
pub mod interpolation;
pub mod json;
pub mod options;
pub mod pipeline;
pub mod processors;
pub mod profile;
pub mod python;
pub mod result;
pub mod rust_lang;
pub mod selector;
pub mod structure;
pub mod tokens;
pub mod typescript;

use log::debug;
use serde::Serialize;
use tree_sitter::{Language, Parser, Tree};

pub use error::LiteralError;
pub use options::LiteralOptions;
pub use pipeline::{LiteralPipeline, PipelineOutput};
pub use profile::LanguageRegistry;
pub use result::{LiteralMetrics, TrimKind, TrimResult};
pub use tokens::{default_token_service, EstimatingTokenService, TiktokenService, TokenService};

// ============ Supported Languages ============

/// Languages with literal profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SupportedLanguage {
    Python,
    TypeScript,
    TypeScriptTsx,
    JavaScript,
    JavaScriptJsx,
    Rust,
    Go,
    C,
    Json,
}

impl SupportedLanguage {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "py" | "pyw" | "pyi" => Some(Self::Python),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::TypeScriptTsx),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "jsx" => Some(Self::JavaScriptJsx),
            "rs" => Some(Self::Rust),
            "go" => Some(Self::Go),
            "c" | "h" => Some(Self::C),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Get the tree-sitter language for this file type
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::TypeScriptTsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript | Self::JavaScriptJsx => tree_sitter_javascript::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::C => tree_sitter_c::LANGUAGE.into(),
            Self::Json => tree_sitter_json::LANGUAGE.into(),
        }
    }

    pub fn registry(&self) -> &'static LanguageRegistry {
        match self {
            Self::Python => &python::REGISTRY,
            Self::TypeScript | Self::TypeScriptTsx | Self::JavaScript | Self::JavaScriptJsx => &typescript::REGISTRY,
            Self::Rust => &rust_lang::REGISTRY,
            Self::Go => &go::REGISTRY,
            Self::C => &c::REGISTRY,
            Self::Json => &json::REGISTRY,
        }
    }
}

// ============ Result Type ============

/// Result of literal optimization for one file
#[derive(Debug, Clone, Serialize)]
pub struct LiteralOptimization {
    pub text: String,
    pub language: Option<SupportedLanguage>,
    pub trims: Vec<TrimResult>,
    pub metrics: LiteralMetrics,
    pub original_tokens: usize,
    pub optimized_tokens: usize,
}

impl LiteralOptimization {
    fn unchanged(content: &str, language: Option<SupportedLanguage>, tokens: usize) -> Self {
        Self {
            text: content.to_string(),
            language,
            trims: Vec::new(),
            metrics: LiteralMetrics::default(),
            original_tokens: tokens,
            optimized_tokens: tokens,
        }
    }

    /// Calculate token savings ratio (0.0 to 1.0)
    pub fn savings_ratio(&self) -> f64 {
        if self.original_tokens == 0 {
            return 0.0;
        }
        let diff = self.original_tokens as f64 - self.optimized_tokens as f64;
        (diff / self.original_tokens as f64).max(0.0)
    }

    pub fn is_modified(&self) -> bool {
        !self.trims.is_empty()
    }
}

// ============ Main Entry Point ============

/// Trim oversized literals using the process-wide token service
pub fn optimize_literals(content: &str, extension: &str, options: &LiteralOptions) -> LiteralOptimization {
    optimize_literals_with(content, extension, options, default_token_service())
}

/// Trim oversized literals, counting tokens with `tokens`
pub fn optimize_literals_with(
    content: &str,
    extension: &str,
    options: &LiteralOptions,
    tokens: &dyn TokenService,
) -> LiteralOptimization {
    let original_tokens = tokens.count_tokens(content);
    let Some(language) = SupportedLanguage::from_extension(extension) else {
        debug!("{}", LiteralError::UnsupportedLanguage(extension.to_string()));
        return LiteralOptimization::unchanged(content, None, original_tokens);
    };

    let tree = match parse_source(content, language) {
        Ok(tree) => tree,
        Err(err) => {
            debug!("{}", err);
            return LiteralOptimization::unchanged(content, Some(language), original_tokens);
        }
    };

    let pipeline = LiteralPipeline::new(language.registry(), tokens, options.clone());
    let output = pipeline.run(content, &tree, options.max_tokens);
    let optimized_tokens = if output.trims.is_empty() {
        original_tokens
    } else {
        tokens.count_tokens(&output.text)
    };

    LiteralOptimization {
        text: output.text,
        language: Some(language),
        trims: output.trims,
        metrics: output.metrics,
        original_tokens,
        optimized_tokens,
    }
}

/// Parse source with the tree-sitter grammar for `language`
pub fn parse_source(content: &str, language: SupportedLanguage) -> Result<Tree, LiteralError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|e| LiteralError::ParseFailed(format!("failed to set language: {}", e)))?;

    parser
        .parse(content, None)
        .ok_or_else(|| LiteralError::ParseFailed("parser returned no tree".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_detection() {
        assert_eq!(SupportedLanguage::from_extension("PY"), Some(SupportedLanguage::Python));
        assert_eq!(SupportedLanguage::from_extension("h"), Some(SupportedLanguage::C));
        assert_eq!(SupportedLanguage::from_extension("tsx"), Some(SupportedLanguage::TypeScriptTsx));
        assert_eq!(SupportedLanguage::from_extension("css"), None);
    }

    #[test]
    fn test_unsupported_extension_is_unchanged() {
        let source = "body { color: red; }";
        let result = optimize_literals_with(source, "css", &LiteralOptions::default(), &EstimatingTokenService::default());
        assert_eq!(result.text, source);
        assert!(result.language.is_none());
        assert_eq!(result.savings_ratio(), 0.0);
    }

    #[test]
    fn test_savings_ratio() {
        let mut result = LiteralOptimization::unchanged("", None, 100);
        result.optimized_tokens = 60;
        assert!((result.savings_ratio() - 0.4).abs() < 1e-9);
    }
}
