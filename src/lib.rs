use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod literals;

pub use literals::{
    optimize_literals, optimize_literals_with, LiteralError, LiteralMetrics, LiteralOptimization, LiteralOptions,
    SupportedLanguage, TokenService, TrimKind, TrimResult,
};

#[cfg(test)]
mod literals_tests;

/// One file handed in for literal trimming
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

/// Per-file outcome of a batch run
#[derive(Debug, Serialize, Clone)]
pub struct FileOptimization {
    pub path: String,
    pub text: String,
    pub language: Option<String>,
    pub metrics: LiteralMetrics,
    pub original_tokens: usize,
    pub optimized_tokens: usize,
    pub savings_ratio: f64,
}

impl FileOptimization {
    fn from_result(path: &str, result: LiteralOptimization) -> Self {
        let savings_ratio = result.savings_ratio();
        Self {
            path: path.to_string(),
            text: result.text,
            language: result.language.map(|l| format!("{:?}", l)),
            metrics: result.metrics,
            original_tokens: result.original_tokens,
            optimized_tokens: result.optimized_tokens,
            savings_ratio,
        }
    }
}

fn extension_of(path: &str) -> &str {
    Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Trim literals in one file, picking the language from its extension
pub fn optimize_file(file: &SourceFile, options: &LiteralOptions) -> FileOptimization {
    let result = optimize_literals(&file.content, extension_of(&file.path), options);
    FileOptimization::from_result(&file.path, result)
}

/// Batch-trim many files at once; files are independent, so they run in parallel
pub fn optimize_batch(files: &[SourceFile], options: &LiteralOptions) -> Vec<FileOptimization> {
    files.par_iter().map(|file| optimize_file(file, options)).collect()
}

/// Same as [`optimize_batch`] with a caller-supplied token service
pub fn optimize_batch_with(
    files: &[SourceFile],
    options: &LiteralOptions,
    tokens: &dyn TokenService,
) -> Vec<FileOptimization> {
    files
        .par_iter()
        .map(|file| {
            let result = optimize_literals_with(&file.content, extension_of(&file.path), options, tokens);
            FileOptimization::from_result(&file.path, result)
        })
        .collect()
}
