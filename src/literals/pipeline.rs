//! Pipeline orchestration for one file.
//!
//! Candidates are collected across every profile, visited deepest-first and handed
//! to a specialized processor or the generic parse/select/format chain. Edits go
//! through [`LiteralEditor`] so outer literals see their inner trims.

use std::collections::HashSet;
use std::ops::Range;

use log::{debug, trace};
use tree_sitter::{Node, Tree};

use super::common::{line_indent, preview};
use super::editor::LiteralEditor;
use super::elements::ElementParser;
use super::error::LiteralError;
use super::formatter::ResultFormatter;
use super::options::LiteralOptions;
use super::processors::{BlockInitProcessor, ImplicitSequenceProcessor, LiteralProcessor, ProcessContext};
use super::profile::{LanguageRegistry, LiteralProfile, PlaceholderThresholds};
use super::result::{LiteralMetrics, TrimKind, TrimResult};
use super::selector::BudgetSelector;
use super::structure::{parse_collection, parse_string};
use super::tokens::TokenService;

#[derive(Debug, Clone, Copy)]
struct Candidate<'t> {
    node: Node<'t>,
    profile: usize,
    depth: usize,
}

/// Edited text of one file plus the trims that survived into it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub text: String,
    pub trims: Vec<TrimResult>,
    pub metrics: LiteralMetrics,
}

pub struct LiteralPipeline<'a> {
    registry: &'a LanguageRegistry,
    tokens: &'a dyn TokenService,
    options: LiteralOptions,
    processors: Vec<Box<dyn LiteralProcessor>>,
}

impl<'a> LiteralPipeline<'a> {
    pub fn new(registry: &'a LanguageRegistry, tokens: &'a dyn TokenService, options: LiteralOptions) -> Self {
        let mut processors: Vec<Box<dyn LiteralProcessor>> = Vec::new();
        if !options.skip_implicit_sequences {
            processors.push(Box::new(ImplicitSequenceProcessor));
        }
        if !options.skip_block_init {
            processors.push(Box::new(BlockInitProcessor));
        }
        Self {
            registry,
            tokens,
            options,
            processors,
        }
    }

    pub fn thresholds(&self) -> PlaceholderThresholds {
        self.options.thresholds(self.registry.thresholds)
    }

    /// Trim every literal in `tree` whose rendered form exceeds `budget` tokens.
    pub fn run(&self, source: &str, tree: &Tree, budget: usize) -> PipelineOutput {
        let candidates = self.collect_candidates(tree.root_node(), source.as_bytes());
        trace!("{} literal candidates in {} language", candidates.len(), self.registry.name);

        let thresholds = self.thresholds();
        let selector = BudgetSelector::new(
            self.registry,
            self.tokens,
            self.options.nested_budget_floor,
            self.options.max_nesting_depth,
        );
        let formatter = ResultFormatter::new(self.registry, self.tokens, thresholds, source);
        let mut editor = LiteralEditor::new(source);
        let mut trims = Vec::new();

        for candidate in candidates {
            let node = candidate.node;
            let kind = self.registry.profiles[candidate.profile].kind_name();
            let outcome = self.process_node(&editor, &selector, &formatter, source, candidate, budget);
            match outcome {
                Ok(Some(mut trim)) => {
                    if let Err(err) = Self::apply(&mut editor, &mut trim) {
                        debug!("dropped {} trim at {}..{}: {}", kind, trim.range.start, trim.range.end, err);
                        continue;
                    }
                    debug!(
                        "trimmed {} `{}`: {} -> {} tokens",
                        kind,
                        preview(&source[node.start_byte()..node.end_byte()]),
                        trim.original_tokens,
                        trim.trimmed_tokens
                    );
                    trims.push(trim);
                }
                Ok(None) => {}
                Err(err) => {
                    debug!("left {} literal at {}..{} untouched: {}", kind, node.start_byte(), node.end_byte(), err);
                }
            }
        }

        // outer trims may have swallowed inner ones
        trims.retain(|trim| editor.has_replacement(&trim.range));

        let text = editor.apply();
        let metrics = LiteralMetrics::from_trims(&trims, source.len(), text.len());
        PipelineOutput { text, trims, metrics }
    }

    fn apply(editor: &mut LiteralEditor, trim: &mut TrimResult) -> Result<(), LiteralError> {
        // jointly replaced nodes take the comments describing their literals with them
        let joint = !trim.replaced_nodes.is_empty();
        if joint {
            trace!(
                "{} nodes replaced jointly by {}..{}",
                trim.replaced_nodes.len(),
                trim.range.start,
                trim.range.end
            );
        }
        editor.replace(trim.range.start, trim.range.end, trim.text.clone(), !joint)?;
        if let (Some(offset), Some(comment)) = (trim.comment_offset, trim.comment.clone()) {
            if let Err(err) = editor.insert(offset, comment, trim.range.clone()) {
                debug!("summary comment for {}..{} skipped: {}", trim.range.start, trim.range.end, err);
                trim.comment = None;
                trim.comment_offset = None;
            }
        }
        Ok(())
    }

    fn process_node(
        &self,
        editor: &LiteralEditor,
        selector: &BudgetSelector,
        formatter: &ResultFormatter,
        source: &str,
        candidate: Candidate,
        budget: usize,
    ) -> Result<Option<TrimResult>, LiteralError> {
        let node = candidate.node;
        let profile = &self.registry.profiles[candidate.profile];

        if let Some(processor) = self
            .processors
            .iter()
            .find(|p| p.applies(profile, node, source.as_bytes()))
        {
            trace!("{} claims node at {}", processor.name(), node.start_byte());
            let ctx = ProcessContext {
                source,
                editor,
                registry: self.registry,
                tokens: self.tokens,
                thresholds: formatter.thresholds,
            };
            return processor.process(&ctx, node, profile, budget);
        }

        let range: Range<usize> = node.start_byte()..node.end_byte();
        let text = editor.render_range(range.start, range.end);
        let original_tokens = self.tokens.count_tokens(&text);
        if original_tokens <= budget {
            return Ok(None);
        }
        let base_indent = line_indent(source, range.start);

        let formatted = match profile {
            LiteralProfile::String(string) => {
                let parsed = parse_string(&text, range, base_indent, string, self.tokens)?;
                formatter
                    .format_string(&parsed, string, budget)?
                    .map(|f| (TrimKind::String, string.label, f))
            }
            _ => {
                let Some(collection) = profile.collection() else {
                    return Ok(None);
                };
                let parsed = parse_collection(
                    &text,
                    range,
                    base_indent,
                    collection,
                    &self.registry.lexical,
                    self.registry.indent_unit,
                    self.tokens,
                )?;
                let list = ElementParser::new(self.registry, self.tokens).parse(&parsed.content, collection, 0);
                if list.is_empty() {
                    return Ok(None);
                }
                let dfs = selector.select_dfs(&parsed, collection, &list, budget, 0);
                if dfs.selection.over_budget {
                    debug!(
                        "{} keeps {} required elements over its {}-token budget",
                        collection.label,
                        dfs.selection.kept_count(),
                        budget
                    );
                } else {
                    trace!("{} selection leaves {} tokens unspent", collection.label, dfs.remaining_budget);
                }
                formatter
                    .format_collection(&parsed, collection, &list, &dfs)?
                    .map(|f| (TrimKind::Collection, collection.label, f))
            }
        };

        Ok(formatted.map(|(kind, label, f)| {
            let comment_tokens = f.comment.as_deref().map_or(0, |c| self.tokens.count_tokens(c));
            let trimmed_tokens = self.tokens.count_tokens(&f.text) + comment_tokens;
            TrimResult::from_formatted(kind, label, original_tokens, f, trimmed_tokens)
        }))
    }

    /// Every node claimed by a profile, deepest first, then in source order.
    fn collect_candidates<'t>(&self, root: Node<'t>, source: &[u8]) -> Vec<Candidate<'t>> {
        let mut candidates = Vec::new();
        let mut fragments: HashSet<usize> = HashSet::new();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut stack = vec![(root, 0usize)];

        while let Some((node, depth)) = stack.pop() {
            let mut descend = true;
            if let Some(idx) = self.registry.profile_for(node, source) {
                let profile = &self.registry.profiles[idx];
                let enabled = match profile {
                    LiteralProfile::BlockInit(_) => !self.options.skip_block_init,
                    _ if profile.implicit_sequence().is_some() => !self.options.skip_implicit_sequences,
                    _ => true,
                };

                if enabled {
                    if let Some(sequence) = profile.implicit_sequence() {
                        let mut cursor = node.walk();
                        for child in node.named_children(&mut cursor) {
                            if sequence.fragment_kinds.contains(&child.kind()) {
                                fragments.insert(child.id());
                            }
                        }
                    }

                    let range = (node.start_byte(), node.end_byte());
                    if !node.has_error() && !fragments.contains(&node.id()) && seen.insert(range) {
                        candidates.push(Candidate { node, profile: idx, depth });
                    }
                }
                // strings are leaves for trimming purposes
                descend = !matches!(profile, LiteralProfile::String(_));
            }

            if descend {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    stack.push((child, depth + 1));
                }
            }
        }

        candidates.sort_by(|a, b| {
            b.depth
                .cmp(&a.depth)
                .then(a.node.start_byte().cmp(&b.node.start_byte()))
        });
        candidates
    }
}
