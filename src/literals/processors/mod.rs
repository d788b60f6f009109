//! Specialized processors for literal shapes the generic parse/select/format chain
//! cannot describe: fragments without delimiters, and statement blocks.

mod block_init;
mod implicit;

pub use block_init::BlockInitProcessor;
pub use implicit::ImplicitSequenceProcessor;

use tree_sitter::Node;

use super::editor::LiteralEditor;
use super::error::LiteralError;
use super::profile::{LanguageRegistry, LiteralProfile, PlaceholderThresholds};
use super::result::TrimResult;
use super::tokens::TokenService;

/// Read-only view of one file's state handed to a processor.
pub struct ProcessContext<'a> {
    pub source: &'a str,
    pub editor: &'a LiteralEditor<'a>,
    pub registry: &'a LanguageRegistry,
    pub tokens: &'a dyn TokenService,
    pub thresholds: PlaceholderThresholds,
}

impl ProcessContext<'_> {
    /// Current text of `node`, inner edits applied.
    pub fn node_text(&self, node: Node) -> String {
        self.editor.render_range(node.start_byte(), node.end_byte())
    }
}

pub trait LiteralProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies(&self, profile: &LiteralProfile, node: Node, source: &[u8]) -> bool;

    /// Trim `node` to `budget`; `Ok(None)` leaves it untouched.
    fn process(
        &self,
        ctx: &ProcessContext,
        node: Node,
        profile: &LiteralProfile,
        budget: usize,
    ) -> Result<Option<TrimResult>, LiteralError>;
}
