//! Structural strategies for isolating and re-splicing a repeated region.

mod list;
mod paragraph;
mod table;

pub use list::LoopListStrategy;
pub use paragraph::LoopParagraphStrategy;
pub use table::{LoopOver, LoopTableStrategy};

pub(crate) use paragraph::{merge_paragraph_fragments, split_paragraph_fragments};

use stencil_dom::{Document, NodeId};
use stencil_template_core::{Tag, TemplateError};

/// How the isolated nodes relate to the surrounding tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatUnit {
    /// Pieces cut out of paragraphs; `first_node` and `last_node` are the
    /// head and tail paragraphs that stay in the tree.
    ParagraphFragments,
    /// Whole paragraphs or rows; `first_node` and `last_node` are the first
    /// and last originals, which still sit in the tree until the merge.
    WholeNodes,
}

/// Result of isolating the region between an open and a close tag.
#[derive(Debug, Clone)]
pub struct SplitBeforeResult {
    pub first_node: NodeId,
    pub nodes_to_repeat: Vec<NodeId>,
    pub last_node: NodeId,
    pub unit: RepeatUnit,
}

pub trait LoopStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_applicable(&self, document: &Document, open: &Tag, close: &Tag) -> bool;

    fn split_before(
        &self,
        document: &mut Document,
        open: &Tag,
        close: &Tag,
    ) -> Result<SplitBeforeResult, TemplateError>;

    /// Splices the compiled copies back and removes what the split left behind.
    fn merge_back(
        &self,
        document: &mut Document,
        groups: Vec<Vec<NodeId>>,
        split: &SplitBeforeResult,
    ) -> Result<(), TemplateError> {
        match split.unit {
            RepeatUnit::ParagraphFragments => {
                merge_paragraph_fragments(document, groups, split.first_node, split.last_node)
            }
            RepeatUnit::WholeNodes => merge_whole_nodes(document, groups, split.first_node, split.last_node),
        }
    }
}

/// Inserts every group before the original range, then drops the originals.
pub(crate) fn merge_whole_nodes(
    document: &mut Document,
    groups: Vec<Vec<NodeId>>,
    first: NodeId,
    last: NodeId,
) -> Result<(), TemplateError> {
    let originals = document.siblings_in_range(first, last)?;
    for node in groups.into_iter().flatten() {
        document.insert_before(node, first)?;
    }
    for node in originals {
        document.detach(node);
    }
    Ok(())
}

pub(crate) fn structure_error(tag: &Tag, reason: impl Into<String>) -> TemplateError {
    TemplateError::TagStructure {
        raw_text: tag.raw_text.clone(),
        reason: reason.into(),
    }
}
