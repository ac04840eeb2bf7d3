use stencil_dom::{word, Document};
use stencil_template_core::{Tag, TemplateError};

use super::{structure_error, LoopStrategy, RepeatUnit, SplitBeforeResult};

/// Repeats whole list paragraphs so numbering carries on across copies.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopListStrategy;

impl LoopStrategy for LoopListStrategy {
    fn name(&self) -> &'static str {
        "list"
    }

    fn is_applicable(&self, document: &Document, open: &Tag, _close: &Tag) -> bool {
        word::containing_paragraph(document, open.text_node)
            .is_some_and(|paragraph| word::is_list_paragraph(document, paragraph))
    }

    fn split_before(
        &self,
        document: &mut Document,
        open: &Tag,
        close: &Tag,
    ) -> Result<SplitBeforeResult, TemplateError> {
        let first = word::containing_paragraph(document, open.text_node)
            .ok_or_else(|| structure_error(open, "open tag is not inside a paragraph"))?;
        let last = word::containing_paragraph(document, close.text_node)
            .ok_or_else(|| structure_error(close, "close tag is not inside a paragraph"))?;

        for tag in [open, close] {
            let unit = word::text_unit(document, tag.text_node);
            document.detach(unit);
        }
        for paragraph in [first, last] {
            word::remove_empty_runs(document, paragraph);
        }

        let range = document.siblings_in_range(first, last)?;
        // A paragraph that only held a tag would add an empty item per copy.
        let nodes_to_repeat = range
            .iter()
            .copied()
            .filter(|&node| {
                let tag_only = (node == first || node == last) && first != last;
                !(tag_only && word::is_empty_paragraph(document, node))
            })
            .collect();

        Ok(SplitBeforeResult {
            first_node: first,
            nodes_to_repeat,
            last_node: last,
            unit: RepeatUnit::WholeNodes,
        })
    }
}
