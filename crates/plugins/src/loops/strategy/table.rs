use stencil_dom::{word, Document};
use stencil_template_core::{Tag, TemplateError};

use super::{split_paragraph_fragments, structure_error, LoopStrategy, RepeatUnit, SplitBeforeResult};

/// What a loop inside a table repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOver {
    Row,
    Content,
}

impl LoopOver {
    pub const OPTION: &'static str = "loopOver";

    /// Reads the `loopOver` option of an open tag.
    pub fn from_tag(tag: &Tag) -> Option<Self> {
        let raw = tag.option_str(Self::OPTION)?;
        match raw.to_ascii_lowercase().as_str() {
            "row" | "rows" => Some(LoopOver::Row),
            "content" => Some(LoopOver::Content),
            _ => {
                log::warn!("Ignoring unknown {}='{}' on tag '{}'", Self::OPTION, raw, tag.raw_text);
                None
            }
        }
    }
}

/// Repeats table rows, or cell content when both tags share one cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopTableStrategy {
    default_loop_over: Option<LoopOver>,
}

impl LoopTableStrategy {
    /// A strategy that repeats rows unless a tag asks for content.
    pub fn rows_by_default() -> Self {
        Self {
            default_loop_over: Some(LoopOver::Row),
        }
    }

    fn loop_over(&self, document: &Document, open: &Tag, close: &Tag) -> LoopOver {
        let same_cell = word::containing_table_cell(document, open.text_node)
            == word::containing_table_cell(document, close.text_node);
        let detected = if same_cell { LoopOver::Content } else { LoopOver::Row };
        match LoopOver::from_tag(open) {
            Some(LoopOver::Row) if same_cell => {
                log::warn!(
                    "Tag '{}' asks to loop over rows but opens and closes in the same cell; repeating the row",
                    open.raw_text
                );
                LoopOver::Row
            }
            Some(requested) => requested,
            None => self.default_loop_over.unwrap_or(detected),
        }
    }
}

impl LoopStrategy for LoopTableStrategy {
    fn name(&self) -> &'static str {
        "table"
    }

    fn is_applicable(&self, document: &Document, open: &Tag, close: &Tag) -> bool {
        let in_cell = |tag: &Tag| {
            word::containing_paragraph(document, tag.text_node)
                .and_then(|paragraph| document.parent(paragraph))
                .is_some_and(|parent| document.is_element_named(parent, word::TABLE_CELL))
        };
        in_cell(open) && in_cell(close)
    }

    fn split_before(
        &self,
        document: &mut Document,
        open: &Tag,
        close: &Tag,
    ) -> Result<SplitBeforeResult, TemplateError> {
        let loop_over = self.loop_over(document, open, close);
        log::debug!("Table loop '{}' repeats {:?}", open.name, loop_over);
        if loop_over == LoopOver::Content {
            return split_paragraph_fragments(document, open, close);
        }

        let first = word::containing_table_row(document, open.text_node)
            .ok_or_else(|| structure_error(open, "open tag is not inside a table row"))?;
        let last = word::containing_table_row(document, close.text_node)
            .ok_or_else(|| structure_error(close, "close tag is not inside a table row"))?;

        for tag in [open, close] {
            let unit = word::text_unit(document, tag.text_node);
            let run = word::containing_run(document, unit);
            document.detach(unit);
            if let Some(run) = run.filter(|&run| word::is_empty_run(document, run)) {
                document.detach(run);
            }
        }

        let nodes_to_repeat = document.siblings_in_range(first, last)?;
        Ok(SplitBeforeResult {
            first_node: first,
            nodes_to_repeat,
            last_node: last,
            unit: RepeatUnit::WholeNodes,
        })
    }
}
