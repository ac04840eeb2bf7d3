use stencil_dom::{word, Document, NodeId};
use stencil_template_core::{Tag, TemplateError};

use super::{structure_error, LoopStrategy, RepeatUnit, SplitBeforeResult};

/// Repeats inline content by cutting paragraphs at the two tags.
///
/// Always applicable, so it goes last in a strategy list.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopParagraphStrategy;

impl LoopStrategy for LoopParagraphStrategy {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn is_applicable(&self, _document: &Document, _open: &Tag, _close: &Tag) -> bool {
        true
    }

    fn split_before(
        &self,
        document: &mut Document,
        open: &Tag,
        close: &Tag,
    ) -> Result<SplitBeforeResult, TemplateError> {
        split_paragraph_fragments(document, open, close)
    }
}

/// Cuts the region between `open` and `close` out of its paragraphs.
///
/// The head keeps the content before the open tag and the tail the content
/// after the close tag. Everything between is detached and returned.
pub(crate) fn split_paragraph_fragments(
    document: &mut Document,
    open: &Tag,
    close: &Tag,
) -> Result<SplitBeforeResult, TemplateError> {
    let first = word::containing_paragraph(document, open.text_node)
        .ok_or_else(|| structure_error(open, "open tag is not inside a paragraph"))?;
    let last = word::containing_paragraph(document, close.text_node)
        .ok_or_else(|| structure_error(close, "close tag is not inside a paragraph"))?;
    let same_paragraph = first == last;

    let (head, after_first) = word::split_paragraph_by_text_node(document, first, open.text_node, true)?;
    let last = if same_paragraph { after_first } else { last };
    let (before_last, tail) = word::split_paragraph_by_text_node(document, last, close.text_node, true)?;

    let nodes_to_repeat = if same_paragraph {
        document.detach(before_last);
        vec![before_last]
    } else {
        document.detach(after_first);
        document.detach(before_last);
        let mut middle = vec![after_first];
        middle.extend(document.remove_siblings_between(head, tail)?);
        middle.push(before_last);
        middle
    };

    Ok(SplitBeforeResult {
        first_node: head,
        nodes_to_repeat,
        last_node: tail,
        unit: RepeatUnit::ParagraphFragments,
    })
}

/// Splices paragraph groups between `head` and `tail`.
///
/// The first paragraph of each group is joined into the paragraph that
/// precedes it, and `tail` is finally joined into the last one, so a group of
/// one paragraph adds one paragraph per repetition. Junction paragraphs left
/// empty are removed.
pub(crate) fn merge_paragraph_fragments(
    document: &mut Document,
    groups: Vec<Vec<NodeId>>,
    head: NodeId,
    tail: NodeId,
) -> Result<(), TemplateError> {
    let mut merge_to = head;
    let mut junctions = vec![head];
    for group in groups {
        for (position, node) in group.into_iter().enumerate() {
            if position == 0 && joinable(document, merge_to, node) {
                word::join_paragraphs(document, merge_to, node)?;
                document.detach(node);
                continue;
            }
            document.insert_before(node, tail)?;
            merge_to = node;
        }
        if junctions.last() != Some(&merge_to) {
            junctions.push(merge_to);
        }
    }
    if joinable(document, merge_to, tail) {
        word::join_paragraphs(document, merge_to, tail)?;
        document.detach(tail);
    } else {
        junctions.push(tail);
    }

    for paragraph in junctions {
        word::remove_empty_runs(document, paragraph);
        if word::is_removable_empty_paragraph(document, paragraph) {
            document.detach(paragraph);
        }
    }
    Ok(())
}

fn joinable(document: &Document, target: NodeId, fragment: NodeId) -> bool {
    document.is_element_named(target, word::PARAGRAPH) && document.is_element_named(fragment, word::PARAGRAPH)
}
