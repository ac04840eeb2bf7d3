//! WordprocessingML structure helpers.
//!
//! These operate on the generic [`Document`] arena but know the shape of a
//! document part: paragraphs hold runs, runs hold text elements, and every
//! container may lead with a `*Pr` properties element.

use crate::document::Document;
use crate::error::DomError;
use crate::node::NodeId;

pub const BODY: &str = "w:body";
pub const PARAGRAPH: &str = "w:p";
pub const PARAGRAPH_PROPERTIES: &str = "w:pPr";
pub const RUN: &str = "w:r";
pub const RUN_PROPERTIES: &str = "w:rPr";
pub const RUN_STYLE: &str = "w:rStyle";
pub const TEXT: &str = "w:t";
pub const LINE_BREAK: &str = "w:br";
pub const NUMBERING_PROPERTIES: &str = "w:numPr";
pub const SECTION_PROPERTIES: &str = "w:sectPr";
pub const PARAGRAPH_PROPERTIES_CHANGE: &str = "w:pPrChange";
pub const TABLE: &str = "w:tbl";
pub const TABLE_ROW: &str = "w:tr";
pub const TABLE_ROW_PROPERTIES: &str = "w:trPr";
pub const TABLE_PROPERTY_EXCEPTIONS: &str = "w:tblPrEx";
pub const TABLE_CELL: &str = "w:tc";
pub const CONTENT_CONTROL: &str = "w:sdt";
pub const CONTENT_CONTROL_PROPERTIES: &str = "w:sdtPr";
pub const CONTENT_CONTROL_CONTENT: &str = "w:sdtContent";
pub const HYPERLINK: &str = "w:hyperlink";
pub const DRAWING: &str = "w:drawing";
pub const BOOKMARK_START: &str = "w:bookmarkStart";
pub const BOOKMARK_END: &str = "w:bookmarkEnd";
pub const VANISH: &str = "w:vanish";
pub const HIDDEN: &str = "w:hidden";
pub const SPACE: &str = "xml:space";

/// Properties elements (`w:pPr`, `w:rPr`, `w:trPr`, ...) follow a naming convention.
pub fn is_properties_element(document: &Document, node: NodeId) -> bool {
    document.name(node).is_some_and(|name| name.ends_with("Pr"))
}

/// The `w:t` element owning a text node, if any.
pub fn containing_text_element(document: &Document, text_node: NodeId) -> Option<NodeId> {
    document
        .parent(text_node)
        .filter(|&parent| document.is_element_named(parent, TEXT))
}

/// The node that carries a text node in the tree: its `w:t` when present, else itself.
pub fn text_unit(document: &Document, text_node: NodeId) -> NodeId {
    containing_text_element(document, text_node).unwrap_or(text_node)
}

pub fn containing_run(document: &Document, node: NodeId) -> Option<NodeId> {
    document.find_ancestor_named(node, RUN)
}

pub fn containing_paragraph(document: &Document, node: NodeId) -> Option<NodeId> {
    document.find_ancestor_named(node, PARAGRAPH)
}

pub fn containing_table_cell(document: &Document, node: NodeId) -> Option<NodeId> {
    document.find_ancestor_named(node, TABLE_CELL)
}

pub fn containing_table_row(document: &Document, node: NodeId) -> Option<NodeId> {
    document.find_ancestor_named(node, TABLE_ROW)
}

/// True when the paragraph carries numbering properties.
pub fn is_list_paragraph(document: &Document, paragraph: NodeId) -> bool {
    document
        .find_child_named(paragraph, PARAGRAPH_PROPERTIES)
        .and_then(|properties| document.find_child_named(properties, NUMBERING_PROPERTIES))
        .is_some()
}

/// A run with nothing besides its properties.
pub fn is_empty_run(document: &Document, run: NodeId) -> bool {
    document.is_element_named(run, RUN)
        && document
            .children(run)
            .iter()
            .all(|&child| document.is_element_named(child, RUN_PROPERTIES))
}

pub fn has_section_properties(document: &Document, paragraph: NodeId) -> bool {
    document
        .find_child_named(paragraph, PARAGRAPH_PROPERTIES)
        .and_then(|properties| document.find_child_named(properties, SECTION_PROPERTIES))
        .is_some()
}

/// A paragraph holding only properties and empty runs, with no section break.
pub fn is_empty_paragraph(document: &Document, paragraph: NodeId) -> bool {
    document.is_element_named(paragraph, PARAGRAPH)
        && !has_section_properties(document, paragraph)
        && document.children(paragraph).iter().all(|&child| {
            document.is_element_named(child, PARAGRAPH_PROPERTIES) || is_empty_run(document, child)
        })
}

/// An empty paragraph that can leave the tree without breaking the schema.
///
/// A table cell must keep at least one paragraph.
pub fn is_removable_empty_paragraph(document: &Document, paragraph: NodeId) -> bool {
    if !is_empty_paragraph(document, paragraph) {
        return false;
    }
    match document.parent(paragraph) {
        Some(cell) if document.is_element_named(cell, TABLE_CELL) => {
            document
                .children(cell)
                .iter()
                .filter(|&&child| document.is_element_named(child, PARAGRAPH))
                .count()
                > 1
        }
        Some(_) => true,
        None => false,
    }
}

/// Removes the empty runs among the direct children of `container`.
pub fn remove_empty_runs(document: &mut Document, container: NodeId) {
    let empty: Vec<NodeId> = document
        .children(container)
        .iter()
        .copied()
        .filter(|&child| is_empty_run(document, child))
        .collect();
    for run in empty {
        document.detach(run);
    }
}

pub fn set_space_preserve(document: &mut Document, text_element: NodeId) {
    document.set_attribute(text_element, SPACE, "preserve");
}

/// Returns the properties child of `parent`, creating it when missing.
///
/// A new properties element is inserted after any leading element named in
/// `after`, which lets callers respect schema ordering.
pub fn ensure_properties(document: &mut Document, parent: NodeId, name: &str, after: &[&str]) -> Result<NodeId, DomError> {
    if let Some(existing) = document.find_child_named(parent, name) {
        return Ok(existing);
    }
    let index = document
        .children(parent)
        .iter()
        .take_while(|&&child| after.iter().any(|&leading| document.is_element_named(child, leading)))
        .count();
    let properties = document.create_element(name);
    document.insert_child(parent, index, properties)?;
    Ok(properties)
}

/// Adds an empty flag element such as `w:vanish` unless already present.
pub fn set_flag(document: &mut Document, properties: NodeId, flag: &str) -> Result<NodeId, DomError> {
    if let Some(existing) = document.find_child_named(properties, flag) {
        return Ok(existing);
    }
    let node = document.create_element(flag);
    document.append_child(properties, node)?;
    Ok(node)
}

/// Splits a text node at byte offset `at`.
///
/// The head stays in the original node. The tail moves into a new node placed
/// right after it; when the text sits in a `w:t`, the tail gets its own copy of
/// that element and both keep surrounding whitespace.
pub fn split_text_node(document: &mut Document, text_node: NodeId, at: usize) -> Result<NodeId, DomError> {
    let text = document.text(text_node).ok_or(DomError::NotText(text_node))?.to_string();
    if !text.is_char_boundary(at) {
        return Err(DomError::InvalidOffset { node: text_node, offset: at });
    }
    let (head, tail) = text.split_at(at);
    document.set_text(text_node, head)?;
    let tail_node = document.create_text(tail);

    match containing_text_element(document, text_node) {
        Some(element) => {
            let tail_element = document.clone_shallow(element);
            document.append_child(tail_element, tail_node)?;
            document.insert_after(tail_element, element)?;
            set_space_preserve(document, element);
            set_space_preserve(document, tail_element);
        }
        None => document.insert_after(tail_node, text_node)?,
    }
    Ok(tail_node)
}

/// Concatenates the text nodes from `from` through `to` into `from`.
///
/// The other nodes are removed, together with any run or text element left
/// empty by the removal.
pub fn join_text_nodes_range(document: &mut Document, from: NodeId, to: NodeId) -> Result<(), DomError> {
    if from == to {
        return Ok(());
    }
    let mut joined = document.text(from).ok_or(DomError::NotText(from))?.to_string();
    let mut absorbed = Vec::new();
    let mut current = from;
    while current != to {
        current = document
            .next_text_node(current)
            .ok_or(DomError::NotInRange { from, to })?;
        joined.push_str(document.text(current).unwrap_or_default());
        absorbed.push(current);
    }
    document.set_text(from, joined)?;

    for node in absorbed {
        let mut parent = document.parent(node);
        document.detach(node);
        while let Some(candidate) = parent {
            if document.contains(candidate, from) || !is_prunable(document, candidate) {
                break;
            }
            parent = document.parent(candidate);
            document.detach(candidate);
        }
    }
    if let Some(element) = containing_text_element(document, from) {
        set_space_preserve(document, element);
    }
    Ok(())
}

fn is_prunable(document: &Document, node: NodeId) -> bool {
    document.element(node).is_some() && (document.children(node).is_empty() || is_empty_run(document, node))
}

/// Splits the parent of `child` in two, moving the later siblings into a new
/// element inserted after the parent.
///
/// Properties children are copied so both halves keep their formatting.
fn split_parent(document: &mut Document, child: NodeId, child_goes_right: bool) -> Result<NodeId, DomError> {
    let parent = document.parent(child).ok_or(DomError::Detached(child))?;
    let index = document.child_index(child).ok_or(DomError::Detached(child))?;
    let start = if child_goes_right { index } else { index + 1 };

    let right = document.clone_shallow(parent);
    let siblings = document.children(parent).to_vec();
    for &sibling in &siblings[..start] {
        if is_properties_element(document, sibling) {
            let copy = document.clone_subtree(sibling);
            document.append_child(right, copy)?;
        }
    }
    for &sibling in &siblings[start..] {
        document.append_child(right, sibling)?;
    }
    document.insert_after(right, parent)?;
    Ok(right)
}

/// Splits `paragraph` at the text node, returning `(head, tail)`.
///
/// The head is the original paragraph and keeps its properties. The tail is a
/// new paragraph inserted right after it with a copy of those properties. With
/// `remove_text_node` the text unit is dropped, otherwise it leads the tail.
/// A section break stays with the tail, which ends where the original ended.
pub fn split_paragraph_by_text_node(
    document: &mut Document,
    paragraph: NodeId,
    text_node: NodeId,
    remove_text_node: bool,
) -> Result<(NodeId, NodeId), DomError> {
    if containing_paragraph(document, text_node) != Some(paragraph) {
        return Err(DomError::NotInParagraph { node: text_node, paragraph });
    }
    let cut = text_unit(document, text_node);
    let mut current = cut;
    let mut goes_right = !remove_text_node;
    let tail = loop {
        let parent = document.parent(current).ok_or(DomError::Detached(current))?;
        let right = split_parent(document, current, goes_right)?;
        if parent == paragraph {
            break right;
        }
        current = parent;
        goes_right = false;
    };
    if remove_text_node {
        document.detach(cut);
    }

    if let Some(properties) = document.find_child_named(paragraph, PARAGRAPH_PROPERTIES) {
        if let Some(section) = document.find_child_named(properties, SECTION_PROPERTIES) {
            document.detach(section);
        }
    }
    remove_empty_runs(document, paragraph);
    remove_empty_runs(document, tail);
    Ok((paragraph, tail))
}

/// Moves the content of `second` to the end of `first`.
///
/// `second` keeps only its properties. A section break it carried moves to
/// `first`, since `first` now ends where `second` ended.
pub fn join_paragraphs(document: &mut Document, first: NodeId, second: NodeId) -> Result<(), DomError> {
    if first == second {
        return Ok(());
    }
    let moving: Vec<NodeId> = document
        .children(second)
        .iter()
        .copied()
        .filter(|&child| !document.is_element_named(child, PARAGRAPH_PROPERTIES))
        .collect();
    for child in moving {
        document.append_child(first, child)?;
    }

    let section = document
        .find_child_named(second, PARAGRAPH_PROPERTIES)
        .and_then(|properties| document.find_child_named(properties, SECTION_PROPERTIES));
    if let Some(section) = section {
        let properties = ensure_properties(document, first, PARAGRAPH_PROPERTIES, &[])?;
        if let Some(previous) = document.find_child_named(properties, SECTION_PROPERTIES) {
            document.detach(previous);
        }
        match document.find_child_named(properties, PARAGRAPH_PROPERTIES_CHANGE) {
            Some(change) => document.insert_before(section, change)?,
            None => document.append_child(properties, section)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn first_named(doc: &Document, name: &str) -> NodeId {
        doc.find_descendants_named(doc.root(), name)[0]
    }

    fn text_nodes(doc: &Document) -> Vec<NodeId> {
        doc.descendants(doc.root())
            .into_iter()
            .filter(|&n| doc.is_text(n))
            .collect()
    }

    #[test]
    fn split_text_node_copies_the_text_element() {
        let mut doc = parse_document(r#"<w:p><w:r><w:t b="1">Hello world</w:t></w:r></w:p>"#).unwrap();
        let text = text_nodes(&doc)[0];
        let tail = split_text_node(&mut doc, text, 5).unwrap();
        assert_eq!(doc.text(text), Some("Hello"));
        assert_eq!(doc.text(tail), Some(" world"));
        assert_eq!(
            doc.to_xml(),
            r#"<w:p><w:r><w:t b="1" xml:space="preserve">Hello</w:t><w:t b="1" xml:space="preserve"> world</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn split_text_node_rejects_mid_character_offsets() {
        let mut doc = parse_document("<w:t>\u{00e9}a</w:t>").unwrap();
        let text = text_nodes(&doc)[0];
        assert!(matches!(
            split_text_node(&mut doc, text, 1),
            Err(DomError::InvalidOffset { .. })
        ));
    }

    #[test]
    fn joining_text_prunes_emptied_runs() {
        let mut doc = parse_document(
            "<w:p><w:r><w:t>{na</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>me</w:t></w:r><w:r><w:t>}</w:t></w:r></w:p>",
        )
        .unwrap();
        let texts = text_nodes(&doc);
        join_text_nodes_range(&mut doc, texts[0], texts[2]).unwrap();
        assert_eq!(doc.text(texts[0]), Some("{name}"));
        assert_eq!(doc.find_descendants_named(doc.root(), RUN).len(), 1);
    }

    #[test]
    fn paragraph_split_keeps_properties_on_both_halves() {
        let mut doc = parse_document(
            "<w:body><w:p><w:pPr><w:jc/></w:pPr><w:r><w:t>a</w:t><w:t>{#x}</w:t><w:t>b</w:t></w:r></w:p></w:body>",
        )
        .unwrap();
        let paragraph = first_named(&doc, PARAGRAPH);
        let tag = text_nodes(&doc)[1];
        let (head, tail) = split_paragraph_by_text_node(&mut doc, paragraph, tag, true).unwrap();
        assert_eq!(head, paragraph);
        assert_eq!(doc.text_content(head), "a");
        assert_eq!(doc.text_content(tail), "b");
        assert!(doc.find_child_named(tail, PARAGRAPH_PROPERTIES).is_some());
        assert_eq!(doc.next_sibling(head), Some(tail));
    }

    #[test]
    fn paragraph_split_at_edge_drops_empty_runs() {
        let mut doc =
            parse_document("<w:body><w:p><w:r><w:t>{#x}</w:t></w:r></w:p></w:body>").unwrap();
        let paragraph = first_named(&doc, PARAGRAPH);
        let tag = text_nodes(&doc)[0];
        let (head, tail) = split_paragraph_by_text_node(&mut doc, paragraph, tag, true).unwrap();
        assert!(is_empty_paragraph(&doc, head));
        assert!(is_empty_paragraph(&doc, tail));
        assert!(doc.children(head).is_empty());
    }

    #[test]
    fn section_break_follows_the_tail() {
        let mut doc = parse_document(
            "<w:body><w:p><w:pPr><w:sectPr/></w:pPr><w:r><w:t>a</w:t><w:t>b</w:t></w:r></w:p></w:body>",
        )
        .unwrap();
        let paragraph = first_named(&doc, PARAGRAPH);
        let cut = text_nodes(&doc)[1];
        let (head, tail) = split_paragraph_by_text_node(&mut doc, paragraph, cut, false).unwrap();
        assert!(!has_section_properties(&doc, head));
        assert!(has_section_properties(&doc, tail));

        join_paragraphs(&mut doc, head, tail).unwrap();
        doc.detach(tail);
        assert!(has_section_properties(&doc, head));
        assert_eq!(doc.text_content(head), "ab");
    }

    #[test]
    fn empty_paragraph_in_cell_is_kept() {
        let doc = parse_document("<w:tc><w:p><w:r><w:rPr/></w:r></w:p></w:tc>").unwrap();
        let paragraph = first_named(&doc, PARAGRAPH);
        assert!(is_empty_paragraph(&doc, paragraph));
        assert!(!is_removable_empty_paragraph(&doc, paragraph));
    }

    #[test]
    fn list_paragraphs_are_detected() {
        let doc = parse_document("<w:p><w:pPr><w:numPr/></w:pPr></w:p>").unwrap();
        assert!(is_list_paragraph(&doc, doc.root()));
    }
}
