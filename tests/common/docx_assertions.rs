use stencil::{Document, NodeId};

pub fn body(document: &Document) -> NodeId {
    document
        .find_descendants_named(document.root(), "w:body")
        .first()
        .copied()
        .unwrap_or_else(|| document.root())
}

/// Text of every paragraph, tables and content controls included, in document order.
pub fn paragraph_texts(document: &Document) -> Vec<String> {
    document
        .find_descendants_named(body(document), "w:p")
        .into_iter()
        .map(|paragraph| document.text_content(paragraph))
        .collect()
}

pub fn body_children(document: &Document) -> Vec<String> {
    document
        .children(body(document))
        .iter()
        .filter_map(|&child| document.name(child))
        .map(str::to_string)
        .collect()
}

/// Number of elements named `name` anywhere in the document.
pub fn count_elements(document: &Document, name: &str) -> usize {
    document.find_descendants_named(document.root(), name).len()
}

/// Assert the paragraph texts of a rendered part
#[macro_export]
macro_rules! assert_paragraphs {
    ($rendered:expr, [$($text:expr),* $(,)?]) => {
        let expected: Vec<String> = vec![$($text.to_string()),*];
        assert_eq!(
            $rendered.paragraph_texts(),
            expected,
            "Unexpected paragraphs in:\n{}",
            $rendered.xml()
        );
    };
}

/// Assert that the serialized part contains a fragment
#[macro_export]
macro_rules! assert_xml_contains {
    ($rendered:expr, $fragment:expr) => {
        let xml = $rendered.xml();
        assert!(
            xml.contains($fragment),
            "XML should contain '{}', but was:\n{}",
            $fragment,
            xml
        );
    };
}

/// Assert that the serialized part does NOT contain a fragment
#[macro_export]
macro_rules! assert_xml_not_contains {
    ($rendered:expr, $fragment:expr) => {
        let xml = $rendered.xml();
        assert!(
            !xml.contains($fragment),
            "XML should NOT contain '{}', but was:\n{}",
            $fragment,
            xml
        );
    };
}
