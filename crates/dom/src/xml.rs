//! Markup parsing and serialization for [`Document`] trees.
//!
//! Parsing keeps whitespace-only text, comments and processing instructions so
//! that a part re-serializes without drift. Entity and character references are
//! decoded into plain text nodes; adjacent character data is merged.

use quick_xml::escape::{escape, partial_escape, resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::Document;
use crate::error::DomError;
use crate::node::{Element, NodeId, NodeKind};

const FRAGMENT_CONTAINER: &str = "#fragment";

/// Parses a complete XML document part.
pub fn parse_document(source: &str) -> Result<Document, DomError> {
    let mut document = Document::new(FRAGMENT_CONTAINER);
    let container = document.root();
    parse_into(&mut document, container, source)?;

    let mut prolog = String::new();
    let mut root = None;
    for &child in document.children(container) {
        match document.kind(child) {
            NodeKind::Element(_) => {
                root = Some(child);
                break;
            }
            NodeKind::Markup(raw) => prolog.push_str(raw),
            NodeKind::Text(_) => {}
        }
    }
    let root = root.ok_or(DomError::MissingRoot)?;
    document.set_root(root);
    if !prolog.is_empty() {
        document.set_prolog(Some(prolog));
    }
    Ok(document)
}

/// Parses a markup fragment into detached top-level nodes owned by `document`.
pub fn parse_fragment(document: &mut Document, source: &str) -> Result<Vec<NodeId>, DomError> {
    let container = document.create_element(FRAGMENT_CONTAINER);
    parse_into(document, container, source)?;
    let nodes = document.children(container).to_vec();
    for &node in &nodes {
        document.detach(node);
    }
    Ok(nodes)
}

fn parse_into(document: &mut Document, container: NodeId, source: &str) -> Result<(), DomError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);

    let mut stack = vec![container];
    loop {
        let parent = *stack.last().ok_or_else(|| DomError::Unbalanced("empty stack".into()))?;
        match reader.read_event()? {
            Event::Start(e) => {
                let node = document.create_element_with(element_from(&e)?);
                document.append_child(parent, node)?;
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = document.create_element_with(element_from(&e)?);
                document.append_child(parent, node)?;
            }
            Event::End(e) => {
                if stack.len() == 1 {
                    let name = std::str::from_utf8(e.name().as_ref())?.to_string();
                    return Err(DomError::Unbalanced(format!("unexpected closing tag </{name}>")));
                }
                stack.pop();
            }
            Event::Text(e) => {
                let raw = std::str::from_utf8(&e)?;
                let text = unescape(raw)?;
                append_text(document, parent, &text)?;
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e)?;
                append_text(document, parent, text)?;
            }
            Event::GeneralRef(e) => {
                let name = std::str::from_utf8(&e)?;
                append_text(document, parent, &resolve_reference(name))?;
            }
            Event::Comment(e) => {
                let raw = format!("<!--{}-->", std::str::from_utf8(&e)?);
                let node = document.create_markup(raw);
                document.append_child(parent, node)?;
            }
            Event::PI(e) => {
                let raw = format!("<?{}?>", std::str::from_utf8(&e)?);
                let node = document.create_markup(raw);
                document.append_child(parent, node)?;
            }
            Event::DocType(e) => {
                let raw = format!("<!DOCTYPE {}>", std::str::from_utf8(&e)?);
                let node = document.create_markup(raw);
                document.append_child(parent, node)?;
            }
            Event::Decl(e) => {
                let mut raw = String::from("<?xml version=\"");
                raw.push_str(std::str::from_utf8(&e.version()?)?);
                raw.push('"');
                if let Some(encoding) = e.encoding() {
                    raw.push_str(" encoding=\"");
                    raw.push_str(std::str::from_utf8(&encoding?)?);
                    raw.push('"');
                }
                if let Some(standalone) = e.standalone() {
                    raw.push_str(" standalone=\"");
                    raw.push_str(std::str::from_utf8(&standalone?)?);
                    raw.push('"');
                }
                raw.push_str("?>");
                let node = document.create_markup(raw);
                document.append_child(parent, node)?;
            }
            Event::Eof => break,
        }
    }

    if stack.len() != 1 {
        return Err(DomError::Unbalanced(format!(
            "{} element(s) left open at end of input",
            stack.len() - 1
        )));
    }
    Ok(())
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, DomError> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let raw = std::str::from_utf8(&attribute.value)?;
        element.attributes.push((key, unescape(raw)?.into_owned()));
    }
    Ok(element)
}

fn resolve_reference(name: &str) -> String {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        if let Some(ch) = parsed.and_then(char::from_u32) {
            return ch.to_string();
        }
    } else if let Some(resolved) = resolve_predefined_entity(name) {
        return resolved.to_string();
    }
    log::warn!("Keeping unknown entity reference '&{name};' as literal text");
    format!("&{name};")
}

fn append_text(document: &mut Document, parent: NodeId, text: &str) -> Result<(), DomError> {
    if let Some(last) = document.last_child(parent) {
        if let Some(existing) = document.text(last) {
            let merged = format!("{existing}{text}");
            return document.set_text(last, merged);
        }
    }
    let node = document.create_text(text);
    document.append_child(parent, node)
}

impl Document {
    /// Serializes the whole document, prolog included.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if let Some(prolog) = self.prolog() {
            out.push_str(prolog);
        }
        self.write_node(self.root(), &mut out);
        out
    }

    /// Serializes the subtree rooted at `id`.
    pub fn node_to_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(text) => out.push_str(&partial_escape(text.as_str())),
            NodeKind::Markup(raw) => out.push_str(raw),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for (key, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape(value.as_str()));
                    out.push('"');
                }
                let children = self.children(id);
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
    }
}
