use thiserror::Error;

use crate::node::NodeId;

#[derive(Error, Debug)]
pub enum DomError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("XML escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("Invalid UTF-8 in markup: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Markup has no root element")]
    MissingRoot,

    #[error("Unbalanced markup: {0}")]
    Unbalanced(String),

    #[error("Node {0} is not a text node")]
    NotText(NodeId),

    #[error("Node {0} is not attached to a parent")]
    Detached(NodeId),

    #[error("Inserting node {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("Nodes {first} and {last} are not ordered siblings")]
    NotSiblings { first: NodeId, last: NodeId },

    #[error("Offset {offset} is not a character boundary of text node {node}")]
    InvalidOffset { node: NodeId, offset: usize },

    #[error("Node {node} is not inside paragraph {paragraph}")]
    NotInParagraph { node: NodeId, paragraph: NodeId },

    #[error("Text node {to} does not follow text node {from}")]
    NotInRange { from: NodeId, to: NodeId },
}
