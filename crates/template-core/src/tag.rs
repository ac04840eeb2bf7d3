use stencil_dom::NodeId;

use crate::options::TagOptions;

/// Whether a tag stands alone, opens a container, or closes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDisposition {
    SelfClosed,
    Open,
    Close,
}

/// The container sigil an open tag was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Loop,
    TableLoop,
    Section,
}

/// A parsed placeholder.
///
/// After parsing, `text_node` holds no tag characters: the delimiters and the
/// tag body have been stripped so plugins can write their output there.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub raw_text: String,
    pub disposition: TagDisposition,
    /// Set for open tags only.
    pub container: Option<ContainerKind>,
    pub options: TagOptions,
    pub text_node: NodeId,
}

impl Tag {
    /// The same tag anchored at another text node, used for cloned regions.
    pub fn relocated(&self, text_node: NodeId) -> Self {
        Self {
            text_node,
            ..self.clone()
        }
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|value| value.as_str())
    }
}
