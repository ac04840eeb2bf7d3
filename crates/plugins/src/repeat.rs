//! Cloning and recompiling the regions isolated by a loop strategy.

use std::collections::HashMap;

use stencil_dom::{Document, NodeId};
use stencil_template_core::{PathPart, ScopeData, Tag, TemplateCompiler, TemplateContext, TemplateError};

const WRAPPER_NAME: &str = "stencil:wrapper";

/// One copy of a repeated region with its tags re-anchored in the copy.
pub(crate) struct RepeatedGroup {
    pub nodes: Vec<NodeId>,
    pub tags: Vec<Tag>,
}

/// Deep-clones `nodes` `times` times. Inner tags follow their text nodes into each copy.
pub(crate) fn repeat(document: &mut Document, nodes: &[NodeId], inner_tags: &[Tag], times: usize) -> Vec<RepeatedGroup> {
    (0..times)
        .map(|_| {
            let mut map = HashMap::new();
            let nodes = nodes
                .iter()
                .map(|&node| document.clone_subtree_mapped(node, &mut map))
                .collect();
            let tags = inner_tags
                .iter()
                .filter_map(|tag| map.get(&tag.text_node).map(|&copy| tag.relocated(copy)))
                .collect();
            RepeatedGroup { nodes, tags }
        })
        .collect()
}

/// How each copy moves the scope path while it compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeStep {
    /// Push the copy's index, as loops do.
    Index,
    /// Keep the current path, as sections do.
    Stay,
}

/// Compiles every group under a temporary root and returns the resulting top-level nodes.
pub(crate) fn compile_groups(
    compiler: &TemplateCompiler,
    document: &mut Document,
    groups: Vec<RepeatedGroup>,
    scope: &mut ScopeData<'_>,
    context: &TemplateContext<'_>,
    step: ScopeStep,
) -> Result<Vec<Vec<NodeId>>, TemplateError> {
    let mut compiled = Vec::with_capacity(groups.len());
    for (index, group) in groups.into_iter().enumerate() {
        let mut wrapper = WrapperRoot::new(document, &group.nodes)?;
        let result = match step {
            ScopeStep::Index => scope.with_part(PathPart::Index(index), |scope| {
                compiler.compile_tags(wrapper.document(), &group.tags, scope, context)
            }),
            ScopeStep::Stay => compiler.compile_tags(wrapper.document(), &group.tags, scope, context),
        };
        let nodes = wrapper.release();
        result?;
        compiled.push(nodes);
    }
    Ok(compiled)
}

/// A temporary parent for a detached copy.
///
/// Plugins that run inside the copy may split or remove its top-level nodes,
/// so the copy is tracked through this parent rather than a node list. The
/// children are always detached again, on release or on drop.
pub(crate) struct WrapperRoot<'d> {
    document: &'d mut Document,
    root: NodeId,
    released: bool,
}

impl<'d> WrapperRoot<'d> {
    pub fn new(document: &'d mut Document, nodes: &[NodeId]) -> Result<Self, TemplateError> {
        let root = document.create_element(WRAPPER_NAME);
        for &node in nodes {
            document.append_child(root, node)?;
        }
        Ok(Self {
            document,
            root,
            released: false,
        })
    }

    pub fn document(&mut self) -> &mut Document {
        self.document
    }

    /// Detaches and returns the wrapped nodes in order.
    pub fn release(mut self) -> Vec<NodeId> {
        self.take_children()
    }

    fn take_children(&mut self) -> Vec<NodeId> {
        self.released = true;
        let children = self.document.children(self.root).to_vec();
        for &child in &children {
            self.document.detach(child);
        }
        children
    }
}

impl Drop for WrapperRoot<'_> {
    fn drop(&mut self) {
        if !self.released {
            self.take_children();
        }
    }
}
