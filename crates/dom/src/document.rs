use std::collections::HashMap;

use crate::error::DomError;
use crate::node::{Element, NodeId, NodeKind};

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-backed mutable XML tree.
///
/// Every node lives in a single vector and is addressed by [`NodeId`]. Nodes
/// removed from the tree stay in the arena as detached slots, so handles held
/// by callers never dangle. Insertion always detaches the node from its
/// previous parent first, which keeps parent and child links consistent.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    prolog: Option<String>,
}

impl Document {
    /// Creates a document whose root is an empty element named `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            root: NodeId::new(0),
            prolog: None,
        };
        document.root = document.create_element(root_name);
        document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.detach(root);
        self.root = root;
    }

    /// Raw markup preceding the root element, such as the XML declaration.
    pub fn prolog(&self) -> Option<&str> {
        self.prolog.as_deref()
    }

    pub fn set_prolog(&mut self, prolog: Option<String>) {
        self.prolog = prolog;
    }

    /// Number of slots in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in the arena in allocation order, detached ones included.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    // ----- creation -----

    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element(Element::new(name)))
    }

    pub fn create_element_with(&mut self, element: Element) -> NodeId {
        self.alloc(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_markup(&mut self, raw: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Markup(raw.into()))
    }

    // ----- inspection -----

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.data(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.data_mut(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Element name, or `None` for text and markup nodes.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.name.as_str())
    }

    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id).kind, NodeKind::Text(_))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) -> Result<(), DomError> {
        match &mut self.data_mut(id).kind {
            NodeKind::Text(text) => {
                *text = value.into();
                Ok(())
            }
            _ => Err(DomError::NotText(id)),
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    /// Sets an attribute on an element node. Text and markup nodes are left untouched.
    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(element) = self.element_mut(id) {
            element.set_attribute(name, value);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?;
        index
            .checked_sub(1)
            .and_then(|previous| self.children(parent).get(previous).copied())
    }

    /// Number of ancestors between `id` and the top of its tree.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// Returns true when `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|candidate| candidate == ancestor)
    }

    /// Returns true when `id` is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Nearest node, starting with `id` itself, that satisfies `predicate`.
    pub fn find_ancestor_or_self<F>(&self, id: NodeId, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(NodeId) -> bool,
    {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&node| predicate(node))
    }

    pub fn find_ancestor_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.find_ancestor_or_self(id, |node| self.is_element_named(node, name))
    }

    /// Descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn find_descendants_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.is_element_named(node, name))
            .collect()
    }

    pub fn find_child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.is_element_named(child, name))
    }

    /// Concatenated character data of the subtree rooted at `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(text) = self.text(id) {
            out.push_str(text);
        }
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Next text node after `id` in document order, without descending into `id`.
    pub fn next_text_node(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let mut next = self.next_sibling(current);
            while next.is_none() {
                current = self.parent(current)?;
                next = self.next_sibling(current);
            }
            current = next?;
            if self.is_text(current) {
                return Some(current);
            }
            if let Some(found) = self.descendants(current).into_iter().find(|&n| self.is_text(n)) {
                return Some(found);
            }
        }
    }

    /// Previous text node before `id` in document order.
    pub fn previous_text_node(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let mut previous = self.previous_sibling(current);
            while previous.is_none() {
                current = self.parent(current)?;
                previous = self.previous_sibling(current);
            }
            current = previous?;
            if self.is_text(current) {
                return Some(current);
            }
            if let Some(found) = self
                .descendants(current)
                .into_iter()
                .rev()
                .find(|&n| self.is_text(n))
            {
                return Some(found);
            }
        }
    }

    // ----- mutation -----

    /// Removes `id` from its parent. The node keeps its own subtree.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.data_mut(id).parent.take() {
            self.data_mut(parent).children.retain(|&child| child != id);
        }
    }

    fn check_cycle(&self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
        if self.contains(node, parent) {
            return Err(DomError::Cycle { node, parent });
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_cycle(parent, child)?;
        self.detach(child);
        self.data_mut(parent).children.push(child);
        self.data_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Inserts `child` at `index` among the children of `parent`, clamping to the end.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), DomError> {
        self.check_cycle(parent, child)?;
        self.detach(child);
        let children = &mut self.data_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.data_mut(child).parent = Some(parent);
        Ok(())
    }

    pub fn insert_before(&mut self, node: NodeId, reference: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        self.check_cycle(parent, node)?;
        self.detach(node);
        let index = self.child_index(reference).ok_or(DomError::Detached(reference))?;
        self.insert_child(parent, index, node)
    }

    pub fn insert_after(&mut self, node: NodeId, reference: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        self.check_cycle(parent, node)?;
        self.detach(node);
        let index = self.child_index(reference).ok_or(DomError::Detached(reference))?;
        self.insert_child(parent, index + 1, node)
    }

    /// Copies `id` and its attributes without children. The copy is detached.
    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let kind = self.data(id).kind.clone();
        self.alloc(kind)
    }

    /// Deep copy of the subtree rooted at `id`. The copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let mut map = HashMap::new();
        self.clone_subtree_mapped(id, &mut map)
    }

    /// Deep copy that records every original-to-copy pair in `map`.
    pub fn clone_subtree_mapped(&mut self, id: NodeId, map: &mut HashMap<NodeId, NodeId>) -> NodeId {
        let copy = self.clone_shallow(id);
        map.insert(id, copy);
        let children = self.children(id).to_vec();
        for child in children {
            let child_copy = self.clone_subtree_mapped(child, map);
            self.data_mut(copy).children.push(child_copy);
            self.data_mut(child_copy).parent = Some(copy);
        }
        copy
    }

    /// Siblings from `first` to `last`, both inclusive.
    pub fn siblings_in_range(&self, first: NodeId, last: NodeId) -> Result<Vec<NodeId>, DomError> {
        let parent = self.parent(first).ok_or(DomError::Detached(first))?;
        if self.parent(last) != Some(parent) {
            return Err(DomError::NotSiblings { first, last });
        }
        let children = self.children(parent);
        let start = children.iter().position(|&n| n == first);
        let end = children.iter().position(|&n| n == last);
        match (start, end) {
            (Some(start), Some(end)) if start <= end => Ok(children[start..=end].to_vec()),
            _ => Err(DomError::NotSiblings { first, last }),
        }
    }

    /// Detaches and returns the siblings strictly between `first` and `last`.
    pub fn remove_siblings_between(&mut self, first: NodeId, last: NodeId) -> Result<Vec<NodeId>, DomError> {
        let range = self.siblings_in_range(first, last)?;
        let inner: Vec<NodeId> = range
            .get(1..range.len().saturating_sub(1))
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default();
        for &node in &inner {
            self.detach(node);
        }
        Ok(inner)
    }
}
