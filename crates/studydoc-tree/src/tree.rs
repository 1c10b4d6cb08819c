//! Arena-backed parse tree.
//!
//! Nodes live in a flat `Vec` and reference each other by [`NodeId`]. The
//! tree owns every node; `parent` is a back-reference used to find a node's
//! slot when it gets replaced. Replaced nodes stay in the arena but are no
//! longer reachable from the root.

use crate::error::TreeError;
use crate::node::{Element, NodeKind};

/// Index of a node inside a [`ParseTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parsed document tree.
#[derive(Debug, Clone)]
pub struct ParseTree {
    nodes: Vec<NodeData>,
}

impl Default for ParseTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseTree {
    /// Create a tree containing only the document root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TreeError> {
        self.nodes.get_mut(id.0).ok_or(TreeError::UnknownNode(id))
    }

    // Node classification. Each predicate is independent; callers narrow an
    // id with these before structural access.

    /// The id refers to a node of this tree.
    #[must_use]
    pub fn is_node(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// The node can hold children (document root or element).
    #[must_use]
    pub fn is_parent_node(&self, id: NodeId) -> bool {
        matches!(
            self.data(id).map(|d| &d.kind),
            Some(NodeKind::Document | NodeKind::Element(_))
        )
    }

    /// The node can have a parent (anything but the document root).
    /// A detached child node still qualifies; its parent is just absent.
    #[must_use]
    pub fn is_child_node(&self, id: NodeId) -> bool {
        self.data(id)
            .is_some_and(|d| !matches!(d.kind, NodeKind::Document))
    }

    /// The node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.is_parent_node(id) && self.is_child_node(id) && self.element(id).is_some()
    }

    /// The node is a text leaf.
    #[must_use]
    pub fn is_text_node(&self, id: NodeId) -> bool {
        self.is_child_node(id) && self.text(id).is_some()
    }

    /// The node is a comment.
    #[must_use]
    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.data(id).map(|d| &d.kind), Some(NodeKind::Comment(_)))
    }

    /// Node kind.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Element payload, if the node is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id).map(|d| &d.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Mutable element payload, if the node is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|d| &mut d.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Text value, if the node is a text leaf.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id).map(|d| &d.kind) {
            Some(NodeKind::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// Mutable text value, if the node is a text leaf.
    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match self.nodes.get_mut(id.0).map(|d| &mut d.kind) {
            Some(NodeKind::Text(t)) => Some(t),
            _ => None,
        }
    }

    /// Parent of the node (`None` for the root and detached nodes).
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).and_then(|d| d.parent)
    }

    /// Children of the node in document order (empty for leaves).
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).map_or(&[], |d| d.children.as_slice())
    }

    /// Whether the root has no children at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append a detached node as the last child of `parent`.
    ///
    /// Consecutive text nodes are not merged.
    ///
    /// # Errors
    ///
    /// Fails if `parent` cannot hold children or `child` is the root or
    /// already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_insertable(parent, child)?;
        self.data_mut(parent)?.children.push(child);
        self.data_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.is_parent_node(parent) {
            return Err(TreeError::NotAParent(parent));
        }
        if !self.is_child_node(child) || self.parent(child).is_some() {
            return Err(TreeError::InvalidChild(child));
        }
        Ok(())
    }

    /// Position of `node` within its parent's children, computed now.
    ///
    /// # Errors
    ///
    /// Fails if the node has no parent or the parent does not list it.
    pub fn index_in_parent(&self, node: NodeId) -> Result<usize, TreeError> {
        let parent = self.parent(node).ok_or(TreeError::Detached(node))?;
        self.children(parent)
            .iter()
            .position(|&c| c == node)
            .ok_or(TreeError::NotInParent { node, parent })
    }

    /// Replace `node` in its parent's child list with `replacements`.
    ///
    /// The node's slot is looked up right before splicing, so earlier
    /// modifications of its siblings are taken into account. Replacements may
    /// be freshly created nodes or nodes detached from elsewhere in the tree;
    /// children of `node` itself may be passed to hoist them into its place.
    ///
    /// # Errors
    ///
    /// Fails with [`TreeError::NotInParent`] if the tree no longer lists the
    /// node under its parent, or if a replacement cannot be inserted.
    pub fn replace_with(
        &mut self,
        node: NodeId,
        replacements: Vec<NodeId>,
    ) -> Result<(), TreeError> {
        let parent = self.parent(node).ok_or(TreeError::Detached(node))?;
        self.index_in_parent(node)?;

        for (i, &r) in replacements.iter().enumerate() {
            if r == node
                || !self.is_child_node(r)
                || self.is_ancestor_of(r, parent)
                || replacements[..i].contains(&r)
            {
                return Err(TreeError::InvalidChild(r));
            }
        }
        for &r in &replacements {
            // Nodes may be moved in from elsewhere, e.g. hoisted from below `node`
            if let Some(from) = self.parent(r) {
                tracing::trace!(?r, ?from, "moving node into replacement");
                self.detach(r)?;
            }
        }

        // Sibling positions may have shifted while moving nodes
        let index = self.index_in_parent(node)?;
        for &r in &replacements {
            self.data_mut(r)?.parent = Some(parent);
        }
        self.data_mut(parent)?
            .children
            .splice(index..=index, replacements);
        self.data_mut(node)?.parent = None;
        Ok(())
    }

    /// Remove `node` from its parent, keeping it in the arena.
    ///
    /// # Errors
    ///
    /// Fails if the node is not attached.
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(node).ok_or(TreeError::Detached(node))?;
        let index = self.index_in_parent(node)?;
        self.data_mut(parent)?.children.remove(index);
        self.data_mut(node)?.parent = None;
        Ok(())
    }

    /// Whether the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.is_ancestor_of(self.root(), node)
    }

    /// Whether `ancestor` is `node` itself or one of its ancestors.
    fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Deep-copy `node` (and its subtree) from `other` into this tree.
    ///
    /// Returns the detached copy. Importing another tree's root copies it as
    /// nothing: use [`import_children`](Self::import_children) instead.
    ///
    /// # Errors
    ///
    /// Fails if `node` is the root of `other` or does not exist there.
    pub fn import(&mut self, other: &ParseTree, node: NodeId) -> Result<NodeId, TreeError> {
        let data = other.data(node).ok_or(TreeError::UnknownNode(node))?;
        if matches!(data.kind, NodeKind::Document) {
            return Err(TreeError::InvalidChild(node));
        }
        let copy = self.push(data.kind.clone());

        // Explicit stack of (source node, parent copy); templates may nest deeply
        let mut stack: Vec<(NodeId, NodeId)> =
            data.children.iter().rev().map(|&c| (c, copy)).collect();
        while let Some((source, parent)) = stack.pop() {
            let data = other.data(source).ok_or(TreeError::UnknownNode(source))?;
            let child_copy = self.push(data.kind.clone());
            self.append_child(parent, child_copy)?;
            stack.extend(data.children.iter().rev().map(|&c| (c, child_copy)));
        }
        Ok(copy)
    }

    /// Deep-copy all children of `parent` in `other` into this tree.
    ///
    /// # Errors
    ///
    /// Propagates [`import`](Self::import) failures.
    pub fn import_children(
        &mut self,
        other: &ParseTree,
        parent: NodeId,
    ) -> Result<Vec<NodeId>, TreeError> {
        other
            .children(parent)
            .iter()
            .map(|&c| self.import(other, c))
            .collect()
    }

    /// Pre-order iterator over the descendants of `node` (excluding `node`).
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(node).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// All attached elements named `name`, in document order.
    #[must_use]
    pub fn find_elements(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&id| self.element(id).is_some_and(|el| el.is_named(name)))
            .collect()
    }

    /// Whether any descendant of `node` is an element satisfying `pred`.
    pub fn has_descendant_element(&self, node: NodeId, pred: impl Fn(&Element) -> bool) -> bool {
        self.descendants(node)
            .any(|id| self.element(id).is_some_and(&pred))
    }

    /// Concatenated text of all text descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|id| self.text(id))
            .collect()
    }
}

/// Pre-order traversal returned by [`ParseTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a ParseTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
