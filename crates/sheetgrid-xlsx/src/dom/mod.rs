//! In-memory XML tree
//!
//! An arena of element and text nodes addressed by [`NodeId`]. Each package
//! part (workbook, worksheet, shared strings, styles, ...) is held as one
//! [`XmlTree`] while the document is open, edited in place, and serialized
//! again on save.
//!
//! Element names are kept verbatim, prefix included. Lookups by name
//! compare local names, so `x:row` and `row` both match `"row"`.

mod read;
mod write;

use crate::error::{XlsxError, XlsxResult};

/// Handle to a node of one [`XmlTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An XML document held as an arena of nodes
///
/// Detached nodes stay in the arena until the tree is dropped; they are
/// simply no longer reachable from the root.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
    root: NodeId,
}

/// Local part of a possibly prefixed name (`x:row` -> `row`)
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl XmlTree {
    /// Create a tree holding a single empty root element
    pub fn new(root_name: &str) -> Self {
        let root = Node {
            kind: NodeKind::Element {
                name: root_name.to_string(),
                attrs: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Parse a tree from XML bytes
    pub fn parse(bytes: &[u8]) -> XlsxResult<Self> {
        read::parse(bytes)
    }

    /// Serialize the tree, including the XML declaration
    pub fn to_xml(&self) -> XlsxResult<Vec<u8>> {
        write::serialize(self)
    }

    /// The root element
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: name.to_string(),
            attrs: Vec::new(),
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// `local` qualified with the prefix `node` uses, if any
    pub fn qualified(&self, node: NodeId, local: &str) -> String {
        match self.name(node).and_then(|n| n.split_once(':')) {
            Some((prefix, _)) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Create a detached element in the same namespace prefix as `like`
    pub fn create_element_like(&mut self, like: NodeId, local: &str) -> NodeId {
        let name = self.qualified(like, local);
        self.create_element(&name)
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Insert `child` under `parent` immediately before `reference`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> XlsxResult<()> {
        if self.parent(reference) != Some(parent) {
            return Err(XlsxError::InvalidFormat(
                "insert_before: reference node is not a child of the parent".into(),
            ));
        }
        self.remove(child);
        let pos = self
            .node(parent)
            .children
            .iter()
            .position(|c| *c == reference)
            .ok_or_else(|| XlsxError::InvalidFormat("insert_before: reference not found".into()))?;
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.insert(pos, child);
        Ok(())
    }

    /// Detach a node from its parent; no-op for detached nodes
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.node_mut(node).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != node);
        }
    }

    /// Parent of a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Children of a node, in document order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// Child elements whose local name is `name`
    pub fn child_elements<'a>(
        &'a self,
        node: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(node)
            .iter()
            .copied()
            .filter(move |c| self.name(*c).map_or(false, |n| local_name(n) == name))
    }

    /// First child element whose local name is `name`
    pub fn first_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(node, name).next()
    }

    /// First child element named `name`, appended if missing
    pub fn get_or_create_child(&mut self, node: NodeId, name: &str) -> NodeId {
        match self.first_child(node, name) {
            Some(child) => child,
            None => {
                let child = self.create_element_like(node, name);
                self.append_child(node, child);
                child
            }
        }
    }

    /// Element name (verbatim), `None` for text nodes
    pub fn name(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    /// Check whether a node is an element with the given local name
    pub fn is(&self, node: NodeId, name: &str) -> bool {
        self.name(node).map_or(false, |n| local_name(n) == name)
    }

    /// Content of a text node
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).kind {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element { .. } => None,
        }
    }

    /// Attributes of an element in document order
    pub fn attrs(&self, node: NodeId) -> &[(String, String)] {
        match &self.node(node).kind {
            NodeKind::Element { attrs, .. } => attrs,
            NodeKind::Text(_) => &[],
        }
    }

    /// Attribute value by exact name
    pub fn attr(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attrs(node)
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attr(&mut self, node: NodeId, key: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.node_mut(node).kind {
            match attrs.iter_mut().find(|(k, _)| k == key) {
                Some((_, v)) => *v = value.to_string(),
                None => attrs.push((key.to_string(), value.to_string())),
            }
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, node: NodeId, key: &str) -> Option<String> {
        if let NodeKind::Element { attrs, .. } = &mut self.node_mut(node).kind {
            if let Some(pos) = attrs.iter().position(|(k, _)| k == key) {
                return Some(attrs.remove(pos).1);
            }
        }
        None
    }

    /// Concatenated text of all descendant text nodes
    pub fn inner_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.node(node).kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element { .. } => {
                for child in &self.node(node).children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Replace all children of `node` with a single text node
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        let t = self.create_text(text);
        self.append_child(node, t);
    }

    /// Detach every child of `node`
    pub fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.node_mut(node).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
    }
}
