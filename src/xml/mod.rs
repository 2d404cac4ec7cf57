//! A mutable XML tree that round-trips hand-maintained documents.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. An element's
//! `text` is the content before its first child, and each node's `tail` is
//! the content after it, up to the next sibling. Comments and processing instructions are nodes of their own,
//! attributes keep their declaration order, and everything outside the root
//! element is kept verbatim, so an untouched document serializes back to its
//! original bytes.

mod editor;
mod parser;
mod writer;

pub use editor::XmlEditor;

use crate::error::Result;
use std::path::Path;

/// Index of a node in its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element {
        tag: String,
        /// Attributes in declaration order.
        attributes: Vec<(String, String)>,
    },
    /// `<!--text-->`
    Comment,
    /// `<?text?>`
    ProcessingInstruction,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    text: Option<String>,
    tail: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: None,
            tail: None,
            children: Vec::new(),
            parent: None,
        }
    }
}

/// An XML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    /// Raw content before the root element (declaration, comments, whitespace).
    prolog: String,
    /// Raw content after the root element.
    epilog: String,
    bom: bool,
    newline: &'static str,
}

impl Document {
    /// Create a document with an empty root element.
    pub fn new(root_tag: &str) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            prolog: String::new(),
            epilog: String::new(),
            bom: false,
            newline: "\n",
        };
        doc.root = doc.create_element(root_tag);
        doc
    }

    /// Parse a document from a string.
    pub fn parse_str(xml: &str) -> Result<Self> {
        parser::parse(xml)
    }

    /// Load and parse a document from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse_str(&xml)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Line break style of the source document ("\r\n" or "\n").
    pub fn newline(&self) -> &'static str {
        self.newline
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    /// Tag name, or `None` for comments and processing instructions.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    pub fn set_text(&mut self, id: NodeId, text: Option<String>) {
        self.nodes[id.0].text = text;
    }

    pub fn tail(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].tail.as_deref()
    }

    pub fn set_tail(&mut self, id: NodeId, tail: Option<String>) {
        self.nodes[id.0].tail = tail;
    }

    /// Attributes in declaration order; empty for non-elements.
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.kind(id) {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace all attributes. Ignored for non-elements.
    pub fn set_attributes(&mut self, id: NodeId, new_attributes: Vec<(String, String)>) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            *attributes = new_attributes;
        }
    }

    /// Set one attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            let value = value.into();
            match attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value,
                None => attributes.push((name.to_string(), value)),
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All child nodes, comments included.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Child elements only.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.is_element(child))
    }

    /// First child element with the given tag, with its position among all children.
    pub fn find_child(&self, id: NodeId, tag: &str) -> Option<(usize, NodeId)> {
        self.children(id)
            .iter()
            .copied()
            .enumerate()
            .find(|&(_, child)| self.tag(child) == Some(tag))
    }

    /// Follow a `/`-separated path of child tags, e.g. `Id/SubtypeId`.
    pub fn find_path(&self, id: NodeId, path: &str) -> Option<NodeId> {
        path.trim_start_matches("./")
            .split('/')
            .filter(|step| !step.is_empty())
            .try_fold(id, |node, step| self.find_child(node, step).map(|(_, child)| child))
    }

    /// Text of the element at `path`; `Some("")` if it exists but has no text.
    pub fn find_text(&self, id: NodeId, path: &str) -> Option<&str> {
        self.find_path(id, path)
            .map(|node| self.text(node).unwrap_or(""))
    }

    /// `id` and all its descendants with the given tag, in document order.
    pub fn descendants(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if self.tag(node) == Some(tag) {
                found.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        found
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(Node::new(NodeKind::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
        }))
    }

    /// Create a detached comment.
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Comment);
        node.text = Some(text.to_string());
        self.push_node(node)
    }

    /// Insert a detached node at `index` among `parent`'s children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Detach `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let children = &mut self.nodes[parent.0].children;
        match children.iter().position(|&c| c == child) {
            Some(index) => {
                children.remove(index);
                self.nodes[child.0].parent = None;
                true
            }
            None => false,
        }
    }

    /// Detach all children of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.nodes[parent.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Deep-copy `node` of `other` into this document, detached.
    pub fn import(&mut self, other: &Document, node: NodeId) -> NodeId {
        let source = &other.nodes[node.0];
        let copy = self.push_node(Node {
            kind: source.kind.clone(),
            text: source.text.clone(),
            tail: source.tail.clone(),
            children: Vec::new(),
            parent: None,
        });
        for &child in &source.children {
            let child_copy = self.import(other, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Re-indent a subtree, one `indent` per level.
    ///
    /// Only text and tails that are empty or whitespace are replaced.
    pub fn pretty(&mut self, id: NodeId, indent: &str) {
        self.pretty_level(id, 0, indent);
    }

    fn pretty_level(&mut self, id: NodeId, level: usize, indent: &str) {
        let line = format!("{}{}", self.newline, indent.repeat(level));
        let is_blank = |s: Option<&str>| s.map_or(true, |s| s.trim().is_empty());

        let children = self.children(id).to_vec();
        if let Some(&last) = children.last() {
            if is_blank(self.text(id)) {
                self.set_text(id, Some(format!("{}{}", line, indent)));
            }
            if is_blank(self.tail(id)) {
                self.set_tail(id, Some(line.clone()));
            }
            for &child in &children {
                self.pretty_level(child, level + 1, indent);
            }
            if is_blank(self.tail(last)) {
                self.set_tail(last, Some(line));
            }
        } else if level > 0 && is_blank(self.tail(id)) {
            self.set_tail(id, Some(line));
        }
    }

    /// Serialize the whole document.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        if self.bom {
            out.push('\u{feff}');
        }
        out.push_str(&self.prolog);
        writer::write_node(self, self.root, &mut out);
        out.push_str(&self.epilog);
        out
    }

    /// Serialize one subtree, including its tail.
    pub fn node_to_string(&self, id: NodeId) -> String {
        let mut out = String::new();
        writer::write_node(self, id, &mut out);
        out
    }

    /// Write the document to a file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_xml_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = "<?xml version=\"1.0\"?>\n\
<Definitions xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n\
\t<CubeBlocks>\n\
\t\t<!-- armor -->\n\
\t\t<Definition>\n\
\t\t\t<Id>\n\
\t\t\t\t<TypeId>CubeBlock</TypeId>\n\
\t\t\t\t<SubtypeId>LargeBlockArmorBlock</SubtypeId>\n\
\t\t\t</Id>\n\
\t\t\t<Size z=\"1\" y=\"1\" x=\"1\" />\n\
\t\t\t<Public></Public>\n\
\t\t</Definition>\n\
\t</CubeBlocks>\n\
</Definitions>\n";

    #[test]
    fn test_round_trip_is_identical() {
        let doc = Document::parse_str(CATALOG).unwrap();
        assert_eq!(doc.to_xml_string(), CATALOG);
    }

    #[test]
    fn test_navigation() {
        let doc = Document::parse_str(CATALOG).unwrap();
        let root = doc.root();
        assert_eq!(doc.tag(root), Some("Definitions"));

        let blocks = doc.find_child(root, "CubeBlocks").unwrap().1;
        let definitions = doc.descendants(root, "Definition");
        assert_eq!(definitions.len(), 1);
        assert_eq!(doc.parent(definitions[0]), Some(blocks));

        assert_eq!(
            doc.find_text(definitions[0], "./Id/SubtypeId"),
            Some("LargeBlockArmorBlock")
        );
        assert_eq!(doc.find_text(definitions[0], "Public"), Some(""));
        assert_eq!(doc.find_text(definitions[0], "Model"), None);

        let size = doc.find_child(definitions[0], "Size").unwrap().1;
        let names: Vec<&str> = doc.attributes(size).iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["z", "y", "x"]);
        assert_eq!(doc.attribute(size, "y"), Some("1"));

        // The comment is a child node but not an element.
        assert_eq!(doc.children(blocks).len(), 2);
        assert_eq!(doc.child_elements(blocks).count(), 1);
        assert_eq!(doc.find_child(blocks, "Definition").unwrap().0, 1);
    }

    #[test]
    fn test_set_attribute_keeps_position() {
        let mut doc = Document::parse_str("<a x=\"1\" y=\"2\" />").unwrap();
        let root = doc.root();
        doc.set_attribute(root, "x", "3");
        doc.set_attribute(root, "z", "4");
        assert_eq!(doc.to_xml_string(), "<a x=\"3\" y=\"2\" z=\"4\" />");
    }

    #[test]
    fn test_remove_and_import() {
        let mut doc = Document::parse_str("<a><b>1</b><c/></a>").unwrap();
        let other = Document::parse_str("<d k=\"v\"><e>2</e></d>").unwrap();
        let root = doc.root();

        let (_, b) = doc.find_child(root, "b").unwrap();
        assert!(doc.remove_child(root, b));
        assert!(!doc.remove_child(root, b));

        let copy = doc.import(&other, other.root());
        doc.append_child(root, copy);
        assert_eq!(doc.to_xml_string(), "<a><c /><d k=\"v\"><e>2</e></d></a>");
    }

    #[test]
    fn test_pretty() {
        let mut doc = Document::new("MountPoints");
        let root = doc.root();
        for _ in 0..2 {
            let mp = doc.create_element("MountPoint");
            doc.set_attribute(mp, "Side", "Top");
            doc.append_child(root, mp);
        }
        doc.pretty(root, "  ");
        assert_eq!(
            doc.to_xml_string(),
            "<MountPoints>\n  <MountPoint Side=\"Top\" />\n  <MountPoint Side=\"Top\" />\n</MountPoints>\n"
        );
    }

    #[test]
    fn test_pretty_keeps_existing_text() {
        let mut doc = Document::parse_str("<a><b>keep</b></a>").unwrap();
        let root = doc.root();
        doc.pretty(root, "\t");
        assert_eq!(doc.to_xml_string(), "<a>\n\t<b>keep</b>\n</a>\n");
    }
}
