//! Builds a [`Document`] from quick-xml events.

use super::{Document, Node, NodeId, NodeKind};
use crate::error::{ExportError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| ExportError::MalformedXml(format!("invalid UTF-8: {}", e)))
}

fn element(start: &BytesStart) -> Result<Node> {
    let tag = utf8(start.name().as_ref())?;
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(Node::new(NodeKind::Element { tag, attributes }))
}

struct Builder {
    doc: Document,
    open: Vec<NodeId>,
    root: Option<NodeId>,
}

impl Builder {
    /// Raw content outside the root element goes to the prolog or epilog.
    fn outside(&mut self, raw: &str) {
        if self.root.is_some() {
            self.doc.epilog.push_str(raw);
        } else {
            self.doc.prolog.push_str(raw);
        }
    }

    /// Attach a new node to the open element, or make it the root.
    fn attach(&mut self, node: Node) -> Result<NodeId> {
        let id = self.doc.push_node(node);
        match self.open.last() {
            Some(&parent) => self.doc.append_child(parent, id),
            None if self.root.is_none() => self.root = Some(id),
            None => {
                return Err(ExportError::MalformedXml(
                    "more than one root element".to_string(),
                ))
            }
        }
        Ok(id)
    }

    /// Character data belongs to the previous sibling's tail, or to the parent's text.
    fn push_text(&mut self, parent: NodeId, text: &str) {
        let previous = self.doc.children(parent).last().copied();
        let slot = match previous {
            Some(previous) => &mut self.doc.nodes[previous.0].tail,
            None => &mut self.doc.nodes[parent.0].text,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }
}

pub(super) fn parse(xml: &str) -> Result<Document> {
    let (bom, xml) = match xml.strip_prefix('\u{feff}') {
        Some(rest) => (true, rest),
        None => (false, xml),
    };

    let mut builder = Builder {
        doc: Document {
            nodes: Vec::new(),
            root: NodeId(0),
            prolog: String::new(),
            epilog: String::new(),
            bom,
            newline: if xml.contains("\r\n") { "\r\n" } else { "\n" },
        },
        open: Vec::new(),
        root: None,
    };

    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let id = builder.attach(element(&start)?)?;
                builder.open.push(id);
            }
            Event::Empty(start) => {
                builder.attach(element(&start)?)?;
            }
            Event::End(_) => {
                if let Some(id) = builder.open.pop() {
                    let node = &mut builder.doc.nodes[id.0];
                    // `<a></a>` stays distinct from `<a />`.
                    if node.text.is_none() && node.children.is_empty() {
                        node.text = Some(String::new());
                    }
                }
            }
            Event::Text(text) => match builder.open.last().copied() {
                Some(parent) => {
                    let text = text.unescape()?;
                    builder.push_text(parent, &text);
                }
                None => {
                    let raw = utf8(&text)?;
                    if !raw.trim().is_empty() {
                        return Err(ExportError::MalformedXml(format!(
                            "text outside the root element: {:?}",
                            raw.trim()
                        )));
                    }
                    builder.outside(&raw);
                }
            },
            Event::CData(data) => {
                let Some(parent) = builder.open.last().copied() else {
                    return Err(ExportError::MalformedXml(
                        "CDATA outside the root element".to_string(),
                    ));
                };
                let data = utf8(&data)?;
                builder.push_text(parent, &data);
            }
            Event::Comment(comment) => {
                let content = utf8(&comment)?;
                if builder.open.is_empty() {
                    builder.outside(&format!("<!--{}-->", content));
                } else {
                    let mut node = Node::new(NodeKind::Comment);
                    node.text = Some(content);
                    builder.attach(node)?;
                }
            }
            Event::PI(pi) => {
                let content = utf8(&pi)?;
                if builder.open.is_empty() {
                    builder.outside(&format!("<?{}?>", content));
                } else {
                    let mut node = Node::new(NodeKind::ProcessingInstruction);
                    node.text = Some(content);
                    builder.attach(node)?;
                }
            }
            Event::Decl(decl) => {
                let content = utf8(&decl)?;
                builder.outside(&format!("<?{}?>", content));
            }
            Event::DocType(doctype) => {
                let content = utf8(&doctype)?;
                builder.outside(&format!("<!DOCTYPE {}>", content.trim_start()));
            }
            Event::Eof => break,
        }
    }

    if let Some(&unclosed) = builder.open.last() {
        return Err(ExportError::MalformedXml(format!(
            "unclosed element <{}>",
            builder.doc.tag(unclosed).unwrap_or_default()
        )));
    }
    let root = builder
        .root
        .ok_or_else(|| ExportError::MalformedXml("no root element".to_string()))?;

    let mut doc = builder.doc;
    doc.root = root;
    Ok(doc)
}
