//! Serializes [`Document`] nodes back to text.

use super::{Document, NodeId, NodeKind};
use quick_xml::escape::partial_escape;

fn escape_attribute(value: &str) -> String {
    partial_escape(value).replace('"', "&quot;")
}

pub(super) fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Element { tag, attributes } => {
            out.push('<');
            out.push_str(tag);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }

            let children = doc.children(id);
            match doc.text(id) {
                None if children.is_empty() => out.push_str(" />"),
                text => {
                    out.push('>');
                    if let Some(text) = text {
                        out.push_str(&partial_escape(text));
                    }
                    for &child in children {
                        write_node(doc, child, out);
                    }
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
        }
        NodeKind::Comment => {
            out.push_str("<!--");
            out.push_str(doc.text(id).unwrap_or_default());
            out.push_str("-->");
        }
        NodeKind::ProcessingInstruction => {
            out.push_str("<?");
            out.push_str(doc.text(id).unwrap_or_default());
            out.push_str("?>");
        }
    }

    if let Some(tail) = doc.tail(id) {
        out.push_str(&partial_escape(tail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping() {
        let mut doc = Document::new("a");
        let root = doc.root();
        doc.set_attribute(root, "k", "<\"&'>");
        doc.set_text(root, Some("1 < 2 & 'x'".to_string()));
        assert_eq!(
            doc.to_xml_string(),
            "<a k=\"&lt;&quot;&amp;'&gt;\">1 &lt; 2 &amp; 'x'</a>"
        );
    }

    #[test]
    fn test_empty_forms() {
        let mut doc = Document::new("a");
        let root = doc.root();
        assert_eq!(doc.to_xml_string(), "<a />");
        doc.set_text(root, Some(String::new()));
        assert_eq!(doc.to_xml_string(), "<a></a>");
    }

    #[test]
    fn test_node_to_string_includes_tail() {
        let doc = Document::parse_str("<a><!--c-->\n\t<b/>\n</a>").unwrap();
        let root = doc.root();
        let children = doc.children(root);
        assert_eq!(doc.node_to_string(children[0]), "<!--c-->\n\t");
        assert_eq!(doc.node_to_string(children[1]), "<b />\n");
    }
}
