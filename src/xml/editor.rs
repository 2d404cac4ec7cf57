//! Ordered, indentation-aware element insertion.

use super::{Document, NodeId};

/// Inserts children into an element while keeping a canonical tag order and
/// the surrounding indentation.
///
/// `known` lists tags in their canonical order. A missing known tag is placed
/// next to the nearest known tag already present; unknown tags are appended.
#[derive(Debug, Clone)]
pub struct XmlEditor {
    known: &'static [&'static str],
    indent_level: usize,
    indent: String,
}

impl XmlEditor {
    /// `indent_level` is the depth of the element being edited.
    pub fn new(known: &'static [&'static str], indent_level: usize, indent: impl Into<String>) -> Self {
        Self {
            known,
            indent_level,
            indent: indent.into(),
        }
    }

    /// First child with the given tag and its position among all children.
    pub fn find(&self, doc: &Document, base: NodeId, tag: &str) -> Option<(usize, NodeId)> {
        doc.find_child(base, tag)
    }

    fn line(&self, doc: &Document, level: usize) -> String {
        format!("{}{}", doc.newline(), self.indent.repeat(level))
    }

    /// Create `tag` at position `index` of `base` and fix up whitespace so the
    /// new element sits on its own, correctly indented line.
    pub fn new_element(&self, doc: &mut Document, base: NodeId, index: usize, tag: &str) -> NodeId {
        let element = doc.create_element(tag);
        let child_line = self.line(doc, self.indent_level + 1);
        let children = doc.children(base);
        let index = index.min(children.len());

        if children.is_empty() {
            let closing_line = self.line(doc, self.indent_level);
            doc.set_text(base, Some(child_line));
            doc.set_tail(element, Some(closing_line));
        } else if index > 0 {
            let previous = children[index - 1];
            let previous_tail = doc.tail(previous).map(str::to_string);
            doc.set_tail(element, previous_tail);
            doc.set_tail(previous, Some(child_line));
        } else {
            doc.set_tail(element, Some(child_line));
        }

        doc.insert_child(base, index, element);
        element
    }

    /// Find `tag` in `base`, creating it at its canonical position if absent.
    pub fn subelement(&self, doc: &mut Document, base: NodeId, tag: &str) -> NodeId {
        if let Some((_, existing)) = self.find(doc, base, tag) {
            return existing;
        }

        let end = doc.children(base).len();
        let Some(pos) = self.known.iter().position(|&known| known == tag) else {
            return self.new_element(doc, base, end, tag);
        };

        let reach = pos.max(self.known.len() - 1 - pos);
        for look in 1..=reach {
            if let Some(after) = pos.checked_sub(look) {
                if let Some((index, _)) = self.find(doc, base, self.known[after]) {
                    return self.new_element(doc, base, index + 1, tag);
                }
            }
            if let Some(&before) = self.known.get(pos + look) {
                if let Some((index, _)) = self.find(doc, base, before) {
                    return self.new_element(doc, base, index, tag);
                }
            }
        }

        self.new_element(doc, base, end, tag)
    }
}
