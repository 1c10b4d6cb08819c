//! HTML writer for parse trees.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use std::fmt::Write;

use crate::node::{Element, NodeKind, XHTML_NAMESPACE};
use crate::tree::{NodeId, ParseTree};

/// Serialize a [`ParseTree`] back to HTML text.
///
/// Void elements are written as `<br />`, foreign (SVG/MathML) elements
/// without children as `<circle />`, and every other element as an
/// open/close pair, so `<custom-tag></custom-tag>` survives unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    /// Create a new serializer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Serialize the children of the tree root.
    #[must_use]
    pub fn serialize(&self, tree: &ParseTree) -> String {
        self.serialize_children(tree, tree.root())
    }

    /// Serialize the children of `node`, without the node itself.
    #[must_use]
    pub fn serialize_children(&self, tree: &ParseTree, node: NodeId) -> String {
        let mut out = String::with_capacity(4096);
        for &child in tree.children(node) {
            write_node(tree, child, &mut out);
        }
        out
    }

    /// Serialize a single node including its subtree.
    ///
    /// For the document root this is the same as [`Self::serialize`].
    #[must_use]
    pub fn serialize_node(&self, tree: &ParseTree, node: NodeId) -> String {
        let mut out = String::new();
        write_node(tree, node, &mut out);
        out
    }
}

enum Step {
    Enter(NodeId),
    Close(NodeId),
}

/// Write `node` and its subtree. Uses an explicit stack so deeply nested
/// documents cannot exhaust the thread stack.
fn write_node(tree: &ParseTree, node: NodeId, out: &mut String) {
    let mut stack = vec![Step::Enter(node)];
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Enter(id) => id,
            Step::Close(id) => {
                if let Some(el) = tree.element(id) {
                    out.push_str(&close_tag(el));
                }
                continue;
            }
        };
        match tree.kind(id) {
            NodeKind::Document => {
                stack.extend(tree.children(id).iter().rev().map(|&c| Step::Enter(c)));
            }
            NodeKind::Element(el) => {
                let children = tree.children(id);
                write_start(el, out);
                if el.is_void() || (children.is_empty() && el.namespace != XHTML_NAMESPACE) {
                    out.push_str(" />");
                    continue;
                }
                out.push('>');
                stack.push(Step::Close(id));
                stack.extend(children.iter().rev().map(|&c| Step::Enter(c)));
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }
}

fn write_start(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attrs {
        let _ = write!(out, r#" {}="{}""#, attr.name, escape_attr(&attr.value));
    }
}

/// Opening tag of an element, e.g. `<p class="x">`.
#[must_use]
pub fn open_tag(el: &Element) -> String {
    let mut out = String::new();
    write_start(el, &mut out);
    out.push('>');
    out
}

/// Closing tag of an element, e.g. `</p>`.
#[must_use]
pub fn close_tag(el: &Element) -> String {
    format!("</{}>", el.name)
}

/// Escape text for element content.
#[must_use]
pub fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

/// Escape text for a double-quoted attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

fn escape_html(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SVG_NAMESPACE;
    use crate::parser::HtmlParser;
    use pretty_assertions::assert_eq;

    fn roundtrip(html: &str) -> String {
        let tree = HtmlParser::new().parse(html).unwrap();
        HtmlSerializer::new().serialize(&tree)
    }

    #[test]
    fn test_serialize_simple_element() {
        assert_eq!(roundtrip("<p>Hello</p>"), "<p>Hello</p>");
    }

    #[test]
    fn test_serialize_nested() {
        assert_eq!(
            roundtrip("<p><strong>Bold</strong> text</p>"),
            "<p><strong>Bold</strong> text</p>"
        );
    }

    #[test]
    fn test_serialize_void_element() {
        assert_eq!(roundtrip("<p>Before<br>After</p>"), "<p>Before<br />After</p>");
    }

    #[test]
    fn test_serialize_empty_custom_element_keeps_pair() {
        assert_eq!(
            roundtrip("<custom-tag></custom-tag>"),
            "<custom-tag></custom-tag>"
        );
        assert_eq!(roundtrip("<custom-tag/>"), "<custom-tag></custom-tag>");
    }

    #[test]
    fn test_serialize_foreign_empty_element() {
        assert_eq!(
            roundtrip(r#"<svg><circle r="1"></circle></svg>"#),
            r#"<svg><circle r="1" /></svg>"#
        );
    }

    #[test]
    fn test_serialize_attributes_in_order() {
        let html = r#"<pia-consent-input-text-generic name="child" label="Name &quot;x&quot;"></pia-consent-input-text-generic>"#;
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(
            roundtrip("<p>a &lt; b &amp; c &gt; d</p>"),
            "<p>a &lt; b &amp; c &gt; d</p>"
        );
    }

    #[test]
    fn test_serialize_comment() {
        assert_eq!(roundtrip("<!-- note --><p>x</p>"), "<!-- note --><p>x</p>");
    }

    #[test]
    fn test_serialize_node() {
        let tree = HtmlParser::new().parse("<div><p>one</p><p>two</p></div>").unwrap();
        let div = tree.children(tree.root())[0];
        let second = tree.children(div)[1];
        assert_eq!(HtmlSerializer::new().serialize_node(&tree, second), "<p>two</p>");
        assert_eq!(
            HtmlSerializer::new().serialize_children(&tree, div),
            "<p>one</p><p>two</p>"
        );
    }

    #[test]
    fn test_serialize_deeply_nested() {
        let depth = 100_000;
        let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));
        assert_eq!(roundtrip(&html), html);
    }

    #[test]
    fn test_open_close_tags() {
        let el = Element::new("p").with_attr("class", "a\"b");
        assert_eq!(open_tag(&el), r#"<p class="a&quot;b">"#);
        assert_eq!(close_tag(&el), "</p>");

        let svg = Element::new("svg").with_namespace(SVG_NAMESPACE);
        assert_eq!(open_tag(&svg), "<svg>");
    }
}
