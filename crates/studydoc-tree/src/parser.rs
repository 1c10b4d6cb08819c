//! Tolerant HTML reader built on quick-xml.
//!
//! Accepts the XHTML produced by the markup compiler plus the HTML habits
//! template authors bring along: unclosed void elements (`<br>`), valueless
//! attributes (`<input disabled>`), named entities and stray end tags.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::warn;

use crate::entities::{convert_html_entities, decode_entity};
use crate::error::TreeError;
use crate::node::{Attribute, Element, MATHML_NAMESPACE, SVG_NAMESPACE, XHTML_NAMESPACE};
use crate::tree::{NodeId, ParseTree};

/// Parse HTML text into a [`ParseTree`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML document or fragment.
    ///
    /// The input may have any number of top-level nodes. Unclosed elements
    /// are closed at the end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not readable as XML even with the
    /// relaxed settings (e.g. a `<` that starts no tag).
    pub fn parse(&self, html: &str) -> Result<ParseTree, TreeError> {
        let html = convert_html_entities(html);

        let mut reader = Reader::from_str(&html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut tree = ParseTree::new();
        self.read_into(&mut reader, &mut tree)?;
        Ok(tree)
    }

    fn read_into<R: BufRead>(
        &self,
        reader: &mut Reader<R>,
        tree: &mut ParseTree,
    ) -> Result<(), TreeError> {
        let mut buf = Vec::new();
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            let parent = open.last().copied().unwrap_or(tree.root());
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let element = self.decode_element(reader, &e, tree.element(parent));
                    let void = element.is_void();
                    let id = tree.create_element(element);
                    tree.append_child(parent, id)?;
                    if !void {
                        open.push(id);
                    }
                }
                Event::Empty(e) => {
                    let element = self.decode_element(reader, &e, tree.element(parent));
                    let id = tree.create_element(element);
                    tree.append_child(parent, id)?;
                }
                Event::End(e) => {
                    let name = self.decode_name(reader, e.name().as_ref());
                    close_element(tree, &mut open, &name);
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    append_text(tree, parent, &text)?;
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    append_text(tree, parent, &decode_entity(&entity))?;
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    append_text(tree, parent, &text)?;
                }
                Event::Comment(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    let id = tree.create_comment(text);
                    tree.append_child(parent, id)?;
                }
                Event::Eof => return Ok(()),
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }
    }

    fn decode_element<R: BufRead>(
        &self,
        reader: &Reader<R>,
        e: &BytesStart,
        parent: Option<&Element>,
    ) -> Element {
        let raw_name = self.decode_name(reader, e.name().as_ref());
        let attrs = self.decode_attrs(reader, e);

        let namespace = attrs
            .iter()
            .find(|a| a.name == "xmlns")
            .map(|a| a.value.clone())
            .unwrap_or_else(|| infer_namespace(&raw_name, parent).to_owned());

        let name = if namespace == XHTML_NAMESPACE {
            raw_name.to_ascii_lowercase()
        } else {
            raw_name
        };

        Element {
            name,
            namespace,
            attrs,
        }
    }

    fn decode_name<R: BufRead>(&self, reader: &Reader<R>, name: &[u8]) -> String {
        reader.decoder().decode(name).map_or_else(
            |_| String::from_utf8_lossy(name).into_owned(),
            std::borrow::Cow::into_owned,
        )
    }

    fn decode_attrs<R: BufRead>(&self, reader: &Reader<R>, e: &BytesStart) -> Vec<Attribute> {
        e.html_attributes()
            .flatten()
            .map(|attr| {
                let name = self.decode_name(reader, attr.key.as_ref());
                let value = attr.unescape_value().map_or_else(
                    |_| String::from_utf8_lossy(&attr.value).into_owned(),
                    std::borrow::Cow::into_owned,
                );
                Attribute { name, value }
            })
            .collect()
    }
}

/// Namespace for an element without an explicit `xmlns`.
fn infer_namespace(name: &str, parent: Option<&Element>) -> &'static str {
    if name.eq_ignore_ascii_case("svg") {
        return SVG_NAMESPACE;
    }
    if name.eq_ignore_ascii_case("math") {
        return MATHML_NAMESPACE;
    }
    match parent.map(|p| p.namespace.as_str()) {
        Some(SVG_NAMESPACE) if !parent.is_some_and(|p| p.is_named("foreignObject")) => {
            SVG_NAMESPACE
        }
        Some(MATHML_NAMESPACE) => MATHML_NAMESPACE,
        _ => XHTML_NAMESPACE,
    }
}

/// Close the innermost open element named `name` and everything opened after it.
///
/// An end tag with no matching open element is dropped.
fn close_element(tree: &ParseTree, open: &mut Vec<NodeId>, name: &str) {
    let position = open
        .iter()
        .rposition(|&id| tree.element(id).is_some_and(|el| el.is_named(name)));

    match position {
        Some(pos) => {
            if pos + 1 != open.len() {
                warn!(end_tag = name, "implicitly closing unclosed elements");
            }
            open.truncate(pos);
        }
        None => warn!(end_tag = name, "ignoring end tag without open element"),
    }
}

/// Append text to `parent`, merging with a trailing text node.
fn append_text(tree: &mut ParseTree, parent: NodeId, text: &str) -> Result<(), TreeError> {
    if text.is_empty() {
        return Ok(());
    }
    let last = tree.children(parent).last().copied();
    if let Some(existing) = last.and_then(|id| tree.text_mut(id)) {
        existing.push_str(text);
        return Ok(());
    }
    let id = tree.create_text(text);
    tree.append_child(parent, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first_child(tree: &ParseTree) -> NodeId {
        tree.children(tree.root())[0]
    }

    #[test]
    fn test_parse_simple_element() {
        let tree = HtmlParser::new().parse("<p>Hello</p>").unwrap();

        let p = first_child(&tree);
        assert_eq!(tree.element(p).unwrap().name, "p");
        assert_eq!(tree.text_content(p), "Hello");
    }

    #[test]
    fn test_parse_multiple_top_level_nodes() {
        let tree = HtmlParser::new()
            .parse("<h1>Hello</h1>\n<custom-tag></custom-tag>\nWorld")
            .unwrap();

        let kids = tree.children(tree.root());
        assert_eq!(kids.len(), 4);
        assert!(tree.is_element(kids[0]));
        assert_eq!(tree.text(kids[1]), Some("\n"));
        assert_eq!(tree.element(kids[2]).unwrap().name, "custom-tag");
        assert_eq!(tree.text(kids[3]), Some("\nWorld"));
    }

    #[test]
    fn test_parse_unclosed_void_element() {
        let tree = HtmlParser::new().parse("<p>Before<br>After</p>").unwrap();

        let p = first_child(&tree);
        let kids = tree.children(p);
        assert_eq!(kids.len(), 3);
        assert_eq!(tree.element(kids[1]).unwrap().name, "br");
        assert!(tree.children(kids[1]).is_empty());
        assert_eq!(tree.text(kids[2]), Some("After"));
    }

    #[test]
    fn test_parse_valueless_attribute() {
        let tree = HtmlParser::new()
            .parse(r#"<input type="checkbox" disabled>"#)
            .unwrap();

        let input = tree.element(first_child(&tree)).unwrap();
        assert_eq!(input.attr("type"), Some("checkbox"));
        assert_eq!(input.attr("disabled"), Some(""));
    }

    #[test]
    fn test_parse_attributes_keep_order() {
        let tree = HtmlParser::new()
            .parse(r#"<pia-consent-input-text-generic name="childName" label="Name des Kindes"></pia-consent-input-text-generic>"#)
            .unwrap();

        let el = tree.element(first_child(&tree)).unwrap();
        let names: Vec<_> = el.attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["name", "label"]);
        assert_eq!(el.attr("label"), Some("Name des Kindes"));
    }

    #[test]
    fn test_parse_entities() {
        let tree = HtmlParser::new()
            .parse("<p>a &lt; b &amp; Gr&uuml;&szlig;e&#33;</p>")
            .unwrap();

        let p = first_child(&tree);
        assert_eq!(tree.children(p).len(), 1, "text pieces are merged");
        assert_eq!(tree.text_content(p), "a < b & Gr\u{00fc}\u{00df}e!");
    }

    #[test]
    fn test_parse_entity_heavy_text_merges_in_place() {
        let html = format!("<p>{}</p>", "x&amp;".repeat(32_000));
        let tree = HtmlParser::new().parse(&html).unwrap();

        let p = first_child(&tree);
        assert_eq!(tree.children(p).len(), 1);
        assert_eq!(tree.text_content(p), "x&".repeat(32_000));
    }

    #[test]
    fn test_parse_stray_end_tag_ignored() {
        let tree = HtmlParser::new().parse("<p>text</span></p>").unwrap();
        let p = first_child(&tree);
        assert_eq!(tree.text_content(p), "text");
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn test_parse_unclosed_element_closed_at_eof() {
        let tree = HtmlParser::new().parse("<p><em>open").unwrap();
        let p = first_child(&tree);
        let em = tree.children(p)[0];
        assert_eq!(tree.element(em).unwrap().name, "em");
        assert_eq!(tree.text_content(em), "open");
    }

    #[test]
    fn test_parse_mismatched_end_closes_inner() {
        let tree = HtmlParser::new().parse("<div><p>one</div>two").unwrap();
        let kids = tree.children(tree.root());
        assert_eq!(kids.len(), 2);
        assert_eq!(tree.text(kids[1]), Some("two"));
    }

    #[test]
    fn test_parse_namespaces() {
        let tree = HtmlParser::new()
            .parse("<svg><circle r=\"1\"/></svg><P>x</P>")
            .unwrap();

        let kids = tree.children(tree.root());
        let svg = tree.element(kids[0]).unwrap();
        assert_eq!(svg.namespace, SVG_NAMESPACE);
        let circle = tree.children(kids[0])[0];
        assert_eq!(tree.element(circle).unwrap().namespace, SVG_NAMESPACE);

        let p = tree.element(kids[1]).unwrap();
        assert_eq!(p.name, "p");
        assert_eq!(p.namespace, XHTML_NAMESPACE);
    }

    #[test]
    fn test_parse_comment() {
        let tree = HtmlParser::new().parse("<!-- note -->text").unwrap();
        let kids = tree.children(tree.root());
        assert!(tree.is_comment(kids[0]));
        assert!(!tree.is_parent_node(kids[0]));
    }

    #[test]
    fn test_parse_empty_input() {
        let tree = HtmlParser::new().parse("").unwrap();
        assert!(tree.is_empty());
    }
}
