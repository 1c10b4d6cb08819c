//! Parse tree for rendered document templates.
//!
//! The markup compiler produces HTML text; the pipeline needs to inspect and
//! rewrite that HTML structurally. This crate provides:
//!
//! - [`ParseTree`]: an arena of nodes with typed [`NodeKind`]s, parent
//!   back-references and in-place replacement
//! - [`HtmlParser`]: a tolerant reader built on quick-xml that accepts the
//!   compiler's output (XHTML plus unclosed HTML void elements)
//! - [`HtmlSerializer`]: writes a tree (or a single node) back to HTML text
//!
//! # Example
//!
//! ```
//! use studydoc_tree::{HtmlParser, HtmlSerializer};
//!
//! let tree = HtmlParser::new().parse("<p>Hello<br>world</p>").unwrap();
//! let html = HtmlSerializer::new().serialize(&tree);
//! assert_eq!(html, "<p>Hello<br />world</p>");
//! ```

mod entities;
mod error;
mod node;
mod parser;
mod serializer;
mod tree;

pub use entities::{convert_html_entities, starts_with_reference};
pub use error::TreeError;
pub use node::{
    Attribute, Element, MATHML_NAMESPACE, NodeKind, SVG_NAMESPACE, XHTML_NAMESPACE, is_void_element,
};
pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, close_tag, escape_attr, escape_text, open_tag};
pub use tree::{Descendants, NodeId, ParseTree};
