//! Markdown compiler for document templates.
//!
//! Templates are Markdown with embedded custom elements
//! (`<pia-consent-input-radio-app>`). Only tags on the caller's
//! [`TagAllowList`] survive compilation as markup; every other raw HTML tag
//! is emitted as escaped text.
//!
//! # Example
//!
//! ```
//! use studydoc_markup::{MarkupCompiler, TagAllowList};
//!
//! let compiler = MarkupCompiler::new(TagAllowList::new(["custom-tag"]));
//! let html = compiler.compile("Hi <custom-tag></custom-tag> <script>x</script>");
//!
//! assert!(html.contains("<custom-tag></custom-tag>"));
//! assert!(html.contains("&lt;script&gt;"));
//! ```

mod allow_list;
mod compiler;
mod raw_html;

pub use allow_list::TagAllowList;
pub use compiler::{INLINE_FORMATTING_TAGS, MarkupCompiler};
