//! Segments of a rendered document.

use serde::{Deserialize, Serialize};
use studydoc_tree::{Attribute, Element, close_tag, open_tag};

/// One unit of a segmented document: a prose run or a single widget.
///
/// Serializes to the form the form-rendering client consumes:
///
/// ```json
/// {"type": "HTML", "html": "<p>Hello</p>"}
/// {"type": "CUSTOM_TAG", "tagName": "pia-case", "attrs": [{"name": "value", "value": "true"}], "children": []}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Segment {
    /// Contiguous, non-empty run of serialized prose markup.
    Html {
        /// Serialized HTML.
        html: String,
    },
    /// One custom element occurrence.
    #[serde(rename_all = "camelCase")]
    CustomTag {
        /// Tag name.
        tag_name: String,
        /// Attributes in source order.
        attrs: Vec<Attribute>,
        /// Segmentation of the element's content.
        children: Vec<Segment>,
    },
}

impl Segment {
    /// Create an HTML segment.
    #[must_use]
    pub fn html(html: impl Into<String>) -> Self {
        Self::Html { html: html.into() }
    }

    /// Create a custom tag segment without children.
    #[must_use]
    pub fn custom_tag(tag_name: impl Into<String>, attrs: Vec<Attribute>) -> Self {
        Self::CustomTag {
            tag_name: tag_name.into(),
            attrs,
            children: Vec::new(),
        }
    }

    /// Whether this is an HTML segment.
    #[must_use]
    pub fn is_html(&self) -> bool {
        matches!(self, Self::Html { .. })
    }

    /// Attribute value of a custom tag segment.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Self::CustomTag { attrs, .. } => attrs
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str()),
            Self::Html { .. } => None,
        }
    }

    /// Append this segment's markup to `out`, expanding custom tags back
    /// into elements.
    pub fn write_markup(&self, out: &mut String) {
        match self {
            Self::Html { html } => out.push_str(html),
            Self::CustomTag {
                tag_name,
                attrs,
                children,
            } => {
                let element = Element {
                    attrs: attrs.clone(),
                    ..Element::new(tag_name.as_str())
                };
                out.push_str(&open_tag(&element));
                for child in children {
                    child.write_markup(out);
                }
                out.push_str(&close_tag(&element));
            }
        }
    }
}

/// Concatenate segments back into markup.
///
/// For a document whose custom tags sit at the top level this reproduces the
/// serialized tree the segments came from, except for whitespace-only text
/// between a custom tag's children, which segmentation drops.
#[must_use]
pub fn segments_to_markup(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        segment.write_markup(&mut out);
    }
    out
}
