//! Node payloads: elements, attributes and the node kind tag.

/// XHTML namespace URI, the default for every element.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// SVG namespace URI, used for `<svg>` and its descendants.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// `MathML` namespace URI, used for `<math>` and its descendants.
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// HTML elements that never have content and may be written without `/>`.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Check whether `name` is an HTML void element.
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Element attribute. Order of attributes on an element is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    /// Attribute name as written (e.g. `name`, `xlink:href`).
    pub name: String,
    /// Decoded attribute value (empty for valueless HTML attributes).
    pub value: String,
}

impl Attribute {
    /// Create an attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Element payload of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name. Lowercased for XHTML elements.
    pub name: String,
    /// Namespace URI.
    pub namespace: String,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
}

impl Element {
    /// Create an XHTML element without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: XHTML_NAMESPACE.to_owned(),
            attrs: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(Attribute::new(name, value));
        self
    }

    /// Set the namespace URI.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Case-insensitive tag name comparison.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether this is an HTML void element.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.namespace == XHTML_NAMESPACE && is_void_element(&self.name)
    }

    /// Whether the tag name follows the custom element naming rule
    /// (contains a hyphen, e.g. `pia-consent-input-radio-app`).
    #[must_use]
    pub fn looks_custom(&self) -> bool {
        self.namespace == XHTML_NAMESPACE && self.name.contains('-')
    }
}

/// Node kind, decided once when the node is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Tree root. Holds children, has no parent.
    Document,
    /// Element with tag name, namespace and attributes.
    Element(Element),
    /// Decoded character data.
    Text(String),
    /// Comment content (without `<!--`/`-->`).
    Comment(String),
}
