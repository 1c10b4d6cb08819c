//! Custom tag converters.
//!
//! A converter owns one tag name and rewrites every element with that name
//! in place. Converters are registered with a [`ConverterRegistry`], which
//! runs each of them as a complete, independent pass over the tree.

use std::fmt;

use studydoc_tree::{Element, HtmlParser, NodeId, ParseTree};
use tracing::debug;

use crate::document::Representation;
use crate::error::PipelineError;
use crate::stage::Stage;

/// Rewrites all elements with one tag name.
///
/// # Example
///
/// ```
/// use studydoc_pipeline::{CustomTagConverter, PipelineError, replace_with_fragment};
/// use studydoc_tree::{HtmlParser, HtmlSerializer, NodeId, ParseTree};
///
/// struct Greeting;
///
/// impl CustomTagConverter for Greeting {
///     fn tag_name(&self) -> &str { "x-greeting" }
///
///     fn convert_node(&mut self, tree: &mut ParseTree, node: NodeId) -> Result<(), PipelineError> {
///         replace_with_fragment(tree, node, "<b>Hi</b>")
///     }
/// }
///
/// let mut tree = HtmlParser::new().parse("<p><x-greeting></x-greeting>!</p>").unwrap();
/// assert_eq!(Greeting.convert(&mut tree)?, 1);
/// assert_eq!(HtmlSerializer::new().serialize(&tree), "<p><b>Hi</b>!</p>");
/// # Ok::<(), PipelineError>(())
/// ```
pub trait CustomTagConverter: Send {
    /// Tag name handled by this converter (compared case-insensitively).
    fn tag_name(&self) -> &str;

    /// Replace one matched element.
    ///
    /// Implementations must look up the node's position right before
    /// splicing (use [`ParseTree::replace_with`] or
    /// [`replace_with_fragment`]); earlier conversions may have changed the
    /// node's siblings.
    fn convert_node(&mut self, tree: &mut ParseTree, node: NodeId) -> Result<(), PipelineError>;

    /// Convert every matching element in document order.
    ///
    /// Matches are collected before the first rewrite. Matches that an
    /// earlier rewrite removed from the tree are skipped. Elements introduced
    /// by the rewrites themselves are not revisited.
    ///
    /// Returns the number of converted elements.
    fn convert(&mut self, tree: &mut ParseTree) -> Result<usize, PipelineError> {
        let tag = self.tag_name().to_owned();
        let matches = tree.find_elements(&tag);

        let mut converted = 0;
        for node in matches {
            if !tree.is_attached(node) {
                continue;
            }
            self.convert_node(tree, node)?;
            if tree.is_attached(node) && tree.element(node).is_some_and(|el| el.is_named(&tag)) {
                return Err(PipelineError::Converter {
                    tag,
                    message: "element is still in the tree after conversion".to_owned(),
                });
            }
            converted += 1;
        }
        Ok(converted)
    }
}

/// Parse `html` and splice its top-level nodes in place of `node`.
///
/// An empty fragment removes the node.
///
/// # Errors
///
/// Fails with [`PipelineError::Parse`] if the fragment is not readable and
/// with [`PipelineError::Structure`] if `node` is no longer listed under its
/// parent.
pub fn replace_with_fragment(
    tree: &mut ParseTree,
    node: NodeId,
    html: &str,
) -> Result<(), PipelineError> {
    let fragment = HtmlParser::new().parse(html).map_err(PipelineError::Parse)?;
    let nodes = tree.import_children(&fragment, fragment.root())?;
    tree.replace_with(node, nodes)?;
    Ok(())
}

/// Converter that renders each element to a markup fragment.
///
/// The closure receives the matched element (name and attributes) and
/// returns HTML that replaces it.
pub struct FragmentConverter<F> {
    tag_name: String,
    render: F,
}

impl<F> FragmentConverter<F>
where
    F: FnMut(&Element) -> String + Send,
{
    /// Create a converter for `tag_name`.
    pub fn new(tag_name: impl Into<String>, render: F) -> Self {
        Self {
            tag_name: tag_name.into(),
            render,
        }
    }
}

impl<F> fmt::Debug for FragmentConverter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentConverter")
            .field("tag_name", &self.tag_name)
            .finish_non_exhaustive()
    }
}

impl<F> CustomTagConverter for FragmentConverter<F>
where
    F: FnMut(&Element) -> String + Send,
{
    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn convert_node(&mut self, tree: &mut ParseTree, node: NodeId) -> Result<(), PipelineError> {
        let Some(element) = tree.element(node) else {
            return Err(PipelineError::Converter {
                tag: self.tag_name.clone(),
                message: format!("node {node:?} is not an element"),
            });
        };
        let html = (self.render)(element);
        replace_with_fragment(tree, node, &html)
    }
}

/// Ordered list of converters, applied as independent passes.
///
/// No fixed-point iteration: a converter does not see tags that a later
/// converter introduces.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: Vec<Box<dyn CustomTagConverter>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter.
    #[must_use]
    pub fn with<C: CustomTagConverter + 'static>(mut self, converter: C) -> Self {
        self.converters.push(Box::new(converter));
        self
    }

    /// Register a boxed converter.
    pub fn register(&mut self, converter: Box<dyn CustomTagConverter>) {
        self.converters.push(converter);
    }

    /// Tag names in registration order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.converters.iter().map(|c| c.tag_name())
    }

    /// Number of registered converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Whether no converter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Run every converter over `tree`, in registration order.
    ///
    /// Returns the total number of converted elements.
    ///
    /// # Errors
    ///
    /// Stops at the first failing converter.
    pub fn convert(&mut self, tree: &mut ParseTree) -> Result<usize, PipelineError> {
        let mut total = 0;
        for converter in &mut self.converters {
            let count = converter.convert(tree)?;
            debug!(tag = converter.tag_name(), count, "converted custom tags");
            total += count;
        }
        Ok(total)
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.tag_names()).finish()
    }
}

impl Stage for ConverterRegistry {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn apply(&mut self, input: Representation) -> Result<Representation, PipelineError> {
        match input {
            Representation::Tree(mut tree) => {
                self.convert(&mut tree)?;
                Ok(Representation::Tree(tree))
            }
            other => Err(PipelineError::mismatch(self.name(), "tree", other.kind())),
        }
    }
}
