//! Document state machine.
//!
//! A [`Document`] holds exactly one representation of a template at a time.
//! Stages consume it and hand back the next representation, so a stale
//! representation can never be read after a stage ran.

use std::fmt;

use studydoc_tree::ParseTree;
use tracing::debug;

use crate::error::PipelineError;
use crate::segmenter::DomSegmenter;
use crate::segment::Segment;
use crate::stage::Stage;

/// The current form of a document.
#[derive(Debug, Clone)]
pub enum Representation {
    /// Raw template text as authored.
    Markup(String),
    /// Serialized HTML text.
    Html(String),
    /// Parsed tree.
    Tree(ParseTree),
}

impl Representation {
    /// Which representation this is.
    #[must_use]
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Self::Markup(_) => RepresentationKind::Markup,
            Self::Html(_) => RepresentationKind::Html,
            Self::Tree(_) => RepresentationKind::Tree,
        }
    }
}

/// Tag of a [`Representation`], used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationKind {
    /// Raw template text.
    Markup,
    /// Serialized HTML text.
    Html,
    /// Parsed tree.
    Tree,
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markup => "markup",
            Self::Html => "HTML",
            Self::Tree => "tree",
        })
    }
}

/// A template moving through the pipeline.
///
/// # Example
///
/// ```
/// use studydoc_markup::{MarkupCompiler, TagAllowList};
/// use studydoc_pipeline::Document;
/// use studydoc_tree::{HtmlParser, HtmlSerializer};
///
/// let html = Document::from_markup("# Hello")
///     .pipe(&mut MarkupCompiler::new(TagAllowList::empty()))?
///     .pipe(&mut HtmlParser::new())?
///     .pipe(&mut HtmlSerializer::new())?
///     .into_html()?;
/// assert_eq!(html, "<h1>Hello</h1>\n");
/// # Ok::<(), studydoc_pipeline::PipelineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    representation: Representation,
}

impl Document {
    /// Wrap a representation.
    #[must_use]
    pub fn new(representation: Representation) -> Self {
        Self { representation }
    }

    /// Start from raw template text.
    #[must_use]
    pub fn from_markup(markup: impl Into<String>) -> Self {
        Self::new(Representation::Markup(markup.into()))
    }

    /// Start from HTML text.
    #[must_use]
    pub fn from_html(html: impl Into<String>) -> Self {
        Self::new(Representation::Html(html.into()))
    }

    /// Start from a parsed tree.
    #[must_use]
    pub fn from_tree(tree: ParseTree) -> Self {
        Self::new(Representation::Tree(tree))
    }

    /// Kind of the current representation.
    #[must_use]
    pub fn kind(&self) -> RepresentationKind {
        self.representation.kind()
    }

    /// Borrow the current representation.
    #[must_use]
    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    /// The parsed tree, if that is the current representation.
    #[must_use]
    pub fn tree(&self) -> Option<&ParseTree> {
        match &self.representation {
            Representation::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Apply a stage, replacing the current representation with its output.
    ///
    /// # Errors
    ///
    /// Returns the stage's error, including [`PipelineError::StageMismatch`]
    /// when the stage cannot consume the current representation.
    pub fn pipe<S: Stage + ?Sized>(self, stage: &mut S) -> Result<Self, PipelineError> {
        let from = self.kind();
        let representation = stage.apply(self.representation)?;
        debug!(
            stage = stage.name(),
            from = %from,
            to = %representation.kind(),
            "applied stage"
        );
        Ok(Self::new(representation))
    }

    /// Extract raw template text.
    ///
    /// # Errors
    ///
    /// Fails unless the document holds markup.
    pub fn into_markup(self) -> Result<String, PipelineError> {
        match self.representation {
            Representation::Markup(text) => Ok(text),
            other => Err(PipelineError::mismatch("into_markup", "markup", other.kind())),
        }
    }

    /// Extract HTML text.
    ///
    /// # Errors
    ///
    /// Fails unless the document holds serialized HTML.
    pub fn into_html(self) -> Result<String, PipelineError> {
        match self.representation {
            Representation::Html(html) => Ok(html),
            other => Err(PipelineError::mismatch("into_html", "HTML", other.kind())),
        }
    }

    /// Extract the parsed tree.
    ///
    /// # Errors
    ///
    /// Fails unless the document holds a tree.
    pub fn into_tree(self) -> Result<ParseTree, PipelineError> {
        match self.representation {
            Representation::Tree(tree) => Ok(tree),
            other => Err(PipelineError::mismatch("into_tree", "tree", other.kind())),
        }
    }

    /// Segment the parsed tree.
    ///
    /// # Errors
    ///
    /// Fails unless the document holds a tree, or when segmentation fails.
    pub fn segment(&self, segmenter: &DomSegmenter) -> Result<Vec<Segment>, PipelineError> {
        match &self.representation {
            Representation::Tree(tree) => segmenter.segment(tree),
            other => Err(PipelineError::mismatch("segment", "tree", other.kind())),
        }
    }
}
