//! Pipeline stages.
//!
//! A stage turns one [`Representation`] into the next. The parse/serialize
//! pair and the markup compiler are stages out of the box; converters,
//! variable rendering and the unresolved-tag check live in their own modules.

use std::collections::BTreeSet;

use studydoc_markup::MarkupCompiler;
use studydoc_tree::{Element, HtmlParser, HtmlSerializer, ParseTree};

use crate::document::Representation;
use crate::error::PipelineError;

/// Transformation from one document representation to the next.
pub trait Stage: Send {
    /// Stage name used in errors and logs.
    fn name(&self) -> &str;

    /// Consume the current representation and produce the next one.
    ///
    /// Stages that cannot consume `input` return
    /// [`PipelineError::StageMismatch`].
    fn apply(&mut self, input: Representation) -> Result<Representation, PipelineError>;
}

impl Stage for MarkupCompiler {
    fn name(&self) -> &'static str {
        "compile"
    }

    fn apply(&mut self, input: Representation) -> Result<Representation, PipelineError> {
        match input {
            Representation::Markup(markup) => Ok(Representation::Html(self.compile(&markup))),
            other => Err(PipelineError::mismatch(self.name(), "markup", other.kind())),
        }
    }
}

impl Stage for HtmlParser {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn apply(&mut self, input: Representation) -> Result<Representation, PipelineError> {
        match input {
            Representation::Html(html) => self
                .parse(&html)
                .map(Representation::Tree)
                .map_err(PipelineError::Parse),
            other => Err(PipelineError::mismatch(self.name(), "HTML", other.kind())),
        }
    }
}

impl Stage for HtmlSerializer {
    fn name(&self) -> &'static str {
        "serialize"
    }

    fn apply(&mut self, input: Representation) -> Result<Representation, PipelineError> {
        match input {
            Representation::Tree(tree) => Ok(Representation::Html(self.serialize(&tree))),
            other => Err(PipelineError::mismatch(self.name(), "tree", other.kind())),
        }
    }
}

/// Fails the run when a custom element is still in the tree.
///
/// Placed after the converters, it catches pipelines that were assembled
/// without a converter for one of the allowed tags. Custom elements are
/// those whose name contains a hyphen plus any tag passed to
/// [`recognizing`](Self::recognizing).
#[derive(Debug, Clone, Default)]
pub struct UnresolvedTagCheck {
    allowed: BTreeSet<String>,
    recognized: BTreeSet<String>,
}

impl UnresolvedTagCheck {
    /// Reject every custom element.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the given tags stay in the tree.
    #[must_use]
    pub fn allowing<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed
            .extend(tags.into_iter().map(|t| t.as_ref().to_ascii_lowercase()));
        self
    }

    /// Treat the given tags as custom even without a hyphen.
    #[must_use]
    pub fn recognizing<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.recognized
            .extend(tags.into_iter().map(|t| t.as_ref().to_ascii_lowercase()));
        self
    }

    fn is_unresolved(&self, el: &Element) -> bool {
        let name = el.name.to_ascii_lowercase();
        (el.looks_custom() || self.recognized.contains(&name)) && !self.allowed.contains(&name)
    }

    /// Check a tree for unresolved custom elements.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnresolvedTag`] for the first one found in
    /// document order.
    pub fn check(&self, tree: &ParseTree) -> Result<(), PipelineError> {
        let unresolved = tree
            .descendants(tree.root())
            .filter_map(|id| tree.element(id))
            .find(|el| self.is_unresolved(el));

        match unresolved {
            Some(el) => Err(PipelineError::UnresolvedTag {
                tag: el.name.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Stage for UnresolvedTagCheck {
    fn name(&self) -> &'static str {
        "check-unresolved"
    }

    fn apply(&mut self, input: Representation) -> Result<Representation, PipelineError> {
        match input {
            Representation::Tree(tree) => {
                self.check(&tree)?;
                Ok(Representation::Tree(tree))
            }
            other => Err(PipelineError::mismatch(self.name(), "tree", other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use studydoc_markup::TagAllowList;

    use crate::document::{Document, RepresentationKind};

    #[test]
    fn test_compile_stage() {
        let mut compiler = MarkupCompiler::new(TagAllowList::empty());
        let html = Document::from_markup("*x*")
            .pipe(&mut compiler)
            .unwrap()
            .into_html()
            .unwrap();
        assert_eq!(html, "<p><em>x</em></p>\n");
    }

    #[test]
    fn test_parse_stage_rejects_tree() {
        let doc = Document::from_html("<p>x</p>")
            .pipe(&mut HtmlParser::new())
            .unwrap();
        let err = doc.pipe(&mut HtmlParser::new()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StageMismatch {
                found: RepresentationKind::Tree,
                ..
            }
        ));
    }

    #[test]
    fn test_unresolved_tag_check() {
        let tree = HtmlParser::new()
            .parse("<p>x <custom-tag></custom-tag></p>")
            .unwrap();

        let err = UnresolvedTagCheck::new().check(&tree).unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvedTag { tag } if tag == "custom-tag"));

        UnresolvedTagCheck::new()
            .allowing(["Custom-Tag"])
            .check(&tree)
            .unwrap();
    }

    #[test]
    fn test_unresolved_check_recognizes_plain_names() {
        let tree = HtmlParser::new().parse("<p>a <widget></widget></p>").unwrap();
        UnresolvedTagCheck::new().check(&tree).unwrap();

        let err = UnresolvedTagCheck::new()
            .recognizing(["Widget"])
            .check(&tree)
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvedTag { tag } if tag == "widget"));

        UnresolvedTagCheck::new()
            .recognizing(["widget"])
            .allowing(["widget"])
            .check(&tree)
            .unwrap();
    }

    #[test]
    fn test_unresolved_tag_check_ignores_foreign_elements() {
        let tree = HtmlParser::new()
            .parse("<svg><font-face></font-face></svg>")
            .unwrap();
        UnresolvedTagCheck::new().check(&tree).unwrap();
    }
}
