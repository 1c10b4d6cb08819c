//! Ready-made stage chains for the flat and the structured artifact.

use std::collections::HashMap;

use studydoc_markup::{MarkupCompiler, TagAllowList};
use studydoc_tree::{HtmlParser, HtmlSerializer};

use crate::converter::{ConverterRegistry, CustomTagConverter};
use crate::document::Document;
use crate::error::PipelineError;
use crate::renderer::TemplateRenderer;
use crate::segment::Segment;
use crate::segmenter::DomSegmenter;
use crate::stage::UnresolvedTagCheck;

/// Compile, convert and render templates with one configuration.
///
/// - [`render_html`](Self::render_html): compile → parse → convert →
///   check → serialize → render variables
/// - [`segment`](Self::segment): compile → parse → segment
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use studydoc_markup::TagAllowList;
/// use studydoc_pipeline::{FragmentConverter, TemplatePipeline};
/// use studydoc_tree::Element;
///
/// let mut pipeline = TemplatePipeline::new(TagAllowList::new(["custom-tag"]))
///     .with_converter(FragmentConverter::new("custom-tag", |_: &Element| {
///         "<p>{{hello}}</p>".to_owned()
///     }));
///
/// let vars = HashMap::from([("hello".to_owned(), "Hi".to_owned())]);
/// let html = pipeline.render_html("<custom-tag></custom-tag>", &vars)?;
/// assert!(html.contains("<p>Hi</p>"));
/// # Ok::<(), studydoc_pipeline::PipelineError>(())
/// ```
#[derive(Debug)]
pub struct TemplatePipeline {
    compiler: MarkupCompiler,
    converters: ConverterRegistry,
    segmenter: DomSegmenter,
    check: UnresolvedTagCheck,
}

impl TemplatePipeline {
    /// Create a pipeline whose compiler and segmenter share `allow_list`.
    #[must_use]
    pub fn new(allow_list: TagAllowList) -> Self {
        let segmenter = DomSegmenter::new(allow_list.iter());
        let check = UnresolvedTagCheck::new().recognizing(allow_list.iter());
        Self {
            compiler: MarkupCompiler::new(allow_list),
            converters: ConverterRegistry::new(),
            segmenter,
            check,
        }
    }

    /// Replace the markup compiler (e.g. to turn off inline formatting).
    ///
    /// The segmenter keeps recognizing the tags of the original allow-list.
    #[must_use]
    pub fn with_compiler(mut self, compiler: MarkupCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    /// Register a converter for the flat artifact.
    #[must_use]
    pub fn with_converter<C: CustomTagConverter + 'static>(mut self, converter: C) -> Self {
        self.converters = self.converters.with(converter);
        self
    }

    /// Replace the converter registry.
    #[must_use]
    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = converters;
        self
    }

    /// Let custom tags without a converter survive into the flat artifact.
    #[must_use]
    pub fn allowing_unconverted<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.check = self.check.allowing(tags);
        self
    }

    /// Render markup to final HTML.
    ///
    /// # Errors
    ///
    /// Fails on parse, conversion or unresolved-tag errors. No partial
    /// output is produced.
    pub fn render_html(
        &mut self,
        markup: &str,
        variables: &HashMap<String, String>,
    ) -> Result<String, PipelineError> {
        let mut renderer = TemplateRenderer::new(variables.clone());
        Document::from_markup(markup)
            .pipe(&mut self.compiler)?
            .pipe(&mut HtmlParser::new())?
            .pipe(&mut self.converters)?
            .pipe(&mut self.check)?
            .pipe(&mut HtmlSerializer::new())?
            .pipe(&mut renderer)?
            .into_html()
    }

    /// Segment markup for interactive rendering.
    ///
    /// Converters and variables are not applied.
    ///
    /// # Errors
    ///
    /// Fails on parse errors or custom tags outside the allow-list that
    /// still reached the tree.
    pub fn segment(&mut self, markup: &str) -> Result<Vec<Segment>, PipelineError> {
        let html = Document::from_markup(markup)
            .pipe(&mut self.compiler)?
            .into_html()?;
        // Segments end at the last closing tag, without the compiler's final newline
        Document::from_html(html.trim_end_matches('\n'))
            .pipe(&mut HtmlParser::new())?
            .segment(&self.segmenter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use studydoc_tree::Element;

    use crate::converter::FragmentConverter;

    #[test]
    fn test_missing_converter_is_reported() {
        let mut pipeline = TemplatePipeline::new(TagAllowList::new(["custom-tag"]));
        let err = pipeline
            .render_html("<custom-tag></custom-tag>", &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvedTag { tag } if tag == "custom-tag"));
    }

    #[test]
    fn test_allowing_unconverted() {
        let mut pipeline =
            TemplatePipeline::new(TagAllowList::new(["custom-tag"])).allowing_unconverted(["custom-tag"]);
        let html = pipeline
            .render_html("a <custom-tag></custom-tag>", &HashMap::new())
            .unwrap();
        assert_eq!(html, "<p>a <custom-tag></custom-tag></p>\n");
    }

    #[test]
    fn test_segment_ignores_converters() {
        let mut pipeline = TemplatePipeline::new(TagAllowList::new(["custom-tag"]))
            .with_converter(FragmentConverter::new("custom-tag", |_: &Element| {
                "<b>x</b>".to_owned()
            }));
        let segments = pipeline.segment("<custom-tag></custom-tag>").unwrap();
        assert_eq!(segments, vec![Segment::custom_tag("custom-tag", Vec::new())]);
    }

    #[test]
    fn test_tag_without_hyphen() {
        let mut pipeline = TemplatePipeline::new(TagAllowList::new(["widget"]));
        assert_eq!(
            pipeline.segment("a <widget></widget> b").unwrap(),
            vec![
                Segment::html("<p>a </p>"),
                Segment::custom_tag("widget", Vec::new()),
                Segment::html("<p> b</p>"),
            ]
        );

        let err = pipeline
            .render_html("a <widget></widget> b", &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvedTag { tag } if tag == "widget"));

        let mut pipeline = TemplatePipeline::new(TagAllowList::new(["widget"]))
            .with_converter(FragmentConverter::new("widget", |_: &Element| "<b>w</b>".to_owned()));
        let html = pipeline
            .render_html("a <widget></widget> b", &HashMap::new())
            .unwrap();
        assert_eq!(html, "<p>a <b>w</b> b</p>\n");
    }

    #[test]
    fn test_deeply_nested_markup() {
        let markup = format!("{} deep\n", ">".repeat(20_000));
        let mut pipeline = TemplatePipeline::new(TagAllowList::new(["custom-tag"]));

        let html = pipeline.render_html(&markup, &HashMap::new()).unwrap();
        assert!(html.contains("deep"));
        assert_eq!(
            html.matches("<blockquote>").count(),
            html.matches("</blockquote>").count()
        );

        let segments = pipeline.segment(&markup).unwrap();
        assert_eq!(segments.len(), 1);
    }
}
