//! Splitting a parsed document into prose and widget segments.
//!
//! The segmenter walks the tree in document order. Prose is serialized into
//! an accumulator; a recognized custom element flushes the accumulator as
//! one [`Segment::Html`] and becomes one [`Segment::CustomTag`].
//!
//! Widgets written inline end up inside a paragraph (`<p>Hello
//! <pia-consent-input-radio-app>…</p>`). Such an enclosing element is split:
//! each prose run inside it is wrapped in the element's own open and close
//! tags, so the segments around the widget are still well-formed HTML.

use std::collections::{BTreeSet, HashSet};

use studydoc_tree::{Element, HtmlSerializer, NodeId, NodeKind, ParseTree, close_tag, open_tag};
use tracing::debug;

use crate::error::PipelineError;
use crate::segment::Segment;

/// Splits a parse tree into [`Segment`]s.
///
/// Runs on the tree before any conversion, so every widget keeps its tag
/// name and attributes.
#[derive(Debug, Clone, Default)]
pub struct DomSegmenter {
    custom_tags: BTreeSet<String>,
}

impl DomSegmenter {
    /// Create a segmenter that recognizes the given custom tags.
    pub fn new<I, S>(custom_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            custom_tags: custom_tags
                .into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether `element` is one of the recognized custom tags.
    ///
    /// Only the configured set counts; the name need not contain a hyphen.
    #[must_use]
    pub fn is_custom_tag(&self, element: &Element) -> bool {
        self.custom_tags.contains(&element.name.to_ascii_lowercase())
    }

    /// Segment a parsed document.
    ///
    /// An empty or whitespace-only document without custom tags yields no
    /// segments at all. Inside a custom tag, whitespace-only prose between
    /// nested elements is dropped, so a switch lists exactly its cases.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnresolvedTag`] for a custom-looking element
    /// that is not recognized.
    pub fn segment(&self, tree: &ParseTree) -> Result<Vec<Segment>, PipelineError> {
        let split = self.split_elements(tree)?;
        let segments = self.walk(tree, &split);

        let blank = segments
            .iter()
            .all(|s| matches!(s, Segment::Html { html } if html.trim().is_empty()));
        if blank {
            return Ok(Vec::new());
        }

        debug!(count = segments.len(), "segmented document");
        Ok(segments)
    }

    /// Nodes with a recognized custom tag somewhere below them.
    ///
    /// Each custom tag marks its ancestors until one is already marked, so
    /// the whole pass is linear in the tree size.
    fn split_elements(&self, tree: &ParseTree) -> Result<HashSet<NodeId>, PipelineError> {
        let mut split = HashSet::new();
        for id in tree.descendants(tree.root()) {
            let Some(el) = tree.element(id) else { continue };
            if !self.is_custom_tag(el) {
                if el.looks_custom() {
                    return Err(PipelineError::UnresolvedTag {
                        tag: el.name.clone(),
                    });
                }
                continue;
            }
            let mut current = tree.parent(id);
            while let Some(ancestor) = current {
                if !split.insert(ancestor) {
                    break;
                }
                current = tree.parent(ancestor);
            }
        }
        Ok(split)
    }

    /// Walk the tree with an explicit stack; nesting depth is unbounded.
    fn walk<'t>(&self, tree: &'t ParseTree, split: &HashSet<NodeId>) -> Vec<Segment> {
        let serializer = HtmlSerializer::new();
        let mut frames = vec![Frame {
            builder: SegmentBuilder::default(),
            element: None,
        }];
        let mut steps: Vec<Step> = children_steps(tree, tree.root()).collect();

        while let Some(step) = steps.pop() {
            let Some(frame) = frames.last_mut() else { break };
            match step {
                Step::Visit(id) => match tree.kind(id) {
                    NodeKind::Element(el) if self.is_custom_tag(el) => {
                        frames.push(Frame {
                            builder: SegmentBuilder::default(),
                            element: Some(el),
                        });
                        steps.push(Step::EndCustom);
                        steps.extend(children_steps(tree, id));
                    }
                    NodeKind::Element(el) if split.contains(&id) => {
                        frame.builder.enter(el);
                        steps.push(Step::Leave);
                        steps.extend(children_steps(tree, id));
                    }
                    _ => frame.builder.push_prose(&serializer.serialize_node(tree, id)),
                },
                Step::Leave => frame.builder.leave(),
                Step::EndCustom => {
                    let Some(done) = frames.pop() else { break };
                    let Some(el) = done.element else { break };
                    let children = done
                        .builder
                        .finish()
                        .into_iter()
                        .filter(|s| !matches!(s, Segment::Html { html } if html.trim().is_empty()))
                        .collect();
                    if let Some(parent) = frames.last_mut() {
                        parent.builder.push_custom(Segment::CustomTag {
                            tag_name: el.name.clone(),
                            attrs: el.attrs.clone(),
                            children,
                        });
                    }
                }
            }
        }

        frames
            .into_iter()
            .next()
            .map(|root| root.builder.finish())
            .unwrap_or_default()
    }
}

enum Step {
    Visit(NodeId),
    /// Close the innermost split element.
    Leave,
    /// Finish the innermost custom tag.
    EndCustom,
}

fn children_steps(tree: &ParseTree, node: NodeId) -> impl Iterator<Item = Step> {
    tree.children(node).iter().rev().map(|&c| Step::Visit(c))
}

/// Segments collected for the document or for one custom tag's children.
struct Frame<'t> {
    builder: SegmentBuilder<'t>,
    element: Option<&'t Element>,
}

/// Accumulates segments, keeping prose runs merged and wrapped.
#[derive(Default)]
struct SegmentBuilder<'t> {
    segments: Vec<Segment>,
    /// Finished prose waiting to become one HTML segment.
    pending: String,
    /// Prose of the innermost split element.
    run: String,
    /// Split elements, outermost first.
    wrappers: Vec<&'t Element>,
}

impl<'t> SegmentBuilder<'t> {
    fn push_prose(&mut self, html: &str) {
        self.run.push_str(html);
    }

    fn push_custom(&mut self, segment: Segment) {
        self.flush();
        self.segments.push(segment);
    }

    fn enter(&mut self, element: &'t Element) {
        self.close_run();
        self.wrappers.push(element);
    }

    fn leave(&mut self) {
        self.close_run();
        self.wrappers.pop();
    }

    /// Move the current run into `pending`, wrapped in the split elements.
    /// An empty run gets no wrapper.
    fn close_run(&mut self) {
        if self.run.is_empty() {
            return;
        }
        for el in &self.wrappers {
            self.pending.push_str(&open_tag(el));
        }
        self.pending.push_str(&self.run);
        for el in self.wrappers.iter().rev() {
            self.pending.push_str(&close_tag(el));
        }
        self.run.clear();
    }

    fn flush(&mut self) {
        self.close_run();
        if self.pending.is_empty() {
            return;
        }
        let html = std::mem::take(&mut self.pending);
        match self.segments.last_mut() {
            Some(Segment::Html { html: last }) => last.push_str(&html),
            _ => self.segments.push(Segment::Html { html }),
        }
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.segments
    }
}
