//! Document template pipeline.
//!
//! A template moves through a chain of [`Stage`]s, each turning one
//! [`Representation`] of a [`Document`] into the next:
//!
//! ```text
//! markup ──compile──▶ HTML ──parse──▶ tree ──convert*──▶ tree ──serialize──▶ HTML ──render──▶ HTML
//!                                       │
//!                                       └──segment──▶ [Segment]
//! ```
//!
//! - The flat artifact (final HTML, and from it a PDF) runs every custom tag
//!   through a [`CustomTagConverter`] and substitutes `{{name}}` variables.
//! - The structured artifact stops at the tree and splits it into prose and
//!   widget [`Segment`]s with the [`DomSegmenter`].
//!
//! [`TemplatePipeline`] wires both chains up for one configuration.

mod converter;
mod document;
mod error;
mod pipeline;
mod renderer;
mod segment;
mod segmenter;
mod stage;

pub use converter::{ConverterRegistry, CustomTagConverter, FragmentConverter, replace_with_fragment};
pub use document::{Document, Representation, RepresentationKind};
pub use error::PipelineError;
pub use pipeline::TemplatePipeline;
pub use renderer::{TemplateRenderer, residual_placeholders};
pub use segment::{Segment, segments_to_markup};
pub use segmenter::DomSegmenter;
pub use stage::{Stage, UnresolvedTagCheck};
