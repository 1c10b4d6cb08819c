//! CLI command implementations.

pub(crate) mod pdf;
pub(crate) mod render;
pub(crate) mod segment;
mod template;

pub(crate) use pdf::PdfArgs;
pub(crate) use render::RenderArgs;
pub(crate) use segment::SegmentArgs;
