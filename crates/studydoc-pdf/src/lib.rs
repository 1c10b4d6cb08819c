//! PDF rendering of finished templates.
//!
//! A [`PdfGenerator`] owns one [`RenderEngine`], opened on first use and
//! shared by every caller until [`PdfGenerator::close`]. The bundled
//! [`HttpRenderEngine`] posts the page to a Chromium conversion service.
//! [`PrintLayout`] wraps rendered template HTML into a print page and
//! builds the header and footer shown on every page.

mod engine;
mod error;
mod generator;
mod layout;
mod multipart;
mod options;

pub use engine::{CONVERT_ROUTE, HttpRenderEngine, RenderEngine, create_agent};
pub use error::PdfError;
pub use generator::PdfGenerator;
pub use layout::{PRINT_STYLESHEET, PrintLayout};
pub use options::{DEFAULT_TIMEOUT, PageMargins, PdfOptions};
