//! Error types for PDF rendering.

use std::time::Duration;

/// Error from a PDF render or from the engine behind it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PdfError {
    /// HTTP request failed (network error, connection refused, etc).
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    /// The conversion service answered with an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The render did not finish within the configured timeout.
    #[error("PDF rendering did not finish within {0:?}")]
    Timeout(Duration),

    /// The engine failed for a reason of its own.
    #[error("render engine error: {0}")]
    Engine(String),

    /// The engine was closed while the render was in flight.
    #[error("render engine is closed")]
    Closed,
}
