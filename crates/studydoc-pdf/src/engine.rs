//! Rendering engines that turn a finished HTML page into PDF bytes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::debug;
use ureq::Agent;

use crate::error::PdfError;
use crate::multipart::MultipartForm;
use crate::options::PdfOptions;

/// Route of the Chromium HTML conversion on the service.
pub const CONVERT_ROUTE: &str = "forms/chromium/convert/html";

/// A headless browser (or a service wrapping one) that prints HTML to PDF.
///
/// One engine is shared by every caller of a
/// [`PdfGenerator`](crate::PdfGenerator), so implementations must keep the
/// state of concurrent renders apart.
pub trait RenderEngine: Send + Sync {
    /// Print a complete HTML page.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot produce the PDF.
    fn render(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, PdfError>;

    /// Release the engine's resources. Later renders fail with
    /// [`PdfError::Closed`].
    fn close(&self) {}
}

/// Create an HTTP agent whose requests give up after `timeout`.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Engine backed by an HTTP Chromium conversion service (e.g. Gotenberg).
///
/// Every render is one independent request, so concurrent renders never
/// share page state. Connections are pooled by the agent.
#[derive(Debug)]
pub struct HttpRenderEngine {
    agent: Agent,
    base_url: String,
    closed: AtomicBool,
}

impl HttpRenderEngine {
    /// Create an engine for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
            base_url: base_url.trim_end_matches('/').to_owned(),
            closed: AtomicBool::new(false),
        }
    }

    /// Full URL of the conversion route.
    #[must_use]
    pub fn convert_url(&self) -> String {
        format!("{}/{CONVERT_ROUTE}", self.base_url)
    }

    fn build_form(html: &str, options: &PdfOptions) -> MultipartForm {
        let mut form = MultipartForm::new();
        form.file("files", "index.html", "text/html", html.as_bytes());
        if let Some(header) = &options.header_template {
            form.file("files", "header.html", "text/html", header.as_bytes());
        }
        if let Some(footer) = &options.footer_template {
            form.file("files", "footer.html", "text/html", footer.as_bytes());
        }
        for (name, value) in options.form_fields() {
            form.text(name, &value);
        }
        form
    }
}

impl RenderEngine for HttpRenderEngine {
    fn render(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, PdfError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PdfError::Closed);
        }

        let form = Self::build_form(html, options);
        let content_type = form.content_type();
        let body = form.finish();
        let url = self.convert_url();
        debug!(url = %url, request_bytes = body.len(), "sending conversion request");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", &content_type)
            .send(&body[..])?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(PdfError::HttpStatus {
                status,
                body: error_body,
            });
        }

        let pdf = body_reader.read_to_vec()?;
        debug!(pdf_bytes = pdf.len(), "conversion finished");
        Ok(pdf)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
