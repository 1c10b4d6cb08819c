//! Page and request options for a PDF render.

use std::time::Duration;

/// Default time a single render may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page margins as CSS lengths (`"3cm"`, `"1in"`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMargins {
    pub top: String,
    pub bottom: String,
    pub left: String,
    pub right: String,
}

impl Default for PageMargins {
    /// Print margins of the consent documents. The bottom margin leaves
    /// room for the footer.
    fn default() -> Self {
        Self {
            top: "3cm".to_owned(),
            bottom: "4cm".to_owned(),
            left: "2cm".to_owned(),
            right: "2cm".to_owned(),
        }
    }
}

/// Options passed to a [`RenderEngine`](crate::RenderEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOptions {
    pub margins: PageMargins,
    /// HTML shown at the top of every page.
    pub header_template: Option<String>,
    /// HTML shown at the bottom of every page.
    pub footer_template: Option<String>,
    /// Use the `@page` size of the document instead of the engine default.
    pub prefer_css_page_size: bool,
    pub print_background: bool,
    /// Upper bound for one render call.
    pub timeout: Duration,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            margins: PageMargins::default(),
            header_template: None,
            footer_template: None,
            prefer_css_page_size: false,
            print_background: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PdfOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_margins(mut self, margins: PageMargins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_header(mut self, template: impl Into<String>) -> Self {
        self.header_template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_footer(mut self, template: impl Into<String>) -> Self {
        self.footer_template = Some(template.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_css_page_size(mut self, prefer: bool) -> Self {
        self.prefer_css_page_size = prefer;
        self
    }

    #[must_use]
    pub fn with_background(mut self, print: bool) -> Self {
        self.print_background = print;
        self
    }

    /// Form fields understood by the Chromium conversion route.
    pub(crate) fn form_fields(&self) -> [(&'static str, String); 6] {
        [
            ("marginTop", self.margins.top.clone()),
            ("marginBottom", self.margins.bottom.clone()),
            ("marginLeft", self.margins.left.clone()),
            ("marginRight", self.margins.right.clone()),
            ("preferCssPageSize", self.prefer_css_page_size.to_string()),
            ("printBackground", self.print_background.to_string()),
        ]
    }
}
