//! Print page wrapper, header and footer for consent documents.

use std::fmt::Write;

use studydoc_tree::escape_text;

use crate::options::PdfOptions;

/// Stylesheet of the printed document.
pub const PRINT_STYLESHEET: &str = concat!(
    "html { font-family: serif; font-size: 10pt; }",
    ".wrapper { page-break-inside: avoid; }",
    ".checkbox { margin-right: 10px; font-size: large; }",
    ".checkbox-label { margin-right: 40px; }",
    ".text { display: inline-block; border-bottom: 1px solid; min-width: 300px; padding: 2px 5px 2px 1px; }",
    ".text-label { font-size: 70%; padding: 0 5px 2px 1px; }",
);

/// Layout of a printed template: the page around the body plus the header
/// and footer repeated on every page.
///
/// # Example
///
/// ```
/// use studydoc_pdf::PrintLayout;
///
/// let layout = PrintLayout::new("PIA").with_footer_cell("Consent Study A");
/// let page = layout.page("<p>Body</p>");
/// assert!(page.starts_with("<!DOCTYPE html>"));
/// assert!(layout.footer_template().contains("Consent Study A"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintLayout {
    lang: String,
    header_title: String,
    footer_cells: Vec<String>,
    page_label: String,
}

impl PrintLayout {
    /// Create a layout whose header shows `header_title`.
    #[must_use]
    pub fn new(header_title: impl Into<String>) -> Self {
        Self {
            lang: "de".to_owned(),
            header_title: header_title.into(),
            footer_cells: Vec::new(),
            page_label: "Page".to_owned(),
        }
    }

    /// Set the document language.
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Add a text cell to the footer row. Cells appear left to right before
    /// the page counter.
    #[must_use]
    pub fn with_footer_cell(mut self, text: impl Into<String>) -> Self {
        self.footer_cells.push(text.into());
        self
    }

    /// Set the word shown before the page counter.
    #[must_use]
    pub fn with_page_label(mut self, label: impl Into<String>) -> Self {
        self.page_label = label.into();
        self
    }

    /// Wrap rendered body HTML into a complete print page.
    #[must_use]
    pub fn page(&self, body: &str) -> String {
        let mut html = String::with_capacity(body.len() + 1024);
        let _ = write!(
            html,
            "<!DOCTYPE html><html lang=\"{}\"><head><meta charset=\"utf-8\"><title></title>",
            escape_text(&self.lang)
        );
        let _ = write!(html, "<style>{PRINT_STYLESHEET}</style>");
        html.push_str("</head><body>");
        html.push_str(body);
        html.push_str("</body></html>");
        html
    }

    /// Header template with the centered title.
    #[must_use]
    pub fn header_template(&self) -> String {
        standalone(&format!(
            "<div style=\"width: 100%; font-size: 8pt; font-family: serif; margin-top: 1.1cm; text-align: center\">{}</div>",
            escape_text(&self.header_title)
        ))
    }

    /// Footer template: a rule, the footer cells and `Page n/m`.
    ///
    /// The engine fills the `pageNumber` and `totalPages` spans.
    #[must_use]
    pub fn footer_template(&self) -> String {
        let mut html = String::with_capacity(512);
        html.push_str(
            "<div style=\"width: 100%; font-size: 6.5pt; font-family: serif; margin-bottom: 1.6cm;\">",
        );
        html.push_str("<div style=\"margin: auto; width:12.6cm\"><hr>");
        html.push_str("<table style=\"width: 100%; border-collapse: collapse\"><tr>");
        for cell in &self.footer_cells {
            let _ = write!(html, "<td>{}</td>", escape_text(cell));
        }
        let _ = write!(
            html,
            "<td style=\"text-align: right;\">{} <span class=\"pageNumber\"></span>/<span class=\"totalPages\"></span></td>",
            escape_text(&self.page_label)
        );
        html.push_str("</tr></table></div></div>");
        standalone(&html)
    }

    /// Set the header and footer templates of `options`.
    #[must_use]
    pub fn apply_to(&self, options: PdfOptions) -> PdfOptions {
        options
            .with_header(self.header_template())
            .with_footer(self.footer_template())
    }
}

/// Header and footer are rendered as documents of their own.
fn standalone(fragment: &str) -> String {
    format!("<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{fragment}</body></html>")
}
