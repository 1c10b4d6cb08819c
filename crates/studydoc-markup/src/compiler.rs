//! Markdown to HTML compilation with raw HTML filtering.

use pulldown_cmark::{CowStr, Event, Options, Parser, html};
use tracing::debug;

use crate::allow_list::TagAllowList;
use crate::raw_html::{RawToken, escape_literal, tokenize};

/// Formatting tags that may be written as raw HTML without being on the
/// allow-list, as long as they carry no attributes.
pub const INLINE_FORMATTING_TAGS: &[&str] = &[
    "b", "br", "em", "i", "mark", "s", "small", "strong", "sub", "sup", "u",
];

/// Compiles Markdown templates to HTML.
///
/// Standard Markdown (CommonMark plus GFM tables, strikethrough and task
/// lists) is rendered as usual. Raw HTML is filtered tag by tag: a tag whose
/// name is on the allow-list is kept verbatim, anything else (including
/// `<script>` and comments) is written as escaped text.
///
/// Compilation never fails. Malformed markup ends up as best-effort HTML.
#[derive(Debug, Clone)]
pub struct MarkupCompiler {
    allow_list: TagAllowList,
    inline_formatting: bool,
    gfm: bool,
}

impl MarkupCompiler {
    /// Create a compiler for the given allow-list.
    ///
    /// Attribute-free inline formatting tags are allowed by default.
    #[must_use]
    pub fn new(allow_list: TagAllowList) -> Self {
        Self {
            allow_list,
            inline_formatting: true,
            gfm: true,
        }
    }

    /// Allow or reject raw inline formatting tags (`<b>`, `<br>`, ...).
    #[must_use]
    pub fn with_inline_formatting(mut self, enabled: bool) -> Self {
        self.inline_formatting = enabled;
        self
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// The allow-list this compiler enforces.
    #[must_use]
    pub fn allow_list(&self) -> &TagAllowList {
        &self.allow_list
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Compile Markdown to HTML.
    #[must_use]
    pub fn compile(&self, markup: &str) -> String {
        let mut rejected = 0usize;
        let events = Parser::new_ext(markup, self.parser_options()).map(|event| match event {
            Event::Html(raw) => {
                let (filtered, count) = self.filter_raw_html(&raw);
                rejected += count;
                Event::Html(CowStr::from(filtered))
            }
            Event::InlineHtml(raw) => {
                let (filtered, count) = self.filter_raw_html(&raw);
                rejected += count;
                Event::InlineHtml(CowStr::from(filtered))
            }
            other => other,
        });

        let mut out = String::with_capacity(markup.len() + markup.len() / 2);
        html::push_html(&mut out, events);

        debug!(
            input_len = markup.len(),
            output_len = out.len(),
            rejected,
            "compiled markup"
        );
        out
    }

    /// Keep allowed tags of a raw HTML chunk, escape everything else.
    ///
    /// Returns the filtered HTML and the number of rejected tags.
    fn filter_raw_html(&self, raw: &str) -> (String, usize) {
        let mut out = String::with_capacity(raw.len());
        let mut rejected = 0;

        for token in tokenize(raw) {
            match token {
                RawToken::Tag {
                    name,
                    has_attributes,
                    source,
                } if self.is_allowed(name, has_attributes) => out.push_str(source),
                RawToken::Tag { name, source, .. } => {
                    debug!(tag = name, "rejected raw HTML tag");
                    rejected += 1;
                    escape_literal(source, &mut out);
                }
                RawToken::Markup(source) => {
                    rejected += 1;
                    escape_literal(source, &mut out);
                }
                RawToken::Text(text) => escape_literal(text, &mut out),
            }
        }
        (out, rejected)
    }

    fn is_allowed(&self, name: &str, has_attributes: bool) -> bool {
        if self.allow_list.contains(name) {
            return true;
        }
        self.inline_formatting
            && !has_attributes
            && INLINE_FORMATTING_TAGS
                .iter()
                .any(|t| t.eq_ignore_ascii_case(name))
    }
}
