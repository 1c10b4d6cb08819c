//! Tokenizer for raw HTML events emitted by pulldown-cmark.
//!
//! pulldown-cmark hands raw HTML through untouched, either a whole HTML block
//! or a single inline tag. The compiler needs to judge every tag on its own,
//! so the raw text is split into tags, comments/declarations and text.

use std::sync::LazyLock;

use regex::Regex;
use studydoc_tree::starts_with_reference;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"<!--[\s\S]*?-->",
        r"|<[!?][^>]*>",
        r#"|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*/?>"#,
    ))
    .expect("invalid raw HTML token regex")
});

/// Piece of raw HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawToken<'a> {
    /// Character data between tags.
    Text(&'a str),
    /// Start, end or self-closing tag.
    Tag {
        /// Tag name as written.
        name: &'a str,
        /// Whether the tag carries any attribute.
        has_attributes: bool,
        /// The complete tag source.
        source: &'a str,
    },
    /// Comment, doctype, CDATA or processing instruction.
    Markup(&'a str),
}

/// Split raw HTML into tokens. Concatenating the token sources gives back
/// the input.
pub(crate) fn tokenize(raw: &str) -> Vec<RawToken<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in TOKEN_PATTERN.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            tokens.push(RawToken::Text(&raw[last..whole.start()]));
        }
        tokens.push(match caps.get(2) {
            Some(name) => RawToken::Tag {
                name: name.as_str(),
                has_attributes: caps.get(3).is_some_and(|a| !a.as_str().trim().is_empty()),
                source: whole.as_str(),
            },
            None => RawToken::Markup(whole.as_str()),
        });
        last = whole.end();
    }
    if last < raw.len() {
        tokens.push(RawToken::Text(&raw[last..]));
    }
    tokens
}

/// Escape raw text so that it reads as literal characters.
///
/// `<` and `>` are always escaped; `&` only when it does not start an entity
/// or character reference, so `&auml;` in raw HTML keeps working.
pub(crate) fn escape_literal(text: &str, out: &mut String) {
    for (i, ch) in text.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' if !starts_with_reference(&text[i..]) => out.push_str("&amp;"),
            _ => out.push(ch),
        }
    }
}
