//! HTML entity handling.
//!
//! quick-xml only knows the five XML entities. Named HTML entities are
//! converted to Unicode before parsing; the XML ones and numeric character
//! references are left for the reader and decoded by [`decode_entity`].

use std::sync::LazyLock;

use regex::Regex;

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*);").expect("invalid entity regex"));

/// Replace named HTML entities (`&nbsp;`, `&auml;`, ...) with their characters.
///
/// XML entities (`amp`, `lt`, `gt`, `quot`, `apos`) and unknown names are
/// left unchanged.
#[must_use]
pub fn convert_html_entities(html: &str) -> String {
    if !html.contains('&') {
        return html.to_owned();
    }
    ENTITY_PATTERN
        .replace_all(html, |caps: &regex::Captures| {
            named_entity(&caps[1]).map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}

/// Decode an entity reference name as reported by the XML reader
/// (`lt`, `#228`, `#xE4`, ...).
///
/// Unknown references are kept literally as `&name;`.
pub(crate) fn decode_entity(entity: &str) -> String {
    let decoded = match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        s if s.starts_with("#x") || s.starts_with("#X") => {
            u32::from_str_radix(&s[2..], 16).ok().and_then(char::from_u32)
        }
        s if s.starts_with('#') => s[1..].parse::<u32>().ok().and_then(char::from_u32),
        s => {
            return named_entity(s).map_or_else(|| format!("&{entity};"), str::to_owned);
        }
    };
    decoded.map_or_else(|| format!("&{entity};"), String::from)
}

/// Check whether `s` starts with a complete entity or character reference.
#[must_use]
pub fn starts_with_reference(s: &str) -> bool {
    static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6});")
            .expect("invalid reference regex")
    });
    REFERENCE.is_match(s)
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "shy" => "\u{00ad}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",

        // Punctuation
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00b7}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "bdquo" => "\u{201e}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "sbquo" => "\u{201a}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "sect" => "\u{00a7}",
        "para" => "\u{00b6}",

        // German and other Latin-1 letters
        "auml" => "\u{00e4}",
        "ouml" => "\u{00f6}",
        "uuml" => "\u{00fc}",
        "Auml" => "\u{00c4}",
        "Ouml" => "\u{00d6}",
        "Uuml" => "\u{00dc}",
        "szlig" => "\u{00df}",
        "eacute" => "\u{00e9}",
        "egrave" => "\u{00e8}",
        "agrave" => "\u{00e0}",
        "ccedil" => "\u{00e7}",

        // Symbols
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{00b0}",
        "euro" => "\u{20ac}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "plusmn" => "\u{00b1}",
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "check" => "\u{2713}",
        "cross" => "\u{2717}",

        _ => return None,
    })
}
