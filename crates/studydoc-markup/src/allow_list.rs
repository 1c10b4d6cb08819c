use std::collections::BTreeSet;

/// Closed set of custom tag names allowed through compilation.
///
/// Names are stored lowercase and matched case-insensitively. The list is
/// built once per compilation and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAllowList {
    tags: BTreeSet<String>,
}

impl TagAllowList {
    /// Create an allow-list from tag names.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|t| t.as_ref().trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// An allow-list that permits no custom tags.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether `tag` is allowed.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        if tag.bytes().any(|b| b.is_ascii_uppercase()) {
            self.tags.contains(&tag.to_ascii_lowercase())
        } else {
            self.tags.contains(tag)
        }
    }

    /// Whether no tag is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Number of allowed tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Allowed tag names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagAllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
