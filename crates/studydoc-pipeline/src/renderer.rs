//! `{{name}}` variable substitution.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::document::Representation;
use crate::error::PipelineError;
use crate::stage::Stage;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("invalid placeholder regex"));

/// Replaces `{{key}}` placeholders with variable values.
///
/// Keys are trimmed, so `{{ name }}` and `{{name}}` are the same
/// placeholder. A placeholder without a value is left as written. Values
/// are inserted verbatim, without escaping, and are not scanned for
/// placeholders again.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    variables: HashMap<String, String>,
}

impl TemplateRenderer {
    /// Create a renderer for the given variables.
    #[must_use]
    pub fn new(variables: HashMap<String, String>) -> Self {
        Self { variables }
    }

    /// Add or replace one variable.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// The variables this renderer substitutes.
    #[must_use]
    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Substitute all known placeholders in one left-to-right pass.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        if self.variables.is_empty() {
            return text.to_owned();
        }
        PLACEHOLDER
            .replace_all(text, |caps: &Captures| {
                self.variables
                    .get(caps[1].trim())
                    .map_or_else(|| caps[0].to_owned(), Clone::clone)
            })
            .into_owned()
    }
}

/// Placeholder keys still present in `text`, sorted and deduplicated.
///
/// Useful after [`TemplateRenderer::render`] for callers that treat a
/// missing variable as an error.
#[must_use]
pub fn residual_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_owned())
        .filter(|key| !key.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl FromIterator<(String, String)> for TemplateRenderer {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Stage for TemplateRenderer {
    fn name(&self) -> &'static str {
        "render"
    }

    fn apply(&mut self, input: Representation) -> Result<Representation, PipelineError> {
        match input {
            Representation::Markup(text) => Ok(Representation::Markup(self.render(&text))),
            Representation::Html(html) => Ok(Representation::Html(self.render(&html))),
            other @ Representation::Tree(_) => Err(PipelineError::mismatch(
                self.name(),
                "markup or HTML",
                other.kind(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_known_and_unknown() {
        let renderer = TemplateRenderer::default().with_var("hello", "Hi");
        assert_eq!(
            renderer.render("<p>{{hello}}</p><p>{{missing}}</p>"),
            "<p>Hi</p><p>{{missing}}</p>"
        );
    }

    #[test]
    fn test_key_is_trimmed() {
        let renderer = TemplateRenderer::default().with_var("name", "Ada");
        assert_eq!(renderer.render("{{ name }} / {{name}}"), "Ada / Ada");
    }

    #[test]
    fn test_empty_map_is_identity() {
        let text = "{{a}} {b} {{ }} }}{{";
        assert_eq!(TemplateRenderer::default().render(text), text);
    }

    #[test]
    fn test_values_not_escaped() {
        let renderer = TemplateRenderer::default().with_var("x", "<b>&</b>");
        assert_eq!(renderer.render("{{x}}"), "<b>&</b>");
    }

    #[test]
    fn test_values_not_rescanned() {
        let renderer = TemplateRenderer::default()
            .with_var("a", "{{b}}")
            .with_var("b", "B");
        assert_eq!(renderer.render("{{a}}"), "{{b}}");
        // A second pass picks up the placeholder the first one inserted.
        assert_eq!(renderer.render(&renderer.render("{{a}}")), "B");
    }

    #[test]
    fn test_render_twice_is_idempotent_for_plain_values() {
        let renderer = TemplateRenderer::default().with_var("a", "A");
        let once = renderer.render("{{a}} {{z}}");
        assert_eq!(renderer.render(&once), once);
    }

    #[test]
    fn test_residual_placeholders() {
        assert_eq!(
            residual_placeholders("{{ b }} {{a}} {{b}} {{}}"),
            vec!["a".to_owned(), "b".to_owned()]
        );
        assert!(residual_placeholders("no placeholders").is_empty());
    }

    #[test]
    fn test_stage_rejects_tree() {
        let tree = studydoc_tree::ParseTree::new();
        let err = TemplateRenderer::default()
            .apply(Representation::Tree(tree))
            .unwrap_err();
        assert!(matches!(err, PipelineError::StageMismatch { .. }));
    }
}
