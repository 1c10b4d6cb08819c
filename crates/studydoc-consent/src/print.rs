//! Converters that print consent widgets into the flat artifact.
//!
//! Radio widgets become a checkbox row with the participant's answer ticked.
//! Text widgets become an underlined line holding a `{{variable}}` that the
//! renderer fills from [`ConsentRecord::variables`]. Switches keep the
//! content of the `pia-case` matching the answer and drop the rest.

use std::collections::BTreeMap;
use std::fmt::Write;

use studydoc_markup::MarkupCompiler;
use studydoc_pipeline::{ConverterRegistry, CustomTagConverter, PipelineError, TemplatePipeline, replace_with_fragment};
use studydoc_tree::{Element, NodeId, ParseTree, escape_text};
use tracing::debug;

use crate::labels::ConsentLabels;
use crate::record::{ConsentRecord, SystemDecision, SystemText, generic_text_variable};
use crate::tags;

const CHECKED: &str = "\u{2612}";
const UNCHECKED: &str = "\u{2610}";

/// Where a widget finds the participant's yes/no answer.
#[derive(Debug, Clone)]
pub enum DecisionSource {
    /// The same answer for every element.
    Fixed(Option<bool>),
    /// The answer named by the element's `name` attribute.
    ByName(BTreeMap<String, bool>),
}

impl DecisionSource {
    fn lookup(&self, element: &Element) -> Option<bool> {
        match self {
            Self::Fixed(decision) => *decision,
            Self::ByName(decisions) => {
                let name = element.attr("name")?.trim();
                decisions.get(name).copied()
            }
        }
    }
}

fn element_of<'t>(tree: &'t ParseTree, node: NodeId, tag: &str) -> Result<&'t Element, PipelineError> {
    tree.element(node).ok_or_else(|| PipelineError::Converter {
        tag: tag.to_owned(),
        message: "matched node is not an element".to_owned(),
    })
}

/// Prints a yes/no widget as a checkbox row.
#[derive(Debug, Clone)]
pub struct RadioConverter {
    tag: String,
    source: DecisionSource,
    yes: String,
    no: String,
}

impl RadioConverter {
    pub fn new(tag: impl Into<String>, source: DecisionSource, labels: &ConsentLabels) -> Self {
        Self {
            tag: tag.into(),
            source,
            yes: labels.yes.clone(),
            no: labels.no.clone(),
        }
    }

    fn render(&self, decision: Option<bool>) -> String {
        let mark = |ticked: bool| if ticked { CHECKED } else { UNCHECKED };
        let mut html = String::with_capacity(256);
        html.push_str("<div class=\"wrapper\">");
        for (label, ticked) in [(&self.yes, decision == Some(true)), (&self.no, decision == Some(false))] {
            let _ = write!(
                html,
                "<span class=\"checkbox\">{}</span><span class=\"checkbox-label\">{}</span>",
                mark(ticked),
                escape_text(label)
            );
        }
        html.push_str("</div>");
        html
    }
}

impl CustomTagConverter for RadioConverter {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn convert_node(&mut self, tree: &mut ParseTree, node: NodeId) -> Result<(), PipelineError> {
        let decision = self.source.lookup(element_of(tree, node, &self.tag)?);
        replace_with_fragment(tree, node, &self.render(decision))
    }
}

/// Where a text widget finds its variable and label.
#[derive(Debug, Clone)]
pub enum TextSource {
    /// A fixed variable printed under a fixed label.
    Fixed { variable: String, label: String },
    /// A generic answer named by the element's `name` attribute, labelled by
    /// its `label` attribute (or the name).
    Generic,
}

/// Prints a text widget as an underlined line with a label below.
#[derive(Debug, Clone)]
pub struct TextConverter {
    tag: String,
    source: TextSource,
}

impl TextConverter {
    pub fn new(tag: impl Into<String>, source: TextSource) -> Self {
        Self {
            tag: tag.into(),
            source,
        }
    }

    /// Converter for one of the personal data fields.
    pub fn system(tag: impl Into<String>, field: SystemText, label: impl Into<String>) -> Self {
        Self::new(
            tag,
            TextSource::Fixed {
                variable: field.variable().to_owned(),
                label: label.into(),
            },
        )
    }
}

impl CustomTagConverter for TextConverter {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn convert_node(&mut self, tree: &mut ParseTree, node: NodeId) -> Result<(), PipelineError> {
        let (variable, label) = match &self.source {
            TextSource::Fixed { variable, label } => (variable.clone(), label.clone()),
            TextSource::Generic => {
                let element = element_of(tree, node, &self.tag)?;
                let name = element.attr("name").ok_or_else(|| PipelineError::Converter {
                    tag: self.tag.clone(),
                    message: "missing `name` attribute".to_owned(),
                })?;
                let label = element.attr("label").unwrap_or(name);
                (generic_text_variable(name), label.to_owned())
            }
        };

        let html = format!(
            "<div class=\"wrapper\"><span class=\"text\">{{{{{variable}}}}}</span><br /><span class=\"text-label\">{}</span></div>",
            escape_text(&label)
        );
        replace_with_fragment(tree, node, &html)
    }
}

/// Keeps the `pia-case` branch whose `value` matches the answer.
///
/// The branch content takes the switch's place; without an answer or a
/// matching branch the switch is removed.
#[derive(Debug, Clone)]
pub struct SwitchConverter {
    tag: String,
    source: DecisionSource,
}

impl SwitchConverter {
    pub fn new(tag: impl Into<String>, source: DecisionSource) -> Self {
        Self {
            tag: tag.into(),
            source,
        }
    }

    fn selected_case(tree: &ParseTree, node: NodeId, decision: bool) -> Option<NodeId> {
        let wanted = decision.to_string();
        tree.children(node).iter().copied().find(|&child| {
            tree.element(child).is_some_and(|el| {
                el.is_named(tags::CASE) && el.attr("value").is_some_and(|v| v.trim() == wanted)
            })
        })
    }
}

impl CustomTagConverter for SwitchConverter {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn convert_node(&mut self, tree: &mut ParseTree, node: NodeId) -> Result<(), PipelineError> {
        let decision = self.source.lookup(element_of(tree, node, &self.tag)?);
        let case = decision.and_then(|d| Self::selected_case(tree, node, d));
        debug!(tag = %self.tag, ?decision, matched = case.is_some(), "selecting switch case");

        let hoisted = case.map(|c| tree.children(c).to_vec()).unwrap_or_default();
        tree.replace_with(node, hoisted)?;
        Ok(())
    }
}

/// All print converters for `record`, in the order they must run.
///
/// Switches run last, after the widgets inside their branches were printed.
#[must_use]
pub fn print_converters(record: &ConsentRecord, labels: &ConsentLabels) -> ConverterRegistry {
    let radio = |tag: &str, decision: SystemDecision| {
        RadioConverter::new(tag, DecisionSource::Fixed(record.decision(decision)), labels)
    };

    ConverterRegistry::new()
        .with(radio(tags::RADIO_APP, SystemDecision::App))
        .with(radio(tags::RADIO_BLOODSAMPLES, SystemDecision::Bloodsamples))
        .with(radio(tags::RADIO_LABRESULTS, SystemDecision::Labresults))
        .with(radio(tags::RADIO_SAMPLES, SystemDecision::Samples))
        .with(RadioConverter::new(
            tags::RADIO_GENERIC,
            DecisionSource::ByName(record.generic_compliance.clone()),
            labels,
        ))
        .with(TextConverter::system(tags::TEXT_FIRSTNAME, SystemText::Firstname, &labels.firstname))
        .with(TextConverter::system(tags::TEXT_LASTNAME, SystemText::Lastname, &labels.lastname))
        .with(TextConverter::system(tags::TEXT_LOCATION, SystemText::Location, &labels.location))
        .with(TextConverter::system(tags::TEXT_BIRTHDATE, SystemText::Birthdate, &labels.birthdate))
        .with(TextConverter::system(tags::TEXT_DATE, SystemText::Date, &labels.date))
        .with(TextConverter::new(tags::TEXT_GENERIC, TextSource::Generic))
        .with(SwitchConverter::new(
            tags::SWITCH_GENERIC,
            DecisionSource::ByName(record.generic_compliance.clone()),
        ))
        .with(SwitchConverter::new(
            tags::SWITCH_SYSTEM,
            DecisionSource::ByName(record.system_decisions()),
        ))
}

/// Pipeline printing consent templates for `record`.
#[must_use]
pub fn print_pipeline(record: &ConsentRecord, labels: &ConsentLabels) -> TemplatePipeline {
    TemplatePipeline::new(tags::allow_list()).with_converters(print_converters(record, labels))
}

/// Like [`print_pipeline`], with a custom compiler (e.g. a wider allow-list).
#[must_use]
pub fn print_pipeline_with(
    compiler: MarkupCompiler,
    record: &ConsentRecord,
    labels: &ConsentLabels,
) -> TemplatePipeline {
    let allow_list = compiler.allow_list().clone();
    TemplatePipeline::new(allow_list)
        .with_compiler(compiler)
        .with_converters(print_converters(record, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use studydoc_tree::{HtmlParser, HtmlSerializer};

    fn convert(converter: &mut dyn CustomTagConverter, html: &str) -> String {
        let mut tree = HtmlParser::new().parse(html).unwrap();
        converter.convert(&mut tree).unwrap();
        HtmlSerializer::new().serialize(&tree)
    }

    #[test]
    fn test_radio_ticks_answer() {
        let mut converter = RadioConverter::new(
            tags::RADIO_APP,
            DecisionSource::Fixed(Some(false)),
            &ConsentLabels::default(),
        );
        let html = convert(&mut converter, "<pia-consent-input-radio-app></pia-consent-input-radio-app>");
        assert_eq!(
            html,
            concat!(
                "<div class=\"wrapper\">",
                "<span class=\"checkbox\">\u{2610}</span><span class=\"checkbox-label\">Yes</span>",
                "<span class=\"checkbox\">\u{2612}</span><span class=\"checkbox-label\">No</span>",
                "</div>",
            )
        );
    }

    #[test]
    fn test_radio_unanswered_ticks_nothing() {
        let mut converter =
            RadioConverter::new(tags::RADIO_APP, DecisionSource::Fixed(None), &ConsentLabels::default());
        let html = convert(&mut converter, "<pia-consent-input-radio-app></pia-consent-input-radio-app>");
        assert!(!html.contains(CHECKED));
    }

    #[test]
    fn test_generic_radio_uses_name() {
        let decisions = BTreeMap::from([("newsletter".to_owned(), true)]);
        let mut converter = RadioConverter::new(
            tags::RADIO_GENERIC,
            DecisionSource::ByName(decisions),
            &ConsentLabels::default(),
        );
        let html = convert(
            &mut converter,
            "<pia-consent-input-radio-generic name=\"newsletter\"></pia-consent-input-radio-generic>",
        );
        assert!(html.starts_with("<div class=\"wrapper\"><span class=\"checkbox\">\u{2612}</span>"), "{html}");
    }

    #[test]
    fn test_system_text_line() {
        let mut converter = TextConverter::system(tags::TEXT_FIRSTNAME, SystemText::Firstname, "Vorname");
        let html = convert(
            &mut converter,
            "<p><pia-consent-input-text-firstname></pia-consent-input-text-firstname></p>",
        );
        assert_eq!(
            html,
            "<p><div class=\"wrapper\"><span class=\"text\">{{firstname}}</span><br /><span class=\"text-label\">Vorname</span></div></p>"
        );
    }

    #[test]
    fn test_generic_text_line() {
        let mut converter = TextConverter::new(tags::TEXT_GENERIC, TextSource::Generic);
        let html = convert(
            &mut converter,
            "<pia-consent-input-text-generic name=\"hobby\" label=\"Hobby &amp; more\"></pia-consent-input-text-generic>",
        );
        assert!(html.contains(&format!("{{{{{}}}}}", generic_text_variable("hobby"))), "{html}");
        assert!(html.contains(">Hobby &amp; more</span>"), "{html}");
    }

    #[test]
    fn test_generic_text_requires_name() {
        let mut converter = TextConverter::new(tags::TEXT_GENERIC, TextSource::Generic);
        let mut tree = HtmlParser::new()
            .parse("<pia-consent-input-text-generic></pia-consent-input-text-generic>")
            .unwrap();
        let err = converter.convert(&mut tree).unwrap_err();
        assert!(matches!(err, PipelineError::Converter { message, .. } if message.contains("name")));
    }

    const SWITCH: &str = concat!(
        "<p>before</p>",
        "<pia-consent-switch-radio-system name=\"app\">",
        "<pia-case value=\"false\"><p>Text if false</p></pia-case>",
        "<pia-case value=\"true\"><p>Text if true</p><p>more</p></pia-case>",
        "</pia-consent-switch-radio-system>",
        "<p>after</p>",
    );

    fn switch(decisions: &[(&str, bool)]) -> SwitchConverter {
        SwitchConverter::new(
            tags::SWITCH_SYSTEM,
            DecisionSource::ByName(
                decisions
                    .iter()
                    .map(|&(k, v)| (k.to_owned(), v))
                    .collect(),
            ),
        )
    }

    #[test]
    fn test_switch_keeps_matching_case() {
        assert_eq!(
            convert(&mut switch(&[("app", true)]), SWITCH),
            "<p>before</p><p>Text if true</p><p>more</p><p>after</p>"
        );
        assert_eq!(
            convert(&mut switch(&[("app", false)]), SWITCH),
            "<p>before</p><p>Text if false</p><p>after</p>"
        );
    }

    #[test]
    fn test_switch_without_answer_is_removed() {
        assert_eq!(
            convert(&mut switch(&[("samples", true)]), SWITCH),
            "<p>before</p><p>after</p>"
        );
    }
}
