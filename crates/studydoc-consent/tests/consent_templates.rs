//! Consent templates through the print and the interactive pipeline.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use studydoc_consent::{ConsentLabels, ConsentRecord, allow_list, generic_text_variable, print_pipeline};
use studydoc_pipeline::{PipelineError, Segment, TemplatePipeline, residual_placeholders};

const TEMPLATE: &str = concat!(
    "# Einwilligung\n",
    "\n",
    "Hallo <pia-consent-input-text-firstname></pia-consent-input-text-firstname>\n",
    "\n",
    "<pia-consent-input-radio-app></pia-consent-input-radio-app>\n",
    "\n",
    "<pia-consent-switch-radio-system name=\"app\">\n",
    "<pia-case value=\"true\">\n",
    "Danke</pia-case>\n",
    "<pia-case value=\"false\">\n",
    "Schade</pia-case>\n",
    "</pia-consent-switch-radio-system>\n",
    "\n",
    "Hobby: <pia-consent-input-text-generic name=\"hobby\"></pia-consent-input-text-generic>\n",
    "<pia-consent-input-radio-generic name=\"newsletter\"></pia-consent-input-radio-generic>\n",
);

fn record() -> ConsentRecord {
    ConsentRecord {
        firstname: Some("Erika".to_owned()),
        timestamp: Some("01.02.2024".to_owned()),
        compliance_app: Some(true),
        generic_text: BTreeMap::from([("hobby".to_owned(), "Lesen & Schreiben".to_owned())]),
        generic_compliance: BTreeMap::from([("newsletter".to_owned(), false)]),
        ..ConsentRecord::default()
    }
}

#[test]
fn printed_template_holds_answers() {
    let record = record();
    let labels = ConsentLabels {
        firstname: "Vorname".to_owned(),
        ..ConsentLabels::default()
    };

    let html = print_pipeline(&record, &labels)
        .render_html(TEMPLATE, &record.variables())
        .unwrap();

    assert!(html.contains("<h1>Einwilligung</h1>"), "{html}");
    assert!(html.contains("<span class=\"text\">Erika</span>"), "{html}");
    assert!(html.contains("Vorname"), "{html}");
    assert!(html.contains("Lesen &amp; Schreiben"), "{html}");
    assert!(html.contains("Danke"), "{html}");
    assert!(!html.contains("Schade"), "{html}");
    assert!(!html.contains("pia-"), "{html}");
    assert!(residual_placeholders(&html).is_empty(), "{html}");
    assert_eq!(html.matches("\u{2612}").count(), 2, "{html}");
}

#[test]
fn unknown_record_leaves_widgets_empty() {
    let record = ConsentRecord::default();
    let html = print_pipeline(&record, &ConsentLabels::default())
        .render_html(TEMPLATE, &record.variables())
        .unwrap();

    assert!(!html.contains("\u{2612}"), "{html}");
    assert!(!html.contains("Danke") && !html.contains("Schade"), "{html}");
    // Generic text without an answer keeps its placeholder
    assert_eq!(
        residual_placeholders(&html),
        vec![generic_text_variable("hobby")]
    );
}

#[test]
fn switch_segments_carry_cases() {
    let segments = TemplatePipeline::new(allow_list()).segment(TEMPLATE).unwrap();

    let switch = segments
        .iter()
        .find(|s| matches!(s, Segment::CustomTag { tag_name, .. } if tag_name == "pia-consent-switch-radio-system"))
        .expect("switch segment");
    let Segment::CustomTag { attrs, children, .. } = switch else {
        unreachable!()
    };

    assert_eq!(switch.attr("name"), Some("app"));
    assert_eq!(attrs.len(), 1);
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].attr("value"), Some("true"));
    assert_eq!(children[1].attr("value"), Some("false"));
}

#[test]
fn preview_switch_lists_one_child_per_case() {
    let markup = concat!(
        "* sed diam nonumy eirmod tempor invidunt ut labore.\n",
        "\n",
        "<pia-consent-input-radio-app></pia-consent-input-radio-app>\n",
        "Another <i>italic</i> text\n",
        "<pia-consent-switch-radio-system name=\"app\">\n",
        "<pia-case value=\"false\">\n",
        "Text if false",
        "</pia-case>\n",
        "<pia-case value=\"true\">\n",
        "Text if true",
        "</pia-case>\n",
        "</pia-consent-switch-radio-system>\n",
        "# At vero\n",
        "Eos et accusam et justo duo dolores et ea rebum.",
    );

    let segments = TemplatePipeline::new(allow_list()).segment(markup).unwrap();
    let switch = segments
        .iter()
        .find(|s| matches!(s, Segment::CustomTag { tag_name, .. } if tag_name == "pia-consent-switch-radio-system"))
        .expect("switch segment");
    let Segment::CustomTag { children, .. } = switch else {
        unreachable!()
    };

    assert_eq!(children.len(), 2, "{children:?}");
    assert!(children.iter().all(|c| !c.is_html()));
    assert_eq!(children[0].attr("value"), Some("false"));
    assert_eq!(children[1].attr("value"), Some("true"));

    let Some(Segment::Html { html }) = segments.last() else {
        panic!("expected trailing prose, got {segments:?}");
    };
    assert!(html.ends_with("rebum.</p>"), "{html}");
}

#[test]
fn stray_case_is_reported() {
    let record = record();
    let err = print_pipeline(&record, &ConsentLabels::default())
        .render_html("<pia-case value=\"true\">x</pia-case>", &record.variables())
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnresolvedTag { tag } if tag == "pia-case"));
}
