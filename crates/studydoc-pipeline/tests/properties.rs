//! Invariants checked over a table of documents.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use studydoc_markup::{MarkupCompiler, TagAllowList};
use studydoc_pipeline::{
    CustomTagConverter, DomSegmenter, FragmentConverter, Segment, TemplateRenderer,
    segments_to_markup,
};
use studydoc_tree::{Element, HtmlParser, HtmlSerializer};

const TAGS: &[&str] = &["x-radio", "x-text"];

/// HTML documents with custom tags only at the top level.
const TOP_LEVEL_DOCS: &[&str] = &[
    "",
    "<p>only prose</p>",
    "<x-radio></x-radio>",
    "<x-radio></x-radio><x-text></x-text>",
    "\n<x-radio name=\"app\"></x-radio>\n",
    "<h1>Title</h1>\n<x-text label=\"Vorname &amp; Name\"></x-text>\n<p>after</p>",
    "<ul><li>a</li></ul><x-radio></x-radio><!-- note --><x-radio></x-radio>tail &lt;3",
    "<x-radio><p>inner</p></x-radio> mid <x-text>\nlabel</x-text>",
];

/// Documents with custom tags nested in prose.
const NESTED_DOCS: &[&str] = &[
    "<p>Hello <x-radio></x-radio> world</p>",
    "<div><p>a<x-text></x-text></p><p>b</p><x-radio></x-radio></div>",
    "<p><x-radio></x-radio><x-radio></x-radio></p>\n<p> </p>",
    "<blockquote>\n<p>q <em>x</em><x-text></x-text></p>\n</blockquote>",
];

fn segment(html: &str) -> Vec<Segment> {
    let tree = HtmlParser::new().parse(html).unwrap();
    DomSegmenter::new(TAGS).segment(&tree).unwrap()
}

fn assert_no_adjacent_html(segments: &[Segment], doc: &str) {
    for pair in segments.windows(2) {
        assert!(
            !(pair[0].is_html() && pair[1].is_html()),
            "adjacent HTML segments for {doc:?}: {segments:?}"
        );
    }
    for segment in segments {
        match segment {
            Segment::Html { html } => assert!(!html.is_empty(), "empty HTML segment for {doc:?}"),
            Segment::CustomTag { children, .. } => assert_no_adjacent_html(children, doc),
        }
    }
}

#[test]
fn whitespace_between_nested_children_is_normalized() {
    let doc = "<x-radio>\n<x-text></x-text>\n<x-text></x-text>\n</x-radio>\n";
    let segments = segment(doc);
    assert_eq!(
        segments_to_markup(&segments),
        "<x-radio><x-text></x-text><x-text></x-text></x-radio>\n"
    );
}

#[test]
fn segments_reassemble_top_level_documents() {
    for doc in TOP_LEVEL_DOCS {
        let tree = HtmlParser::new().parse(doc).unwrap();
        let expected = HtmlSerializer::new().serialize(&tree);
        let segments = DomSegmenter::new(TAGS).segment(&tree).unwrap();

        if expected.trim().is_empty() {
            assert!(segments.is_empty(), "{doc:?}");
        } else {
            assert_eq!(segments_to_markup(&segments), expected, "{doc:?}");
        }
    }
}

#[test]
fn no_adjacent_or_empty_html_segments() {
    for doc in TOP_LEVEL_DOCS.iter().chain(NESTED_DOCS) {
        assert_no_adjacent_html(&segment(doc), doc);
    }
}

fn count_custom_tags(segments: &[Segment]) -> usize {
    segments
        .iter()
        .map(|s| match s {
            Segment::Html { .. } => 0,
            Segment::CustomTag { children, .. } => 1 + count_custom_tags(children),
        })
        .sum()
}

#[test]
fn every_custom_tag_becomes_one_segment() {
    for doc in TOP_LEVEL_DOCS.iter().chain(NESTED_DOCS) {
        let tree = HtmlParser::new().parse(doc).unwrap();
        let in_tree: usize = TAGS.iter().map(|t| tree.find_elements(t).len()).sum();
        assert_eq!(count_custom_tags(&segment(doc)), in_tree, "{doc:?}");
    }
}

#[test]
fn whitespace_only_documents_have_no_segments() {
    for doc in ["", " ", "\n\n", "\t \n "] {
        assert!(segment(doc).is_empty(), "{doc:?}");
    }
}

#[test]
fn conversion_removes_every_match() {
    for doc in TOP_LEVEL_DOCS.iter().chain(NESTED_DOCS) {
        for tag in TAGS {
            let mut tree = HtmlParser::new().parse(doc).unwrap();
            let before = tree.find_elements(tag).len();

            let converted = FragmentConverter::new(*tag, |el: &Element| {
                format!("<span data-from=\"{}\">w</span>", el.name)
            })
            .convert(&mut tree)
            .unwrap();

            assert_eq!(converted, before, "{doc:?} / {tag}");
            assert!(tree.find_elements(tag).is_empty(), "{doc:?} / {tag}");
        }
    }
}

#[test]
fn unlisted_tags_never_become_elements() {
    let markup = concat!(
        "# Title\n\n",
        "<x-radio></x-radio> <x-evil onclick=\"steal()\"></x-evil>\n\n",
        "<div><x-evil></x-evil></div>\n\n",
        "Inline <iframe src=\"x\"></iframe> and <X-EVIL>\n",
    );
    let html = MarkupCompiler::new(TagAllowList::new(["x-radio"])).compile(markup);
    let tree = HtmlParser::new().parse(&html).unwrap();

    assert!(tree.find_elements("x-evil").is_empty(), "{html}");
    assert!(tree.find_elements("iframe").is_empty(), "{html}");
    assert!(tree.find_elements("div").is_empty(), "{html}");
    assert_eq!(tree.find_elements("x-radio").len(), 1, "{html}");
    assert!(html.contains("&lt;x-evil onclick=\"steal()\"&gt;"), "{html}");
}

#[test]
fn empty_variables_leave_text_unchanged() {
    let renderer = TemplateRenderer::new(HashMap::new());
    for doc in TOP_LEVEL_DOCS.iter().chain(NESTED_DOCS).chain(&["{{a}} {{ b }}"]) {
        assert_eq!(renderer.render(doc), *doc);
    }
}
