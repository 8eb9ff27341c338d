//! The concrete input/output scenarios named in spec.md §8.

mod common;
use common::{err, html};
use stonemark::ErrorKind;

#[test]
fn heading_paragraph_and_sublist() {
    let out = html("Document Title\n==============\n\n- a\n- b\n  + c\n");
    assert_eq!(
        out,
        "<h2>Document Title</h2>\n\n<ul>\n<li>a</li>\n<li>b</li>\n    <ul>\n    <li>c</li>\n    </ul>\n</ul>"
    );
}

#[test]
fn footnote_definition_after_reference() {
    let out = html("Hello[^n].\n\n[^n]: world\n");
    assert!(out.contains("<sup><a href=\"#footnote-n\">[n]</a></sup>"));
    assert!(out.contains("<div class=\"footnote\" id=\"footnote-n\"><sup>n</sup>world</div>"));
}

#[test]
fn external_link_definition_resolves_after_use() {
    let out = html("See [docs][1].\n\n[1]: http://example.com\n");
    assert_eq!(out, "<p>See <a href=\"http://example.com\">docs</a>.</p>");
}

#[test]
fn ambiguous_heading_or_rule() {
    // The paragraph "text" isn't preceded by a blank line (a list item ends
    // directly above it), so a lone `===` below it can't be disambiguated
    // from a thematic break without author intervention.
    let input = "- item\ntext\n===\nmore text\n";
    let e = err(input);
    assert_eq!(e.kind, ErrorKind::AmbiguousFormat);
}

#[test]
fn list_marker_change_without_blank_line_is_hard_error() {
    let input = "- a\n* b\n";
    let e = err(input);
    assert_eq!(e.kind, ErrorKind::BadFormat);
    assert_eq!(e.line, 2);
}

#[test]
fn fenced_code_block_escapes_html_specials() {
    let out = html("```\na<b&c\n```\n");
    assert_eq!(out, "<pre><code>a&lt;b&amp;c</code></pre>");
}
