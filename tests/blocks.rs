//! Coverage for block constructs not already exercised by `scenarios.rs`.

mod common;
use common::html;

#[test]
fn nested_block_quotes() {
    let out = html("> outer\n>> inner\n> back to outer\n");
    assert_eq!(
        out,
        "<blockquote>\n<p>outer</p>\n\n<blockquote>\n<p>inner</p>\n</blockquote>\n\n<p>back to outer</p>\n</blockquote>"
    );
}

#[test]
fn bare_image() {
    let out = html("![a cat](cat.png)\n");
    assert_eq!(out, "<img src=\"cat.png\" alt=\"a cat\" />");
}

#[test]
fn bare_image_with_title() {
    let out = html("![a cat](cat.png \"My Cat\")\n");
    assert_eq!(out, "<img src=\"cat.png\" alt=\"a cat\" title=\"My Cat\" />");
}

#[test]
fn direct_linked_image() {
    let out = html("[![a cat](cat.png)](https://example.com/cats)\n");
    assert_eq!(
        out,
        "<a href=\"https://example.com/cats\"><img src=\"cat.png\" alt=\"a cat\" /></a>"
    );
}

#[test]
fn reference_linked_image() {
    let out = html("[![a cat](cat.png)][ref]\n\n[ref]: https://example.com/cats\n");
    assert_eq!(
        out,
        "<a href=\"https://example.com/cats\"><img src=\"cat.png\" alt=\"a cat\" /></a>"
    );
}

#[test]
fn table_merge_down() {
    let out = html("| a | b |\n| - | - |\n| x \\/ | y |\n| x \\/ | z |\n| x \\/ | w |\n");
    assert!(out.contains("rowspan=\"3\""));
}

#[test]
fn table_merge_right() {
    let out = html("| a | b | c |\n| - | - | - |\n| x |  |  |\n");
    assert!(out.contains("colspan=\"3\""));
}

#[test]
fn detail_with_summary() {
    let out = html("--> Click to expand\n--| body text\n");
    assert_eq!(
        out,
        "<details><summary>Click to expand</summary><p>body text</p></details>"
    );
}

#[test]
fn detail_without_summary() {
    let out = html("--| body text\n");
    assert_eq!(out, "<details><p>body text</p></details>");
}

#[test]
fn list_item_plain_text_only() {
    let out = html("- a\n- b\n");
    assert_eq!(out, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>");
}

#[test]
fn list_item_with_inline_styling() {
    let out = html("- a **bold** word\n");
    assert_eq!(out, "<ul>\n<li>a <strong>bold</strong> word</li>\n</ul>");
}
