//! HTML serialization (spec.md §6's output conventions, §7's `MissingLink`
//! diagnostic). A single flat module: StoneMark's output is plain, fixed
//! markup with no plugin/adapter surface, unlike the teacher's pluggable
//! CommonMark formatter this replaces.

use crate::error::{Result, StoneMarkError};
use crate::nodes::{AstNode, ListType, NodeKind, TableSection};
use crate::parser::Options;

/// Escapes the five characters spec.md §8's "Escape" property names.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `root`'s block children to an HTML body fragment. `unresolved`,
/// if present, is the earliest unresolved link/footnote reference — raised
/// here rather than during parsing so forward references can still settle
/// (spec.md §7).
pub(crate) fn to_html<'a>(
    root: &'a AstNode<'a>,
    options: &Options,
    unresolved: Option<(String, u32)>,
) -> Result<String> {
    if let Some((marker, line)) = unresolved {
        return Err(StoneMarkError::missing_link(
            line,
            format!("unresolved reference to `{marker}`"),
        ));
    }
    let mut parts = Vec::new();
    for child in root.children() {
        parts.push(render_block(child, options, 0)?);
    }
    Ok(parts.join("\n\n"))
}

fn render_block<'a>(node: &'a AstNode<'a>, options: &Options, depth: usize) -> Result<String> {
    let kind = node.data.borrow().kind.clone();
    match kind {
        NodeKind::Heading(h) => {
            let n = options.header_sizes[(h.level - 1) as usize];
            let mut inline = String::new();
            render_inline_children(node, &mut inline)?;
            Ok(format!("<h{n}>{inline}</h{n}>"))
        }
        NodeKind::Paragraph => {
            let mut inline = String::new();
            render_inline_children(node, &mut inline)?;
            Ok(format!("<p>{inline}</p>"))
        }
        NodeKind::List(l) => {
            let mut lines = Vec::new();
            render_list(node, l.list_type, options, depth, &mut lines)?;
            Ok(lines.join("\n"))
        }
        NodeKind::CodeBlock(cb) => {
            let pre_class = if cb.classes.is_empty() {
                String::new()
            } else {
                format!(" class=\"{}\"", cb.classes.join(" "))
            };
            let code_class = match &cb.language {
                Some(lang) => format!(" class=\"language-{lang}\""),
                None => String::new(),
            };
            Ok(format!(
                "<pre{pre_class}><code{code_class}>{}</code></pre>",
                escape(&cb.literal)
            ))
        }
        NodeKind::BlockQuote { .. } => {
            let mut parts = Vec::new();
            for child in node.children() {
                parts.push(render_block(child, options, depth)?);
            }
            Ok(format!("<blockquote>\n{}\n</blockquote>", parts.join("\n\n")))
        }
        NodeKind::Rule => Ok("<hr />".to_string()),
        NodeKind::Image(img) => Ok(render_image(&img, &plain_text(node))),
        NodeKind::IDLink(def) => render_footnote(node, &def.marker, options),
        NodeKind::Table(t) => render_table(node, &t),
        NodeKind::Detail(d) => render_detail(node, &d, options),
        // Inline-only kinds never appear as direct document/mini-document
        // children; rendering one here would mean a block dispatcher
        // mis-routed it. Fall back to its inline rendering rather than
        // panicking.
        _ => {
            let mut inline = String::new();
            render_inline(node, &mut inline)?;
            Ok(inline)
        }
    }
}

fn render_inline_children<'a>(node: &'a AstNode<'a>, out: &mut String) -> Result<()> {
    for child in node.children() {
        render_inline(child, out)?;
    }
    Ok(())
}

fn render_inline<'a>(node: &'a AstNode<'a>, out: &mut String) -> Result<()> {
    let kind = node.data.borrow().kind.clone();
    match kind {
        NodeKind::Text(s) => out.push_str(&escape(&s)),
        NodeKind::SoftBreak => out.push('\n'),
        NodeKind::Code(s) => {
            out.push_str("<code>");
            out.push_str(&escape(&s));
            out.push_str("</code>");
        }
        NodeKind::Monospace(s) => {
            out.push_str("<samp>");
            out.push_str(&escape(&s));
            out.push_str("</samp>");
        }
        NodeKind::Styled(style) => {
            let tags = style.tags();
            for t in &tags {
                out.push('<');
                out.push_str(t);
                out.push('>');
            }
            render_inline_children(node, out)?;
            for t in tags.iter().rev() {
                out.push_str("</");
                out.push_str(t);
                out.push('>');
            }
        }
        NodeKind::Group => {
            out.push('(');
            render_inline_children(node, out)?;
            out.push(')');
        }
        NodeKind::Editorial => {
            out.push_str("<span class=\"editorial\">");
            render_inline_children(node, out)?;
            out.push_str("</span>");
        }
        NodeKind::FootnoteRef(marker) => {
            out.push_str("<sup><a href=\"#footnote-");
            out.push_str(&escape(&marker));
            out.push_str("\">[");
            out.push_str(&escape(&marker));
            out.push_str("]</a></sup>");
        }
        NodeKind::Link(link) => {
            out.push_str("<a href=\"");
            out.push_str(&escape(link.url.as_deref().unwrap_or("")));
            out.push('"');
            if let Some(title) = &link.title {
                out.push_str(" title=\"");
                out.push_str(&escape(title));
                out.push('"');
            }
            out.push('>');
            render_inline_children(node, out)?;
            out.push_str("</a>");
        }
        NodeKind::Image(img) => out.push_str(&render_image(&img, &plain_text(node))),
        // Block kinds should never occur inside inline content; render
        // nothing rather than recursing into block layout.
        _ => {}
    }
    Ok(())
}

/// Plain-text rendering of `node`'s inline descendants, for attributes
/// (like `alt`) that cannot carry markup.
fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    collect_plain_text(node, &mut out);
    out
}

fn collect_plain_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    for child in node.children() {
        match &child.data.borrow().kind {
            NodeKind::Text(s) | NodeKind::Code(s) | NodeKind::Monospace(s) => out.push_str(s),
            NodeKind::SoftBreak => out.push(' '),
            NodeKind::FootnoteRef(_) => {}
            _ => collect_plain_text(child, out),
        }
    }
}

fn render_image(img: &crate::nodes::NodeImage, alt: &str) -> String {
    let mut tag = format!("<img src=\"{}\" alt=\"{}\"", escape(&img.url), escape(alt));
    if let Some(title) = &img.title {
        tag.push_str(&format!(" title=\"{}\"", escape(title)));
    }
    tag.push_str(" />");
    if let Some(url) = &img.link_url {
        format!("<a href=\"{}\">{tag}</a>", escape(url))
    } else {
        tag
    }
}

fn render_list<'a>(
    list_node: &'a AstNode<'a>,
    list_type: ListType,
    options: &Options,
    depth: usize,
    lines: &mut Vec<String>,
) -> Result<()> {
    let indent = "    ".repeat(depth);
    let tag = if list_type == ListType::Bullet { "ul" } else { "ol" };
    lines.push(format!("{indent}<{tag}>"));
    for item in list_node.children() {
        render_list_item(item, options, depth, lines)?;
    }
    lines.push(format!("{indent}</{tag}>"));
    Ok(())
}

fn render_list_item<'a>(
    item: &'a AstNode<'a>,
    options: &Options,
    depth: usize,
    lines: &mut Vec<String>,
) -> Result<()> {
    let indent = "    ".repeat(depth);
    let mut inline = String::new();
    let mut nested = Vec::new();
    let mut other_blocks = Vec::new();
    for child in item.children() {
        match &child.data.borrow().kind {
            NodeKind::List(l) => nested.push((child, l.list_type)),
            NodeKind::CodeBlock(_) | NodeKind::Image(_) => {
                other_blocks.push(render_block(child, options, depth + 1)?)
            }
            _ => render_inline(child, &mut inline)?,
        }
    }
    lines.push(format!("{indent}<li>{inline}</li>"));
    for block in other_blocks {
        lines.push(block);
    }
    for (nested_list, list_type) in nested {
        render_list(nested_list, list_type, options, depth + 1, lines)?;
    }
    Ok(())
}

fn render_footnote<'a>(node: &'a AstNode<'a>, marker: &str, options: &Options) -> Result<String> {
    let escaped_marker = escape(marker);
    // A single-paragraph body renders unwrapped (spec.md §8 scenario 2);
    // anything richer renders as its normal block sequence.
    let mut only_child = None;
    let mut count = 0;
    for child in node.children() {
        count += 1;
        only_child = Some(child);
    }
    let body = if count == 1 {
        let child = only_child.expect("count == 1");
        if matches!(child.data.borrow().kind, NodeKind::Paragraph) {
            let mut inline = String::new();
            render_inline_children(child, &mut inline)?;
            inline
        } else {
            render_block(child, options, 0)?
        }
    } else {
        let mut parts = Vec::new();
        for child in node.children() {
            parts.push(render_block(child, options, 0)?);
        }
        parts.join("\n\n")
    };
    Ok(format!(
        "<div class=\"footnote\" id=\"footnote-{escaped_marker}\"><sup>{escaped_marker}</sup>{body}</div>"
    ))
}

fn render_detail<'a>(
    node: &'a AstNode<'a>,
    detail: &crate::nodes::NodeDetail,
    options: &Options,
) -> Result<String> {
    let mut children: Vec<&'a AstNode<'a>> = node.children().collect();
    let summary_children = children.drain(..detail.summary_child_count.min(children.len()));
    let mut summary = String::new();
    for child in summary_children {
        render_inline(child, &mut summary)?;
    }
    let mut body_parts = Vec::new();
    for child in children {
        body_parts.push(render_block(child, options, 0)?);
    }
    let body = body_parts.join("\n\n");
    if detail.summary_child_count > 0 {
        Ok(format!("<details><summary>{summary}</summary>{body}</details>"))
    } else {
        Ok(format!("<details>{body}</details>"))
    }
}

fn render_table<'a>(node: &'a AstNode<'a>, t: &crate::nodes::NodeTable) -> Result<String> {
    let mut rows: Vec<(TableSection, u32, Vec<&'a AstNode<'a>>)> = Vec::new();
    for cell in node.children() {
        let (section, row) = match &cell.data.borrow().kind {
            NodeKind::Cell(c) => (c.section, c.row),
            _ => continue,
        };
        match rows.last_mut() {
            Some((s, r, cells)) if *s == section && *r == row => cells.push(cell),
            _ => rows.push((section, row, vec![cell])),
        }
    }

    let mut header = String::new();
    let mut body = String::new();
    let mut footer = String::new();
    for (section, _, cells) in &rows {
        let row_html = render_table_row(cells, *section)?;
        match section {
            TableSection::Header => header.push_str(&row_html),
            TableSection::Body => body.push_str(&row_html),
            TableSection::Footer => footer.push_str(&row_html),
        }
    }

    let mut attrs = String::new();
    if let Some(id) = &t.id {
        attrs.push_str(&format!(" id=\"{}\"", escape(id)));
    }
    if let Some(class) = &t.class {
        attrs.push_str(&format!(" class=\"{}\"", escape(class)));
    }

    let mut out = String::from("<div><table");
    out.push_str(&attrs);
    out.push('>');
    if let Some(caption) = &t.caption {
        out.push_str(&format!("<caption>{}</caption>", escape(caption)));
    }
    if !header.is_empty() {
        out.push_str(&format!("<thead>{header}</thead>"));
    }
    out.push_str(&format!("<tbody>{body}</tbody>"));
    if !footer.is_empty() {
        out.push_str(&format!("<tfoot>{footer}</tfoot>"));
    }
    out.push_str("</table></div>");
    Ok(out)
}

fn render_table_row<'a>(cells: &[&'a AstNode<'a>], section: TableSection) -> Result<String> {
    let tag = if section == TableSection::Header { "th" } else { "td" };
    let mut out = String::from("<tr>");
    for cell in cells {
        let (rowspan, colspan) = match &cell.data.borrow().kind {
            NodeKind::Cell(c) => (c.rowspan, c.colspan),
            _ => (1, 1),
        };
        let mut classes = Vec::new();
        if rowspan > 1 {
            classes.push("merged_rows");
        }
        if colspan > 1 {
            classes.push("merged_cols");
        }
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", classes.join(" "))
        };
        let rowspan_attr = if rowspan > 1 { format!(" rowspan=\"{rowspan}\"") } else { String::new() };
        let colspan_attr = if colspan > 1 { format!(" colspan=\"{colspan}\"") } else { String::new() };
        let mut inline = String::new();
        render_inline_children(*cell, &mut inline)?;
        out.push_str(&format!("<{tag}{class_attr}{rowspan_attr}{colspan_attr}>{inline}</{tag}>"));
    }
    out.push_str("</tr>");
    Ok(out)
}
