//! Link and footnote definitions (spec.md §4.9): `[marker]: text…` at
//! column 0, continuation lines aligned under the definition.

use super::{parse_minidoc, ParseContext, MINIDOC_BLOCKS};
use crate::error::Result;
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeIDLink, NodeKind};
use crate::strings;

fn marker_frame(line: &str) -> Option<(String, usize)> {
    if !line.starts_with('[') {
        return None;
    }
    let close = line.find(']')?;
    let after = line.get(close + 1..)?;
    if let Some(rest) = after.strip_prefix(": ") {
        let _ = rest;
        Some((line[1..close].to_string(), close + 3))
    } else if after == ":" {
        Some((line[1..close].to_string(), close + 2))
    } else {
        None
    }
}

pub(crate) fn detect(stream: &LineStream) -> bool {
    marker_frame(stream.current()).is_some()
}

fn continuation_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    let first = stream.consume();
    let (marker, offset) = marker_frame(&first).expect("checked by detect");
    let is_footnote = marker.starts_with('^');
    let mut body_lines = vec![first[offset.min(first.len())..].to_string()];

    loop {
        if stream.at_end() {
            break;
        }
        let line = stream.current();
        if strings::is_blank(line) {
            body_lines.push(stream.consume());
            continue;
        }
        if continuation_indent(line) >= offset {
            let consumed = stream.consume();
            body_lines.push(consumed[offset.min(consumed.len())..].to_string());
        } else {
            break;
        }
    }
    strings::trim_trailing_blank_lines(&mut body_lines);
    let body = body_lines.join("\n");
    let end = stream.line_number().saturating_sub(1).max(start);

    if is_footnote {
        let fn_marker = marker.trim_start_matches('^').to_string();
        ctx.registry.borrow_mut().take_referrers(&marker);
        let children = parse_minidoc(ctx, &body_lines, MINIDOC_BLOCKS, start)?;
        let mut ast = Ast::new(
            NodeKind::IDLink(NodeIDLink {
                is_footnote: true,
                marker: fn_marker,
                body,
            }),
            start,
        );
        ast.end_line = end;
        ast.final_ = true;
        let node = ctx.alloc(ast);
        for child in children {
            node.append(child);
        }
        Ok(node)
    } else {
        let body_trimmed = body.trim().to_string();
        let referrers = ctx.registry.borrow_mut().take_referrers(&marker);
        for r in &referrers {
            {
                let mut data = r.data.borrow_mut();
                match data.kind {
                    NodeKind::Link(ref mut link) => {
                        link.url = Some(body_trimmed.clone());
                        link.resolved = true;
                    }
                    NodeKind::Image(ref mut img) => {
                        img.link_url = Some(body_trimmed.clone());
                    }
                    _ => {}
                }
                data.final_ = true;
            }
            substitute_placeholder(r, &body_trimmed);
        }
        let mut ast = Ast::new(
            NodeKind::IDLink(NodeIDLink {
                is_footnote: false,
                marker,
                body: body_trimmed,
            }),
            start,
        );
        ast.end_line = end;
        ast.final_ = true;
        Ok(ctx.alloc(ast))
    }
}

/// The `%s` placeholder described in spec.md §4.9: if a referrer's own link
/// text literally contains it, the resolved URL is substituted in; most
/// referrers have no placeholder and are left untouched.
fn substitute_placeholder<'a>(node: &'a AstNode<'a>, url: &str) {
    for child in node.children() {
        let mut data = child.data.borrow_mut();
        if let NodeKind::Text(ref mut s) = data.kind {
            if s.contains("%s") {
                *s = s.replace("%s", url);
            }
        }
    }
}
