//! Collapsible detail blocks (spec.md §4.12). Nested detail blocks are
//! rejected simply by the body's mini-document reparse never including
//! `Detail` in its allowed set — see [`super::MINIDOC_BLOCKS`].

use super::{inlines, parse_minidoc, ParseContext, MINIDOC_BLOCKS};
use crate::error::Result;
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeDetail, NodeKind};
use crate::scanners;
use crate::strings;

pub(crate) fn detect(stream: &LineStream) -> bool {
    scanners::detail_summary(stream.current()).is_some()
        || scanners::detail_body(stream.current()).is_some()
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    let summary_text = scanners::detail_summary(stream.current()).map(|t| t.trim().to_string());
    if summary_text.is_some() {
        stream.consume();
    }

    let mut body_lines = Vec::new();
    loop {
        if stream.at_end() || strings::is_blank(stream.current()) {
            break;
        }
        match scanners::detail_body(stream.current()) {
            Some(text) => {
                body_lines.push(text.to_string());
                stream.consume();
            }
            None => break,
        }
    }
    let end = stream.line_number().saturating_sub(1).max(start);

    let summary_children = match &summary_text {
        Some(text) => inlines::format(ctx, text, start)?,
        None => Vec::new(),
    };
    let summary_child_count = summary_children.len();
    let body_children = parse_minidoc(ctx, &body_lines, MINIDOC_BLOCKS, start)?;

    let mut ast = Ast::new(NodeKind::Detail(NodeDetail { summary_child_count }), start);
    ast.end_line = end;
    ast.final_ = true;
    let node = ctx.alloc(ast);
    for child in summary_children {
        node.append(child);
    }
    for child in body_children {
        node.append(child);
    }
    Ok(node)
}
