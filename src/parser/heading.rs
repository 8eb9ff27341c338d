//! The framed level-1 heading form (spec.md §4.2): a line of `=` characters,
//! a single title line, and a closing line of `=` characters. The setext
//! (text-then-underline) forms for levels 2-4 are handled by
//! [`super::paragraph`], which reclassifies itself into a heading on
//! `CONCLUDE`.

use super::{inlines, ParseContext};
use crate::error::{Result, StoneMarkError};
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeHeading, NodeKind};
use crate::scanners;

pub(crate) fn detect(stream: &LineStream) -> bool {
    scanners::top_heading_frame(stream.current())
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    stream.consume();
    if stream.at_end() {
        return Err(StoneMarkError::bad_format(start, "unterminated top-level heading"));
    }
    let title_line = stream.consume();
    if stream.at_end() {
        return Err(StoneMarkError::bad_format(start, "unterminated top-level heading"));
    }
    let closing = stream.current();
    match scanners::heading_underline(closing) {
        Some((b'=', len)) if len >= 3 => {
            stream.consume();
        }
        Some((_, len)) if len < 3 => {
            return Err(StoneMarkError::bad_format(
                stream.line_number(),
                "heading underline must be at least three characters",
            ));
        }
        Some(_) => {
            return Err(StoneMarkError::bad_format(
                stream.line_number(),
                "top-level headings must end with = characters",
            ));
        }
        None => {
            return Err(StoneMarkError::bad_format(
                stream.line_number(),
                "top-level headings must end with = characters",
            ));
        }
    }

    let is_title = ctx.options.first_header_is_title && !ctx.seen_heading.get();
    if is_title {
        ctx.seen_heading.set(true);
        *ctx.title.borrow_mut() = Some(title_line.trim().to_string());
    }
    build(ctx, start, stream.line_number().saturating_sub(1).max(start), 1, is_title, &title_line)
}

/// Shared by both heading forms: runs the inline formatter over the title
/// text and allocates the `Heading` node.
pub(crate) fn build<'a>(
    ctx: &ParseContext<'a>,
    start: u32,
    end: u32,
    level: u8,
    is_title: bool,
    text: &str,
) -> Result<&'a AstNode<'a>> {
    let mut ast = Ast::new(NodeKind::Heading(NodeHeading { level, is_title }), start);
    ast.end_line = end;
    ast.final_ = true;
    let node = ctx.alloc(ast);
    for child in inlines::format(ctx, text.trim(), start)? {
        node.append(child);
    }
    Ok(node)
}
