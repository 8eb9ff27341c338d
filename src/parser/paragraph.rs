//! Paragraphs, and the setext heading reclassification they may undergo
//! (spec.md §4.3).

use super::{blockquote, codeblock, detail, heading, idlink, image, inlines, list, table, ParseContext};
use crate::error::{Result, StoneMarkError};
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeKind};
use crate::scanners;
use crate::strings;

pub(crate) fn detect(stream: &LineStream) -> bool {
    !strings::is_blank(stream.current())
}

/// Whether `stream.current()` starts some *other* block kind — used to end
/// a paragraph early, independent of which `allowed` list the caller is
/// using (a conservative superset is safe: ending the paragraph either way
/// either hands off correctly or surfaces the same "unrecognized content"
/// diagnostic one line later).
fn other_block_starts(stream: &LineStream) -> bool {
    codeblock::detect(stream)
        || list::detect(stream)
        || scanners::thematic_break(stream.current())
        || idlink::detect(stream)
        || blockquote::detect(stream)
        || table::detect(stream)
        || detail::detect(stream)
        || image::detect(stream)
        || heading::detect(stream)
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    let preceded_by_blank = stream
        .last_consumed()
        .map(strings::is_blank)
        .unwrap_or(true);

    let mut text = stream.consume();
    let mut line_count = 1usize;

    loop {
        if stream.at_end() || strings::is_blank(stream.current()) {
            break;
        }
        if let Some((ch, len)) = scanners::heading_underline(stream.current()) {
            if len >= 3 {
                if line_count == 1 && preceded_by_blank {
                    let underline_line = stream.line_number();
                    stream.consume();
                    let level = match ch {
                        b'=' => 2,
                        b'-' => 3,
                        b'.' => 4,
                        _ => unreachable!(),
                    };
                    let is_title = ctx.options.first_header_is_title && !ctx.seen_heading.get();
                    if is_title {
                        ctx.seen_heading.set(true);
                        *ctx.title.borrow_mut() = Some(text.trim().to_string());
                    }
                    return heading::build(
                        ctx,
                        start,
                        underline_line,
                        if is_title { 1 } else { level },
                        is_title,
                        &text,
                    );
                } else if ch == b'-' {
                    break;
                } else {
                    return Err(StoneMarkError::ambiguous_format(
                        stream.line_number(),
                        "this line could be a heading underline or a new block; add a blank line to disambiguate",
                    ));
                }
            }
        }
        if other_block_starts(stream) {
            break;
        }
        let next = stream.consume();
        text = strings::join_paragraph_lines(&text, &next);
        line_count += 1;
    }

    let end = start + line_count as u32 - 1;
    let mut ast = Ast::new(NodeKind::Paragraph, start);
    ast.end_line = end;
    ast.final_ = true;
    let node = ctx.alloc(ast);
    for child in inlines::format(ctx, &text, start)? {
        node.append(child);
    }
    Ok(node)
}
