//! Bullet and ordered lists (spec.md §4.4).

use super::{inlines, parse_minidoc, ParseContext, LISTITEM_BLOCKS};
use crate::error::{Result, StoneMarkError};
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, ListType, NodeKind, NodeList};
use crate::scanners;
use crate::strings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Bullet(u8),
    Ordered(u8),
}

impl Marker {
    fn same_type(&self, other: &Marker) -> bool {
        self == other
    }
}

fn read_marker(line: &str) -> Option<(Marker, usize)> {
    if let Some((ch, off)) = scanners::bullet_marker(line) {
        return Some((Marker::Bullet(ch), off));
    }
    if let Some((_, delim, off)) = scanners::ordered_marker(line) {
        return Some((Marker::Ordered(delim), off));
    }
    None
}

pub(crate) fn detect(stream: &LineStream) -> bool {
    read_marker(stream.current()).is_some()
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    let (marker, _) = read_marker(stream.current()).expect("checked by detect");
    let (list_type, delimiter) = match marker {
        Marker::Bullet(c) => (ListType::Bullet, c),
        Marker::Ordered(c) => (ListType::Ordered, c),
    };
    let list_start = match scanners::ordered_marker(stream.current()) {
        Some((n, _, _)) => n,
        None => 1,
    };

    let mut items = Vec::new();
    loop {
        items.push(parse_item(ctx, stream, marker)?);

        let mut blank_seen = false;
        while !stream.at_end() && strings::is_blank(stream.current()) {
            stream.consume();
            blank_seen = true;
        }
        if stream.at_end() {
            break;
        }
        match read_marker(stream.current()) {
            Some((next, _)) if next.same_type(&marker) => continue,
            Some(_) if !blank_seen => {
                return Err(StoneMarkError::bad_format(
                    stream.line_number(),
                    "list marker changed without an intervening blank line",
                ));
            }
            _ => break,
        }
    }

    let end = stream.line_number().saturating_sub(1).max(start);
    let mut ast = Ast::new(
        NodeKind::List(NodeList {
            list_type,
            delimiter,
            start: list_start,
        }),
        start,
    );
    ast.end_line = end;
    ast.final_ = true;
    let node = ctx.alloc(ast);
    for item in items {
        node.append(item);
    }
    Ok(node)
}

fn parse_item<'a>(
    ctx: &ParseContext<'a>,
    stream: &mut LineStream,
    marker: Marker,
) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    let first_line = stream.consume();
    let (found, offset) = read_marker(&first_line).expect("matched by caller");
    debug_assert!(found.same_type(&marker));
    let mut raw = vec![first_line[offset.min(first_line.len())..].to_string()];

    loop {
        if stream.at_end() {
            break;
        }
        if strings::is_blank(stream.current()) {
            let after = stream.peek_next();
            let after_indent = after.len() - after.trim_start_matches(' ').len();
            if !strings::is_blank(after) && after_indent >= offset {
                raw.push(String::new());
                stream.consume();
                continue;
            }
            break;
        }
        let line = stream.current();
        let indent = line.len() - line.trim_start_matches(' ').len();
        if indent >= offset {
            let consumed = stream.consume();
            raw.push(consumed[offset.min(consumed.len())..].to_string());
        } else {
            break;
        }
    }

    let end = stream.line_number().saturating_sub(1).max(start);

    // An item's own running text (spec.md §4.4: "contain paragraphs, nested
    // lists, code blocks, and images") is not itself a block kind —
    // `LISTITEM_BLOCKS` has no `Paragraph` — so it's inline-formatted
    // straight onto the `ListItem` as `Text` children, and only the
    // remainder (once a line opens a nested list, code block, or image) is
    // handed to the mini-doc reparse.
    let split_at = raw
        .iter()
        .position(|line| strings::is_blank(line) || starts_sub_block(line))
        .unwrap_or(raw.len());
    let (text_lines, rest) = raw.split_at(split_at);

    let mut ast = Ast::new(NodeKind::ListItem, start);
    ast.end_line = end;
    ast.final_ = true;
    let node = ctx.alloc(ast);

    if let Some((first, remaining)) = text_lines.split_first() {
        let mut text = first.clone();
        for line in remaining {
            text = strings::join_paragraph_lines(&text, line);
        }
        for child in inlines::format(ctx, &text, start)? {
            node.append(child);
        }
    }

    let blank_skip = rest.iter().take_while(|line| strings::is_blank(line)).count();
    let block_lines = &rest[blank_skip..];
    if !block_lines.is_empty() {
        let base_line = start + (split_at + blank_skip) as u32;
        let children = parse_minidoc(ctx, block_lines, LISTITEM_BLOCKS, base_line)?;
        for child in children {
            node.append(child);
        }
    }

    Ok(node)
}

/// Whether `line` opens one of `LISTITEM_BLOCKS` on its own, checked against
/// a single-line stream since these detectors only ever look at the current
/// line.
fn starts_sub_block(line: &str) -> bool {
    let stream = LineStream::new(line);
    LISTITEM_BLOCKS.iter().any(|kind| super::detect(&stream, *kind))
}
