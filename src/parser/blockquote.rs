//! Block quotes (spec.md §4.7). Nesting is handled by recursion: each call
//! strips exactly its own line's `>` run from every accumulated line, and
//! hands the remainder to a mini-document reparse — a line with a deeper
//! `>` run than this node's own still has leftover `>` characters after
//! stripping, which the reparse picks back up as a nested block quote.

use super::{parse_minidoc, ParseContext, DOCUMENT_BLOCKS};
use crate::error::Result;
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeKind};
use crate::scanners;
use crate::strings;

pub(crate) fn detect(stream: &LineStream) -> bool {
    scanners::blockquote_prefix(stream.current()).is_some()
}

fn strip_levels(line: &str, n: usize) -> Option<String> {
    let mut rest = line.trim_start_matches(' ');
    for _ in 0..n {
        rest = rest.strip_prefix('>')?;
        rest = rest.strip_prefix(' ').unwrap_or(rest);
    }
    Some(rest.to_string())
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    let (level, _) = scanners::blockquote_prefix(stream.current()).expect("checked by detect");

    let mut interior = Vec::new();
    loop {
        if stream.at_end() || strings::is_blank(stream.current()) {
            break;
        }
        match scanners::blockquote_prefix(stream.current()) {
            Some((count, _)) if count >= level => {
                let line = stream.consume();
                interior.push(strip_levels(&line, level).unwrap_or_default());
            }
            _ => break,
        }
    }

    let end = stream.line_number().saturating_sub(1).max(start);
    let children = parse_minidoc(ctx, &interior, DOCUMENT_BLOCKS, start)?;

    let mut ast = Ast::new(NodeKind::BlockQuote { level: level as u8 }, start);
    ast.end_line = end;
    ast.final_ = true;
    let node = ctx.alloc(ast);
    for child in children {
        node.append(child);
    }
    Ok(node)
}
