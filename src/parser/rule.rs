//! Thematic break (spec.md §4.6).

use super::ParseContext;
use crate::error::Result;
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeKind};
use crate::scanners;

pub(crate) fn detect(stream: &LineStream) -> bool {
    scanners::thematic_break(stream.current())
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    stream.consume();
    let mut ast = Ast::new(NodeKind::Rule, start);
    ast.end_line = start;
    ast.final_ = true;
    Ok(ctx.alloc(ast))
}
