//! Fenced and indented code blocks (spec.md §4.5).

use super::ParseContext;
use crate::error::{Result, StoneMarkError};
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeCodeBlock, NodeKind};
use crate::scanners::{self, INDENTED_CODE_PREFIX};
use crate::strings;

pub(crate) fn detect(stream: &LineStream) -> bool {
    scanners::fence_open(stream.current()).is_some() || is_indented_line(stream.current())
}

fn is_indented_line(line: &str) -> bool {
    line.starts_with(INDENTED_CODE_PREFIX) && !strings::is_blank(line)
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    if let Some((_, fence_char, fence_len, rest)) = scanners::fence_open(stream.current()) {
        let (language, classes) = parse_attrs(start, rest)?;
        stream.consume();
        let mut literal_lines = Vec::new();
        loop {
            if stream.at_end() {
                return Err(StoneMarkError::bad_format(
                    start,
                    "unterminated fenced code block",
                ));
            }
            if scanners::fence_close(stream.current(), fence_char, fence_len) {
                stream.consume();
                break;
            }
            literal_lines.push(stream.consume());
        }
        let end = stream.line_number().saturating_sub(1).max(start);
        let mut ast = Ast::new(
            NodeKind::CodeBlock(NodeCodeBlock {
                fenced: true,
                language,
                classes,
                literal: literal_lines.join("\n"),
            }),
            start,
        );
        ast.end_line = end;
        ast.final_ = true;
        Ok(ctx.alloc(ast))
    } else {
        let mut lines = Vec::new();
        while !stream.at_end()
            && (is_indented_line(stream.current()) || strings::is_blank(stream.current()))
        {
            let line = stream.consume();
            lines.push(line.strip_prefix(INDENTED_CODE_PREFIX).unwrap_or("").to_string());
        }
        strings::trim_trailing_blank_lines(&mut lines);
        let end = start + lines.len().saturating_sub(1) as u32;
        let mut ast = Ast::new(
            NodeKind::CodeBlock(NodeCodeBlock {
                fenced: false,
                language: None,
                classes: Vec::new(),
                literal: lines.join("\n"),
            }),
            start,
        );
        ast.end_line = end.max(start);
        ast.final_ = true;
        Ok(ctx.alloc(ast))
    }
}

fn parse_attrs(line: u32, rest: &str) -> Result<(Option<String>, Vec<String>)> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok((None, Vec::new()));
    }
    if let Some(inner) = rest.strip_prefix('{') {
        let inner = inner.strip_suffix('}').ok_or_else(|| {
            StoneMarkError::bad_format(line, "mismatched braces in code fence attributes")
        })?;
        let mut tokens = inner.split_whitespace();
        let mut classes = Vec::new();
        for tok in tokens.by_ref() {
            let name = tok.strip_prefix('.').ok_or_else(|| {
                StoneMarkError::bad_format(
                    line,
                    format!("code fence attribute `{tok}` must start with `.`"),
                )
            })?;
            classes.push(name.to_string());
        }
        let language = classes.first().cloned();
        Ok((language, classes))
    } else if rest.chars().any(char::is_whitespace) {
        Err(StoneMarkError::bad_format(
            line,
            "whitespace is not allowed in a bare code fence language",
        ))
    } else {
        Ok((Some(rest.to_string()), Vec::new()))
    }
}
