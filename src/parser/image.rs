//! Images (spec.md §4.8): a single-line block, in one of three forms —
//! bare, direct-linked, or reference-linked. Unlike its lookalike inline
//! link syntax, this is purely a block construct: there is no recursive
//! nesting to handle, so the matching here is done directly over the raw
//! line rather than through the inline [`super::inlines`] scanner.

use super::{inlines, ParseContext};
use crate::error::{Result, StoneMarkError};
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeImage, NodeKind};

pub(crate) fn detect(stream: &LineStream) -> bool {
    let t = stream.current().trim_start();
    t.starts_with("![") || t.starts_with("[![")
}

fn matching_close(chars: &[char], open_idx: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut i = open_idx;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

fn split_url_title(inner: &str) -> (String, Option<String>) {
    let inner = inner.trim();
    if let Some(pos) = inner.rfind(" \"") {
        if inner.ends_with('"') && inner.len() >= pos + 3 {
            let url = inner[..pos].trim().to_string();
            let title = inner[pos + 2..inner.len() - 1].to_string();
            return (url, Some(title));
        }
    }
    (inner.to_string(), None)
}

/// Parses `![alt](url "title")` starting at `bang_idx`, returning alt, url,
/// title, and the index of the closing `)`.
fn parse_core(chars: &[char], bang_idx: usize, line: u32) -> Result<(String, String, Option<String>, usize)> {
    if chars.get(bang_idx) != Some(&'!') || chars.get(bang_idx + 1) != Some(&'[') {
        return Err(StoneMarkError::bad_format(line, "expected `![` opening an image"));
    }
    let alt_close = matching_close(chars, bang_idx + 1, '[', ']')
        .ok_or_else(|| StoneMarkError::bad_format(line, "unterminated image alt text"))?;
    let alt: String = chars[bang_idx + 2..alt_close].iter().collect();
    if chars.get(alt_close + 1) != Some(&'(') {
        return Err(StoneMarkError::bad_format(line, "expected `(` after image alt text"));
    }
    let paren_close = matching_close(chars, alt_close + 1, '(', ')')
        .ok_or_else(|| StoneMarkError::bad_format(line, "unterminated image target"))?;
    let inner: String = chars[alt_close + 2..paren_close].iter().collect();
    let (url, title) = split_url_title(&inner);
    Ok((alt, url, title, paren_close))
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    let raw = stream.consume();
    let trimmed = raw.trim();
    let chars: Vec<char> = trimmed.chars().collect();

    let alt;
    let url;
    let title;
    let mut link_url = None;
    let mut link_marker = None;
    let end_idx;

    if chars.first() == Some(&'[') && chars.get(1) == Some(&'!') {
        let (a, u, t, core_end) = parse_core(&chars, 1, start)?;
        if chars.get(core_end + 1) != Some(&']') {
            return Err(StoneMarkError::bad_format(start, "expected `]` closing a linked image"));
        }
        let wrap_close = core_end + 1;
        match chars.get(wrap_close + 1) {
            Some('(') => {
                let paren_close = matching_close(&chars, wrap_close + 1, '(', ')')
                    .ok_or_else(|| StoneMarkError::bad_format(start, "unterminated image link target"))?;
                let inner: String = chars[wrap_close + 2..paren_close].iter().collect();
                alt = a;
                url = u;
                title = t;
                link_url = Some(inner.trim().to_string());
                end_idx = paren_close;
            }
            Some('[') => {
                let bracket_close = matching_close(&chars, wrap_close + 1, '[', ']')
                    .ok_or_else(|| StoneMarkError::bad_format(start, "unterminated image link marker"))?;
                let marker: String = chars[wrap_close + 2..bracket_close].iter().collect();
                alt = a;
                url = u;
                title = t;
                link_marker = Some(marker);
                end_idx = bracket_close;
            }
            _ => {
                return Err(StoneMarkError::bad_format(
                    start,
                    "a linked image must be followed by `(url)` or `[marker]`",
                ));
            }
        }
    } else {
        let (a, u, t, core_end) = parse_core(&chars, 0, start)?;
        alt = a;
        url = u;
        title = t;
        end_idx = core_end;
    }

    if end_idx + 1 != chars.len() {
        return Err(StoneMarkError::bad_format(start, "unexpected trailing content after image"));
    }

    let mut ast = Ast::new(
        NodeKind::Image(NodeImage {
            url,
            title,
            alt: alt.clone(),
            link_url,
            link_marker: link_marker.clone(),
        }),
        start,
    );
    ast.end_line = start;
    ast.final_ = true;
    let node = ctx.alloc(ast);
    for child in inlines::format(ctx, &alt, start)? {
        node.append(child);
    }

    if let Some(marker) = link_marker {
        ctx.registry.borrow_mut().register(&marker, node);
    }

    Ok(node)
}
