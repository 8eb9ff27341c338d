//! Tables (spec.md §4.11). There is no Python precedent for this block kind
//! in the captured original (see SPEC_FULL.md's supplement note); the shape
//! here is grounded directly on spec.md's description, reusing the
//! teacher's `row()`/`unescape_pipes()` cell-splitting approach (lifted into
//! [`crate::scanners::split_table_row`]).

use super::{inlines, ParseContext};
use crate::error::{Result, StoneMarkError};
use crate::linestream::LineStream;
use crate::nodes::{Ast, AstNode, NodeCell, NodeKind, NodeTable, TableSection};
use crate::scanners;
use rustc_hash::FxHashMap;

pub(crate) fn detect(stream: &LineStream) -> bool {
    scanners::table_start(stream.current())
}

fn parse_caption_line(line: &str) -> Option<(String, Option<String>, Option<String>)> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("|[")?;
    let close = rest.find("]|")?;
    let caption = rest[..close].trim().to_string();
    let attrs = rest[close + 2..].trim();
    let mut class = None;
    let mut id = None;
    for tok in attrs.split_whitespace() {
        if let Some(c) = tok.strip_prefix('.') {
            class = Some(c.to_string());
        } else if let Some(i) = tok.strip_prefix('#') {
            id = Some(i.to_string());
        }
    }
    Some((caption, class, id))
}

pub(crate) fn parse<'a>(ctx: &ParseContext<'a>, stream: &mut LineStream) -> Result<&'a AstNode<'a>> {
    let start = stream.line_number();
    let mut caption = None;
    let mut class = None;
    let mut id = None;
    if let Some((c, cl, i)) = parse_caption_line(stream.current()) {
        caption = Some(c);
        class = cl;
        id = i;
        stream.consume();
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    while !stream.at_end() && scanners::table_start(stream.current()) {
        rows.push(scanners::split_table_row(&stream.consume()));
    }
    let end = stream.line_number().saturating_sub(1).max(start);

    if rows.is_empty() {
        return Err(StoneMarkError::bad_format(start, "a table must have at least one row"));
    }

    let separator_positions: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, cells)| scanners::is_separator_row(cells))
        .map(|(i, _)| i)
        .collect();

    let mut expected_cols: Option<usize> = None;
    for (i, cells) in rows.iter().enumerate() {
        if separator_positions.contains(&i) {
            continue;
        }
        let cols = cells.len();
        match expected_cols {
            None => expected_cols = Some(cols),
            Some(n) if n != cols => {
                return Err(StoneMarkError::bad_format(
                    start + i as u32,
                    format!("table row has {cols} cells, expected {n}"),
                ));
            }
            _ => {}
        }
    }

    let mut ast = Ast::new(NodeKind::Table(NodeTable { caption, class, id }), start);
    ast.end_line = end;
    ast.final_ = true;
    let node = ctx.alloc(ast);

    let section_of = |row_idx: usize| -> TableSection {
        match separator_positions.len() {
            0 => TableSection::Body,
            1 => {
                if row_idx < separator_positions[0] {
                    TableSection::Header
                } else {
                    TableSection::Body
                }
            }
            _ => {
                if row_idx < separator_positions[0] {
                    TableSection::Header
                } else if row_idx < separator_positions[1] {
                    TableSection::Body
                } else {
                    TableSection::Footer
                }
            }
        }
    };

    let mut column_anchors: FxHashMap<usize, &'a AstNode<'a>> = FxHashMap::default();
    let mut current_section = None;
    let mut out_row = 0u32;
    for (row_idx, cells) in rows.iter().enumerate() {
        if separator_positions.contains(&row_idx) {
            column_anchors.clear();
            continue;
        }
        let section = section_of(row_idx);
        if Some(section) != current_section {
            column_anchors.clear();
            current_section = Some(section);
        }

        let mut last_in_row: Option<&'a AstNode<'a>> = None;
        for (col, raw) in cells.iter().enumerate() {
            if raw.is_empty() {
                let prev = last_in_row.ok_or_else(|| {
                    StoneMarkError::bad_format(
                        start + row_idx as u32,
                        "table cell cannot merge right at the start of a row",
                    )
                })?;
                if let NodeKind::Cell(ref mut c) = prev.data.borrow_mut().kind {
                    c.colspan += 1;
                }
                continue;
            }
            if let Some(text) = raw.strip_suffix("\\/") {
                if let Some(anchor) = column_anchors.get(&col) {
                    if let NodeKind::Cell(ref mut c) = anchor.data.borrow_mut().kind {
                        c.rowspan += 1;
                    }
                    continue;
                }
                let cell = build_cell(ctx, section, out_row, text.trim(), start + row_idx as u32)?;
                node.append(cell);
                column_anchors.insert(col, cell);
                last_in_row = Some(cell);
                continue;
            }
            let cell = build_cell(ctx, section, out_row, raw, start + row_idx as u32)?;
            node.append(cell);
            column_anchors.insert(col, cell);
            last_in_row = Some(cell);
        }
        out_row += 1;
    }

    Ok(node)
}

fn build_cell<'a>(
    ctx: &ParseContext<'a>,
    section: TableSection,
    row: u32,
    text: &str,
    line: u32,
) -> Result<&'a AstNode<'a>> {
    let mut ast = Ast::new(
        NodeKind::Cell(NodeCell {
            section,
            rowspan: 1,
            colspan: 1,
            row,
        }),
        line,
    );
    ast.end_line = line;
    ast.final_ = true;
    let node = ctx.alloc(ast);
    for child in inlines::format(ctx, text, line)? {
        node.append(child);
    }
    Ok(node)
}
