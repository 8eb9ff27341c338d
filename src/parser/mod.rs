//! The block parser: dispatches each line run to one of the block kinds in
//! spec.md §4, builds the tree, and drives link resolution.

pub mod inlines;
pub mod options;

mod blockquote;
mod codeblock;
mod detail;
mod heading;
mod idlink;
mod image;
mod list;
mod paragraph;
mod rule;
mod table;

pub use options::Options;

use crate::error::{Result, StoneMarkError};
use crate::linestream::LineStream;
use crate::linkregistry::LinkRegistry;
use crate::nodes::{Ast, AstNode, NodeKind};
use std::cell::{Cell, RefCell};
use typed_arena::Arena;

/// The block kinds a container may open, tried in this priority order —
/// mirrors the `allowed children` column of spec.md §4.1's block-kind table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Detail,
    CodeBlock,
    Table,
    Heading,
    List,
    Rule,
    IDLink,
    Image,
    BlockQuote,
    Paragraph,
}

pub(crate) const DOCUMENT_BLOCKS: &[BlockKind] = &[
    BlockKind::Detail,
    BlockKind::CodeBlock,
    BlockKind::Table,
    BlockKind::Heading,
    BlockKind::List,
    BlockKind::Rule,
    BlockKind::IDLink,
    BlockKind::Image,
    BlockKind::BlockQuote,
    BlockKind::Paragraph,
];

/// Allowed inside an `IDLink` footnote body or a `Detail` body (spec.md
/// §4.9, §4.12): the same textual content as a document, minus headings,
/// rules, block quotes, tables, and nested definitions.
pub(crate) const MINIDOC_BLOCKS: &[BlockKind] = &[
    BlockKind::CodeBlock,
    BlockKind::List,
    BlockKind::Image,
    BlockKind::Paragraph,
];

/// Allowed directly inside a `ListItem` (spec.md §3.2's invariant: "a
/// ListItem may contain Text, List, CodeBlock, Image"). Notably excludes
/// `Paragraph` — a list item's running text is collected straight onto the
/// item as `Text` children rather than wrapped in a `Paragraph` block; see
/// [`list`].
pub(crate) const LISTITEM_BLOCKS: &[BlockKind] =
    &[BlockKind::CodeBlock, BlockKind::Image, BlockKind::List];

/// State threaded through every block and inline call for one `parse`
/// invocation: the arena nodes are allocated from, the link registry, and
/// the nesting-depth guard (spec.md §9).
pub(crate) struct ParseContext<'a> {
    pub arena: &'a Arena<AstNode<'a>>,
    pub registry: RefCell<LinkRegistry<'a>>,
    pub options: Options,
    depth: Cell<usize>,
    pub seen_heading: Cell<bool>,
    pub title: RefCell<Option<String>>,
}

impl<'a> ParseContext<'a> {
    pub fn new(arena: &'a Arena<AstNode<'a>>, options: Options) -> Self {
        ParseContext {
            arena,
            registry: RefCell::new(LinkRegistry::new()),
            options,
            depth: Cell::new(0),
            seen_heading: Cell::new(false),
            title: RefCell::new(None),
        }
    }

    pub fn alloc(&self, ast: Ast) -> &'a AstNode<'a> {
        self.arena.alloc(AstNode::new(RefCell::new(ast)))
    }

    fn enter(&self, line: u32) -> Result<()> {
        let depth = self.depth.get() + 1;
        if depth > self.options.max_depth {
            return Err(StoneMarkError::bad_format(
                line,
                "maximum block nesting depth exceeded",
            ));
        }
        self.depth.set(depth);
        Ok(())
    }

    fn exit(&self) {
        self.depth.set(self.depth.get() - 1);
    }
}

/// Parse a run of sibling blocks from `stream`, restricted to `allowed`,
/// until the stream runs dry. The single engine behind top-level document
/// parsing and every mini-document reparse (spec.md GLOSSARY).
pub(crate) fn parse_blocks<'a>(
    ctx: &ParseContext<'a>,
    stream: &mut LineStream,
    allowed: &[BlockKind],
) -> Result<Vec<&'a AstNode<'a>>> {
    ctx.enter(stream.line_number())?;
    let result = parse_blocks_inner(ctx, stream, allowed);
    ctx.exit();
    result
}

fn parse_blocks_inner<'a>(
    ctx: &ParseContext<'a>,
    stream: &mut LineStream,
    allowed: &[BlockKind],
) -> Result<Vec<&'a AstNode<'a>>> {
    let mut out = Vec::new();
    loop {
        stream.skip_blank_lines();
        if stream.at_end() {
            break;
        }
        let kind = *allowed.iter().find(|k| detect(stream, **k)).ok_or_else(|| {
            StoneMarkError::bad_format(
                stream.line_number(),
                format!("line does not start a recognized block: {:?}", stream.current()),
            )
        })?;
        let node = dispatch(ctx, stream, kind)?;
        // External link definitions resolve their referrers and are then
        // discarded (spec.md §3.3's `finalize` → `keep`); footnote
        // definitions are retained.
        let discard = matches!(&node.data.borrow().kind, NodeKind::IDLink(link) if !link.is_footnote);
        if !discard {
            out.push(node);
        }
    }
    Ok(out)
}

pub(crate) fn detect(stream: &LineStream, kind: BlockKind) -> bool {
    match kind {
        BlockKind::Detail => detail::detect(stream),
        BlockKind::CodeBlock => codeblock::detect(stream),
        BlockKind::Table => table::detect(stream),
        BlockKind::Heading => heading::detect(stream),
        BlockKind::List => list::detect(stream),
        BlockKind::Rule => rule::detect(stream),
        BlockKind::IDLink => idlink::detect(stream),
        BlockKind::Image => image::detect(stream),
        BlockKind::BlockQuote => blockquote::detect(stream),
        BlockKind::Paragraph => paragraph::detect(stream),
    }
}

pub(crate) fn dispatch<'a>(
    ctx: &ParseContext<'a>,
    stream: &mut LineStream,
    kind: BlockKind,
) -> Result<&'a AstNode<'a>> {
    match kind {
        BlockKind::Detail => detail::parse(ctx, stream),
        BlockKind::CodeBlock => codeblock::parse(ctx, stream),
        BlockKind::Table => table::parse(ctx, stream),
        BlockKind::Heading => heading::parse(ctx, stream),
        BlockKind::List => list::parse(ctx, stream),
        BlockKind::Rule => rule::parse(ctx, stream),
        BlockKind::IDLink => idlink::parse(ctx, stream),
        BlockKind::Image => image::parse(ctx, stream),
        BlockKind::BlockQuote => blockquote::parse(ctx, stream),
        BlockKind::Paragraph => paragraph::parse(ctx, stream),
    }
}

/// Reparse a block's collected interior lines as a mini-document, returning
/// its top-level children directly rather than a wrapping node. `base_line`
/// is the 1-origin document line number of `lines[0]`, so errors raised
/// during the reparse still point at the right place in the original text.
pub(crate) fn parse_minidoc<'a>(
    ctx: &ParseContext<'a>,
    lines: &[String],
    allowed: &[BlockKind],
    base_line: u32,
) -> Result<Vec<&'a AstNode<'a>>> {
    let joined = lines.join("\n");
    let mut stream = LineStream::new_at(&joined, base_line.saturating_sub(1));
    parse_blocks(ctx, &mut stream, allowed)
}

/// Parse the whole document: the top-level entry point called from
/// [`crate::Document::parse`].
pub(crate) fn parse_document<'a>(
    ctx: &ParseContext<'a>,
    text: &str,
) -> Result<&'a AstNode<'a>> {
    let root = ctx.alloc(Ast::new(NodeKind::Document, 1));
    let mut stream = LineStream::new(text);
    let children = parse_blocks(ctx, &mut stream, DOCUMENT_BLOCKS)?;
    for child in children {
        root.append(child);
    }
    root.data.borrow_mut().end_line = stream.line_number().saturating_sub(1).max(1);
    root.data.borrow_mut().final_ = true;
    Ok(root)
}
