//! The StoneMark AST.
//!
//! A document is a tree of [`Ast`] values held in [`crate::arena_tree::Node`]s,
//! allocated from a single [`typed_arena::Arena`] owned by the [`Document`].
//! Every node carries its [`NodeKind`] plus the line span it occupied in the
//! source and whether it has finished parsing (see spec.md §3.3's lifecycle:
//! creation, mutation, finalization).

use crate::arena_tree::Node;
use smallvec::SmallVec;
use std::cell::RefCell;

/// An AST node, living inside an arena. See [`crate::arena_tree`].
pub type AstNode<'a> = Node<'a, RefCell<Ast>>;

/// The data held by every node, regardless of kind.
#[derive(Debug, Clone)]
pub struct Ast {
    pub kind: NodeKind,
    pub start_line: u32,
    pub end_line: u32,
    /// Raw, not-yet-block-parsed lines collected during the `SAME`/`CHILD`
    /// phase. Cleared once `finalize` runs; spec.md §3.1 describes children
    /// as "either further Nodes or raw line strings during intermediate
    /// parsing".
    pub pending_lines: Vec<String>,
    pub final_: bool,
}

impl Ast {
    pub fn new(kind: NodeKind, start_line: u32) -> Self {
        Ast {
            kind,
            start_line,
            end_line: start_line,
            pending_lines: Vec::new(),
            final_: false,
        }
    }
}

/// The tag every node carries, with its kind-specific fields (spec.md §3.1).
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The root of every document. Contains the top-level block sequence.
    Document,

    Heading(NodeHeading),

    /// Accumulates text lines until a blank line, another block's start, or
    /// a heading underline reclassifies it (spec.md §4.3).
    Paragraph,

    List(NodeList),

    /// Contains `Text`, `List`, `CodeBlock`, or `Image` children, reparsed
    /// as a mini-document from its raw collected lines.
    ListItem,

    CodeBlock(NodeCodeBlock),

    /// Nesting level is the run length of leading `>` (spec.md §4.7).
    BlockQuote { level: u8 },

    /// A thematic break; no children, no fields.
    Rule,

    Image(NodeImage),

    /// An external link or footnote definition (spec.md §4.9). Discarded
    /// from the tree after resolving its referrers unless it is a footnote,
    /// in which case it is retained and rendered.
    IDLink(NodeIDLink),

    /// An inline link reference, resolved either immediately (`(url)` form)
    /// or later via the link registry (`[marker]` form).
    Link(NodeLink),

    /// Leaf text content, produced by the inline formatter.
    Text(String),

    Table(NodeTable),

    Cell(NodeCell),

    /// A `-->`/`--|` collapsible block, reparsed as a mini-document.
    Detail(NodeDetail),

    // --- inline-only kinds ---
    /// A balanced style span: bold, italic, underline, highlight, strike,
    /// subscript, superscript, or some union of these (spec.md §4.10).
    Styled(StyleKind),

    /// A code span (`` `…` ``); content is not itself inline-formatted.
    Code(String),

    /// A monospace span (`` ``…`` ``).
    Monospace(String),

    /// A `[^marker]` footnote reference.
    FootnoteRef(String),

    /// A `(…)` grouped span; content is reformatted inline.
    Group,

    /// A `[[…]]` editorial span; content is reformatted inline.
    Editorial,

    /// A soft line break inside inline content.
    SoftBreak,
}

/// One or more of the balanced style markers, combined (e.g. `***` is bold
/// and italic together).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleKind {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub highlight: bool,
    pub strike: bool,
    pub subscript: bool,
    pub superscript: bool,
}

impl StyleKind {
    pub const BOLD: StyleKind = StyleKind { bold: true, ..EMPTY };
    pub const ITALIC: StyleKind = StyleKind { italic: true, ..EMPTY };
    pub const BOLD_ITALIC: StyleKind = StyleKind {
        bold: true,
        italic: true,
        ..EMPTY
    };
    pub const UNDERLINE: StyleKind = StyleKind { underline: true, ..EMPTY };
    pub const HIGHLIGHT: StyleKind = StyleKind { highlight: true, ..EMPTY };
    pub const STRIKE: StyleKind = StyleKind { strike: true, ..EMPTY };
    pub const SUBSCRIPT: StyleKind = StyleKind { subscript: true, ..EMPTY };
    pub const SUPERSCRIPT: StyleKind = StyleKind {
        superscript: true,
        ..EMPTY
    };

    /// The HTML tags to wrap content in, outermost first. At most seven
    /// markers can combine, so a stack-allocated buffer covers every case.
    pub fn tags(&self) -> SmallVec<[&'static str; 7]> {
        let mut tags = SmallVec::new();
        if self.bold {
            tags.push("strong");
        }
        if self.italic {
            tags.push("em");
        }
        if self.underline {
            tags.push("u");
        }
        if self.highlight {
            tags.push("mark");
        }
        if self.strike {
            tags.push("del");
        }
        if self.subscript {
            tags.push("sub");
        }
        if self.superscript {
            tags.push("sup");
        }
        tags
    }
}

const EMPTY: StyleKind = StyleKind {
    bold: false,
    italic: false,
    underline: false,
    highlight: false,
    strike: false,
    subscript: false,
    superscript: false,
};

/// No separate `Summary` kind exists (spec.md §3.1 enumerates the complete
/// kind-tag set and doesn't list one), so a `Detail` node's children are
/// flat: the first `summary_child_count` are the summary's inline nodes,
/// the rest are the body's block nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeDetail {
    pub summary_child_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone)]
pub struct NodeHeading {
    pub level: u8,
    /// Set once, on the first heading, when `first_header_is_title` is on.
    pub is_title: bool,
}

#[derive(Debug, Clone)]
pub struct NodeList {
    pub list_type: ListType,
    /// `-`, `+`, `*` for bullets; `.` or `)` for ordered lists.
    pub delimiter: u8,
    pub start: usize,
}

#[derive(Debug, Clone, Default)]
pub struct NodeCodeBlock {
    pub fenced: bool,
    pub language: Option<String>,
    pub classes: Vec<String>,
    pub literal: String,
}

#[derive(Debug, Clone, Default)]
pub struct NodeImage {
    pub url: String,
    pub title: Option<String>,
    pub alt: String,
    /// Set when this image is wrapped in a link (the direct or referenced
    /// forms in spec.md §4.8).
    pub link_url: Option<String>,
    pub link_marker: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NodeIDLink {
    /// `true` when the marker begins with `^` (a footnote definition).
    pub is_footnote: bool,
    pub marker: String,
    /// The raw body lines, before the `%s` substitution or mini-document
    /// reparse described in spec.md §4.9.
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct NodeLink {
    pub marker: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSection {
    Header,
    Body,
    Footer,
}

#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    pub caption: Option<String>,
    pub class: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NodeCell {
    pub section: TableSection,
    pub rowspan: u32,
    pub colspan: u32,
    /// 0-origin row index within the table, used to group cells into
    /// `<tr>` elements at render time — there is no separate `Row` node
    /// kind (spec.md §3.1 lists `Cell` as the only table-interior kind).
    pub row: u32,
}

impl Default for NodeCell {
    fn default() -> Self {
        NodeCell {
            section: TableSection::Body,
            rowspan: 1,
            colspan: 1,
            row: 0,
        }
    }
}
