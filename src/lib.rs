//! StoneMark: a strict, line-oriented markup parser and HTML formatter.
//!
//! The caller owns a [`typed_arena::Arena`] and parses into it with
//! [`Document::parse`]; every node in the resulting tree borrows from that
//! arena, mirroring the teacher's comrak API (the caller, not the library,
//! owns allocation lifetime).

mod arena_tree;
mod ctype;
mod error;
mod html;
mod linestream;
mod linkregistry;
mod nodes;
mod parser;
mod scanners;
mod strings;

pub use error::{ErrorKind, Result, StoneMarkError};
pub use nodes::{AstNode, ListType, NodeKind, StyleKind, TableSection};
pub use parser::Options;

use typed_arena::Arena;

/// A parsed document: its root node plus the configuration it was parsed
/// with, kept around so [`Document::to_html`] can re-derive heading sizes
/// and so on without the caller threading `Options` through every call.
pub struct Document<'a> {
    root: &'a AstNode<'a>,
    options: Options,
    title: Option<String>,
    first_unresolved: Option<(String, u32)>,
}

impl<'a> Document<'a> {
    /// Parse `text` into `arena`, applying `options`. Parsing never fails on
    /// an unresolved link or footnote reference — see spec.md §7: that
    /// diagnostic is only raised when the document is actually serialized,
    /// so a document with stray references can still be inspected as a
    /// tree.
    pub fn parse(arena: &'a Arena<AstNode<'a>>, text: &str, options: Options) -> Result<Self> {
        let ctx = parser::ParseContext::new(arena, options);
        let root = parser::parse_document(&ctx, text)?;
        let title = ctx.title.borrow().clone();
        let registry = ctx.registry.borrow();
        if log::log_enabled!(log::Level::Debug) {
            let pending: Vec<&str> = registry.unresolved_markers().collect();
            if !pending.is_empty() {
                log::debug!("unresolved markers after parse: {pending:?}");
            }
        }
        let first_unresolved = registry.first_unresolved();
        drop(registry);
        Ok(Document {
            root,
            options: ctx.options,
            title,
            first_unresolved,
        })
    }

    /// The root node of the tree, for callers that want to walk or inspect
    /// it directly rather than go straight to HTML.
    pub fn root(&self) -> &'a AstNode<'a> {
        self.root
    }

    /// The title captured from the first heading, when
    /// [`Options::first_header_is_title`] is set and the document has at
    /// least one heading.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Render the document body to an HTML fragment (spec.md §6). Fails
    /// with [`ErrorKind::MissingLink`] if any link or footnote reference
    /// was never resolved by a definition.
    pub fn to_html(&self) -> Result<String> {
        html::to_html(self.root, &self.options, self.first_unresolved.clone())
    }

    /// Wrap [`Document::to_html`]'s fragment in a full HTML page: head,
    /// title, a fixed stylesheet, and body (spec.md §6's "write an HTML
    /// page" entry point).
    pub fn to_html_page(&self) -> Result<String> {
        let body = self.to_html()?;
        let title = self.title.as_deref().unwrap_or("");
        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            html_escape_title(title),
            DEFAULT_CSS,
            body
        ))
    }
}

fn html_escape_title(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

const DEFAULT_CSS: &str = "\
body { font-family: sans-serif; max-width: 40em; margin: 2em auto; }
pre, code, samp { font-family: monospace; }
pre { background: #f4f4f4; padding: 0.5em; overflow-x: auto; }
table { border-collapse: collapse; }
td, th { border: 1px solid #ccc; padding: 0.3em 0.6em; }
.footnote { font-size: 0.9em; border-top: 1px solid #ccc; margin-top: 1em; }
.editorial { color: #666; }
";
