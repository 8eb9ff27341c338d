//! The inline formatter (spec.md §4.10): turns the raw text of a block into
//! a tree of styled spans, code/monospace runs, links, footnote references,
//! and grouped spans.
//!
//! Grounded on the teacher's delimiter-stack approach (its own
//! `Delimiter`/`process_emphasis` pair) but simplified to a single
//! left-to-right scan over a frame stack: each open marker pushes a frame
//! that collects its children until a matching closer pops it. Re-opening
//! the same marker while it is already the innermost open frame just bumps
//! that frame's depth counter rather than nesting a second span, which is
//! how spec.md §4.10 describes balancing `**a **b** c**` into one bold run.

use super::ParseContext;
use crate::error::Result;
use crate::nodes::{Ast, AstNode, NodeKind, StyleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Style(StyleKindTag),
    Group,
    Editorial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StyleKindTag {
    BoldItalic,
    Bold,
    Italic,
    Underline,
    Highlight,
    Strike,
    Subscript,
    Superscript,
}

impl StyleKindTag {
    fn marker_len(self) -> usize {
        match self {
            StyleKindTag::BoldItalic => 3,
            StyleKindTag::Bold | StyleKindTag::Underline | StyleKindTag::Highlight | StyleKindTag::Strike => 2,
            StyleKindTag::Italic | StyleKindTag::Subscript | StyleKindTag::Superscript => 1,
        }
    }

    /// Whether this marker requires whitespace (or start/end of text) on
    /// the outside and non-whitespace on the inside to open/close.
    fn whitespace_gated(self) -> bool {
        !matches!(self, StyleKindTag::Subscript | StyleKindTag::Superscript)
    }

    fn style(self) -> StyleKind {
        match self {
            StyleKindTag::BoldItalic => StyleKind::BOLD_ITALIC,
            StyleKindTag::Bold => StyleKind::BOLD,
            StyleKindTag::Italic => StyleKind::ITALIC,
            StyleKindTag::Underline => StyleKind::UNDERLINE,
            StyleKindTag::Highlight => StyleKind::HIGHLIGHT,
            StyleKindTag::Strike => StyleKind::STRIKE,
            StyleKindTag::Subscript => StyleKind::SUBSCRIPT,
            StyleKindTag::Superscript => StyleKind::SUPERSCRIPT,
        }
    }

    fn marker_str(self) -> &'static str {
        match self {
            StyleKindTag::BoldItalic => "***",
            StyleKindTag::Bold => "**",
            StyleKindTag::Italic => "*",
            StyleKindTag::Underline => "__",
            StyleKindTag::Highlight => "==",
            StyleKindTag::Strike => "~~",
            StyleKindTag::Subscript => "~",
            StyleKindTag::Superscript => "^",
        }
    }
}

struct Frame<'a> {
    kind: FrameKind,
    children: Vec<&'a AstNode<'a>>,
    depth: u32,
}

struct Scanner<'a, 'c> {
    ctx: &'c ParseContext<'a>,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    root: Vec<&'a AstNode<'a>>,
    stack: Vec<Frame<'a>>,
    pending: String,
}

/// Inline-format `text` (already joined to a single logical line by the
/// block parser) into a sequence of inline nodes.
pub(crate) fn format<'a>(ctx: &ParseContext<'a>, text: &str, line: u32) -> Result<Vec<&'a AstNode<'a>>> {
    let mut scanner = Scanner {
        ctx,
        chars: text.chars().collect(),
        pos: 0,
        line,
        root: Vec::new(),
        stack: Vec::new(),
        pending: String::new(),
    };
    scanner.run();
    Ok(scanner.finish())
}

impl<'a, 'c> Scanner<'a, 'c> {
    fn run(&mut self) {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            match c {
                '\\' => self.escape(),
                '`' => self.backtick(),
                '*' | '_' | '=' | '~' | '^' => self.style_marker(c),
                '(' => self.open_simple(FrameKind::Group),
                ')' => self.close_simple(FrameKind::Group),
                '[' if self.peek(1) == Some('[') => self.open_double_bracket(),
                ']' if self.peek(1) == Some(']') => self.close_double_bracket(),
                '[' if self.peek(1) == Some('^') => self.footnote_ref(),
                '[' => self.link(),
                _ => {
                    self.pending.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn finish(mut self) -> Vec<&'a AstNode<'a>> {
        self.flush_text();
        while let Some(frame) = self.stack.pop() {
            // Unbalanced: fall back to the literal marker text around
            // whatever was collected, rather than dropping content.
            let marker = frame_marker_str(&frame.kind);
            self.push_literal_prefix(marker);
            for child in frame.children {
                self.push_to_top(child);
            }
        }
        self.root
    }

    fn push_literal_prefix(&mut self, marker: &str) {
        let node = self.ctx.alloc(Ast::new(NodeKind::Text(marker.to_string()), self.line));
        self.push_to_top(node);
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let node = self.ctx.alloc(Ast::new(NodeKind::Text(text), self.line));
        self.push_to_top(node);
    }

    fn push_to_top(&mut self, node: &'a AstNode<'a>) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.root.push(node),
        }
    }

    fn escape(&mut self) {
        self.pos += 1;
        if let Some(c) = self.peek(0) {
            self.pending.push(c);
            self.pos += 1;
        } else {
            self.pending.push('\\');
        }
    }

    /// Code spans (single backtick) and monospace runs (double backtick):
    /// content between is literal, never itself inline-formatted.
    fn backtick(&mut self) {
        let run = self.count_run('`');
        if run == 1 {
            self.literal_span(1, NodeKind::Code as fn(String) -> NodeKind);
        } else if run == 2 {
            self.literal_span(2, NodeKind::Monospace as fn(String) -> NodeKind);
        } else {
            self.flush_text();
            for _ in 0..run {
                self.pending.push('`');
            }
            self.pos += run;
        }
    }

    fn literal_span(&mut self, fence_len: usize, make: fn(String) -> NodeKind) {
        self.flush_text();
        let open_pos = self.pos;
        self.pos += fence_len;
        let content_start = self.pos;
        let mut end = None;
        while self.pos < self.chars.len() {
            if self.chars[self.pos] == '`' && self.count_run('`') == fence_len {
                end = Some(self.pos);
                break;
            }
            self.pos += 1;
        }
        match end {
            Some(close_pos) => {
                let content: String = self.chars[content_start..close_pos].iter().collect();
                self.pos = close_pos + fence_len;
                let node = self.ctx.alloc(Ast::new(make(content), self.line));
                self.push_to_top(node);
            }
            None => {
                // No closer anywhere in the text: treat the opener as literal
                // and resume scanning right after it.
                self.pos = open_pos + fence_len;
                for _ in 0..fence_len {
                    self.pending.push('`');
                }
            }
        }
    }

    fn count_run(&self, c: char) -> usize {
        let mut n = 0;
        while self.chars.get(self.pos + n) == Some(&c) {
            n += 1;
        }
        n
    }

    /// Whether a marker can open here (spec.md §4.10's whitespace
    /// discipline): the character right inside the marker (the first of the
    /// would-be content) must be non-whitespace, and the character right
    /// outside it must be whitespace, start-of-text, or itself one of the
    /// marker/punctuation characters the opener check skips over (`.,?!'"`
    /// and the style markers themselves) — so `word.**bold**` can open, but
    /// `word**bold**` (a letter directly outside) cannot.
    fn can_open(&self, tag: StyleKindTag) -> bool {
        if !tag.whitespace_gated() {
            return true;
        }
        match self.chars.get(self.pos + tag.marker_len()) {
            Some(c) if !c.is_whitespace() => {}
            _ => return false,
        }
        match self.pos.checked_sub(1).and_then(|i| self.chars.get(i)) {
            None => true,
            Some(c) => c.is_whitespace() || is_marker_or_punctuation(*c),
        }
    }

    /// The symmetric check for a closer: the character right inside (the
    /// last content character) must be non-whitespace, and the character
    /// right outside must be whitespace, end-of-text, or a marker/punctuation
    /// character.
    fn can_close_at(&self, tag: StyleKindTag) -> bool {
        if !tag.whitespace_gated() {
            return true;
        }
        match self.pos.checked_sub(1).and_then(|i| self.chars.get(i)) {
            Some(c) if !c.is_whitespace() => {}
            _ => return false,
        }
        match self.chars.get(self.pos + tag.marker_len()) {
            None => true,
            Some(c) => c.is_whitespace() || is_marker_or_punctuation(*c),
        }
    }

    fn style_marker(&mut self, c: char) {
        let run = self.count_run(c);
        let candidates = style_candidates(c);

        // Try closing the innermost frame first, if it matches this char's
        // family and the run is long enough to supply its marker.
        if let Some(frame) = self.stack.last() {
            if let FrameKind::Style(tag) = frame.kind {
                if candidates.iter().any(|t| *t == tag) && run >= tag.marker_len() && self.can_close_at(tag) {
                    self.close_style(tag);
                    return;
                }
            }
        }

        // Otherwise try to open with the longest marker this run can
        // support — a run maps to exactly one candidate, never a shorter
        // fallback, so a run that fails to open (e.g. `** x **`, blocked by
        // its interior space) falls straight through to literal text rather
        // than opening a shorter span out of the same characters.
        if let Some(&tag) = candidates.iter().find(|t| run >= t.marker_len()) {
            if self.can_open(tag) {
                self.open_style(tag);
                return;
            }
        }

        // Nothing applies: literal text.
        self.flush_text();
        for _ in 0..run {
            self.pending.push(c);
        }
        self.pos += run;
    }

    fn open_style(&mut self, tag: StyleKindTag) {
        self.flush_text();
        self.pos += tag.marker_len();
        if let Some(top) = self.stack.last_mut() {
            if top.kind == FrameKind::Style(tag) {
                top.depth += 1;
                return;
            }
        }
        self.stack.push(Frame {
            kind: FrameKind::Style(tag),
            children: Vec::new(),
            depth: 1,
        });
    }

    fn close_style(&mut self, tag: StyleKindTag) {
        self.flush_text();
        self.pos += tag.marker_len();
        let frame = self.stack.last_mut().expect("checked by caller");
        frame.depth -= 1;
        if frame.depth > 0 {
            return;
        }
        let frame = self.stack.pop().unwrap();
        let node = self.ctx.alloc(Ast::new(NodeKind::Styled(tag.style()), self.line));
        for child in frame.children {
            node.append(child);
        }
        self.push_to_top(node);
    }

    fn open_simple(&mut self, kind: FrameKind) {
        self.flush_text();
        self.pos += 1;
        self.stack.push(Frame {
            kind,
            children: Vec::new(),
            depth: 1,
        });
    }

    fn close_simple(&mut self, kind: FrameKind) {
        self.flush_text();
        match self.stack.last() {
            Some(frame) if frame.kind == kind => {
                self.pos += 1;
                let frame = self.stack.pop().unwrap();
                let node_kind = match kind {
                    FrameKind::Group => NodeKind::Group,
                    FrameKind::Editorial => NodeKind::Editorial,
                    FrameKind::Style(_) => unreachable!(),
                };
                let node = self.ctx.alloc(Ast::new(node_kind, self.line));
                for child in frame.children {
                    node.append(child);
                }
                self.push_to_top(node);
            }
            _ => {
                // Unmatched closer: literal.
                self.pending.push(')');
                self.pos += 1;
            }
        }
    }

    fn open_double_bracket(&mut self) {
        self.flush_text();
        self.pos += 2;
        self.stack.push(Frame {
            kind: FrameKind::Editorial,
            children: Vec::new(),
            depth: 1,
        });
    }

    fn close_double_bracket(&mut self) {
        match self.stack.last() {
            Some(frame) if frame.kind == FrameKind::Editorial => {
                self.flush_text();
                self.pos += 2;
                let frame = self.stack.pop().unwrap();
                let node = self.ctx.alloc(Ast::new(NodeKind::Editorial, self.line));
                for child in frame.children {
                    node.append(child);
                }
                self.push_to_top(node);
            }
            _ => {
                self.pending.push(']');
                self.pos += 1;
            }
        }
    }

    /// `[^marker]`: preceding spaces in the marker text are trimmed.
    fn footnote_ref(&mut self) {
        let start = self.pos;
        self.pos += 2; // "[^"
        let content_start = self.pos;
        while self.pos < self.chars.len() && self.chars[self.pos] != ']' {
            self.pos += 1;
        }
        if self.pos >= self.chars.len() {
            self.pos = start;
            self.pending.push('[');
            self.pos += 1;
            return;
        }
        let raw: String = self.chars[content_start..self.pos].iter().collect();
        self.pos += 1; // "]"
        let marker = raw.trim_start().to_string();
        self.flush_text();
        let node = self.ctx.alloc(Ast::new(NodeKind::FootnoteRef(marker.clone()), self.line));
        self.ctx.registry.borrow_mut().register(&format!("^{marker}"), node);
        self.push_to_top(node);
    }

    /// `[text]`, `[text][marker]`, `[text](url)`.
    fn link(&mut self) {
        let open = self.pos;
        match self.find_matching_bracket(open) {
            Some(label_end) => {
                let label: String = self.chars[open + 1..label_end].iter().collect();
                self.flush_text();
                let label_nodes = format_recursive(self.ctx, &label, self.line);
                let mut after = label_end + 1;
                let (url, title, marker, resolved) = if self.chars.get(after) == Some(&'(') {
                    let (u, t, next) = self.scan_paren_target(after);
                    after = next;
                    (Some(u), t, None, true)
                } else if self.chars.get(after) == Some(&'[') {
                    if let Some(marker_end) = self.find_matching_bracket(after) {
                        let m: String = self.chars[after + 1..marker_end].iter().collect();
                        after = marker_end + 1;
                        (None, None, Some(m), false)
                    } else {
                        (None, None, Some(label.clone()), false)
                    }
                } else {
                    (None, None, Some(label.trim().to_string()), false)
                };
                self.pos = after;
                let node = self.ctx.alloc(Ast::new(
                    NodeKind::Link(crate::nodes::NodeLink {
                        marker: marker.clone(),
                        url,
                        title,
                        resolved,
                    }),
                    self.line,
                ));
                for child in label_nodes {
                    node.append(child);
                }
                if !resolved {
                    if let Some(m) = &marker {
                        self.ctx.registry.borrow_mut().register(m, node);
                    }
                }
                self.push_to_top(node);
            }
            None => {
                self.pending.push('[');
                self.pos += 1;
            }
        }
    }

    /// Finds the index of the `]` matching the `[` at `open`, respecting
    /// nested brackets (needed so the label of a reference link can itself
    /// contain bracketed content).
    fn find_matching_bracket(&self, open: usize) -> Option<usize> {
        let mut depth = 0i32;
        let mut i = open;
        while i < self.chars.len() {
            match self.chars[i] {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Parses `(url "title")` starting at the `(` and returns
    /// `(url, title, index_past_close_paren)`.
    fn scan_paren_target(&self, open: usize) -> (String, Option<String>, usize) {
        let mut i = open + 1;
        let mut depth = 1i32;
        let start = i;
        let mut close = self.chars.len();
        while i < self.chars.len() {
            match self.chars[i] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = i;
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        let inner: String = self.chars[start..close].iter().collect();
        let inner = inner.trim();
        if let Some(q) = inner.find('"') {
            if let Some(end_q) = inner[q + 1..].rfind('"') {
                let url = inner[..q].trim().to_string();
                let title = inner[q + 1..q + 1 + end_q].to_string();
                return (url, Some(title), close + 1);
            }
        }
        (inner.to_string(), None, close + 1)
    }
}

fn frame_marker_str(kind: &FrameKind) -> &'static str {
    match kind {
        FrameKind::Style(tag) => tag.marker_str(),
        FrameKind::Group => "(",
        FrameKind::Editorial => "[[",
    }
}

fn style_candidates(c: char) -> Vec<StyleKindTag> {
    match c {
        '*' => vec![StyleKindTag::BoldItalic, StyleKindTag::Bold, StyleKindTag::Italic],
        '_' => vec![StyleKindTag::Underline],
        '=' => vec![StyleKindTag::Highlight],
        '~' => vec![StyleKindTag::Strike, StyleKindTag::Subscript],
        '^' => vec![StyleKindTag::Superscript],
        _ => Vec::new(),
    }
}

/// Punctuation and marker characters that don't block an opener/closer the
/// way an ordinary letter does (spec.md §4.10's whitespace discipline: the
/// boundary check "skips preceding marker runs and punctuation `.,?!'\"`").
fn is_marker_or_punctuation(c: char) -> bool {
    matches!(c, '*' | '_' | '=' | '~' | '^' | '.' | ',' | '?' | '!' | '\'' | '"')
}

/// Used for the text inside a link label, which is itself inline-formatted
/// (spec.md §4.10's link forms carry formatted text, not raw text).
fn format_recursive<'a>(ctx: &ParseContext<'a>, text: &str, line: u32) -> Vec<&'a AstNode<'a>> {
    format(ctx, text, line).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Options;
    use typed_arena::Arena;

    #[test]
    fn balances_repeated_bold_marker() {
        let arena = Arena::new();
        let ctx = ParseContext::new(&arena, Options::default());
        let nodes = format(&ctx, "**a **b** c**", 1).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(matches!(nodes[0].data.borrow().kind, NodeKind::Styled(s) if s.bold));
    }

    #[test]
    fn code_span_is_literal() {
        let arena = Arena::new();
        let ctx = ParseContext::new(&arena, Options::default());
        let nodes = format(&ctx, "`*not bold*`", 1).unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0].data.borrow().kind {
            NodeKind::Code(s) => assert_eq!(s, "*not bold*"),
            other => panic!("expected Code, got {other:?}"),
        }
    }

    #[test]
    fn escapes_marker_characters() {
        let arena = Arena::new();
        let ctx = ParseContext::new(&arena, Options::default());
        let nodes = format(&ctx, r"\*\*not bold\*\*", 1).unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0].data.borrow().kind {
            NodeKind::Text(s) => assert_eq!(s, "**not bold**"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn resolved_link_parses_url_and_title() {
        let arena = Arena::new();
        let ctx = ParseContext::new(&arena, Options::default());
        let nodes = format(&ctx, r#"[docs](http://example.com "Docs")"#, 1).unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0].data.borrow().kind {
            NodeKind::Link(link) => {
                assert_eq!(link.url.as_deref(), Some("http://example.com"));
                assert_eq!(link.title.as_deref(), Some("Docs"));
                assert!(link.resolved);
            }
            other => panic!("expected Link, got {other:?}"),
        }
    }

    #[test]
    fn bold_can_open_after_punctuation() {
        let arena = Arena::new();
        let ctx = ParseContext::new(&arena, Options::default());
        let nodes = format(&ctx, "word.**bold**", 1).unwrap();
        assert_eq!(nodes.len(), 2);
        match &nodes[0].data.borrow().kind {
            NodeKind::Text(s) => assert_eq!(s, "word."),
            other => panic!("expected Text, got {other:?}"),
        }
        assert!(matches!(nodes[1].data.borrow().kind, NodeKind::Styled(s) if s.bold));
    }

    #[test]
    fn bold_marker_with_interior_space_stays_literal() {
        let arena = Arena::new();
        let ctx = ParseContext::new(&arena, Options::default());
        let nodes = format(&ctx, "** x **", 1).unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0].data.borrow().kind {
            NodeKind::Text(s) => assert_eq!(s, "** x **"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn footnote_ref_trims_leading_space() {
        let arena = Arena::new();
        let ctx = ParseContext::new(&arena, Options::default());
        let nodes = format(&ctx, "a[^ n]", 1).unwrap();
        assert_eq!(nodes.len(), 2);
        match &nodes[1].data.borrow().kind {
            NodeKind::FootnoteRef(m) => assert_eq!(m, "n"),
            other => panic!("expected FootnoteRef, got {other:?}"),
        }
    }
}
