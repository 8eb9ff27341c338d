//! Document-owned map from reference marker to its referring inline nodes.
//!
//! Grounded on the teacher's `RefMap` (`parser/mod.rs`): a `FxHashMap` keyed
//! by marker string. Unlike CommonMark's link reference map, resolution here
//! is push-based rather than pull-based: a definition's `finalize` looks up
//! its marker and rewrites every referrer directly (spec.md §3.4), rather
//! than referrers looking themselves up at render time.

use crate::nodes::AstNode;
use crate::strings::normalize_marker;
use rustc_hash::FxHashMap;

/// Tracks every inline reference still waiting on a definition, plus every
/// marker that *was* resolved (so a late duplicate definition can still be
/// detected if needed).
pub struct LinkRegistry<'a> {
    pending: FxHashMap<String, Vec<&'a AstNode<'a>>>,
}

impl<'a> LinkRegistry<'a> {
    pub fn new() -> Self {
        LinkRegistry {
            pending: FxHashMap::default(),
        }
    }

    /// Record that `node` refers to `marker` and has not yet been resolved.
    /// The marker is normalized before indexing, so `[a  b]` and `[a b]`
    /// refer to the same definition.
    pub fn register(&mut self, marker: &str, node: &'a AstNode<'a>) {
        self.pending
            .entry(normalize_marker(marker))
            .or_default()
            .push(node);
    }

    /// Remove and return every referrer registered under `marker`, for a
    /// definition to resolve as it finalizes. Returns an empty `Vec` if no
    /// inline reference ever registered under this marker.
    pub fn take_referrers(&mut self, marker: &str) -> Vec<&'a AstNode<'a>> {
        self.pending.remove(&normalize_marker(marker)).unwrap_or_default()
    }

    /// Markers with at least one referrer that was never resolved by a
    /// definition; surfaced as `MissingLink` at HTML emission time (spec.md
    /// §7: "raised at serialization time").
    pub fn unresolved_markers(&self) -> impl Iterator<Item = &str> {
        self.pending.keys().map(String::as_str)
    }

    /// The marker and source line of the earliest-occurring unresolved
    /// referrer, for the `MissingLink` diagnostic. Deterministic regardless
    /// of the map's iteration order.
    pub fn first_unresolved(&self) -> Option<(String, u32)> {
        self.pending
            .iter()
            .filter_map(|(marker, nodes)| {
                nodes
                    .first()
                    .map(|n| (marker.clone(), n.data.borrow().start_line))
            })
            .min_by_key(|(_, line)| *line)
    }
}

impl<'a> Default for LinkRegistry<'a> {
    fn default() -> Self {
        Self::new()
    }
}
