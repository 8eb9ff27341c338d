//! Configuration accepted at [`crate::Document::parse`].

/// Parse-time configuration. Constructed with [`Options::default`] and
/// adjusted with the fluent `with_*` setters; mirrors spec.md §6's
/// `Document(text, first_header_is_title?, header_sizes?, links?)`
/// constructor signature.
#[derive(Debug, Clone)]
pub struct Options {
    /// When set, the first heading encountered is promoted to level 1
    /// regardless of its underline style, and its plain-text rendering
    /// becomes the document title (spec.md §4.2).
    pub first_header_is_title: bool,

    /// The HTML heading level for each of StoneMark's four heading ranks.
    /// Defaults to `(1, 2, 3, 4)`. A three-element source (the backwards
    /// compatible form from spec.md §9's Open Question) is accepted via
    /// [`Options::with_header_sizes_3`], which repeats the third element
    /// for level 4.
    pub header_sizes: [u8; 4],

    /// Maximum block nesting depth before a `BadFormat` guard trips
    /// (spec.md §9: "guard against pathological inputs with a configurable
    /// maximum depth").
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            first_header_is_title: false,
            header_sizes: [1, 2, 3, 4],
            max_depth: 64,
        }
    }
}

impl Options {
    pub fn with_first_header_is_title(mut self, value: bool) -> Self {
        self.first_header_is_title = value;
        self
    }

    pub fn with_header_sizes(mut self, sizes: [u8; 4]) -> Self {
        self.header_sizes = sizes;
        self
    }

    /// Accepts the three-tuple alias: level 4 repeats the level-3 size.
    pub fn with_header_sizes_3(mut self, sizes: [u8; 3]) -> Self {
        self.header_sizes = [sizes[0], sizes[1], sizes[2], sizes[2]];
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_tuple_repeats_third_for_level_four() {
        let opts = Options::default().with_header_sizes_3([2, 3, 4]);
        assert_eq!(opts.header_sizes, [2, 3, 4, 4]);
    }
}
