/// Deepest conditional (or parenthesis) nesting accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for a single parse.
///
/// ```
/// use condlate::ParserOptions;
///
/// let options = ParserOptions::new().with_safety(true).with_max_depth(8);
/// assert!(options.safety);
/// assert_eq!(options.max_depth, 8);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ParserOptions {
    /// Resolve absent variables and embedded tags to `false` instead of
    /// passing them through as text.
    pub safety: bool,
    /// Maximum nesting of `{if}` blocks, and of parentheses inside a single
    /// condition, before the parse fails with `NestingTooDeep`.
    pub max_depth: usize,
}

impl ParserOptions {
    pub const fn new() -> Self {
        Self {
            safety: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub const fn with_safety(mut self, safety: bool) -> Self {
        self.safety = safety;
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::new()
    }
}
