//! Parser configuration.

/// Options controlling how much post-processing the parser applies to each
/// post's content fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Resolve embedded resources (quoted posts, photo pages) by fetching the
    /// linked pages and inlining their content. Failures are logged and the
    /// original link is left in place.
    pub embeds: bool,
    /// Strip presentational attributes and inline SVG after rewriting, leaving
    /// a minimal fragment.
    pub simplify: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            embeds: true,
            simplify: true,
        }
    }
}
