//! Error types for featherfeed.
//!
//! Structural and per-post failures abort the whole parse: a missing landmark
//! usually means the upstream markup changed, and partial output would hide
//! that. Embedded-resource failures are handled locally and never surface
//! through these types.

/// Error type for timeline parsing and feed generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required structural landmark is missing from the document
    /// (no timeline container, no profile block, unexpected post layout).
    #[error("document structure: {0}")]
    Structure(String),

    /// A field of an otherwise structurally sound post could not be
    /// extracted. Carries the post id or index for diagnostics.
    #[error("post {post}: {reason}")]
    Field { post: String, reason: String },

    /// A timestamp string matched none of the recognized forms.
    #[error("unrecognized timestamp {0:?}")]
    Format(String),

    /// The fetch collaborator failed to retrieve a resource.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Feed serialization or latest-id recovery failed.
    #[error("feed: {0}")]
    Feed(String),

    /// Underlying I/O failure (cache files, feed files).
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::Structure`] with a formatted message.
    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        Error::Structure(msg.into())
    }

    /// Shorthand for an [`Error::Field`] attributed to a post id or index.
    pub(crate) fn field(post: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Field {
            post: post.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for parsing and feed operations.
pub type Result<T> = std::result::Result<T, Error>;
