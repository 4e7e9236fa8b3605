//! Source locations and content references for diagnostics.
//!
//! A [`Location`] is an immutable snapshot of where the parser or generator is
//! (or was, when the current token started) inside its document. Locations are
//! built on demand for error reporting and for the `current_location` /
//! `current_token_location` queries; they are never mutated after creation.

use std::{fmt, path::PathBuf, sync::Arc};

/// Upper bound on how much raw source a [`ContentRef`] will quote back in an
/// error message.
pub const MAX_CONTENT_SNIPPET: usize = 500;

/// A diagnostics-safe description of where input comes from or output goes to.
///
/// The variants deliberately avoid holding live handles; a content reference
/// is only ever used for error messages and must stay valid after the
/// underlying source is consumed or closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    /// In-memory text; holds a bounded snippet of the head of the document.
    Text(Arc<str>),
    /// In-memory bytes (snippet withheld; bytes may not be valid UTF-8).
    Bytes,
    /// A file opened by the factory.
    File(PathBuf),
    /// A caller-supplied reader or writer.
    Stream,
    /// Source withheld, either unknown or redacted by configuration.
    Unknown,
}

impl ContentRef {
    /// Builds a text reference, truncating the retained snippet to
    /// [`MAX_CONTENT_SNIPPET`] characters.
    #[must_use]
    pub fn for_text(text: &str) -> Self {
        let snippet: String = text.chars().take(MAX_CONTENT_SNIPPET).collect();
        ContentRef::Text(snippet.into())
    }

    /// A redacted copy of `self`, used when `include_source_in_location` is
    /// disabled.
    #[must_use]
    pub fn redacted(&self) -> Self {
        ContentRef::Unknown
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRef::Text(snippet) => {
                write!(f, "(String)\"{snippet}\"")
            }
            ContentRef::Bytes => f.write_str("(bytes)"),
            ContentRef::File(path) => write!(f, "(File){}", path.display()),
            ContentRef::Stream => f.write_str("(Stream)"),
            ContentRef::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// An immutable snapshot of a position within a document.
///
/// Lines and columns are 1-based. Byte offsets count encoded input bytes;
/// char offsets count Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Offset in bytes from the start of the document.
    pub byte_offset: u64,
    /// Offset in Unicode scalar values from the start of the document.
    pub char_offset: u64,
    /// 1-based line number.
    pub line: u64,
    /// 1-based column number.
    pub column: u64,
    /// Description of the source or sink.
    pub content: ContentRef,
}

impl Location {
    /// A location that reveals nothing; used before any input is seen or when
    /// source inclusion is disabled.
    #[must_use]
    pub fn unknown() -> Self {
        Location {
            byte_offset: 0,
            char_offset: 0,
            line: 1,
            column: 1,
            content: ContentRef::Unknown,
        }
    }

    pub(crate) fn new(
        content: ContentRef,
        byte_offset: u64,
        char_offset: u64,
        line: u64,
        column: u64,
    ) -> Self {
        Location {
            byte_offset,
            char_offset,
            line,
            column,
            content,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Source: {}; line: {}, column: {}]",
            self.content, self.line, self.column
        )
    }
}
