//! Error taxonomy for parsing, generation, coercion, I/O and configuration.
//!
//! All failures surface synchronously at the call site as a [`JsonError`]: a
//! tagged kind plus an optional [`Location`] and an optional redacted payload
//! copy for downstream diagnostics. Nothing is retried internally; after a
//! syntax or generation error the instance should only be closed.

use std::fmt;

use thiserror::Error;

use crate::{base64::Base64Error, location::Location};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, JsonError>;

/// Low-level lexical and structural failures detected while tokenizing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    /// A character that cannot start or continue the expected construct.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    /// A raw control character inside a string literal.
    #[error("illegal unquoted control character (code {0:#x}) in string value")]
    UnescapedControlChar(u32),
    /// A backslash escape outside the JSON repertoire.
    #[error("unrecognized character escape '\\{0}'")]
    InvalidEscape(char),
    /// A non-hex character inside a `\uXXXX` escape.
    #[error("invalid hex digit '{0}' in unicode escape")]
    InvalidUnicodeEscapeChar(char),
    /// A `\uXXXX` pair that does not form a valid Unicode scalar value.
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeEscapeSequence(u32),
    /// Malformed number literal.
    #[error("malformed number: {0}")]
    MalformedNumber(&'static str),
    /// `]` closing an object, `}` closing an array, or a close with no open
    /// container.
    #[error("mismatched close: expected {expected}, got '{got}'")]
    StructuralMismatch {
        /// Human-readable description of the legal closer.
        expected: &'static str,
        /// The closer actually seen.
        got: char,
    },
    /// A comma, colon, or value in a position the grammar forbids.
    #[error("{0}")]
    UnexpectedToken(&'static str),
    /// Input ended inside a token or an unclosed container.
    #[error("unexpected end of input{0}")]
    UnexpectedEndOfInput(&'static str),
    /// Same member name twice in one object, under strict duplicate detection.
    #[error("duplicate field name \"{0}\"")]
    DuplicateField(String),
    /// Byte sequence that is not valid in the detected encoding.
    #[error("invalid {encoding} input: {detail}")]
    InvalidEncoding {
        /// Name of the encoding being decoded.
        encoding: &'static str,
        /// What was wrong.
        detail: &'static str,
    },
}

/// The tagged error kind carried by every [`JsonError`].
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed input; fatal to the current document.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// Illegal generator call sequence or strict-mode violation.
    #[error("generation error: {0}")]
    Generation(String),
    /// A numeric value requested in a narrower type than it fits.
    #[error("coercion error: {0}")]
    Coercion(String),
    /// Underlying source/sink failure, passed through unreinterpreted.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// An unsupported capability was requested of this backend.
    #[error("configuration error: {0}")]
    Config(String),
    /// Base64 content failure while decoding a binary scalar.
    #[error("base64 error: {0}")]
    Base64(#[from] Base64Error),
    /// Hash-collision defense tripped in the symbol table.
    #[error("symbol table collision limit ({0}) exceeded; possible DoS attack")]
    CollisionLimit(usize),
}

/// An error from any jsonwire operation.
#[derive(Debug)]
pub struct JsonError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong, when a parser/generator position is meaningful.
    pub location: Option<Location>,
    /// Optional redacted copy of the offending input, attached by the caller
    /// for diagnostics after the source has been consumed.
    pub payload: Option<String>,
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        if let Some(loc) = &self.location {
            write!(f, "\n at {loc}")?;
        }
        Ok(())
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl JsonError {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        JsonError {
            kind,
            location: None,
            payload: None,
        }
    }

    pub(crate) fn syntax(err: SyntaxError, location: Location) -> Self {
        JsonError {
            kind: ErrorKind::Syntax(err),
            location: Some(location),
            payload: None,
        }
    }

    pub(crate) fn generation(msg: impl Into<String>) -> Self {
        JsonError::new(ErrorKind::Generation(msg.into()))
    }

    pub(crate) fn coercion(msg: impl Into<String>, location: Option<Location>) -> Self {
        JsonError {
            kind: ErrorKind::Coercion(msg.into()),
            location,
            payload: None,
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        JsonError::new(ErrorKind::Config(msg.into()))
    }

    /// Attaches a (caller-redacted) copy of the offending input.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// `true` when this is a syntax/parse error.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self.kind, ErrorKind::Syntax(_))
    }

    /// `true` when this is a coercion/overflow error.
    #[must_use]
    pub fn is_coercion(&self) -> bool {
        matches!(self.kind, ErrorKind::Coercion(_))
    }

    /// `true` when this is an I/O passthrough.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io(_))
    }
}

impl From<std::io::Error> for JsonError {
    fn from(err: std::io::Error) -> Self {
        JsonError::new(ErrorKind::Io(err))
    }
}

impl From<Base64Error> for JsonError {
    fn from(err: Base64Error) -> Self {
        JsonError::new(ErrorKind::Base64(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::ContentRef;

    #[test]
    fn syntax_error_displays_location() {
        let loc = Location::new(ContentRef::for_text("{]"), 1, 1, 1, 2);
        let err = JsonError::syntax(
            SyntaxError::StructuralMismatch {
                expected: "'}'",
                got: ']',
            },
            loc,
        );
        let text = err.to_string();
        assert!(text.contains("mismatched close"), "{text}");
        assert!(text.contains("line: 1, column: 2"), "{text}");
        assert!(err.is_syntax());
    }

    #[test]
    fn payload_attachment_round_trips() {
        let err = JsonError::generation("boom").with_payload("[redacted]");
        assert_eq!(err.payload.as_deref(), Some("[redacted]"));
    }

    #[test]
    fn io_errors_pass_through() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: JsonError = io.into();
        assert!(err.is_io());
        assert!(err.location.is_none());
    }
}
