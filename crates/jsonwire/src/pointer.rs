//! JSON Pointer (RFC 6901) path expressions.
//!
//! A [`Pointer`] identifies a location within a document: a sequence of
//! segments, each carrying the raw member name and, when the name looks like a
//! non-negative integer without leading zeros, the parsed array index as well.
//! Pointers are immutable and cheap to clone and share.

use std::fmt;

/// One step of a pointer: a member name that may double as an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    name: String,
    index: Option<usize>,
}

impl Segment {
    fn new(name: String) -> Self {
        let index = parse_index(&name);
        Segment { name, index }
    }

    /// The raw (unescaped) member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The array index, when the name is numeric-looking.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

// RFC 6901 array indices: "0", or digits without a leading zero.
fn parse_index(name: &str) -> Option<usize> {
    if name.is_empty() || (name.len() > 1 && name.starts_with('0')) {
        return None;
    }
    // Cap parsed length so absurd inputs do not wrap.
    if name.len() > 10 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// An immutable JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pointer {
    segments: Vec<Segment>,
}

impl Pointer {
    /// The empty pointer, matching the whole document.
    #[must_use]
    pub fn empty() -> Self {
        Pointer::default()
    }

    /// Parses a pointer expression such as `/a/0/b`.
    ///
    /// The empty string is the empty pointer. Any other expression must start
    /// with `/`; `~1` unescapes to `/` and `~0` to `~`.
    ///
    /// # Errors
    ///
    /// Returns a description of the malformed expression.
    pub fn parse(expr: &str) -> Result<Self, String> {
        if expr.is_empty() {
            return Ok(Pointer::empty());
        }
        if !expr.starts_with('/') {
            return Err(format!(
                "invalid pointer expression {expr:?}: does not start with '/'"
            ));
        }
        let mut segments = Vec::new();
        for raw in expr[1..].split('/') {
            segments.push(Segment::new(unescape(raw)?));
        }
        Ok(Pointer { segments })
    }

    pub(crate) fn from_names(names: Vec<String>) -> Self {
        Pointer {
            segments: names.into_iter().map(Segment::new).collect(),
        }
    }

    /// `true` for the empty pointer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The first segment, if any.
    #[must_use]
    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Everything after the first segment.
    #[must_use]
    pub fn tail(&self) -> Pointer {
        Pointer {
            segments: self.segments.get(1..).unwrap_or_default().to_vec(),
        }
    }

    /// All segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the first segment matches the given member name.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.head().is_some_and(|s| s.name() == name)
    }

    /// Whether the first segment matches the given array index.
    #[must_use]
    pub fn matches_index(&self, index: usize) -> bool {
        self.head().is_some_and(|s| s.index() == Some(index))
    }

    /// A new pointer with `name` appended.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Pointer {
        let mut segments = self.segments.clone();
        segments.push(Segment::new(name.into()));
        Pointer { segments }
    }
}

fn unescape(raw: &str) -> Result<String, String> {
    if !raw.contains('~') {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            other => {
                return Err(format!(
                    "invalid escape '~{}' in pointer segment {raw:?}",
                    other.map_or(String::new(), |c| c.to_string())
                ));
            }
        }
    }
    Ok(out)
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str("/")?;
            for ch in segment.name.chars() {
                match ch {
                    '~' => f.write_str("~0")?,
                    '/' => f.write_str("~1")?,
                    _ => fmt::Write::write_char(f, ch)?,
                }
            }
        }
        Ok(())
    }
}
