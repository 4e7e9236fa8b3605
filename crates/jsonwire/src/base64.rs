//! Base64 variants and the encode/decode engine used for binary scalars.
//!
//! Binary values cross the JSON boundary exclusively as Base64 text. A
//! [`Base64Variant`] bundles the alphabet, the padding policy and the
//! line-wrap policy; four canonical variants are predefined as module-level
//! constants. Encoding and decoding are pure functions over byte/char
//! sequences, no I/O.
//!
//! Decoding is quartet-oriented: whitespace is skipped only *between*
//! four-symbol groups, never inside one. When a variant does not require
//! padding, a trailing group of two symbols yields one byte (the 12
//! accumulated bits shifted right by 4) and a trailing group of three yields
//! two bytes (shifted right by 2). This lenient tail decode is deliberate and
//! load-bearing; do not tighten it.

use thiserror::Error;

/// Sentinel in the decode table: character not in the alphabet.
const INVALID: i8 = -1;
/// Sentinel in the decode table: the variant's padding character.
const PADDING: i8 = -2;

/// Marker for "no line wrapping" in [`Base64Variant::max_line_length`].
pub const NO_LINE_WRAP: usize = usize::MAX;

const STD_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const URL_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// How a variant treats padding characters when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingReadBehaviour {
    /// Padding is an error wherever it appears.
    Forbidden,
    /// A partial trailing quartet must be completed with padding.
    Required,
    /// Padding accepted but a bare partial quartet is fine too.
    Allowed,
}

/// Errors produced by [`Base64Variant::decode`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Base64Error {
    /// A character outside the alphabet (or misplaced padding), with the
    /// position inside its four-symbol group.
    #[error("illegal base64 character '{ch}' (unit {slot} of 4-char unit)")]
    InvalidChar {
        /// The offending character.
        ch: char,
        /// Which of the four quartet slots it occupied (1-based).
        slot: u8,
    },
    /// The variant requires padding and the input ended without it.
    #[error("missing padding character '{padding}' required by variant '{variant}'")]
    MissingPadding {
        /// Variant name.
        variant: &'static str,
        /// The expected padding character.
        padding: char,
    },
    /// Padding appeared although the variant forbids it.
    #[error("unexpected padding character in variant '{variant}' that forbids padding")]
    UnexpectedPadding {
        /// Variant name.
        variant: &'static str,
    },
    /// Input ended inside a quartet where no legal tail exists.
    #[error("unexpected end of base64 content")]
    UnexpectedEnd,
}

/// An immutable Base64 configuration: alphabet, padding policy, line length.
#[derive(Debug, Clone)]
pub struct Base64Variant {
    name: &'static str,
    encode_table: &'static [u8; 64],
    decode_table: [i8; 128],
    padding: Option<u8>,
    writes_padding: bool,
    padding_on_read: PaddingReadBehaviour,
    max_line_length: usize,
}

const fn build_decode_table(alphabet: &[u8; 64], padding: Option<u8>) -> [i8; 128] {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < 64 {
        table[alphabet[i] as usize] = i as i8;
        i += 1;
    }
    if let Some(p) = padding {
        table[p as usize] = PADDING;
    }
    table
}

/// Standard MIME base64 with `=` padding and 76-character lines.
pub const MIME: Base64Variant = Base64Variant::new(
    "MIME",
    STD_ALPHABET,
    Some(b'='),
    true,
    PaddingReadBehaviour::Allowed,
    76,
);

/// MIME alphabet and padding, no line breaks. The default for JSON, since a
/// JSON string cannot contain a raw newline.
pub const MIME_NO_LINEFEEDS: Base64Variant = Base64Variant::new(
    "MIME-NO-LINEFEEDS",
    STD_ALPHABET,
    Some(b'='),
    true,
    PaddingReadBehaviour::Allowed,
    NO_LINE_WRAP,
);

/// PEM: MIME alphabet and padding with 64-character lines.
pub const PEM: Base64Variant = Base64Variant::new(
    "PEM",
    STD_ALPHABET,
    Some(b'='),
    true,
    PaddingReadBehaviour::Allowed,
    64,
);

/// URL-safe alphabet (`-` and `_`), unpadded, padding forbidden on read.
pub const MODIFIED_FOR_URL: Base64Variant = Base64Variant::new(
    "MODIFIED-FOR-URL",
    URL_ALPHABET,
    None,
    false,
    PaddingReadBehaviour::Forbidden,
    NO_LINE_WRAP,
);

impl Base64Variant {
    const fn new(
        name: &'static str,
        alphabet: &'static [u8; 64],
        padding: Option<u8>,
        writes_padding: bool,
        padding_on_read: PaddingReadBehaviour,
        max_line_length: usize,
    ) -> Self {
        Base64Variant {
            name,
            encode_table: alphabet,
            decode_table: build_decode_table(alphabet, padding),
            padding,
            writes_padding,
            padding_on_read,
            max_line_length,
        }
    }

    /// Variant name, for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The padding character, if the variant has one.
    #[must_use]
    pub const fn padding_char(&self) -> Option<char> {
        match self.padding {
            Some(p) => Some(p as char),
            None => None,
        }
    }

    /// Whether a partial trailing group is padded out on encode.
    #[must_use]
    pub const fn writes_padding(&self) -> bool {
        self.writes_padding
    }

    /// Maximum output line length before a line break, [`NO_LINE_WRAP`] for
    /// unlimited.
    #[must_use]
    pub const fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Whether padding characters are tolerated when decoding.
    #[must_use]
    pub const fn accepts_padding_on_read(&self) -> bool {
        !matches!(self.padding_on_read, PaddingReadBehaviour::Forbidden)
    }

    /// Whether a partial trailing group must carry padding when decoding.
    #[must_use]
    pub const fn requires_padding_on_read(&self) -> bool {
        matches!(self.padding_on_read, PaddingReadBehaviour::Required)
    }

    /// Same variant with a different read-side padding policy.
    #[must_use]
    pub fn with_padding_on_read(mut self, behaviour: PaddingReadBehaviour) -> Self {
        self.padding_on_read = behaviour;
        self
    }

    /// Same variant, toggling whether encode pads partial groups.
    #[must_use]
    pub fn with_writes_padding(mut self, writes_padding: bool) -> Self {
        self.writes_padding = writes_padding;
        self
    }

    #[inline]
    fn decode_char(&self, ch: char) -> i8 {
        let code = ch as u32;
        if code < 128 {
            self.decode_table[code as usize]
        } else {
            INVALID
        }
    }

    #[inline]
    fn symbol(&self, six_bits: u32) -> char {
        self.encode_table[(six_bits & 0x3F) as usize] as char
    }

    /// Encodes `data`, inserting a `\n` line break per the variant's line
    /// length and padding partial groups per its write policy.
    #[must_use]
    pub fn encode(&self, data: &[u8]) -> String {
        // 4 output chars per 3 input bytes, plus breaks and padding.
        let mut out = String::with_capacity(data.len().div_ceil(3) * 4 + 8);
        // Count quartets, not characters: the limit is always a multiple of 4.
        let chunks_per_line = self.max_line_length / 4;
        let mut chunks_left = chunks_per_line;

        let mut iter = data.chunks_exact(3);
        for group in iter.by_ref() {
            if chunks_left == 0 {
                out.push('\n');
                chunks_left = chunks_per_line;
            }
            let bits =
                (u32::from(group[0]) << 16) | (u32::from(group[1]) << 8) | u32::from(group[2]);
            out.push(self.symbol(bits >> 18));
            out.push(self.symbol(bits >> 12));
            out.push(self.symbol(bits >> 6));
            out.push(self.symbol(bits));
            chunks_left -= 1;
        }

        let tail = iter.remainder();
        if !tail.is_empty() {
            if chunks_left == 0 {
                out.push('\n');
            }
            let mut bits = u32::from(tail[0]) << 16;
            if tail.len() == 2 {
                bits |= u32::from(tail[1]) << 8;
            }
            out.push(self.symbol(bits >> 18));
            out.push(self.symbol(bits >> 12));
            if tail.len() == 2 {
                out.push(self.symbol(bits >> 6));
            }
            if self.writes_padding {
                if let Some(p) = self.padding {
                    if tail.len() == 1 {
                        out.push(p as char);
                    }
                    out.push(p as char);
                }
            }
        }
        out
    }

    fn missing_padding(&self) -> Base64Error {
        match self.padding_char() {
            Some(padding) => Base64Error::MissingPadding {
                variant: self.name,
                padding,
            },
            None => Base64Error::UnexpectedEnd,
        }
    }

    /// Decodes base64 `text` into bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`Base64Error`] for characters outside the alphabet, padding
    /// that violates the variant's read policy, or a truncated trailing group
    /// the policy cannot accept.
    pub fn decode(&self, text: &str) -> std::result::Result<Vec<u8>, Base64Error> {
        let mut out = Vec::with_capacity(text.len() / 4 * 3 + 2);
        let mut chars = text.chars();

        'quartets: loop {
            // Whitespace is legal only here, between quartets.
            let first = loop {
                match chars.next() {
                    None => break 'quartets,
                    Some(ch) if (ch as u32) <= 0x20 => {}
                    Some(ch) => break ch,
                }
            };

            let d0 = self.decode_char(first);
            if d0 < 0 {
                return Err(Base64Error::InvalidChar { ch: first, slot: 1 });
            }

            let Some(second) = chars.next() else {
                return Err(Base64Error::UnexpectedEnd);
            };
            let d1 = self.decode_char(second);
            if d1 < 0 {
                return Err(Base64Error::InvalidChar {
                    ch: second,
                    slot: 2,
                });
            }
            #[allow(clippy::cast_sign_loss)]
            let mut bits = ((d0 as u32) << 6) | (d1 as u32);

            // Slot 3: may be padding, or absent at end of input.
            let third = match chars.next() {
                None => {
                    if self.requires_padding_on_read() {
                        return Err(self.missing_padding());
                    }
                    // Lenient tail: 12 bits >> 4 yields one byte.
                    out.push((bits >> 4) as u8);
                    break 'quartets;
                }
                Some(ch) => ch,
            };
            let d2 = self.decode_char(third);
            if d2 == PADDING {
                if !self.accepts_padding_on_read() {
                    return Err(Base64Error::UnexpectedPadding { variant: self.name });
                }
                // The fourth slot must then also be padding (or absent when
                // padding is not required).
                match chars.next() {
                    None if !self.requires_padding_on_read() => {
                        out.push((bits >> 4) as u8);
                        break 'quartets;
                    }
                    None => return Err(self.missing_padding()),
                    Some(ch) if self.decode_char(ch) == PADDING => {
                        out.push((bits >> 4) as u8);
                        continue 'quartets;
                    }
                    Some(ch) => return Err(Base64Error::InvalidChar { ch, slot: 4 }),
                }
            }
            if d2 < 0 {
                return Err(Base64Error::InvalidChar { ch: third, slot: 3 });
            }
            #[allow(clippy::cast_sign_loss)]
            {
                bits = (bits << 6) | (d2 as u32);
            }

            // Slot 4: may be padding, or absent at end of input.
            let fourth = match chars.next() {
                None => {
                    if self.requires_padding_on_read() {
                        return Err(self.missing_padding());
                    }
                    // Lenient tail: 18 bits >> 2 yields two bytes.
                    bits >>= 2;
                    out.push((bits >> 8) as u8);
                    out.push(bits as u8);
                    break 'quartets;
                }
                Some(ch) => ch,
            };
            let d3 = self.decode_char(fourth);
            if d3 == PADDING {
                if !self.accepts_padding_on_read() {
                    return Err(Base64Error::UnexpectedPadding { variant: self.name });
                }
                bits >>= 2;
                out.push((bits >> 8) as u8);
                out.push(bits as u8);
                continue 'quartets;
            }
            if d3 < 0 {
                return Err(Base64Error::InvalidChar {
                    ch: fourth,
                    slot: 4,
                });
            }
            #[allow(clippy::cast_sign_loss)]
            {
                bits = (bits << 6) | (d3 as u32);
            }
            out.push((bits >> 16) as u8);
            out.push((bits >> 8) as u8);
            out.push(bits as u8);
        }

        Ok(out)
    }
}

impl PartialEq for Base64Variant {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.padding == other.padding
            && self.writes_padding == other.writes_padding
            && self.padding_on_read == other.padding_on_read
            && self.max_line_length == other.max_line_length
    }
}
