//! Byte-encoding auto-detection and incremental transcoding to UTF-8 text.
//!
//! JSON text starts with an ASCII character (a structural marker, quote,
//! digit, minus, or a literal), so for byte sources the encoding is always
//! *detected*, never assumed: first by BOM, then by the zero-byte layout of
//! the first four bytes.

use std::str;

use crate::error::SyntaxError;

/// The byte encodings a parser can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonEncoding {
    /// UTF-8 (also the only output encoding).
    Utf8,
    /// UTF-16, big endian.
    Utf16Be,
    /// UTF-16, little endian.
    Utf16Le,
    /// UTF-32, big endian.
    Utf32Be,
    /// UTF-32, little endian.
    Utf32Le,
}

impl JsonEncoding {
    /// Canonical name, for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            JsonEncoding::Utf8 => "UTF-8",
            JsonEncoding::Utf16Be => "UTF-16BE",
            JsonEncoding::Utf16Le => "UTF-16LE",
            JsonEncoding::Utf32Be => "UTF-32BE",
            JsonEncoding::Utf32Le => "UTF-32LE",
        }
    }

    const fn unit_len(self) -> usize {
        match self {
            JsonEncoding::Utf8 => 1,
            JsonEncoding::Utf16Be | JsonEncoding::Utf16Le => 2,
            JsonEncoding::Utf32Be | JsonEncoding::Utf32Le => 4,
        }
    }
}

/// Detects the encoding of a byte source from its leading bytes.
///
/// Returns the encoding and the number of BOM bytes to skip. Inconclusive
/// prefixes (shorter than four bytes, no BOM) conclude UTF-8, the only
/// encoding in which an ASCII-leading document can be that short.
#[must_use]
pub fn detect_encoding(head: &[u8]) -> (JsonEncoding, usize) {
    // BOM first.
    if head.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return (JsonEncoding::Utf8, 3);
    }
    if head.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        return (JsonEncoding::Utf32Be, 4);
    }
    if head.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        return (JsonEncoding::Utf32Le, 4);
    }
    if head.starts_with(&[0xFE, 0xFF]) {
        return (JsonEncoding::Utf16Be, 2);
    }
    if head.starts_with(&[0xFF, 0xFE]) {
        return (JsonEncoding::Utf16Le, 2);
    }

    // No BOM: the first character is ASCII, so zero bytes give away wider
    // encodings and their endianness.
    if head.len() >= 4 {
        match (head[0] == 0, head[1] == 0, head[2] == 0, head[3] == 0) {
            (true, true, true, false) => return (JsonEncoding::Utf32Be, 0),
            (false, true, true, true) => return (JsonEncoding::Utf32Le, 0),
            (true, false, _, _) => return (JsonEncoding::Utf16Be, 0),
            (false, true, _, _) => return (JsonEncoding::Utf16Le, 0),
            _ => {}
        }
    } else if head.len() >= 2 {
        if head[0] == 0 {
            return (JsonEncoding::Utf16Be, 0);
        }
        if head[1] == 0 {
            return (JsonEncoding::Utf16Le, 0);
        }
    }
    (JsonEncoding::Utf8, 0)
}

/// Incremental transcoder from a detected encoding to UTF-8 text.
///
/// Carries split code units (and a pending UTF-16 high surrogate) across
/// chunk boundaries so callers can feed arbitrarily sliced input.
#[derive(Debug)]
pub(crate) struct Decoder {
    encoding: JsonEncoding,
    pending: Vec<u8>,
    pending_high: Option<u16>,
}

impl Decoder {
    pub(crate) fn new(encoding: JsonEncoding) -> Self {
        Decoder {
            encoding,
            pending: Vec::new(),
            pending_high: None,
        }
    }

    /// Transcodes `bytes`, appending decoded text to `out`.
    pub(crate) fn decode(&mut self, bytes: &[u8], out: &mut String) -> Result<(), SyntaxError> {
        if self.encoding == JsonEncoding::Utf8 && self.pending.is_empty() {
            return self.decode_utf8(bytes, out);
        }
        // Prepend carry-over from the previous chunk.
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);
        match self.encoding {
            JsonEncoding::Utf8 => self.decode_utf8(&data, out),
            _ => self.decode_wide(&data, out),
        }
    }

    /// Reports a truncated trailing sequence once input is exhausted.
    pub(crate) fn finish(&mut self) -> Result<(), SyntaxError> {
        if !self.pending.is_empty() {
            return Err(SyntaxError::InvalidEncoding {
                encoding: self.encoding.name(),
                detail: "truncated code unit at end of input",
            });
        }
        if self.pending_high.is_some() {
            return Err(SyntaxError::InvalidEncoding {
                encoding: self.encoding.name(),
                detail: "unpaired high surrogate at end of input",
            });
        }
        Ok(())
    }

    fn decode_utf8(&mut self, data: &[u8], out: &mut String) -> Result<(), SyntaxError> {
        match str::from_utf8(data) {
            Ok(text) => {
                out.push_str(text);
                Ok(())
            }
            Err(err) => {
                let valid = err.valid_up_to();
                // Safe split: everything before `valid` is known-good UTF-8.
                out.push_str(str::from_utf8(&data[..valid]).expect("validated prefix"));
                if err.error_len().is_some() {
                    return Err(SyntaxError::InvalidEncoding {
                        encoding: "UTF-8",
                        detail: "invalid byte sequence",
                    });
                }
                // Incomplete trailing sequence: carry it to the next chunk.
                self.pending.clear();
                self.pending.extend_from_slice(&data[valid..]);
                Ok(())
            }
        }
    }

    fn decode_wide(&mut self, data: &[u8], out: &mut String) -> Result<(), SyntaxError> {
        let unit = self.encoding.unit_len();
        let whole = data.len() - data.len() % unit;
        for chunk in data[..whole].chunks_exact(unit) {
            match self.encoding {
                JsonEncoding::Utf16Be | JsonEncoding::Utf16Le => {
                    let u = if self.encoding == JsonEncoding::Utf16Be {
                        u16::from_be_bytes([chunk[0], chunk[1]])
                    } else {
                        u16::from_le_bytes([chunk[0], chunk[1]])
                    };
                    self.push_utf16_unit(u, out)?;
                }
                JsonEncoding::Utf32Be | JsonEncoding::Utf32Le => {
                    let u = if self.encoding == JsonEncoding::Utf32Be {
                        u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
                    } else {
                        u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
                    };
                    let ch = char::from_u32(u).ok_or(SyntaxError::InvalidEncoding {
                        encoding: self.encoding.name(),
                        detail: "code point out of range",
                    })?;
                    out.push(ch);
                }
                JsonEncoding::Utf8 => unreachable!(),
            }
        }
        self.pending.clear();
        self.pending.extend_from_slice(&data[whole..]);
        Ok(())
    }

    fn push_utf16_unit(&mut self, u: u16, out: &mut String) -> Result<(), SyntaxError> {
        if let Some(high) = self.pending_high.take() {
            if (0xDC00..=0xDFFF).contains(&u) {
                let c = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(u) - 0xDC00);
                out.push(char::from_u32(c).expect("valid surrogate pair"));
                return Ok(());
            }
            return Err(SyntaxError::InvalidEncoding {
                encoding: self.encoding.name(),
                detail: "unpaired high surrogate",
            });
        }
        match u {
            0xD800..=0xDBFF => {
                self.pending_high = Some(u);
                Ok(())
            }
            0xDC00..=0xDFFF => Err(SyntaxError::InvalidEncoding {
                encoding: self.encoding.name(),
                detail: "unpaired low surrogate",
            }),
            _ => {
                out.push(char::from_u32(u32::from(u)).expect("non-surrogate BMP unit"));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_detection() {
        assert_eq!(detect_encoding(b"\xEF\xBB\xBF{}"), (JsonEncoding::Utf8, 3));
        assert_eq!(
            detect_encoding(&[0xFE, 0xFF, 0x00, 0x7B]),
            (JsonEncoding::Utf16Be, 2)
        );
        assert_eq!(
            detect_encoding(&[0xFF, 0xFE, 0x7B, 0x00]),
            (JsonEncoding::Utf16Le, 2)
        );
        assert_eq!(
            detect_encoding(&[0x00, 0x00, 0xFE, 0xFF]),
            (JsonEncoding::Utf32Be, 4)
        );
        assert_eq!(
            detect_encoding(&[0xFF, 0xFE, 0x00, 0x00]),
            (JsonEncoding::Utf32Le, 4)
        );
    }

    #[test]
    fn zero_pattern_heuristic() {
        // "{" in each encoding, no BOM.
        assert_eq!(detect_encoding(b"{\"a\":1}"), (JsonEncoding::Utf8, 0));
        assert_eq!(
            detect_encoding(&[0x00, 0x7B, 0x00, 0x7D]),
            (JsonEncoding::Utf16Be, 0)
        );
        assert_eq!(
            detect_encoding(&[0x7B, 0x00, 0x7D, 0x00]),
            (JsonEncoding::Utf16Le, 0)
        );
        assert_eq!(
            detect_encoding(&[0x00, 0x00, 0x00, 0x7B]),
            (JsonEncoding::Utf32Be, 0)
        );
        assert_eq!(
            detect_encoding(&[0x7B, 0x00, 0x00, 0x00]),
            (JsonEncoding::Utf32Le, 0)
        );
    }

    #[test]
    fn short_input_defaults_to_utf8() {
        assert_eq!(detect_encoding(b"1"), (JsonEncoding::Utf8, 0));
        assert_eq!(detect_encoding(b""), (JsonEncoding::Utf8, 0));
        assert_eq!(detect_encoding(b"{}"), (JsonEncoding::Utf8, 0));
    }

    #[test]
    fn utf8_split_multibyte() {
        let bytes = "é{".as_bytes();
        let mut d = Decoder::new(JsonEncoding::Utf8);
        let mut out = String::new();
        d.decode(&bytes[..1], &mut out).unwrap();
        assert_eq!(out, "");
        d.decode(&bytes[1..], &mut out).unwrap();
        assert_eq!(out, "é{");
        d.finish().unwrap();
    }

    #[test]
    fn utf8_invalid_bytes() {
        let mut d = Decoder::new(JsonEncoding::Utf8);
        let mut out = String::new();
        let err = d.decode(&[0x7B, 0xFF, 0x7D], &mut out).unwrap_err();
        assert!(matches!(err, SyntaxError::InvalidEncoding { .. }));
        assert_eq!(out, "{");
    }

    #[test]
    fn utf16_with_surrogates_split_anywhere() {
        let text = "{\"e\":\"😀\"}";
        let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        // Feed one byte at a time.
        let mut d = Decoder::new(JsonEncoding::Utf16Be);
        let mut out = String::new();
        for b in &bytes {
            d.decode(std::slice::from_ref(b), &mut out).unwrap();
        }
        d.finish().unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn utf32_round_trip() {
        let text = "[1,\"α😀\"]";
        let bytes: Vec<u8> = text.chars().flat_map(|c| (c as u32).to_le_bytes()).collect();
        let mut d = Decoder::new(JsonEncoding::Utf32Le);
        let mut out = String::new();
        d.decode(&bytes, &mut out).unwrap();
        d.finish().unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn truncated_unit_reported_at_finish() {
        let mut d = Decoder::new(JsonEncoding::Utf16Be);
        let mut out = String::new();
        d.decode(&[0x00], &mut out).unwrap();
        assert!(d.finish().is_err());
    }
}
