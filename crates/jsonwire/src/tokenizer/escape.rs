//! Accumulator for four-digit `\uXXXX` escape sequences.
//!
//! Feeds one ASCII hex digit at a time and yields the raw 16-bit code unit
//! after the fourth. Surrogate pairing is the tokenizer's job; this type only
//! collects digits.

use crate::error::SyntaxError;

#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    acc: u32,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub(crate) fn reset(&mut self) {
        self.acc = 0;
        self.len = 0;
    }

    #[inline]
    fn hex_val(c: char) -> Option<u32> {
        match c {
            '0'..='9' => Some((c as u32) - ('0' as u32)),
            'a'..='f' => Some((c as u32) - ('a' as u32) + 10),
            'A'..='F' => Some((c as u32) - ('A' as u32) + 10),
            _ => None,
        }
    }

    /// Feeds one digit. Yields the accumulated code unit on the fourth, and
    /// resets for the next escape.
    pub(crate) fn feed(&mut self, c: char) -> Result<Option<u32>, SyntaxError> {
        let d = Self::hex_val(c).ok_or(SyntaxError::InvalidUnicodeEscapeChar(c))?;
        self.acc = (self.acc << 4) | d;
        self.len += 1;
        if self.len < 4 {
            return Ok(None);
        }
        let code = self.acc;
        self.reset();
        Ok(Some(code))
    }
}
