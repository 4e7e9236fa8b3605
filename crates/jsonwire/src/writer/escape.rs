//! String escaping for generated output.
//!
//! The mandatory JSON escapes (quote, backslash, controls) always apply.
//! Above that, a configurable code point threshold forces `\uXXXX` output
//! (`escape_non_ascii` sets it to 127), and a [`CharacterEscapes`] override
//! can substitute arbitrary sequences per code point.

use std::borrow::Cow;

/// Threshold meaning "escape nothing beyond the mandatory set".
pub(crate) const NO_ESCAPE_THRESHOLD: u32 = char::MAX as u32;

/// Per-code-point escape overrides applied before the built-in rules.
pub trait CharacterEscapes {
    /// The replacement sequence for `ch`, or `None` to fall through to the
    /// standard rules. The sequence is written verbatim, so it must itself be
    /// valid inside a JSON string.
    fn custom_escape(&self, ch: char) -> Option<Cow<'static, str>>;
}

fn push_unicode_escape(out: &mut String, ch: char) {
    let mut units = [0u16; 2];
    for unit in ch.encode_utf16(&mut units) {
        out.push_str("\\u");
        for shift in [12, 8, 4, 0] {
            let nibble = (*unit >> shift) & 0xF;
            out.push(char::from_digit(u32::from(nibble), 16).unwrap_or('0').to_ascii_uppercase());
        }
    }
}

/// Appends `text` to `out` with JSON string escaping (no surrounding quotes).
pub(crate) fn escape_into(
    out: &mut String,
    text: &str,
    highest_non_escaped: u32,
    custom: Option<&dyn CharacterEscapes>,
) {
    for ch in text.chars() {
        if let Some(custom) = custom {
            if let Some(seq) = custom.custom_escape(ch) {
                out.push_str(&seq);
                continue;
            }
        }
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ if (ch as u32) < 0x20 || (ch as u32) > highest_non_escaped => {
                push_unicode_escape(out, ch);
            }
            _ => out.push(ch),
        }
    }
}
