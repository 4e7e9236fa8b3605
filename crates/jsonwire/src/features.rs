//! Feature toggles for parsing and generation.
//!
//! Plain records of booleans with explicit defaults. The baseline is strict
//! RFC 8259; every relaxation is individually toggleable and none are on by
//! default.

/// Toggles recognized by parsers.
#[derive(Debug, Clone, Copy)]
pub struct ReadFeatures {
    /// Close a factory-opened source when the parser is closed.
    ///
    /// Default `true`.
    pub auto_close_source: bool,
    /// Allow `//` line and `/* */` block comments between tokens.
    pub allow_comments: bool,
    /// Allow `#` line comments between tokens.
    pub allow_hash_comments: bool,
    /// Allow object member names without quotes.
    pub allow_unquoted_field_names: bool,
    /// Allow strings (and names) delimited by single quotes.
    pub allow_single_quotes: bool,
    /// Allow raw control characters (code < 0x20) inside strings.
    pub allow_unescaped_control_chars: bool,
    /// Treat any backslash-escaped character as itself.
    pub allow_backslash_escaping_any: bool,
    /// Allow numbers such as `007`.
    pub allow_leading_zeros: bool,
    /// Allow numbers such as `.5`.
    pub allow_leading_decimal_point: bool,
    /// Allow the literals `NaN`, `Infinity` and `-Infinity`.
    pub allow_non_numeric_numbers: bool,
    /// Treat a missing array value (`[1,,3]`) as `null`.
    pub allow_missing_values: bool,
    /// Allow a trailing comma before `]` or `}`.
    pub allow_trailing_comma: bool,
    /// Fail when an object repeats a member name. Adds per-object tracking
    /// overhead.
    pub strict_duplicate_detection: bool,
    /// Include a source snippet in error locations. Disable to redact
    /// sensitive input from diagnostics.
    ///
    /// Default `true`.
    pub include_source_in_location: bool,
}

impl Default for ReadFeatures {
    fn default() -> Self {
        ReadFeatures {
            auto_close_source: true,
            allow_comments: false,
            allow_hash_comments: false,
            allow_unquoted_field_names: false,
            allow_single_quotes: false,
            allow_unescaped_control_chars: false,
            allow_backslash_escaping_any: false,
            allow_leading_zeros: false,
            allow_leading_decimal_point: false,
            allow_non_numeric_numbers: false,
            allow_missing_values: false,
            allow_trailing_comma: false,
            strict_duplicate_detection: false,
            include_source_in_location: true,
        }
    }
}

/// Toggles recognized by generators.
#[derive(Debug, Clone, Copy)]
pub struct WriteFeatures {
    /// Flush/close the sink when the generator is closed.
    ///
    /// Default `true`.
    pub auto_close_target: bool,
    /// On close, write the closers for any still-open arrays and objects.
    ///
    /// Default `true`.
    pub auto_close_content: bool,
    /// Quote member names. Turning this off produces non-standard output.
    ///
    /// Default `true`.
    pub quote_field_names: bool,
    /// Write non-finite doubles as quoted strings (`"NaN"`). When off,
    /// writing a non-finite double is a generation error.
    ///
    /// Default `true`.
    pub quote_non_numeric_numbers: bool,
    /// Escape every character above U+007F, producing pure-ASCII output.
    pub escape_non_ascii: bool,
    /// Fail when a field name repeats within an object.
    pub strict_duplicate_detection: bool,
    /// Propagate `flush()` to the underlying sink.
    ///
    /// Default `true`.
    pub flush_passed_to_stream: bool,
}

impl Default for WriteFeatures {
    fn default() -> Self {
        WriteFeatures {
            auto_close_target: true,
            auto_close_content: true,
            quote_field_names: true,
            quote_non_numeric_numbers: true,
            escape_non_ascii: false,
            strict_duplicate_detection: false,
            flush_passed_to_stream: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_defaults_are_strict() {
        let f = ReadFeatures::default();
        assert!(!f.allow_comments);
        assert!(!f.allow_trailing_comma);
        assert!(!f.allow_unquoted_field_names);
        assert!(f.auto_close_source);
        assert!(f.include_source_in_location);
    }

    #[test]
    fn write_defaults() {
        let f = WriteFeatures::default();
        assert!(f.quote_field_names);
        assert!(f.auto_close_content);
        assert!(!f.escape_non_ascii);
    }
}
