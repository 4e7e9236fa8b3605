//! The streaming generator: write-forward JSON construction with the same
//! legality rules the parser enforces when reading.
//!
//! A [`Generator`] mirrors the parser's context stack and rejects illegal
//! call sequences (a value where a name is due, a name outside an object, a
//! mismatched end marker) as generation errors before anything reaches the
//! sink. Output is always UTF-8. Each event is composed in a recycled scratch
//! buffer and written to the sink whole, so an I/O error never leaves a
//! half-escaped token behind.

mod escape;
mod pretty;
mod typeid;

pub use escape::CharacterEscapes;
pub use pretty::{DefaultPrettyPrinter, MinimalPrettyPrinter, PrettyPrinter};
pub use typeid::{TypeId, TypeIdInclusion};

use std::{io::Write, sync::Arc};

use escape::{escape_into, NO_ESCAPE_THRESHOLD};

use crate::{
    base64::Base64Variant,
    context::{ContextKind, ContextStack, StreamContext},
    error::{JsonError, Result},
    features::WriteFeatures,
    numbers::{is_valid_json_number, JsonNumber},
    recycler::{BufferRecycler, BufferRole},
};

/// A streaming JSON generator over an [`io::Write`](std::io::Write) sink.
pub struct Generator<W: Write> {
    out: Option<W>,
    features: WriteFeatures,
    printer: Box<dyn PrettyPrinter>,
    ctx: ContextStack,
    /// Name written, value not yet.
    name_pending: bool,
    scratch: String,
    recycler: BufferRecycler,
    base64: Base64Variant,
    highest_non_escaped: u32,
    custom_escapes: Option<Box<dyn CharacterEscapes>>,
    closed: bool,
}

impl<W: Write> Generator<W> {
    pub(crate) fn new(
        out: W,
        features: WriteFeatures,
        base64: Base64Variant,
        printer: Box<dyn PrettyPrinter>,
        recycler: BufferRecycler,
    ) -> Self {
        Generator {
            out: Some(out),
            features,
            printer,
            ctx: ContextStack::new(features.strict_duplicate_detection),
            name_pending: false,
            scratch: recycler.acquire_chars(BufferRole::WriteConcat),
            recycler,
            base64,
            highest_non_escaped: if features.escape_non_ascii {
                127
            } else {
                NO_ESCAPE_THRESHOLD
            },
            custom_escapes: None,
            closed: false,
        }
    }

    /// A generator with default features, compact layout and MIME-without-
    /// linefeeds Base64, for use without a factory.
    pub fn from_writer(out: W) -> Self {
        Generator::new(
            out,
            WriteFeatures::default(),
            crate::base64::MIME_NO_LINEFEEDS,
            Box::new(MinimalPrettyPrinter::default()),
            BufferRecycler::disabled(),
        )
    }

    /// Replaces the layout printer.
    pub fn set_pretty_printer(&mut self, printer: Box<dyn PrettyPrinter>) {
        self.printer = printer;
    }

    /// Escapes every code point above `threshold` as `\uXXXX`.
    pub fn set_highest_non_escaped(&mut self, threshold: u32) {
        self.highest_non_escaped = threshold;
    }

    /// Installs per-code-point escape overrides.
    pub fn set_character_escapes(&mut self, escapes: Box<dyn CharacterEscapes>) {
        self.custom_escapes = Some(escapes);
    }

    /// The innermost open container being written.
    #[must_use]
    pub fn writing_context(&self) -> &StreamContext {
        self.ctx.current()
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Opens an object.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_start_object(&mut self) -> Result<()> {
        self.value_prelude()?;
        self.printer.start_object(&mut self.scratch);
        self.ctx.push(ContextKind::Object);
        self.flush_scratch()
    }

    /// Closes the current object.
    ///
    /// # Errors
    ///
    /// Generation error when not directly inside an object or when a member
    /// name is dangling; I/O errors from the sink.
    pub fn write_end_object(&mut self) -> Result<()> {
        self.check_open()?;
        if self.ctx.current().kind() != ContextKind::Object {
            return Err(JsonError::generation(format!(
                "mismatched end: current context is {}",
                self.ctx.current().kind().type_desc()
            )));
        }
        if self.name_pending {
            return Err(JsonError::generation(
                "cannot end object with a dangling field name",
            ));
        }
        let entries = self.ctx.current().entry_count();
        self.printer.end_object(&mut self.scratch, entries);
        self.ctx.pop();
        self.flush_scratch()
    }

    /// Opens an array.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_start_array(&mut self) -> Result<()> {
        self.value_prelude()?;
        self.printer.start_array(&mut self.scratch);
        self.ctx.push(ContextKind::Array);
        self.flush_scratch()
    }

    /// Closes the current array.
    ///
    /// # Errors
    ///
    /// Generation error when not directly inside an array; I/O errors from
    /// the sink.
    pub fn write_end_array(&mut self) -> Result<()> {
        self.check_open()?;
        if self.ctx.current().kind() != ContextKind::Array {
            return Err(JsonError::generation(format!(
                "mismatched end: current context is {}",
                self.ctx.current().kind().type_desc()
            )));
        }
        let values = self.ctx.current().entry_count();
        self.printer.end_array(&mut self.scratch, values);
        self.ctx.pop();
        self.flush_scratch()
    }

    /// Writes an object member name.
    ///
    /// # Errors
    ///
    /// Generation error outside an object, after another dangling name, or
    /// on a duplicate under strict duplicate detection; I/O errors from the
    /// sink.
    pub fn write_field_name(&mut self, name: &str) -> Result<()> {
        self.check_open()?;
        if self.ctx.current().kind() != ContextKind::Object {
            return Err(JsonError::generation(
                "field names are only legal inside an object",
            ));
        }
        if self.name_pending {
            return Err(JsonError::generation(
                "two field names in a row; expected a value",
            ));
        }
        if self.ctx.current().index() >= 0 {
            self.printer.object_entry_separator(&mut self.scratch);
        } else {
            self.printer.before_object_entries(&mut self.scratch);
        }
        self.ctx.current_mut().advance();
        if !self.ctx.current_mut().set_current_name(Arc::from(name)) {
            return Err(JsonError::generation(format!(
                "duplicate field name \"{name}\""
            )));
        }
        if self.features.quote_field_names {
            self.scratch.push('"');
            self.escape(name);
            self.scratch.push('"');
        } else {
            self.escape(name);
        }
        self.name_pending = true;
        self.flush_scratch()
    }

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    /// Writes a string value.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.value_prelude()?;
        self.scratch.push('"');
        self.escape(value);
        self.scratch.push('"');
        self.flush_scratch()
    }

    /// Writes a signed integer.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_int(&mut self, value: i64) -> Result<()> {
        self.value_prelude()?;
        self.scratch.push_str(&value.to_string());
        self.flush_scratch()
    }

    /// Writes an unsigned integer.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_uint(&mut self, value: u64) -> Result<()> {
        self.value_prelude()?;
        self.scratch.push_str(&value.to_string());
        self.flush_scratch()
    }

    /// Writes an `f64`. Non-finite values become quoted strings under
    /// `quote_non_numeric_numbers`, otherwise they are generation errors.
    ///
    /// # Errors
    ///
    /// Generation error in name position or for unquotable non-finite
    /// values; I/O errors from the sink.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return self.write_non_finite(non_finite_name(value));
        }
        self.value_prelude()?;
        self.scratch.push_str(&format_double(value));
        self.flush_scratch()
    }

    /// Writes an `f32`; same non-finite handling as [`write_f64`](Self::write_f64).
    ///
    /// # Errors
    ///
    /// Generation error in name position or for unquotable non-finite
    /// values; I/O errors from the sink.
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        if !value.is_finite() {
            return self.write_non_finite(non_finite_name(f64::from(value)));
        }
        self.value_prelude()?;
        let text = ensure_float_form(value.to_string());
        self.scratch.push_str(&text);
        self.flush_scratch()
    }

    fn write_non_finite(&mut self, name: &str) -> Result<()> {
        if !self.features.quote_non_numeric_numbers {
            return Err(JsonError::generation(format!(
                "cannot write {name}: non-finite numbers have no JSON form \
                 (enable quote_non_numeric_numbers to write them as strings)"
            )));
        }
        self.write_string(name)
    }

    /// Writes caller-supplied big-integer or big-decimal text verbatim after
    /// validating it against the JSON number grammar.
    ///
    /// # Errors
    ///
    /// Generation error for text that is not a valid JSON number; I/O errors
    /// from the sink.
    pub fn write_big_number(&mut self, text: &str) -> Result<()> {
        if !is_valid_json_number(text) {
            return Err(JsonError::generation(format!(
                "not a valid JSON number: {text:?}"
            )));
        }
        self.value_prelude()?;
        self.scratch.push_str(text);
        self.flush_scratch()
    }

    /// Writes a parsed number in its optimal representation.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_number(&mut self, value: &JsonNumber) -> Result<()> {
        match value {
            JsonNumber::Int(v) => self.write_int(*v),
            JsonNumber::Double(d) => self.write_f64(*d),
            JsonNumber::BigInt(text) | JsonNumber::BigDecimal(text) => {
                self.write_big_number(text)
            }
        }
    }

    /// Writes a boolean.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.value_prelude()?;
        self.scratch.push_str(if value { "true" } else { "false" });
        self.flush_scratch()
    }

    /// Writes `null`.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_null(&mut self) -> Result<()> {
        self.value_prelude()?;
        self.scratch.push_str("null");
        self.flush_scratch()
    }

    /// Writes `data` as a Base64 string using the generator's configured
    /// variant.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_binary(&mut self, data: &[u8]) -> Result<()> {
        let variant = self.base64.clone();
        self.write_binary_with(&variant, data)
    }

    /// Writes `data` as a Base64 string using an explicit variant. Line
    /// breaks from wrapping variants are escaped like any other string
    /// content.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_binary_with(&mut self, variant: &Base64Variant, data: &[u8]) -> Result<()> {
        let encoded = variant.encode(data);
        self.write_string(&encoded)
    }

    /// Writes text verbatim with no separators or quoting. The caller is
    /// responsible for output validity.
    ///
    /// # Errors
    ///
    /// I/O errors from the sink.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.check_open()?;
        self.scratch.push_str(text);
        self.flush_scratch()
    }

    /// Writes pre-rendered JSON as one value: separators and context advance
    /// as for any scalar, the text itself is not inspected.
    ///
    /// # Errors
    ///
    /// Generation error in name position, I/O errors from the sink.
    pub fn write_raw_value(&mut self, text: &str) -> Result<()> {
        self.value_prelude()?;
        self.scratch.push_str(text);
        self.flush_scratch()
    }

    /// Embedded native objects have no representation in plain JSON.
    ///
    /// # Errors
    ///
    /// Always a configuration error.
    pub fn write_embedded(&mut self) -> Result<()> {
        Err(JsonError::config(
            "plain JSON has no support for embedded native objects",
        ))
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Flushes the sink, when `flush_passed_to_stream` allows.
    ///
    /// # Errors
    ///
    /// I/O errors from the sink.
    pub fn flush(&mut self) -> Result<()> {
        if self.features.flush_passed_to_stream {
            if let Some(out) = self.out.as_mut() {
                out.flush()?;
            }
        }
        Ok(())
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the generator: writes end markers for any open containers when
    /// `auto_close_content`, flushes, and returns the scratch buffer to the
    /// pool. Idempotent.
    ///
    /// # Errors
    ///
    /// I/O errors from the sink.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.features.auto_close_content {
            while !self.ctx.in_root() {
                match self.ctx.current().kind() {
                    ContextKind::Object => {
                        self.name_pending = false;
                        self.write_end_object()?;
                    }
                    ContextKind::Array => self.write_end_array()?,
                    ContextKind::Root => unreachable!("in_root checked"),
                }
            }
        }
        self.closed = true;
        if self.features.auto_close_target || self.features.flush_passed_to_stream {
            if let Some(out) = self.out.as_mut() {
                out.flush()?;
            }
        }
        self.recycler
            .release_chars(BufferRole::WriteConcat, std::mem::take(&mut self.scratch));
        Ok(())
    }

    /// Closes the generator and returns the sink.
    ///
    /// # Errors
    ///
    /// I/O errors from the close.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        self.out
            .take()
            .ok_or_else(|| JsonError::generation("sink already taken"))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(JsonError::generation("generator is closed"));
        }
        Ok(())
    }

    /// Separator/layout work shared by every value write, plus legality.
    fn value_prelude(&mut self) -> Result<()> {
        self.check_open()?;
        match self.ctx.current().kind() {
            ContextKind::Root => {
                if self.ctx.current().index() >= 0 {
                    self.printer.root_separator(&mut self.scratch);
                }
                self.ctx.current_mut().advance();
            }
            ContextKind::Array => {
                if self.ctx.current().index() >= 0 {
                    self.printer.array_value_separator(&mut self.scratch);
                } else {
                    self.printer.before_array_values(&mut self.scratch);
                }
                self.ctx.current_mut().advance();
            }
            ContextKind::Object => {
                if !self.name_pending {
                    return Err(JsonError::generation(
                        "expected a field name before a value inside an object",
                    ));
                }
                self.printer.name_value_separator(&mut self.scratch);
                self.name_pending = false;
            }
        }
        Ok(())
    }

    fn escape(&mut self, text: &str) {
        escape_into(
            &mut self.scratch,
            text,
            self.highest_non_escaped,
            self.custom_escapes.as_deref(),
        );
    }

    fn flush_scratch(&mut self) -> Result<()> {
        let out = self
            .out
            .as_mut()
            .expect("sink present until into_inner consumes the generator");
        out.write_all(self.scratch.as_bytes())?;
        self.scratch.clear();
        Ok(())
    }
}

impl<W: Write> Drop for Generator<W> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl<W: Write> std::fmt::Debug for Generator<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("depth", &self.ctx.depth())
            .field("name_pending", &self.name_pending)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn non_finite_name(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}

/// Shortest-round-trip rendering, with a trailing `.0` for integral values so
/// the output re-reads as a float.
fn format_double(value: f64) -> String {
    ensure_float_form(value.to_string())
}

fn ensure_float_form(mut text: String) -> String {
    if !text.contains('.') && !text.contains('e') && !text.contains('E') {
        text.push_str(".0");
    }
    text
}

#[cfg(test)]
mod tests;
