//! The pull parser: token-by-token reading with structural validation.
//!
//! The parser layers JSON structure on top of the incremental lexer: it
//! validates commas, colons and close markers against the nesting stack,
//! classifies strings into member names versus values, canonicalizes names
//! through the session symbol table, and holds the current token's payload
//! (text and number) for the accessors.
//!
//! Input arrives three ways, all driving the same state machine:
//!
//! - *complete*: strings and byte slices are fed wholesale at construction;
//! - *reader*: a blocking `io::Read` pulled chunk-by-chunk through a recycled
//!   byte buffer and the encoding transcoder;
//! - *push* (non-blocking): the caller feeds bytes with [`Parser::feed`] and
//!   `next_token` returns [`Token::NotAvailable`] instead of blocking when it
//!   runs dry.
//!
//! A parse error leaves the stream positioned at the failure; the parser is
//! then only good for closing.

use std::io::Read;

use crate::{
    base64::Base64Variant,
    codec::ObjectCodec,
    context::{ContextKind, ContextStack, StreamContext},
    detect::Decoder,
    error::{JsonError, Result, SyntaxError},
    features::ReadFeatures,
    location::{ContentRef, Location},
    numbers::JsonNumber,
    pointer::Pointer,
    recycler::{BufferRecycler, BufferRole},
    symbols::SymbolSession,
    token::{NumberType, Token},
    tokenizer::{Lexeme, Lexer, Pos},
    writer::Generator,
};

/// Where the parser's characters come from.
pub(crate) enum Input {
    /// Everything was fed to the lexer at construction.
    Complete,
    /// A blocking reader, transcoded chunk by chunk.
    Reader {
        source: Box<dyn Read>,
        decoder: Decoder,
        /// Opened by the factory (close unconditionally) as opposed to
        /// supplied by the caller (close only under `auto_close_source`).
        owned: bool,
    },
    /// Non-blocking: the caller feeds bytes explicitly.
    Push { decoder: Decoder },
}

/// Grammar position between tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Expecting a (possibly additional) root value.
    RootValue,
    /// After `[`: first value or `]`.
    ArrayFirstValue,
    /// After `,` in an array: value.
    ArrayValue,
    /// After a value in an array: `,` or `]`.
    ArrayComma,
    /// After `{`: first name or `}`.
    ObjectFirstName,
    /// After `,` in an object: name.
    ObjectName,
    /// After a name: `:`.
    ObjectColon,
    /// After `:`: the member value.
    ObjectValue,
    /// After a value in an object: `,` or `}`.
    ObjectComma,
}

enum Applied {
    Tok(Token),
    /// Separator consumed; pull another lexeme.
    Skip,
    End,
}

/// A streaming pull parser over one JSON document (or root-value sequence).
pub struct Parser {
    lexer: Lexer,
    input: Input,
    features: ReadFeatures,
    state: ParseState,
    ctx: ContextStack,
    symbols: SymbolSession,
    recycler: BufferRecycler,
    content: ContentRef,
    current: Option<Token>,
    /// A lexeme seen but not yet applied (close marker terminating a
    /// synthesized missing value).
    pending: Option<Lexeme>,
    text: String,
    number: Option<JsonNumber>,
    byte_buf: Option<Vec<u8>>,
    char_buf: Option<String>,
    closed: bool,
}

impl Parser {
    pub(crate) fn new(
        input: Input,
        features: ReadFeatures,
        symbols: SymbolSession,
        recycler: BufferRecycler,
        content: ContentRef,
    ) -> Self {
        let needs_buffers = matches!(input, Input::Reader { .. });
        let byte_buf = if needs_buffers {
            let mut buf = recycler.acquire_bytes(BufferRole::ParserByte);
            buf.resize(8 * 1024, 0);
            Some(buf)
        } else {
            None
        };
        let char_buf = if matches!(input, Input::Complete) {
            None
        } else {
            Some(recycler.acquire_chars(BufferRole::ParserChar))
        };
        Parser {
            lexer: Lexer::new(features),
            input,
            features,
            state: ParseState::RootValue,
            ctx: ContextStack::new(features.strict_duplicate_detection),
            symbols,
            recycler,
            content,
            current: None,
            pending: None,
            text: String::new(),
            number: None,
            byte_buf,
            char_buf,
            closed: false,
        }
    }

    pub(crate) fn lexer_mut(&mut self) -> &mut Lexer {
        &mut self.lexer
    }

    // ------------------------------------------------------------------
    // Feeding (non-blocking mode)
    // ------------------------------------------------------------------

    /// Feeds bytes to a non-blocking parser.
    ///
    /// # Errors
    ///
    /// Config error on a blocking parser; syntax error on bytes invalid in
    /// the detected encoding.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        let Input::Push { decoder } = &mut self.input else {
            return Err(JsonError::config(
                "feed() is only supported by non-blocking parsers",
            ));
        };
        if self.lexer.at_end() {
            return Err(JsonError::config("cannot feed after end_input()"));
        }
        let mut scratch = self.char_buf.take().unwrap_or_default();
        scratch.clear();
        let res = decoder.decode(bytes, &mut scratch);
        self.lexer.push(&scratch);
        self.char_buf = Some(scratch);
        res.map_err(|e| self.syntax_at(e, self.lexer.position()))
    }

    /// Feeds text to a non-blocking parser.
    ///
    /// # Errors
    ///
    /// Config error on a blocking parser.
    pub fn feed_str(&mut self, text: &str) -> Result<()> {
        let Input::Push { .. } = &self.input else {
            return Err(JsonError::config(
                "feed_str() is only supported by non-blocking parsers",
            ));
        };
        if self.lexer.at_end() {
            return Err(JsonError::config("cannot feed after end_input()"));
        }
        self.lexer.push(text);
        Ok(())
    }

    /// Marks the end of fed input for a non-blocking parser.
    ///
    /// # Errors
    ///
    /// Config error on a blocking parser; syntax error on a truncated
    /// multi-byte sequence at the very end.
    pub fn end_input(&mut self) -> Result<()> {
        let Input::Push { decoder } = &mut self.input else {
            return Err(JsonError::config(
                "end_input() is only supported by non-blocking parsers",
            ));
        };
        let res = decoder.finish();
        self.lexer.end();
        res.map_err(|e| self.syntax_at(e, self.lexer.position()))
    }

    // ------------------------------------------------------------------
    // Token pull
    // ------------------------------------------------------------------

    /// Advances to the next token.
    ///
    /// Returns `Ok(None)` once input is exhausted at a legal boundary. A
    /// non-blocking parser returns [`Token::NotAvailable`] when starved.
    ///
    /// # Errors
    ///
    /// Syntax errors (with location) for malformed input, structural
    /// mismatches and premature end of input; I/O errors from the underlying
    /// source pass through unchanged.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.closed {
            return Err(JsonError::config("parser is closed"));
        }
        loop {
            let step = if let Some(held) = self.pending.take() {
                Some(held)
            } else {
                let expect_name = matches!(
                    self.state,
                    ParseState::ObjectFirstName | ParseState::ObjectName
                );
                self.lexer
                    .next(expect_name)
                    .map_err(|e| self.syntax_at(e, self.lexer.position()))?
            };
            match step {
                Some(lexeme) => match self.apply(lexeme)? {
                    Applied::Tok(token) => {
                        self.current = Some(token);
                        return Ok(Some(token));
                    }
                    Applied::Skip => {}
                    Applied::End => {
                        self.current = None;
                        return Ok(None);
                    }
                },
                None => {
                    if !self.fill()? {
                        // Non-blocking parser out of data.
                        self.current = Some(Token::NotAvailable);
                        return Ok(Some(Token::NotAvailable));
                    }
                }
            }
        }
    }

    /// Like [`next_token`](Self::next_token), but skips over a member name:
    /// returns the value token with the name still queryable from context.
    ///
    /// # Errors
    ///
    /// Same as `next_token`.
    pub fn next_value(&mut self) -> Result<Option<Token>> {
        match self.next_token()? {
            Some(Token::FieldName) => self.next_token(),
            other => Ok(other),
        }
    }

    /// Skips the children of the current container token.
    ///
    /// If the current token is `StartObject`/`StartArray`, consumes tokens
    /// through the matching end (recursively); otherwise does nothing.
    ///
    /// # Errors
    ///
    /// Same as `next_token`; premature end of input inside the container is
    /// a syntax error.
    pub fn skip_children(&mut self) -> Result<()> {
        if !matches!(self.current, Some(t) if t.is_structural_start()) {
            return Ok(());
        }
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_token()? {
                Some(t) if t.is_structural_start() => depth += 1,
                Some(t) if t.is_structural_end() => depth -= 1,
                Some(Token::NotAvailable) => {
                    return Err(JsonError::config(
                        "skip_children() on a starved non-blocking parser",
                    ));
                }
                Some(_) => {}
                None => unreachable!("end inside container is a syntax error"),
            }
        }
        Ok(())
    }

    /// Pulls a chunk from a blocking reader. `Ok(false)` means a push parser
    /// is starved.
    fn fill(&mut self) -> Result<bool> {
        match &mut self.input {
            Input::Complete => unreachable!("complete input is ended at construction"),
            Input::Push { .. } => Ok(false),
            Input::Reader {
                source, decoder, ..
            } => {
                let buf = self.byte_buf.as_mut().expect("reader keeps a byte buffer");
                let n = source.read(buf)?;
                if n == 0 {
                    let res = decoder.finish();
                    self.lexer.end();
                    res.map_err(|e| {
                        let pos = self.lexer.position();
                        self.syntax_at(e, pos)
                    })?;
                } else {
                    let mut scratch = self.char_buf.take().unwrap_or_default();
                    scratch.clear();
                    let res = decoder.decode(&buf[..n], &mut scratch);
                    self.lexer.push(&scratch);
                    self.char_buf = Some(scratch);
                    res.map_err(|e| {
                        let pos = self.lexer.position();
                        self.syntax_at(e, pos)
                    })?;
                }
                Ok(true)
            }
        }
    }

    // ------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------

    fn apply(&mut self, lexeme: Lexeme) -> Result<Applied> {
        match lexeme {
            Lexeme::EndOfInput => {
                if self.ctx.in_root() {
                    Ok(Applied::End)
                } else {
                    let detail = match self.ctx.current().kind() {
                        ContextKind::Array => ": expected close marker for Array",
                        _ => ": expected close marker for Object",
                    };
                    Err(self.syntax_here(SyntaxError::UnexpectedEndOfInput(detail)))
                }
            }

            Lexeme::Punct(b'{') => {
                self.expect_value_position()?;
                self.begin_entry();
                self.ctx.push(ContextKind::Object);
                self.state = ParseState::ObjectFirstName;
                self.set_scalar("{", None);
                Ok(Applied::Tok(Token::StartObject))
            }
            Lexeme::Punct(b'[') => {
                self.expect_value_position()?;
                self.begin_entry();
                self.ctx.push(ContextKind::Array);
                self.state = ParseState::ArrayFirstValue;
                self.set_scalar("[", None);
                Ok(Applied::Tok(Token::StartArray))
            }
            Lexeme::Punct(b'}') => self.close_container('}'),
            Lexeme::Punct(b']') => self.close_container(']'),

            Lexeme::Punct(b',') => match self.state {
                ParseState::ArrayComma => {
                    self.state = ParseState::ArrayValue;
                    Ok(Applied::Skip)
                }
                ParseState::ObjectComma => {
                    self.state = ParseState::ObjectName;
                    Ok(Applied::Skip)
                }
                ParseState::ArrayValue | ParseState::ArrayFirstValue
                    if self.features.allow_missing_values =>
                {
                    // The comma terminates a missing entry: synthesize null.
                    self.begin_entry();
                    self.state = ParseState::ArrayValue;
                    self.set_scalar("null", None);
                    Ok(Applied::Tok(Token::ValueNull))
                }
                _ => Err(self.syntax_here(SyntaxError::UnexpectedToken("unexpected ','"))),
            },
            Lexeme::Punct(b':') => match self.state {
                ParseState::ObjectColon => {
                    self.state = ParseState::ObjectValue;
                    Ok(Applied::Skip)
                }
                _ => Err(self.syntax_here(SyntaxError::UnexpectedToken("unexpected ':'"))),
            },
            Lexeme::Punct(other) => {
                Err(self.syntax_here(SyntaxError::UnexpectedCharacter(other as char)))
            }

            Lexeme::Str(value) => match self.state {
                ParseState::ObjectFirstName | ParseState::ObjectName => self.handle_name(value),
                _ => {
                    self.expect_value_position()?;
                    self.begin_entry();
                    self.text = value;
                    self.number = None;
                    self.after_value();
                    Ok(Applied::Tok(Token::ValueString))
                }
            },
            Lexeme::UnquotedName(name) => match self.state {
                ParseState::ObjectFirstName | ParseState::ObjectName => self.handle_name(name),
                _ => Err(self.syntax_here(SyntaxError::UnexpectedToken(
                    "unquoted names are only legal as object member names",
                ))),
            },

            Lexeme::Num { text, is_float } => {
                self.expect_value_position()?;
                self.begin_entry();
                let number = JsonNumber::classify(&text, is_float);
                self.text = text;
                self.number = Some(number);
                self.after_value();
                Ok(Applied::Tok(if is_float {
                    Token::ValueFloat
                } else {
                    Token::ValueInt
                }))
            }
            Lexeme::True => self.scalar_value(Token::ValueTrue, "true", None),
            Lexeme::False => self.scalar_value(Token::ValueFalse, "false", None),
            Lexeme::Null => self.scalar_value(Token::ValueNull, "null", None),
            Lexeme::NaN => {
                self.scalar_value(Token::ValueFloat, "NaN", Some(JsonNumber::Double(f64::NAN)))
            }
            Lexeme::PosInf => self.scalar_value(
                Token::ValueFloat,
                "Infinity",
                Some(JsonNumber::Double(f64::INFINITY)),
            ),
            Lexeme::NegInf => self.scalar_value(
                Token::ValueFloat,
                "-Infinity",
                Some(JsonNumber::Double(f64::NEG_INFINITY)),
            ),
        }
    }

    fn scalar_value(
        &mut self,
        token: Token,
        text: &str,
        number: Option<JsonNumber>,
    ) -> Result<Applied> {
        self.expect_value_position()?;
        self.begin_entry();
        self.set_scalar(text, number);
        self.after_value();
        Ok(Applied::Tok(token))
    }

    fn set_scalar(&mut self, text: &str, number: Option<JsonNumber>) {
        self.text.clear();
        self.text.push_str(text);
        self.number = number;
    }

    fn handle_name(&mut self, name: String) -> Result<Applied> {
        let canonical = match self.symbols.canonicalize(&name) {
            Ok(sym) => sym,
            Err(mut err) => {
                err.location = Some(self.token_location());
                return Err(err);
            }
        };
        self.ctx.current_mut().advance();
        let fresh = self.ctx.current_mut().set_current_name(canonical);
        if !fresh {
            return Err(self.syntax_token(SyntaxError::DuplicateField(name)));
        }
        self.text = name;
        self.number = None;
        self.state = ParseState::ObjectColon;
        Ok(Applied::Tok(Token::FieldName))
    }

    fn close_container(&mut self, closer: char) -> Result<Applied> {
        let in_object = closer == '}';
        match self.state {
            ParseState::ObjectFirstName | ParseState::ObjectComma if in_object => {
                self.pop_frame();
                Ok(Applied::Tok(Token::EndObject))
            }
            ParseState::ObjectName if in_object => {
                if self.features.allow_trailing_comma {
                    self.pop_frame();
                    Ok(Applied::Tok(Token::EndObject))
                } else {
                    Err(self.syntax_here(SyntaxError::UnexpectedToken(
                        "trailing comma before object end",
                    )))
                }
            }
            ParseState::ArrayFirstValue | ParseState::ArrayComma if !in_object => {
                self.pop_frame();
                Ok(Applied::Tok(Token::EndArray))
            }
            ParseState::ArrayValue if !in_object => {
                if self.features.allow_trailing_comma {
                    self.pop_frame();
                    Ok(Applied::Tok(Token::EndArray))
                } else if self.features.allow_missing_values {
                    // `[1,]` under missing-values: the close terminates one
                    // last missing entry. Hold the closer for the next pull.
                    self.begin_entry();
                    self.state = ParseState::ArrayComma;
                    self.set_scalar("null", None);
                    self.pending = Some(Lexeme::Punct(closer as u8));
                    Ok(Applied::Tok(Token::ValueNull))
                } else {
                    Err(self.syntax_here(SyntaxError::UnexpectedToken(
                        "trailing comma before array end",
                    )))
                }
            }
            _ => {
                let expected = match self.ctx.current().kind() {
                    ContextKind::Object => "'}'",
                    ContextKind::Array => "']'",
                    ContextKind::Root => "a value",
                };
                Err(self.syntax_here(SyntaxError::StructuralMismatch {
                    expected,
                    got: closer,
                }))
            }
        }
    }

    fn pop_frame(&mut self) {
        self.ctx.pop();
        self.after_value();
        self.text.clear();
        self.number = None;
    }

    fn expect_value_position(&self) -> Result<()> {
        match self.state {
            ParseState::RootValue
            | ParseState::ArrayFirstValue
            | ParseState::ArrayValue
            | ParseState::ObjectValue => Ok(()),
            ParseState::ObjectFirstName | ParseState::ObjectName => Err(self.syntax_here(
                SyntaxError::UnexpectedToken("expected a field name or object end"),
            )),
            ParseState::ObjectColon => Err(self.syntax_here(SyntaxError::UnexpectedToken(
                "expected ':' to separate field name and value",
            ))),
            ParseState::ArrayComma | ParseState::ObjectComma => {
                Err(self.syntax_here(SyntaxError::UnexpectedToken(
                    "expected ',' or close marker before next value",
                )))
            }
        }
    }

    fn begin_entry(&mut self) {
        match self.ctx.current().kind() {
            ContextKind::Root | ContextKind::Array => self.ctx.current_mut().advance(),
            // Object entries advance when the name is read.
            ContextKind::Object => {}
        }
    }

    fn after_value(&mut self) {
        self.state = match self.ctx.current().kind() {
            ContextKind::Root => ParseState::RootValue,
            ContextKind::Array => ParseState::ArrayComma,
            ContextKind::Object => ParseState::ObjectComma,
        };
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The current token, if any.
    #[must_use]
    pub fn current_token(&self) -> Option<Token> {
        self.current
    }

    /// Textual content of the current token: string value, member name,
    /// number lexeme, or literal text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character iterator over [`text`](Self::text), for callers that stream
    /// the content instead of materializing a copy.
    pub fn text_chars(&self) -> std::str::Chars<'_> {
        self.text.chars()
    }

    /// Offset of the first content character inside the parser's text
    /// buffer. Always 0 here; part of the buffer-view contract with
    /// [`text_len`](Self::text_len).
    #[must_use]
    pub fn text_offset(&self) -> usize {
        0
    }

    /// Length of [`text`](Self::text) in characters. Together with `text`
    /// this is the buffer view for callers that avoid materializing copies.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// The member name of the current entry: the name itself when positioned
    /// on `FieldName`, or the name the current value/container is bound to.
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        let frame = self.ctx.current();
        if frame.has_current_name() {
            frame.current_name()
        } else {
            self.ctx.parent().and_then(StreamContext::current_name)
        }
    }

    /// The innermost open container.
    #[must_use]
    pub fn parsing_context(&self) -> &StreamContext {
        self.ctx.current()
    }

    /// Current path as a JSON Pointer.
    #[must_use]
    pub fn pointer(&self) -> Pointer {
        self.ctx.pointer()
    }

    /// The boolean value of the current token.
    ///
    /// # Errors
    ///
    /// Coercion error when the current token is not a boolean.
    pub fn boolean_value(&self) -> Result<bool> {
        match self.current {
            Some(Token::ValueTrue) => Ok(true),
            Some(Token::ValueFalse) => Ok(false),
            _ => Err(self.not_a("boolean")),
        }
    }

    fn number(&self) -> Result<&JsonNumber> {
        self.number.as_ref().ok_or_else(|| self.not_a("number"))
    }

    /// The optimal representation of the current number token.
    ///
    /// # Errors
    ///
    /// Coercion error when the current token is not numeric.
    pub fn number_type(&self) -> Result<NumberType> {
        Ok(self.number()?.number_type())
    }

    /// The current number as a [`JsonNumber`].
    ///
    /// # Errors
    ///
    /// Coercion error when the current token is not numeric.
    pub fn number_value(&self) -> Result<JsonNumber> {
        self.number().cloned()
    }

    /// The current number as `i32`.
    ///
    /// # Errors
    ///
    /// Coercion error on non-numbers and on values outside the `i32` range.
    pub fn int_value(&self) -> Result<i32> {
        self.number()?
            .to_i32()
            .map_err(|msg| JsonError::coercion(msg, Some(self.token_location())))
    }

    /// The current number as `i64`.
    ///
    /// # Errors
    ///
    /// Coercion error on non-numbers and on values outside the `i64` range.
    pub fn long_value(&self) -> Result<i64> {
        self.number()?
            .to_i64()
            .map_err(|msg| JsonError::coercion(msg, Some(self.token_location())))
    }

    /// The exact decimal text of an integral number too wide for `i64` (or
    /// of any integral number).
    ///
    /// # Errors
    ///
    /// Coercion error when the current token is not an integral number.
    pub fn big_integer_text(&self) -> Result<&str> {
        match self.number()? {
            JsonNumber::Int(_) | JsonNumber::BigInt(_) => Ok(&self.text),
            _ => Err(self.not_a("integral number")),
        }
    }

    /// The current number as `f64` (widening where needed).
    ///
    /// # Errors
    ///
    /// Coercion error on non-numbers.
    pub fn double_value(&self) -> Result<f64> {
        self.number()?
            .to_f64()
            .map_err(|msg| JsonError::coercion(msg, Some(self.token_location())))
    }

    /// The current number as `f32`.
    ///
    /// # Errors
    ///
    /// Coercion error on non-numbers and on magnitudes beyond `f32`.
    pub fn float_value(&self) -> Result<f32> {
        self.number()?
            .to_f32()
            .map_err(|msg| JsonError::coercion(msg, Some(self.token_location())))
    }

    /// The exact lexical form of the current number, preserving every digit.
    ///
    /// # Errors
    ///
    /// Coercion error when the current token is not numeric.
    pub fn decimal_text(&self) -> Result<&str> {
        self.number()?;
        Ok(&self.text)
    }

    /// Decodes the current string token as Base64 binary.
    ///
    /// # Errors
    ///
    /// Coercion error when the current token is not a string; Base64 content
    /// errors carry the token location.
    pub fn binary_value(&self, variant: &Base64Variant) -> Result<Vec<u8>> {
        match self.current {
            Some(Token::ValueString) => variant.decode(&self.text).map_err(|e| {
                let mut err: JsonError = e.into();
                err.location = Some(self.token_location());
                err
            }),
            _ => Err(self.not_a("string (for binary content)")),
        }
    }

    /// Location of the character the parser will look at next.
    #[must_use]
    pub fn current_location(&self) -> Location {
        self.location_of(self.lexer.position())
    }

    /// Location where the current token started.
    #[must_use]
    pub fn current_token_location(&self) -> Location {
        self.token_location()
    }

    // ------------------------------------------------------------------
    // Copy-through and codec delegation
    // ------------------------------------------------------------------

    /// Replays the current token on a generator, preserving the exact
    /// numeric form (a number copies its original lexeme, not a reparse).
    ///
    /// # Errors
    ///
    /// Generation/I/O errors from the generator; generation error when there
    /// is no current token.
    pub fn copy_current_event<W: std::io::Write>(
        &mut self,
        generator: &mut Generator<W>,
    ) -> Result<()> {
        match self.current {
            None => Err(JsonError::generation("no current event to copy")),
            Some(Token::NotAvailable) => Err(JsonError::generation(
                "cannot copy from a starved non-blocking parser",
            )),
            Some(Token::StartObject) => generator.write_start_object(),
            Some(Token::EndObject) => generator.write_end_object(),
            Some(Token::StartArray) => generator.write_start_array(),
            Some(Token::EndArray) => generator.write_end_array(),
            Some(Token::FieldName) => generator.write_field_name(&self.text),
            Some(Token::ValueString) => generator.write_string(&self.text),
            Some(Token::ValueInt | Token::ValueFloat) => match self.number()? {
                JsonNumber::Int(v) => generator.write_int(*v),
                JsonNumber::BigInt(text) | JsonNumber::BigDecimal(text) => {
                    generator.write_big_number(text)
                }
                JsonNumber::Double(d) => {
                    // The original lexeme is the highest-fidelity form, when
                    // it is a plain JSON number (NaN/Infinity are not).
                    if crate::numbers::is_valid_json_number(&self.text) {
                        generator.write_big_number(&self.text)
                    } else {
                        generator.write_f64(*d)
                    }
                }
            },
            Some(Token::ValueTrue) => generator.write_bool(true),
            Some(Token::ValueFalse) => generator.write_bool(false),
            Some(Token::ValueNull) => generator.write_null(),
            Some(Token::ValueEmbeddedObject) => generator.write_embedded(),
        }
    }

    /// Copies the current value wholesale: a container with all its
    /// children, or a single scalar. Positioned on a member name, copies the
    /// name and then its value.
    ///
    /// # Errors
    ///
    /// Parse errors from this parser, generation/I/O errors from the
    /// generator.
    pub fn copy_current_structure<W: std::io::Write>(
        &mut self,
        generator: &mut Generator<W>,
    ) -> Result<()> {
        let mut token = self
            .current
            .ok_or_else(|| JsonError::generation("no current event to copy"))?;
        if token == Token::FieldName {
            self.copy_current_event(generator)?;
            token = self.next_token()?.ok_or_else(|| {
                JsonError::generation("input ended after a member name during copy")
            })?;
        }
        self.copy_current_event(generator)?;
        if !token.is_structural_start() {
            return Ok(());
        }
        let mut depth = 1usize;
        while depth > 0 {
            let next = self.next_token()?.ok_or_else(|| {
                JsonError::generation("input ended inside a container during copy")
            })?;
            if next == Token::NotAvailable {
                return Err(JsonError::generation(
                    "cannot copy from a starved non-blocking parser",
                ));
            }
            if next.is_structural_start() {
                depth += 1;
            } else if next.is_structural_end() {
                depth -= 1;
            }
            self.copy_current_event(generator)?;
        }
        Ok(())
    }

    /// Reads the current value as a tree through an [`ObjectCodec`].
    ///
    /// # Errors
    ///
    /// Whatever the codec reports.
    pub fn read_value_as<C: ObjectCodec>(&mut self, codec: &C) -> Result<C::Node> {
        codec.read_tree(self)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the parser: merges the session symbol table back into the
    /// factory root, returns recycled buffers, and drops a factory-owned
    /// source (caller-supplied readers are dropped only under
    /// `auto_close_source`).
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.symbols.release();
        self.release_buffers();
        let owned = match &self.input {
            Input::Reader { owned, .. } => *owned,
            _ => false,
        };
        if owned || self.features.auto_close_source {
            // Dropping the boxed reader closes the resource.
            self.input = Input::Complete;
        }
    }

    /// Returns pooled buffers to the recycler without closing the parser.
    pub fn release_buffers(&mut self) {
        if let Some(buf) = self.byte_buf.take() {
            self.recycler.release_bytes(BufferRole::ParserByte, buf);
        }
        if let Some(buf) = self.char_buf.take() {
            self.recycler.release_chars(BufferRole::ParserChar, buf);
        }
    }

    // ------------------------------------------------------------------
    // Error helpers
    // ------------------------------------------------------------------

    fn location_of(&self, pos: Pos) -> Location {
        let content = if self.features.include_source_in_location {
            self.content.clone()
        } else {
            self.content.redacted()
        };
        Location::new(content, pos.byte, pos.ch, pos.line, pos.col)
    }

    fn token_location(&self) -> Location {
        self.location_of(self.lexer.token_position())
    }

    fn syntax_at(&self, err: SyntaxError, pos: Pos) -> JsonError {
        JsonError::syntax(err, self.location_of(pos))
    }

    fn syntax_here(&self, err: SyntaxError) -> JsonError {
        self.syntax_at(err, self.lexer.position())
    }

    fn syntax_token(&self, err: SyntaxError) -> JsonError {
        JsonError::syntax(err, self.token_location())
    }

    fn not_a(&self, what: &str) -> JsonError {
        JsonError::coercion(
            format!(
                "current token ({}) is not a {what}",
                self.current.map_or("<none>", token_name),
            ),
            Some(self.token_location()),
        )
    }
}

fn token_name(token: Token) -> &'static str {
    match token {
        Token::NotAvailable => "NOT_AVAILABLE",
        Token::StartObject => "START_OBJECT",
        Token::EndObject => "END_OBJECT",
        Token::StartArray => "START_ARRAY",
        Token::EndArray => "END_ARRAY",
        Token::FieldName => "FIELD_NAME",
        Token::ValueString => "VALUE_STRING",
        Token::ValueInt => "VALUE_NUMBER_INT",
        Token::ValueFloat => "VALUE_NUMBER_FLOAT",
        Token::ValueTrue => "VALUE_TRUE",
        Token::ValueFalse => "VALUE_FALSE",
        Token::ValueNull => "VALUE_NULL",
        Token::ValueEmbeddedObject => "VALUE_EMBEDDED_OBJECT",
    }
}

impl Drop for Parser {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("current", &self.current)
            .field("state", &self.state)
            .field("depth", &self.ctx.depth())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
