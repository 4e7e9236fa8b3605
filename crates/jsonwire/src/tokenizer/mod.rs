//! Incremental lexer over decoded characters.
//!
//! The lexer is fed text in chunks (`push`) and pulled for lexemes (`next`).
//! `Ok(None)` means "need more input": a token may be suspended mid-lexeme
//! (inside a string escape, halfway through a number) and resumes exactly
//! where it stopped when the next chunk arrives. `end` marks end of input,
//! after which `next` either finishes the in-flight token, reports
//! [`Lexeme::EndOfInput`] at a clean boundary, or fails.
//!
//! The lexer knows nothing about structure. It never decides whether a string
//! is a member name or a value, and it does not validate commas or colons;
//! the parser layers those rules on top. The one structural hint it takes is
//! `expect_name`, which gates unquoted-name lexing.
//!
//! Numbers are emitted only once a delimiter is seen (which is *not*
//! consumed) or input ends; this is what makes number lexing restartable
//! across chunk boundaries.

mod escape;
mod literal;

use std::collections::VecDeque;

use escape::UnicodeEscapeBuffer;
use literal::{LiteralKind, LiteralMatcher, Step};

use crate::{error::SyntaxError, features::ReadFeatures};

/// A position snapshot in the decoded character stream.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pos {
    pub byte: u64,
    pub ch: u64,
    pub line: u64,
    pub col: u64,
}

impl Default for Pos {
    fn default() -> Self {
        Pos {
            byte: 0,
            ch: 0,
            line: 1,
            col: 1,
        }
    }
}

/// A lexical token with its payload. Structure-free; see the parser for
/// classification into [`crate::Token`]s.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lexeme {
    /// One of `{` `}` `[` `]` `:` `,`.
    Punct(u8),
    /// A quoted string, fully unescaped.
    Str(String),
    /// An unquoted member name (feature-gated).
    UnquotedName(String),
    /// A number lexeme, syntactically validated.
    Num { text: String, is_float: bool },
    True,
    False,
    Null,
    NaN,
    PosInf,
    NegInf,
    /// Input exhausted at a token boundary.
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Between,
    SlashSeen,
    LineComment,
    BlockComment,
    BlockCommentStar,
    Str,
    StrEscape,
    StrUnicode,
    StrSurrogateBackslash,
    StrSurrogateU,
    Name,
    NumSign,
    NumZero,
    NumInt,
    NumDot,
    NumFrac,
    NumExp,
    NumExpSign,
    NumExpInt,
    Literal,
}

#[derive(Debug)]
pub(crate) struct Lexer {
    input: VecDeque<char>,
    end_of_input: bool,
    features: ReadFeatures,
    state: State,
    scratch: String,
    quote: char,
    is_float: bool,
    escape: UnicodeEscapeBuffer,
    pending_high: Option<u32>,
    literal: Option<LiteralMatcher>,
    pos: Pos,
    token_start: Pos,
    last_was_cr: bool,
}

impl Lexer {
    pub(crate) fn new(features: ReadFeatures) -> Self {
        Lexer {
            input: VecDeque::new(),
            end_of_input: false,
            features,
            state: State::Between,
            scratch: String::new(),
            quote: '"',
            is_float: false,
            escape: UnicodeEscapeBuffer::default(),
            pending_high: None,
            literal: None,
            pos: Pos::default(),
            token_start: Pos::default(),
            last_was_cr: false,
        }
    }

    /// Appends decoded text to the unread ring.
    pub(crate) fn push(&mut self, chunk: &str) {
        self.input.reserve(chunk.len());
        self.input.extend(chunk.chars());
    }

    /// Marks that no further input will arrive.
    pub(crate) fn end(&mut self) {
        self.end_of_input = true;
    }

    /// Whether `end` has been called.
    pub(crate) fn at_end(&self) -> bool {
        self.end_of_input
    }

    /// Current read position.
    pub(crate) fn position(&self) -> Pos {
        self.pos
    }

    /// Position where the current (or last returned) token started.
    pub(crate) fn token_position(&self) -> Pos {
        self.token_start
    }

    #[inline]
    fn consume(&mut self) -> char {
        let ch = self.input.pop_front().expect("caller checked front");
        self.pos.byte += ch.len_utf8() as u64;
        self.pos.ch += 1;
        match ch {
            '\n' => {
                if self.last_was_cr {
                    // Second half of CRLF; the line was already counted.
                    self.last_was_cr = false;
                } else {
                    self.pos.line += 1;
                    self.pos.col = 1;
                }
            }
            '\r' => {
                self.pos.line += 1;
                self.pos.col = 1;
                self.last_was_cr = true;
            }
            _ => {
                self.pos.col += 1;
                self.last_was_cr = false;
            }
        }
        ch
    }

    fn emit_number(&mut self) -> Lexeme {
        self.state = State::Between;
        Lexeme::Num {
            text: std::mem::take(&mut self.scratch),
            is_float: self.is_float,
        }
    }

    fn literal_lexeme(kind: LiteralKind) -> Lexeme {
        match kind {
            LiteralKind::True => Lexeme::True,
            LiteralKind::False => Lexeme::False,
            LiteralKind::Null => Lexeme::Null,
            LiteralKind::NaN => Lexeme::NaN,
            LiteralKind::Infinity => Lexeme::PosInf,
            LiteralKind::NegInfinity => Lexeme::NegInf,
        }
    }

    /// Pulls the next lexeme.
    ///
    /// `Ok(None)` means more input is needed. `expect_name` enables
    /// unquoted-name lexing for object member positions.
    pub(crate) fn next(&mut self, expect_name: bool) -> Result<Option<Lexeme>, SyntaxError> {
        loop {
            let Some(&ch) = self.input.front() else {
                if self.end_of_input {
                    match self.finish_at_end()? {
                        Some(lexeme) => return Ok(Some(lexeme)),
                        None => continue,
                    }
                }
                return Ok(None);
            };

            match self.state {
                State::Between => {
                    match ch {
                        ' ' | '\t' | '\n' | '\r' => {
                            self.consume();
                        }
                        '{' | '}' | '[' | ']' | ':' | ',' => {
                            self.token_start = self.pos;
                            self.consume();
                            return Ok(Some(Lexeme::Punct(ch as u8)));
                        }
                        '"' => {
                            self.start_string(ch);
                        }
                        '\'' if self.features.allow_single_quotes => {
                            self.start_string(ch);
                        }
                        '/' if self.features.allow_comments => {
                            self.consume();
                            self.state = State::SlashSeen;
                        }
                        '#' if self.features.allow_hash_comments => {
                            self.consume();
                            self.state = State::LineComment;
                        }
                        '-' => {
                            self.token_start = self.pos;
                            self.consume();
                            self.scratch.clear();
                            self.scratch.push('-');
                            self.is_float = false;
                            self.state = State::NumSign;
                        }
                        '0'..='9' => {
                            self.token_start = self.pos;
                            self.consume();
                            self.scratch.clear();
                            self.scratch.push(ch);
                            self.is_float = false;
                            self.state = if ch == '0' { State::NumZero } else { State::NumInt };
                        }
                        '.' if self.features.allow_leading_decimal_point => {
                            self.token_start = self.pos;
                            self.consume();
                            self.scratch.clear();
                            self.scratch.push('.');
                            self.is_float = true;
                            self.state = State::NumDot;
                        }
                        _ => {
                            if let Some(matcher) = LiteralMatcher::after_first(
                                ch,
                                self.features.allow_non_numeric_numbers,
                            ) {
                                self.token_start = self.pos;
                                self.consume();
                                self.literal = Some(matcher);
                                self.state = State::Literal;
                            } else if expect_name
                                && self.features.allow_unquoted_field_names
                                && is_name_start(ch)
                            {
                                self.token_start = self.pos;
                                self.consume();
                                self.scratch.clear();
                                self.scratch.push(ch);
                                self.state = State::Name;
                            } else {
                                return Err(SyntaxError::UnexpectedCharacter(ch));
                            }
                        }
                    }
                }

                State::SlashSeen => {
                    self.consume();
                    match ch {
                        '/' => self.state = State::LineComment,
                        '*' => self.state = State::BlockComment,
                        _ => return Err(SyntaxError::UnexpectedCharacter(ch)),
                    }
                }
                State::LineComment => {
                    self.consume();
                    if ch == '\n' || ch == '\r' {
                        self.state = State::Between;
                    }
                }
                State::BlockComment => {
                    self.consume();
                    if ch == '*' {
                        self.state = State::BlockCommentStar;
                    }
                }
                State::BlockCommentStar => {
                    self.consume();
                    match ch {
                        '/' => self.state = State::Between,
                        '*' => {}
                        _ => self.state = State::BlockComment,
                    }
                }

                State::Str => {
                    self.consume();
                    if ch == self.quote {
                        self.state = State::Between;
                        return Ok(Some(Lexeme::Str(std::mem::take(&mut self.scratch))));
                    }
                    if ch == '\\' {
                        self.state = State::StrEscape;
                    } else if (ch as u32) < 0x20 {
                        if self.features.allow_unescaped_control_chars {
                            self.scratch.push(ch);
                        } else {
                            return Err(SyntaxError::UnescapedControlChar(ch as u32));
                        }
                    } else {
                        self.scratch.push(ch);
                    }
                }
                State::StrEscape => {
                    self.consume();
                    let decoded = match ch {
                        '"' => Some('"'),
                        '\\' => Some('\\'),
                        '/' => Some('/'),
                        'b' => Some('\u{8}'),
                        'f' => Some('\u{c}'),
                        'n' => Some('\n'),
                        'r' => Some('\r'),
                        't' => Some('\t'),
                        'u' => {
                            self.escape.reset();
                            self.state = State::StrUnicode;
                            None
                        }
                        _ if self.features.allow_backslash_escaping_any => Some(ch),
                        _ => return Err(SyntaxError::InvalidEscape(ch)),
                    };
                    if let Some(c) = decoded {
                        self.scratch.push(c);
                        self.state = State::Str;
                    }
                }
                State::StrUnicode => {
                    self.consume();
                    if let Some(code) = self.escape.feed(ch)? {
                        self.complete_unicode_escape(code)?;
                    }
                }
                State::StrSurrogateBackslash => {
                    self.consume();
                    if ch != '\\' {
                        let high = self.pending_high.take().unwrap_or(0);
                        return Err(SyntaxError::InvalidUnicodeEscapeSequence(high));
                    }
                    self.state = State::StrSurrogateU;
                }
                State::StrSurrogateU => {
                    self.consume();
                    if ch != 'u' {
                        let high = self.pending_high.take().unwrap_or(0);
                        return Err(SyntaxError::InvalidUnicodeEscapeSequence(high));
                    }
                    self.escape.reset();
                    self.state = State::StrUnicode;
                }

                State::Name => {
                    if is_name_part(ch) {
                        self.consume();
                        self.scratch.push(ch);
                    } else {
                        self.state = State::Between;
                        return Ok(Some(Lexeme::UnquotedName(std::mem::take(
                            &mut self.scratch,
                        ))));
                    }
                }

                State::NumSign => match ch {
                    '0' => {
                        self.consume();
                        self.scratch.push('0');
                        self.state = State::NumZero;
                    }
                    '1'..='9' => {
                        self.consume();
                        self.scratch.push(ch);
                        self.state = State::NumInt;
                    }
                    '.' if self.features.allow_leading_decimal_point => {
                        self.consume();
                        self.scratch.push('.');
                        self.is_float = true;
                        self.state = State::NumDot;
                    }
                    'I' if self.features.allow_non_numeric_numbers => {
                        self.consume();
                        self.literal = Some(LiteralMatcher::neg_infinity_after_i());
                        self.state = State::Literal;
                    }
                    _ => {
                        return Err(SyntaxError::MalformedNumber(
                            "expected digit after minus sign",
                        ));
                    }
                },
                State::NumZero => match ch {
                    '0'..='9' => {
                        if self.features.allow_leading_zeros {
                            self.consume();
                            self.scratch.push(ch);
                            if ch != '0' {
                                self.state = State::NumInt;
                            }
                        } else {
                            return Err(SyntaxError::MalformedNumber(
                                "leading zeroes not allowed",
                            ));
                        }
                    }
                    '.' => {
                        self.consume();
                        self.scratch.push('.');
                        self.is_float = true;
                        self.state = State::NumDot;
                    }
                    'e' | 'E' => {
                        self.consume();
                        self.scratch.push(ch);
                        self.is_float = true;
                        self.state = State::NumExp;
                    }
                    _ => return Ok(Some(self.emit_number())),
                },
                State::NumInt => match ch {
                    '0'..='9' => {
                        self.consume();
                        self.scratch.push(ch);
                    }
                    '.' => {
                        self.consume();
                        self.scratch.push('.');
                        self.is_float = true;
                        self.state = State::NumDot;
                    }
                    'e' | 'E' => {
                        self.consume();
                        self.scratch.push(ch);
                        self.is_float = true;
                        self.state = State::NumExp;
                    }
                    _ => return Ok(Some(self.emit_number())),
                },
                State::NumDot => match ch {
                    '0'..='9' => {
                        self.consume();
                        self.scratch.push(ch);
                        self.state = State::NumFrac;
                    }
                    _ => {
                        return Err(SyntaxError::MalformedNumber(
                            "expected digit after decimal point",
                        ));
                    }
                },
                State::NumFrac => match ch {
                    '0'..='9' => {
                        self.consume();
                        self.scratch.push(ch);
                    }
                    'e' | 'E' => {
                        self.consume();
                        self.scratch.push(ch);
                        self.state = State::NumExp;
                    }
                    _ => return Ok(Some(self.emit_number())),
                },
                State::NumExp => match ch {
                    '0'..='9' => {
                        self.consume();
                        self.scratch.push(ch);
                        self.state = State::NumExpInt;
                    }
                    '+' | '-' => {
                        self.consume();
                        self.scratch.push(ch);
                        self.state = State::NumExpSign;
                    }
                    _ => {
                        return Err(SyntaxError::MalformedNumber(
                            "expected digit or sign in exponent",
                        ));
                    }
                },
                State::NumExpSign => match ch {
                    '0'..='9' => {
                        self.consume();
                        self.scratch.push(ch);
                        self.state = State::NumExpInt;
                    }
                    _ => {
                        return Err(SyntaxError::MalformedNumber("expected digit in exponent"));
                    }
                },
                State::NumExpInt => match ch {
                    '0'..='9' => {
                        self.consume();
                        self.scratch.push(ch);
                    }
                    _ => return Ok(Some(self.emit_number())),
                },

                State::Literal => {
                    let mut matcher = self.literal.take().expect("literal matcher in flight");
                    match matcher.step(ch) {
                        Step::NeedMore => {
                            self.consume();
                            self.literal = Some(matcher);
                        }
                        Step::Done(kind) => {
                            self.consume();
                            self.state = State::Between;
                            return Ok(Some(Self::literal_lexeme(kind)));
                        }
                        Step::Reject => {
                            return Err(SyntaxError::UnexpectedCharacter(ch));
                        }
                    }
                }
            }
        }
    }

    fn start_string(&mut self, quote: char) {
        self.token_start = self.pos;
        self.consume();
        self.scratch.clear();
        self.quote = quote;
        self.pending_high = None;
        self.state = State::Str;
    }

    fn complete_unicode_escape(&mut self, code: u32) -> Result<(), SyntaxError> {
        if let Some(high) = self.pending_high.take() {
            if (0xDC00..=0xDFFF).contains(&code) {
                let combined = 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00);
                let ch = char::from_u32(combined)
                    .ok_or(SyntaxError::InvalidUnicodeEscapeSequence(combined))?;
                self.scratch.push(ch);
                self.state = State::Str;
            } else {
                return Err(SyntaxError::InvalidUnicodeEscapeSequence(high));
            }
        } else if (0xD800..=0xDBFF).contains(&code) {
            // High surrogate: the pair's second escape must follow directly.
            self.pending_high = Some(code);
            self.state = State::StrSurrogateBackslash;
        } else if (0xDC00..=0xDFFF).contains(&code) {
            return Err(SyntaxError::InvalidUnicodeEscapeSequence(code));
        } else {
            let ch =
                char::from_u32(code).ok_or(SyntaxError::InvalidUnicodeEscapeSequence(code))?;
            self.scratch.push(ch);
            self.state = State::Str;
        }
        Ok(())
    }

    /// Resolves the in-flight state once input is exhausted.
    ///
    /// `Ok(None)` means the state was folded away (e.g. a trailing line
    /// comment) and the caller should loop.
    fn finish_at_end(&mut self) -> Result<Option<Lexeme>, SyntaxError> {
        match self.state {
            State::Between => Ok(Some(Lexeme::EndOfInput)),
            State::LineComment => {
                self.state = State::Between;
                Ok(None)
            }
            State::SlashSeen | State::BlockComment | State::BlockCommentStar => {
                Err(SyntaxError::UnexpectedEndOfInput(" in comment"))
            }
            State::Str
            | State::StrEscape
            | State::StrUnicode
            | State::StrSurrogateBackslash
            | State::StrSurrogateU => Err(SyntaxError::UnexpectedEndOfInput(" in string value")),
            State::Name => {
                self.state = State::Between;
                Ok(Some(Lexeme::UnquotedName(std::mem::take(&mut self.scratch))))
            }
            State::NumZero | State::NumInt | State::NumFrac | State::NumExpInt => {
                Ok(Some(self.emit_number()))
            }
            State::NumSign => Err(SyntaxError::MalformedNumber(
                "expected digit after minus sign",
            )),
            State::NumDot => Err(SyntaxError::MalformedNumber(
                "expected digit after decimal point",
            )),
            State::NumExp | State::NumExpSign => {
                Err(SyntaxError::MalformedNumber("expected digit in exponent"))
            }
            State::Literal => Err(SyntaxError::UnexpectedEndOfInput(" in literal")),
        }
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_name_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}
