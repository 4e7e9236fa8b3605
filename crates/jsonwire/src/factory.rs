//! The factory: shared state and construction of parsers and generators.
//!
//! A [`JsonFactory`] is the long-lived object of this crate. It owns the root
//! symbol table and the buffer recycler, carries the default feature sets and
//! Base64 variant, and stamps out parser and generator instances wired to
//! that shared state. Factories are cheap to clone-construct from a builder
//! and are meant to be created once and reused for every document.
//!
//! Ownership rule: resources the factory opens itself (files) belong to the
//! instance and are released when it closes; caller-supplied readers and
//! writers follow the `auto_close_source` / `auto_close_target` features.

use std::{
    fs::File,
    io::{self, Cursor, Read, Write},
    path::Path,
};

use bstr::ByteSlice;

use crate::{
    base64::{Base64Variant, MIME_NO_LINEFEEDS},
    detect::{detect_encoding, Decoder, JsonEncoding},
    error::{JsonError, Result},
    features::{ReadFeatures, WriteFeatures},
    location::ContentRef,
    parser::{Input, Parser},
    recycler::BufferRecycler,
    symbols::{CollisionPolicy, SymbolTable, DEFAULT_COLLISION_LIMIT},
    writer::{Generator, MinimalPrettyPrinter},
};

/// Wraps every input stream a factory-built parser reads from.
pub trait InputDecorator: Send + Sync {
    /// Returns the stream to read instead of `input`.
    fn decorate(&self, input: Box<dyn Read>) -> Box<dyn Read>;
}

/// Wraps every output stream a factory-built generator writes to.
pub trait OutputDecorator: Send + Sync {
    /// Returns the sink to write instead of `output`.
    fn decorate(&self, output: Box<dyn Write>) -> Box<dyn Write>;
}

/// Shared construction state for parsers and generators.
pub struct JsonFactory {
    symbols: SymbolTable,
    recycler: BufferRecycler,
    read_features: ReadFeatures,
    write_features: WriteFeatures,
    base64: Base64Variant,
    root_separator: String,
    input_decorator: Option<Box<dyn InputDecorator>>,
    output_decorator: Option<Box<dyn OutputDecorator>>,
}

impl Default for JsonFactory {
    fn default() -> Self {
        JsonFactory::builder().build()
    }
}

impl std::fmt::Debug for JsonFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFactory")
            .field("base64", &self.base64.name())
            .field("interned", &self.symbols.root_len())
            .finish_non_exhaustive()
    }
}

impl JsonFactory {
    /// Starts building a factory.
    #[must_use]
    pub fn builder() -> JsonFactoryBuilder {
        JsonFactoryBuilder::default()
    }

    /// The factory's default read features.
    #[must_use]
    pub fn read_features(&self) -> ReadFeatures {
        self.read_features
    }

    /// The factory's default write features.
    #[must_use]
    pub fn write_features(&self) -> WriteFeatures {
        self.write_features
    }

    /// Sniffs the encoding of a byte prefix; see [`detect_encoding`].
    #[must_use]
    pub fn detect_encoding(head: &[u8]) -> JsonEncoding {
        detect_encoding(head).0
    }

    // ------------------------------------------------------------------
    // Parsers
    // ------------------------------------------------------------------

    /// A parser over in-memory text.
    #[must_use]
    pub fn parser_for_str(&self, text: &str) -> Parser {
        let mut parser = self.build_parser(Input::Complete, ContentRef::for_text(text));
        parser.lexer_mut().push(text);
        parser.lexer_mut().end();
        parser
    }

    /// A parser over in-memory bytes; the encoding is detected, never
    /// assumed.
    ///
    /// # Errors
    ///
    /// Syntax error when the bytes are not valid in the detected encoding.
    pub fn parser_for_bytes(&self, bytes: &[u8]) -> Result<Parser> {
        let (encoding, bom) = detect_encoding(bytes);
        let data = &bytes[bom..];
        let content = if encoding == JsonEncoding::Utf8 {
            // Lossy is fine for a diagnostics snippet.
            ContentRef::for_text(&data.to_str_lossy())
        } else {
            ContentRef::Bytes
        };
        let mut decoder = Decoder::new(encoding);
        let mut text = String::new();
        decoder
            .decode(data, &mut text)
            .and_then(|()| decoder.finish())
            .map_err(|e| JsonError::new(e.into()))?;
        let mut parser = self.build_parser(Input::Complete, content);
        parser.lexer_mut().push(&text);
        parser.lexer_mut().end();
        Ok(parser)
    }

    /// A parser over a caller-supplied reader. The head is sniffed for the
    /// encoding; input decoration applies.
    ///
    /// # Errors
    ///
    /// I/O errors from reading the head.
    pub fn parser_for_reader(&self, reader: impl Read + 'static) -> Result<Parser> {
        self.reader_parser(Box::new(reader), false, ContentRef::Stream)
    }

    /// A parser over a file the factory opens (and therefore owns).
    ///
    /// # Errors
    ///
    /// I/O errors opening or reading the file.
    pub fn parser_for_file(&self, path: impl AsRef<Path>) -> Result<Parser> {
        let path = path.as_ref();
        let file = File::open(path)?;
        self.reader_parser(
            Box::new(io::BufReader::new(file)),
            true,
            ContentRef::File(path.to_owned()),
        )
    }

    /// A non-blocking parser fed explicitly via [`Parser::feed`]. Input is
    /// UTF-8 (the only encoding with unambiguous chunk boundaries at any
    /// split point).
    #[must_use]
    pub fn non_blocking_parser(&self) -> Parser {
        self.build_parser(
            Input::Push {
                decoder: Decoder::new(JsonEncoding::Utf8),
            },
            ContentRef::Unknown,
        )
    }

    fn reader_parser(
        &self,
        mut reader: Box<dyn Read>,
        owned: bool,
        content: ContentRef,
    ) -> Result<Parser> {
        // Pull up to four bytes for the sniff, then splice them back in
        // front of the remaining stream.
        let mut head = [0u8; 4];
        let mut filled = 0;
        while filled < head.len() {
            let n = reader.read(&mut head[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        let (encoding, bom) = detect_encoding(&head[..filled]);
        let spliced: Box<dyn Read> = Box::new(Cursor::new(head[bom..filled].to_vec()).chain(reader));
        let source = match &self.input_decorator {
            Some(decorator) => decorator.decorate(spliced),
            None => spliced,
        };
        Ok(self.build_parser(
            Input::Reader {
                source,
                decoder: Decoder::new(encoding),
                owned,
            },
            content,
        ))
    }

    fn build_parser(&self, input: Input, content: ContentRef) -> Parser {
        Parser::new(
            input,
            self.read_features,
            self.symbols.session(),
            self.recycler.clone(),
            content,
        )
    }

    // ------------------------------------------------------------------
    // Generators
    // ------------------------------------------------------------------

    /// A generator writing UTF-8 to a caller-supplied sink; output
    /// decoration applies.
    pub fn generator<W: Write + 'static>(&self, out: W) -> Generator<Box<dyn Write>> {
        let sink: Box<dyn Write> = match &self.output_decorator {
            Some(decorator) => decorator.decorate(Box::new(out)),
            None => Box::new(out),
        };
        Generator::new(
            sink,
            self.write_features,
            self.base64.clone(),
            Box::new(MinimalPrettyPrinter {
                root_separator: self.root_separator.clone(),
            }),
            self.recycler.clone(),
        )
    }

    /// A generator writing to a file the factory creates.
    ///
    /// # Errors
    ///
    /// I/O errors creating the file.
    pub fn generator_for_file(&self, path: impl AsRef<Path>) -> Result<Generator<Box<dyn Write>>> {
        let file = File::create(path)?;
        Ok(self.generator(io::BufWriter::new(file)))
    }
}

/// Builder for [`JsonFactory`].
pub struct JsonFactoryBuilder {
    read_features: ReadFeatures,
    write_features: WriteFeatures,
    base64: Base64Variant,
    root_separator: String,
    collision_limit: usize,
    collision_policy: CollisionPolicy,
    recycling: bool,
    input_decorator: Option<Box<dyn InputDecorator>>,
    output_decorator: Option<Box<dyn OutputDecorator>>,
}

impl Default for JsonFactoryBuilder {
    fn default() -> Self {
        JsonFactoryBuilder {
            read_features: ReadFeatures::default(),
            write_features: WriteFeatures::default(),
            base64: MIME_NO_LINEFEEDS,
            root_separator: " ".to_owned(),
            collision_limit: DEFAULT_COLLISION_LIMIT,
            collision_policy: CollisionPolicy::default(),
            recycling: true,
            input_decorator: None,
            output_decorator: None,
        }
    }
}

impl JsonFactoryBuilder {
    /// Default features for every parser built by the factory.
    #[must_use]
    pub fn read_features(mut self, features: ReadFeatures) -> Self {
        self.read_features = features;
        self
    }

    /// Default features for every generator built by the factory.
    #[must_use]
    pub fn write_features(mut self, features: WriteFeatures) -> Self {
        self.write_features = features;
        self
    }

    /// Default Base64 variant for binary values.
    #[must_use]
    pub fn base64_variant(mut self, variant: Base64Variant) -> Self {
        self.base64 = variant;
        self
    }

    /// Separator written between root-level values.
    #[must_use]
    pub fn root_separator(mut self, separator: impl Into<String>) -> Self {
        self.root_separator = separator.into();
        self
    }

    /// Symbol-table hash-collision defense configuration.
    #[must_use]
    pub fn collision_defense(mut self, limit: usize, policy: CollisionPolicy) -> Self {
        self.collision_limit = limit;
        self.collision_policy = policy;
        self
    }

    /// Disables buffer pooling; every instance allocates fresh.
    #[must_use]
    pub fn without_recycling(mut self) -> Self {
        self.recycling = false;
        self
    }

    /// Wraps every input stream before parsing.
    #[must_use]
    pub fn input_decorator(mut self, decorator: Box<dyn InputDecorator>) -> Self {
        self.input_decorator = Some(decorator);
        self
    }

    /// Wraps every output sink before generation.
    #[must_use]
    pub fn output_decorator(mut self, decorator: Box<dyn OutputDecorator>) -> Self {
        self.output_decorator = Some(decorator);
        self
    }

    /// Finishes the factory.
    #[must_use]
    pub fn build(self) -> JsonFactory {
        JsonFactory {
            symbols: SymbolTable::new(self.collision_limit, self.collision_policy),
            recycler: if self.recycling {
                BufferRecycler::new()
            } else {
                BufferRecycler::disabled()
            },
            read_features: self.read_features,
            write_features: self.write_features,
            base64: self.base64,
            root_separator: self.root_separator,
            input_decorator: self.input_decorator,
            output_decorator: self.output_decorator,
        }
    }
}
