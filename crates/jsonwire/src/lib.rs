//! Streaming JSON: an incremental tokenizer/parser and a write-forward
//! generator sharing one factory.
//!
//! The crate is organized around three objects:
//!
//! - [`JsonFactory`]: long-lived shared state (interned member names,
//!   recycled buffers, default features) and the only sanctioned way to
//!   construct the other two;
//! - [`Parser`]: a pull parser producing a flat [`Token`] stream with
//!   typed accessors for the current value, from text, bytes (with encoding
//!   detection), blocking readers, or explicit non-blocking feeding;
//! - [`Generator`]: the symmetric writer, enforcing the same structural
//!   legality rules on output.
//!
//! ```
//! use jsonwire::{JsonFactory, Token};
//!
//! let factory = JsonFactory::default();
//! let mut parser = factory.parser_for_str(r#"{"answer": 42}"#);
//! assert_eq!(parser.next_token()?, Some(Token::StartObject));
//! assert_eq!(parser.next_token()?, Some(Token::FieldName));
//! assert_eq!(parser.text(), "answer");
//! assert_eq!(parser.next_token()?, Some(Token::ValueInt));
//! assert_eq!(parser.long_value()?, 42);
//! # Ok::<(), jsonwire::JsonError>(())
//! ```

pub mod base64;
mod codec;
mod context;
mod detect;
mod error;
mod factory;
mod features;
mod location;
mod numbers;
mod parser;
mod pointer;
mod recycler;
mod symbols;
mod token;
mod tokenizer;
mod writer;

pub use codec::{ObjectCodec, TreeNode};
pub use context::{ContextKind, StreamContext};
pub use detect::{detect_encoding, JsonEncoding};
pub use error::{ErrorKind, JsonError, Result, SyntaxError};
pub use factory::{InputDecorator, JsonFactory, JsonFactoryBuilder, OutputDecorator};
pub use features::{ReadFeatures, WriteFeatures};
pub use location::{ContentRef, Location, MAX_CONTENT_SNIPPET};
pub use numbers::{is_valid_json_number, JsonNumber};
pub use parser::Parser;
pub use pointer::{Pointer, Segment};
pub use recycler::{BufferRecycler, BufferRole};
pub use symbols::{CollisionPolicy, SymbolSession, SymbolTable, DEFAULT_COLLISION_LIMIT};
pub use token::{NumberType, Token};
pub use writer::{
    CharacterEscapes, DefaultPrettyPrinter, Generator, MinimalPrettyPrinter, PrettyPrinter,
    TypeId, TypeIdInclusion,
};
