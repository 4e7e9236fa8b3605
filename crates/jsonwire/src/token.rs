//! Token and number-type enumerations shared by the parser and generator.
//!
//! A [`Token`] is a classified unit of JSON syntax: a structural marker or a
//! scalar value. Tokens carry no payload; the parser that produced a token
//! keeps the associated text/number and exposes it through accessors while the
//! token is current.

/// A classified unit of JSON syntax.
///
/// Exactly one token is "current" at a time per parser or generator. Scalar
/// tokens are mutually exclusive with structural tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Returned by a non-blocking parser when more input must be fed before
    /// the next token can be decided. Never returned by blocking parsers.
    NotAvailable,
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// An object member name.
    FieldName,
    /// A string scalar.
    ValueString,
    /// An integral number scalar (any width).
    ValueInt,
    /// A floating-point number scalar (any width).
    ValueFloat,
    /// `true`
    ValueTrue,
    /// `false`
    ValueFalse,
    /// `null`
    ValueNull,
    /// An opaque value injected by a non-JSON backend. Plain JSON never
    /// produces this token; the generator rejects writing it.
    ValueEmbeddedObject,
}

impl Token {
    /// Stable numeric id for fast dispatch tables.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Token::NotAvailable => 0,
            Token::StartObject => 1,
            Token::EndObject => 2,
            Token::StartArray => 3,
            Token::EndArray => 4,
            Token::FieldName => 5,
            Token::ValueEmbeddedObject => 6,
            Token::ValueString => 7,
            Token::ValueInt => 8,
            Token::ValueFloat => 9,
            Token::ValueTrue => 10,
            Token::ValueFalse => 11,
            Token::ValueNull => 12,
        }
    }

    /// `true` for `{` and `[`.
    #[must_use]
    pub const fn is_structural_start(self) -> bool {
        matches!(self, Token::StartObject | Token::StartArray)
    }

    /// `true` for `}` and `]`.
    #[must_use]
    pub const fn is_structural_end(self) -> bool {
        matches!(self, Token::EndObject | Token::EndArray)
    }

    /// `true` for any scalar-value token (string, number, boolean, null,
    /// embedded object).
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Token::ValueString
                | Token::ValueInt
                | Token::ValueFloat
                | Token::ValueTrue
                | Token::ValueFalse
                | Token::ValueNull
                | Token::ValueEmbeddedObject
        )
    }

    /// `true` for the two numeric tokens.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Token::ValueInt | Token::ValueFloat)
    }

    /// `true` for `ValueTrue` and `ValueFalse`.
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(self, Token::ValueTrue | Token::ValueFalse)
    }

    /// The literal characters this token guarantees in the document, if any.
    #[must_use]
    pub const fn as_static_str(self) -> Option<&'static str> {
        match self {
            Token::StartObject => Some("{"),
            Token::EndObject => Some("}"),
            Token::StartArray => Some("["),
            Token::EndArray => Some("]"),
            Token::ValueTrue => Some("true"),
            Token::ValueFalse => Some("false"),
            Token::ValueNull => Some("null"),
            _ => None,
        }
    }
}

/// The optimal native representation for the current number token, chosen
/// lazily from its lexical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberType {
    /// Fits a signed 32-bit integer.
    Int,
    /// Fits a signed 64-bit integer but not 32 bits.
    Long,
    /// Integral, wider than 64 bits; exact text is retained.
    BigInteger,
    /// Requested as a 32-bit float.
    Float,
    /// Floating-point lexical form, represented as a 64-bit float.
    Double,
    /// Floating-point form whose exact decimal text is retained.
    BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_and_stable() {
        let all = [
            Token::NotAvailable,
            Token::StartObject,
            Token::EndObject,
            Token::StartArray,
            Token::EndArray,
            Token::FieldName,
            Token::ValueEmbeddedObject,
            Token::ValueString,
            Token::ValueInt,
            Token::ValueFloat,
            Token::ValueTrue,
            Token::ValueFalse,
            Token::ValueNull,
        ];
        for (i, t) in all.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let expect = i as u8;
            assert_eq!(t.id(), expect);
        }
    }

    #[test]
    fn classification() {
        assert!(Token::StartArray.is_structural_start());
        assert!(Token::EndObject.is_structural_end());
        assert!(Token::ValueNull.is_scalar());
        assert!(Token::ValueInt.is_numeric());
        assert!(Token::ValueFloat.is_numeric());
        assert!(!Token::FieldName.is_scalar());
        assert!(Token::ValueTrue.is_boolean());
        assert_eq!(Token::ValueTrue.as_static_str(), Some("true"));
        assert_eq!(Token::FieldName.as_static_str(), None);
    }
}
