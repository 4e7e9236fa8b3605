//! Number representation and conversion rules.
//!
//! The parser classifies every number token lazily from its lexical form into
//! a [`JsonNumber`]: integers that fit 64 bits stay native, wider integers and
//! exact decimals keep their text. Conversions are total and explicit:
//! narrowing that would overflow reports the failure instead of wrapping, and
//! float-to-integer narrowing truncates toward zero only because the caller
//! asked for an integer.

use crate::token::NumberType;

/// A parsed JSON number in its optimal native representation.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNumber {
    /// Integral value within the signed 64-bit range.
    Int(i64),
    /// Integral value wider than 64 bits, kept as its exact decimal text.
    BigInt(String),
    /// Floating-point value.
    Double(f64),
    /// Exact decimal text, for callers that must not go through binary
    /// floating point.
    BigDecimal(String),
}

impl JsonNumber {
    /// Classifies a validated number lexeme.
    ///
    /// `is_float` reflects the lexical form: presence of a fraction or
    /// exponent. The lexer guarantees the text matches the JSON grammar.
    #[must_use]
    pub(crate) fn classify(text: &str, is_float: bool) -> Self {
        if is_float {
            // Lexically valid JSON floats always parse; huge exponents
            // overflow to infinity, matching IEEE widening.
            JsonNumber::Double(text.parse().unwrap_or(f64::INFINITY))
        } else {
            match text.parse::<i64>() {
                Ok(v) => JsonNumber::Int(v),
                Err(_) => JsonNumber::BigInt(text.to_owned()),
            }
        }
    }

    /// The optimal native representation for this value.
    #[must_use]
    pub fn number_type(&self) -> NumberType {
        match self {
            JsonNumber::Int(v) => {
                if i32::try_from(*v).is_ok() {
                    NumberType::Int
                } else {
                    NumberType::Long
                }
            }
            JsonNumber::BigInt(_) => NumberType::BigInteger,
            JsonNumber::Double(_) => NumberType::Double,
            JsonNumber::BigDecimal(_) => NumberType::BigDecimal,
        }
    }

    /// `true` when the lexical form was integral.
    #[must_use]
    pub fn is_integral(&self) -> bool {
        matches!(self, JsonNumber::Int(_) | JsonNumber::BigInt(_))
    }

    pub(crate) fn to_i32(&self) -> Result<i32, String> {
        match self {
            JsonNumber::Int(v) => i32::try_from(*v)
                .map_err(|_| format!("numeric value ({v}) out of range of i32")),
            JsonNumber::BigInt(text) => {
                Err(format!("numeric value ({text}) out of range of i32"))
            }
            JsonNumber::Double(d) => double_to_int(*d, f64::from(i32::MIN), f64::from(i32::MAX))
                .map(|v| v as i32)
                .ok_or_else(|| format!("numeric value ({d}) out of range of i32")),
            JsonNumber::BigDecimal(text) => {
                let d: f64 = text
                    .parse()
                    .map_err(|_| format!("not a valid number: {text}"))?;
                JsonNumber::Double(d).to_i32()
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn to_i64(&self) -> Result<i64, String> {
        match self {
            JsonNumber::Int(v) => Ok(*v),
            JsonNumber::BigInt(text) => {
                Err(format!("numeric value ({text}) out of range of i64"))
            }
            JsonNumber::Double(d) => double_to_int(*d, i64::MIN as f64, i64::MAX as f64)
                .ok_or_else(|| format!("numeric value ({d}) out of range of i64")),
            JsonNumber::BigDecimal(text) => {
                let d: f64 = text
                    .parse()
                    .map_err(|_| format!("not a valid number: {text}"))?;
                JsonNumber::Double(d).to_i64()
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn to_f64(&self) -> Result<f64, String> {
        match self {
            JsonNumber::Int(v) => Ok(*v as f64),
            JsonNumber::BigInt(text) | JsonNumber::BigDecimal(text) => text
                .parse()
                .map_err(|_| format!("not a valid number: {text}")),
            JsonNumber::Double(d) => Ok(*d),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn to_f32(&self) -> Result<f32, String> {
        let d = self.to_f64()?;
        if d.is_finite() && d.abs() > f64::from(f32::MAX) {
            return Err(format!("numeric value ({d}) out of range of f32"));
        }
        Ok(d as f32)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn double_to_int(d: f64, min: f64, max: f64) -> Option<i64> {
    // Truncation toward zero; out-of-range is a coercion failure, not a wrap.
    let t = d.trunc();
    if t.is_nan() || t < min || t > max {
        None
    } else {
        Some(t as i64)
    }
}

/// Validates text against the RFC 8259 number grammar.
///
/// Used to vet caller-supplied big-integer/decimal text before it is written
/// verbatim into a document.
#[must_use]
pub fn is_valid_json_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    // Integer part: `0` or a nonzero digit followed by digits.
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let start = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let start = i;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}
