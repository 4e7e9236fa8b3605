#![allow(missing_docs)]

use jsonwire::{Generator, JsonFactory, NumberType, ReadFeatures, Token};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use serde_json::Value;

/// Parses `text` and replays every root value onto a fresh generator,
/// returning the regenerated document.
fn copied(text: &str) -> String {
    let factory = JsonFactory::default();
    let mut parser = factory.parser_for_str(text);
    let mut generator = Generator::from_writer(Vec::new());
    while parser.next_token().expect("parse failure").is_some() {
        parser
            .copy_current_structure(&mut generator)
            .expect("copy failure");
    }
    let bytes = generator.into_inner().expect("close failure");
    String::from_utf8(bytes).expect("generated output is UTF-8")
}

/// Flattens a document into its token stream plus the text of every token
/// that carries one. Whitespace and escaping choices drop out, so two
/// documents with this same stream are semantically identical.
fn token_stream(text: &str) -> Vec<(Token, String)> {
    let factory = JsonFactory::default();
    let mut parser = factory.parser_for_str(text);
    let mut stream = Vec::new();
    while let Some(token) = parser.next_token().expect("parse failure") {
        let text = match token {
            Token::FieldName | Token::ValueString | Token::ValueInt | Token::ValueFloat => {
                parser.text().to_owned()
            }
            _ => String::new(),
        };
        stream.push((token, text));
    }
    stream
}

#[test]
fn copy_preserves_exact_number_lexemes() {
    let text = "[-0.50,1e2,123456789012345678901234567890,0]";
    assert_eq!(copied(text), text);
}

#[test]
fn copy_through_nested_document() {
    let original = r#"{"a":{"b":[1,2.5,null],"c":"x"},"d":[[],{}],"e":true}"#;
    let regenerated = copied(original);
    assert_eq!(regenerated, original);
    assert_eq!(token_stream(&regenerated), token_stream(original));
}

#[test]
fn copy_root_value_sequence() {
    assert_eq!(copied("1 \"two\" [3]"), "1 \"two\" [3]");
}

#[test]
fn wide_integer_keeps_exact_text() {
    let factory = JsonFactory::default();
    let mut parser = factory.parser_for_str("123456789012345678901234567890");
    assert_eq!(parser.next_token().unwrap(), Some(Token::ValueInt));
    assert_eq!(parser.number_type().unwrap(), NumberType::BigInteger);
    assert_eq!(
        parser.big_integer_text().unwrap(),
        "123456789012345678901234567890"
    );
    assert!(parser.long_value().is_err());
}

#[test]
fn decimal_text_survives_parse() {
    let factory = JsonFactory::default();
    let mut parser = factory.parser_for_str("3.14");
    assert_eq!(parser.next_token().unwrap(), Some(Token::ValueFloat));
    assert_eq!(parser.decimal_text().unwrap(), "3.14");
    #[allow(clippy::float_cmp)]
    {
        assert_eq!(parser.double_value().unwrap(), 3.14);
    }
}

#[test]
fn pointer_tracks_position_end_to_end() {
    let factory = JsonFactory::default();
    let mut parser = factory.parser_for_str(r#"{"a":[0,1,{"b":true}]}"#);
    let mut at_true = None;
    while let Some(token) = parser.next_token().unwrap() {
        if token == Token::ValueTrue {
            at_true = Some(parser.pointer().to_string());
        }
    }
    assert_eq!(at_true.as_deref(), Some("/a/2/b"));
}

#[test]
fn structural_errors_carry_location() {
    let factory = JsonFactory::default();
    let mut parser = factory.parser_for_str("{\"a\": 1,\n  2}");
    let err = loop {
        match parser.next_token() {
            Ok(Some(_)) => {}
            Ok(None) => panic!("expected a parse failure"),
            Err(err) => break err,
        }
    };
    let loc = err.location.expect("syntax errors are located");
    assert_eq!(loc.line, 2);
}

#[test]
fn strict_duplicate_detection_via_factory() {
    let factory = JsonFactory::builder()
        .read_features(ReadFeatures {
            strict_duplicate_detection: true,
            ..ReadFeatures::default()
        })
        .build();
    let mut parser = factory.parser_for_str(r#"{"a":1,"a":2}"#);
    let err = loop {
        match parser.next_token() {
            Ok(Some(_)) => {}
            Ok(None) => panic!("expected a duplicate-field failure"),
            Err(err) => break err,
        }
    };
    assert!(err.to_string().contains("duplicate"), "{err}");
}

// ---------------------------------------------------------------------------
// Generated documents
// ---------------------------------------------------------------------------

/// An arbitrary JSON document over the value shapes whose equality is exact:
/// null, booleans, 64-bit integers, strings, arrays, objects.
#[derive(Debug, Clone)]
struct Doc(Value);

fn arbitrary_value(g: &mut Gen, depth: usize) -> Value {
    let shapes = if depth == 0 { 4 } else { 6 };
    match u8::arbitrary(g) % shapes {
        0 => Value::Null,
        1 => Value::Bool(bool::arbitrary(g)),
        2 => Value::from(i64::arbitrary(g)),
        3 => Value::String(String::arbitrary(g)),
        4 => {
            let len = usize::arbitrary(g) % 4;
            Value::Array((0..len).map(|_| arbitrary_value(g, depth - 1)).collect())
        }
        _ => {
            let len = usize::arbitrary(g) % 4;
            Value::Object(
                (0..len)
                    .map(|i| (format!("k{i}_{}", u8::arbitrary(g)), arbitrary_value(g, depth - 1)))
                    .collect(),
            )
        }
    }
}

impl Arbitrary for Doc {
    fn arbitrary(g: &mut Gen) -> Self {
        Doc(arbitrary_value(g, 3))
    }
}

#[quickcheck]
fn copy_through_is_token_identical(doc: Doc) -> bool {
    let text = serde_json::to_string(&doc.0).expect("document serializes");
    token_stream(&copied(&text)) == token_stream(&text)
}

#[quickcheck]
fn finite_doubles_round_trip(bits: u64) -> bool {
    let value = f64::from_bits(bits);
    if !value.is_finite() {
        return true;
    }
    let mut generator = Generator::from_writer(Vec::new());
    generator.write_f64(value).expect("write failure");
    let bytes = generator.into_inner().expect("close failure");
    let text = String::from_utf8(bytes).expect("UTF-8");

    let factory = JsonFactory::default();
    let mut parser = factory.parser_for_str(&text);
    assert_eq!(parser.next_token().unwrap(), Some(Token::ValueFloat));
    parser.double_value().expect("reparse failure").to_bits() == value.to_bits()
}

#[quickcheck]
fn arbitrary_strings_round_trip(s: String) -> bool {
    let mut generator = Generator::from_writer(Vec::new());
    generator.write_string(&s).expect("write failure");
    let bytes = generator.into_inner().expect("close failure");
    let text = String::from_utf8(bytes).expect("UTF-8");

    let factory = JsonFactory::default();
    let mut parser = factory.parser_for_str(&text);
    assert_eq!(parser.next_token().unwrap(), Some(Token::ValueString));
    parser.text() == s
}
