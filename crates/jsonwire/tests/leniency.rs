#![allow(missing_docs)]

use jsonwire::{JsonError, JsonFactory, ReadFeatures, Token};
use rstest::rstest;

fn parse_all(text: &str, features: ReadFeatures) -> Result<Vec<Token>, JsonError> {
    let factory = JsonFactory::builder().read_features(features).build();
    let mut parser = factory.parser_for_str(text);
    let mut tokens = Vec::new();
    while let Some(token) = parser.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[rstest]
#[case::comments("[1, /* note */ 2] // tail", ReadFeatures {
    allow_comments: true, ..ReadFeatures::default()
})]
#[case::hash_comments("[1, # note\n 2]", ReadFeatures {
    allow_hash_comments: true, ..ReadFeatures::default()
})]
#[case::unquoted_names("{a: 1}", ReadFeatures {
    allow_unquoted_field_names: true, ..ReadFeatures::default()
})]
#[case::single_quotes("{'a': 'b'}", ReadFeatures {
    allow_single_quotes: true, ..ReadFeatures::default()
})]
#[case::unescaped_controls("\"a\tb\"", ReadFeatures {
    allow_unescaped_control_chars: true, ..ReadFeatures::default()
})]
#[case::any_backslash_escape(r#""a\'b""#, ReadFeatures {
    allow_backslash_escaping_any: true, ..ReadFeatures::default()
})]
#[case::leading_zeros("007", ReadFeatures {
    allow_leading_zeros: true, ..ReadFeatures::default()
})]
#[case::leading_decimal_point(".5", ReadFeatures {
    allow_leading_decimal_point: true, ..ReadFeatures::default()
})]
#[case::non_numeric_numbers("[NaN, Infinity, -Infinity]", ReadFeatures {
    allow_non_numeric_numbers: true, ..ReadFeatures::default()
})]
#[case::missing_values("[1,,3]", ReadFeatures {
    allow_missing_values: true, ..ReadFeatures::default()
})]
#[case::trailing_comma("[1,2,]", ReadFeatures {
    allow_trailing_comma: true, ..ReadFeatures::default()
})]
fn lenient_input_needs_its_feature(#[case] text: &str, #[case] features: ReadFeatures) {
    assert!(
        parse_all(text, ReadFeatures::default()).is_err(),
        "default features should reject {text:?}"
    );
    parse_all(text, features).unwrap_or_else(|err| {
        panic!("feature-enabled parse of {text:?} failed: {err}");
    });
}

#[test]
fn non_numeric_numbers_surface_as_floats() {
    let factory = JsonFactory::builder()
        .read_features(ReadFeatures {
            allow_non_numeric_numbers: true,
            ..ReadFeatures::default()
        })
        .build();
    let mut parser = factory.parser_for_str("[NaN, -Infinity]");
    assert_eq!(parser.next_token().unwrap(), Some(Token::StartArray));
    assert_eq!(parser.next_token().unwrap(), Some(Token::ValueFloat));
    assert!(parser.double_value().unwrap().is_nan());
    assert_eq!(parser.next_token().unwrap(), Some(Token::ValueFloat));
    assert_eq!(parser.double_value().unwrap(), f64::NEG_INFINITY);
}

#[test]
fn missing_values_read_as_nulls() {
    let tokens = parse_all(
        "[1,,3]",
        ReadFeatures {
            allow_missing_values: true,
            ..ReadFeatures::default()
        },
    )
    .unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::StartArray,
            Token::ValueInt,
            Token::ValueNull,
            Token::ValueInt,
            Token::EndArray,
        ]
    );
}

#[test]
fn non_blocking_parser_signals_starvation() {
    let factory = JsonFactory::default();
    let mut parser = factory.non_blocking_parser();
    parser.feed_str("{\"a\"").unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::StartObject));
    assert_eq!(parser.next_token().unwrap(), Some(Token::FieldName));
    assert_eq!(parser.text(), "a");
    assert_eq!(parser.next_token().unwrap(), Some(Token::NotAvailable));
    parser.feed_str(": 1}").unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::ValueInt));
    assert_eq!(parser.next_token().unwrap(), Some(Token::EndObject));
    assert_eq!(parser.next_token().unwrap(), Some(Token::NotAvailable));
    parser.end_input().unwrap();
    assert_eq!(parser.next_token().unwrap(), None);
}

#[test]
fn non_blocking_parser_reassembles_split_bytes() {
    let factory = JsonFactory::default();
    let mut parser = factory.non_blocking_parser();
    let bytes = "\"héllo\"".as_bytes();
    // Split inside the two-byte é sequence.
    parser.feed(&bytes[..3]).unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::NotAvailable));
    parser.feed(&bytes[3..]).unwrap();
    parser.end_input().unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(Token::ValueString));
    assert_eq!(parser.text(), "héllo");
}
