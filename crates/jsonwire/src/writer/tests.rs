use super::*;
use crate::base64::{MIME, MODIFIED_FOR_URL};
use crate::token::Token;

fn generated(build: impl FnOnce(&mut Generator<Vec<u8>>) -> crate::error::Result<()>) -> String {
    let mut g = Generator::from_writer(Vec::new());
    build(&mut g).expect("generation failure");
    let bytes = g.into_inner().expect("close failure");
    String::from_utf8(bytes).expect("generator output is UTF-8")
}

#[test]
fn compact_object() {
    let text = generated(|g| {
        g.write_start_object()?;
        g.write_field_name("a")?;
        g.write_int(1)?;
        g.write_field_name("b")?;
        g.write_start_array()?;
        g.write_bool(true)?;
        g.write_null()?;
        g.write_end_array()?;
        g.write_end_object()
    });
    assert_eq!(text, r#"{"a":1,"b":[true,null]}"#);
}

#[test]
fn root_value_sequence_separated() {
    let text = generated(|g| {
        g.write_int(1)?;
        g.write_int(2)?;
        g.write_string("x")
    });
    assert_eq!(text, "1 2 \"x\"");
}

#[test]
fn string_escaping_applied() {
    let text = generated(|g| g.write_string("a\"b\n\\"));
    assert_eq!(text, r#""a\"b\n\\""#);
}

#[test]
fn escape_non_ascii_feature() {
    let mut g = Generator::new(
        Vec::new(),
        WriteFeatures {
            escape_non_ascii: true,
            ..WriteFeatures::default()
        },
        crate::base64::MIME_NO_LINEFEEDS,
        Box::new(MinimalPrettyPrinter::default()),
        BufferRecycler::disabled(),
    );
    g.write_string("é").unwrap();
    let bytes = g.into_inner().unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "\"\\u00E9\"");
}

#[test]
fn floats_round_trip_as_floats() {
    assert_eq!(generated(|g| g.write_f64(3.14)), "3.14");
    // Integral doubles keep a fraction so they re-read as floats.
    assert_eq!(generated(|g| g.write_f64(2.0)), "2.0");
    assert_eq!(generated(|g| g.write_f32(0.5)), "0.5");
}

#[test]
fn non_finite_doubles_quoted_or_rejected() {
    assert_eq!(generated(|g| g.write_f64(f64::NAN)), "\"NaN\"");
    assert_eq!(generated(|g| g.write_f64(f64::INFINITY)), "\"Infinity\"");
    assert_eq!(
        generated(|g| g.write_f64(f64::NEG_INFINITY)),
        "\"-Infinity\""
    );

    let mut g = Generator::new(
        Vec::new(),
        WriteFeatures {
            quote_non_numeric_numbers: false,
            ..WriteFeatures::default()
        },
        crate::base64::MIME_NO_LINEFEEDS,
        Box::new(MinimalPrettyPrinter::default()),
        BufferRecycler::disabled(),
    );
    assert!(g.write_f64(f64::NAN).is_err());
}

#[test]
fn big_number_text_validated() {
    let big = "123456789012345678901234567890";
    assert_eq!(generated(|g| g.write_big_number(big)), big);
    assert_eq!(generated(|g| g.write_big_number("3.14e10")), "3.14e10");

    let mut g = Generator::from_writer(Vec::new());
    assert!(g.write_big_number("01").is_err());
    assert!(g.write_big_number("NaN").is_err());
}

#[test]
fn write_number_dispatches_on_representation() {
    let text = generated(|g| {
        g.write_start_array()?;
        g.write_number(&JsonNumber::Int(7))?;
        g.write_number(&JsonNumber::Double(0.25))?;
        g.write_number(&JsonNumber::BigInt("99999999999999999999".into()))?;
        g.write_number(&JsonNumber::BigDecimal("1.00".into()))?;
        g.write_end_array()
    });
    assert_eq!(text, "[7,0.25,99999999999999999999,1.00]");
}

#[test]
fn binary_uses_configured_variant() {
    let text = generated(|g| g.write_binary(b"hello"));
    assert_eq!(text, "\"aGVsbG8=\"");
    let text = generated(|g| g.write_binary_with(&MODIFIED_FOR_URL, b"hello"));
    assert_eq!(text, "\"aGVsbG8\"");
}

#[test]
fn wrapped_binary_escapes_linefeeds() {
    let data = vec![0u8; 60];
    let text = generated(|g| g.write_binary_with(&MIME, &data));
    assert!(text.contains("\\n"), "{text}");
    assert!(!text[1..text.len() - 1].contains('\n'), "{text}");
}

#[test]
fn raw_and_raw_value() {
    let text = generated(|g| {
        g.write_start_array()?;
        g.write_raw_value("{\"pre\":1}")?;
        g.write_int(2)?;
        g.write_end_array()
    });
    assert_eq!(text, "[{\"pre\":1},2]");

    // write_raw adds no separators at all.
    let text = generated(|g| {
        g.write_int(1)?;
        g.write_raw("//tail")
    });
    assert_eq!(text, "1//tail");
}

#[test]
fn illegal_sequences_rejected() {
    let mut g = Generator::from_writer(Vec::new());
    assert!(g.write_field_name("a").is_err());

    let mut g = Generator::from_writer(Vec::new());
    g.write_start_object().unwrap();
    assert!(g.write_int(1).is_err());
    g.write_field_name("a").unwrap();
    assert!(g.write_field_name("b").is_err());
    assert!(g.write_end_object().is_err());
    g.write_int(1).unwrap();
    assert!(g.write_end_array().is_err());
    g.write_end_object().unwrap();
}

#[test]
fn duplicate_field_names_rejected_when_strict() {
    let mut g = Generator::new(
        Vec::new(),
        WriteFeatures {
            strict_duplicate_detection: true,
            ..WriteFeatures::default()
        },
        crate::base64::MIME_NO_LINEFEEDS,
        Box::new(MinimalPrettyPrinter::default()),
        BufferRecycler::disabled(),
    );
    g.write_start_object().unwrap();
    g.write_field_name("a").unwrap();
    g.write_int(1).unwrap();
    let err = g.write_field_name("a").unwrap_err();
    assert!(err.to_string().contains("duplicate"), "{err}");
}

#[test]
fn unquoted_field_names_feature() {
    let mut g = Generator::new(
        Vec::new(),
        WriteFeatures {
            quote_field_names: false,
            ..WriteFeatures::default()
        },
        crate::base64::MIME_NO_LINEFEEDS,
        Box::new(MinimalPrettyPrinter::default()),
        BufferRecycler::disabled(),
    );
    g.write_start_object().unwrap();
    g.write_field_name("a").unwrap();
    g.write_int(1).unwrap();
    g.write_end_object().unwrap();
    assert_eq!(String::from_utf8(g.into_inner().unwrap()).unwrap(), "{a:1}");
}

#[test]
fn close_auto_closes_open_content() {
    let mut g = Generator::from_writer(Vec::new());
    g.write_start_object().unwrap();
    g.write_field_name("a").unwrap();
    g.write_start_array().unwrap();
    g.write_int(1).unwrap();
    g.close().unwrap();
    assert!(g.is_closed());
    let bytes = g.into_inner().unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), "{\"a\":[1]}");
}

#[test]
fn closed_generator_rejects_writes() {
    let mut g = Generator::from_writer(Vec::new());
    g.write_int(1).unwrap();
    g.close().unwrap();
    g.close().unwrap();
    assert!(g.write_int(2).is_err());
}

#[test]
fn write_embedded_is_a_config_error() {
    let mut g = Generator::from_writer(Vec::new());
    assert!(g.write_embedded().is_err());
}

#[test]
fn default_pretty_printer_indents() {
    let mut g = Generator::from_writer(Vec::new());
    g.set_pretty_printer(Box::new(DefaultPrettyPrinter::default()));
    g.write_start_object().unwrap();
    g.write_field_name("a").unwrap();
    g.write_int(1).unwrap();
    g.write_field_name("b").unwrap();
    g.write_start_array().unwrap();
    g.write_int(2).unwrap();
    g.write_int(3).unwrap();
    g.write_end_array().unwrap();
    g.write_end_object().unwrap();
    let text = String::from_utf8(g.into_inner().unwrap()).unwrap();
    assert_eq!(
        text,
        "{\n  \"a\" : 1,\n  \"b\" : [\n    2,\n    3\n  ]\n}"
    );
}

#[test]
fn empty_containers_stay_compact_when_pretty() {
    let mut g = Generator::from_writer(Vec::new());
    g.set_pretty_printer(Box::new(DefaultPrettyPrinter::default()));
    g.write_start_object().unwrap();
    g.write_field_name("e").unwrap();
    g.write_start_array().unwrap();
    g.write_end_array().unwrap();
    g.write_end_object().unwrap();
    let text = String::from_utf8(g.into_inner().unwrap()).unwrap();
    assert_eq!(text, "{\n  \"e\" : []\n}");
}

#[test]
fn custom_character_escapes() {
    struct AngleBrackets;
    impl CharacterEscapes for AngleBrackets {
        fn custom_escape(&self, ch: char) -> Option<std::borrow::Cow<'static, str>> {
            match ch {
                '<' => Some("\\u003C".into()),
                '>' => Some("\\u003E".into()),
                _ => None,
            }
        }
    }
    let mut g = Generator::from_writer(Vec::new());
    g.set_character_escapes(Box::new(AngleBrackets));
    g.write_string("<b>").unwrap();
    let text = String::from_utf8(g.into_inner().unwrap()).unwrap();
    assert_eq!(text, "\"\\u003Cb\\u003E\"");
}

#[test]
fn type_id_wrapper_array() {
    let mut g = Generator::from_writer(Vec::new());
    let mut id = TypeId::new("Dog", TypeIdInclusion::WrapperArray, Token::StartObject);
    g.write_type_prefix(&mut id).unwrap();
    g.write_field_name("name").unwrap();
    g.write_string("Rex").unwrap();
    g.write_type_suffix(&id).unwrap();
    let text = String::from_utf8(g.into_inner().unwrap()).unwrap();
    assert_eq!(text, "[\"Dog\",{\"name\":\"Rex\"}]");
}

#[test]
fn type_id_wrapper_object() {
    let mut g = Generator::from_writer(Vec::new());
    let mut id = TypeId::new("Dog", TypeIdInclusion::WrapperObject, Token::StartObject);
    g.write_type_prefix(&mut id).unwrap();
    g.write_field_name("name").unwrap();
    g.write_string("Rex").unwrap();
    g.write_type_suffix(&id).unwrap();
    let text = String::from_utf8(g.into_inner().unwrap()).unwrap();
    assert_eq!(text, "{\"Dog\":{\"name\":\"Rex\"}}");
}

#[test]
fn type_id_metadata_property() {
    let mut g = Generator::from_writer(Vec::new());
    let mut id = TypeId::new("Dog", TypeIdInclusion::Metadata, Token::StartObject)
        .with_property("@class");
    g.write_type_prefix(&mut id).unwrap();
    g.write_field_name("name").unwrap();
    g.write_string("Rex").unwrap();
    g.write_type_suffix(&id).unwrap();
    let text = String::from_utf8(g.into_inner().unwrap()).unwrap();
    assert_eq!(text, "{\"@class\":\"Dog\",\"name\":\"Rex\"}");
}

#[test]
fn type_id_property_degrades_for_scalars() {
    // A property placement cannot attach to a scalar; wrapper array instead.
    let mut g = Generator::from_writer(Vec::new());
    let mut id = TypeId::new("Temp", TypeIdInclusion::Metadata, Token::ValueInt);
    g.write_type_prefix(&mut id).unwrap();
    g.write_int(21).unwrap();
    g.write_type_suffix(&id).unwrap();
    let text = String::from_utf8(g.into_inner().unwrap()).unwrap();
    assert_eq!(text, "[\"Temp\",21]");
}
