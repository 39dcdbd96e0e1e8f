use devtools::encoding::{self, UrlMode};
use devtools::identifier;
use devtools::time::{self, ConvertOperation, TimeInput, TimeZoneSpec};
use devtools::{beautify, minify, BeautifyLanguage, BeautifyOptions, MinifyLanguage, ToolError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn base64_decodes_what_it_encodes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let encoded = encoding::encode_base64(&bytes);
        prop_assert!(encoded.len() % 4 == 0);
        prop_assert_eq!(encoding::decode_base64(&encoded).unwrap(), bytes);
    }

    #[test]
    fn url_component_encoding_is_reversible(text in "\\PC{0,64}") {
        let encoded = encoding::encode_url(&text, UrlMode::Component);
        prop_assert!(!encoded.contains(' '));
        prop_assert_eq!(encoding::decode_url(&encoded, UrlMode::Component).unwrap(), text);
    }

    #[test]
    fn url_full_encoding_is_reversible(text in "\\PC{0,64}") {
        let encoded = encoding::encode_url(&text, UrlMode::Full);
        prop_assert_eq!(encoding::decode_url(&encoded, UrlMode::Full).unwrap(), text);
    }

    #[test]
    fn v1_identifiers_carry_version_and_variant(millis in 0i64..4_102_444_800_000) {
        let id = identifier::generate_v1_at(millis);
        prop_assert!(identifier::is_valid(&id));
        prop_assert_eq!(identifier::version(&id), Some(1));
        let variant = id.as_bytes()[19];
        prop_assert!(matches!(variant, b'8' | b'9' | b'a' | b'b'));
    }

    #[test]
    fn to_date_then_to_timestamp_is_stable(millis in 1i64..4_102_444_800_000) {
        let zone = TimeZoneSpec::parse("UTC").unwrap();
        let forward = time::convert(&TimeInput::Number(millis as f64), ConvertOperation::ToDate, &zone).unwrap();
        let back = time::convert(
            &TimeInput::Text(forward.iso8601.clone()),
            ConvertOperation::ToTimestamp,
            &zone,
        )
        .unwrap();
        prop_assert_eq!(back.timestamp, millis);
    }
}

#[test]
fn v4_identifiers_are_unique_and_versioned() {
    let a = identifier::generate_v4();
    let b = identifier::generate_v4();
    assert_ne!(a, b);
    assert_eq!(identifier::version(&a), Some(4));
    assert_eq!(a.len(), 36);
}

#[test]
fn minified_css_is_smaller_than_beautified_css() {
    let source = "body{margin:0;padding:0}a:hover{color:red}";
    let pretty = beautify::beautify(
        source,
        BeautifyLanguage::Css,
        &BeautifyOptions::default(),
    )
    .unwrap();
    assert!(pretty.contains("\n  margin: 0;"));

    let small = minify::minify(&pretty, MinifyLanguage::Css).unwrap();
    assert!(small.len() < pretty.len());
}

#[test]
fn unbalanced_code_is_rejected_by_both_code_tools() {
    let broken = "function f() { return [1, 2; }";
    assert!(matches!(
        beautify::beautify(broken, BeautifyLanguage::Javascript, &BeautifyOptions::default()),
        Err(ToolError::Syntax(_))
    ));
    assert!(matches!(
        minify::minify(broken, MinifyLanguage::Javascript),
        Err(ToolError::TransformFailure(_))
    ));
}
