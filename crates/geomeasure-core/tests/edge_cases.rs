//! Malformed input, cursors and dialect-specific names

use geomeasure_core::units::*;
use geomeasure_core::{Cursor, Dialect, UnitError, UnitFormat};
use pretty_assertions::assert_eq;

fn default_format() -> std::sync::Arc<UnitFormat> {
    UnitFormat::shared(Dialect::Default)
}

#[test]
fn test_unknown_identifier_reports_offset() {
    let format = default_format();
    let err = format.parse("daysMONTH").unwrap_err();
    match &err {
        UnitError::MalformedUnitExpression { text, offset, .. } => {
            assert_eq!(text, "daysMONTH");
            assert_eq!(*offset, 0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("daysMONTH"));

    let err = format.parse("m/daysMONTH").unwrap_err();
    assert_eq!(err.offset(), Some(2));
}

#[test]
fn test_malformed_expressions() {
    let format = default_format();
    let cases = [
        ("(m/s", 4),
        ("m/", 2),
        ("m^", 2),
        ("m^x", 2),
        ("m+s", 2),
        ("m s", 2),
        ("m)", 1),
        ("*m", 0),
        ("m/(s", 4),
    ];
    for (text, offset) in cases {
        let err = format.parse(text).unwrap_err();
        assert_eq!(err.offset(), Some(offset), "{text}: {err}");
    }
}

#[test]
fn test_arithmetic_errors_propagate() {
    let format = default_format();
    assert!(matches!(format.parse("m/0"), Err(UnitError::Arithmetic(_))));
    assert!(matches!(format.parse("m^2:0"), Err(UnitError::Arithmetic(_))));
}

#[test]
fn test_extreme_exponents_are_arithmetic_errors() {
    let format = default_format();
    assert!(matches!(
        format.parse("m^-1073741824^2"),
        Err(UnitError::Arithmetic(_))
    ));
    assert!(matches!(
        format.parse("m^-2147483648"),
        Err(UnitError::Arithmetic(_))
    ));
    assert!(matches!(
        format.parse("N^1073741825"),
        Err(UnitError::Arithmetic(_))
    ));

    let deep = format.parse("m^-2147483647").unwrap();
    assert_eq!(format.format(&deep), "1/m^2147483647");
    assert!(!deep.is_compatible(&NEWTON));
}

#[test]
fn test_exponent_exceeding_integer_range_is_malformed() {
    let format = default_format();
    let err = format.parse("m^99999999999").unwrap_err();
    assert_eq!(err.offset(), Some(2));
}

#[test]
fn test_whitespace_around_exponent() {
    let format = default_format();
    assert_eq!(format.parse("m^ 2").unwrap(), *SQUARE_METRE);
    assert_eq!(format.parse("m ^ 2").unwrap(), *SQUARE_METRE);
    assert_eq!(format.parse("m** 2").unwrap(), *SQUARE_METRE);
}

#[test]
fn test_empty_input_is_dimensionless() {
    let format = default_format();
    assert!(format.parse("").unwrap().is_one());
    assert_eq!(format.parse("m^0").unwrap(), *ONE);
}

#[test]
fn test_parse_at_reports_end_of_unit() {
    let format = default_format();
    let text = "10 km/h wind";
    let mut cursor = Cursor::new(3);
    let unit = format.parse_at(text, &mut cursor).unwrap();
    assert_eq!(unit, *KILOMETRE_PER_HOUR);
    assert_eq!(cursor.index, 7);
    assert_eq!(cursor.error_index, None);

    let mut cursor = Cursor::new(8);
    assert!(format.parse_at(text, &mut cursor).is_err());
    assert_eq!(cursor.index, 8);
    assert_eq!(cursor.error_index, Some(8));

    // A leading number is a dimensionless factor, not an error
    let mut cursor = Cursor::new(0);
    let unit = format.parse_at(text, &mut cursor).unwrap();
    assert!(unit.is_compatible(&ONE));
    assert_eq!(cursor.index, 2);
}

#[test]
fn test_parse_at_counts_characters() {
    let format = default_format();
    let text = "\u{00b5}m\u{00b2} remaining";
    let mut cursor = Cursor::default();
    let unit = format.parse_at(text, &mut cursor).unwrap();
    assert_eq!(unit, format.parse("\u{00b5}m^2").unwrap());
    assert_eq!(cursor.index, 3);
}

#[test]
fn test_parse_single_stops_at_operator() {
    let format = default_format();
    let mut cursor = Cursor::default();
    let unit = format.parse_single("kg/m\u{00b3}", &mut cursor).unwrap();
    assert_eq!(unit, *KILOGRAM);
    assert_eq!(cursor.index, 2);

    let mut cursor = Cursor::new(2);
    assert!(format.parse_single("kg/m\u{00b3}", &mut cursor).is_err());
    assert_eq!(cursor.error_index, Some(2));
}

#[test]
fn test_cursor_past_end() {
    let format = default_format();
    let mut cursor = Cursor::new(10);
    assert!(format.parse_at("m", &mut cursor).is_err());
    assert_eq!(cursor.error_index, Some(10));
}

#[test]
fn test_multi_word_alias_short_circuits_grammar() {
    let format = default_format();
    assert_eq!(
        format.parse("degree minute second").unwrap(),
        *DEGREE_MINUTE_SECOND
    );
    assert_eq!(format.format(&DEGREE_MINUTE_SECOND), "DMS");
}

#[test]
fn test_esri_relabels_degree() {
    let format = UnitFormat::shared(Dialect::Esri);
    assert_eq!(format.format(&DEGREE_ANGLE), "Degree");
    assert_eq!(format.parse("\u{00b0}").unwrap(), *DEGREE_ANGLE);
    assert_eq!(format.parse("Degree").unwrap(), *DEGREE_ANGLE);
    assert_eq!(format.format(&METRE), "Meter");
    assert_eq!(format.format(&FOOT_SURVEY_US), "Foot_US");
}

#[test]
fn test_dialect_specific_labels() {
    let epsg = UnitFormat::shared(Dialect::Epsg);
    assert_eq!(epsg.format(&DEGREE_ANGLE), "deg");
    assert_eq!(epsg.format(&FOOT_SURVEY_US), "ftUS");

    let wkt = UnitFormat::shared(Dialect::Wkt);
    assert_eq!(wkt.format(&FOOT_SURVEY_US), "US survey foot");
    assert_eq!(wkt.parse("US survey foot").unwrap(), *FOOT_SURVEY_US);
    assert_eq!(wkt.format(&SECOND_ANGLE), "arc-second");

    let geotools = UnitFormat::shared(Dialect::GeoTools);
    assert_eq!(geotools.format(&FOOT_SURVEY_US), "ft_survey_us");
    assert_eq!(geotools.format(&PIXEL), "pixel");
    assert_eq!(geotools.format(&DEGREE_MINUTE_SECOND), "DMS");
}

#[test]
fn test_ascii_dialect_accepts_unicode_input() {
    let ascii = UnitFormat::shared(Dialect::Ascii);
    let micrometre = ascii.parse("\u{00b5}m").unwrap();
    assert_eq!(ascii.format(&micrometre), "microm");
    assert_eq!(ascii.format(&ascii.parse("\u{2103}").unwrap()), "Celsius");
    assert_eq!(ascii.format(&ascii.parse("k\u{03a9}").unwrap()), "kOhm");
}

#[test]
fn test_sexagesimal_units_format_by_label_only() {
    let format = UnitFormat::new(Dialect::Default);
    format.remove_label(&SEXAGESIMAL_DMS);
    assert_eq!(format.format(&SEXAGESIMAL_DMS), "[\u{00b0}?]");
}
