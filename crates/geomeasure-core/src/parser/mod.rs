//! Unit expression parser using pest
//!
//! The grammar lives in `grammar.pest`. Identifiers are resolved while the
//! parse tree is walked, through a lookup function supplied by the
//! formatter, so the parser itself holds no unit tables.

mod ast;

use crate::error::{UnitError, UnitResult};
use crate::types::Unit;
use ast::Walker;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct UnitParser;

pub(crate) const MIDDLE_DOT: char = '\u{00b7}';
pub(crate) const SUPERSCRIPT_MINUS: char = '\u{207b}';

/// Value of a superscript digit (⁰ to ⁹)
pub(crate) fn superscript_digit(c: char) -> Option<u32> {
    match c {
        '\u{2070}' => Some(0),
        '\u{00b9}' => Some(1),
        '\u{00b2}' => Some(2),
        '\u{00b3}' => Some(3),
        '\u{2074}'..='\u{2079}' => Some(c as u32 - 0x2070),
        _ => None,
    }
}

/// Superscript digit for `d` (0 to 9)
pub(crate) fn to_superscript(d: u32) -> Option<char> {
    match d {
        0 => Some('\u{2070}'),
        1 => Some('\u{00b9}'),
        2 => Some('\u{00b2}'),
        3 => Some('\u{00b3}'),
        4..=9 => char::from_u32(0x2070 + d),
        _ => None,
    }
}

/// Whether `c` may appear in a unit name. Mirrors the grammar's
/// `identifier` rule: anything but whitespace, digits, superscripts and
/// expression syntax.
pub(crate) fn is_unit_identifier_part(c: char) -> bool {
    c.is_alphabetic()
        || !(c.is_whitespace()
            || c.is_ascii_digit()
            || c == SUPERSCRIPT_MINUS
            || superscript_digit(c).is_some()
            || matches!(
                c,
                MIDDLE_DOT | '*' | '/' | '(' | ')' | '[' | ']' | '^' | '+' | '-'
            ))
}

/// Parse position within a larger string, in characters.
///
/// On success `index` is moved past the parsed text. On failure `index` is
/// left untouched and `error_index` records where parsing stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub error_index: Option<usize>,
}

impl Cursor {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            error_index: None,
        }
    }
}

/// Resolves a unit name, returning `None` when it is unknown
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<Unit>;

/// First pair of `rule` directly below the entry pair
fn inner_rule(pairs: Pairs<'_, Rule>, rule: Rule) -> Option<Pair<'_, Rule>> {
    pairs
        .flat_map(|pair| pair.into_inner())
        .find(|pair| pair.as_rule() == rule)
}

/// Parses the whole of `text`. Trailing text that is not part of the unit
/// expression is an error.
pub(crate) fn parse(text: &str, lookup: Lookup<'_>) -> UnitResult<Unit> {
    let walker = Walker::new(text, 0, text, lookup);
    if let Some(unit) = walker.lookup_rest() {
        return Ok(unit);
    }
    let pairs = UnitParser::parse(Rule::unit, text).map_err(|e| walker.syntax_error(e))?;
    match inner_rule(pairs, Rule::product) {
        Some(product) => walker.product(product),
        None => Ok(Unit::one()),
    }
}

/// Byte offset of character `index`, or `None` past the end
fn byte_index(text: &str, index: usize) -> Option<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .nth(index)
}

/// Runs `parse` on the text from `cursor` onwards; `parse` returns the unit
/// and the character offset just past it
fn with_cursor(
    text: &str,
    cursor: &mut Cursor,
    lookup: Lookup<'_>,
    parse: impl FnOnce(&Walker<'_>) -> UnitResult<(Unit, usize)>,
) -> UnitResult<Unit> {
    let Some(start) = byte_index(text, cursor.index) else {
        cursor.error_index = Some(cursor.index);
        return Err(UnitError::malformed(
            "index out of range",
            text,
            cursor.index,
        ));
    };
    let walker = Walker::new(text, cursor.index, &text[start..], lookup);
    match parse(&walker) {
        Ok((unit, end)) => {
            cursor.index = end;
            cursor.error_index = None;
            Ok(unit)
        }
        Err(error) => {
            cursor.error_index = error.offset();
            Err(error)
        }
    }
}

/// Parses the unit expression starting at `cursor` and leaves the cursor
/// just past it, before any text that cannot continue the expression
pub(crate) fn parse_at(text: &str, cursor: &mut Cursor, lookup: Lookup<'_>) -> UnitResult<Unit> {
    with_cursor(text, cursor, lookup, |walker| {
        if let Some(unit) = walker.lookup_rest() {
            return Ok((unit, walker.end()));
        }
        let pairs = UnitParser::parse(Rule::unit_prefix, walker.input())
            .map_err(|e| walker.syntax_error(e))?;
        let Some(product) = inner_rule(pairs, Rule::product) else {
            return Err(walker.error_at("unit expected", 0));
        };
        let end = walker.offset(product.as_span().end());
        Ok((walker.product(product)?, end))
    })
}

/// Parses exactly one unit name starting at `cursor`
pub(crate) fn parse_single(
    text: &str,
    cursor: &mut Cursor,
    lookup: Lookup<'_>,
) -> UnitResult<Unit> {
    with_cursor(text, cursor, lookup, |walker| {
        let pairs = UnitParser::parse(Rule::unit_name, walker.input())
            .map_err(|e| walker.syntax_error(e))?;
        let Some(name) = inner_rule(pairs, Rule::identifier) else {
            return Err(walker.error_at("unit name expected", 0));
        };
        let end = walker.offset(name.as_span().end());
        Ok((walker.identifier(&name)?, end))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dimension, Factor};
    use std::collections::HashMap;

    struct Names(HashMap<&'static str, Unit>);

    impl Names {
        fn new() -> Self {
            let m = Unit::base("m", Dimension::LENGTH);
            let s = Unit::base("s", Dimension::TIME);
            let km = m.scale(Factor::integer(1000));
            let h = s.scale(Factor::integer(3600));
            let kmh = km.divide(&h).unwrap();
            let mut names = HashMap::new();
            names.insert("m", m);
            names.insert("s", s);
            names.insert("km", km);
            names.insert("h", h);
            names.insert("km/h", kmh);
            Self(names)
        }

        fn get(&self, name: &str) -> Unit {
            self.0[name].clone()
        }

        fn parse(&self, text: &str) -> UnitResult<Unit> {
            parse(text, &|name| self.0.get(name).cloned())
        }
    }

    #[test]
    fn test_parse_quotient() {
        let names = Names::new();
        let expected = names.get("m").divide(&names.get("s")).unwrap();
        assert_eq!(names.parse("m/s").unwrap(), expected);
        assert_eq!(names.parse("m\u{00b7}s\u{207b}\u{00b9}").unwrap(), expected);
        assert_eq!(names.parse("m*s^-1").unwrap(), expected);
        assert_eq!(names.parse(" m / s ").unwrap(), expected);
    }

    #[test]
    fn test_whole_string_lookup_wins() {
        let names = Names::new();
        assert_eq!(names.parse("km/h").unwrap(), names.get("km/h"));
        assert_eq!(names.parse("km / h").unwrap(), names.get("km/h"));
    }

    #[test]
    fn test_exponents() {
        let names = Names::new();
        let m = names.get("m");
        assert_eq!(names.parse("m^2").unwrap(), m.pow(2).unwrap());
        assert_eq!(names.parse("m\u{00b2}").unwrap(), m.pow(2).unwrap());
        assert_eq!(names.parse("m**2").unwrap(), m.pow(2).unwrap());
        assert_eq!(
            names.parse("m^2:3").unwrap(),
            m.pow(2).unwrap().root(3).unwrap()
        );
        assert!(names.parse("m^0").unwrap().is_one());
        assert_eq!(names.parse("1/s").unwrap(), names.parse("s^-1").unwrap());
    }

    #[test]
    fn test_whitespace_inside_exponent() {
        let names = Names::new();
        let m2 = names.get("m").pow(2).unwrap();
        assert_eq!(names.parse("m^ 2").unwrap(), m2);
        assert_eq!(names.parse("m ^ 2").unwrap(), m2);
        assert_eq!(names.parse("m** -1").unwrap(), names.get("m").inverse().unwrap());
        assert_eq!(
            names.parse("m^2 : 3").unwrap(),
            m2.root(3).unwrap()
        );
    }

    #[test]
    fn test_numeric_factors() {
        let names = Names::new();
        let m = names.get("m");
        assert_eq!(
            names.parse("m*0.3048").unwrap(),
            m.scale(Factor::ratio(3048, 10_000))
        );
        assert_eq!(names.parse("m/1000").unwrap(), m.scale(Factor::ratio(1, 1000)));
        assert_eq!(names.parse("m*1").unwrap(), m);
        assert_eq!(names.parse("m*1E3").unwrap(), names.get("km"));
        assert_eq!(
            names.parse("m+273.15").unwrap(),
            m.shift(Factor::ratio(27315, 100))
        );
        // A unit offset is still an offset
        assert_eq!(names.parse("m+1").unwrap(), m.shift(Factor::integer(1)));
        assert_ne!(names.parse("m+1").unwrap(), m);
    }

    #[test]
    fn test_parentheses() {
        let names = Names::new();
        let expected = names
            .get("m")
            .divide(&names.get("s").multiply(&names.get("h")).unwrap())
            .unwrap();
        assert_eq!(names.parse("m/(s*h)").unwrap(), expected);
        assert_eq!(names.parse("(m)").unwrap(), names.get("m"));
    }

    #[test]
    fn test_errors_carry_offsets() {
        let names = Names::new();
        let err = names.parse("m/daysMONTH").unwrap_err();
        assert_eq!(err.offset(), Some(2));
        assert!(err.to_string().contains("daysMONTH not recognized"));

        assert_eq!(names.parse("(m/s").unwrap_err().offset(), Some(4));
        assert_eq!(names.parse("m+s").unwrap_err().offset(), Some(2));
        assert_eq!(names.parse("m^").unwrap_err().offset(), Some(2));
        assert_eq!(names.parse("m/").unwrap_err().offset(), Some(2));
        assert_eq!(names.parse("m s").unwrap_err().offset(), Some(2));
        assert_eq!(names.parse("m)").unwrap_err().offset(), Some(1));
    }

    #[test]
    fn test_arithmetic_errors_propagate() {
        let names = Names::new();
        assert!(matches!(
            names.parse("m/0"),
            Err(UnitError::Arithmetic(_))
        ));
        assert!(matches!(
            names.parse("m^1:0"),
            Err(UnitError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_parse_at_stops_before_trailing_text() {
        let names = Names::new();
        let lookup = |name: &str| names.0.get(name).cloned();
        let text = "10 m/s wind";
        let mut cursor = Cursor::new(3);
        let unit = parse_at(text, &mut cursor, &lookup).unwrap();
        assert_eq!(unit, names.get("m").divide(&names.get("s")).unwrap());
        assert_eq!(cursor.index, 6);

        let mut cursor = Cursor::new(7);
        assert!(parse_at(text, &mut cursor, &lookup).is_err());
        assert_eq!(cursor.index, 7);
        assert_eq!(cursor.error_index, Some(7));
    }

    #[test]
    fn test_parse_single() {
        let names = Names::new();
        let lookup = |name: &str| names.0.get(name).cloned();
        let mut cursor = Cursor::default();
        let unit = parse_single("km/h", &mut cursor, &lookup).unwrap();
        assert_eq!(unit, names.get("km"));
        assert_eq!(cursor.index, 2);
    }

    #[test]
    fn test_annotations() {
        let names = Names::new();
        let unit = names.parse("m{height}/s").unwrap();
        let expected = names.get("m").annotate("height").divide(&names.get("s")).unwrap();
        assert_eq!(unit, expected);
        assert!(names.parse("x{height}").is_err());
    }

    #[test]
    fn test_empty_is_dimensionless() {
        let names = Names::new();
        assert!(names.parse("").unwrap().is_one());
        assert!(names.parse("   ").unwrap().is_one());
    }

    #[test]
    fn test_grammar_identifier_matches_char_class() {
        let chars = [
            'm', 'K', '\u{00b0}', '%', '.', ':', '{', '\'', '\u{00b5}', '\u{03a9}', '\u{2103}',
            '2', '\u{00b2}', '\u{2079}', '\u{207b}', MIDDLE_DOT, ' ', '\t', '\u{2003}', '-', '+',
            '*', '/', '(', ')', '[', ']', '^',
        ];
        for c in chars {
            let text = c.to_string();
            let parsed = UnitParser::parse(Rule::identifier, &text)
                .is_ok_and(|pairs| pairs.as_str() == text);
            assert_eq!(parsed, is_unit_identifier_part(c), "{c:?}");
        }
    }

    #[test]
    fn test_superscript_digits() {
        assert_eq!(superscript_digit('\u{2075}'), Some(5));
        assert_eq!(superscript_digit('5'), None);
        assert_eq!(to_superscript(2), Some('\u{00b2}'));
        assert_eq!(to_superscript(7), Some('\u{2077}'));
        assert_eq!(to_superscript(10), None);
    }

    #[test]
    fn test_syntax_errors_name_expectation() {
        let names = Names::new();
        let err = names.parse("m^").unwrap_err();
        assert!(err.to_string().contains("expected"), "{err}");
    }
}
