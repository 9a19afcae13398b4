//! Walks the pest parse tree into units

use super::{superscript_digit, Lookup, Rule, SUPERSCRIPT_MINUS};
use crate::error::{UnitError, UnitResult};
use crate::types::{Factor, Unit};
use pest::error::{Error, ErrorVariant, InputLocation};
use pest::iterators::Pair;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Right-hand side of `*` or `/`
enum Operand {
    Number(Factor),
    Unit(Unit),
}

/// Walks pairs parsed from `input`, which starts `base` characters into
/// `text`. Pest spans are byte offsets into `input`; every offset reported
/// in an error is a character offset into `text`.
pub(super) struct Walker<'a> {
    text: &'a str,
    input: &'a str,
    base: usize,
    lookup: Lookup<'a>,
}

impl<'a> Walker<'a> {
    pub(super) fn new(text: &'a str, base: usize, input: &'a str, lookup: Lookup<'a>) -> Self {
        Self {
            text,
            input,
            base,
            lookup,
        }
    }

    pub(super) fn input(&self) -> &'a str {
        self.input
    }

    /// Character offset in `text` of byte `byte` of `input`
    pub(super) fn offset(&self, byte: usize) -> usize {
        self.base + self.input[..byte].chars().count()
    }

    /// Character offset in `text` of the end of `input`
    pub(super) fn end(&self) -> usize {
        self.base + self.input.chars().count()
    }

    pub(super) fn error_at(&self, message: impl Into<String>, byte: usize) -> UnitError {
        UnitError::malformed(message, self.text, self.offset(byte))
    }

    fn error<T>(&self, message: impl Into<String>, pair: &Pair<'_, Rule>) -> UnitResult<T> {
        Err(self.error_at(message, pair.as_span().start()))
    }

    pub(super) fn syntax_error(&self, error: Error<Rule>) -> UnitError {
        let byte = match error.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        let message = match &error.variant {
            ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                let mut expected: Vec<&str> = Vec::new();
                for rule in positives {
                    let name = describe(*rule);
                    if !expected.contains(&name) {
                        expected.push(name);
                    }
                }
                format!("{} expected", expected.join(" or "))
            }
            ErrorVariant::ParsingError { .. } => match self.input[byte..].chars().next() {
                Some(c) => format!("unexpected '{c}'"),
                None => "unexpected end of input".to_string(),
            },
            ErrorVariant::CustomError { message } => message.clone(),
        };
        self.error_at(message, byte)
    }

    /// Whole-input lookup so that names containing syntax characters, such
    /// as "km/h" or multi-word aliases, resolve before the grammar runs
    pub(super) fn lookup_rest(&self) -> Option<Unit> {
        let name = self.input.trim();
        if name.is_empty() {
            return None;
        }
        let unit = (self.lookup)(name)?;
        tracing::trace!(name, "resolved unit expression by name");
        Some(unit)
    }

    pub(super) fn product(&self, pair: Pair<'_, Rule>) -> UnitResult<Unit> {
        let mut inner = pair.into_inner();
        let mut result = match inner.next() {
            Some(term) => self.term(term)?,
            None => return Ok(Unit::one()),
        };

        for suffix in inner {
            let start = suffix.as_span().start();
            result = match suffix.as_rule() {
                Rule::caret_exponent => {
                    let mut parts = suffix.into_inner();
                    let pow = match parts.next() {
                        Some(pow) => self.integer(&pow)?,
                        None => 1,
                    };
                    let root = match parts.next() {
                        Some(root) => self.integer(&root)?,
                        None => 1,
                    };
                    raise(result, pow, root)?
                }
                Rule::super_exponent => raise(result, self.superscript(&suffix)?, 1)?,
                Rule::multiply => match self.operand(suffix)? {
                    Operand::Number(factor) => result.scale(factor),
                    Operand::Unit(unit) => result.multiply(&unit)?,
                },
                Rule::divide => match self.operand(suffix)? {
                    Operand::Number(factor) => result.divide_by(factor)?,
                    Operand::Unit(unit) => result.divide(&unit)?,
                },
                Rule::shift => match self.operand(suffix)? {
                    Operand::Number(offset) => result.shift(offset),
                    Operand::Unit(_) => return Err(self.error_at("not a number", start)),
                },
                _ => result,
            };
        }
        Ok(result)
    }

    fn term(&self, pair: Pair<'_, Rule>) -> UnitResult<Unit> {
        match pair.as_rule() {
            Rule::number => Ok(Unit::one().scale(self.number(&pair)?)),
            Rule::identifier => self.identifier(&pair),
            _ => self.product(pair),
        }
    }

    fn operand(&self, pair: Pair<'_, Rule>) -> UnitResult<Operand> {
        let after = pair.as_span().end();
        match pair.into_inner().next() {
            Some(number) if number.as_rule() == Rule::number => {
                Ok(Operand::Number(self.number(&number)?))
            }
            Some(product) => Ok(Operand::Unit(self.product(product)?)),
            None => Err(self.error_at("unit expected", after)),
        }
    }

    pub(super) fn identifier(&self, pair: &Pair<'_, Rule>) -> UnitResult<Unit> {
        let name = pair.as_str();
        match (self.lookup)(name).or_else(|| self.annotated(name)) {
            Some(unit) => Ok(unit),
            None => self.error(format!("{name} not recognized"), pair),
        }
    }

    /// `name{annotation}`
    fn annotated(&self, name: &str) -> Option<Unit> {
        let (base, annotation) = name.strip_suffix('}')?.split_once('{')?;
        Some((self.lookup)(base)?.annotate(annotation))
    }

    /// Decimal literals stay exact
    fn number(&self, pair: &Pair<'_, Rule>) -> UnitResult<Factor> {
        let literal = pair.as_str();
        let factor = if literal.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
            Decimal::from_str(literal)
                .or_else(|_| Decimal::from_scientific(literal))
                .ok()
                .map(Factor::from_decimal)
                .or_else(|| literal.parse::<f64>().ok().map(Factor::from_f64))
        } else {
            literal.parse::<i128>().ok().map(Factor::integer)
        };
        match factor {
            Some(factor) => Ok(factor),
            None => self.error(format!("{literal} is not a valid number"), pair),
        }
    }

    fn integer(&self, pair: &Pair<'_, Rule>) -> UnitResult<i32> {
        match pair.as_str().parse::<i32>() {
            Ok(value) => Ok(value),
            Err(_) => self.error("exponent out of range", pair),
        }
    }

    fn superscript(&self, pair: &Pair<'_, Rule>) -> UnitResult<i32> {
        let text = pair.as_str();
        let (negative, digits) = match text.strip_prefix(SUPERSCRIPT_MINUS) {
            Some(digits) => (true, digits),
            None => (false, text),
        };
        let mut value: i32 = 0;
        for c in digits.chars() {
            let Some(digit) = superscript_digit(c) else {
                return self.error("exponent expected", pair);
            };
            value = match value.checked_mul(10).and_then(|v| v.checked_add(digit as i32)) {
                Some(value) => value,
                None => return self.error("exponent out of range", pair),
            };
        }
        Ok(if negative { -value } else { value })
    }
}

fn raise(unit: Unit, pow: i32, root: i32) -> UnitResult<Unit> {
    let unit = if pow != 1 { unit.pow(pow)? } else { unit };
    if root != 1 {
        unit.root(root)
    } else {
        Ok(unit)
    }
}

fn describe(rule: Rule) -> &'static str {
    match rule {
        Rule::number => "number",
        Rule::identifier => "unit name",
        Rule::product => "unit",
        Rule::power | Rule::root => "integer",
        Rule::caret_exponent | Rule::super_exponent => "exponent",
        Rule::multiply => "'*'",
        Rule::divide => "'/'",
        Rule::shift => "'+'",
        Rule::EOI => "end of input",
        _ => "unit expression",
    }
}
