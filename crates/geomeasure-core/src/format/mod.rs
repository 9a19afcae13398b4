//! Unit formatter and parser entry point
//!
//! [`UnitFormat`] renders units to their canonical text for one dialect and
//! parses text back. Dialect differences are data ([`FormatConfig`]), not
//! separate formatter types.

use crate::catalog::{self, ascii_name, Dialect, ASCII_SUBSTITUTIONS};
use crate::error::UnitResult;
use crate::parser::{self, to_superscript, Cursor};
use crate::registry::Registry;
use crate::types::{Converter, Element, Factor, Prefix, Unit, UnitKind};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Dialect-specific rendering rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    /// Render every name in ASCII and use `*` and `^` in products
    pub ascii_only: bool,
    /// Replacements turning Unicode spellings into ASCII ones
    pub substitutions: &'static [(&'static str, &'static str)],
}

impl FormatConfig {
    pub fn for_dialect(dialect: Dialect) -> Self {
        if dialect.is_ascii_only() {
            Self {
                ascii_only: true,
                substitutions: ASCII_SUBSTITUTIONS,
            }
        } else {
            Self {
                ascii_only: false,
                substitutions: &[],
            }
        }
    }

    fn spell(&self, name: &str) -> String {
        self.substitutions
            .iter()
            .fold(name.to_string(), |acc, (from, to)| acc.replace(from, to))
    }
}

/// Formats and parses units in one dialect
#[derive(Debug)]
pub struct UnitFormat {
    dialect: Dialect,
    registry: Arc<Registry>,
    /// Consulted when `registry` has no entry; ASCII falls back to the
    /// default dialect's names
    fallback: Option<Arc<Registry>>,
    config: FormatConfig,
}

static SHARED: [OnceLock<Arc<UnitFormat>>; 6] = [
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
    OnceLock::new(),
];

const SEPARATORS: [char; 4] = [parser::MIDDLE_DOT, '*', '/', '+'];

impl UnitFormat {
    /// A fresh formatter with its own registries, independent of every other
    /// instance
    pub fn new(dialect: Dialect) -> Self {
        let fallback = dialect
            .is_ascii_only()
            .then(|| Arc::new(catalog::registry(Dialect::Default)));
        Self::with_registry(dialect, Arc::new(catalog::registry(dialect)), fallback)
    }

    pub fn with_registry(
        dialect: Dialect,
        registry: Arc<Registry>,
        fallback: Option<Arc<Registry>>,
    ) -> Self {
        Self {
            dialect,
            registry,
            fallback,
            config: FormatConfig::for_dialect(dialect),
        }
    }

    /// The process-wide formatter of `dialect`, built on first use.
    /// Registry mutations through it are visible to every user.
    pub fn shared(dialect: Dialect) -> Arc<UnitFormat> {
        let slot = &SHARED[dialect as usize];
        slot.get_or_init(|| {
            let fallback = dialect
                .is_ascii_only()
                .then(|| UnitFormat::shared(Dialect::Default).registry.clone());
            Arc::new(Self::with_registry(
                dialect,
                Arc::new(catalog::registry(dialect)),
                fallback,
            ))
        })
        .clone()
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // Registry operations

    pub fn label(&self, unit: &Unit, name: &str) -> UnitResult<()> {
        self.registry.label(unit, name)
    }

    pub fn alias(&self, unit: &Unit, name: &str) -> UnitResult<()> {
        self.registry.alias(unit, name)
    }

    pub fn remove_label(&self, unit: &Unit) {
        self.registry.remove_label(unit)
    }

    pub fn remove_alias(&self, unit: &Unit, name: &str) -> bool {
        self.registry.remove_alias(unit, name)
    }

    pub fn remove_aliases(&self, unit: &Unit) {
        self.registry.remove_aliases(unit)
    }

    pub fn is_valid_identifier(&self, name: &str) -> bool {
        self.registry.is_valid_identifier(name)
    }

    pub fn label_for(&self, unit: &Unit) -> Option<String> {
        self.registry.label_for(unit)
    }

    /// Resolves a name in this dialect, then in the fallback dialect
    pub fn unit_for(&self, name: &str) -> Option<Unit> {
        self.registry
            .unit_for(name)
            .or_else(|| self.fallback.as_ref()?.unit_for(name))
    }

    // Parsing

    /// Parses a complete unit expression
    pub fn parse(&self, text: &str) -> UnitResult<Unit> {
        parser::parse(text, &|name| self.unit_for(name))
    }

    /// Parses the unit expression starting at `cursor`, leaving the cursor
    /// where the expression ends
    pub fn parse_at(&self, text: &str, cursor: &mut Cursor) -> UnitResult<Unit> {
        parser::parse_at(text, cursor, &|name| self.unit_for(name))
    }

    /// Parses a single unit name starting at `cursor`
    pub fn parse_single(&self, text: &str, cursor: &mut Cursor) -> UnitResult<Unit> {
        parser::parse_single(text, cursor, &|name| self.unit_for(name))
    }

    // Formatting

    pub fn format(&self, unit: &Unit) -> String {
        if let Some(name) = self.name_for(unit) {
            return name;
        }
        match unit.kind() {
            UnitKind::Base { symbol, .. }
            | UnitKind::Alternate { symbol, .. }
            | UnitKind::Transformed {
                symbol: Some(symbol),
                ..
            } => self.config.spell(symbol),
            UnitKind::Transformed {
                parent,
                converter,
                symbol: None,
            } => self.format_transformed(unit, parent, converter),
            UnitKind::Product(product) if product.is_empty() => "1".to_string(),
            UnitKind::Product(product) => {
                if self.config.ascii_only {
                    self.format_ascii_product(product.elements())
                } else {
                    self.format_product(product.elements())
                }
            }
            UnitKind::Annotated { actual, annotation } => {
                format!("{}{{{annotation}}}", self.format(actual))
            }
        }
    }

    pub fn format_to(&self, unit: &Unit, out: &mut impl fmt::Write) -> fmt::Result {
        out.write_str(&self.format(unit))
    }

    /// `Display` adapter for `unit` in this dialect
    pub fn display<'a>(&'a self, unit: &'a Unit) -> impl fmt::Display + 'a {
        DisplayUnit { format: self, unit }
    }

    /// Registered name of `unit`. ASCII dialects also accept the fallback
    /// dialect's name when it has an ASCII spelling.
    fn name_for(&self, unit: &Unit) -> Option<String> {
        if let Some(label) = self.registry.label_for(unit) {
            return Some(label);
        }
        let label = self.fallback.as_ref()?.label_for(unit)?;
        if self.config.ascii_only {
            ascii_name(&label)
        } else {
            Some(label)
        }
    }

    fn format_transformed(&self, unit: &Unit, parent: &Unit, converter: &Converter) -> String {
        let mut text = self.format(parent);
        let grouped = text.contains(SEPARATORS);
        if grouped {
            text = format!("({text})");
        }
        match converter {
            Converter::Multiply(factor) => {
                if !grouped {
                    if let Some(prefix) = Prefix::for_converter(converter) {
                        let symbol = if self.config.ascii_only {
                            prefix.ascii_symbol()
                        } else {
                            prefix.symbol
                        };
                        let prefixed = format!("{symbol}{text}");
                        if self.unit_for(&prefixed).as_ref() == Some(unit) {
                            return prefixed;
                        }
                    }
                }
                format!("{text}{}", scale_suffix(factor))
            }
            Converter::Add(offset) => format!("{text}+{offset}"),
            Converter::Sexagesimal { .. } => format!("[{text}?]"),
        }
    }

    /// Name of a product factor, parenthesized when it would not parse back
    /// as a single term
    fn factor_name(&self, unit: &Unit) -> String {
        let name = self.format(unit);
        let bare = name
            .chars()
            .all(parser::is_unit_identifier_part);
        if bare {
            name
        } else {
            format!("({name})")
        }
    }

    fn format_product(&self, elements: &[Element]) -> String {
        let (positive, negative): (Vec<&Element>, Vec<&Element>) =
            elements.iter().partition(|e| e.pow > 0);
        let mut text = String::new();
        for (i, element) in positive.iter().enumerate() {
            if i > 0 {
                text.push(parser::MIDDLE_DOT);
            }
            text.push_str(&self.factor_name(&element.unit));
            push_exponent(&mut text, i64::from(element.pow), element.root);
        }
        if negative.is_empty() {
            return text;
        }
        if positive.is_empty() {
            text.push('1');
        }
        text.push('/');
        let grouped = negative.len() > 1;
        if grouped {
            text.push('(');
        }
        for (i, element) in negative.iter().enumerate() {
            if i > 0 {
                text.push(parser::MIDDLE_DOT);
            }
            text.push_str(&self.factor_name(&element.unit));
            push_exponent(&mut text, -i64::from(element.pow), element.root);
        }
        if grouped {
            text.push(')');
        }
        text
    }

    fn format_ascii_product(&self, elements: &[Element]) -> String {
        let mut text = String::new();
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                text.push('*');
            }
            text.push_str(&self.factor_name(&element.unit));
            if element.pow != 1 || element.root != 1 {
                text.push_str(&format!("^{}", element.pow));
                if element.root != 1 {
                    text.push_str(&format!(":{}", element.root));
                }
            }
        }
        text
    }
}

/// Superscript for squares and cubes, `^pow:root` otherwise
fn push_exponent(text: &mut String, pow: i64, root: i32) {
    if root == 1 && (pow == 2 || pow == 3) {
        if let Some(c) = to_superscript(pow as u32) {
            text.push(c);
        }
    } else if pow != 1 || root != 1 {
        text.push_str(&format!("^{pow}"));
        if root != 1 {
            text.push_str(&format!(":{root}"));
        }
    }
}

/// Text appended to a unit scaled by `factor`: `/1000` for reciprocals of
/// integers, `*factor` otherwise
fn scale_suffix(factor: &Factor) -> String {
    let reciprocal = factor
        .as_ratio()
        .filter(|r| *r.numer() == 1 && !r.is_integer())
        .map(|r| *r.denom());
    match reciprocal {
        Some(denom) => format!("/{denom}"),
        None => format!("*{factor}"),
    }
}

struct DisplayUnit<'a> {
    format: &'a UnitFormat,
    unit: &'a Unit,
}

impl fmt::Display for DisplayUnit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format.format_to(self.unit, f)
    }
}
