//! Metric and binary magnitude prefixes
//!
//! To add a prefix, add an entry to METRIC_PREFIXES or BINARY_PREFIXES.
//! Catalog registration and the formatter's prefix detection pick it up.

use super::{Converter, Factor};

/// A named multiplicative scale such as kilo (10³) or mebi (2²⁰)
#[derive(Debug, PartialEq, Eq)]
pub struct Prefix {
    /// Full name (e.g., "kilo")
    pub name: &'static str,
    /// Canonical symbol (e.g., "k", "µ", "Ki")
    pub symbol: &'static str,
    /// Alternative spellings accepted when parsing (e.g., "μ", "micro")
    pub aliases: &'static [&'static str],
    /// 10 for metric prefixes, 2 for binary prefixes
    pub base: i128,
    pub exponent: i32,
}

const MICRO_ALIASES: &[&str] = &["\u{03bc}", "micro"];

const fn metric(name: &'static str, symbol: &'static str, exponent: i32) -> Prefix {
    Prefix {
        name,
        symbol,
        aliases: &[],
        base: 10,
        exponent,
    }
}

const fn binary(name: &'static str, symbol: &'static str, exponent: i32) -> Prefix {
    Prefix {
        name,
        symbol,
        aliases: &[],
        base: 2,
        exponent,
    }
}

/// SI prefixes from yotta (10²⁴) down to yocto (10⁻²⁴)
pub static METRIC_PREFIXES: [Prefix; 20] = [
    metric("yotta", "Y", 24),
    metric("zetta", "Z", 21),
    metric("exa", "E", 18),
    metric("peta", "P", 15),
    metric("tera", "T", 12),
    metric("giga", "G", 9),
    metric("mega", "M", 6),
    metric("kilo", "k", 3),
    metric("hecto", "h", 2),
    metric("deka", "da", 1),
    metric("deci", "d", -1),
    metric("centi", "c", -2),
    metric("milli", "m", -3),
    Prefix {
        name: "micro",
        symbol: "\u{00b5}",
        aliases: MICRO_ALIASES,
        base: 10,
        exponent: -6,
    },
    metric("nano", "n", -9),
    metric("pico", "p", -12),
    metric("femto", "f", -15),
    metric("atto", "a", -18),
    metric("zepto", "z", -21),
    metric("yocto", "y", -24),
];

/// IEC binary prefixes from kibi (2¹⁰) to yobi (2⁸⁰)
pub static BINARY_PREFIXES: [Prefix; 8] = [
    binary("kibi", "Ki", 10),
    binary("mebi", "Mi", 20),
    binary("gibi", "Gi", 30),
    binary("tebi", "Ti", 40),
    binary("pebi", "Pi", 50),
    binary("exbi", "Ei", 60),
    binary("zebi", "Zi", 70),
    binary("yobi", "Yi", 80),
];

pub static KILO: &Prefix = &METRIC_PREFIXES[7];
pub static MEGA: &Prefix = &METRIC_PREFIXES[6];
pub static MILLI: &Prefix = &METRIC_PREFIXES[12];
pub static MICRO: &Prefix = &METRIC_PREFIXES[13];
pub static KIBI: &Prefix = &BINARY_PREFIXES[0];

impl Prefix {
    /// Exact scale factor of this prefix
    pub fn factor(&self) -> Factor {
        let magnitude = self.base.pow(self.exponent.unsigned_abs());
        if self.exponent < 0 {
            Factor::ratio(1, magnitude)
        } else {
            Factor::integer(magnitude)
        }
    }

    pub fn converter(&self) -> Converter {
        Converter::Multiply(self.factor())
    }

    /// Spelling usable in ASCII-only dialects
    pub fn ascii_symbol(&self) -> &'static str {
        if self.symbol.is_ascii() {
            self.symbol
        } else {
            self.aliases
                .iter()
                .copied()
                .find(|a| a.is_ascii())
                .unwrap_or(self.name)
        }
    }

    /// Symbol followed by every alias
    pub fn spellings(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.symbol).chain(self.aliases.iter().copied())
    }

    /// Iterator over all known prefixes, metric first
    pub fn all() -> impl Iterator<Item = &'static Prefix> {
        METRIC_PREFIXES.iter().chain(BINARY_PREFIXES.iter())
    }

    /// Find a prefix by symbol or alias
    pub fn parse(symbol: &str) -> Option<&'static Prefix> {
        Prefix::all().find(|p| p.spellings().any(|s| s == symbol))
    }

    /// Find the prefix whose converter is exactly `converter`
    pub fn for_converter(converter: &Converter) -> Option<&'static Prefix> {
        match converter {
            Converter::Multiply(factor) => Prefix::all().find(|p| p.factor() == *factor),
            _ => None,
        }
    }
}
