//! Unit definition catalogs
//!
//! Every dialect replays the same ordered definition groups into a fresh
//! [`Registry`], followed by its own override group. Later groups relabel
//! units from earlier ones; the earlier names keep resolving.
//!
//! To add a unit, add a [`UnitDef`] to the matching group.

use crate::error::UnitResult;
use crate::registry::Registry;
use crate::types::{Prefix, Unit};
use crate::units::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Naming convention for parsing and formatting units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Unicode symbols: Ω, ℃, µ, superscript exponents, middle dot
    Default,
    /// ASCII-only names: Ohm, Celsius, micro, `*` and `^`
    Ascii,
    /// EPSG unit abbreviations
    Epsg,
    /// ESRI unit names
    Esri,
    /// WKT1 unit names
    Wkt,
    /// GeoTools-specific names
    GeoTools,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::Default,
        Dialect::Ascii,
        Dialect::Epsg,
        Dialect::Esri,
        Dialect::Wkt,
        Dialect::GeoTools,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Default => "default",
            Dialect::Ascii => "ascii",
            Dialect::Epsg => "epsg",
            Dialect::Esri => "esri",
            Dialect::Wkt => "wkt",
            Dialect::GeoTools => "geotools",
        }
    }

    pub fn is_ascii_only(&self) -> bool {
        matches!(self, Dialect::Ascii)
    }

    /// Definition groups replayed to build this dialect, in order
    pub fn groups(&self) -> Vec<&'static UnitGroup> {
        let mut groups: Vec<&'static UnitGroup> = BASE_GROUPS.to_vec();
        match self {
            Dialect::Default => {}
            Dialect::Ascii => groups.push(&ASCII),
            Dialect::Epsg => groups.push(&EPSG),
            Dialect::Esri => groups.push(&ESRI),
            Dialect::Wkt => groups.push(&WKT),
            Dialect::GeoTools => groups.push(&GEOTOOLS_OVERRIDES),
        }
        groups
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown dialect: {s}"))
    }
}

/// Which prefixes a unit accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefixes {
    NoPrefixes,
    /// All metric prefixes, yocto to yotta
    Metric,
    /// Metric prefixes from kilo up
    Multiples,
    /// Metric multiples and binary prefixes
    Data,
}

impl Prefixes {
    pub fn iter(self) -> impl Iterator<Item = &'static Prefix> {
        Prefix::all().filter(move |p| match self {
            Prefixes::NoPrefixes => false,
            Prefixes::Metric => p.base == 10,
            Prefixes::Multiples => p.base == 10 && p.exponent >= 3,
            Prefixes::Data => p.base == 2 || p.exponent >= 3,
        })
    }
}

/// Declarative registration of one unit
pub struct UnitDef {
    pub unit: &'static LazyLock<Unit>,
    /// Label overriding the unit's own symbol. Units with neither only get
    /// their aliases registered.
    pub symbol: Option<&'static str>,
    pub prefixes: Prefixes,
    /// Names resolving to the unprefixed unit only
    pub aliases: &'static [&'static str],
    /// Alternative spellings that also combine with every prefix
    pub prefixed_aliases: &'static [&'static str],
}

impl UnitDef {
    const fn new(unit: &'static LazyLock<Unit>) -> Self {
        Self {
            unit,
            symbol: None,
            prefixes: Prefixes::NoPrefixes,
            aliases: &[],
            prefixed_aliases: &[],
        }
    }

    const fn labelled(unit: &'static LazyLock<Unit>, symbol: &'static str) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::new(unit)
        }
    }

    const fn prefixed(self, prefixes: Prefixes) -> Self {
        Self { prefixes, ..self }
    }

    const fn aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    const fn prefixed_aliases(self, prefixed_aliases: &'static [&'static str]) -> Self {
        Self {
            prefixed_aliases,
            ..self
        }
    }
}

/// A named, ordered list of definitions
pub struct UnitGroup {
    pub name: &'static str,
    pub defs: &'static [UnitDef],
}

/// Spellings replaced when deriving ASCII names, applied in order
pub const ASCII_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("\u{00b0}C", "Celsius"),
    ("\u{2103}", "Celsius"),
    ("\u{03a9}", "Ohm"),
    ("\u{2126}", "Ohm"),
    ("\u{00b5}", "micro"),
    ("\u{03bc}", "micro"),
    ("\u{00b0}", "deg"),
    ("\u{2032}", "'"),
    ("\u{2033}", "\""),
    ("\u{00b7}", "*"),
];

/// ASCII spelling of `name`, or `None` when no substitution makes it ASCII
pub fn ascii_name(name: &str) -> Option<String> {
    let substituted = ASCII_SUBSTITUTIONS
        .iter()
        .fold(name.to_string(), |acc, (from, to)| acc.replace(from, to));
    substituted.is_ascii().then_some(substituted)
}

pub static DIMENSIONLESS: UnitGroup = UnitGroup {
    name: "dimensionless",
    defs: &[
        UnitDef::labelled(&ONE, "one"),
        UnitDef::labelled(&PERCENT, "%"),
        UnitDef::labelled(&PPM, "ppm"),
        UnitDef::new(&PIXEL),
    ],
};

pub static SI_BASE: UnitGroup = UnitGroup {
    name: "si-base",
    defs: &[
        UnitDef::new(&METRE).prefixed(Prefixes::Metric),
        UnitDef::new(&KILOGRAM),
        UnitDef::labelled(&GRAM, "g").prefixed(Prefixes::Metric),
        UnitDef::new(&SECOND).prefixed(Prefixes::Metric),
        UnitDef::new(&AMPERE).prefixed(Prefixes::Metric),
        UnitDef::new(&KELVIN).prefixed(Prefixes::Metric),
        UnitDef::new(&MOLE).prefixed(Prefixes::Metric),
        UnitDef::new(&CANDELA).prefixed(Prefixes::Metric),
    ],
};

pub static SI_DERIVED: UnitGroup = UnitGroup {
    name: "si-derived",
    defs: &[
        UnitDef::new(&RADIAN).prefixed(Prefixes::Metric),
        UnitDef::new(&STERADIAN),
        UnitDef::new(&HERTZ).prefixed(Prefixes::Metric),
        UnitDef::new(&NEWTON).prefixed(Prefixes::Metric),
        UnitDef::new(&PASCAL).prefixed(Prefixes::Metric),
        UnitDef::new(&JOULE).prefixed(Prefixes::Metric),
        UnitDef::new(&WATT).prefixed(Prefixes::Metric),
        UnitDef::new(&COULOMB).prefixed(Prefixes::Metric),
        UnitDef::new(&VOLT).prefixed(Prefixes::Metric),
        UnitDef::new(&FARAD).prefixed(Prefixes::Metric),
        UnitDef::new(&OHM)
            .prefixed(Prefixes::Metric)
            .prefixed_aliases(&["Ohm"]),
        UnitDef::new(&SIEMENS).prefixed(Prefixes::Metric),
        UnitDef::new(&WEBER).prefixed(Prefixes::Metric),
        UnitDef::new(&TESLA).prefixed(Prefixes::Metric),
        UnitDef::new(&HENRY).prefixed(Prefixes::Metric),
        UnitDef::new(&CELSIUS).aliases(&["\u{00b0}C"]),
        UnitDef::new(&LUMEN).prefixed(Prefixes::Metric),
        UnitDef::new(&LUX).prefixed(Prefixes::Metric),
        UnitDef::new(&BECQUEREL).prefixed(Prefixes::Metric),
        UnitDef::new(&GRAY).prefixed(Prefixes::Metric),
        UnitDef::new(&SIEVERT).prefixed(Prefixes::Metric),
        UnitDef::new(&KATAL).prefixed(Prefixes::Metric),
    ],
};

pub static NON_SI: UnitGroup = UnitGroup {
    name: "non-si",
    defs: &[
        UnitDef::labelled(&MINUTE, "min"),
        UnitDef::labelled(&HOUR, "h"),
        UnitDef::labelled(&DAY, "day").aliases(&["d"]),
        UnitDef::labelled(&WEEK, "week").aliases(&["wk"]),
        UnitDef::labelled(&YEAR, "year").aliases(&["yr", "days365"]),
        UnitDef::labelled(&MONTH, "mo").aliases(&["mon", "month"]),
        UnitDef::labelled(&DEGREE_ANGLE, "\u{00b0}").aliases(&["deg"]),
        UnitDef::labelled(&MINUTE_ANGLE, "\u{2032}").aliases(&["'"]),
        UnitDef::labelled(&SECOND_ANGLE, "\u{2033}").aliases(&["\""]),
        UnitDef::labelled(&GRAD, "grad").aliases(&["gon"]),
        UnitDef::new(&SQUARE_METRE).aliases(&["m2"]),
        UnitDef::new(&CUBIC_METRE).aliases(&["m3", "\u{33a5}"]),
        UnitDef::labelled(&HECTARE, "ha"),
        UnitDef::new(&LITRE)
            .prefixed(Prefixes::Metric)
            .prefixed_aliases(&["L"]),
        UnitDef::new(&TONNE).prefixed(Prefixes::Multiples),
        UnitDef::labelled(&KILOMETRE_PER_HOUR, "km/h").aliases(&["kph"]),
    ],
};

pub static DATA: UnitGroup = UnitGroup {
    name: "data",
    defs: &[UnitDef::new(&BYTE)
        .prefixed(Prefixes::Data)
        .aliases(&["byte"])],
};

pub static US_CUSTOMARY: UnitGroup = UnitGroup {
    name: "us-customary",
    defs: &[
        UnitDef::labelled(&FOOT, "ft").aliases(&["foot", "feet"]),
        UnitDef::labelled(&FOOT_SURVEY_US, "ftUS"),
        UnitDef::labelled(&INCH, "in").aliases(&["inch"]),
        UnitDef::labelled(&YARD, "yd"),
        UnitDef::labelled(&MILE, "mi").aliases(&["mile"]),
        UnitDef::labelled(&NAUTICAL_MILE, "NM").aliases(&["nmi"]),
        UnitDef::labelled(&KNOT, "kn").aliases(&["knot"]),
        UnitDef::labelled(&POUND, "lb").aliases(&["pound"]),
    ],
};

pub static GEOTOOLS: UnitGroup = UnitGroup {
    name: "geotools",
    defs: &[
        UnitDef::labelled(&DEGREE_MINUTE_SECOND, "DMS").aliases(&["degree minute second"]),
        UnitDef::labelled(&SEXAGESIMAL_DMS, "D.MS"),
    ],
};

/// Groups shared by every dialect
pub static BASE_GROUPS: [&UnitGroup; 7] = [
    &DIMENSIONLESS,
    &SI_BASE,
    &SI_DERIVED,
    &NON_SI,
    &DATA,
    &US_CUSTOMARY,
    &GEOTOOLS,
];

pub static ASCII: UnitGroup = UnitGroup {
    name: "ascii",
    defs: &[
        UnitDef::labelled(&CELSIUS, "Celsius").aliases(&["Cel"]),
        UnitDef::labelled(&LITRE, "L").prefixed(Prefixes::Metric),
    ],
};

pub static EPSG: UnitGroup = UnitGroup {
    name: "epsg",
    defs: &[
        UnitDef::labelled(&DEGREE_ANGLE, "deg"),
        UnitDef::labelled(&RADIAN, "rad"),
        UnitDef::labelled(&GRAD, "gon"),
        UnitDef::labelled(&FOOT_SURVEY_US, "ftUS"),
        UnitDef::labelled(&FOOT, "ft"),
        UnitDef::labelled(&METRE, "m"),
        UnitDef::labelled(&KILOMETRE, "km"),
    ],
};

pub static ESRI: UnitGroup = UnitGroup {
    name: "esri",
    defs: &[
        UnitDef::labelled(&DEGREE_ANGLE, "Degree"),
        UnitDef::labelled(&METRE, "Meter"),
        UnitDef::labelled(&KILOMETRE, "Kilometer"),
        UnitDef::labelled(&FOOT, "Foot"),
        UnitDef::labelled(&FOOT_SURVEY_US, "Foot_US"),
        UnitDef::labelled(&RADIAN, "Radian"),
        UnitDef::labelled(&GRAD, "Grad"),
        UnitDef::labelled(&INCH, "Inch"),
        UnitDef::labelled(&YARD, "Yard"),
        UnitDef::labelled(&MILE, "Statute_Mile"),
        UnitDef::labelled(&NAUTICAL_MILE, "Nautical_Mile"),
    ],
};

pub static WKT: UnitGroup = UnitGroup {
    name: "wkt",
    defs: &[
        UnitDef::labelled(&DEGREE_ANGLE, "degree"),
        UnitDef::labelled(&METRE, "metre"),
        UnitDef::labelled(&RADIAN, "radian"),
        UnitDef::labelled(&GRAD, "grad"),
        UnitDef::labelled(&FOOT, "foot"),
        UnitDef::labelled(&FOOT_SURVEY_US, "US survey foot"),
        UnitDef::labelled(&KILOMETRE, "kilometre"),
        UnitDef::labelled(&MINUTE_ANGLE, "arc-minute"),
        UnitDef::labelled(&SECOND_ANGLE, "arc-second"),
    ],
};

pub static GEOTOOLS_OVERRIDES: UnitGroup = UnitGroup {
    name: "geotools-overrides",
    defs: &[
        UnitDef::labelled(&FOOT_SURVEY_US, "ft_survey_us"),
        UnitDef::labelled(&PIXEL, "pixel"),
    ],
};

/// Registers `name` through `register`, mapped to ASCII in ASCII dialects.
/// Names with no ASCII spelling are skipped there.
fn register_name(
    registry: &Registry,
    name: &str,
    register: impl FnOnce(&Registry, &str) -> UnitResult<()>,
) -> UnitResult<()> {
    if registry.dialect().is_ascii_only() {
        match ascii_name(name) {
            Some(ascii) => register(registry, &ascii),
            None => Ok(()),
        }
    } else {
        register(registry, name)
    }
}

fn label(registry: &Registry, unit: &Unit, name: &str) -> UnitResult<()> {
    register_name(registry, name, |r, n| r.label(unit, n))
}

fn alias(registry: &Registry, unit: &Unit, name: &str) -> UnitResult<()> {
    register_name(registry, name, |r, n| r.alias(unit, n))
}

/// Replays one definition into `registry`
pub fn register(registry: &Registry, def: &UnitDef) -> UnitResult<()> {
    let unit: &Unit = def.unit;
    let symbol = def.symbol.or(unit.symbol());
    if let Some(symbol) = symbol {
        label(registry, unit, symbol)?;
        for prefix in def.prefixes.iter() {
            let prefixed = unit.prefix(prefix);
            label(registry, &prefixed, &format!("{}{symbol}", prefix.symbol))?;
            for spelling in prefix.aliases {
                alias(registry, &prefixed, &format!("{spelling}{symbol}"))?;
            }
        }
    }
    for name in def.aliases {
        alias(registry, unit, name)?;
    }
    for name in def.prefixed_aliases {
        alias(registry, unit, name)?;
        for prefix in def.prefixes.iter() {
            let prefixed = unit.prefix(prefix);
            for spelling in prefix.spellings() {
                alias(registry, &prefixed, &format!("{spelling}{name}"))?;
            }
        }
    }
    Ok(())
}

/// Replays every group of `registry`'s dialect
pub fn populate(registry: &Registry) -> UnitResult<()> {
    for group in registry.dialect().groups() {
        for def in group.defs {
            register(registry, def)?;
        }
    }
    Ok(())
}

/// A registry holding the full catalog of `dialect`
pub fn registry(dialect: Dialect) -> Registry {
    let registry = Registry::new(dialect);
    populate(&registry).expect("catalog definitions must be valid identifiers");
    tracing::debug!(
        dialect = %dialect,
        labels = registry.labels().len(),
        names = registry.len(),
        "built unit registry"
    );
    registry
}
