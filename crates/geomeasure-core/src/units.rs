//! Predefined units
//!
//! SI base and derived units, the common non-SI units accepted for use with
//! SI, and the customary, data and angular units used across geospatial
//! formats. Each one is built lazily from the units it is derived from.

use crate::error::UnitResult;
use crate::types::prefix::KILO;
use crate::types::{Converter, Dimension, Factor, SexagesimalForm, Unit};
use std::f64::consts::PI;
use std::sync::LazyLock;

/// Unwraps the algebra of a static definition
fn defined(result: UnitResult<Unit>) -> Unit {
    result.expect("static unit definitions must be consistent")
}

// Dimensionless

pub static ONE: LazyLock<Unit> = LazyLock::new(Unit::one);
pub static PERCENT: LazyLock<Unit> = LazyLock::new(|| ONE.scale(Factor::ratio(1, 100)));
pub static PPM: LazyLock<Unit> = LazyLock::new(|| ONE.scale(Factor::ratio(1, 1_000_000)));
pub static PIXEL: LazyLock<Unit> = LazyLock::new(|| Unit::alternate("pixel", &ONE));

// SI base units

pub static METRE: LazyLock<Unit> = LazyLock::new(|| Unit::base("m", Dimension::LENGTH));
pub static KILOGRAM: LazyLock<Unit> = LazyLock::new(|| Unit::base("kg", Dimension::MASS));
pub static SECOND: LazyLock<Unit> = LazyLock::new(|| Unit::base("s", Dimension::TIME));
pub static AMPERE: LazyLock<Unit> =
    LazyLock::new(|| Unit::base("A", Dimension::ELECTRIC_CURRENT));
pub static KELVIN: LazyLock<Unit> = LazyLock::new(|| Unit::base("K", Dimension::TEMPERATURE));
pub static MOLE: LazyLock<Unit> =
    LazyLock::new(|| Unit::base("mol", Dimension::AMOUNT_OF_SUBSTANCE));
pub static CANDELA: LazyLock<Unit> =
    LazyLock::new(|| Unit::base("cd", Dimension::LUMINOUS_INTENSITY));

/// The gram is the kilogram scaled down, so `kilo(g)` is the kilogram itself
pub static GRAM: LazyLock<Unit> = LazyLock::new(|| KILOGRAM.scale(Factor::ratio(1, 1000)));

// SI derived units

pub static RADIAN: LazyLock<Unit> = LazyLock::new(|| Unit::alternate("rad", &ONE));
pub static STERADIAN: LazyLock<Unit> = LazyLock::new(|| Unit::alternate("sr", &ONE));
pub static HERTZ: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("Hz", &defined(SECOND.inverse())));
pub static NEWTON: LazyLock<Unit> = LazyLock::new(|| {
    let acceleration = defined(METRE.divide(&defined(SECOND.pow(2))));
    Unit::alternate("N", &defined(KILOGRAM.multiply(&acceleration)))
});
pub static PASCAL: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("Pa", &defined(NEWTON.divide(&SQUARE_METRE))));
pub static JOULE: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("J", &defined(NEWTON.multiply(&METRE))));
pub static WATT: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("W", &defined(JOULE.divide(&SECOND))));
pub static COULOMB: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("C", &defined(AMPERE.multiply(&SECOND))));
pub static VOLT: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("V", &defined(WATT.divide(&AMPERE))));
pub static FARAD: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("F", &defined(COULOMB.divide(&VOLT))));
pub static OHM: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("\u{03a9}", &defined(VOLT.divide(&AMPERE))));
pub static SIEMENS: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("S", &defined(AMPERE.divide(&VOLT))));
pub static WEBER: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("Wb", &defined(VOLT.multiply(&SECOND))));
pub static TESLA: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("T", &defined(WEBER.divide(&SQUARE_METRE))));
pub static HENRY: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("H", &defined(WEBER.divide(&AMPERE))));
pub static CELSIUS: LazyLock<Unit> = LazyLock::new(|| {
    Unit::transformed(
        &KELVIN,
        Converter::Add(Factor::ratio(27315, 100)),
        Some("\u{2103}"),
    )
});
pub static LUMEN: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("lm", &defined(CANDELA.multiply(&STERADIAN))));
pub static LUX: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("lx", &defined(LUMEN.divide(&SQUARE_METRE))));
pub static BECQUEREL: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("Bq", &defined(SECOND.inverse())));
pub static GRAY: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("Gy", &defined(JOULE.divide(&KILOGRAM))));
pub static SIEVERT: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("Sv", &defined(JOULE.divide(&KILOGRAM))));
pub static KATAL: LazyLock<Unit> =
    LazyLock::new(|| Unit::alternate("kat", &defined(MOLE.divide(&SECOND))));

// Non-SI units accepted for use with SI

pub static MINUTE: LazyLock<Unit> = LazyLock::new(|| SECOND.scale(Factor::integer(60)));
pub static HOUR: LazyLock<Unit> = LazyLock::new(|| SECOND.scale(Factor::integer(3600)));
pub static DAY: LazyLock<Unit> = LazyLock::new(|| SECOND.scale(Factor::integer(86_400)));
pub static WEEK: LazyLock<Unit> = LazyLock::new(|| DAY.scale(Factor::integer(7)));
/// 365 days
pub static YEAR: LazyLock<Unit> = LazyLock::new(|| DAY.scale(Factor::integer(365)));
pub static MONTH: LazyLock<Unit> =
    LazyLock::new(|| defined(YEAR.divide_by(Factor::integer(12))));

pub static DEGREE_ANGLE: LazyLock<Unit> =
    LazyLock::new(|| RADIAN.scale(Factor::Approx(PI / 180.0)));
pub static MINUTE_ANGLE: LazyLock<Unit> =
    LazyLock::new(|| defined(DEGREE_ANGLE.divide_by(Factor::integer(60))));
pub static SECOND_ANGLE: LazyLock<Unit> =
    LazyLock::new(|| defined(DEGREE_ANGLE.divide_by(Factor::integer(3600))));
pub static GRAD: LazyLock<Unit> = LazyLock::new(|| RADIAN.scale(Factor::Approx(PI / 200.0)));

pub static SQUARE_METRE: LazyLock<Unit> = LazyLock::new(|| defined(METRE.pow(2)));
pub static CUBIC_METRE: LazyLock<Unit> = LazyLock::new(|| defined(METRE.pow(3)));
pub static HECTARE: LazyLock<Unit> =
    LazyLock::new(|| SQUARE_METRE.scale(Factor::integer(10_000)));
pub static LITRE: LazyLock<Unit> = LazyLock::new(|| {
    Unit::transformed(
        &CUBIC_METRE,
        Converter::Multiply(Factor::ratio(1, 1000)),
        Some("l"),
    )
});
pub static TONNE: LazyLock<Unit> = LazyLock::new(|| {
    Unit::transformed(
        &KILOGRAM,
        Converter::Multiply(Factor::integer(1000)),
        Some("t"),
    )
});
pub static KILOMETRE: LazyLock<Unit> = LazyLock::new(|| METRE.prefix(KILO));
pub static KILOMETRE_PER_HOUR: LazyLock<Unit> =
    LazyLock::new(|| defined(KILOMETRE.divide(&HOUR)));

// Data

pub static BYTE: LazyLock<Unit> = LazyLock::new(|| Unit::alternate("B", &ONE));

// US customary and nautical

pub static FOOT: LazyLock<Unit> = LazyLock::new(|| METRE.scale(Factor::ratio(3048, 10_000)));
pub static FOOT_SURVEY_US: LazyLock<Unit> =
    LazyLock::new(|| METRE.scale(Factor::ratio(1200, 3937)));
pub static INCH: LazyLock<Unit> = LazyLock::new(|| METRE.scale(Factor::ratio(254, 10_000)));
pub static YARD: LazyLock<Unit> = LazyLock::new(|| METRE.scale(Factor::ratio(9144, 10_000)));
pub static MILE: LazyLock<Unit> = LazyLock::new(|| METRE.scale(Factor::ratio(1_609_344, 1000)));
pub static NAUTICAL_MILE: LazyLock<Unit> = LazyLock::new(|| METRE.scale(Factor::integer(1852)));
pub static KNOT: LazyLock<Unit> = LazyLock::new(|| defined(NAUTICAL_MILE.divide(&HOUR)));
pub static POUND: LazyLock<Unit> =
    LazyLock::new(|| KILOGRAM.scale(Factor::ratio(45_359_237, 100_000_000)));

// Sexagesimal angles

/// Degrees, minutes and seconds packed as `DDDMMSS.s`
pub static DEGREE_MINUTE_SECOND: LazyLock<Unit> = LazyLock::new(|| {
    DEGREE_ANGLE.transform(Converter::Sexagesimal {
        form: SexagesimalForm::Packed,
        inverse: false,
    })
});
/// Degrees with minutes and seconds in the fraction, `DDD.MMSSs`
pub static SEXAGESIMAL_DMS: LazyLock<Unit> = LazyLock::new(|| {
    DEGREE_ANGLE.transform(Converter::Sexagesimal {
        form: SexagesimalForm::Fractional,
        inverse: false,
    })
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prefix::MEGA;

    #[test]
    fn test_gram_prefixes_collapse_to_kilogram() {
        assert_eq!(GRAM.prefix(KILO), *KILOGRAM);
        assert_eq!(KILOGRAM.dimension(), Dimension::MASS);
    }

    #[test]
    fn test_derived_dimensions() {
        let energy = Dimension::MASS
            .multiply(&Dimension::LENGTH.pow(2).unwrap())
            .and_then(|d| d.divide(&Dimension::TIME.pow(2)?))
            .unwrap();
        assert_eq!(JOULE.dimension(), energy);
        assert!(RADIAN.dimension().is_none());
        assert!(HERTZ.is_compatible(&BECQUEREL));
        assert_ne!(*HERTZ, *BECQUEREL);
    }

    #[test]
    fn test_time_units() {
        assert_eq!(MONTH.conversion().unwrap().scale, Factor::integer(2_628_000));
        let days = YEAR.convert_to(1.0, &DAY).unwrap();
        assert!((days - 365.0).abs() < 1e-9);
    }

    #[test]
    fn test_conversions() {
        let feet = METRE.convert_to(1.0, &FOOT).unwrap();
        assert!((feet - 3.280839895).abs() < 1e-9);
        let kelvin = CELSIUS.convert_to(25.0, &KELVIN).unwrap();
        assert!((kelvin - 298.15).abs() < 1e-9);
        let kmh = KNOT.convert_to(1.0, &KILOMETRE_PER_HOUR).unwrap();
        assert!((kmh - 1.852).abs() < 1e-12);
        assert_eq!(METRE.convert_to(1.0, &SECOND), None);
    }

    #[test]
    fn test_megatonne_is_distinct_from_teragram() {
        let megatonne = TONNE.prefix(MEGA);
        let teragram = GRAM.scale(Factor::integer(1_000_000_000_000));
        assert_ne!(megatonne, teragram);
        assert!(megatonne.is_equivalent(&teragram));
    }

    #[test]
    fn test_sexagesimal_degrees() {
        let decimal = DEGREE_MINUTE_SECOND.convert_to(453030.0, &DEGREE_ANGLE).unwrap();
        assert!((decimal - 45.508333333).abs() < 1e-8);
        assert_eq!(DEGREE_MINUTE_SECOND.conversion(), None);
    }
}
