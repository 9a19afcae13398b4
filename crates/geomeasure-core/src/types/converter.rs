//! Value converters attached to transformed units
//!
//! A converter maps a value expressed in a transformed unit to the same value
//! expressed in its parent unit: `foot = metre * 0.3048` carries
//! `Multiply(0.3048)`, `celsius = kelvin + 273.15` carries `Add(273.15)`.

use super::Factor;

/// Sexagesimal packings of an angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SexagesimalForm {
    /// `DDDMMSS.s` packed into a single number (45°30'30" is 453030)
    Packed,
    /// `DDD.MMSSs` with minutes and seconds in the fraction (45.3030)
    Fractional,
}

/// Conversion from a transformed unit to its parent unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Converter {
    Multiply(Factor),
    Add(Factor),
    /// Sexagesimal degrees to decimal degrees; `inverse` converts the other way
    Sexagesimal { form: SexagesimalForm, inverse: bool },
}

/// Guards against values like 29.999999999 minutes after float arithmetic
const SEXAGESIMAL_EPS: f64 = 1e-8;

impl Converter {
    pub fn is_identity(&self) -> bool {
        match self {
            Converter::Multiply(f) => f.is_one(),
            Converter::Add(o) => o.is_zero(),
            Converter::Sexagesimal { .. } => false,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Converter::Multiply(_))
    }

    pub fn convert(&self, value: f64) -> f64 {
        match self {
            Converter::Multiply(f) => value * f.to_f64(),
            Converter::Add(o) => value + o.to_f64(),
            Converter::Sexagesimal { form, inverse: false } => from_sexagesimal(*form, value),
            Converter::Sexagesimal { form, inverse: true } => to_sexagesimal(*form, value),
        }
    }

    /// The converter undoing this one; `None` for a zero scale
    pub fn inverse(&self) -> Option<Converter> {
        Some(match self {
            Converter::Multiply(f) => Converter::Multiply(f.recip()?),
            Converter::Add(o) => Converter::Add(-*o),
            Converter::Sexagesimal { form, inverse } => Converter::Sexagesimal {
                form: *form,
                inverse: !inverse,
            },
        })
    }

    /// Merges `self` applied after `inner` into one converter when both are
    /// of the same affine kind
    pub fn compose(&self, inner: &Converter) -> Option<Converter> {
        match (self, inner) {
            (Converter::Multiply(a), Converter::Multiply(b)) => Some(Converter::Multiply(*a * *b)),
            (Converter::Add(a), Converter::Add(b)) => Some(Converter::Add(*a + *b)),
            _ => None,
        }
    }
}

fn split_sign(value: f64) -> (f64, f64) {
    if value < 0.0 {
        (-1.0, -value)
    } else {
        (1.0, value)
    }
}

fn from_sexagesimal(form: SexagesimalForm, value: f64) -> f64 {
    let (sign, value) = split_sign(value);
    let (degrees, minutes, seconds) = match form {
        SexagesimalForm::Packed => {
            let degrees = (value / 10000.0 + SEXAGESIMAL_EPS).floor();
            let rest = value - degrees * 10000.0;
            let minutes = (rest / 100.0 + SEXAGESIMAL_EPS).floor();
            (degrees, minutes, rest - minutes * 100.0)
        }
        SexagesimalForm::Fractional => {
            let degrees = (value + SEXAGESIMAL_EPS).floor();
            let rest = (value - degrees) * 100.0;
            let minutes = (rest + SEXAGESIMAL_EPS).floor();
            (degrees, minutes, (rest - minutes) * 100.0)
        }
    };
    sign * (degrees + minutes / 60.0 + seconds / 3600.0)
}

fn to_sexagesimal(form: SexagesimalForm, value: f64) -> f64 {
    let (sign, value) = split_sign(value);
    let mut degrees = (value + SEXAGESIMAL_EPS).floor();
    let rest = (value - degrees).max(0.0) * 60.0;
    let mut minutes = (rest + SEXAGESIMAL_EPS).floor();
    let mut seconds = ((rest - minutes) * 60.0).max(0.0);
    if seconds >= 60.0 - SEXAGESIMAL_EPS {
        seconds = 0.0;
        minutes += 1.0;
    }
    if minutes >= 60.0 {
        minutes -= 60.0;
        degrees += 1.0;
    }
    let packed = match form {
        SexagesimalForm::Packed => degrees * 10000.0 + minutes * 100.0 + seconds,
        SexagesimalForm::Fractional => degrees + minutes / 100.0 + seconds / 10000.0,
    };
    sign * packed
}
