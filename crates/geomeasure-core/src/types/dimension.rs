//! Physical dimensions as rational exponents over the seven SI base quantities

use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul};
use std::fmt;

const ZERO: Ratio<i32> = Ratio::new_raw(0, 1);
const ONE: Ratio<i32> = Ratio::new_raw(1, 1);

/// Base quantity symbols, in storage order
const SYMBOLS: [&str; 7] = ["L", "M", "T", "I", "Θ", "N", "J"];

/// Exponents over length, mass, time, electric current, temperature,
/// amount of substance and luminous intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension([Ratio<i32>; 7]);

impl Dimension {
    pub const NONE: Dimension = Dimension([ZERO; 7]);
    pub const LENGTH: Dimension = Dimension::base(0);
    pub const MASS: Dimension = Dimension::base(1);
    pub const TIME: Dimension = Dimension::base(2);
    pub const ELECTRIC_CURRENT: Dimension = Dimension::base(3);
    pub const TEMPERATURE: Dimension = Dimension::base(4);
    pub const AMOUNT_OF_SUBSTANCE: Dimension = Dimension::base(5);
    pub const LUMINOUS_INTENSITY: Dimension = Dimension::base(6);

    const fn base(index: usize) -> Dimension {
        let mut exponents = [ZERO; 7];
        exponents[index] = ONE;
        Dimension(exponents)
    }

    pub fn is_none(&self) -> bool {
        *self == Dimension::NONE
    }

    /// Sum of exponents; `None` on overflow
    pub fn multiply(&self, other: &Dimension) -> Option<Dimension> {
        let mut exponents = self.0;
        for (e, o) in exponents.iter_mut().zip(other.0) {
            *e = e.checked_add(&o)?;
        }
        Some(Dimension(exponents))
    }

    pub fn divide(&self, other: &Dimension) -> Option<Dimension> {
        self.multiply(&other.pow(-1)?)
    }

    pub fn pow(&self, n: i32) -> Option<Dimension> {
        self.map(|e| e.checked_mul(&Ratio::from_integer(n)))
    }

    /// `n`-th root; `None` for `n == 0` or on overflow
    pub fn root(&self, n: i32) -> Option<Dimension> {
        self.map(|e| e.checked_div(&Ratio::from_integer(n)))
    }

    fn map(&self, f: impl Fn(Ratio<i32>) -> Option<Ratio<i32>>) -> Option<Dimension> {
        let mut exponents = self.0;
        for e in &mut exponents {
            *e = f(*e)?;
        }
        Some(Dimension(exponents))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("1");
        }
        let mut first = true;
        for (symbol, exponent) in SYMBOLS.iter().zip(self.0) {
            if exponent == ZERO {
                continue;
            }
            if !first {
                f.write_str("·")?;
            }
            first = false;
            write!(f, "[{symbol}]")?;
            if exponent != ONE {
                write!(f, "^{exponent}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_dimension() {
        let velocity = Dimension::LENGTH.divide(&Dimension::TIME).unwrap();
        assert_eq!(velocity.to_string(), "[L]·[T]^-1");
        assert_eq!(velocity.multiply(&Dimension::TIME), Some(Dimension::LENGTH));
    }

    #[test]
    fn test_rational_root() {
        let root = Dimension::LENGTH.root(2).unwrap();
        assert_eq!(root.to_string(), "[L]^1/2");
        assert_eq!(root.pow(2), Some(Dimension::LENGTH));
        assert_eq!(Dimension::LENGTH.root(0), None);
    }

    #[test]
    fn test_none() {
        assert!(Dimension::NONE.is_none());
        assert!(Dimension::MASS.divide(&Dimension::MASS).unwrap().is_none());
    }

    #[test]
    fn test_exponent_overflow() {
        let force = Dimension::MASS
            .multiply(&Dimension::LENGTH)
            .and_then(|d| d.divide(&Dimension::TIME.pow(2)?))
            .unwrap();
        assert_eq!(force.pow(1_073_741_825), None);
        let big = Dimension::LENGTH.pow(i32::MAX).unwrap();
        assert_eq!(big.multiply(&Dimension::LENGTH), None);
    }
}
