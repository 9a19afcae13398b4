//! Scale factors and offsets carried by unit converters
//!
//! Factors stay exact (rational) for as long as the algebra allows it so that
//! prefix detection and unit equality never depend on floating point noise.
//! Irrational results (roots, pi-based angles) and overflowing products fall
//! back to an `f64` approximation.

use num_integer::Roots;
use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedMul};
use rust_decimal::Decimal;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg};

/// Exact rational used by factors
pub type Rational = Ratio<i128>;

/// A multiplicative factor or additive offset
#[derive(Debug, Clone, Copy)]
pub enum Factor {
    /// Exact rational value
    Exact(Rational),
    /// Inexact value (irrational or out of i128 range)
    Approx(f64),
}

impl Factor {
    pub const ZERO: Factor = Factor::Exact(Ratio::new_raw(0, 1));
    pub const ONE: Factor = Factor::Exact(Ratio::new_raw(1, 1));

    /// Exact integer factor
    pub fn integer(n: i128) -> Self {
        Factor::Exact(Ratio::from_integer(n))
    }

    /// Exact ratio `numer / denom`.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    pub fn ratio(numer: i128, denom: i128) -> Self {
        Factor::Exact(Ratio::new(numer, denom))
    }

    /// Integral floats become exact, everything else stays approximate
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e30 {
            Factor::integer(value as i128)
        } else {
            Factor::Approx(value)
        }
    }

    /// Decimal literals are always representable exactly
    pub fn from_decimal(value: Decimal) -> Self {
        let denom = 10i128.pow(value.scale());
        Factor::Exact(Ratio::new(value.mantissa(), denom))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Factor::Exact(r) => *r.numer() as f64 / *r.denom() as f64,
            Factor::Approx(v) => *v,
        }
    }

    pub fn as_ratio(&self) -> Option<Rational> {
        match self {
            Factor::Exact(r) => Some(*r),
            Factor::Approx(_) => None,
        }
    }

    /// The integer value, if this factor is an exact integer
    pub fn as_integer(&self) -> Option<i128> {
        self.as_ratio()
            .filter(|r| r.is_integer())
            .map(|r| r.to_integer())
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Factor::Exact(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Factor::Exact(r) => *r.numer() == 0,
            Factor::Approx(v) => *v == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Factor::Exact(r) => *r.numer() == 1 && *r.denom() == 1,
            Factor::Approx(v) => *v == 1.0,
        }
    }

    /// `1 / self`, or `None` for zero
    pub fn recip(&self) -> Option<Factor> {
        if self.is_zero() {
            return None;
        }
        Some(match self {
            Factor::Exact(r) => Factor::Exact(r.recip()),
            Factor::Approx(v) => Factor::Approx(1.0 / v),
        })
    }

    /// Integer power; `None` when raising zero to a negative power
    pub fn powi(&self, exp: i32) -> Option<Factor> {
        let base = if exp < 0 { self.recip()? } else { *self };
        let exp = exp.unsigned_abs();
        if let Factor::Exact(r) = base {
            let exact = r
                .numer()
                .checked_pow(exp)
                .zip(r.denom().checked_pow(exp))
                .map(|(n, d)| Ratio::new(n, d));
            if let Some(exact) = exact {
                return Some(Factor::Exact(exact));
            }
        }
        Some(Factor::Approx(base.to_f64().powf(exp as f64)))
    }

    /// `n`-th root; exact when numerator and denominator are perfect powers.
    /// `None` for a zero order or an even root of a negative value.
    pub fn root(&self, n: u32) -> Option<Factor> {
        if n == 0 {
            return None;
        }
        if n == 1 {
            return Some(*self);
        }
        let negative = self.to_f64() < 0.0;
        if negative && n % 2 == 0 {
            return None;
        }
        if let Factor::Exact(r) = self {
            let numer = r.numer().abs();
            let denom = *r.denom();
            let (rn, rd) = (numer.nth_root(n), denom.nth_root(n));
            let perfect = rn.checked_pow(n) == Some(numer) && rd.checked_pow(n) == Some(denom);
            if perfect {
                let rn = if negative { -rn } else { rn };
                return Some(Factor::ratio(rn, rd));
            }
        }
        let magnitude = self.to_f64().abs().powf(1.0 / n as f64);
        Some(Factor::Approx(if negative { -magnitude } else { magnitude }))
    }

    /// Equality with a relative tolerance for approximate values
    pub fn approx_eq(&self, other: &Factor) -> bool {
        if let (Factor::Exact(a), Factor::Exact(b)) = (self, other) {
            return a == b;
        }
        let (a, b) = (self.to_f64(), other.to_f64());
        a == b || (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
    }
}

/// Renders a terminating rational as a plain decimal string (`0.3048`)
fn decimal_string(r: &Rational) -> Option<String> {
    let mut rest = *r.denom();
    let (mut twos, mut fives) = (0u32, 0u32);
    while rest % 2 == 0 {
        rest /= 2;
        twos += 1;
    }
    while rest % 5 == 0 {
        rest /= 5;
        fives += 1;
    }
    if rest != 1 {
        return None;
    }
    let scale = twos.max(fives);
    let multiplier = 10i128.checked_pow(scale)? / *r.denom();
    let mantissa = r.numer().checked_mul(&multiplier)?;
    let value = Decimal::try_from_i128_with_scale(mantissa, scale).ok()?;
    Some(value.normalize().to_string())
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factor::Exact(r) if r.is_integer() => write!(f, "{}", r.numer()),
            Factor::Exact(r) => match decimal_string(r) {
                Some(s) => f.write_str(&s),
                None => write!(f, "{}/{}", r.numer(), r.denom()),
            },
            Factor::Approx(v) => write!(f, "{v}"),
        }
    }
}

impl Mul for Factor {
    type Output = Factor;

    fn mul(self, rhs: Factor) -> Factor {
        if let (Factor::Exact(a), Factor::Exact(b)) = (&self, &rhs) {
            if let Some(product) = a.checked_mul(b) {
                return Factor::Exact(product);
            }
        }
        Factor::from_f64(self.to_f64() * rhs.to_f64())
    }
}

impl Add for Factor {
    type Output = Factor;

    fn add(self, rhs: Factor) -> Factor {
        if let (Factor::Exact(a), Factor::Exact(b)) = (&self, &rhs) {
            if let Some(sum) = a.checked_add(b) {
                return Factor::Exact(sum);
            }
        }
        Factor::from_f64(self.to_f64() + rhs.to_f64())
    }
}

impl Neg for Factor {
    type Output = Factor;

    fn neg(self) -> Factor {
        match self {
            Factor::Exact(r) => Factor::Exact(-r),
            Factor::Approx(v) => Factor::Approx(-v),
        }
    }
}

impl PartialEq for Factor {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Factor::Exact(a), Factor::Exact(b)) => a == b,
            (Factor::Approx(a), Factor::Approx(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Factor {}

impl Hash for Factor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Factor::Exact(r) => {
                0u8.hash(state);
                r.numer().hash(state);
                r.denom().hash(state);
            }
            Factor::Approx(v) => {
                1u8.hash(state);
                v.to_bits().hash(state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_decimal_literal_is_exact() {
        let foot = Factor::from_decimal(Decimal::from_str("0.3048").unwrap());
        assert_eq!(foot, Factor::ratio(3048, 10000));
        assert_eq!(foot.to_string(), "0.3048");
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Factor::integer(1000).to_string(), "1000");
        assert_eq!(Factor::ratio(1, 1000).to_string(), "0.001");
        assert_eq!(Factor::ratio(1200, 3937).to_string(), "1200/3937");
    }

    #[test]
    fn test_exact_roots() {
        assert_eq!(Factor::integer(1_000_000).root(2), Some(Factor::integer(1000)));
        assert_eq!(Factor::ratio(1, 8).root(3), Some(Factor::ratio(1, 2)));
        assert!(!Factor::integer(1000).root(2).unwrap().is_exact());
        assert_eq!(Factor::integer(-8).root(3), Some(Factor::integer(-2)));
        assert_eq!(Factor::integer(-4).root(2), None);
        assert_eq!(Factor::ONE.root(0), None);
    }

    #[test]
    fn test_powers_and_overflow() {
        assert_eq!(Factor::integer(10).powi(3), Some(Factor::integer(1000)));
        assert_eq!(Factor::integer(10).powi(-2), Some(Factor::ratio(1, 100)));
        assert_eq!(Factor::ZERO.powi(-1), None);
        assert_eq!(Factor::integer(1).powi(i32::MIN), Some(Factor::ONE));
        assert_eq!(Factor::integer(2).powi(i32::MIN), Some(Factor::Approx(0.0)));
        let huge = Factor::integer(10).powi(40).unwrap();
        assert!(!huge.is_exact());
        assert!(huge.approx_eq(&Factor::Approx(1e40)));
    }

    #[test]
    fn test_recip_and_integers() {
        assert_eq!(Factor::ratio(1, 3600).recip().unwrap().as_integer(), Some(3600));
        assert_eq!(Factor::ZERO.recip(), None);
        assert_eq!(Factor::ratio(3, 2).as_integer(), None);
    }

    #[test]
    fn test_integral_floats_become_exact() {
        assert_eq!(Factor::from_f64(60.0), Factor::integer(60));
        assert!(!Factor::from_f64(0.1).is_exact());
    }
}
