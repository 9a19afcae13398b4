//! Units of measure and their algebra
//!
//! A [`Unit`] is an immutable, cheaply cloneable value. Compound units are
//! produced functionally through [`Unit::multiply`], [`Unit::divide`],
//! [`Unit::pow`], [`Unit::root`], [`Unit::scale`] and [`Unit::shift`].

use super::{Converter, Dimension, Factor, Prefix};
use crate::error::{UnitError, UnitResult};
use num_integer::Integer;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

static ONE: LazyLock<Unit> =
    LazyLock::new(|| Unit::from_kind(UnitKind::Product(ProductUnit::default())));

/// A unit of measure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit(Arc<UnitKind>);

/// The shape of a unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// One of the seven SI base units
    Base { symbol: String, dimension: Dimension },
    /// A named system unit standing for a product of other units (N, Ω, rad)
    Alternate { symbol: String, parent: Unit },
    /// A unit derived from `parent` through a value converter (km, ℃, ft)
    Transformed {
        parent: Unit,
        converter: Converter,
        symbol: Option<String>,
    },
    /// Product of powers and roots of other units; empty for [`Unit::one`]
    Product(ProductUnit),
    /// A unit carrying a free-text annotation, e.g. `m{length}`
    Annotated { actual: Unit, annotation: String },
}

/// One factor of a product unit: `unit^(pow/root)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    pub unit: Unit,
    pub pow: i32,
    /// Always positive; the sign lives in `pow`
    pub root: i32,
}

/// Factors of a product unit.
///
/// Never contains two elements for the same unit or an element with a zero
/// power. Equality ignores element order. The dimension is computed once,
/// when the product is built.
#[derive(Debug, Clone)]
pub struct ProductUnit {
    elements: Vec<Element>,
    dimension: Dimension,
}

impl Default for ProductUnit {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            dimension: Dimension::NONE,
        }
    }
}

impl ProductUnit {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl PartialEq for ProductUnit {
    fn eq(&self, other: &Self) -> bool {
        self.elements.len() == other.elements.len()
            && self.elements.iter().all(|e| other.elements.contains(e))
    }
}

impl Eq for ProductUnit {}

impl Hash for ProductUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: sum of per-element hashes
        let mut sum = 0u64;
        for element in &self.elements {
            let mut hasher = DefaultHasher::new();
            element.hash(&mut hasher);
            sum = sum.wrapping_add(hasher.finish());
        }
        state.write_usize(self.elements.len());
        state.write_u64(sum);
    }
}

/// Affine conversion to the system unit: `system = value * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub scale: Factor,
    pub offset: Factor,
}

impl Conversion {
    pub const IDENTITY: Conversion = Conversion {
        scale: Factor::ONE,
        offset: Factor::ZERO,
    };
}

fn overflow() -> UnitError {
    UnitError::Arithmetic("exponent out of range".to_string())
}

/// Reduces `pow/root` by their gcd; `root` must be positive. `i32::MIN` is
/// refused so that every stored power can be negated.
fn reduce(pow: i64, root: i64) -> UnitResult<(i32, i32)> {
    let gcd = pow.gcd(&root).max(1);
    let pow = i32::try_from(pow / gcd)
        .ok()
        .filter(|&pow| pow != i32::MIN)
        .ok_or_else(overflow)?;
    let root = i32::try_from(root / gcd).map_err(|_| overflow())?;
    Ok((pow, root))
}

impl Unit {
    fn from_kind(kind: UnitKind) -> Unit {
        Unit(Arc::new(kind))
    }

    /// The dimensionless unit (empty product)
    pub fn one() -> Unit {
        ONE.clone()
    }

    pub fn base(symbol: &str, dimension: Dimension) -> Unit {
        Unit::from_kind(UnitKind::Base {
            symbol: symbol.to_string(),
            dimension,
        })
    }

    pub fn alternate(symbol: &str, parent: &Unit) -> Unit {
        Unit::from_kind(UnitKind::Alternate {
            symbol: symbol.to_string(),
            parent: parent.clone(),
        })
    }

    /// A transformed unit with an intrinsic symbol. Unlike [`Unit::transform`]
    /// this never merges into the parent, so the result keeps its own identity.
    pub fn transformed(parent: &Unit, converter: Converter, symbol: Option<&str>) -> Unit {
        Unit::from_kind(UnitKind::Transformed {
            parent: parent.clone(),
            converter,
            symbol: symbol.map(str::to_string),
        })
    }

    pub fn kind(&self) -> &UnitKind {
        &self.0
    }

    /// Intrinsic symbol of base, alternate and symbolled transformed units
    pub fn symbol(&self) -> Option<&str> {
        match self.kind() {
            UnitKind::Base { symbol, .. } | UnitKind::Alternate { symbol, .. } => Some(symbol),
            UnitKind::Transformed { symbol, .. } => symbol.as_deref(),
            UnitKind::Product(_) | UnitKind::Annotated { .. } => None,
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self.kind(), UnitKind::Product(p) if p.is_empty())
    }

    /// Factors of this unit seen as a product
    pub fn elements(&self) -> Vec<Element> {
        match self.kind() {
            UnitKind::Product(product) => product.elements.clone(),
            _ => vec![Element {
                unit: self.clone(),
                pow: 1,
                root: 1,
            }],
        }
    }

    fn from_elements(mut elements: Vec<Element>) -> UnitResult<Unit> {
        if elements.len() == 1 && elements[0].pow == 1 && elements[0].root == 1 {
            if let Some(element) = elements.pop() {
                return Ok(element.unit);
            }
        }
        let mut dimension = Dimension::NONE;
        for e in &elements {
            dimension = e
                .unit
                .dimension()
                .pow(e.pow)
                .and_then(|d| d.root(e.root))
                .and_then(|d| dimension.multiply(&d))
                .ok_or_else(|| {
                    UnitError::Arithmetic("dimension exponent out of range".to_string())
                })?;
        }
        Ok(Unit::from_kind(UnitKind::Product(ProductUnit {
            elements,
            dimension,
        })))
    }

    fn product_of(mut elements: Vec<Element>, others: Vec<Element>) -> UnitResult<Unit> {
        for other in others {
            match elements.iter().position(|e| e.unit == other.unit) {
                Some(index) => {
                    let e = &elements[index];
                    let pow = (e.pow as i64 * other.root as i64)
                        .checked_add(other.pow as i64 * e.root as i64)
                        .ok_or_else(overflow)?;
                    let root = e.root as i64 * other.root as i64;
                    let (pow, root) = reduce(pow, root)?;
                    if pow == 0 {
                        elements.remove(index);
                    } else {
                        elements[index] = Element {
                            unit: other.unit,
                            pow,
                            root,
                        };
                    }
                }
                None => elements.push(other),
            }
        }
        Unit::from_elements(elements)
    }

    pub fn multiply(&self, other: &Unit) -> UnitResult<Unit> {
        if self.is_one() {
            return Ok(other.clone());
        }
        if other.is_one() {
            return Ok(self.clone());
        }
        Unit::product_of(self.elements(), other.elements())
    }

    pub fn divide(&self, other: &Unit) -> UnitResult<Unit> {
        if other.is_one() {
            return Ok(self.clone());
        }
        let inverse = other
            .elements()
            .into_iter()
            .map(|e| {
                Ok(Element {
                    pow: e.pow.checked_neg().ok_or_else(overflow)?,
                    ..e
                })
            })
            .collect::<UnitResult<Vec<_>>>()?;
        let own = if self.is_one() { Vec::new() } else { self.elements() };
        Unit::product_of(own, inverse)
    }

    pub fn inverse(&self) -> UnitResult<Unit> {
        Unit::one().divide(self)
    }

    pub fn pow(&self, n: i32) -> UnitResult<Unit> {
        match n {
            0 => Ok(Unit::one()),
            1 => Ok(self.clone()),
            _ => {
                let elements = self
                    .elements()
                    .into_iter()
                    .map(|e| {
                        let (pow, root) = reduce(e.pow as i64 * n as i64, e.root as i64)?;
                        Ok(Element { pow, root, ..e })
                    })
                    .collect::<UnitResult<Vec<_>>>()?;
                Unit::from_elements(elements)
            }
        }
    }

    /// `n`-th root; a negative order yields the inverse of the root
    pub fn root(&self, n: i32) -> UnitResult<Unit> {
        match n {
            0 => Err(UnitError::Arithmetic("root of order zero".to_string())),
            1 => Ok(self.clone()),
            _ if n < 0 => self.root(n.checked_neg().ok_or_else(overflow)?)?.inverse(),
            _ => {
                let elements = self
                    .elements()
                    .into_iter()
                    .map(|e| {
                        let (pow, root) = reduce(e.pow as i64, e.root as i64 * n as i64)?;
                        Ok(Element { pow, root, ..e })
                    })
                    .collect::<UnitResult<Vec<_>>>()?;
                Unit::from_elements(elements)
            }
        }
    }

    /// Derives a unit through `converter`. Successive scalings (or shifts) of
    /// an unnamed transformed unit fold into a single converter, and identity
    /// conversions return the parent itself.
    pub fn transform(&self, converter: Converter) -> Unit {
        if converter.is_identity() {
            return self.clone();
        }
        if let UnitKind::Transformed {
            parent,
            converter: inner,
            symbol: None,
        } = self.kind()
        {
            if let Some(combined) = inner.compose(&converter) {
                return parent.transform(combined);
            }
        }
        Unit::from_kind(UnitKind::Transformed {
            parent: self.clone(),
            converter,
            symbol: None,
        })
    }

    /// `self * factor`, e.g. `metre.scale(0.3048)` is the foot
    pub fn scale(&self, factor: Factor) -> Unit {
        self.transform(Converter::Multiply(factor))
    }

    pub fn divide_by(&self, factor: Factor) -> UnitResult<Unit> {
        let recip = factor
            .recip()
            .ok_or_else(|| UnitError::Arithmetic("division by zero".to_string()))?;
        Ok(self.scale(recip))
    }

    /// `self + offset`, e.g. `kelvin.shift(273.15)` is degree Celsius
    pub fn shift(&self, offset: Factor) -> Unit {
        self.transform(Converter::Add(offset))
    }

    pub fn prefix(&self, prefix: &Prefix) -> Unit {
        self.transform(prefix.converter())
    }

    pub fn annotate(&self, annotation: &str) -> Unit {
        Unit::from_kind(UnitKind::Annotated {
            actual: self.clone(),
            annotation: annotation.to_string(),
        })
    }

    pub fn dimension(&self) -> Dimension {
        match self.kind() {
            UnitKind::Base { dimension, .. } => *dimension,
            UnitKind::Alternate { parent, .. } | UnitKind::Transformed { parent, .. } => {
                parent.dimension()
            }
            UnitKind::Annotated { actual, .. } => actual.dimension(),
            UnitKind::Product(product) => product.dimension,
        }
    }

    /// The unscaled, coherent unit this unit converts to
    pub fn system_unit(&self) -> UnitResult<Unit> {
        match self.kind() {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => Ok(self.clone()),
            UnitKind::Transformed { parent, .. } => parent.system_unit(),
            UnitKind::Annotated { actual, .. } => actual.system_unit(),
            UnitKind::Product(product) => {
                product.elements.iter().try_fold(Unit::one(), |acc, e| {
                    let factor = e.unit.system_unit()?.pow(e.pow)?.root(e.root)?;
                    acc.multiply(&factor)
                })
            }
        }
    }

    /// Affine conversion to the system unit; `None` when non-linear
    pub fn conversion(&self) -> Option<Conversion> {
        match self.kind() {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => Some(Conversion::IDENTITY),
            UnitKind::Annotated { actual, .. } => actual.conversion(),
            UnitKind::Transformed {
                parent, converter, ..
            } => {
                let outer = parent.conversion()?;
                match converter {
                    Converter::Multiply(k) => Some(Conversion {
                        scale: outer.scale * *k,
                        offset: outer.offset,
                    }),
                    Converter::Add(o) => Some(Conversion {
                        scale: outer.scale,
                        offset: outer.scale * *o + outer.offset,
                    }),
                    Converter::Sexagesimal { .. } => None,
                }
            }
            UnitKind::Product(product) => {
                let mut scale = Factor::ONE;
                for e in &product.elements {
                    let c = e.unit.conversion()?;
                    if !c.offset.is_zero() {
                        return None;
                    }
                    scale = scale * c.scale.powi(e.pow)?.root(e.root.unsigned_abs())?;
                }
                Some(Conversion {
                    scale,
                    offset: Factor::ZERO,
                })
            }
        }
    }

    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension() == other.dimension()
    }

    /// Same dimension and same conversion to the system unit, regardless of
    /// how either unit is named or composed
    pub fn is_equivalent(&self, other: &Unit) -> bool {
        if self == other {
            return true;
        }
        if !self.is_compatible(other) {
            return false;
        }
        match (self.conversion(), other.conversion()) {
            (Some(a), Some(b)) => a.scale.approx_eq(&b.scale) && a.offset.approx_eq(&b.offset),
            _ => false,
        }
    }

    fn to_system(&self, value: f64) -> Option<f64> {
        match self.kind() {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => Some(value),
            UnitKind::Annotated { actual, .. } => actual.to_system(value),
            UnitKind::Transformed {
                parent, converter, ..
            } => parent.to_system(converter.convert(value)),
            UnitKind::Product(_) => self
                .conversion()
                .map(|c| value * c.scale.to_f64() + c.offset.to_f64()),
        }
    }

    fn from_system(&self, value: f64) -> Option<f64> {
        match self.kind() {
            UnitKind::Base { .. } | UnitKind::Alternate { .. } => Some(value),
            UnitKind::Annotated { actual, .. } => actual.from_system(value),
            UnitKind::Transformed {
                parent, converter, ..
            } => {
                let inverse = converter.inverse()?;
                Some(inverse.convert(parent.from_system(value)?))
            }
            UnitKind::Product(_) => {
                let c = self.conversion()?;
                Some((value - c.offset.to_f64()) / c.scale.to_f64())
            }
        }
    }

    /// Converts `value` from this unit into `target`; `None` for
    /// incompatible units
    pub fn convert_to(&self, value: f64, target: &Unit) -> Option<f64> {
        if !self.is_compatible(target) {
            return None;
        }
        target.from_system(self.to_system(value)?)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = crate::format::UnitFormat::shared(crate::catalog::Dialect::Default);
        format.format_to(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prefix::{KILO, MILLI};

    fn metre() -> Unit {
        Unit::base("m", Dimension::LENGTH)
    }

    fn second() -> Unit {
        Unit::base("s", Dimension::TIME)
    }

    #[test]
    fn test_product_merges_and_collapses() {
        let m = metre();
        let area = m.multiply(&m).unwrap();
        assert_eq!(area, m.pow(2).unwrap());
        assert_eq!(area.divide(&m).unwrap(), m);
        assert!(m.divide(&m).unwrap().is_one());
    }

    #[test]
    fn test_product_equality_ignores_order() {
        let (m, s) = (metre(), second());
        let a = m.multiply(&s).unwrap();
        let b = s.multiply(&m).unwrap();
        assert_eq!(a, b);
        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_root_reduces_exponents() {
        let m = metre();
        let sqrt = m.root(2).unwrap();
        assert_eq!(sqrt.elements()[0].root, 2);
        assert_eq!(sqrt.pow(2).unwrap(), m);
        assert_eq!(m.pow(2).unwrap().root(3).unwrap().elements()[0].pow, 2);
        assert!(m.root(0).is_err());
        assert_eq!(m.root(-1).unwrap(), m.inverse().unwrap());
    }

    #[test]
    fn test_transform_folds_scalings() {
        let m = metre();
        let km = m.prefix(KILO);
        let mm = m.prefix(MILLI);
        assert_eq!(km.prefix(MILLI), m);
        assert_eq!(mm.scale(Factor::integer(1_000_000)), km);
        assert_eq!(m.scale(Factor::ONE), m);
        assert!(m.divide_by(Factor::ZERO).is_err());
    }

    #[test]
    fn test_symbolled_transform_keeps_identity() {
        let kelvin = Unit::base("K", Dimension::TEMPERATURE);
        let celsius = Unit::transformed(
            &kelvin,
            Converter::Add(Factor::ratio(27315, 100)),
            Some("\u{2103}"),
        );
        let shifted = kelvin.shift(Factor::ratio(27315, 100));
        assert_ne!(celsius, shifted);
        assert!(celsius.is_equivalent(&shifted));
        assert_eq!(celsius.symbol(), Some("\u{2103}"));
    }

    #[test]
    fn test_conversion_and_convert_to() {
        let m = metre();
        let km = m.prefix(KILO);
        let h = second().scale(Factor::integer(3600));
        let kmh = km.divide(&h).unwrap();
        let ms = m.divide(&second()).unwrap();
        let c = kmh.conversion().unwrap();
        assert_eq!(c.scale, Factor::ratio(1000, 3600));
        let v = kmh.convert_to(36.0, &ms).unwrap();
        assert!((v - 10.0).abs() < 1e-12);
        assert_eq!(km.convert_to(1.0, &second()), None);
    }

    #[test]
    fn test_dimension_of_products() {
        let ms2 = metre().divide(&second().pow(2).unwrap()).unwrap();
        assert_eq!(
            ms2.dimension(),
            Dimension::LENGTH.divide(&Dimension::TIME.pow(2).unwrap()).unwrap()
        );
        assert_eq!(ms2.system_unit().unwrap(), ms2);
    }

    #[test]
    fn test_annotation_is_transparent_for_algebra() {
        let m = metre();
        let annotated = m.annotate("height");
        assert_ne!(annotated, m);
        assert!(annotated.is_equivalent(&m));
        assert_eq!(annotated.dimension(), Dimension::LENGTH);
    }

    #[test]
    fn test_power_of_minimum_exponent_is_refused() {
        let m = metre();
        let inverse_half = m.pow(-1_073_741_824).unwrap();
        assert!(matches!(inverse_half.pow(2), Err(UnitError::Arithmetic(_))));
        assert!(matches!(m.pow(i32::MIN), Err(UnitError::Arithmetic(_))));
        assert!(m.pow(i32::MAX).unwrap().inverse().is_ok());
    }

    #[test]
    fn test_dimension_overflow_is_refused() {
        let acceleration = metre().divide(&second().pow(2).unwrap()).unwrap();
        let newton = Unit::alternate("N", &acceleration);
        assert!(matches!(
            newton.pow(1_073_741_825),
            Err(UnitError::Arithmetic(_))
        ));
        let huge = newton.pow(1_000_000).unwrap();
        assert_eq!(
            huge.dimension(),
            acceleration.dimension().pow(1_000_000).unwrap()
        );
    }
}
