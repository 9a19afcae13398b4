//! Unit algebra types

mod converter;
mod dimension;
mod factor;
pub mod prefix;
mod unit;

pub use converter::{Converter, SexagesimalForm};
pub use dimension::Dimension;
pub use factor::{Factor, Rational};
pub use prefix::{Prefix, BINARY_PREFIXES, METRIC_PREFIXES};
pub use unit::{Conversion, Element, ProductUnit, Unit, UnitKind};
