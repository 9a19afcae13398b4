//! geomeasure-core: Unit symbol parsing and formatting
//!
//! This crate provides unit algebra (base, derived, scaled and offset
//! units), SI and binary prefix tables, per-dialect label registries and
//! the formatter/parser that turns units into text and back. It has no UI
//! dependencies.
//!
//! # Example
//!
//! ```
//! use geomeasure_core::units::{KILOMETRE_PER_HOUR, METRE, SECOND};
//! use geomeasure_core::{Dialect, UnitFormat};
//!
//! let format = UnitFormat::shared(Dialect::Default);
//!
//! // Formatting
//! let velocity = METRE.divide(&SECOND).unwrap();
//! assert_eq!(format.format(&velocity), "m/s");
//!
//! // Parsing
//! assert_eq!(format.parse("km/h").unwrap(), *KILOMETRE_PER_HOUR);
//! assert_eq!(format.parse("m·s⁻¹").unwrap(), velocity);
//!
//! // Other dialects name the same units differently
//! let wkt = UnitFormat::shared(Dialect::Wkt);
//! assert_eq!(wkt.format(&METRE), "metre");
//! ```

pub mod catalog;
pub mod defs;
pub mod error;
pub mod format;
pub mod parser;
pub mod registry;
pub mod types;
pub mod units;

pub use catalog::Dialect;
pub use defs::{CustomUnit, DefinitionsError, UnitDefinitions};
pub use error::{UnitError, UnitResult};
pub use format::{FormatConfig, UnitFormat};
pub use parser::Cursor;
pub use registry::Registry;
pub use types::{Converter, Dimension, Factor, Prefix, Unit, UnitKind};
