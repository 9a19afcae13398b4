//! Custom unit definitions
//!
//! Definitions are read from `~/.config/geomeasure/units.json` (or platform
//! equivalent) and applied on top of a dialect's catalog:
//!
//! ```json
//! { "units": [ { "expr": "t*1000000", "label": "Mt", "aliases": ["megatonnes"] } ] }
//! ```

use crate::format::UnitFormat;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for loading definition files
#[derive(Error, Debug)]
pub enum DefinitionsError {
    #[error("Failed to read unit definitions: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid unit definitions: {0}")]
    Json(#[from] serde_json::Error),
}

/// One user-defined unit: an expression naming it structurally, plus the
/// names to register for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomUnit {
    pub expr: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Definitions file format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinitions {
    #[serde(default)]
    pub units: Vec<CustomUnit>,
}

impl UnitDefinitions {
    /// Default definitions file location
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "geomeasure").map(|dirs| dirs.config_dir().join("units.json"))
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, DefinitionsError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Registers every definition with `format`. Entries whose expression
    /// does not parse or whose names are rejected are skipped with a
    /// warning. Returns the number of units registered.
    pub fn apply(&self, format: &UnitFormat) -> usize {
        let mut applied = 0;
        for custom in &self.units {
            let unit = match format.parse(&custom.expr) {
                Ok(unit) => unit,
                Err(e) => {
                    tracing::warn!(expr = %custom.expr, error = %e, "skipping custom unit");
                    continue;
                }
            };
            if let Some(label) = &custom.label {
                if let Err(e) = format.label(&unit, label) {
                    tracing::warn!(expr = %custom.expr, error = %e, "skipping custom unit");
                    continue;
                }
            }
            for alias in &custom.aliases {
                if let Err(e) = format.alias(&unit, alias) {
                    tracing::warn!(expr = %custom.expr, error = %e, "ignoring alias");
                }
            }
            applied += 1;
        }
        tracing::debug!(applied, total = self.units.len(), "applied custom units");
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Dialect;
    use crate::types::prefix::MEGA;
    use crate::units::TONNE;

    #[test]
    fn test_parse_definitions() {
        let defs = UnitDefinitions::from_json(
            r#"{ "units": [ { "expr": "t*1000000", "label": "Mt", "aliases": ["megatonnes"] },
                            { "expr": "m*2" } ] }"#,
        )
        .unwrap();
        assert_eq!(defs.units.len(), 2);
        assert_eq!(defs.units[1].label, None);
        assert!(defs.units[1].aliases.is_empty());
    }

    #[test]
    fn test_apply_registers_names() {
        let format = UnitFormat::new(Dialect::Default);
        let defs = UnitDefinitions {
            units: vec![CustomUnit {
                expr: "t*1000000".to_string(),
                label: Some("megaton".to_string()),
                aliases: vec!["megatonnes".to_string()],
            }],
        };
        assert_eq!(defs.apply(&format), 1);
        let megatonne = TONNE.prefix(MEGA);
        assert_eq!(format.format(&megatonne), "megaton");
        assert_eq!(format.parse("megatonnes").unwrap(), megatonne);
        assert_eq!(format.parse("Mt").unwrap(), megatonne);
    }

    #[test]
    fn test_apply_skips_bad_entries() {
        let format = UnitFormat::new(Dialect::Default);
        let defs = UnitDefinitions {
            units: vec![
                CustomUnit {
                    expr: "furlong".to_string(),
                    label: None,
                    aliases: vec![],
                },
                CustomUnit {
                    expr: "m*201.168".to_string(),
                    label: Some("2furlong".to_string()),
                    aliases: vec![],
                },
            ],
        };
        assert_eq!(defs.apply(&format), 0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            UnitDefinitions::from_json("{ units: }"),
            Err(DefinitionsError::Json(_))
        ));
    }
}
