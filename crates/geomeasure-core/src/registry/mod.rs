//! Bidirectional label and alias tables
//!
//! A registry maps each unit to the one label used when formatting it, and
//! maps every known name (labels and aliases) back to a unit for parsing.
//! Mutations take the write lock for their whole duration, lookups take the
//! read lock, so a registry can be shared across threads.

use crate::catalog::Dialect;
use crate::error::{UnitError, UnitResult};
use crate::parser::is_unit_identifier_part;
use crate::types::Unit;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Tables {
    name_to_unit: HashMap<String, Unit>,
    unit_to_name: HashMap<Unit, String>,
}

/// Label and alias tables for one dialect
#[derive(Debug)]
pub struct Registry {
    dialect: Dialect,
    inner: RwLock<Tables>,
}

impl Registry {
    /// An empty registry. See [`crate::catalog::registry`] for one populated
    /// with the dialect's definitions.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            inner: RwLock::new(Tables::default()),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// A name is usable when it is non-empty and starts with a character
    /// that can begin an identifier. ASCII-only dialects reject any
    /// non-ASCII character.
    pub fn is_valid_identifier(&self, name: &str) -> bool {
        let Some(first) = name.chars().next() else {
            return false;
        };
        if self.dialect.is_ascii_only() && !name.is_ascii() {
            return false;
        }
        is_unit_identifier_part(first)
    }

    fn check(&self, name: &str) -> UnitResult<()> {
        if self.is_valid_identifier(name) {
            Ok(())
        } else {
            Err(UnitError::InvalidIdentifier {
                name: name.to_string(),
                dialect: self.dialect.to_string(),
            })
        }
    }

    /// Makes `name` the label of `unit`. A previous label of `unit` keeps
    /// resolving to it when parsing; use [`Registry::remove_label`] or
    /// [`Registry::remove_alias`] first for a clean replacement.
    pub fn label(&self, unit: &Unit, name: &str) -> UnitResult<()> {
        self.check(name)?;
        let mut tables = self.inner.write();
        if let Some(previous) = tables.name_to_unit.insert(name.to_string(), unit.clone()) {
            // The name now belongs to `unit`; a unit it used to label loses it
            let labelled = tables.unit_to_name.get(&previous).map(String::as_str) == Some(name);
            if previous != *unit && labelled {
                tracing::trace!(name, "label moved to another unit");
                tables.unit_to_name.remove(&previous);
            }
        }
        tables.unit_to_name.insert(unit.clone(), name.to_string());
        Ok(())
    }

    /// Makes `name` resolve to `unit` without changing how `unit` is
    /// formatted. A name already bound to another unit keeps that binding.
    pub fn alias(&self, unit: &Unit, name: &str) -> UnitResult<()> {
        self.check(name)?;
        let mut tables = self.inner.write();
        match tables.name_to_unit.get(name) {
            Some(existing) if existing != unit => {
                tracing::trace!(name, "alias already bound to another unit");
            }
            Some(_) => {}
            None => {
                tables.name_to_unit.insert(name.to_string(), unit.clone());
            }
        }
        Ok(())
    }

    /// Removes the label of `unit` and every name resolving to it
    pub fn remove_label(&self, unit: &Unit) {
        let mut tables = self.inner.write();
        tables.unit_to_name.remove(unit);
        tables.name_to_unit.retain(|_, u| *u != *unit);
    }

    /// Removes the alias `name` of `unit`. The label itself is never removed
    /// here. Returns whether a mapping was removed.
    pub fn remove_alias(&self, unit: &Unit, name: &str) -> bool {
        let mut tables = self.inner.write();
        let is_label = tables.unit_to_name.get(unit).map(String::as_str) == Some(name);
        if is_label || tables.name_to_unit.get(name) != Some(unit) {
            return false;
        }
        tables.name_to_unit.remove(name).is_some()
    }

    /// Removes every name resolving to `unit` except its current label
    pub fn remove_aliases(&self, unit: &Unit) {
        let mut tables = self.inner.write();
        let label = tables.unit_to_name.get(unit).cloned();
        tables
            .name_to_unit
            .retain(|name, u| *u != *unit || Some(name) == label.as_ref());
    }

    pub fn label_for(&self, unit: &Unit) -> Option<String> {
        self.inner.read().unit_to_name.get(unit).cloned()
    }

    pub fn unit_for(&self, name: &str) -> Option<Unit> {
        self.inner.read().name_to_unit.get(name).cloned()
    }

    /// Every name resolving to `unit`, sorted
    pub fn names_for(&self, unit: &Unit) -> Vec<String> {
        let tables = self.inner.read();
        let mut names: Vec<String> = tables
            .name_to_unit
            .iter()
            .filter(|(_, u)| *u == unit)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Snapshot of all labels with their units, sorted by label
    pub fn labels(&self) -> Vec<(String, Unit)> {
        let tables = self.inner.read();
        let mut labels: Vec<(String, Unit)> = tables
            .unit_to_name
            .iter()
            .map(|(unit, name)| (name.clone(), unit.clone()))
            .collect();
        labels.sort_by(|a, b| a.0.cmp(&b.0));
        labels
    }

    /// Number of names that resolve to a unit
    pub fn len(&self) -> usize {
        self.inner.read().name_to_unit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
