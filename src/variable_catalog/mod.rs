//! # Variable Catalog
//!
//! Read-only registry of the system variables the analyzer knows about:
//! canonical name, declared type, default value, permitted scopes and
//! whether the variable may be changed with `SET`.
//!
//! The catalog is built once from a [`CatalogSeed`] and never mutated
//! afterwards. Share it between concurrent analyses through an `Arc`.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::query_planner::{
    logical_expr::VariableScope,
    types::{ScalarType, Value},
};

pub mod config;
pub mod errors;

pub use config::{CatalogSeed, SeedValue, VariableDefinition};
pub use errors::CatalogError;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Canonical lowercase name.
    pub name: String,
    pub data_type: ScalarType,
    /// Stored in its natural representation, which may be wider than
    /// `data_type`.
    pub default: Value,
    pub scopes: HashSet<VariableScope>,
    /// `false` for read-only variables.
    pub dynamic: bool,
}

impl CatalogEntry {
    pub fn permits(&self, scope: VariableScope) -> bool {
        self.scopes.contains(&scope)
    }

    /// Scope used when a reference names none: session when allowed,
    /// global otherwise.
    pub fn default_scope(&self) -> VariableScope {
        if self.permits(VariableScope::Session) {
            VariableScope::Session
        } else {
            VariableScope::Global
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariableCatalog {
    seed_version: u32,
    entries: BTreeMap<String, CatalogEntry>,
}

impl VariableCatalog {
    pub fn from_seed(seed: CatalogSeed) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();

        for definition in seed.variables {
            let name = definition.name.to_lowercase();

            if definition.scopes.is_empty() {
                return Err(CatalogError::EmptyScopes { name });
            }

            let default = Value::from(definition.default);
            definition
                .data_type
                .coerce(&default)
                .map_err(|source| CatalogError::InvalidDefault {
                    name: name.clone(),
                    source,
                })?;

            let entry = CatalogEntry {
                name: name.clone(),
                data_type: definition.data_type,
                default,
                scopes: definition.scopes.into_iter().collect(),
                dynamic: definition.dynamic,
            };

            if entries.insert(name.clone(), entry).is_some() {
                return Err(CatalogError::DuplicateVariable { name });
            }
        }

        log::debug!(
            "Variable catalog v{} loaded with {} entries",
            seed.version,
            entries.len()
        );

        Ok(VariableCatalog {
            seed_version: seed.version,
            entries,
        })
    }

    /// Catalog built from the seed embedded in the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_seed(CatalogSeed::builtin()?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::from_seed(CatalogSeed::from_yaml_str(yaml)?)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Self::from_seed(CatalogSeed::from_yaml_file(path)?)
    }

    /// Look a variable up by name.
    ///
    /// Callers are expected to pass the canonical lowercase name; other
    /// spellings are folded here as well so the lookup never depends on it.
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        match self.entries.get(name) {
            Some(entry) => Some(entry),
            None => self.entries.get(&name.to_lowercase()),
        }
    }

    pub fn seed_version(&self) -> u32 {
        self.seed_version
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
