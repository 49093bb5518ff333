/// Seed data for the variable catalog.
///
/// The catalog is described in YAML with the following structure:
///
/// ```yaml
/// version: 3                    # bumped on every behavior-visible change
/// variables:
///   - name: sql_select_limit
///     type: int32
///     default: 2147483647       # stored in its natural YAML form
///     scopes: [session, global]
///     dynamic: true             # false marks the variable read-only
/// ```
///
/// Defaults are kept in their natural representation here; they are checked
/// against the declared type when the catalog is built and converted to it
/// when a `DEFAULT` is substituted.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::errors::CatalogError;
use crate::query_planner::{
    logical_expr::VariableScope,
    types::{ScalarType, Value},
};

/// The seed shipped with the crate.
pub const BUILTIN_SEED: &str = include_str!("system_variables.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSeed {
    pub version: u32,
    pub variables: Vec<VariableDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: ScalarType,
    pub default: SeedValue,
    pub scopes: Vec<VariableScope>,
    #[serde(default = "default_dynamic")]
    pub dynamic: bool,
}

fn default_dynamic() -> bool {
    true
}

/// A default value as written in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedValue {
    Null(()),
    Boolean(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl From<SeedValue> for Value {
    fn from(seed: SeedValue) -> Self {
        match seed {
            SeedValue::Null(()) => Value::Null,
            SeedValue::Boolean(b) => Value::Boolean(b),
            SeedValue::Integer(i) => Value::Int64(i),
            SeedValue::Unsigned(u) => Value::UInt64(u),
            SeedValue::Float(f) => Value::Float64(f),
            SeedValue::Text(s) => Value::Text(s),
        }
    }
}

impl CatalogSeed {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| CatalogError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_SEED)
    }
}
