use thiserror::Error;

use crate::query_planner::types::TypeError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("System variable `{name}` is defined more than once")]
    DuplicateVariable { name: String },

    #[error("System variable `{name}` must permit at least one scope")]
    EmptyScopes { name: String },

    #[error("Default of system variable `{name}` does not fit its declared type: {source}")]
    InvalidDefault {
        name: String,
        #[source]
        source: TypeError,
    },

    #[error("Failed to read variable catalog: {error}")]
    ConfigReadError { error: String },

    #[error("Failed to parse variable catalog: {error}")]
    ConfigParseError { error: String },
}
