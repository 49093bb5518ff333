use std::fmt::Display;

use thiserror::Error;

use crate::query_planner::{logical_expr::VariableScope, types::TypeError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Pass {
    ResolveSetDefaults,
    ValidateSetAssignments,
    ValidateResolvedPlan,
}

impl Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pass::ResolveSetDefaults => write!(f, "ResolveSetDefaults"),
            Pass::ValidateSetAssignments => write!(f, "ValidateSetAssignments"),
            Pass::ValidateResolvedPlan => write!(f, "ValidateResolvedPlan"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyzerError {
    /// Carries the name as the user typed it, without sigil or scope.
    #[error("Unknown system variable '{0}'")]
    UnknownVariable(String),

    #[error("Variable '{name}' can't be used with {requested} scope")]
    InvalidScope {
        name: String,
        requested: VariableScope,
    },

    #[error("Invalid variable reference `{0}`")]
    InvalidVariableReference(String),

    #[error("Variable '{0}' is a read only variable")]
    ReadOnlyVariable(String),

    #[error("DEFAULT is not allowed as a value for `{target}`")]
    DefaultNotAllowed { target: String },

    #[error(" {pass}: Incorrect value for variable '{name}': {source}")]
    TypeCoercion {
        pass: Pass,
        name: String,
        #[source]
        source: TypeError,
    },

    #[error("Rule `{rule}` did not reach a fixpoint after {iterations} iterations")]
    RuleFixpointExceeded { rule: String, iterations: usize },

    #[error(" {pass}: Invalid query plan: {message}")]
    InvalidPlan { pass: Pass, message: String },
}

impl AnalyzerError {
    /// Internal errors point at an analyzer defect rather than at the
    /// user's query.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AnalyzerError::RuleFixpointExceeded { .. } | AnalyzerError::InvalidPlan { .. }
        )
    }
}
