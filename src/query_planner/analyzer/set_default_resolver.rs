//! Set Default Resolver Pass
//!
//! Replaces `SET @@var = DEFAULT` placeholders with the catalog default of
//! `var`, encoded with the variable's declared type:
//!
//! ```text
//! SET @@session.sql_select_limit = DEFAULT
//!   => SET @@session.sql_select_limit = 2147483647::INT
//! ```
//!
//! The default is converted to the declared type even when the catalog
//! stores it wider, so later type checks see a self-consistent literal.
//!
//! Only pairs whose target is already a bound system variable and whose
//! value is exactly a placeholder are touched. Everything else, including a
//! placeholder next to an unresolved target or a user variable, is left as
//! is for the final validation pass to report.

use std::sync::Arc;

use crate::query_planner::{
    analyzer::{
        analyzer_pass::{AnalyzerPass, AnalyzerResult},
        errors::{AnalyzerError, Pass},
    },
    logical_expr::{Literal, LogicalExpr, SetField, SystemVar},
    logical_plan::LogicalPlan,
    plan_ctx::PlanCtx,
    transformed::Transformed,
};
use crate::variable_catalog::VariableCatalog;

pub struct SetDefaultResolver;

impl AnalyzerPass for SetDefaultResolver {
    fn analyze(
        &self,
        logical_plan: Arc<LogicalPlan>,
        plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Transformed<Arc<LogicalPlan>>> {
        let catalog = plan_ctx.catalog();
        let mut substitute = |expr: &LogicalExpr| -> AnalyzerResult<Option<LogicalExpr>> {
            let LogicalExpr::SetField(sf) = expr else {
                return Ok(None);
            };
            match (sf.target.as_ref(), sf.value.as_ref()) {
                (LogicalExpr::SystemVar(var), LogicalExpr::DefaultPlaceholder) => {
                    let literal = default_literal(var, catalog)?;
                    Ok(Some(LogicalExpr::SetField(SetField {
                        target: sf.target.clone(),
                        value: Box::new(LogicalExpr::Literal(literal)),
                    })))
                }
                _ => Ok(None),
            }
        };
        LogicalPlan::rewrite_expressions(&logical_plan, &mut substitute)
    }
}

/// Catalog default of `var` as a literal of the variable's declared type.
pub fn default_literal(var: &SystemVar, catalog: &VariableCatalog) -> AnalyzerResult<Literal> {
    let entry = catalog
        .lookup(&var.name)
        .ok_or_else(|| AnalyzerError::UnknownVariable(var.name.clone()))?;

    let value = entry
        .data_type
        .coerce(&entry.default)
        .map_err(|source| AnalyzerError::TypeCoercion {
            pass: Pass::ResolveSetDefaults,
            name: entry.name.clone(),
            source,
        })?;

    log::debug!(
        "SetDefaultResolver: DEFAULT for @@{} -> {} ({})",
        entry.name,
        value,
        entry.data_type
    );
    Ok(Literal::new(value, entry.data_type))
}
