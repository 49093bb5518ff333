//! Variable Resolver Pass
//!
//! Rewrites every raw variable token in the plan into a bound variable:
//!
//! - `@@[session.|global.|local.]name` becomes a [`SystemVar`] carrying the
//!   catalog's declared type and the effective scope
//! - `@name` becomes a [`UserVar`]
//! - a bare identifier used as a `SET` target (`SET sql_mode = ...`) is bound
//!   as a system variable with no explicit scope
//!
//! Tokens are resolved wherever they appear: `SET` targets and values,
//! projections, filters and subqueries nested in any of them. Bare
//! identifiers outside `SET` targets are left for column resolution.
//!
//! This pass must run before default substitution, which needs the `SET`
//! targets bound to catalog entries.
//!
//! [`SystemVar`]: crate::query_planner::logical_expr::SystemVar
//! [`UserVar`]: crate::query_planner::logical_expr::UserVar

use std::sync::Arc;

use crate::query_planner::{
    analyzer::{
        analyzer_pass::{AnalyzerPass, AnalyzerResult},
        variable_reference::{resolve_system_variable, resolve_variable_token},
    },
    logical_expr::{LogicalExpr, SetField},
    logical_plan::LogicalPlan,
    plan_ctx::PlanCtx,
    transformed::Transformed,
};

pub struct VariableResolver;

impl AnalyzerPass for VariableResolver {
    fn analyze(
        &self,
        logical_plan: Arc<LogicalPlan>,
        plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Transformed<Arc<LogicalPlan>>> {
        let catalog = plan_ctx.catalog();
        let mut resolve = |expr: &LogicalExpr| -> AnalyzerResult<Option<LogicalExpr>> {
            match expr {
                LogicalExpr::UnresolvedVariable(raw) => {
                    resolve_variable_token(raw, catalog).map(Some)
                }
                LogicalExpr::SetField(sf) => match sf.target.as_ref() {
                    LogicalExpr::UnresolvedColumn(name) => {
                        let var = resolve_system_variable(name, None, catalog)?;
                        log::trace!(
                            "VariableResolver: bare SET target `{}` bound to @@{}",
                            name,
                            var.name
                        );
                        Ok(Some(LogicalExpr::SetField(SetField {
                            target: Box::new(LogicalExpr::SystemVar(var)),
                            value: sf.value.clone(),
                        })))
                    }
                    _ => Ok(None),
                },
                _ => Ok(None),
            }
        };
        LogicalPlan::rewrite_expressions(&logical_plan, &mut resolve)
    }
}
