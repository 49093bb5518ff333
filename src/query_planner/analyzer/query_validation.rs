//! Resolved Plan Validation Pass
//!
//! Runs last and checks that resolution finished:
//!
//! - no `DEFAULT` placeholder is left. Placeholders survive only where no
//!   catalog default applies, e.g. `SET @x = DEFAULT`, which is reported as
//!   `DefaultNotAllowed`.
//! - no raw `@@...` / `@...` token is left
//! - every `SET` target is a system or user variable
//!
//! The last two indicate an analyzer defect and surface as `InvalidPlan`.

use std::sync::Arc;

use crate::query_planner::{
    analyzer::{
        analyzer_pass::{AnalyzerPass, AnalyzerResult},
        errors::{AnalyzerError, Pass},
    },
    logical_expr::{
        visitors::{walk_plan, ExpressionVisitor},
        LogicalExpr, SetField,
    },
    logical_plan::LogicalPlan,
    plan_ctx::PlanCtx,
    transformed::Transformed,
};

pub struct QueryValidation;

impl AnalyzerPass for QueryValidation {
    fn analyze(
        &self,
        logical_plan: Arc<LogicalPlan>,
        _plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Transformed<Arc<LogicalPlan>>> {
        let mut validator = ResolvedPlanValidator::default();
        walk_plan(&logical_plan, &mut validator);

        match validator.error {
            Some(err) => {
                log::warn!("QueryValidation: {}", err);
                Err(err)
            }
            None => Ok(Transformed::No(logical_plan)),
        }
    }
}

#[derive(Default)]
struct ResolvedPlanValidator {
    error: Option<AnalyzerError>,
}

impl ResolvedPlanValidator {
    fn record(&mut self, err: AnalyzerError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl ExpressionVisitor for ResolvedPlanValidator {
    fn visit_set_field(&mut self, set_field: &SetField) {
        match set_field.target.as_ref() {
            LogicalExpr::SystemVar(_) | LogicalExpr::UserVar(_) => {}
            other => self.record(AnalyzerError::InvalidPlan {
                pass: Pass::ValidateResolvedPlan,
                message: format!("SET target `{}` is a {}", other, other.variant_name()),
            }),
        }

        if matches!(set_field.value.as_ref(), LogicalExpr::DefaultPlaceholder) {
            self.record(AnalyzerError::DefaultNotAllowed {
                target: set_field.target.to_string(),
            });
        }
    }

    fn visit_unresolved_variable(&mut self, raw: &str) {
        self.record(AnalyzerError::InvalidPlan {
            pass: Pass::ValidateResolvedPlan,
            message: format!("unresolved variable reference `{}`", raw),
        });
    }

    fn visit_default_placeholder(&mut self) {
        // Placeholders directly under a SET pair were reported with their
        // target in visit_set_field.
        self.record(AnalyzerError::DefaultNotAllowed {
            target: "expression".to_string(),
        });
    }
}
