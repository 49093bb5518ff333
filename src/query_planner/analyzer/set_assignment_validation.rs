//! Set Assignment Validation Pass
//!
//! Checks every `SET` assignment once defaults have been substituted:
//!
//! - the target must be dynamic (`SET @@version = ...` is rejected with
//!   `ReadOnlyVariable`)
//! - when literal checks are enabled, a literal value must convert to the
//!   target's declared type (`SET @@autocommit = 'maybe'` is rejected with
//!   `TypeCoercion`)
//!
//! Non-literal values (function calls, arithmetic, other variables) are not
//! evaluated here. The pass never rewrites the plan.

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
use crate::variable_catalog::VariableCatalog;

pub struct SetAssignmentValidation {
    check_literals: bool,
}

impl SetAssignmentValidation {
    pub fn new(check_literals: bool) -> Self {
        SetAssignmentValidation { check_literals }
    }
}

impl AnalyzerPass for SetAssignmentValidation {
    fn analyze(
        &self,
        logical_plan: Arc<LogicalPlan>,
        plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Transformed<Arc<LogicalPlan>>> {
        let mut checker = AssignmentChecker {
            catalog: plan_ctx.catalog(),
            check_literals: self.check_literals,
            error: None,
        };
        walk_plan(&logical_plan, &mut checker);

        match checker.error {
            Some(err) => Err(err),
            None => Ok(Transformed::No(logical_plan)),
        }
    }
}

/// Records the first failing assignment in traversal order.
struct AssignmentChecker<'a> {
    catalog: &'a VariableCatalog,
    check_literals: bool,
    error: Option<AnalyzerError>,
}

impl AssignmentChecker<'_> {
    fn check(&self, set_field: &SetField) -> AnalyzerResult<()> {
        let LogicalExpr::SystemVar(var) = set_field.target.as_ref() else {
            return Ok(());
        };
        let entry = self
            .catalog
            .lookup(&var.name)
            .ok_or_else(|| AnalyzerError::UnknownVariable(var.name.clone()))?;

        if !entry.dynamic {
            return Err(AnalyzerError::ReadOnlyVariable(entry.name.clone()));
        }

        if self.check_literals {
            if let LogicalExpr::Literal(literal) = set_field.value.as_ref() {
                entry
                    .data_type
                    .coerce(&literal.value)
                    .map_err(|source| AnalyzerError::TypeCoercion {
                        pass: Pass::ValidateSetAssignments,
                        name: entry.name.clone(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

impl ExpressionVisitor for AssignmentChecker<'_> {
    fn visit_set_field(&mut self, set_field: &SetField) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.check(set_field) {
            log::debug!(
                "SetAssignmentValidation: rejected `{} = {}`: {}",
                set_field.target,
                set_field.value,
                err
            );
            self.error = Some(err);
        }
    }
}
