use std::sync::Arc;

use crate::{
    config::AnalyzerConfig,
    query_planner::{
        analyzer::{Analyzer, AnalyzerResult},
        logical_plan::LogicalPlan,
        plan_ctx::PlanCtx,
    },
    variable_catalog::VariableCatalog,
};

pub mod analyzer;
pub mod logical_expr;
pub mod logical_plan;
pub mod plan_ctx;
pub mod transformed;
pub mod types;

/// Resolve every variable reference and `DEFAULT` placeholder in `plan`
/// with the default rule set.
///
/// Builds a fresh [`Analyzer`] per call; callers analyzing many plans should
/// build one analyzer and reuse it.
pub fn analyze_plan(
    plan: Arc<LogicalPlan>,
    catalog: Arc<VariableCatalog>,
    config: &AnalyzerConfig,
) -> AnalyzerResult<Arc<LogicalPlan>> {
    let plan_ctx = PlanCtx::new(catalog);
    Analyzer::new(config).analyze(plan, &plan_ctx)
}
