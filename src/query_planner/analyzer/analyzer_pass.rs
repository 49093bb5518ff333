use std::sync::Arc;

use crate::query_planner::{logical_plan::LogicalPlan, plan_ctx::PlanCtx, transformed::Transformed};

use super::errors::AnalyzerError;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// A rewrite rule over the whole plan tree.
///
/// Passes are pure: everything they read comes from the plan and the
/// read-only [`PlanCtx`], and they return a new tree rather than mutating
/// the one they were given. Returning [`Transformed::No`] with the input
/// `Arc` signals that nothing changed.
pub trait AnalyzerPass: Send + Sync {
    fn analyze(
        &self,
        logical_plan: Arc<LogicalPlan>,
        plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Transformed<Arc<LogicalPlan>>>;
}
