//! Structure-preserving rewriting of LogicalExpr trees.
//!
//! A rewrite is driven by a single callback that acts as matcher and
//! transform at once: it receives every node (children first) and returns
//! `Ok(Some(new))` to splice `new` in place of the node, or `Ok(None)` to
//! leave it alone. Nodes whose subtree did not change come back as
//! [`Transformed::No`], which lets plan nodes keep sharing their `Arc`
//! children.
//!
//! Subqueries are descended into through
//! [`LogicalPlan::rewrite_expressions`], so a rule written against
//! expressions also reaches plans nested inside them.

use super::{LogicalExpr, OperatorApplication, ScalarFnCall, SetField, Subquery};
use crate::query_planner::{logical_plan::LogicalPlan, transformed::Transformed};

/// Rewrite `expr` bottom-up with `rewriter`.
///
/// The callback sees a node after its children have been rewritten, so for
/// a [`SetField`] both `target` and `value` already carry the results of the
/// same rule.
pub fn rewrite_expression<E, F>(expr: &LogicalExpr, rewriter: &mut F) -> Result<Transformed<LogicalExpr>, E>
where
    F: FnMut(&LogicalExpr) -> Result<Option<LogicalExpr>, E>,
{
    let children_tf = rewrite_children(expr, rewriter)?;
    let children_changed = children_tf.is_yes();
    let current = children_tf.get_plan();

    match rewriter(&current)? {
        Some(new_expr) => Ok(Transformed::Yes(new_expr)),
        None if children_changed => Ok(Transformed::Yes(current)),
        None => Ok(Transformed::No(current)),
    }
}

/// Rewrite every expression of a list, reporting `Yes` if any one changed.
pub fn rewrite_expressions<E, F>(
    exprs: &[LogicalExpr],
    rewriter: &mut F,
) -> Result<Transformed<Vec<LogicalExpr>>, E>
where
    F: FnMut(&LogicalExpr) -> Result<Option<LogicalExpr>, E>,
{
    let mut any_changed = false;
    let mut rewritten = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let tf = rewrite_expression(expr, rewriter)?;
        any_changed |= tf.is_yes();
        rewritten.push(tf.get_plan());
    }

    if any_changed {
        Ok(Transformed::Yes(rewritten))
    } else {
        Ok(Transformed::No(rewritten))
    }
}

fn rewrite_children<E, F>(expr: &LogicalExpr, rewriter: &mut F) -> Result<Transformed<LogicalExpr>, E>
where
    F: FnMut(&LogicalExpr) -> Result<Option<LogicalExpr>, E>,
{
    match expr {
        LogicalExpr::SetField(sf) => {
            let target_tf = rewrite_expression(&sf.target, rewriter)?;
            let value_tf = rewrite_expression(&sf.value, rewriter)?;
            if !target_tf.is_yes() && !value_tf.is_yes() {
                return Ok(Transformed::No(expr.clone()));
            }
            Ok(Transformed::Yes(LogicalExpr::SetField(SetField::new(
                target_tf.get_plan(),
                value_tf.get_plan(),
            ))))
        }
        LogicalExpr::ScalarFnCall(call) => {
            let args_tf = rewrite_expressions(&call.args, rewriter)?;
            Ok(args_tf.map(|args| {
                LogicalExpr::ScalarFnCall(ScalarFnCall {
                    name: call.name.clone(),
                    args,
                })
            }))
        }
        LogicalExpr::OperatorApplicationExp(op) => {
            let operands_tf = rewrite_expressions(&op.operands, rewriter)?;
            Ok(operands_tf.map(|operands| {
                LogicalExpr::OperatorApplicationExp(OperatorApplication {
                    operator: op.operator,
                    operands,
                })
            }))
        }
        LogicalExpr::Subquery(sq) => {
            let plan_tf = LogicalPlan::rewrite_expressions(&sq.plan, rewriter)?;
            Ok(plan_tf.map(|plan| LogicalExpr::Subquery(Subquery { plan })))
        }
        // Leaf nodes
        LogicalExpr::Literal(_)
        | LogicalExpr::UnresolvedVariable(_)
        | LogicalExpr::UnresolvedColumn(_)
        | LogicalExpr::SystemVar(_)
        | LogicalExpr::UserVar(_)
        | LogicalExpr::DefaultPlaceholder => Ok(Transformed::No(expr.clone())),
    }
}
