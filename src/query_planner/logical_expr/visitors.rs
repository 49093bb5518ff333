//! Expression Visitor Pattern
//!
//! Read-only traversal over LogicalExpr trees, shared by the validation
//! passes. Visitors override the `visit_*` methods they care about; the
//! default implementations do nothing. Nested subquery plans are walked too.
//!
//! # Example
//!
//! ```ignore
//! let mut collector = SystemVarCollector::default();
//! walk_expression(&expr, &mut collector);
//! // collector.names now lists every resolved system variable
//! ```

use super::{LogicalExpr, SetField, SystemVar};
use crate::query_planner::logical_plan::LogicalPlan;

/// Trait for visiting LogicalExpr nodes.
pub trait ExpressionVisitor {
    /// Called for each `SET` assignment, before its children are walked
    fn visit_set_field(&mut self, _set_field: &SetField) {}

    /// Called for each resolved system variable
    fn visit_system_var(&mut self, _var: &SystemVar) {}

    /// Called for each raw `@@...`/`@...` token that is still unresolved
    fn visit_unresolved_variable(&mut self, _raw: &str) {}

    /// Called for each `DEFAULT` placeholder
    fn visit_default_placeholder(&mut self) {}

    /// Called for leaf expressions not handled by specific methods
    fn visit_leaf(&mut self, _expr: &LogicalExpr) {}
}

/// Walk an expression tree, calling visitor methods for each node.
pub fn walk_expression<V: ExpressionVisitor>(expr: &LogicalExpr, visitor: &mut V) {
    match expr {
        LogicalExpr::SetField(sf) => {
            visitor.visit_set_field(sf);
            walk_expression(&sf.target, visitor);
            walk_expression(&sf.value, visitor);
        }
        LogicalExpr::ScalarFnCall(call) => {
            for arg in &call.args {
                walk_expression(arg, visitor);
            }
        }
        LogicalExpr::OperatorApplicationExp(op) => {
            for operand in &op.operands {
                walk_expression(operand, visitor);
            }
        }
        LogicalExpr::Subquery(sq) => walk_plan(&sq.plan, visitor),
        LogicalExpr::SystemVar(var) => visitor.visit_system_var(var),
        LogicalExpr::UnresolvedVariable(raw) => visitor.visit_unresolved_variable(raw),
        LogicalExpr::DefaultPlaceholder => visitor.visit_default_placeholder(),
        LogicalExpr::Literal(_) | LogicalExpr::UnresolvedColumn(_) | LogicalExpr::UserVar(_) => {
            visitor.visit_leaf(expr)
        }
    }
}

/// Walk every expression owned by `plan` and its descendants.
pub fn walk_plan<V: ExpressionVisitor>(plan: &LogicalPlan, visitor: &mut V) {
    for expr in plan.expressions() {
        walk_expression(expr, visitor);
    }
    for child in plan.children() {
        walk_plan(child, visitor);
    }
}

// =============================================================================
// Common Visitor Implementations
// =============================================================================

/// Collects the canonical names of all resolved system variables, in
/// traversal order (duplicates kept).
#[derive(Debug, Default)]
pub struct SystemVarCollector {
    pub names: Vec<String>,
}

impl SystemVarCollector {
    pub fn collect(plan: &LogicalPlan) -> Vec<String> {
        let mut collector = Self::default();
        walk_plan(plan, &mut collector);
        collector.names
    }
}

impl ExpressionVisitor for SystemVarCollector {
    fn visit_system_var(&mut self, var: &SystemVar) {
        self.names.push(var.name.clone());
    }
}

/// Counts what is left for the resolution rules to do.
#[derive(Debug, Default, PartialEq)]
pub struct UnresolvedCounter {
    pub unresolved_variables: usize,
    pub default_placeholders: usize,
}

impl UnresolvedCounter {
    pub fn count(plan: &LogicalPlan) -> Self {
        let mut counter = Self::default();
        walk_plan(plan, &mut counter);
        counter
    }

    pub fn is_clean(&self) -> bool {
        self.unresolved_variables == 0 && self.default_placeholders == 0
    }
}

impl ExpressionVisitor for UnresolvedCounter {
    fn visit_unresolved_variable(&mut self, _raw: &str) {
        self.unresolved_variables += 1;
    }

    fn visit_default_placeholder(&mut self) {
        self.default_placeholders += 1;
    }
}
