use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

use crate::query_planner::{
    logical_expr::{expression_rewriter, LogicalExpr},
    transformed::Transformed,
};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum LogicalPlan {
    /// Produces a single empty row, e.g. the input of `SELECT @@version`.
    Empty,

    Scan(Scan),

    Projection(Projection),

    Filter(Filter),

    /// `SET target = value [, ...]`
    Set(Set),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub table_name: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Projection {
    #[serde(with = "crate::utils::serde_arc")]
    pub input: Arc<LogicalPlan>,
    pub items: Vec<LogicalExpr>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Filter {
    #[serde(with = "crate::utils::serde_arc")]
    pub input: Arc<LogicalPlan>,
    pub predicate: LogicalExpr,
}

/// Ordered assignments of one `SET` statement. Every entry is a
/// [`LogicalExpr::SetField`]; pairs resolve independently of each other.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Set {
    pub exprs: Vec<LogicalExpr>,
}

impl LogicalPlan {
    pub fn set(exprs: Vec<LogicalExpr>) -> Self {
        LogicalPlan::Set(Set { exprs })
    }

    pub fn projection(input: Arc<LogicalPlan>, items: Vec<LogicalExpr>) -> Self {
        LogicalPlan::Projection(Projection { input, items })
    }

    pub fn filter(input: Arc<LogicalPlan>, predicate: LogicalExpr) -> Self {
        LogicalPlan::Filter(Filter { input, predicate })
    }

    pub fn scan(table_name: impl Into<String>) -> Self {
        LogicalPlan::Scan(Scan {
            table_name: table_name.into(),
        })
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            LogicalPlan::Empty => "Empty",
            LogicalPlan::Scan(_) => "Scan",
            LogicalPlan::Projection(_) => "Projection",
            LogicalPlan::Filter(_) => "Filter",
            LogicalPlan::Set(_) => "Set",
        }
    }

    /// Expressions owned directly by this node (not by its children).
    pub fn expressions(&self) -> Vec<&LogicalExpr> {
        match self {
            LogicalPlan::Projection(p) => p.items.iter().collect(),
            LogicalPlan::Filter(f) => vec![&f.predicate],
            LogicalPlan::Set(s) => s.exprs.iter().collect(),
            LogicalPlan::Empty | LogicalPlan::Scan(_) => vec![],
        }
    }

    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Projection(p) => vec![p.input.as_ref()],
            LogicalPlan::Filter(f) => vec![f.input.as_ref()],
            LogicalPlan::Empty | LogicalPlan::Scan(_) | LogicalPlan::Set(_) => vec![],
        }
    }

    /// Rewrite every expression of `plan` and of all plans below it.
    ///
    /// Children are rewritten before the node's own expressions. Only nodes
    /// on a path to a changed expression are rebuilt; everything else is the
    /// original `Arc`.
    pub fn rewrite_expressions<E, F>(
        plan: &Arc<LogicalPlan>,
        rewriter: &mut F,
    ) -> Result<Transformed<Arc<LogicalPlan>>, E>
    where
        F: FnMut(&LogicalExpr) -> Result<Option<LogicalExpr>, E>,
    {
        let transformed_plan = match plan.as_ref() {
            LogicalPlan::Empty | LogicalPlan::Scan(_) => Transformed::No(plan.clone()),
            LogicalPlan::Projection(projection) => {
                let input_tf = Self::rewrite_expressions(&projection.input, rewriter)?;
                let items_tf = expression_rewriter::rewrite_expressions(&projection.items, rewriter)?;
                projection.rebuild_or_clone(input_tf, items_tf, plan.clone())
            }
            LogicalPlan::Filter(filter) => {
                let input_tf = Self::rewrite_expressions(&filter.input, rewriter)?;
                let predicate_tf = expression_rewriter::rewrite_expression(&filter.predicate, rewriter)?;
                filter.rebuild_or_clone(input_tf, predicate_tf, plan.clone())
            }
            LogicalPlan::Set(set) => {
                let exprs_tf = expression_rewriter::rewrite_expressions(&set.exprs, rewriter)?;
                set.rebuild_or_clone(exprs_tf, plan.clone())
            }
        };
        Ok(transformed_plan)
    }
}

impl Projection {
    pub fn rebuild_or_clone(
        &self,
        input_tf: Transformed<Arc<LogicalPlan>>,
        items_tf: Transformed<Vec<LogicalExpr>>,
        old_plan: Arc<LogicalPlan>,
    ) -> Transformed<Arc<LogicalPlan>> {
        if !input_tf.is_yes() && !items_tf.is_yes() {
            return Transformed::No(old_plan);
        }
        let new_node = LogicalPlan::Projection(Projection {
            input: input_tf.get_plan(),
            items: items_tf.get_plan(),
        });
        Transformed::Yes(Arc::new(new_node))
    }
}

impl Filter {
    pub fn rebuild_or_clone(
        &self,
        input_tf: Transformed<Arc<LogicalPlan>>,
        predicate_tf: Transformed<LogicalExpr>,
        old_plan: Arc<LogicalPlan>,
    ) -> Transformed<Arc<LogicalPlan>> {
        if !input_tf.is_yes() && !predicate_tf.is_yes() {
            return Transformed::No(old_plan);
        }
        let new_node = LogicalPlan::Filter(Filter {
            input: input_tf.get_plan(),
            predicate: predicate_tf.get_plan(),
        });
        Transformed::Yes(Arc::new(new_node))
    }
}

impl Set {
    pub fn rebuild_or_clone(
        &self,
        exprs_tf: Transformed<Vec<LogicalExpr>>,
        old_plan: Arc<LogicalPlan>,
    ) -> Transformed<Arc<LogicalPlan>> {
        match exprs_tf {
            Transformed::Yes(exprs) => Transformed::Yes(Arc::new(LogicalPlan::Set(Set { exprs }))),
            Transformed::No(_) => Transformed::No(old_plan),
        }
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with_tree(f, "", true, true)
    }
}

impl LogicalPlan {
    fn fmt_with_tree(
        &self,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
        is_root: bool,
    ) -> fmt::Result {
        let (branch, next_prefix) = if is_last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        let exprs = self
            .expressions()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let label = match self {
            LogicalPlan::Scan(scan) => format!("Scan({})", scan.table_name),
            _ if exprs.is_empty() => self.variant_name().to_string(),
            _ => format!("{} [{}]", self.variant_name(), exprs),
        };

        if is_root {
            writeln!(f, "{}", label)?;
        } else {
            writeln!(f, "{}{}{}", prefix, branch, label)?;
        }

        let child_prefix = if is_root {
            String::new()
        } else {
            format!("{}{}", prefix, next_prefix)
        };
        let children = self.children();
        let n = children.len();
        for (i, child) in children.into_iter().enumerate() {
            child.fmt_with_tree(f, &child_prefix, i + 1 == n, false)?;
        }
        Ok(())
    }
}
