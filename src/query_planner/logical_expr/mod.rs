use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

use crate::query_planner::{
    logical_plan::LogicalPlan,
    types::{ScalarType, Value},
};

pub mod expression_rewriter;
pub mod visitors;

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum LogicalExpr {
    /// A typed literal. The type is carried explicitly so a literal built
    /// from a catalog default keeps the variable's declared type.
    Literal(Literal),

    /// Raw `@@...` or `@...` token text as produced by the parser.
    UnresolvedVariable(String),

    /// A bare identifier not yet bound to a column or variable.
    UnresolvedColumn(String),

    /// A system variable bound to a catalog entry and a scope.
    SystemVar(SystemVar),

    /// A user-defined `@name` variable.
    UserVar(UserVar),

    /// `DEFAULT` on the right-hand side of a `SET` assignment. Its meaning
    /// comes from the sibling target of the enclosing [`SetField`].
    DefaultPlaceholder,

    /// One `target = value` assignment of a `SET` statement.
    SetField(SetField),

    /// A function call, e.g. `CONCAT(a, b)`.
    ScalarFnCall(ScalarFnCall),

    /// An operator application, e.g. `2 + 3`.
    OperatorApplicationExp(OperatorApplication),

    /// A scalar subquery.
    Subquery(Subquery),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Literal {
    pub value: Value,
    pub data_type: ScalarType,
}

impl Literal {
    pub fn new(value: Value, data_type: ScalarType) -> Self {
        Literal { value, data_type }
    }

    pub fn int64(v: i64) -> Self {
        Literal::new(Value::Int64(v), ScalarType::Int64)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Literal::new(Value::Text(s.into()), ScalarType::LongText)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    Session,
    Global,
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableScope::Session => f.write_str("session"),
            VariableScope::Global => f.write_str("global"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SystemVar {
    /// Canonical lowercase name.
    pub name: String,
    pub data_type: ScalarType,
    pub scope: VariableScope,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct UserVar {
    pub name: String,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SetField {
    pub target: Box<LogicalExpr>,
    pub value: Box<LogicalExpr>,
}

impl SetField {
    pub fn new(target: LogicalExpr, value: LogicalExpr) -> Self {
        SetField {
            target: Box::new(target),
            value: Box::new(value),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ScalarFnCall {
    pub name: String,
    pub args: Vec<LogicalExpr>,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Operator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    ModuloDivision,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    And,
    Or,
    Not,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Addition => "+",
            Operator::Subtraction => "-",
            Operator::Multiplication => "*",
            Operator::Division => "/",
            Operator::ModuloDivision => "%",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessThanEqual => "<=",
            Operator::GreaterThanEqual => ">=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
        };
        f.write_str(s)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OperatorApplication {
    pub operator: Operator,
    pub operands: Vec<LogicalExpr>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Subquery {
    #[serde(with = "crate::utils::serde_arc")]
    pub plan: Arc<LogicalPlan>,
}

impl LogicalExpr {
    pub fn set_field(target: LogicalExpr, value: LogicalExpr) -> Self {
        LogicalExpr::SetField(SetField::new(target, value))
    }

    pub fn unresolved_variable(raw: impl Into<String>) -> Self {
        LogicalExpr::UnresolvedVariable(raw.into())
    }

    pub fn system_var(name: impl Into<String>, data_type: ScalarType, scope: VariableScope) -> Self {
        LogicalExpr::SystemVar(SystemVar {
            name: name.into(),
            data_type,
            scope,
        })
    }

    pub fn literal(value: Value, data_type: ScalarType) -> Self {
        LogicalExpr::Literal(Literal::new(value, data_type))
    }

    pub fn binary(operator: Operator, left: LogicalExpr, right: LogicalExpr) -> Self {
        LogicalExpr::OperatorApplicationExp(OperatorApplication {
            operator,
            operands: vec![left, right],
        })
    }

    pub fn function(name: impl Into<String>, args: Vec<LogicalExpr>) -> Self {
        LogicalExpr::ScalarFnCall(ScalarFnCall {
            name: name.into(),
            args,
        })
    }

    pub fn subquery(plan: Arc<LogicalPlan>) -> Self {
        LogicalExpr::Subquery(Subquery { plan })
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            LogicalExpr::Literal(_) => "Literal",
            LogicalExpr::UnresolvedVariable(_) => "UnresolvedVariable",
            LogicalExpr::UnresolvedColumn(_) => "UnresolvedColumn",
            LogicalExpr::SystemVar(_) => "SystemVar",
            LogicalExpr::UserVar(_) => "UserVar",
            LogicalExpr::DefaultPlaceholder => "DefaultPlaceholder",
            LogicalExpr::SetField(_) => "SetField",
            LogicalExpr::ScalarFnCall(_) => "ScalarFnCall",
            LogicalExpr::OperatorApplicationExp(_) => "OperatorApplication",
            LogicalExpr::Subquery(_) => "Subquery",
        }
    }
}

impl fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalExpr::Literal(lit) => write!(f, "{}::{}", lit.value, lit.data_type),
            LogicalExpr::UnresolvedVariable(raw) => f.write_str(raw),
            LogicalExpr::UnresolvedColumn(name) => f.write_str(name),
            LogicalExpr::SystemVar(var) => write!(f, "@@{}.{}", var.scope, var.name),
            LogicalExpr::UserVar(var) => write!(f, "@{}", var.name),
            LogicalExpr::DefaultPlaceholder => f.write_str("DEFAULT"),
            LogicalExpr::SetField(sf) => write!(f, "{} = {}", sf.target, sf.value),
            LogicalExpr::ScalarFnCall(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            LogicalExpr::OperatorApplicationExp(op) => match op.operands.as_slice() {
                [operand] => write!(f, "{} {}", op.operator, operand),
                [left, right] => write!(f, "({} {} {})", left, op.operator, right),
                operands => {
                    write!(f, "{}(", op.operator)?;
                    for (i, operand) in operands.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", operand)?;
                    }
                    f.write_str(")")
                }
            },
            LogicalExpr::Subquery(sq) => write!(f, "(subquery {})", sq.plan.variant_name()),
        }
    }
}
