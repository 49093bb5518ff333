//! Parsing and resolution of variable reference tokens.
//!
//! The parser hands over `@@...` and `@...` tokens verbatim. This module
//! splits them into sigil, optional scope keyword and name, then binds system
//! variable references against the [`VariableCatalog`].
//!
//! ```text
//! @@auto_increment_increment       -> no explicit scope
//! @@session.SQL_SELECT_LIMIT       -> explicit session scope
//! @@local.sql_mode                 -> `local` is a synonym of `session`
//! @@global.max_connections         -> explicit global scope
//! @@foo.bar                        -> name `foo.bar` (not a scope keyword)
//! @my_var                          -> user variable
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::char,
    combinator::{all_consuming, map, opt, value},
    sequence::{preceded, terminated},
    IResult, Parser,
};

use super::{analyzer_pass::AnalyzerResult, errors::AnalyzerError};
use crate::{
    query_planner::logical_expr::{LogicalExpr, SystemVar, UserVar, VariableScope},
    variable_catalog::VariableCatalog,
};

#[derive(Debug, PartialEq, Clone)]
pub enum VariableReference {
    System {
        /// Name as typed, without sigil or scope keyword.
        raw_name: String,
        explicit_scope: Option<VariableScope>,
    },
    User {
        raw_name: String,
    },
}

impl VariableReference {
    pub fn canonical_name(&self) -> String {
        match self {
            VariableReference::System { raw_name, .. } | VariableReference::User { raw_name } => {
                raw_name.to_lowercase()
            }
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.'
}

fn scope_keyword(input: &str) -> IResult<&str, VariableScope> {
    alt((
        value(VariableScope::Session, tag_no_case("session")),
        value(VariableScope::Global, tag_no_case("global")),
        value(VariableScope::Session, tag_no_case("local")),
    ))
    .parse(input)
}

fn system_reference(input: &str) -> IResult<&str, VariableReference> {
    map(
        preceded(
            tag("@@"),
            (
                opt(terminated(scope_keyword, char('.'))),
                take_while1(is_name_char),
            ),
        ),
        |(explicit_scope, name): (Option<VariableScope>, &str)| VariableReference::System {
            raw_name: name.to_string(),
            explicit_scope,
        },
    )
    .parse(input)
}

fn user_reference(input: &str) -> IResult<&str, VariableReference> {
    map(preceded(char('@'), take_while1(is_name_char)), |name: &str| {
        VariableReference::User {
            raw_name: name.to_string(),
        }
    })
    .parse(input)
}

/// Split a raw `@@[scope.]name` or `@name` token.
pub fn parse_variable_reference(raw: &str) -> AnalyzerResult<VariableReference> {
    all_consuming(alt((system_reference, user_reference)))
        .parse(raw.trim())
        .map(|(_, reference)| reference)
        .map_err(|_| AnalyzerError::InvalidVariableReference(raw.to_string()))
}

/// Bind a system variable name to its catalog entry and effective scope.
///
/// An explicit scope must be permitted by the entry. Without one the
/// variable is session scoped when it can be, global otherwise.
pub fn resolve_system_variable(
    raw_name: &str,
    explicit_scope: Option<VariableScope>,
    catalog: &VariableCatalog,
) -> AnalyzerResult<SystemVar> {
    let name = raw_name.to_lowercase();
    let entry = catalog
        .lookup(&name)
        .ok_or_else(|| AnalyzerError::UnknownVariable(raw_name.to_string()))?;

    let scope = match explicit_scope {
        Some(requested) if entry.permits(requested) => requested,
        Some(requested) => {
            return Err(AnalyzerError::InvalidScope {
                name: entry.name.clone(),
                requested,
            })
        }
        None => entry.default_scope(),
    };

    Ok(SystemVar {
        name: entry.name.clone(),
        data_type: entry.data_type,
        scope,
    })
}

/// Parse and bind a raw token into a `SystemVar` or `UserVar` expression.
pub fn resolve_variable_token(raw: &str, catalog: &VariableCatalog) -> AnalyzerResult<LogicalExpr> {
    let reference = parse_variable_reference(raw)?;
    match reference {
        VariableReference::System {
            ref raw_name,
            explicit_scope,
        } => {
            let var = resolve_system_variable(raw_name, explicit_scope, catalog)?;
            log::trace!("Resolved `{}` to @@{}.{}", raw, var.scope, var.name);
            Ok(LogicalExpr::SystemVar(var))
        }
        VariableReference::User { .. } => Ok(LogicalExpr::UserVar(UserVar {
            name: reference.canonical_name(),
        })),
    }
}
