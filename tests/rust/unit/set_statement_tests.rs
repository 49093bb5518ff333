//! End-to-end resolution of `SET` statements through the default rule set.

use std::sync::Arc;

use sysvar_analyzer::{
    analyze_plan,
    config::{AnalyzerConfig, CliConfig},
    query_planner::{
        analyzer::{errors::AnalyzerError, Analyzer},
        logical_expr::{Literal, LogicalExpr, Operator, UserVar, VariableScope},
        logical_plan::LogicalPlan,
        plan_ctx::PlanCtx,
        types::{ScalarType, Value},
    },
    variable_catalog::VariableCatalog,
};

fn catalog() -> Arc<VariableCatalog> {
    Arc::new(VariableCatalog::builtin().expect("built-in catalog must load"))
}

fn set(pairs: Vec<(LogicalExpr, LogicalExpr)>) -> Arc<LogicalPlan> {
    Arc::new(LogicalPlan::set(
        pairs
            .into_iter()
            .map(|(target, value)| LogicalExpr::set_field(target, value))
            .collect(),
    ))
}

fn raw(token: &str) -> LogicalExpr {
    LogicalExpr::unresolved_variable(token)
}

fn analyze(plan: Arc<LogicalPlan>) -> Result<Arc<LogicalPlan>, AnalyzerError> {
    analyze_plan(plan, catalog(), &AnalyzerConfig::default())
}

fn auto_increment_increment() -> LogicalExpr {
    LogicalExpr::system_var("auto_increment_increment", ScalarType::Int64, VariableScope::Session)
}

fn sql_mode() -> LogicalExpr {
    LogicalExpr::system_var("sql_mode", ScalarType::LongText, VariableScope::Session)
}

#[test]
fn test_defaults_get_catalog_values_with_declared_types() {
    let plan = set(vec![
        (raw("@@auto_increment_increment"), LogicalExpr::DefaultPlaceholder),
        (raw("@@sql_select_limit"), LogicalExpr::DefaultPlaceholder),
    ]);

    let resolved = analyze(plan).unwrap();
    assert_eq!(
        resolved.as_ref(),
        set(vec![
            (
                auto_increment_increment(),
                LogicalExpr::literal(Value::Int64(1), ScalarType::Int64),
            ),
            (
                LogicalExpr::system_var("sql_select_limit", ScalarType::Int32, VariableScope::Session),
                LogicalExpr::literal(Value::Int32(2147483647), ScalarType::Int32),
            ),
        ])
        .as_ref()
    );
}

#[test]
fn test_defaults_resolve_under_smallest_fixpoint_cap() {
    let config = AnalyzerConfig::from_cli(CliConfig {
        max_fixpoint_iterations: 1,
        check_literal_assignments: true,
    })
    .unwrap();
    let plan = || {
        set(vec![
            (raw("@@auto_increment_increment"), LogicalExpr::DefaultPlaceholder),
            (raw("@@sql_select_limit"), LogicalExpr::DefaultPlaceholder),
        ])
    };

    let resolved = analyze_plan(plan(), catalog(), &config).unwrap();
    assert_eq!(resolved, analyze(plan()).unwrap());
    assert_eq!(
        resolved.as_ref(),
        set(vec![
            (
                auto_increment_increment(),
                LogicalExpr::literal(Value::Int64(1), ScalarType::Int64),
            ),
            (
                LogicalExpr::system_var("sql_select_limit", ScalarType::Int32, VariableScope::Session),
                LogicalExpr::literal(Value::Int32(2147483647), ScalarType::Int32),
            ),
        ])
        .as_ref()
    );
}

#[test]
fn test_mixed_case_with_explicit_session_scope() {
    let resolved = analyze(set(vec![(
        raw("@@session.auto_increment_INCREMENT"),
        LogicalExpr::DefaultPlaceholder,
    )]))
    .unwrap();

    let expected = analyze(set(vec![(
        raw("@@auto_increment_increment"),
        LogicalExpr::DefaultPlaceholder,
    )]))
    .unwrap();

    assert_eq!(resolved, expected);
    assert_eq!(
        resolved.as_ref(),
        set(vec![(
            auto_increment_increment(),
            LogicalExpr::literal(Value::Int64(1), ScalarType::Int64),
        )])
        .as_ref()
    );
}

#[test]
fn test_arithmetic_value_passes_through() {
    let sum = || {
        LogicalExpr::binary(
            Operator::Addition,
            LogicalExpr::Literal(Literal::int64(2)),
            LogicalExpr::Literal(Literal::int64(3)),
        )
    };

    let resolved = analyze(set(vec![(raw("@@auto_increment_increment"), sum())])).unwrap();
    assert_eq!(
        resolved.as_ref(),
        set(vec![(auto_increment_increment(), sum())]).as_ref()
    );
}

#[test]
fn test_function_call_structure_preserved() {
    let resolved = analyze(set(vec![(
        raw("@@sql_mode"),
        LogicalExpr::function("CONCAT", vec![raw("@@sql_mode"), raw("@@sql_mode")]),
    )]))
    .unwrap();

    assert_eq!(
        resolved.as_ref(),
        set(vec![(
            sql_mode(),
            LogicalExpr::function("CONCAT", vec![sql_mode(), sql_mode()]),
        )])
        .as_ref()
    );
}

#[test]
fn test_unknown_variable_rejected() {
    assert_eq!(
        analyze(set(vec![(
            raw("@@not_a_real_variable"),
            LogicalExpr::DefaultPlaceholder
        )])),
        Err(AnalyzerError::UnknownVariable("not_a_real_variable".to_string()))
    );
}

#[test]
fn test_case_variants_are_idempotent() {
    let variants = [
        "@@sql_select_limit",
        "@@SQL_SELECT_LIMIT",
        "@@Sql_Select_Limit",
        "@@session.sql_select_limit",
        "@@SESSION.SQL_SELECT_LIMIT",
        "@@local.sql_select_limit",
    ];
    let expected = analyze(set(vec![(raw(variants[0]), LogicalExpr::DefaultPlaceholder)])).unwrap();
    for token in variants {
        assert_eq!(
            analyze(set(vec![(raw(token), LogicalExpr::DefaultPlaceholder)])).unwrap(),
            expected,
            "token: {}",
            token
        );
    }
}

#[test]
fn test_global_scope_and_global_only_variables() {
    let resolved = analyze(set(vec![
        (raw("@@global.sql_mode"), LogicalExpr::DefaultPlaceholder),
        (raw("@@max_connections"), LogicalExpr::Literal(Literal::int64(500))),
    ]))
    .unwrap();

    let LogicalPlan::Set(s) = resolved.as_ref() else {
        panic!("Expected Set");
    };
    let targets: Vec<String> = s
        .exprs
        .iter()
        .map(|e| match e {
            LogicalExpr::SetField(sf) => sf.target.to_string(),
            other => panic!("Expected SetField, got {}", other),
        })
        .collect();
    assert_eq!(targets, vec!["@@global.sql_mode", "@@global.max_connections"]);
}

#[test]
fn test_scope_errors() {
    assert_eq!(
        analyze(set(vec![(
            raw("@@session.max_connections"),
            LogicalExpr::Literal(Literal::int64(10))
        )])),
        Err(AnalyzerError::InvalidScope {
            name: "max_connections".to_string(),
            requested: VariableScope::Session,
        })
    );
    assert_eq!(
        analyze(set(vec![(raw("@@global."), LogicalExpr::DefaultPlaceholder)])),
        Err(AnalyzerError::InvalidVariableReference("@@global.".to_string()))
    );
}

#[test]
fn test_read_only_variable_rejected() {
    assert_eq!(
        analyze(set(vec![(
            raw("@@version"),
            LogicalExpr::Literal(Literal::text("9.0.0"))
        )])),
        Err(AnalyzerError::ReadOnlyVariable("version".to_string()))
    );
}

#[test]
fn test_default_on_user_variable_rejected() {
    assert_eq!(
        analyze(set(vec![(raw("@counter"), LogicalExpr::DefaultPlaceholder)])),
        Err(AnalyzerError::DefaultNotAllowed {
            target: "@counter".to_string()
        })
    );
}

#[test]
fn test_user_variables_and_bare_targets() {
    let resolved = analyze(set(vec![
        (raw("@Counter"), raw("@@auto_increment_offset")),
        (
            LogicalExpr::UnresolvedColumn("SQL_SAFE_UPDATES".to_string()),
            LogicalExpr::DefaultPlaceholder,
        ),
    ]))
    .unwrap();

    assert_eq!(
        resolved.as_ref(),
        set(vec![
            (
                LogicalExpr::UserVar(UserVar {
                    name: "counter".to_string()
                }),
                LogicalExpr::system_var(
                    "auto_increment_offset",
                    ScalarType::Int64,
                    VariableScope::Session
                ),
            ),
            (
                LogicalExpr::system_var("sql_safe_updates", ScalarType::Boolean, VariableScope::Session),
                LogicalExpr::literal(Value::Boolean(false), ScalarType::Boolean),
            ),
        ])
        .as_ref()
    );
}

#[test]
fn test_literal_type_checks_follow_config() {
    let plan = || {
        set(vec![(
            raw("@@autocommit"),
            LogicalExpr::Literal(Literal::text("sometimes")),
        )])
    };

    let err = analyze(plan()).unwrap_err();
    assert!(matches!(err, AnalyzerError::TypeCoercion { ref name, .. } if name == "autocommit"));
    assert!(!err.is_internal());

    let relaxed = AnalyzerConfig {
        check_literal_assignments: false,
        ..Default::default()
    };
    assert!(analyze_plan(plan(), catalog(), &relaxed).is_ok());
}

#[test]
fn test_input_plan_is_not_modified() {
    let input = set(vec![(raw("@@sql_select_limit"), LogicalExpr::DefaultPlaceholder)]);
    let snapshot = input.as_ref().clone();
    let resolved = analyze(input.clone()).unwrap();
    assert_eq!(input.as_ref(), &snapshot);
    assert_ne!(resolved, input);
}

#[test]
fn test_plan_from_json() {
    let json = r#"
{
  "Set": {
    "exprs": [
      {
        "SetField": {
          "target": { "UnresolvedVariable": "@@SESSION.sql_select_limit" },
          "value": "DefaultPlaceholder"
        }
      }
    ]
  }
}
"#;
    let plan: LogicalPlan = serde_json::from_str(json).unwrap();
    let resolved = analyze(Arc::new(plan)).unwrap();
    assert_eq!(
        resolved.to_string(),
        "Set [@@session.sql_select_limit = 2147483647::INT]\n"
    );
}

#[test]
fn test_every_catalog_default_substitutes_with_declared_type() {
    let catalog = catalog();
    let ctx = PlanCtx::new(catalog.clone());
    let analyzer = Analyzer::new(&AnalyzerConfig::default());
    let resolve = analyzer.rule("resolve_variables").unwrap();
    let substitute = analyzer.rule("resolve_set_defaults").unwrap();

    for entry in catalog.entries() {
        let token = format!("@@{}", entry.name.to_uppercase());
        let plan = set(vec![(raw(&token), LogicalExpr::DefaultPlaceholder)]);
        let plan = resolve.apply(plan, &ctx).unwrap().get_plan();
        let plan = substitute.apply(plan, &ctx).unwrap().get_plan();

        let expected = set(vec![(
            LogicalExpr::system_var(entry.name.clone(), entry.data_type, entry.default_scope()),
            LogicalExpr::literal(entry.data_type.coerce(&entry.default).unwrap(), entry.data_type),
        )]);
        assert_eq!(plan, expected, "variable: {}", entry.name);
    }
}
