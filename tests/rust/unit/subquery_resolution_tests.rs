//! Variable references inside projections, filters and nested subqueries.

use std::sync::Arc;

use sysvar_analyzer::{
    config::AnalyzerConfig,
    query_planner::{
        analyzer::{errors::AnalyzerError, Analyzer},
        logical_expr::{
            visitors::{SystemVarCollector, UnresolvedCounter},
            Literal, LogicalExpr, Operator,
        },
        logical_plan::LogicalPlan,
        plan_ctx::PlanCtx,
    },
    variable_catalog::VariableCatalog,
};

fn ctx() -> PlanCtx {
    PlanCtx::new(Arc::new(VariableCatalog::builtin().unwrap()))
}

fn raw(token: &str) -> LogicalExpr {
    LogicalExpr::unresolved_variable(token)
}

#[test]
fn test_select_with_filter_resolves_everywhere() {
    // SELECT @@version, @@session.sql_mode FROM t WHERE @@autocommit = 1
    let plan = Arc::new(LogicalPlan::projection(
        Arc::new(LogicalPlan::filter(
            Arc::new(LogicalPlan::scan("t")),
            LogicalExpr::binary(
                Operator::Equal,
                raw("@@autocommit"),
                LogicalExpr::Literal(Literal::int64(1)),
            ),
        )),
        vec![raw("@@version"), raw("@@session.sql_mode")],
    ));

    let analyzer = Analyzer::new(&AnalyzerConfig::default());
    let resolved = analyzer.analyze(plan, &ctx()).unwrap();

    assert!(UnresolvedCounter::count(&resolved).is_clean());
    assert_eq!(
        resolved.to_string(),
        "Projection [@@global.version, @@session.sql_mode]\n\
         └── Filter [(@@session.autocommit = 1::BIGINT)]\n    \
         └── Scan(t)\n"
    );
}

#[test]
fn test_subquery_in_set_value() {
    // SET @@sql_mode = (SELECT @@global.sql_mode)
    let inner = Arc::new(LogicalPlan::projection(
        Arc::new(LogicalPlan::Empty),
        vec![raw("@@global.sql_mode")],
    ));
    let plan = Arc::new(LogicalPlan::set(vec![LogicalExpr::set_field(
        raw("@@sql_mode"),
        LogicalExpr::subquery(inner),
    )]));

    let analyzer = Analyzer::new(&AnalyzerConfig::default());
    let resolved = analyzer.analyze(plan, &ctx()).unwrap();

    assert!(UnresolvedCounter::count(&resolved).is_clean());
    assert_eq!(SystemVarCollector::collect(&resolved), vec!["sql_mode", "sql_mode"]);

    let LogicalPlan::Set(set) = resolved.as_ref() else {
        panic!("Expected Set");
    };
    let LogicalExpr::SetField(sf) = &set.exprs[0] else {
        panic!("Expected SetField");
    };
    let LogicalExpr::Subquery(sq) = sf.value.as_ref() else {
        panic!("Expected Subquery");
    };
    assert_eq!(sq.plan.to_string(), "Projection [@@global.sql_mode]\n└── Empty\n");
}

#[test]
fn test_unknown_variable_inside_subquery() {
    let inner = Arc::new(LogicalPlan::projection(
        Arc::new(LogicalPlan::Empty),
        vec![raw("@@no_such_variable")],
    ));
    let plan = Arc::new(LogicalPlan::projection(
        Arc::new(LogicalPlan::Empty),
        vec![LogicalExpr::subquery(inner)],
    ));

    let analyzer = Analyzer::new(&AnalyzerConfig::default());
    assert_eq!(
        analyzer.analyze(plan, &ctx()),
        Err(AnalyzerError::UnknownVariable("no_such_variable".to_string()))
    );
}

#[test]
fn test_single_rule_in_isolation() {
    let analyzer = Analyzer::new(&AnalyzerConfig::default());
    let rule = analyzer.rule("resolve_variables").unwrap();

    let plan = Arc::new(LogicalPlan::set(vec![LogicalExpr::set_field(
        raw("@@sql_select_limit"),
        LogicalExpr::DefaultPlaceholder,
    )]));
    let resolved = rule.apply(plan, &ctx()).unwrap().get_plan();

    // Defaults are left for the next phase.
    let counter = UnresolvedCounter::count(&resolved);
    assert_eq!(counter.unresolved_variables, 0);
    assert_eq!(counter.default_placeholders, 1);
}

#[test]
fn test_analyzer_shared_across_threads() {
    let analyzer = Arc::new(Analyzer::new(&AnalyzerConfig::default()));
    let ctx = ctx();

    let handles: Vec<_> = ["@@sql_mode", "@@SQL_MODE", "@@session.sql_mode", "@@local.Sql_Mode"]
        .into_iter()
        .map(|token| {
            let analyzer = analyzer.clone();
            let ctx = ctx.clone();
            std::thread::spawn(move || {
                let plan = Arc::new(LogicalPlan::set(vec![LogicalExpr::set_field(
                    LogicalExpr::unresolved_variable(token),
                    LogicalExpr::DefaultPlaceholder,
                )]));
                analyzer.analyze(plan, &ctx).unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}
