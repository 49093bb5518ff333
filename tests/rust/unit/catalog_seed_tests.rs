//! Loading custom catalog seeds and analyzing against them.

use std::{io::Write, sync::Arc};

use sysvar_analyzer::{
    analyze_plan,
    config::AnalyzerConfig,
    query_planner::{
        analyzer::errors::AnalyzerError,
        logical_expr::{LogicalExpr, VariableScope},
        logical_plan::LogicalPlan,
        types::{ScalarType, Value},
    },
    variable_catalog::{CatalogError, VariableCatalog},
};

const SEED: &str = r#"
version: 42
variables:
  - name: Net_Buffer_Length
    type: int32
    default: 16384
    scopes: [session, global]
  - name: innodb_page_size
    type: int64
    default: 16384
    scopes: [global]
    dynamic: false
"#;

fn write_seed(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_custom_catalog_from_file() {
    let file = write_seed(SEED);
    let catalog = VariableCatalog::from_yaml_file(file.path()).unwrap();
    assert_eq!(catalog.seed_version(), 42);
    assert_eq!(catalog.len(), 2);

    let plan = Arc::new(LogicalPlan::set(vec![LogicalExpr::set_field(
        LogicalExpr::unresolved_variable("@@NET_BUFFER_LENGTH"),
        LogicalExpr::DefaultPlaceholder,
    )]));
    let resolved = analyze_plan(plan, Arc::new(catalog), &AnalyzerConfig::default()).unwrap();
    assert_eq!(
        resolved.as_ref(),
        &LogicalPlan::set(vec![LogicalExpr::set_field(
            LogicalExpr::system_var("net_buffer_length", ScalarType::Int32, VariableScope::Session),
            LogicalExpr::literal(Value::Int32(16384), ScalarType::Int32),
        )])
    );
}

#[test]
fn test_variables_missing_from_custom_catalog() {
    let catalog = Arc::new(VariableCatalog::from_yaml_str(SEED).unwrap());
    let plan = Arc::new(LogicalPlan::set(vec![LogicalExpr::set_field(
        LogicalExpr::unresolved_variable("@@sql_mode"),
        LogicalExpr::DefaultPlaceholder,
    )]));
    assert_eq!(
        analyze_plan(plan, catalog, &AnalyzerConfig::default()),
        Err(AnalyzerError::UnknownVariable("sql_mode".to_string()))
    );
}

#[test]
fn test_seed_errors() {
    assert!(matches!(
        VariableCatalog::from_yaml_file("/nonexistent/catalog.yaml"),
        Err(CatalogError::ConfigReadError { .. })
    ));

    let file = write_seed("version: [not, a, number]\nvariables: []\n");
    assert!(matches!(
        VariableCatalog::from_yaml_file(file.path()),
        Err(CatalogError::ConfigParseError { .. })
    ));

    let bad_default = r#"
version: 1
variables:
  - name: autocommit
    type: boolean
    default: 7
    scopes: [session]
"#;
    assert!(matches!(
        VariableCatalog::from_yaml_str(bad_default),
        Err(CatalogError::InvalidDefault { ref name, .. }) if name == "autocommit"
    ));
}

#[test]
fn test_builtin_catalog_covers_common_variables() {
    let catalog = VariableCatalog::builtin().unwrap();
    for name in [
        "auto_increment_increment",
        "autocommit",
        "sql_mode",
        "sql_select_limit",
        "time_zone",
        "transaction_isolation",
        "version",
    ] {
        assert!(catalog.lookup(name).is_some(), "missing {}", name);
    }
    assert!(catalog.entries().all(|entry| !entry.scopes.is_empty()));
}
