//! sysvar-analyzer - system variable resolution for SQL logical plans
//!
//! This crate rewrites parsed query plans so that they are ready to execute:
//! - `@@[session.|global.]name` references bound to a read-only variable catalog
//! - `SET @@var = DEFAULT` replaced by the catalog default of `var`
//! - `SET` assignments checked against read-only flags and declared types
//! - phase-ordered rule engine with bounded fixpoint iteration

pub mod utils;

pub mod config;
pub mod query_planner;
pub mod variable_catalog;

pub use query_planner::analyze_plan;
