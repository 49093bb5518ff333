//! # Query Analyzer
//!
//! The analyzer resolves system variable references and `DEFAULT`
//! placeholders in a parsed logical plan. It runs an ordered set of rules,
//! each an [`AnalyzerPass`] tagged with a [`Phase`] and a [`RunMode`].
//!
//! ## Pass Pipeline Overview
//!
//! ```text
//! 1. resolve_variables        (OnceBeforeDefault, Once)
//!                             @@[scope.]name / @name tokens -> bound variables
//! 2. resolve_set_defaults     (DefaultRules, Fixpoint)
//!                             SET @@var = DEFAULT -> catalog default literal
//! 3. validate_set_assignments (OnceAfterDefault, Once)
//!                             read-only targets, literal type checks
//! 4. validate_resolved_plan   (OnceAfterAll, Once)
//!                             nothing unresolved is left
//! ```
//!
//! Phases run in the order above regardless of registration order; within
//! a phase rules run in registration order. A `Fixpoint` rule is reapplied
//! until it reports no change or returns a structurally equal plan. Only
//! applications that change the plan count against `max_fixpoint_iterations`;
//! the application that confirms the fixpoint is always allowed.
//!
//! The rule set is fixed when the [`Analyzer`] is built. Rules read only the
//! plan and the [`PlanCtx`], so one analyzer can serve concurrent analyses.
//!
//! ## Module Organization
//!
//! - `analyzer_pass.rs`: Pass trait and result type
//! - `variable_reference.rs`: `@@...` token grammar and catalog binding
//! - `variable_resolver.rs`: variable resolution pass
//! - `set_default_resolver.rs`: `DEFAULT` substitution pass
//! - `set_assignment_validation.rs`: `SET` assignment checks
//! - `query_validation.rs`: final resolved-plan checks

use std::{fmt, sync::Arc};

use crate::{
    config::AnalyzerConfig,
    query_planner::{
        analyzer::{
            analyzer_pass::AnalyzerPass, errors::AnalyzerError,
            query_validation::QueryValidation, set_assignment_validation::SetAssignmentValidation,
            set_default_resolver::SetDefaultResolver, variable_resolver::VariableResolver,
        },
        logical_plan::LogicalPlan,
        transformed::Transformed,
    },
};

use super::plan_ctx::PlanCtx;

pub mod analyzer_pass;
pub mod errors;
mod query_validation;
mod set_assignment_validation;
mod set_default_resolver;
pub mod variable_reference;
mod variable_resolver;

pub use analyzer_pass::AnalyzerResult;

/// Execution stage of a rule. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    OnceBeforeDefault,
    DefaultRules,
    OnceAfterDefault,
    OnceAfterAll,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::OnceBeforeDefault => write!(f, "OnceBeforeDefault"),
            Phase::DefaultRules => write!(f, "DefaultRules"),
            Phase::OnceAfterDefault => write!(f, "OnceAfterDefault"),
            Phase::OnceAfterAll => write!(f, "OnceAfterAll"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Applied exactly once.
    Once,
    /// Reapplied until the plan stops changing.
    Fixpoint,
}

#[derive(Clone)]
pub struct Rule {
    pub name: &'static str,
    pub phase: Phase,
    pub mode: RunMode,
    pass: Arc<dyn AnalyzerPass>,
}

impl Rule {
    pub fn new(
        name: &'static str,
        phase: Phase,
        mode: RunMode,
        pass: impl AnalyzerPass + 'static,
    ) -> Self {
        Rule {
            name,
            phase,
            mode,
            pass: Arc::new(pass),
        }
    }

    pub fn once(name: &'static str, phase: Phase, pass: impl AnalyzerPass + 'static) -> Self {
        Rule::new(name, phase, RunMode::Once, pass)
    }

    pub fn fixpoint(name: &'static str, phase: Phase, pass: impl AnalyzerPass + 'static) -> Self {
        Rule::new(name, phase, RunMode::Fixpoint, pass)
    }

    /// Apply the rule's pass a single time, ignoring its run mode.
    pub fn apply(
        &self,
        plan: Arc<LogicalPlan>,
        plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Transformed<Arc<LogicalPlan>>> {
        self.pass.analyze(plan, plan_ctx)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("mode", &self.mode)
            .finish()
    }
}

/// The default rule set, in registration order.
pub fn default_rules(config: &AnalyzerConfig) -> Vec<Rule> {
    vec![
        Rule::once("resolve_variables", Phase::OnceBeforeDefault, VariableResolver),
        Rule::fixpoint("resolve_set_defaults", Phase::DefaultRules, SetDefaultResolver),
        Rule::once(
            "validate_set_assignments",
            Phase::OnceAfterDefault,
            SetAssignmentValidation::new(config.check_literal_assignments),
        ),
        Rule::once("validate_resolved_plan", Phase::OnceAfterAll, QueryValidation),
    ]
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    /// Sorted by phase; registration order kept within a phase.
    rules: Vec<Rule>,
    max_fixpoint_iterations: usize,
}

impl Analyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Analyzer::with_rules(default_rules(config), config.max_fixpoint_iterations)
    }

    /// Build an analyzer over `rules`, sorted by phase.
    ///
    /// `max_fixpoint_iterations` bounds the changing applications of each
    /// fixpoint rule. A cap of 0 is raised to 1.
    pub fn with_rules(mut rules: Vec<Rule>, max_fixpoint_iterations: usize) -> Self {
        // sort_by_key is stable
        rules.sort_by_key(|rule| rule.phase);
        Analyzer {
            rules,
            max_fixpoint_iterations: max_fixpoint_iterations.max(1),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn max_fixpoint_iterations(&self) -> usize {
        self.max_fixpoint_iterations
    }

    /// Run every rule over `plan` in phase order.
    ///
    /// The first failing rule aborts the run; the caller's plan is never
    /// modified.
    pub fn analyze(
        &self,
        plan: Arc<LogicalPlan>,
        plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Arc<LogicalPlan>> {
        log::debug!("Analyzer: running {} rules with {}", self.rules.len(), plan_ctx);
        log::trace!("Analyzer: input plan\n{}", plan);

        let mut plan = plan;
        let mut current_phase = None;
        for rule in &self.rules {
            if current_phase != Some(rule.phase) {
                log::debug!("Analyzer: entering phase {}", rule.phase);
                current_phase = Some(rule.phase);
            }
            plan = match rule.mode {
                RunMode::Once => self.run_once(rule, plan, plan_ctx)?,
                RunMode::Fixpoint => self.run_to_fixpoint(rule, plan, plan_ctx)?,
            };
        }

        log::trace!("Analyzer: output plan\n{}", plan);
        Ok(plan)
    }

    fn run_once(
        &self,
        rule: &Rule,
        plan: Arc<LogicalPlan>,
        plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Arc<LogicalPlan>> {
        let transformed = rule.apply(plan, plan_ctx).inspect_err(|e| {
            log::debug!("Analyzer: rule `{}` failed: {}", rule.name, e);
        })?;
        log::debug!(
            "Analyzer: rule `{}` {}",
            rule.name,
            if transformed.is_yes() { "changed the plan" } else { "made no change" }
        );
        Ok(transformed.get_plan())
    }

    fn run_to_fixpoint(
        &self,
        rule: &Rule,
        plan: Arc<LogicalPlan>,
        plan_ctx: &PlanCtx,
    ) -> AnalyzerResult<Arc<LogicalPlan>> {
        let mut plan = plan;
        let mut changes = 0;
        loop {
            let transformed = rule.apply(plan.clone(), plan_ctx).inspect_err(|e| {
                log::debug!(
                    "Analyzer: rule `{}` failed after {} change(s): {}",
                    rule.name,
                    changes,
                    e
                );
            })?;

            let next = match transformed {
                Transformed::No(next) => {
                    log::debug!(
                        "Analyzer: rule `{}` reached a fixpoint after {} change(s)",
                        rule.name,
                        changes
                    );
                    return Ok(next);
                }
                Transformed::Yes(next) => next,
            };

            if Arc::ptr_eq(&next, &plan) || next == plan {
                log::debug!(
                    "Analyzer: rule `{}` returned an equal plan after {} change(s)",
                    rule.name,
                    changes
                );
                return Ok(next);
            }

            changes += 1;
            if changes > self.max_fixpoint_iterations {
                log::warn!(
                    "Analyzer: rule `{}` still changing the plan after {} iterations",
                    rule.name,
                    self.max_fixpoint_iterations
                );
                return Err(AnalyzerError::RuleFixpointExceeded {
                    rule: rule.name.to_string(),
                    iterations: self.max_fixpoint_iterations,
                });
            }

            log::trace!("Analyzer: rule `{}` change {}\n{}", rule.name, changes, next);
            plan = next;
        }
    }
}
