//! Analysis context.
//!
//! [`PlanCtx`] carries the read-only state every analyzer pass may consult
//! while rewriting a plan. Today that is the variable catalog. The context
//! is cheap to clone and can be shared by concurrent analyses, since nothing
//! in it is mutated once built.

use std::{fmt, sync::Arc};

use crate::variable_catalog::VariableCatalog;

#[derive(Debug, Clone)]
pub struct PlanCtx {
    catalog: Arc<VariableCatalog>,
}

impl PlanCtx {
    pub fn new(catalog: Arc<VariableCatalog>) -> Self {
        PlanCtx { catalog }
    }

    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }
}

impl fmt::Display for PlanCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlanCtx(catalog v{}, {} variables)",
            self.catalog.seed_version(),
            self.catalog.len()
        )
    }
}
