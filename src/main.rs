use std::{
    io::{self, Read},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sysvar_analyzer::{
    config::{AnalyzerConfig, CliConfig},
    query_planner::{self, logical_plan::LogicalPlan},
    variable_catalog::VariableCatalog,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Tree,
    Json,
}

/// sysvar-analyzer - resolve system variables and SET defaults in a logical plan
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON logical plan to analyze, `-` for stdin
    #[arg(long, default_value = "-")]
    plan: String,

    /// Variable catalog seed (YAML); the built-in catalog is used when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Analyzer configuration file (YAML); environment variables are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum plan-changing applications of a fixpoint rule
    #[arg(long)]
    max_fixpoint_iterations: Option<usize>,

    /// Do not check literal SET values against the target's declared type
    #[arg(long)]
    skip_literal_checks: bool,

    /// Output format for the resolved plan
    #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
    output: OutputFormat,
}

fn load_config(cli: &Cli) -> anyhow::Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AnalyzerConfig::from_env().context("loading configuration from environment")?,
    };

    if cli.max_fixpoint_iterations.is_some() || cli.skip_literal_checks {
        let overrides = AnalyzerConfig::from_cli(CliConfig {
            max_fixpoint_iterations: cli
                .max_fixpoint_iterations
                .unwrap_or(config.max_fixpoint_iterations),
            check_literal_assignments: config.check_literal_assignments && !cli.skip_literal_checks,
        })
        .context("invalid command line configuration")?;
        config.merge(overrides);
    }
    Ok(config)
}

fn load_catalog(cli: &Cli) -> anyhow::Result<VariableCatalog> {
    let catalog = match &cli.catalog {
        Some(path) => VariableCatalog::from_yaml_file(path)
            .with_context(|| format!("loading variable catalog from {}", path.display()))?,
        None => VariableCatalog::builtin().context("loading built-in variable catalog")?,
    };
    log::info!(
        "Loaded variable catalog v{} with {} variables",
        catalog.seed_version(),
        catalog.len()
    );
    Ok(catalog)
}

fn read_plan(source: &str) -> anyhow::Result<LogicalPlan> {
    let content = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading plan from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading plan from {}", source))?
    };
    serde_json::from_str(&content).context("parsing JSON logical plan")
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = load_config(&cli)?;
    log::debug!("Analyzer configuration: {:?}", config);
    let catalog = Arc::new(load_catalog(&cli)?);
    let plan = Arc::new(read_plan(&cli.plan)?);

    let resolved = query_planner::analyze_plan(plan, catalog, &config)?;

    match cli.output {
        OutputFormat::Tree => print!("{}", resolved),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(resolved.as_ref())?),
    }
    Ok(())
}
