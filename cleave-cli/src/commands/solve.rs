use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use cleave_core::hierarchical::{HierarchicalSolver, SolveOutcome};
use cleave_core::metrics::Objectives;
use cleave_core::progress::{IndicatifReporter, NoopReporter, ProgressReporter};

use super::{format_solution, load_config, load_graph};

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Class graph document (JSON)
    #[arg(long)]
    pub graph: PathBuf,

    /// Configuration file (default: ./cleave.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Target cluster count; overrides [hierarchical] target_clusters
    #[arg(long)]
    pub target: Option<usize>,

    /// Output format: text, json
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

pub fn run(args: &SolveArgs, quiet: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if args.target.is_some() {
        config.hierarchical.target_clusters = args.target;
    }
    config.validate()?;
    let graph = load_graph(&args.graph)?;

    let solver = HierarchicalSolver::from_config(Arc::clone(&graph), &config)
        .context("Cannot build hierarchical solver")?;
    let reporter: Box<dyn ProgressReporter> = if quiet || args.format == "json" {
        Box::new(NoopReporter)
    } else {
        Box::new(IndicatifReporter::new())
    };
    let outcome = solver.solve_with_progress(reporter.as_ref())?;

    let names = Objectives::from_kinds(&config.objectives.metrics).names();
    match args.format.as_str() {
        "json" => {
            let kind = match &outcome {
                SolveOutcome::Target(_) => "target",
                SolveOutcome::Trajectory(_) => "trajectory",
            };
            let json = serde_json::json!({
                "outcome": kind,
                "objectives": names,
                "solutions": outcome.solutions(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => match &outcome {
            SolveOutcome::Target(solution) => {
                print!("{}", format_solution(&graph, &names, solution));
            }
            SolveOutcome::Trajectory(steps) => {
                println!("No target set; {} steps from singletons to monolith", steps.len());
                for (step, solution) in steps.iter().enumerate() {
                    print!("Step {step}: {}", format_solution(&graph, &names, solution));
                }
            }
        },
    }
    Ok(())
}
