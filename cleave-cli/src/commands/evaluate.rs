use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use cleave_core::fitness::{Evaluation, Feasibility, FitnessEvaluator};
use cleave_core::metrics::Objectives;
use cleave_core::solution::{Solution, non_dominated};

use super::{format_solution, load_config, load_graph};

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Class graph document (JSON)
    #[arg(long)]
    pub graph: PathBuf,

    /// Genomes to score: a JSON array of integer arrays
    #[arg(long)]
    pub genomes: PathBuf,

    /// Configuration file (default: ./cleave.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: text, json
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

fn feasibility_label(feasibility: Feasibility) -> &'static str {
    match feasibility {
        Feasibility::Feasible => "feasible",
        Feasibility::TooFewClusters { .. } => "too-few-clusters",
        Feasibility::TooManyClusters { .. } => "too-many-clusters",
    }
}

pub fn run(args: &EvaluateArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;
    let graph = load_graph(&args.graph)?;
    let text = std::fs::read_to_string(&args.genomes)
        .with_context(|| format!("Cannot read genomes: {}", args.genomes.display()))?;
    let genomes: Vec<Vec<usize>> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid genome list: {}", args.genomes.display()))?;

    let evaluator = FitnessEvaluator::new(Arc::clone(&graph), &config)
        .context("Cannot build fitness evaluator")?;

    let mut evaluations: Vec<Evaluation> = Vec::with_capacity(genomes.len());
    for (index, result) in evaluator.evaluate_population(&genomes).into_iter().enumerate() {
        evaluations.push(result.with_context(|| format!("Genome {index}"))?);
    }

    let feasible: Vec<Solution> = genomes
        .iter()
        .zip(&evaluations)
        .filter(|(_, evaluation)| evaluation.is_feasible())
        .map(|(genome, _)| evaluator.realize(genome))
        .collect::<Result<_, _>>()?;
    let front = non_dominated(&feasible);

    let names = Objectives::from_kinds(&config.objectives.metrics).names();
    match args.format.as_str() {
        "json" => {
            let entries: Vec<_> = evaluations
                .iter()
                .enumerate()
                .map(|(index, e)| {
                    serde_json::json!({
                        "index": index,
                        "feasibility": feasibility_label(e.feasibility),
                        "violation": e.feasibility.violation(),
                        "cluster_count": e.cluster_count,
                        "objectives": e.objectives,
                    })
                })
                .collect();
            let json = serde_json::json!({
                "objectives": names,
                "evaluations": entries,
                "non_dominated": front,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            println!("{:<6} {:<18} {:>8}  objectives", "genome", "feasibility", "clusters");
            for (index, e) in evaluations.iter().enumerate() {
                let values: Vec<String> = e.objectives.iter().map(|v| format!("{v:.4}")).collect();
                println!(
                    "{index:<6} {:<18} {:>8}  {}",
                    feasibility_label(e.feasibility),
                    e.cluster_count,
                    values.join(" ")
                );
            }
            println!();
            println!("Non-dominated solutions: {}", front.len());
            for solution in &front {
                print!("{}", format_solution(&graph, &names, solution));
            }
        }
    }
    Ok(())
}
