pub mod evaluate;
pub mod init;
pub mod solve;

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;

use cleave_core::config::CleaveConfig;
use cleave_core::solution::Solution;
use cleave_graph::ClassGraph;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cleave.toml";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default cleave.toml
    Init(init::InitArgs),
    /// Run the hierarchical solver over a class graph
    Solve(solve::SolveArgs),
    /// Score genomes as the external optimizer would
    Evaluate(evaluate::EvaluateArgs),
}

pub fn run(cmd: Command, quiet: bool) -> anyhow::Result<()> {
    match cmd {
        Command::Init(args) => init::run(&args),
        Command::Solve(args) => solve::run(&args, quiet),
        Command::Evaluate(args) => evaluate::run(&args),
    }
}

pub fn load_graph(path: &Path) -> anyhow::Result<Arc<ClassGraph>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read graph: {}", path.display()))?;
    let graph = ClassGraph::from_json(&json)
        .with_context(|| format!("Invalid graph document: {}", path.display()))?;
    tracing::info!(
        classes = graph.class_count(),
        clusterable = graph.clusterable_count(),
        edges = graph.edge_count(),
        "Loaded class graph"
    );
    Ok(Arc::new(graph))
}

/// Explicit config, else `./cleave.toml` when present, else defaults.
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<CleaveConfig> {
    let config = match path {
        Some(path) => CleaveConfig::load(path)?,
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.exists() {
                CleaveConfig::load(local)?
            } else {
                CleaveConfig::default()
            }
        }
    };
    Ok(config)
}

/// Human-readable rendering of one solution.
pub fn format_solution(graph: &ClassGraph, names: &[&str], solution: &Solution) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} microservices", solution.cluster_count());
    if let Some(quality) = solution.quality {
        let _ = write!(out, ", quality {quality:.4}");
    }
    out.push('\n');

    let objectives: Vec<String> = names
        .iter()
        .zip(&solution.objectives)
        .map(|(name, value)| format!("{name}={value:.4}"))
        .collect();
    if !objectives.is_empty() {
        let _ = writeln!(out, "  objectives: {}", objectives.join(" "));
    }

    for service in &solution.microservices {
        let members: Vec<&str> = service
            .classes
            .iter()
            .map(|id| graph.node(*id).map_or("?", |node| node.name.as_str()))
            .collect();
        let _ = writeln!(out, "  [{}] {}", service.id, members.join(", "));
    }
    out
}
