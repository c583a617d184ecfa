use clap::Parser;

use cleave_core::error::ConfigError;
use cleave_graph::GraphError;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "cleave",
    version,
    about = "Partition class graphs into microservice candidates"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Map an error to the process exit code.
///
///   0: success
///   1: general/unknown error
///   2: configuration error
///   3: graph input error
fn classify_exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return 2;
        }
        if cause.is::<GraphError>() {
            return 3;
        }
    }

    let lower = format!("{err:#}").to_lowercase();
    if lower.contains("cannot read graph") {
        3
    } else if lower.contains("cannot read config") {
        2
    } else {
        1
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::run(cli.command, cli.quiet) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(classify_exit_code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_config_error() {
        let err = anyhow::Error::new(ConfigError::Invalid("min_clusters must be positive".into()));
        assert_eq!(classify_exit_code(&err), 2);
    }

    #[test]
    fn exit_code_wrapped_config_error() {
        let core = cleave_core::error::CoreError::from(ConfigError::Parse("bad toml".into()));
        let err = anyhow::Error::new(core).context("Cannot build solver");
        assert_eq!(classify_exit_code(&err), 2);
    }

    #[test]
    fn exit_code_graph_error() {
        let err = anyhow::Error::new(GraphError::DuplicateClass(cleave_graph::ClassId(4)))
            .context("Invalid graph document");
        assert_eq!(classify_exit_code(&err), 3);
    }

    #[test]
    fn exit_code_unreadable_graph() {
        let err = anyhow::anyhow!("Cannot read graph: /nonexistent.json");
        assert_eq!(classify_exit_code(&err), 3);
    }

    #[test]
    fn exit_code_general() {
        let err = anyhow::anyhow!("Something unexpected happened");
        assert_eq!(classify_exit_code(&err), 1);
    }
}
