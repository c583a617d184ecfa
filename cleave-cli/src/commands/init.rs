use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use cleave_core::config::CleaveConfig;

use super::DEFAULT_CONFIG_FILE;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write cleave.toml into (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing cleave.toml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let target = args.path.join(DEFAULT_CONFIG_FILE);
    if target.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            target.display()
        );
    }

    let text = CleaveConfig::default().to_toml_string()?;
    std::fs::write(&target, text)
        .with_context(|| format!("Cannot write {}", target.display()))?;
    println!("Wrote {}", target.display());
    Ok(())
}
