//! Configuration Commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use shopcheck_common::RunConfig;

use crate::output::{print_success, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the configuration after file, environment and flags are applied
    Show,

    /// Write a configuration file with every default spelled out
    Init {
        /// Where to write it
        #[arg(default_value = "shopcheck.toml")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn execute(cmd: ConfigCommands, config: &RunConfig, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(config)?),
            OutputFormat::Table | OutputFormat::Plain => print!("{}", toml::to_string_pretty(config)?),
        },

        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to replace it)", path.display());
            }
            RunConfig::default()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            print_success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}
