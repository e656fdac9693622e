//! CLI for rdist.

mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use rdist_core::config;
use std::path::PathBuf;

use commands::{
    run_checksum, run_completions, run_download, run_hosts, run_man, run_upload, run_verify,
};

/// Top-level CLI for rdist.
#[derive(Debug, Parser)]
#[command(name = "rdist")]
#[command(about = "rdist: spread a file over several unreliable hosts and fetch it back", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload a file to COUNT randomly drawn hosts and print the manifest.
    Upload {
        /// File to distribute.
        path: PathBuf,
        /// Number of distinct hosts to draw from the pool.
        count: usize,
        /// Also write the manifest JSON to this file.
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,
    },

    /// Download the file described by a manifest, trying hosts until one copy verifies.
    Download {
        /// Manifest JSON produced by `upload`.
        manifest: PathBuf,
        /// Destination directory (default: current directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Output file name (default: the file's SHA-256).
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Check a local file against a manifest's size and SHA-256.
    Verify {
        /// Manifest JSON.
        manifest: PathBuf,
        /// Local file to check.
        path: PathBuf,
    },

    /// Compute SHA-256 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Show the configured host pool and redundancy settings.
    Hosts,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Upload {
                path,
                count,
                manifest,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_upload(&cfg, &path, count, manifest.as_deref()).await?;
            }
            CliCommand::Download {
                manifest,
                dir,
                name,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let dir = match dir {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                run_download(&cfg, &manifest, &dir, name.as_deref()).await?;
            }
            CliCommand::Verify { manifest, path } => run_verify(&manifest, &path).await?,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
            CliCommand::Hosts => {
                let cfg = config::load_or_init()?;
                run_hosts(&cfg)?;
            }
            CliCommand::Completions { shell } => run_completions(shell, &mut Cli::command())?,
            CliCommand::Man => run_man(Cli::command())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
