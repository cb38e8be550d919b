use crate::configs::config_provider::{ConfigOverrides, DEFAULT_CONFIG_PATH};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the sequence counters found in persisted log lines for gaps and duplicates
    Verify(VerifyArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to the key-value configuration file
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Unix socket path of the log agent
    #[arg(long)]
    pub socket_path: Option<String>,

    /// Target rate in messages per second
    #[arg(long)]
    pub target_rate: Option<u32>,

    /// Run duration in seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Messages per batch
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Report every failed send
    #[arg(long, default_value = "false")]
    pub verbose: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            socket_path: self.socket_path.clone(),
            target_rate: self.target_rate,
            duration: self.duration,
            batch_size: self.batch_size,
            verbose: self.verbose.then_some(true),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// File with one persisted log record per line
    pub log_file: PathBuf,

    /// Configuration file the template is read from
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Message template, overriding the configured one
    #[arg(long)]
    pub template: Option<String>,

    /// Regular expression whose first capture group matches the counter, overriding the template
    #[arg(long)]
    pub pattern: Option<String>,

    /// Number of counters the run attempted (its final `Next counter`)
    #[arg(long)]
    pub expected: Option<u64>,

    /// Missing counters to accept, usually the run's error count
    #[arg(long, default_value_t = 0)]
    pub tolerated_gaps: u64,
}
