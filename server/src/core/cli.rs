use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::constants::{ENV_CONFIG, ENV_DB_PATH, ENV_HOST, ENV_PORT};

#[derive(Parser)]
#[command(name = "refdata")]
#[command(version, about = "Reference data service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database file
    #[arg(long, global = true, env = ENV_DB_PATH)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default when no subcommand is given)
    Start,
    /// Reset the lookup tables to their seed data and exit
    Seed,
}

/// Resolved CLI options, separated from the subcommand for config layering.
#[derive(Debug, Default, Clone)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub db: Option<PathBuf>,
}

/// Parse command-line arguments into options and an optional subcommand.
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();

    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        db: cli.db,
    };

    (config, cli.command)
}
