//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::priority::Priority;

/// Priority-weighted, rate-limited HTTP request queue
#[derive(Parser, Debug)]
#[command(
    name = "rq",
    author,
    version,
    about = "Priority-weighted, rate-limited HTTP request queue",
    after_help = "Logs are written to: ~/.local/share/ratequeue/logs/ratequeue.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Override the dispatch rate (requests per second)
    #[arg(short, long, global = true)]
    pub rate_limit: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seed random posts API calls with random priorities and watch them drain
    Demo {
        /// Number of requests to seed
        #[arg(short = 'n', long, default_value = "15")]
        requests: usize,

        /// Requests seeded per second
        #[arg(short, long, default_value = "5")]
        seed_rate: u32,

        /// Posts API base URL (defaults to the configured base-url)
        #[arg(short, long)]
        base_url: Option<String>,
    },

    /// GET one or more URLs through the queue
    Fetch {
        /// URLs to fetch
        #[arg(required = true)]
        urls: Vec<String>,

        /// Priority for every request (immediate, high, medium, low or 1-4)
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },

    /// Print the effective configuration as YAML
    Config,
}
