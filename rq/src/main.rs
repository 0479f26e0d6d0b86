//! rq - drive the rate-limited request queue from the command line

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use rand::Rng;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use ratequeue::cli::{Cli, Command};
use ratequeue::dispatcher::{Pacer, RateLimiter};
use ratequeue::{Config, Post, PostsApi, PostsError, Priority, QueuedHttpClient};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ratequeue")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => s.parse::<tracing::Level>().unwrap_or_else(|_| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("ratequeue.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(rate) = cli.rate_limit {
        debug!(rate, "main: overriding rate limit from CLI");
        config.dispatcher.rate_limit_per_sec = rate;
    }
    config.validate()?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Demo {
            requests,
            seed_rate,
            base_url,
        } => cmd_demo(&config, requests, seed_rate, base_url).await,
        Command::Fetch { urls, priority } => cmd_fetch(&config, &urls, priority).await,
        Command::Config => cmd_config(&config),
    }
}

fn paint(priority: Priority) -> colored::ColoredString {
    let label = format!("{:<9}", priority.to_string());
    match priority {
        Priority::Immediate => label.red().bold(),
        Priority::High => label.yellow(),
        Priority::Medium => label.cyan(),
        Priority::Low => label.dimmed(),
    }
}

/// One random posts API call seeded by the demo
#[derive(Debug, Clone)]
enum DemoOp {
    Fetch(u64),
    Create(String),
    Update(u64, String),
    Delete(u64),
}

impl DemoOp {
    fn random() -> (Self, Priority) {
        let mut rng = rand::rng();
        let id = rng.random_range(1..=100);
        let op = match rng.random_range(0..4) {
            0 => DemoOp::Fetch(id),
            1 => DemoOp::Create(format!("demo post {}", id)),
            2 => DemoOp::Update(id, format!("revised post {}", id)),
            _ => DemoOp::Delete(id),
        };
        let priority = Priority::ALL[rng.random_range(0..Priority::COUNT)];
        (op, priority)
    }

    async fn run(&self, api: &PostsApi, priority: Priority) -> Result<Post, PostsError> {
        match self {
            DemoOp::Fetch(id) => api.fetch_post(*id, priority).await,
            DemoOp::Create(title) => api.create_post(title, "posted by rq demo", priority).await,
            DemoOp::Update(id, title) => api.update_post(*id, title, "updated by rq demo", priority).await,
            DemoOp::Delete(id) => api.delete_post(*id, priority).await,
        }
    }
}

impl fmt::Display for DemoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemoOp::Fetch(id) => write!(f, "fetch post {}", id),
            DemoOp::Create(title) => write!(f, "create \"{}\"", title),
            DemoOp::Update(id, _) => write!(f, "update post {}", id),
            DemoOp::Delete(id) => write!(f, "delete post {}", id),
        }
    }
}

async fn cmd_demo(config: &Config, requests: usize, seed_rate: u32, base_url: Option<String>) -> Result<()> {
    debug!(requests, seed_rate, ?base_url, "cmd_demo: called");
    let client = Arc::new(QueuedHttpClient::new(&config.http, &config.dispatcher).context("Failed to start HTTP client")?);
    let api = PostsApi::new(Arc::clone(&client), base_url.unwrap_or_else(|| config.base_url.clone()));
    let seeder = Pacer::per_second(seed_rate).context("Invalid seed rate")?;

    println!(
        "{} {} requests every {:?} against {} (dispatching {}/s)",
        "Seeding".bold(),
        requests,
        seeder.interval(),
        api.base_url(),
        config.dispatcher.rate_limit_per_sec
    );

    let started = Instant::now();
    let mut tasks = JoinSet::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    for seq in 1..=requests {
        tokio::select! {
            _ = &mut ctrl_c => {
                interrupted = true;
                break;
            }
            taken = seeder.take() => taken.context("Seed pacer failed")?,
        }

        let (op, priority) = DemoOp::random();
        println!("{} #{:<3} {} {}", "queued".dimmed(), seq, paint(priority), op);

        let api = api.clone();
        tasks.spawn(async move {
            let outcome = op.run(&api, priority).await;
            (seq, op, priority, outcome)
        });
    }

    while !interrupted {
        tokio::select! {
            _ = &mut ctrl_c => interrupted = true,
            joined = tasks.join_next() => match joined {
                Some(Ok((seq, op, priority, outcome))) => {
                    let elapsed = format!("{:>6.2}s", started.elapsed().as_secs_f64());
                    match outcome {
                        Ok(post) => println!(
                            "{} {} #{:<3} {} {} -> id={} \"{}\"",
                            elapsed.dimmed(),
                            "done".green(),
                            seq,
                            paint(priority),
                            op,
                            post.id,
                            post.title
                        ),
                        Err(PostsError::Http(e)) if e.is_shutdown() => {
                            println!("{} {} #{:<3} {} {}: {}", elapsed.dimmed(), "gone".yellow(), seq, paint(priority), op, e)
                        }
                        Err(e) => println!("{} {} #{:<3} {} {}: {}", elapsed.dimmed(), "fail".red(), seq, paint(priority), op, e),
                    }
                }
                Some(Err(e)) => warn!(error = %e, "cmd_demo: request task failed"),
                None => break,
            },
        }
    }

    if interrupted {
        println!("{}", "Interrupted, closing client".yellow());
        tasks.abort_all();
    }

    client.close();
    client.stopped().await;

    let stats = client.stats();
    println!(
        "{} submitted={} succeeded={} failed={} in {:.2}s",
        "Finished".bold(),
        stats.submitted,
        stats.succeeded,
        stats.failed,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

async fn cmd_fetch(config: &Config, urls: &[String], priority: Priority) -> Result<()> {
    debug!(count = urls.len(), %priority, "cmd_fetch: called");
    let client = QueuedHttpClient::new(&config.http, &config.dispatcher).context("Failed to start HTTP client")?;

    let mut in_flight: FuturesUnordered<_> = urls
        .iter()
        .map(|url| {
            let client = &client;
            async move { (url, client.get(url, priority).await) }
        })
        .collect();

    let mut failures = 0;
    while let Some((url, result)) = in_flight.next().await {
        match result {
            Ok(response) => {
                let status = response.status();
                let line = format!("{} {}", status.as_u16(), url);
                if status.is_success() {
                    println!("{}", line.green());
                } else {
                    println!("{}", line.yellow());
                }
            }
            Err(e) => {
                failures += 1;
                let hint = if e.is_request_build() { " (not queued)" } else { "" };
                println!("{} {}{}: {}", "ERR".red(), url, hint, e);
            }
        }
    }

    client.close();

    if failures > 0 {
        return Err(eyre::eyre!("{} of {} requests failed", failures, urls.len()));
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    print!("{}", config.to_yaml()?);
    Ok(())
}
