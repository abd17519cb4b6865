mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fetch_cache::{CacheResolver, Decompression, Loader};
use fetch_cache_http::CachedFetcher;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "fetch-cache")]
#[command(about = "Fetch JSON documents into a local cache, downloading only when they change")]
struct Cli {
    /// Use this cache directory instead of the configured one
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh a cached resource from its URL and print it
    Fetch {
        /// Resource name (relative to the cache directory) or absolute path
        name: String,
        /// Source URL
        url: String,
        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
        /// Do not draw a progress bar
        #[arg(long, short)]
        quiet: bool,
    },
    /// Print the cached copy of a resource without contacting the server
    Load {
        /// Resource name or absolute path
        name: String,
        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Print where a resource is cached
    Path {
        /// Resource name or absolute path
        name: String,
    },
    /// Show what is cached for a resource and how it would be revalidated
    Status {
        /// Resource name or absolute path
        name: String,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_resolver(config: &AppConfig) -> Result<CacheResolver> {
    match &config.cache_dir {
        Some(dir) => Ok(CacheResolver::new(dir)),
        None => CacheResolver::user_default().context("could not determine cache directory"),
    }
}

fn build_loader(config: &AppConfig) -> Result<Loader> {
    let decompression = Decompression::from_mode(config.decompression)
        .context("could not set up decompression")?;
    Ok(Loader::new(decompression))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut app_config = config::load_config();
    if let Some(dir) = cli.cache_dir {
        app_config.cache_dir = Some(dir);
    }

    match cli.command {
        Command::Fetch {
            name,
            url,
            compact,
            quiet,
        } => {
            let fetcher = CachedFetcher::new(app_config.fetcher_config())
                .context("failed to set up fetcher")?;
            commands::fetch::run(&fetcher, &name, &url, compact, quiet).await
        }
        Command::Load { name, compact } => {
            let resolver = build_resolver(&app_config)?;
            let loader = build_loader(&app_config)?;
            commands::load::run(&resolver, &loader, &name, compact)
        }
        Command::Path { name } => {
            let resolver = build_resolver(&app_config)?;
            commands::path::run(&resolver, &name)
        }
        Command::Status { name } => {
            let resolver = build_resolver(&app_config)?;
            commands::status::run(&resolver, &name)
        }
    }
}
