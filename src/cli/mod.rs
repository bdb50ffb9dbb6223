//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了CLI命令行接口。

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "smartcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Log filter, e.g. 'smartcache=debug' (defaults to RUST_LOG)")]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(name = "versions", about = "Print the current version of every entity type")]
    Versions(VersionsArgs),

    #[command(name = "check", about = "Compare client versions against the current versions")]
    Check(CheckArgs),

    #[command(name = "purge", about = "Drop the collection and detail cache of one entity type")]
    Purge(PurgeArgs),

    #[command(name = "metrics", about = "Export entity version gauges read from the cache")]
    Metrics(MetricsArgs),
}

#[derive(Parser, Debug)]
pub struct VersionsArgs {
    #[arg(short, long, help = "Path to the TOML configuration file")]
    pub config: PathBuf,

    #[arg(short, long, help = "Output in JSON format")]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[arg(short, long, help = "Path to the TOML configuration file")]
    pub config: PathBuf,

    #[arg(long, default_value_t = 0, help = "Service version held by the client")]
    pub service: u64,

    #[arg(long, default_value_t = 0, help = "Story version held by the client")]
    pub story: u64,

    #[arg(long, default_value_t = 0, help = "Category version held by the client")]
    pub category: u64,

    #[arg(short, long, help = "Output in JSON format")]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct PurgeArgs {
    #[arg(short, long, help = "Path to the TOML configuration file")]
    pub config: PathBuf,

    #[arg(help = "Entity type: service, story or category")]
    pub entity: String,

    #[arg(short, long, help = "Skip the confirmation prompt")]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct MetricsArgs {
    #[arg(short, long, help = "Path to the TOML configuration file")]
    pub config: PathBuf,

    #[arg(short, long, help = "Entity type to query")]
    pub entity: Option<String>,

    #[arg(short, long, help = "Output in Prometheus format")]
    pub prometheus: bool,
}

mod admin;
mod check;
mod metrics;
mod versions;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::telemetry::init_tracing("smartcache", cli.log.as_deref());

    let result = match &cli.command {
        Commands::Versions(args) => versions::execute(args).await,
        Commands::Check(args) => check::execute(args).await,
        Commands::Purge(args) => admin::execute_purge(args).await,
        Commands::Metrics(args) => metrics::execute(args).await,
    };

    crate::telemetry::shutdown_tracing();
    result
}
