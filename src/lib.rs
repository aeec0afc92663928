pub mod analytics;
pub mod cli;
pub mod data;
pub mod dataset;
pub mod extract;
pub mod followups;
pub mod import;
pub mod io_utils;
pub mod leads;
pub mod mapping;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod split;
pub mod store;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};
use crate::persist::{FileGateway, PersistenceGateway};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("lead_managed", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let gateway = FileGateway::new(&cli.data_dir)
        .with_context(|| format!("Opening data directory {:?}", cli.data_dir))?;

    match &cli.command {
        Commands::Import(args) => import::execute_import(args, &gateway),
        Commands::Probe(args) => import::execute_probe(args),
        Commands::List(args) => leads::execute_list(args, &gateway),
        Commands::Show(args) => leads::execute_show(args, &gateway),
        Commands::Status(args) => leads::execute_status(args, &gateway),
        Commands::Priority(args) => leads::execute_priority(args, &gateway),
        Commands::Schedule(args) => followups::execute_schedule(args, &gateway),
        Commands::Note(args) => leads::execute_note(args, &gateway),
        Commands::Complete(args) => followups::execute_complete(args, &gateway),
        Commands::Overdue => followups::execute_overdue(&gateway),
        Commands::Upcoming(args) => followups::execute_upcoming(args, &gateway),
        Commands::Daily(args) => followups::execute_daily(args, &gateway),
        Commands::Analytics => analytics::execute(&gateway),
        Commands::Backup(args) => handle_backup(args, &gateway),
        Commands::Stats => handle_stats(&gateway),
    }
}

fn handle_backup(args: &cli::BackupArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let target = gateway
        .backup(args.dest.as_deref())
        .context("Creating backup")?;
    info!("Backup written to {target:?}");
    Ok(())
}

fn handle_stats(gateway: &dyn PersistenceGateway) -> Result<()> {
    let stats = gateway.stats().context("Reading persistence statistics")?;
    println!("Datasets stored:  {}", stats.dataset_count);
    println!("Recorded updates: {}", stats.update_count);
    println!("Size on disk:     {} byte(s)", stats.size_bytes);
    println!("Location:         {}", stats.location.display());
    Ok(())
}
