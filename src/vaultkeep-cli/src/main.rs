mod cli;
mod commands;
mod config;
mod dispatch;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vaultkeep=info,vaultkeep_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cache_dir = cli.cache_dir.as_deref();

    match cli.command {
        Commands::Configure {
            set_cache_dir,
            language,
            show,
        } => commands::configure::handle(set_cache_dir, language, show)?,

        Commands::Manifest { command } => dispatch::dispatch_manifest(cache_dir, command)?,

        Commands::Inventory { command } => dispatch::dispatch_inventory(cache_dir, command)?,

        Commands::Rolls {
            expression,
            archetype,
        } => commands::rolls::handle(cache_dir, &expression, archetype.as_deref())?,

        Commands::Components { perks } => commands::components::handle(perks),
    }

    Ok(())
}
