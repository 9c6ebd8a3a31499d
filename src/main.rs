use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tideline::app::AppContext;
use tideline::cli::{commands, Cli, Commands};
use tideline::config::Config;
use tideline::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Commands::Check { path } = &cli.command {
        commands::check(path)?;
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(workers) = cli.workers {
        config.workers = workers;
        config.validate()?;
    }

    match cli.command {
        Commands::Run { dry_run } => {
            let ctx = AppContext::from_config(config).await?;
            commands::run(&ctx, dry_run).await?;
        }
        Commands::Sources => {
            let store = SqliteStore::new(config.watermark_db_path()?)?;
            commands::list_sources(&config, &store)?;
        }
        Commands::Check { .. } => {}
    }

    Ok(())
}
