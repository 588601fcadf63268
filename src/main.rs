use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use panels::app::AppContext;
use panels::cli::commands::{self, FeedOptions};
use panels::cli::{Cli, Commands};
use panels::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Characters { page } => {
            commands::list_characters(&ctx, page).await?;
        }
        Commands::Character { id } => {
            commands::show_character(&ctx, id).await?;
        }
        Commands::Feed {
            id,
            kind,
            pages,
            prefetch,
            hero,
        } => {
            commands::show_feed(
                &ctx,
                FeedOptions {
                    character_id: id,
                    kind,
                    pages,
                    prefetch,
                    hero,
                },
            )
            .await?;
        }
    }

    Ok(())
}
