use anyhow::Result;
use clap::Parser;
use tracing::debug;

use minote_cli::{
    cli::{Cli, Commands},
    commands, logging,
};
use minote_config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(cli.config.as_deref()).await?;
    logging::init(logging::effective_level(
        cli.requested_level(),
        &config.logging.level,
    ));
    debug!("Ledger at {}", config.ledger_path().display());

    match cli.command {
        Commands::Sync { force, cookie } => {
            ConfigLoader::apply_cookie_override(&mut config, cookie);
            commands::sync::execute(config, force).await?
        }
        Commands::Status => commands::status::execute(config).await?,
        Commands::Reset => commands::reset::execute(config).await?,
    }

    Ok(())
}
