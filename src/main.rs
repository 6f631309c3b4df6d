mod cli;
mod ui;

mod commands {
    pub mod deploy;
    pub mod names;
    pub mod predict;
    pub mod preview;
    pub mod signer;
}

use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use nexus_account_deployer::DeployError;
use nexus_account_deployer::evm::decode_revert_data;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.network.into_config()?;

    let outcome = match cli.command {
        Commands::Predict { owner } => commands::predict::run(&config, owner).await,
        Commands::Preview { owner, name, json } => {
            commands::preview::run(&config, owner, name, json).await
        }
        Commands::Deploy {
            owner,
            name,
            private_key,
            json,
        } => commands::deploy::run(&config, owner, name, private_key, json).await,
        Commands::Resolve { address } => commands::names::resolve(&config, address).await,
        Commands::Available { name } => commands::names::available(&config, &name).await,
        Commands::Signer { private_key } => commands::signer::run(&config, private_key).await,
    };

    if let Err(report) = &outcome
        && let Some(data) = report
            .downcast_ref::<DeployError>()
            .and_then(DeployError::revert_data)
    {
        ui::error(&decode_revert_data(data));
    }
    outcome
}
