use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use eyre::Result;

use nexus_account_deployer::config::{
    DeployerConfig, NEXUS_ACCOUNT_FACTORY, SOPHON_SNS_REGISTRY, SOPHON_TESTNET_CHAIN_ID,
    SOPHON_TESTNET_RPC,
};

#[derive(Parser)]
#[command(name = "nexus-account-deployer", version)]
pub struct Cli {
    #[command(flatten)]
    pub network: NetworkArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Network and contract layout (flags override environment variables)
#[derive(Args)]
pub struct NetworkArgs {
    #[arg(long, global = true, env = "RPC_URL", default_value = SOPHON_TESTNET_RPC)]
    pub rpc_url: String,

    #[arg(long, global = true, env = "CHAIN_ID", default_value_t = SOPHON_TESTNET_CHAIN_ID)]
    pub chain_id: u64,

    #[arg(long, global = true, env = "FACTORY_ADDRESS", default_value_t = NEXUS_ACCOUNT_FACTORY)]
    pub factory: Address,

    /// Nexus bootstrap module used to initialize new accounts (predict, preview, deploy)
    #[arg(long, global = true, env = "BOOTSTRAP_ADDRESS")]
    pub bootstrap: Option<Address>,

    #[arg(long, global = true, env = "SNS_REGISTRY_ADDRESS", default_value_t = SOPHON_SNS_REGISTRY)]
    pub registry: Address,

    /// Block explorer base for transaction links, e.g. https://explorer.example.org
    #[arg(long, global = true, env = "EXPLORER_URL")]
    pub explorer_url: Option<String>,

    #[arg(long, global = true, env = "TOKEN_SYMBOL", default_value = "SOPH")]
    pub token_symbol: String,
}

impl NetworkArgs {
    pub fn into_config(self) -> Result<DeployerConfig> {
        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| eyre::eyre!("invalid rpc url {}: {e}", self.rpc_url))?;

        let mut config = DeployerConfig::sophon_testnet()?;
        config.bootstrap = self.bootstrap;
        config.chain_id = self.chain_id;
        config.rpc_url = rpc_url;
        config.factory = self.factory;
        config.registry = self.registry;
        config.token_symbol = self.token_symbol;
        config.explorer_url = self.explorer_url.filter(|url| !url.is_empty());
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the counterfactual account address for an owner
    Predict {
        #[arg(long)]
        owner: Address,
    },

    /// Build the deployment transaction without sending it
    Preview {
        #[arg(long)]
        owner: Address,
        /// Sophon name to register during account creation
        #[arg(long)]
        name: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deploy the account for an owner unless it already exists
    Deploy {
        #[arg(long)]
        owner: Address,
        /// Sophon name to register during account creation
        #[arg(long)]
        name: Option<String>,
        /// Service signer key (hex, with or without 0x prefix)
        #[arg(long, env = "SERVICE_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up the Sophon name registered to an address
    Resolve {
        #[arg(long)]
        address: Address,
    },

    /// Check whether a Sophon name can still be registered
    Available {
        #[arg(long)]
        name: String,
    },

    /// Show the service signer address and balance
    Signer {
        #[arg(long, env = "SERVICE_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },
}
