use alloy::{
    primitives::{Address, address},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use eyre::Result;

use crate::error::DeployError;

pub const SOPHON_TESTNET_CHAIN_ID: u64 = 531050204;
pub const SOPHON_TESTNET_RPC: &str = "https://zksync-os-testnet-sophon.zksync.dev";
pub const NEXUS_ACCOUNT_FACTORY: Address = address!("0x84b68EaCE123e6a86dBb6F054af7248B2A0537FC");
pub const SOPHON_SNS_REGISTRY: Address = address!("0xB6207614218417c7D7da669313143051AAe6b365");

/// Network and contract layout the deployer targets.
#[derive(Debug, Clone)]
pub struct DeployerConfig {
    pub chain_id: u64,
    pub rpc_url: Url,
    pub factory: Address,
    /// Nexus bootstrap module; only the account-creating flows need it.
    pub bootstrap: Option<Address>,
    pub registry: Address,
    pub token_symbol: String,
    /// Browsable explorer base used for transaction links.
    pub explorer_url: Option<String>,
    /// Index mixed into the salt; only the first account per owner is deployed today.
    pub account_index: u64,
}

impl DeployerConfig {
    /// Sophon testnet layout. No bootstrap module is set.
    pub fn sophon_testnet() -> Result<Self> {
        Ok(Self {
            chain_id: SOPHON_TESTNET_CHAIN_ID,
            rpc_url: SOPHON_TESTNET_RPC.parse()?,
            factory: NEXUS_ACCOUNT_FACTORY,
            bootstrap: None,
            registry: SOPHON_SNS_REGISTRY,
            token_symbol: "SOPH".to_string(),
            explorer_url: None,
            account_index: 0,
        })
    }

    pub fn with_bootstrap(mut self, bootstrap: Address) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    pub fn require_bootstrap(&self) -> Result<Address, DeployError> {
        self.bootstrap.ok_or(DeployError::MissingBootstrap)
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
    }
}

/// Parse the service signer key (hex, with or without 0x prefix).
pub fn parse_service_key(private_key: Option<&str>) -> Result<PrivateKeySigner> {
    let key = private_key.ok_or_else(|| {
        eyre::eyre!("no service signer key: pass --private-key or set SERVICE_PRIVATE_KEY")
    })?;
    key.trim()
        .parse()
        .map_err(|e| eyre::eyre!("invalid service signer private key: {e}"))
}
