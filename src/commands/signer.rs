use eyre::Result;

use nexus_account_deployer::chain::{ChainConnector, RpcChain};
use nexus_account_deployer::config::{DeployerConfig, parse_service_key};
use nexus_account_deployer::preflight::wei_to_display;
use crate::ui;

pub async fn run(config: &DeployerConfig, private_key: Option<String>) -> Result<()> {
    let signer = parse_service_key(private_key.as_deref())?;
    let address = signer.address();
    let chain = RpcChain::connect(config.rpc_url.clone());

    ui::section("Service signer");
    ui::address("address", &format!("{address}"));

    let balance = chain.balance(address).await?;
    let display = wei_to_display(balance);
    if balance.is_zero() {
        ui::warn(&format!(
            "0 {}, fund the service signer before deploying",
            config.token_symbol
        ));
    } else {
        ui::kv("balance", &format!("{display} {}", config.token_symbol));
    }
    Ok(())
}
