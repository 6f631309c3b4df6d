use alloy::primitives::Address;
use eyre::Result;

use nexus_account_deployer::chain::RpcChain;
use nexus_account_deployer::config::DeployerConfig;
use nexus_account_deployer::orchestrator::DeploymentOrchestrator;
use crate::ui;

pub async fn run(config: &DeployerConfig, owner: Address) -> Result<()> {
    let orchestrator =
        DeploymentOrchestrator::new(RpcChain::connect(config.rpc_url.clone()), config)?;

    ui::section("Predict account");
    ui::address("owner", &format!("{owner}"));
    ui::kv("salt", &format!("{}", orchestrator.salt()));

    let account = orchestrator.predict(owner).await?;
    ui::address("predicted account", &format!("{account}"));
    Ok(())
}
