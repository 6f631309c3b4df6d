use alloy::primitives::Address;
use eyre::Result;

use nexus_account_deployer::chain::RpcChain;
use nexus_account_deployer::config::DeployerConfig;
use nexus_account_deployer::names::NameResolver;
use crate::ui;

pub async fn resolve(config: &DeployerConfig, address: Address) -> Result<()> {
    let chain = RpcChain::connect(config.rpc_url.clone());
    let resolver = NameResolver::new(config.registry);

    ui::section("Resolve name");
    ui::address("address", &format!("{address}"));
    match resolver.resolve_name(&chain, address).await {
        Some(record) => ui::success(&format!("registered as {record}")),
        None => ui::info("no name registered"),
    }
    Ok(())
}

pub async fn available(config: &DeployerConfig, name: &str) -> Result<()> {
    let chain = RpcChain::connect(config.rpc_url.clone());
    let resolver = NameResolver::new(config.registry);

    ui::section("Name availability");
    let suffix = resolver.domain_suffix(&chain).await;
    let full_name = format!("{}.{suffix}", name.trim());
    if resolver.is_name_available(&chain, name).await? {
        ui::success(&format!("{full_name} is available"));
    } else {
        ui::warn(&format!("{full_name} is already taken"));
    }
    Ok(())
}
