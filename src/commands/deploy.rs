use std::time::Instant;

use alloy::primitives::Address;
use eyre::Result;
use serde_json::json;

use nexus_account_deployer::chain::{LocalServiceSigner, RpcChain};
use nexus_account_deployer::config::{DeployerConfig, parse_service_key};
use nexus_account_deployer::orchestrator::DeploymentOrchestrator;
use crate::ui;

pub async fn run(
    config: &DeployerConfig,
    owner: Address,
    name: Option<String>,
    private_key: Option<String>,
    as_json: bool,
) -> Result<()> {
    let signer = parse_service_key(private_key.as_deref())?;
    let orchestrator = DeploymentOrchestrator::new(RpcChain::connect(config.rpc_url.clone()), config)?
        .with_signer(LocalServiceSigner::connect(signer, config.rpc_url.clone()));

    if !as_json {
        ui::section("Deploy account");
        ui::address("owner", &format!("{owner}"));
        ui::address("service signer", &format!("{}", orchestrator.signer_address()));
        if let Some(ref name) = name {
            ui::kv("name", name);
        }
    }

    let start = Instant::now();
    let spinner = (!as_json).then(|| ui::wait_spinner("deploying account..."));
    let outcome = orchestrator.deploy(owner, name.as_deref()).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = outcome?;

    if as_json {
        let out = json!({
            "accountAddress": format!("{}", result.account_address),
            "alreadyDeployed": result.already_deployed,
            "transactionHash": result.transaction_hash.map(|h| format!("{h}")),
            "snsName": result.name.as_ref().map(|n| n.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    ui::address("account", &format!("{}", result.account_address));
    ui::kv("already deployed", ui::yes_no(result.already_deployed));
    match result.transaction_hash {
        Some(hash) => {
            let hash = format!("{hash}");
            ui::tx_hash("tx hash", &hash);
            if let Some(url) = config.explorer_tx_url(&hash) {
                ui::kv("explorer", &url);
            }
            ui::success(&format!("account deployed in {}", ui::format_elapsed(start)));
        }
        None => ui::info("account already exists, no transaction sent"),
    }
    if let Some(record) = &result.name {
        ui::kv("sns name", &record.to_string());
    }
    Ok(())
}
