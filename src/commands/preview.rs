use alloy::primitives::Address;
use comfy_table::{Cell, ContentArrangement, Table};
use eyre::Result;
use serde_json::{Value, json};

use nexus_account_deployer::chain::RpcChain;
use nexus_account_deployer::config::DeployerConfig;
use nexus_account_deployer::orchestrator::{DeploymentOrchestrator, DeploymentPreview};
use crate::ui;

pub async fn run(
    config: &DeployerConfig,
    owner: Address,
    name: Option<String>,
    as_json: bool,
) -> Result<()> {
    let orchestrator =
        DeploymentOrchestrator::new(RpcChain::connect(config.rpc_url.clone()), config)?;
    let preview = orchestrator.preview(owner, name.as_deref()).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&preview_json(&preview))?);
        return Ok(());
    }

    ui::section("Deployment preview");
    ui::kv("function", preview.call.function_name());
    ui::kv(
        "existing name",
        &preview
            .name
            .as_ref()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "None detected".into()),
    );
    ui::address("predicted account", &format!("{}", preview.account_address));
    ui::kv("already deployed", ui::yes_no(preview.already_deployed));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![Cell::new("Field"), Cell::new("Value")]);
    table.add_row(vec![Cell::new("to"), Cell::new(preview.request.to)]);
    table.add_row(vec![Cell::new("value"), Cell::new(preview.request.value)]);
    table.add_row(vec![Cell::new("data"), Cell::new(&preview.request.data)]);
    table.add_row(vec![Cell::new("initData"), Cell::new(preview.call.init_data())]);
    table.add_row(vec![Cell::new("salt"), Cell::new(preview.call.salt())]);
    if let Some(name) = preview.call.name() {
        table.add_row(vec![Cell::new("name"), Cell::new(name)]);
    }

    println!();
    println!("{table}");

    if preview.already_deployed {
        ui::warn("account already exists; deploy would not send a transaction");
    }
    Ok(())
}

fn preview_json(preview: &DeploymentPreview) -> Value {
    let mut call_args = vec![
        json!(format!("{}", preview.call.init_data())),
        json!(format!("{}", preview.call.salt())),
    ];
    if let Some(name) = preview.call.name() {
        call_args.push(json!(name));
    }
    json!({
        "accountAddress": format!("{}", preview.account_address),
        "alreadyDeployed": preview.already_deployed,
        "snsName": preview.name.as_ref().map(|n| n.to_string()),
        "functionName": preview.call.function_name(),
        "to": format!("{}", preview.request.to),
        "data": format!("{}", preview.request.data),
        "value": preview.request.value.to_string(),
        "callArgs": call_args,
    })
}
