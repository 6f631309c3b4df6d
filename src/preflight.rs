use alloy::primitives::{Address, U256, utils::format_ether};
use tracing::info;

use crate::chain::ChainConnector;
use crate::error::DeployError;

/// Read the service signer's balance; an empty signer cannot pay for any deployment.
pub async fn check_signer_balance<C: ChainConnector>(
    chain: &C,
    signer: Address,
    token_symbol: &str,
) -> Result<U256, DeployError> {
    let balance = chain
        .balance(signer)
        .await
        .map_err(DeployError::rpc("read service signer balance"))?;
    info!(%signer, "service signer balance: {} {token_symbol}", wei_to_display(balance));

    if balance.is_zero() {
        return Err(DeployError::SignerUnfunded { signer });
    }
    Ok(balance)
}

/// Verify the endpoint serves the chain the transaction will be signed for.
pub async fn check_chain_id<C: ChainConnector>(chain: &C, expected: u64) -> Result<(), DeployError> {
    let actual = chain
        .chain_id()
        .await
        .map_err(DeployError::rpc("read chain id"))?;
    if actual != expected {
        return Err(DeployError::ChainMismatch { expected, actual });
    }
    Ok(())
}

/// Ether amount with trailing zero decimals dropped, e.g. `1.5` or `0`.
pub fn wei_to_display(wei: U256) -> String {
    let ether = format_ether(wei);
    match ether.split_once('.') {
        Some((whole, fraction)) => match fraction.trim_end_matches('0') {
            "" => whole.to_string(),
            fraction => format!("{whole}.{fraction}"),
        },
        None => ether,
    }
}
