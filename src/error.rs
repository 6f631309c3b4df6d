use alloy::primitives::{Address, TxHash};

use crate::chain::ChainError;

/// Failures surfaced by the deployment flows.
///
/// Name resolution failures never appear here; they are reported as "no record".
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("failed to {context}: {source}")]
    Rpc {
        context: &'static str,
        #[source]
        source: ChainError,
    },

    #[error("failed to decode {context} result: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: alloy::sol_types::Error,
    },

    #[error("no bootstrap module configured; pass --bootstrap or set BOOTSTRAP_ADDRESS")]
    MissingBootstrap,

    #[error("rpc endpoint serves chain {actual}, expected chain {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("service signer {signer} has no balance for gas; top up the service signer and retry")]
    SignerUnfunded { signer: Address },

    #[error("failed to submit deployment transaction: {0}")]
    Submit(#[source] ChainError),

    #[error("failed to confirm deployment transaction {tx_hash}: {source}")]
    Confirm {
        tx_hash: TxHash,
        #[source]
        source: ChainError,
    },

    #[error("deployment transaction {tx_hash} reverted on-chain")]
    Reverted { tx_hash: TxHash },
}

impl DeployError {
    pub(crate) fn rpc(context: &'static str) -> impl FnOnce(ChainError) -> Self {
        move |source| Self::Rpc { context, source }
    }

    pub(crate) fn decode(context: &'static str) -> impl FnOnce(alloy::sol_types::Error) -> Self {
        move |source| Self::Decode { context, source }
    }

    /// Revert data attached to the underlying chain error, if the node returned any.
    pub fn revert_data(&self) -> Option<&[u8]> {
        match self {
            Self::Rpc { source, .. } | Self::Submit(source) | Self::Confirm { source, .. } => {
                source.revert_data.as_ref().map(|data| data.as_ref())
            }
            _ => None,
        }
    }
}
