use alloy::{
    primitives::{Address, B256, Bytes},
    sol_types::SolCall,
};
use tracing::debug;

use crate::chain::ChainConnector;
use crate::error::DeployError;
use crate::evm::{NexusAccountFactory, encode_bootstrap_call, encode_init_data};

/// Counterfactual account address together with the init data it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub init_data: Bytes,
    pub account_address: Address,
}

#[derive(Debug, Clone, Copy)]
pub struct AddressPredictor {
    factory: Address,
    bootstrap: Address,
}

impl AddressPredictor {
    pub fn new(factory: Address, bootstrap: Address) -> Self {
        Self { factory, bootstrap }
    }

    /// Init data passed to both `computeAccountAddress` and the creation call.
    pub fn init_data(&self, owner: Address) -> Bytes {
        encode_init_data(self.bootstrap, encode_bootstrap_call(owner))
    }

    /// Ask the factory where the account for `(owner, salt)` lives.
    pub async fn predict<C: ChainConnector>(
        &self,
        chain: &C,
        owner: Address,
        salt: B256,
    ) -> Result<Prediction, DeployError> {
        let init_data = self.init_data(owner);
        let call = NexusAccountFactory::computeAccountAddressCall {
            initData: init_data.clone(),
            salt,
        };
        let raw = chain
            .call(self.factory, Bytes::from(call.abi_encode()))
            .await
            .map_err(DeployError::rpc("predict account address"))?;
        let account_address =
            NexusAccountFactory::computeAccountAddressCall::abi_decode_returns(&raw)
                .map_err(DeployError::decode("computeAccountAddress"))?;
        debug!(%owner, %account_address, "predicted account address");

        Ok(Prediction {
            init_data,
            account_address,
        })
    }
}

/// An address counts as deployed once it has any bytecode.
pub async fn is_deployed<C: ChainConnector>(chain: &C, address: Address) -> Result<bool, DeployError> {
    let code = chain
        .code_at(address)
        .await
        .map_err(DeployError::rpc("read account bytecode"))?;
    Ok(!code.is_empty())
}
