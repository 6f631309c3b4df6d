use alloy::{
    primitives::{Address, B256, Bytes, U256},
    sol_types::SolCall,
};

use crate::evm::NexusAccountFactory;

/// The exact envelope submitted on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// Which factory entry point creates the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryCall {
    PlainCreate { init_data: Bytes, salt: B256 },
    CreateWithName { init_data: Bytes, salt: B256, name: String },
}

impl FactoryCall {
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::PlainCreate { .. } => "createAccount",
            Self::CreateWithName { .. } => "createAccountWithName",
        }
    }

    pub fn init_data(&self) -> &Bytes {
        match self {
            Self::PlainCreate { init_data, .. } | Self::CreateWithName { init_data, .. } => init_data,
        }
    }

    pub fn salt(&self) -> B256 {
        match self {
            Self::PlainCreate { salt, .. } | Self::CreateWithName { salt, .. } => *salt,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::PlainCreate { .. } => None,
            Self::CreateWithName { name, .. } => Some(name),
        }
    }

    pub fn abi_encode(&self) -> Bytes {
        let encoded = match self {
            Self::PlainCreate { init_data, salt } => NexusAccountFactory::createAccountCall {
                initData: init_data.clone(),
                salt: *salt,
            }
            .abi_encode(),
            Self::CreateWithName {
                init_data,
                salt,
                name,
            } => NexusAccountFactory::createAccountWithNameCall {
                initData: init_data.clone(),
                salt: *salt,
                name: name.clone(),
            }
            .abi_encode(),
        };
        Bytes::from(encoded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltDeployment {
    pub call: FactoryCall,
    pub request: DeploymentRequest,
}

/// Builds factory calls; shared by the preview and deploy paths so both produce the same bytes.
#[derive(Debug, Clone, Copy)]
pub struct TransactionBuilder {
    factory: Address,
}

impl TransactionBuilder {
    pub fn new(factory: Address) -> Self {
        Self { factory }
    }

    /// `name` selects `createAccountWithName` when present and non-empty.
    pub fn build(&self, init_data: Bytes, salt: B256, name: Option<&str>) -> BuiltDeployment {
        let call = match name.filter(|n| !n.is_empty()) {
            Some(name) => FactoryCall::CreateWithName {
                init_data,
                salt,
                name: name.to_string(),
            },
            None => FactoryCall::PlainCreate { init_data, salt },
        };
        let request = DeploymentRequest {
            to: self.factory,
            data: call.abi_encode(),
            value: U256::ZERO,
        };
        BuiltDeployment { call, request }
    }
}
