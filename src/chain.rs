//! Network access for the deployment flows.
//!
//! [`ChainConnector`] covers every read plus the receipt wait, [`ServiceSigner`] is the
//! single "sign and submit" capability. Both are backed by alloy providers in production
//! and by in-memory fakes in tests.

use std::future::Future;
use std::sync::Arc;

use alloy::{
    network::TransactionBuilder as _,
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol_types::SolError,
    transports::{TransportError, http::reqwest::Url},
};

use crate::evm::SnsRegistry;
use crate::names::{RevertClass, RevertClassifier};
use crate::tx::DeploymentRequest;

/// Transport or contract failure, with the revert payload when the node returned one.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ChainError {
    pub message: String,
    pub revert_data: Option<Bytes>,
}

impl ChainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            revert_data: None,
        }
    }

    pub fn reverted(message: impl Into<String>, data: Bytes) -> Self {
        Self {
            message: message.into(),
            revert_data: Some(data),
        }
    }
}

impl From<TransportError> for ChainError {
    fn from(err: TransportError) -> Self {
        let revert_data = err
            .as_error_resp()
            .and_then(|payload| payload.as_revert_data());
        Self {
            message: err.to_string(),
            revert_data,
        }
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub transaction_hash: TxHash,
    pub success: bool,
    pub block_number: Option<u64>,
}

pub trait ChainConnector: Send + Sync {
    /// `eth_call` against `to` with raw calldata.
    fn call(&self, to: Address, data: Bytes)
    -> impl Future<Output = Result<Bytes, ChainError>> + Send;

    fn code_at(&self, address: Address) -> impl Future<Output = Result<Bytes, ChainError>> + Send;

    fn balance(&self, address: Address) -> impl Future<Output = Result<U256, ChainError>> + Send;

    fn chain_id(&self) -> impl Future<Output = Result<u64, ChainError>> + Send;

    /// Blocks until `tx_hash` is included. No internal timeout.
    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Confirmation, ChainError>> + Send;
}

impl<T: ChainConnector> ChainConnector for Arc<T> {
    fn call(&self, to: Address, data: Bytes) -> impl Future<Output = Result<Bytes, ChainError>> + Send {
        (**self).call(to, data)
    }

    fn code_at(&self, address: Address) -> impl Future<Output = Result<Bytes, ChainError>> + Send {
        (**self).code_at(address)
    }

    fn balance(&self, address: Address) -> impl Future<Output = Result<U256, ChainError>> + Send {
        (**self).balance(address)
    }

    fn chain_id(&self) -> impl Future<Output = Result<u64, ChainError>> + Send {
        (**self).chain_id()
    }

    fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Confirmation, ChainError>> + Send {
        (**self).wait_for_receipt(tx_hash)
    }
}

pub trait ServiceSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and broadcast `request`, returning the transaction hash without waiting for inclusion.
    fn send(
        &self,
        request: &DeploymentRequest,
    ) -> impl Future<Output = Result<TxHash, ChainError>> + Send;
}

/// Read-only connector over an HTTP provider.
#[derive(Clone)]
pub struct RpcChain {
    provider: DynProvider,
}

impl RpcChain {
    pub fn connect(rpc_url: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self { provider }
    }
}

impl ChainConnector for RpcChain {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        Ok(self.provider.call(tx).await?)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn balance(&self, address: Address) -> Result<U256, ChainError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Confirmation, ChainError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(|e| ChainError::new(e.to_string()))?;
        Ok(Confirmation {
            transaction_hash: receipt.transaction_hash,
            success: receipt.status(),
            block_number: receipt.block_number,
        })
    }
}

/// Service signer holding a local private key.
///
/// Submissions are serialized so the wallet's nonce fetch and broadcast form one critical
/// section; concurrent deployments from this process cannot reuse a nonce.
pub struct LocalServiceSigner {
    address: Address,
    provider: DynProvider,
    submit_lock: tokio::sync::Mutex<()>,
}

impl LocalServiceSigner {
    pub fn connect(signer: PrivateKeySigner, rpc_url: Url) -> Self {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect_http(rpc_url)
            .erased();
        Self {
            address,
            provider,
            submit_lock: tokio::sync::Mutex::new(()),
        }
    }
}

impl ServiceSigner for LocalServiceSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send(&self, request: &DeploymentRequest) -> Result<TxHash, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.address)
            .with_to(request.to)
            .with_input(request.data.clone())
            .with_value(request.value);

        let _guard = self.submit_lock.lock().await;
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }
}

/// Recognizes the registry's "token does not exist" revert, by selector or by message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonexistentTokenClassifier;

impl RevertClassifier for NonexistentTokenClassifier {
    fn classify(&self, err: &ChainError) -> RevertClass {
        let selector_match = err
            .revert_data
            .as_ref()
            .is_some_and(|data| data.starts_with(&SnsRegistry::ERC721NonexistentToken::SELECTOR));
        let message = err.message.to_lowercase();
        if selector_match
            || message.contains("erc721nonexistenttoken")
            || message.contains("nonexistent token")
        {
            RevertClass::EntityNotFound
        } else {
            RevertClass::Other
        }
    }
}

#[cfg(test)]
pub mod mock {
    //! In-memory chain and signer used by the flow tests.

    use std::collections::HashMap;
    use std::sync::Arc;

    use alloy::{
        primitives::{Address, Bytes, TxHash, U256, keccak256},
        sol_types::{SolCall, SolValue},
    };
    use parking_lot::Mutex;

    use super::{ChainConnector, ChainError, Confirmation, ServiceSigner};
    use crate::evm::NexusAccountFactory;
    use crate::tx::DeploymentRequest;

    /// Stand-in for the factory's address derivation: keccak256(factory ++ initData ++ salt)[12..].
    pub fn mock_account_address(factory: Address, init_data: &[u8], salt: &[u8]) -> Address {
        let mut buf = Vec::with_capacity(20 + init_data.len() + salt.len());
        buf.extend_from_slice(factory.as_slice());
        buf.extend_from_slice(init_data);
        buf.extend_from_slice(salt);
        Address::from_slice(&keccak256(&buf)[12..])
    }

    #[derive(Default)]
    struct State {
        chain_id: u64,
        code: HashMap<Address, Bytes>,
        balances: HashMap<Address, U256>,
        responses: HashMap<[u8; 4], Result<Bytes, ChainError>>,
        calls: Vec<(Address, Bytes)>,
        predict_error: Option<ChainError>,
        balance_error: Option<ChainError>,
        revert_receipts: bool,
        receipts_waited: Vec<TxHash>,
    }

    #[derive(Default)]
    pub struct MockChain {
        state: Mutex<State>,
    }

    impl MockChain {
        pub fn new(chain_id: u64) -> Self {
            let chain = Self::default();
            chain.state.lock().chain_id = chain_id;
            chain
        }

        pub fn set_code(&self, address: Address, code: Bytes) {
            self.state.lock().code.insert(address, code);
        }

        pub fn set_balance(&self, address: Address, balance: U256) {
            self.state.lock().balances.insert(address, balance);
        }

        pub fn set_chain_id(&self, chain_id: u64) {
            self.state.lock().chain_id = chain_id;
        }

        /// Canned result for every call whose calldata starts with `selector`.
        pub fn respond(&self, selector: [u8; 4], result: Result<Bytes, ChainError>) {
            self.state.lock().responses.insert(selector, result);
        }

        pub fn fail_predictions(&self, err: ChainError) {
            self.state.lock().predict_error = Some(err);
        }

        pub fn fail_balance(&self, err: ChainError) {
            self.state.lock().balance_error = Some(err);
        }

        pub fn revert_receipts(&self) {
            self.state.lock().revert_receipts = true;
        }

        pub fn calls_with_selector(&self, selector: [u8; 4]) -> usize {
            self.state
                .lock()
                .calls
                .iter()
                .filter(|(_, data)| data.starts_with(&selector))
                .count()
        }

        pub fn receipts_waited(&self) -> Vec<TxHash> {
            self.state.lock().receipts_waited.clone()
        }
    }

    impl ChainConnector for MockChain {
        async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
            let mut state = self.state.lock();
            state.calls.push((to, data.clone()));

            if data.starts_with(&NexusAccountFactory::computeAccountAddressCall::SELECTOR) {
                if let Some(err) = &state.predict_error {
                    return Err(err.clone());
                }
                let call = NexusAccountFactory::computeAccountAddressCall::abi_decode(&data)
                    .map_err(|e| ChainError::new(e.to_string()))?;
                let address = mock_account_address(to, &call.initData, call.salt.as_slice());
                return Ok(Bytes::from(address.abi_encode()));
            }

            let selector: [u8; 4] = data
                .get(..4)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| ChainError::new("calldata shorter than a selector"))?;
            state
                .responses
                .get(&selector)
                .cloned()
                .unwrap_or_else(|| Err(ChainError::new("execution reverted")))
        }

        async fn code_at(&self, address: Address) -> Result<Bytes, ChainError> {
            Ok(self.state.lock().code.get(&address).cloned().unwrap_or_default())
        }

        async fn balance(&self, address: Address) -> Result<U256, ChainError> {
            let state = self.state.lock();
            if let Some(err) = &state.balance_error {
                return Err(err.clone());
            }
            Ok(state.balances.get(&address).copied().unwrap_or_default())
        }

        async fn chain_id(&self) -> Result<u64, ChainError> {
            Ok(self.state.lock().chain_id)
        }

        async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Confirmation, ChainError> {
            let mut state = self.state.lock();
            state.receipts_waited.push(tx_hash);
            Ok(Confirmation {
                transaction_hash: tx_hash,
                success: !state.revert_receipts,
                block_number: Some(1),
            })
        }
    }

    /// Signer that records submissions and, like the real factory, gives the predicted
    /// account code once a creation call is sent.
    pub struct MockSigner {
        address: Address,
        chain: Arc<MockChain>,
        sent: Mutex<Vec<DeploymentRequest>>,
        send_error: Option<ChainError>,
    }

    impl MockSigner {
        pub fn new(address: Address, chain: Arc<MockChain>) -> Self {
            Self {
                address,
                chain,
                sent: Mutex::new(Vec::new()),
                send_error: None,
            }
        }

        pub fn failing(address: Address, chain: Arc<MockChain>, err: ChainError) -> Self {
            Self {
                send_error: Some(err),
                ..Self::new(address, chain)
            }
        }

        pub fn sent(&self) -> Vec<DeploymentRequest> {
            self.sent.lock().clone()
        }
    }

    impl ServiceSigner for MockSigner {
        fn address(&self) -> Address {
            self.address
        }

        async fn send(&self, request: &DeploymentRequest) -> Result<TxHash, ChainError> {
            if let Some(err) = &self.send_error {
                return Err(err.clone());
            }

            let (init_data, salt) =
                if let Ok(call) = NexusAccountFactory::createAccountCall::abi_decode(&request.data) {
                    (call.initData, call.salt)
                } else {
                    let call = NexusAccountFactory::createAccountWithNameCall::abi_decode(&request.data)
                        .map_err(|e| ChainError::new(e.to_string()))?;
                    (call.initData, call.salt)
                };
            let account = mock_account_address(request.to, &init_data, salt.as_slice());
            self.chain
                .set_code(account, Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]));

            let mut sent = self.sent.lock();
            sent.push(request.clone());
            Ok(keccak256(U256::from(sent.len()).to_be_bytes::<32>()))
        }
    }
}
