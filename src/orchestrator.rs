//! End-to-end account deployment.
//!
//! Every call re-reads on-chain state; nothing about in-flight deployments is remembered.
//! Two concurrent deploys for the same owner can both see "not deployed" and both submit.
//! The factory only creates the account once, so the loser's transaction is redundant.

use alloy::primitives::{Address, B256, Bytes, TxHash};
use tracing::info;

use crate::chain::{ChainConnector, NonexistentTokenClassifier, ServiceSigner};
use crate::config::DeployerConfig;
use crate::error::DeployError;
use crate::evm::salt_for_index;
use crate::names::{NameRecord, NameResolver, RevertClassifier, normalize_name};
use crate::predict::{AddressPredictor, is_deployed};
use crate::preflight::{check_chain_id, check_signer_balance};
use crate::tx::{DeploymentRequest, FactoryCall, TransactionBuilder};

/// Everything the deploy path would submit, without submitting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPreview {
    pub account_address: Address,
    pub already_deployed: bool,
    pub name: Option<NameRecord>,
    pub call: FactoryCall,
    pub request: DeploymentRequest,
    pub init_data: Bytes,
    pub salt: B256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub account_address: Address,
    pub already_deployed: bool,
    /// `None` exactly when the account already existed.
    pub transaction_hash: Option<TxHash>,
    pub name: Option<NameRecord>,
}

/// Orchestrator without a signer; can preview but not deploy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnly;

pub struct DeploymentOrchestrator<C, S = ReadOnly, K = NonexistentTokenClassifier> {
    chain: C,
    signer: S,
    chain_id: u64,
    token_symbol: String,
    account_index: u64,
    predictor: AddressPredictor,
    names: NameResolver<K>,
    builder: TransactionBuilder,
}

impl<C: ChainConnector> DeploymentOrchestrator<C> {
    /// Fails with [`DeployError::MissingBootstrap`] when `config` has no bootstrap module.
    pub fn new(chain: C, config: &DeployerConfig) -> Result<Self, DeployError> {
        Ok(Self {
            chain,
            signer: ReadOnly,
            chain_id: config.chain_id,
            token_symbol: config.token_symbol.clone(),
            account_index: config.account_index,
            predictor: AddressPredictor::new(config.factory, config.require_bootstrap()?),
            names: NameResolver::new(config.registry),
            builder: TransactionBuilder::new(config.factory),
        })
    }
}

impl<C: ChainConnector, S, K: RevertClassifier> DeploymentOrchestrator<C, S, K> {
    pub fn with_signer<T: ServiceSigner>(self, signer: T) -> DeploymentOrchestrator<C, T, K> {
        DeploymentOrchestrator {
            chain: self.chain,
            signer,
            chain_id: self.chain_id,
            token_symbol: self.token_symbol,
            account_index: self.account_index,
            predictor: self.predictor,
            names: self.names,
            builder: self.builder,
        }
    }

    /// Swap in a resolver with its own classifier or a shared suffix cache.
    pub fn with_name_resolver<R: RevertClassifier>(
        self,
        names: NameResolver<R>,
    ) -> DeploymentOrchestrator<C, S, R> {
        DeploymentOrchestrator {
            chain: self.chain,
            signer: self.signer,
            chain_id: self.chain_id,
            token_symbol: self.token_symbol,
            account_index: self.account_index,
            predictor: self.predictor,
            names,
            builder: self.builder,
        }
    }

    pub fn name_resolver(&self) -> &NameResolver<K> {
        &self.names
    }

    pub fn salt(&self) -> B256 {
        salt_for_index(self.account_index)
    }

    /// Predicted account address for `owner`.
    pub async fn predict(&self, owner: Address) -> Result<Address, DeployError> {
        let prediction = self.predictor.predict(&self.chain, owner, self.salt()).await?;
        Ok(prediction.account_address)
    }

    /// Build the deployment request for `owner` without touching the signer.
    pub async fn preview(
        &self,
        owner: Address,
        name: Option<&str>,
    ) -> Result<DeploymentPreview, DeployError> {
        let name = normalize_name(name)?;
        let salt = self.salt();

        let prediction = self.predictor.predict(&self.chain, owner, salt).await?;
        let already_deployed = is_deployed(&self.chain, prediction.account_address).await?;
        let record = self
            .names
            .resolve_name(&self.chain, prediction.account_address)
            .await;
        let built = self
            .builder
            .build(prediction.init_data.clone(), salt, name.as_deref());

        Ok(DeploymentPreview {
            account_address: prediction.account_address,
            already_deployed,
            name: record,
            call: built.call,
            request: built.request,
            init_data: prediction.init_data,
            salt,
        })
    }
}

impl<C: ChainConnector, S: ServiceSigner, K: RevertClassifier> DeploymentOrchestrator<C, S, K> {
    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Deploy the account for `owner` unless it already exists, waiting for inclusion.
    pub async fn deploy(
        &self,
        owner: Address,
        name: Option<&str>,
    ) -> Result<DeploymentResult, DeployError> {
        let name = normalize_name(name)?;
        let salt = self.salt();

        let prediction = self.predictor.predict(&self.chain, owner, salt).await?;
        let account_address = prediction.account_address;
        info!(%owner, %account_address, "predicted account");

        if is_deployed(&self.chain, account_address).await? {
            info!(%account_address, "account already deployed");
            return Ok(DeploymentResult {
                account_address,
                already_deployed: true,
                transaction_hash: None,
                name: None,
            });
        }

        let record = self.names.resolve_name(&self.chain, account_address).await;
        let built = self
            .builder
            .build(prediction.init_data, salt, name.as_deref());

        check_chain_id(&self.chain, self.chain_id).await?;
        check_signer_balance(&self.chain, self.signer.address(), &self.token_symbol).await?;

        info!(function = built.call.function_name(), "sending factory transaction");
        let tx_hash = self
            .signer
            .send(&built.request)
            .await
            .map_err(DeployError::Submit)?;
        info!(%tx_hash, "factory transaction submitted");

        let confirmation = self
            .chain
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|source| DeployError::Confirm { tx_hash, source })?;
        if !confirmation.success {
            return Err(DeployError::Reverted { tx_hash });
        }
        info!(
            tx_hash = %confirmation.transaction_hash,
            block = ?confirmation.block_number,
            "account deployed"
        );

        Ok(DeploymentResult {
            account_address,
            already_deployed: false,
            transaction_hash: Some(tx_hash),
            name: record,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::{
        primitives::{U256, address},
        sol_types::{SolCall, SolValue},
    };

    use super::*;
    use crate::chain::ChainError;
    use crate::chain::mock::{MockChain, MockSigner};
    use crate::evm::{NexusAccountFactory, SnsRegistry};
    use crate::names::{RevertClass, SuffixCache};

    const OWNER: Address = address!("0x1111111111111111111111111111111111111111");
    const SIGNER: Address = address!("0x4444444444444444444444444444444444444444");
    const BOOTSTRAP: Address = address!("0x00000000000000000000000000000000000b0075");

    fn config() -> DeployerConfig {
        DeployerConfig::sophon_testnet()
            .unwrap()
            .with_bootstrap(BOOTSTRAP)
    }

    fn funded_chain() -> Arc<MockChain> {
        let chain = Arc::new(MockChain::new(config().chain_id));
        chain.set_balance(SIGNER, U256::from(10).pow(U256::from(18)));
        chain
    }

    fn setup(chain: &Arc<MockChain>) -> DeploymentOrchestrator<Arc<MockChain>, MockSigner> {
        DeploymentOrchestrator::new(chain.clone(), &config())
            .unwrap()
            .with_signer(MockSigner::new(SIGNER, chain.clone()))
    }

    #[tokio::test]
    async fn second_deploy_is_a_no_op() {
        let chain = funded_chain();
        let orchestrator = setup(&chain);

        let first = orchestrator.deploy(OWNER, None).await.unwrap();
        assert!(!first.already_deployed);
        assert!(first.transaction_hash.is_some());

        let second = orchestrator.deploy(OWNER, None).await.unwrap();
        assert!(second.already_deployed);
        assert_eq!(second.transaction_hash, None);
        assert_eq!(second.account_address, first.account_address);
        assert_eq!(orchestrator.signer.sent().len(), 1);
    }

    #[tokio::test]
    async fn preview_matches_submitted_request() {
        for name in [None, Some("alice")] {
            let chain = funded_chain();
            let orchestrator = setup(&chain);

            let preview = orchestrator.preview(OWNER, name).await.unwrap();
            let result = orchestrator.deploy(OWNER, name).await.unwrap();

            assert_eq!(preview.account_address, result.account_address);
            assert_eq!(orchestrator.signer.sent(), vec![preview.request.clone()]);
        }
    }

    #[tokio::test]
    async fn preview_never_writes() {
        let chain = funded_chain();
        let orchestrator = setup(&chain);

        let preview = orchestrator.preview(OWNER, None).await.unwrap();
        assert!(!preview.already_deployed);
        assert_eq!(preview.salt, B256::ZERO);
        assert!(orchestrator.signer.sent().is_empty());
        assert!(chain.receipts_waited().is_empty());
    }

    #[tokio::test]
    async fn preview_works_without_signer() {
        let chain = funded_chain();
        let orchestrator = DeploymentOrchestrator::new(chain.clone(), &config()).unwrap();
        let preview = orchestrator.preview(OWNER, None).await.unwrap();
        assert_eq!(preview.account_address, orchestrator.predict(OWNER).await.unwrap());
    }

    #[tokio::test]
    async fn name_selects_factory_entry_point() {
        let chain = funded_chain();
        let orchestrator = setup(&chain);

        let plain = orchestrator.preview(OWNER, None).await.unwrap();
        let named = orchestrator.preview(OWNER, Some("alice")).await.unwrap();

        assert_eq!(plain.call.function_name(), "createAccount");
        assert!(plain.request.data.starts_with(&NexusAccountFactory::createAccountCall::SELECTOR));
        assert_eq!(named.call.function_name(), "createAccountWithName");
        assert_eq!(named.call.name(), Some("alice"));
        assert_eq!(named.init_data, plain.init_data);
        assert_eq!(named.salt, plain.salt);
        assert_eq!(named.request.to, plain.request.to);
        assert_eq!(named.account_address, plain.account_address);
    }

    #[tokio::test]
    async fn zero_balance_aborts_before_writing() {
        let chain = Arc::new(MockChain::new(config().chain_id));
        let orchestrator = setup(&chain);

        let err = orchestrator.deploy(OWNER, None).await.unwrap_err();
        assert!(matches!(err, DeployError::SignerUnfunded { signer } if signer == SIGNER));
        assert!(orchestrator.signer.sent().is_empty());
    }

    #[tokio::test]
    async fn wrong_chain_aborts_before_writing() {
        let chain = funded_chain();
        chain.set_chain_id(1);
        let orchestrator = setup(&chain);

        let err = orchestrator.deploy(OWNER, None).await.unwrap_err();
        assert!(matches!(err, DeployError::ChainMismatch { actual: 1, .. }));
        assert!(orchestrator.signer.sent().is_empty());
    }

    #[tokio::test]
    async fn prediction_failure_is_terminal() {
        let chain = funded_chain();
        chain.fail_predictions(ChainError::new("connection refused"));
        let orchestrator = setup(&chain);

        let err = orchestrator.deploy(OWNER, None).await.unwrap_err();
        assert!(matches!(err, DeployError::Rpc { .. }));
        assert!(orchestrator.signer.sent().is_empty());
    }

    #[tokio::test]
    async fn submit_failure_is_surfaced() {
        let chain = funded_chain();
        let orchestrator = DeploymentOrchestrator::new(chain.clone(), &config())
            .unwrap()
            .with_signer(MockSigner::failing(
                SIGNER,
                chain.clone(),
                ChainError::new("nonce too low"),
            ));

        let err = orchestrator.deploy(OWNER, None).await.unwrap_err();
        assert!(matches!(err, DeployError::Submit(_)));
        assert!(err.to_string().contains("nonce too low"));
        assert!(chain.receipts_waited().is_empty());
    }

    #[tokio::test]
    async fn reverted_receipt_is_an_error() {
        let chain = funded_chain();
        chain.revert_receipts();
        let orchestrator = setup(&chain);

        let err = orchestrator.deploy(OWNER, None).await.unwrap_err();
        assert!(matches!(err, DeployError::Reverted { .. }));
        assert_eq!(chain.receipts_waited().len(), 1);
    }

    #[tokio::test]
    async fn invalid_name_fails_before_any_network_activity() {
        let chain = funded_chain();
        let orchestrator = setup(&chain);

        let err = orchestrator.deploy(OWNER, Some("Not Valid")).await.unwrap_err();
        assert!(matches!(err, DeployError::InvalidName { .. }));
        assert_eq!(
            chain.calls_with_selector(NexusAccountFactory::computeAccountAddressCall::SELECTOR),
            0
        );
    }

    #[test]
    fn missing_bootstrap_is_rejected_up_front() {
        let chain = funded_chain();
        let config = DeployerConfig::sophon_testnet().unwrap();
        let err = DeploymentOrchestrator::new(chain.clone(), &config).err().unwrap();
        assert!(matches!(err, DeployError::MissingBootstrap));
        assert_eq!(
            chain.calls_with_selector(NexusAccountFactory::computeAccountAddressCall::SELECTOR),
            0
        );
    }

    struct AlwaysMissing;

    impl RevertClassifier for AlwaysMissing {
        fn classify(&self, _err: &ChainError) -> RevertClass {
            RevertClass::EntityNotFound
        }
    }

    #[tokio::test]
    async fn injected_name_resolver_is_used() {
        let chain = funded_chain();
        chain.respond(SnsRegistry::tokenOfOwnerByIndexCall::SELECTOR, Ok(Bytes::from(U256::from(5).abi_encode())));
        chain.respond(SnsRegistry::nameOfCall::SELECTOR, Ok(Bytes::from("alice".to_string().abi_encode())));
        chain.respond(SnsRegistry::ownerOfCall::SELECTOR, Err(ChainError::new("anything")));
        let resolver = NameResolver::with_classifier(config().registry, AlwaysMissing)
            .with_suffix_cache(SuffixCache::preset("custom.id"));
        let orchestrator = setup(&chain).with_name_resolver(resolver);

        let result = orchestrator.deploy(OWNER, None).await.unwrap();
        assert_eq!(result.name.map(|n| n.to_string()).as_deref(), Some("alice.custom.id"));
        assert_eq!(chain.calls_with_selector(SnsRegistry::baseDomainCall::SELECTOR), 0);
        assert!(
            orchestrator
                .name_resolver()
                .is_name_available(&chain, "bob")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn name_lookup_is_attached_but_never_blocks() {
        let chain = funded_chain();
        chain.respond(SnsRegistry::baseDomainCall::SELECTOR, Ok(Bytes::from("soph.id".to_string().abi_encode())));
        chain.respond(SnsRegistry::tokenOfOwnerByIndexCall::SELECTOR, Ok(Bytes::from(U256::from(5).abi_encode())));
        chain.respond(SnsRegistry::nameOfCall::SELECTOR, Ok(Bytes::from("alice".to_string().abi_encode())));
        let orchestrator = setup(&chain);

        let preview = orchestrator.preview(OWNER, None).await.unwrap();
        assert_eq!(preview.name.map(|n| n.to_string()).as_deref(), Some("alice.soph.id"));

        // registry unreachable: deployment still goes through
        let chain = funded_chain();
        let orchestrator = setup(&chain);
        let result = orchestrator.deploy(OWNER, None).await.unwrap();
        assert_eq!(result.name, None);
        assert!(result.transaction_hash.is_some());
    }
}
