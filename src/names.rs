//! Sophon Name Service lookups.
//!
//! Reverse resolution is advisory: it never fails, it only finds nothing. The availability
//! check is stricter and only turns the registry's "token does not exist" revert into an
//! answer; every other failure is returned to the caller.

use std::fmt;
use std::time::Instant;

use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::SolCall,
};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::chain::{ChainConnector, ChainError, NonexistentTokenClassifier};
use crate::error::DeployError;
use crate::evm::{SnsRegistry, name_token_id};

pub const DEFAULT_DOMAIN_SUFFIX: &str = "soph.id";

const MAX_NAME_LEN: usize = 28;

/// `label.suffix` as registered in the name service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub label: String,
    pub suffix: String,
}

impl fmt::Display for NameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.label, self.suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertClass {
    EntityNotFound,
    Other,
}

/// Maps a raw chain error onto the outcomes the availability check cares about.
pub trait RevertClassifier: Send + Sync {
    fn classify(&self, err: &ChainError) -> RevertClass;
}

#[derive(Debug, Clone)]
pub struct CachedSuffix {
    pub value: String,
    pub fetched_at: Instant,
}

/// Registry base domain, fetched once per resolver.
#[derive(Debug, Default)]
pub struct SuffixCache {
    inner: RwLock<Option<CachedSuffix>>,
}

impl SuffixCache {
    /// Cache that starts out holding `value`.
    pub fn preset(value: impl Into<String>) -> Self {
        let cache = Self::default();
        cache.store(value.into());
        cache
    }

    pub fn get(&self) -> Option<CachedSuffix> {
        self.inner.read().clone()
    }

    pub fn store(&self, value: String) -> CachedSuffix {
        let entry = CachedSuffix {
            value,
            fetched_at: Instant::now(),
        };
        *self.inner.write() = Some(entry.clone());
        entry
    }

    pub fn reset(&self) {
        self.inner.write().take();
    }
}

/// Trim `name`; empty means "no name". Non-empty names must be 1-28 of `[a-z0-9]`.
pub fn normalize_name(name: Option<&str>) -> Result<Option<String>, DeployError> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    validate_name(name)?;
    Ok(Some(name.to_string()))
}

pub fn validate_name(name: &str) -> Result<(), DeployError> {
    let invalid = |reason| DeployError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(invalid("must be 1 to 28 characters long"));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    {
        return Err(invalid("only lowercase letters and digits are allowed"));
    }
    Ok(())
}

pub struct NameResolver<K = NonexistentTokenClassifier> {
    registry: Address,
    suffix: SuffixCache,
    classifier: K,
}

impl NameResolver {
    pub fn new(registry: Address) -> Self {
        Self::with_classifier(registry, NonexistentTokenClassifier)
    }
}

impl<K: RevertClassifier> NameResolver<K> {
    pub fn with_classifier(registry: Address, classifier: K) -> Self {
        Self {
            registry,
            suffix: SuffixCache::default(),
            classifier,
        }
    }

    pub fn with_suffix_cache(mut self, cache: SuffixCache) -> Self {
        self.suffix = cache;
        self
    }

    pub fn suffix_cache(&self) -> &SuffixCache {
        &self.suffix
    }

    /// Registry base domain without a leading dot; the default suffix if the read fails.
    pub async fn domain_suffix<C: ChainConnector>(&self, chain: &C) -> String {
        if let Some(cached) = self.suffix.get() {
            debug!(suffix = %cached.value, age = ?cached.fetched_at.elapsed(), "using cached domain suffix");
            return cached.value;
        }

        let fetched = self.read(chain, SnsRegistry::baseDomainCall {}).await;
        let suffix = match fetched {
            Ok(domain) => {
                let domain = domain.trim_start_matches('.');
                if domain.is_empty() {
                    DEFAULT_DOMAIN_SUFFIX.to_string()
                } else {
                    domain.to_string()
                }
            }
            Err(err) => {
                warn!(error = %err, "could not read registry base domain, using {DEFAULT_DOMAIN_SUFFIX}");
                DEFAULT_DOMAIN_SUFFIX.to_string()
            }
        };
        self.suffix.store(suffix).value
    }

    /// Name registered to `address`, if any. Never fails.
    pub async fn resolve_name<C: ChainConnector>(
        &self,
        chain: &C,
        address: Address,
    ) -> Option<NameRecord> {
        match self.lookup_label(chain, address).await {
            Ok(Some(label)) => {
                let suffix = self.domain_suffix(chain).await;
                Some(NameRecord { label, suffix })
            }
            Ok(None) => {
                debug!(%address, "registry returned an empty label");
                None
            }
            Err(err) => {
                debug!(%address, error = %err, "no name record");
                None
            }
        }
    }

    async fn lookup_label<C: ChainConnector>(
        &self,
        chain: &C,
        address: Address,
    ) -> Result<Option<String>, DeployError> {
        let token_id = self
            .read(
                chain,
                SnsRegistry::tokenOfOwnerByIndexCall {
                    owner: address,
                    index: U256::ZERO,
                },
            )
            .await?;
        let label = self
            .read(chain, SnsRegistry::nameOfCall { tokenId: token_id })
            .await?;
        let label = label.strip_suffix('.').unwrap_or(&label).trim();
        Ok((!label.is_empty()).then(|| label.to_string()))
    }

    /// Whether `candidate` can still be registered under the registry's suffix.
    pub async fn is_name_available<C: ChainConnector>(
        &self,
        chain: &C,
        candidate: &str,
    ) -> Result<bool, DeployError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Ok(true);
        }
        validate_name(candidate)?;

        let suffix = self.domain_suffix(chain).await;
        let token_id = name_token_id(&format!("{candidate}.{suffix}"));
        let call = SnsRegistry::ownerOfCall { tokenId: token_id };

        match chain
            .call(self.registry, Bytes::from(call.abi_encode()))
            .await
        {
            Ok(raw) => {
                let owner = SnsRegistry::ownerOfCall::abi_decode_returns(&raw)
                    .map_err(DeployError::decode("ownerOf"))?;
                debug!(name = candidate, %owner, "name is taken");
                Ok(false)
            }
            Err(err) => match self.classifier.classify(&err) {
                RevertClass::EntityNotFound => Ok(true),
                RevertClass::Other => Err(DeployError::Rpc {
                    context: "check name availability",
                    source: err,
                }),
            },
        }
    }

    async fn read<C: ChainConnector, T: SolCall>(
        &self,
        chain: &C,
        call: T,
    ) -> Result<T::Return, DeployError> {
        let raw = chain
            .call(self.registry, Bytes::from(call.abi_encode()))
            .await
            .map_err(DeployError::rpc("read name registry"))?;
        T::abi_decode_returns(&raw).map_err(DeployError::decode(T::SIGNATURE))
    }
}
