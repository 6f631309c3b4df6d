//! Deterministic Nexus smart-account deployment.
//!
//! The flow predicts the counterfactual account address for an owner, checks whether it
//! already has code, looks up its Sophon name, and (unless it exists) sends the factory's
//! creation transaction from a single service signer.

pub mod chain;
pub mod config;
pub mod error;
pub mod evm;
pub mod names;
pub mod orchestrator;
pub mod predict;
pub mod preflight;
pub mod tx;

pub use chain::{ChainConnector, ChainError, LocalServiceSigner, RpcChain, ServiceSigner};
pub use config::DeployerConfig;
pub use error::DeployError;
pub use orchestrator::{DeploymentOrchestrator, DeploymentPreview, DeploymentResult};
