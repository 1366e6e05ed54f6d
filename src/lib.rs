//! Orand Epoch Publisher Library
//!
//! Publishes off-chain ECVRF epoch proofs to the Orand provider contract,
//! choosing between genesis and continuation from on-chain state.
//!
//! ## Modules
//!
//! - [`codec`] - Epoch record to structured proof transformation
//! - [`domain`] - Epoch records, proofs, verification results, handles
//! - [`contract`] - Provider contract bindings (alloy)
//! - [`publisher`] - Verify-then-publish orchestration
//! - [`infra`] - Errors, the provider seam, and the handle registry
//! - [`config`] - Environment configuration
//! - [`telemetry`] - Logging setup

pub mod codec;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod publisher;
pub mod telemetry;

// Re-export commonly used types
pub use domain::{
    ChainState, EcvrfProof, EpochReceipt, EpochRecord, PublicationKind, PublisherKey,
    StructuredProof, SubmittedEpoch, VerificationResult,
};

pub use infra::{OrandError, OrandProvider, ProviderConnector, PublisherRegistry, Result};
pub use publisher::EpochPublisher;
