//! Trait definitions for the on-chain seam

use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{EcvrfProof, EpochReceipt, StructuredProof, VerificationResult};

use super::Result;

/// Orand provider contract: the on-chain verifier and epoch registry.
///
/// Arguments are hex-normalized codec output; implementations convert them
/// to ABI values.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrandProvider: Send + Sync {
    /// Read-only dual proof verification against current on-chain state
    async fn verify_epoch(&self, proof: &StructuredProof) -> Result<VerificationResult>;

    /// Submit the first epoch for a consumer
    ///
    /// Returns once the node has accepted the transaction.
    async fn genesis(
        &self,
        signer: &PrivateKeySigner,
        ecdsa_proof: &str,
        ecvrf_proof: &EcvrfProof,
    ) -> Result<TxHash>;

    /// Submit an epoch that links to the consumer's latest recorded epoch
    async fn publish(
        &self,
        signer: &PrivateKeySigner,
        consumer: Address,
        ecvrf_proof: &EcvrfProof,
    ) -> Result<TxHash>;

    /// Wait until the transaction is mined
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<EpochReceipt>;
}

/// Builds provider connections for the publisher registry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    /// Connect to `rpc_url` and bind the provider contract at `provider_address`
    async fn connect(
        &self,
        rpc_url: &str,
        provider_address: Address,
    ) -> Result<Arc<dyn OrandProvider>>;
}
