//! Epoch publisher
//!
//! Verifies an epoch's dual proof against the provider contract, then
//! submits it as genesis or as a continuation depending on on-chain state.
//! The remote contract owns the per-consumer state machine:
//!
//! ```text
//! UNINITIALIZED --genesis--> LINKED --publish--> LINKED --publish--> ...
//! ```

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::codec;
use crate::domain::{
    ChainState, EpochReceipt, EpochRecord, PublicationKind, PublisherKey, StructuredProof,
    SubmittedEpoch, VerificationResult,
};
use crate::infra::{OrandError, OrandProvider, Result};

/// Publisher handle for one (endpoint, provider, consumer) triple.
///
/// Obtained from `PublisherRegistry::acquire`. Publications through one
/// handle are serialized so that concurrent callers cannot both observe an
/// uninitialized chain and both submit genesis.
pub struct EpochPublisher {
    key: PublisherKey,
    provider: Arc<dyn OrandProvider>,
    publish_lock: Mutex<()>,
}

impl EpochPublisher {
    pub fn new(key: PublisherKey, provider: Arc<dyn OrandProvider>) -> Self {
        Self {
            key,
            provider,
            publish_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &PublisherKey {
        &self.key
    }

    pub fn consumer_address(&self) -> Address {
        self.key.consumer_address
    }

    /// Underlying provider connection, shared by every caller of this handle
    pub fn provider(&self) -> &Arc<dyn OrandProvider> {
        &self.provider
    }

    /// Verify an epoch against current on-chain state without mutating it
    pub async fn verify(&self, record: &EpochRecord) -> Result<VerificationResult> {
        let proof = codec::transform(record)?;
        self.verify_proof(record.epoch, &proof).await
    }

    async fn verify_proof(
        &self,
        epoch: u64,
        proof: &StructuredProof,
    ) -> Result<VerificationResult> {
        let result = self.provider.verify_epoch(proof).await?;

        info!(
            "Epoch {} verified: valid={} linked={} on-chain epoch={}",
            epoch, result.is_valid_dual_proof, result.is_epoch_linked, result.current_epoch_number
        );

        Ok(result)
    }

    /// Verify, then submit the epoch as genesis or continuation
    ///
    /// Nothing is submitted unless the provider reports the dual proof as
    /// valid. Returns as soon as the node accepts the transaction; use
    /// [`EpochPublisher::confirm`] to wait for it to be mined.
    #[instrument(
        skip(self, record, signer),
        fields(epoch = record.epoch, consumer = %self.key.consumer_address)
    )]
    pub async fn publish(
        &self,
        record: &EpochRecord,
        signer: &PrivateKeySigner,
    ) -> Result<SubmittedEpoch> {
        let proof = codec::transform(record)?;

        let _guard = self.publish_lock.lock().await;

        let verification = self.verify_proof(record.epoch, &proof).await?;
        if !verification.is_valid_dual_proof {
            warn!("Rejecting epoch {}: invalid dual proof", record.epoch);
            return Err(OrandError::InvalidDualProof {
                epoch: record.epoch,
                signer: verification.ecdsa_proof.signer,
                current_epoch: verification.current_epoch_number,
            });
        }

        let (kind, tx_hash) = match verification.chain_state() {
            ChainState::Uninitialized => {
                info!("No epoch recorded for consumer, submitting genesis");
                let tx_hash = self
                    .provider
                    .genesis(signer, &proof.ecdsa_proof, &proof.ecvrf_proof)
                    .await?;
                (PublicationKind::Genesis, tx_hash)
            }
            ChainState::Linked { current_epoch, .. } => {
                info!("Linking to on-chain epoch {}", current_epoch);
                let tx_hash = self
                    .provider
                    .publish(signer, self.key.consumer_address, &proof.ecvrf_proof)
                    .await?;
                (PublicationKind::Continuation, tx_hash)
            }
        };

        info!("Epoch {} submitted as {} in tx {:?}", record.epoch, kind, tx_hash);

        Ok(SubmittedEpoch {
            epoch: record.epoch,
            kind,
            consumer: self.key.consumer_address,
            tx_hash,
        })
    }

    /// Wait for a submitted epoch to be mined
    ///
    /// A reverted transaction is reported as `OrandError::Reverted`; it is
    /// not resubmitted.
    pub async fn confirm(&self, submitted: &SubmittedEpoch) -> Result<EpochReceipt> {
        let receipt = self.provider.wait_for_receipt(submitted.tx_hash).await?;
        if !receipt.status {
            warn!("Epoch {} transaction {:?} reverted", submitted.epoch, receipt.tx_hash);
            return Err(OrandError::Reverted(receipt.tx_hash));
        }

        info!(
            "Epoch {} confirmed in tx {:?} (block {})",
            submitted.epoch,
            receipt.tx_hash,
            receipt.block_number.unwrap_or(0)
        );
        Ok(receipt)
    }
}
