//! Common test utilities and fakes for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;

use orand_publisher::domain::EcdsaProofSummary;
use orand_publisher::{
    EcvrfProof, EpochReceipt, EpochRecord, OrandError, OrandProvider, ProviderConnector,
    Result, StructuredProof, VerificationResult,
};

/// Epoch record fixture written by the prover
pub fn fixture_epoch() -> EpochRecord {
    serde_json::from_str(include_str!("../fixtures/epoch.json")).unwrap()
}

/// Test RPC endpoint
pub fn test_rpc_url() -> &'static str {
    "http://127.0.0.1:8545"
}

/// Test provider contract address
pub fn test_provider_address() -> Address {
    Address::repeat_byte(0x0f)
}

/// Test consumer address
pub fn test_consumer_address() -> Address {
    "0x540AF102792020f7f300a3AF4fF52af1B71BfF69".parse().unwrap()
}

pub fn test_signer() -> PrivateKeySigner {
    PrivateKeySigner::random()
}

/// Verification read-back with the given validity and current epoch result
pub fn verification(valid: bool, current_epoch_result: u64) -> VerificationResult {
    VerificationResult {
        ecdsa_proof: EcdsaProofSummary {
            signer: Address::repeat_byte(0x5e),
            receiver_address: test_consumer_address(),
            receiver_epoch: current_epoch_result as u128 + 1,
            ecvrf_proof_digest: U256::from(0xd1u64),
        },
        current_epoch_number: current_epoch_result as u128,
        is_epoch_linked: current_epoch_result != 0,
        is_valid_dual_proof: valid,
        current_epoch_result: U256::from(current_epoch_result),
        verified_epoch_result: U256::from(current_epoch_result + 1),
    }
}

/// Provider fake that records every call.
///
/// With `chained` set, the fake behaves like the contract: the chain is
/// uninitialized until genesis lands, and linked afterwards.
pub struct RecordingProvider {
    valid: bool,
    current_epoch_result: u64,
    chained: bool,
    initialized: AtomicBool,
    verify_delay: Duration,
    pub verify_calls: AtomicUsize,
    pub genesis_calls: Mutex<Vec<(String, EcvrfProof)>>,
    pub publish_calls: Mutex<Vec<(Address, EcvrfProof)>>,
}

impl RecordingProvider {
    pub fn new(valid: bool, current_epoch_result: u64) -> Self {
        Self {
            valid,
            current_epoch_result,
            chained: false,
            initialized: AtomicBool::new(false),
            verify_delay: Duration::ZERO,
            verify_calls: AtomicUsize::new(0),
            genesis_calls: Mutex::new(Vec::new()),
            publish_calls: Mutex::new(Vec::new()),
        }
    }

    /// Chain starts uninitialized and is linked by the first genesis
    pub fn chained(verify_delay: Duration) -> Self {
        Self {
            chained: true,
            verify_delay,
            ..Self::new(true, 0)
        }
    }

    pub fn genesis_count(&self) -> usize {
        self.genesis_calls.lock().unwrap().len()
    }

    pub fn publish_count(&self) -> usize {
        self.publish_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl OrandProvider for RecordingProvider {
    async fn verify_epoch(&self, _proof: &StructuredProof) -> Result<VerificationResult> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if !self.verify_delay.is_zero() {
            tokio::time::sleep(self.verify_delay).await;
        }

        let current = if self.chained {
            u64::from(self.initialized.load(Ordering::SeqCst))
        } else {
            self.current_epoch_result
        };
        Ok(verification(self.valid, current))
    }

    async fn genesis(
        &self,
        _signer: &PrivateKeySigner,
        ecdsa_proof: &str,
        ecvrf_proof: &EcvrfProof,
    ) -> Result<TxHash> {
        let mut calls = self.genesis_calls.lock().unwrap();
        calls.push((ecdsa_proof.to_string(), ecvrf_proof.clone()));
        self.initialized.store(true, Ordering::SeqCst);
        Ok(TxHash::with_last_byte(calls.len() as u8))
    }

    async fn publish(
        &self,
        _signer: &PrivateKeySigner,
        consumer: Address,
        ecvrf_proof: &EcvrfProof,
    ) -> Result<TxHash> {
        let mut calls = self.publish_calls.lock().unwrap();
        calls.push((consumer, ecvrf_proof.clone()));
        Ok(TxHash::repeat_byte(0x80 | calls.len() as u8))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<EpochReceipt> {
        Ok(EpochReceipt {
            tx_hash,
            block_number: Some(1),
            status: true,
        })
    }
}

/// Connector fake that counts connection attempts
pub struct CountingConnector {
    delay: Duration,
    fail: bool,
    pub connects: AtomicUsize,
}

impl CountingConnector {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail: false,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Duration::ZERO)
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderConnector for CountingConnector {
    async fn connect(
        &self,
        rpc_url: &str,
        _provider_address: Address,
    ) -> Result<Arc<dyn OrandProvider>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(OrandError::Transport(format!("{rpc_url} unreachable")));
        }
        Ok(Arc::new(RecordingProvider::new(true, 0)))
    }
}
