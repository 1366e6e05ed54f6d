//! Verification read-back from the Orand provider

use alloy::primitives::{Address, U256};
use serde_json::json;

/// ECDSA half of the dual proof, as decoded by the provider contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaProofSummary {
    pub signer: Address,
    pub receiver_address: Address,
    pub receiver_epoch: u128,
    pub ecvrf_proof_digest: U256,
}

/// Result of the provider's read-only `verifyEpoch` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub ecdsa_proof: EcdsaProofSummary,
    /// Latest epoch number recorded for the receiver
    pub current_epoch_number: u128,
    /// Whether the submitted epoch links to the recorded one
    pub is_epoch_linked: bool,
    pub is_valid_dual_proof: bool,
    /// Result of the latest recorded epoch; zero before genesis
    pub current_epoch_result: U256,
    /// Result computed from the submitted proof
    pub verified_epoch_result: U256,
}

/// On-chain epoch chain state for one consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// No epoch recorded yet; next publication must be genesis
    Uninitialized,
    /// Chain anchored; next publication links to `current_epoch`
    Linked {
        current_epoch: u128,
        current_result: U256,
    },
}

impl VerificationResult {
    pub fn chain_state(&self) -> ChainState {
        if self.current_epoch_result.is_zero() {
            ChainState::Uninitialized
        } else {
            ChainState::Linked {
                current_epoch: self.current_epoch_number,
                current_result: self.current_epoch_result,
            }
        }
    }

    /// JSON view for CLI output. Large integers are rendered as decimal strings.
    pub fn to_json(&self) -> serde_json::Value {
        let chain_state = match self.chain_state() {
            ChainState::Uninitialized => json!({ "state": "uninitialized" }),
            ChainState::Linked {
                current_epoch,
                current_result,
            } => json!({
                "state": "linked",
                "currentEpoch": current_epoch.to_string(),
                "currentResult": current_result.to_string(),
            }),
        };

        json!({
            "ecdsaProof": {
                "signer": self.ecdsa_proof.signer.to_string(),
                "receiverAddress": self.ecdsa_proof.receiver_address.to_string(),
                "receiverEpoch": self.ecdsa_proof.receiver_epoch.to_string(),
                "ecvrfProofDigest": self.ecdsa_proof.ecvrf_proof_digest.to_string(),
            },
            "currentEpochNumber": self.current_epoch_number.to_string(),
            "isEpochLinked": self.is_epoch_linked,
            "isValidDualProof": self.is_valid_dual_proof,
            "currentEpochResult": self.current_epoch_result.to_string(),
            "verifiedEpochResult": self.verified_epoch_result.to_string(),
            "chainState": chain_state,
        })
    }
}
