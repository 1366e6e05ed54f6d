//! Error types for the Orand epoch publisher

use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

/// Errors that can occur while transforming, verifying or publishing epochs
#[derive(Error, Debug)]
pub enum OrandError {
    /// Required configuration missing or unparsable
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Epoch record field does not fit the proof layout
    #[error("malformed proof field {field}: {reason}")]
    MalformedProof { field: &'static str, reason: String },

    /// The provider reported the dual proof as invalid; nothing was submitted
    #[error("invalid dual proof for epoch {epoch} (signer {signer}, on-chain epoch {current_epoch})")]
    InvalidDualProof {
        epoch: u64,
        signer: Address,
        current_epoch: u128,
    },

    /// RPC connection or transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Read-only contract call reverted or returned undecodable data
    #[error("contract call failed: {0}")]
    Contract(String),

    /// State-mutating call was not accepted
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// Network operation exceeded its deadline
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Transaction was mined but reverted
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// Epoch file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Epoch file is not a valid epoch record
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OrandError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        OrandError::MalformedProof {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for publisher operations
pub type Result<T> = std::result::Result<T, OrandError>;
