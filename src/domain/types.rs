//! Publisher identity and submission handles

use std::fmt;

use alloy::primitives::{Address, TxHash};
use serde::Serialize;

/// Identity of a publisher handle: one per (endpoint, provider, consumer).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublisherKey {
    pub rpc_url: String,
    pub provider_address: Address,
    pub consumer_address: Address,
}

impl PublisherKey {
    pub fn new(
        rpc_url: impl Into<String>,
        provider_address: Address,
        consumer_address: Address,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            provider_address,
            consumer_address,
        }
    }
}

impl fmt::Display for PublisherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.rpc_url, self.provider_address, self.consumer_address
        )
    }
}

/// Which provider entry point carried an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationKind {
    /// First epoch for a consumer, anchored by the ECDSA proof
    Genesis,
    /// Epoch linked to the previously recorded one
    Continuation,
}

impl fmt::Display for PublicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationKind::Genesis => write!(f, "genesis"),
            PublicationKind::Continuation => write!(f, "continuation"),
        }
    }
}

/// Pending transaction handle returned by `EpochPublisher::publish`.
///
/// The transaction has been accepted by the node but not necessarily mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedEpoch {
    pub epoch: u64,
    pub kind: PublicationKind,
    pub consumer: Address,
    pub tx_hash: TxHash,
}

impl SubmittedEpoch {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "epoch": self.epoch,
            "kind": self.kind,
            "consumer": self.consumer.to_string(),
            "txHash": self.tx_hash.to_string(),
        })
    }
}

/// Mined transaction outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub status: bool,
}

impl EpochReceipt {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "txHash": self.tx_hash.to_string(),
            "blockNumber": self.block_number,
            "status": self.status,
        })
    }
}
