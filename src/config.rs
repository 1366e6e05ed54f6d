//! Publisher configuration
//!
//! Loaded from environment variables:
//! - `RPC_URL`: JSON-RPC endpoint (required)
//! - `ORAND_PROVIDER_ADDRESS`: provider contract (required)
//! - `ORAND_CONSUMER_ADDRESS`: consumer the epochs are published for (required)
//! - `WALLET_PRIVATE_KEY`: signing key (required to publish)
//! - `ORAND_CALL_TIMEOUT_SECS`, `ORAND_RECEIPT_TIMEOUT_SECS`

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::contract::CallTimeouts;
use crate::infra::{OrandError, Result};

pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_PROVIDER_ADDRESS: &str = "ORAND_PROVIDER_ADDRESS";
pub const ENV_CONSUMER_ADDRESS: &str = "ORAND_CONSUMER_ADDRESS";
pub const ENV_PRIVATE_KEY: &str = "WALLET_PRIVATE_KEY";
pub const ENV_CALL_TIMEOUT_SECS: &str = "ORAND_CALL_TIMEOUT_SECS";
pub const ENV_RECEIPT_TIMEOUT_SECS: &str = "ORAND_RECEIPT_TIMEOUT_SECS";

/// Publisher configuration
#[derive(Clone)]
pub struct PublisherConfig {
    /// RPC URL of the target chain
    pub rpc_url: String,
    /// Orand provider contract address
    pub provider_address: Address,
    /// Consumer contract the epochs belong to
    pub consumer_address: Address,
    /// Hex private key for signing transactions
    private_key: Option<String>,
    pub timeouts: CallTimeouts,
}

impl fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherConfig")
            .field("rpc_url", &self.rpc_url)
            .field("provider_address", &self.provider_address)
            .field("consumer_address", &self.consumer_address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| OrandError::Configuration(format!("{name} is required")))
}

fn address(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Address> {
    let raw = required(lookup, name)?;
    Address::from_str(raw.trim())
        .map_err(|e| OrandError::Configuration(format!("{name} is not an address: {e}")))
}

fn duration(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
    unit: fn(u64) -> Duration,
) -> Result<Duration> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(unit)
            .map_err(|e| OrandError::Configuration(format!("{name}: {e}"))),
    }
}

impl PublisherConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc_url = required(&lookup, ENV_RPC_URL)?;
        let provider_address = address(&lookup, ENV_PROVIDER_ADDRESS)?;
        let consumer_address = address(&lookup, ENV_CONSUMER_ADDRESS)?;
        let private_key = lookup(ENV_PRIVATE_KEY).filter(|v| !v.trim().is_empty());

        let defaults = CallTimeouts::default();
        let timeouts = CallTimeouts {
            call: duration(&lookup, ENV_CALL_TIMEOUT_SECS, defaults.call, Duration::from_secs)?,
            receipt: duration(
                &lookup,
                ENV_RECEIPT_TIMEOUT_SECS,
                defaults.receipt,
                Duration::from_secs,
            )?,
        };

        Ok(Self {
            rpc_url,
            provider_address,
            consumer_address,
            private_key,
            timeouts,
        })
    }

    /// Parse the signing key
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        let key = self
            .private_key
            .as_deref()
            .ok_or_else(|| OrandError::Configuration(format!("{ENV_PRIVATE_KEY} is required")))?;

        key.trim()
            .parse()
            .map_err(|e| OrandError::Configuration(format!("Invalid private key: {}", e)))
    }
}
