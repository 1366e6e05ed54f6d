//! Epoch proof records
//!
//! `EpochRecord` is the flat record written by the off-chain ECVRF prover.
//! `StructuredProof` is the argument layout the Orand provider contract
//! expects; it is only ever derived from an `EpochRecord` by the codec.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::infra::Result;

/// Flat epoch record as produced by the off-chain proof generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochRecord {
    /// Epoch sequence number
    pub epoch: u64,
    /// VRF seed
    pub alpha: String,
    /// Two concatenated 32-byte field elements (128 hex digits)
    pub gamma: String,
    pub c: String,
    pub s: String,
    /// VRF output; informational only, never sent on-chain
    pub y: String,
    /// 20-byte witness address
    pub witness_address: String,
    /// Two concatenated 32-byte field elements (128 hex digits)
    pub witness_gamma: String,
    /// Two concatenated 32-byte field elements (128 hex digits)
    pub witness_hash: String,
    pub inverse_z: String,
    /// ECDSA signature binding the epoch to its receiver
    pub signature_proof: String,
    pub created_date: String,
}

impl EpochRecord {
    /// Load a record from a generator output file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// ECVRF proof in contract argument order.
///
/// The public key is not carried; the provider contract already holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcvrfProof {
    pub gamma: [String; 2],
    pub c: String,
    pub s: String,
    pub alpha: String,
    pub u_witness: String,
    pub c_gamma_witness: [String; 2],
    pub s_hash_witness: [String; 2],
    pub z_inv: String,
}

impl EcvrfProof {
    /// All hex fields in contract argument order, paired fields flattened.
    pub fn hex_fields(&self) -> [&str; 11] {
        [
            self.gamma[0].as_str(),
            self.gamma[1].as_str(),
            self.c.as_str(),
            self.s.as_str(),
            self.alpha.as_str(),
            self.u_witness.as_str(),
            self.c_gamma_witness[0].as_str(),
            self.c_gamma_witness[1].as_str(),
            self.s_hash_witness[0].as_str(),
            self.s_hash_witness[1].as_str(),
            self.z_inv.as_str(),
        ]
    }
}

/// Dual proof: ECDSA signature plus ECVRF proof, hex-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredProof {
    pub ecdsa_proof: String,
    pub ecvrf_proof: EcvrfProof,
}
