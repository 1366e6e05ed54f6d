//! EpochRecord -> StructuredProof

use crate::domain::{EcvrfProof, EpochRecord, StructuredProof};
use crate::infra::Result;

use super::normalize::{normalize_scalar, split_field_pair};

/// Repackage a generator record into the provider's argument layout.
///
/// Pure and deterministic. `y` and `createdDate` are not carried; the
/// contract recomputes the output from the proof.
pub fn transform(record: &EpochRecord) -> Result<StructuredProof> {
    let ecvrf_proof = EcvrfProof {
        gamma: split_field_pair("gamma", &record.gamma)?,
        c: normalize_scalar("c", &record.c)?,
        s: normalize_scalar("s", &record.s)?,
        alpha: normalize_scalar("alpha", &record.alpha)?,
        u_witness: normalize_scalar("witnessAddress", &record.witness_address)?,
        c_gamma_witness: split_field_pair("witnessGamma", &record.witness_gamma)?,
        s_hash_witness: split_field_pair("witnessHash", &record.witness_hash)?,
        z_inv: normalize_scalar("inverseZ", &record.inverse_z)?,
    };

    Ok(StructuredProof {
        ecdsa_proof: normalize_scalar("signatureProof", &record.signature_proof)?,
        ecvrf_proof,
    })
}
