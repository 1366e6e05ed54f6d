//! Orand provider contract bindings
//!
//! Verifies and publishes epochs against the OrandProviderV3 contract.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{PendingTransactionBuilder, Provider, ProviderBuilder, RootProvider};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::rpc::json_rpc::RpcError;
use alloy::transports::http::{Client, Http};
use alloy::transports::{TransportError, TransportErrorKind};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::codec::strip_hex_prefix;
use crate::domain::{
    EcdsaProofSummary, EcvrfProof, EpochReceipt, StructuredProof, VerificationResult,
};
use crate::infra::{OrandError, OrandProvider, ProviderConnector, Result};

/// Hex digits in a 20-byte address
const ADDRESS_DIGITS: usize = 40;

// Generate contract bindings
sol! {
    #[sol(rpc)]
    interface IOrandProviderV3 {
        #[derive(Debug)]
        struct ECVRFProof {
            uint256[2] gamma;
            uint256 c;
            uint256 s;
            uint256 alpha;
            address uWitness;
            uint256[2] cGammaWitness;
            uint256[2] sHashWitness;
            uint256 zInv;
        }

        struct OrandECDSAProof {
            address signer;
            address receiverAddress;
            uint96 receiverEpoch;
            uint256 ecvrfProofDigest;
        }

        function verifyEpoch(bytes memory fraudProof, ECVRFProof memory ecvrfProof)
            external
            view
            returns (
                OrandECDSAProof memory ecdsaProof,
                uint96 currentEpochNumber,
                bool isEpochLinked,
                bool isValidDualProof,
                uint256 currentEpochResult,
                uint256 verifiedEpochResult
            );

        function genesis(bytes memory fraudProof, ECVRFProof memory ecvrfProof)
            external
            returns (bool);

        function publish(address receiverAddress, ECVRFProof memory ecvrfProof)
            external
            returns (bool);
    }
}

// ============================================================================
// ABI conversion
// ============================================================================

/// Decode the normalized ECDSA proof into calldata bytes
pub fn ecdsa_proof_bytes(ecdsa_proof: &str) -> Result<Bytes> {
    hex::decode(strip_hex_prefix(ecdsa_proof))
        .map(Bytes::from)
        .map_err(|e| OrandError::malformed("ecdsaProof", e.to_string()))
}

fn field_element(field: &'static str, value: &str) -> Result<U256> {
    U256::from_str_radix(strip_hex_prefix(value), 16)
        .map_err(|e| OrandError::malformed(field, format!("not a uint256: {e}")))
}

fn field_pair(field: &'static str, values: &[String; 2]) -> Result<[U256; 2]> {
    Ok([
        field_element(field, &values[0])?,
        field_element(field, &values[1])?,
    ])
}

fn witness_address(value: &str) -> Result<Address> {
    let digits = strip_hex_prefix(value);
    if digits.len() > ADDRESS_DIGITS {
        return Err(OrandError::malformed(
            "uWitness",
            format!(
                "expected at most {ADDRESS_DIGITS} hex digits, got {}",
                digits.len()
            ),
        ));
    }
    Address::from_str(&format!("{digits:0>40}"))
        .map_err(|e| OrandError::malformed("uWitness", e.to_string()))
}

/// Convert a normalized ECVRF proof into the contract struct
pub fn to_contract_proof(proof: &EcvrfProof) -> Result<IOrandProviderV3::ECVRFProof> {
    Ok(IOrandProviderV3::ECVRFProof {
        gamma: field_pair("gamma", &proof.gamma)?,
        c: field_element("c", &proof.c)?,
        s: field_element("s", &proof.s)?,
        alpha: field_element("alpha", &proof.alpha)?,
        uWitness: witness_address(&proof.u_witness)?,
        cGammaWitness: field_pair("cGammaWitness", &proof.c_gamma_witness)?,
        sHashWitness: field_pair("sHashWitness", &proof.s_hash_witness)?,
        zInv: field_element("zInv", &proof.z_inv)?,
    })
}

// ============================================================================
// Provider
// ============================================================================

/// Deadlines for outbound calls
#[derive(Debug, Clone, Copy)]
pub struct CallTimeouts {
    /// Connect, verify and submit
    pub call: Duration,
    /// Total wait for a receipt
    pub receipt: Duration,
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self {
            call: Duration::from_secs(30),
            receipt: Duration::from_secs(120),
        }
    }
}

async fn with_timeout<T, F>(operation: &'static str, after: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| OrandError::Timeout { operation, after })?
}

/// `OrandProvider` backed by an HTTP JSON-RPC connection
pub struct AlloyOrandProvider {
    rpc_url: String,
    address: Address,
    provider: RootProvider<Http<Client>>,
    timeouts: CallTimeouts,
}

impl AlloyOrandProvider {
    /// Open a read connection and check the endpoint answers
    pub async fn connect(rpc_url: &str, address: Address, timeouts: CallTimeouts) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| OrandError::Configuration(format!("Invalid RPC URL: {}", e)))?,
        );

        let chain_id = with_timeout("connect", timeouts.call, async {
            provider
                .get_chain_id()
                .await
                .map_err(|e| OrandError::Transport(format!("Failed to reach {rpc_url}: {e}")))
        })
        .await?;

        info!("Connected to Orand provider {} (chain {})", address, chain_id);

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            address,
            provider,
            timeouts,
        })
    }
}

#[async_trait]
impl OrandProvider for AlloyOrandProvider {
    async fn verify_epoch(&self, proof: &StructuredProof) -> Result<VerificationResult> {
        let contract = IOrandProviderV3::new(self.address, &self.provider);

        let call = contract.verifyEpoch(
            ecdsa_proof_bytes(&proof.ecdsa_proof)?,
            to_contract_proof(&proof.ecvrf_proof)?,
        );

        let result = with_timeout("verifyEpoch", self.timeouts.call, async {
            call.call()
                .await
                .map_err(|e| OrandError::Contract(format!("verifyEpoch failed: {}", e)))
        })
        .await?;

        Ok(VerificationResult {
            ecdsa_proof: EcdsaProofSummary {
                signer: result.ecdsaProof.signer,
                receiver_address: result.ecdsaProof.receiverAddress,
                receiver_epoch: result.ecdsaProof.receiverEpoch.into(),
                ecvrf_proof_digest: result.ecdsaProof.ecvrfProofDigest,
            },
            current_epoch_number: result.currentEpochNumber.into(),
            is_epoch_linked: result.isEpochLinked,
            is_valid_dual_proof: result.isValidDualProof,
            current_epoch_result: result.currentEpochResult,
            verified_epoch_result: result.verifiedEpochResult,
        })
    }

    async fn genesis(
        &self,
        signer: &PrivateKeySigner,
        ecdsa_proof: &str,
        ecvrf_proof: &EcvrfProof,
    ) -> Result<TxHash> {
        let fraud_proof = ecdsa_proof_bytes(ecdsa_proof)?;
        let ecvrf_proof = to_contract_proof(ecvrf_proof)?;

        // Create provider with signer and recommended fillers
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(alloy::network::EthereumWallet::from(signer.clone()))
            .on_http(
                self.rpc_url
                    .parse()
                    .map_err(|e| OrandError::Configuration(format!("Invalid RPC URL: {}", e)))?,
            );

        let contract = IOrandProviderV3::new(self.address, &provider);
        let tx = contract.genesis(fraud_proof, ecvrf_proof);

        let pending = with_timeout("genesis", self.timeouts.call, async {
            tx.send().await.map_err(|e| {
                OrandError::Submission(format!("Failed to send genesis transaction: {}", e))
            })
        })
        .await?;

        let tx_hash = *pending.tx_hash();
        info!("Genesis transaction sent: {:?}", tx_hash);
        Ok(tx_hash)
    }

    async fn publish(
        &self,
        signer: &PrivateKeySigner,
        consumer: Address,
        ecvrf_proof: &EcvrfProof,
    ) -> Result<TxHash> {
        let ecvrf_proof = to_contract_proof(ecvrf_proof)?;

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(alloy::network::EthereumWallet::from(signer.clone()))
            .on_http(
                self.rpc_url
                    .parse()
                    .map_err(|e| OrandError::Configuration(format!("Invalid RPC URL: {}", e)))?,
            );

        let contract = IOrandProviderV3::new(self.address, &provider);
        let tx = contract.publish(consumer, ecvrf_proof);

        let pending = with_timeout("publish", self.timeouts.call, async {
            tx.send().await.map_err(|e| {
                OrandError::Submission(format!("Failed to send publish transaction: {}", e))
            })
        })
        .await?;

        let tx_hash = *pending.tx_hash();
        info!("Publish transaction sent: {:?}", tx_hash);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<EpochReceipt> {
        debug!("Waiting for receipt of {:?}", tx_hash);

        let receipt = PendingTransactionBuilder::new(&self.provider, tx_hash)
            .with_timeout(Some(self.timeouts.receipt))
            .get_receipt()
            .await
            .map_err(|e| receipt_error(e, self.timeouts.receipt))?;

        Ok(EpochReceipt {
            tx_hash,
            block_number: receipt.block_number,
            status: receipt.status(),
        })
    }
}

/// The pending-transaction watcher drops a timed-out transaction, which
/// surfaces as a vanished backend.
fn receipt_error(err: TransportError, after: Duration) -> OrandError {
    match err {
        RpcError::Transport(TransportErrorKind::BackendGone) => OrandError::Timeout {
            operation: "receipt",
            after,
        },
        other => OrandError::Transport(format!("Failed to get receipt: {}", other)),
    }
}

/// Connects `AlloyOrandProvider`s for the publisher registry
#[derive(Debug, Clone, Copy, Default)]
pub struct AlloyConnector {
    timeouts: CallTimeouts,
}

impl AlloyConnector {
    pub fn new(timeouts: CallTimeouts) -> Self {
        Self { timeouts }
    }
}

#[async_trait]
impl ProviderConnector for AlloyConnector {
    async fn connect(
        &self,
        rpc_url: &str,
        provider_address: Address,
    ) -> Result<Arc<dyn OrandProvider>> {
        let provider = AlloyOrandProvider::connect(rpc_url, provider_address, self.timeouts).await?;
        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof_with(c: &str, u_witness: &str) -> EcvrfProof {
        EcvrfProof {
            gamma: ["0x01".to_string(), "0x02".to_string()],
            c: c.to_string(),
            s: "0x0abc".to_string(),
            alpha: "0xff".to_string(),
            u_witness: u_witness.to_string(),
            c_gamma_witness: ["0x03".to_string(), "0x04".to_string()],
            s_hash_witness: ["0x05".to_string(), "0x06".to_string()],
            z_inv: "0x07".to_string(),
        }
    }

    #[test]
    fn test_to_contract_proof_parses_fields() {
        let proof = proof_with("0x10", "0x540af102792020f7f300a3af4ff52af1b71bff69");
        let abi = to_contract_proof(&proof).unwrap();

        assert_eq!(abi.gamma, [U256::from(1u64), U256::from(2u64)]);
        assert_eq!(abi.c, U256::from(16u64));
        assert_eq!(abi.s, U256::from(0xabcu64));
        assert_eq!(abi.alpha, U256::from(255u64));
        assert_eq!(abi.cGammaWitness, [U256::from(3u64), U256::from(4u64)]);
        assert_eq!(abi.sHashWitness, [U256::from(5u64), U256::from(6u64)]);
        assert_eq!(abi.zInv, U256::from(7u64));
        assert_eq!(
            abi.uWitness,
            Address::from_str("0x540AF102792020f7f300a3AF4fF52af1B71BfF69").unwrap()
        );
    }

    #[test]
    fn test_short_witness_address_is_left_padded() {
        let abi = to_contract_proof(&proof_with("0x01", "0x01")).unwrap();
        assert_eq!(abi.uWitness, Address::with_last_byte(1));
    }

    #[test]
    fn test_oversized_witness_address_is_rejected() {
        let err = to_contract_proof(&proof_with("0x01", &format!("0x{}", "1".repeat(42))))
            .unwrap_err();
        assert!(matches!(
            err,
            OrandError::MalformedProof {
                field: "uWitness",
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_scalar_is_rejected() {
        let too_wide = format!("0x01{}", "0".repeat(64));
        let err = to_contract_proof(&proof_with(&too_wide, "0x01")).unwrap_err();
        assert!(matches!(err, OrandError::MalformedProof { field: "c", .. }));
    }

    #[test]
    fn test_ecdsa_proof_bytes() {
        let bytes = ecdsa_proof_bytes("0xdeadbeef").unwrap();
        assert_eq!(&bytes[..], &[0xdeu8, 0xad, 0xbe, 0xef][..]);

        assert!(ecdsa_proof_bytes("0xzz").is_err());
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = CallTimeouts::default();
        assert_eq!(timeouts.call, Duration::from_secs(30));
        assert!(timeouts.receipt > timeouts.call);
    }

    #[tokio::test]
    async fn test_with_timeout_reports_operation() {
        let err = with_timeout(
            "verifyEpoch",
            Duration::from_millis(10),
            std::future::pending::<Result<()>>(),
        )
        .await
        .unwrap_err();

        match err {
            OrandError::Timeout { operation, after } => {
                assert_eq!(operation, "verifyEpoch");
                assert_eq!(after, Duration::from_millis(10));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through_result() {
        let value = with_timeout("genesis", Duration::from_secs(1), async { Ok(7u8) })
            .await
            .unwrap();
        assert_eq!(value, 7);

        let err = with_timeout("genesis", Duration::from_secs(1), async {
            Err::<(), _>(OrandError::Submission("nonce too low".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, OrandError::Submission(_)));
    }

    #[test]
    fn test_dropped_receipt_watch_is_timeout() {
        let after = Duration::from_secs(120);

        let err = receipt_error(TransportErrorKind::backend_gone(), after);
        assert!(matches!(
            err,
            OrandError::Timeout {
                operation: "receipt",
                ..
            }
        ));

        let err = receipt_error(TransportErrorKind::custom_str("connection refused"), after);
        assert!(matches!(err, OrandError::Transport(_)));
    }
}
