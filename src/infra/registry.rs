//! Publisher handle registry
//!
//! Keeps one `EpochPublisher` per (endpoint, provider, consumer) so repeated
//! requests reuse the same provider connection. The registry is owned by the
//! caller and lives as long as it does; entries are never evicted.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::domain::PublisherKey;
use crate::publisher::EpochPublisher;

use super::{OrandError, ProviderConnector, Result};

/// Memoizing factory for publisher handles.
///
/// Construction is single-flight per key: concurrent first requests for the
/// same triple share one connection attempt. A failed attempt leaves the key
/// unset so the next request tries again.
pub struct PublisherRegistry {
    connector: Arc<dyn ProviderConnector>,
    handles: Mutex<HashMap<PublisherKey, Arc<OnceCell<Arc<EpochPublisher>>>>>,
}

impl PublisherRegistry {
    pub fn new(connector: Arc<dyn ProviderConnector>) -> Self {
        Self {
            connector,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the publisher for a triple
    pub async fn acquire(
        &self,
        rpc_url: &str,
        provider_address: Address,
        consumer_address: Address,
    ) -> Result<Arc<EpochPublisher>> {
        let key = PublisherKey::new(rpc_url, provider_address, consumer_address);

        let cell = {
            let mut handles = self.handles.lock().await;
            handles.entry(key.clone()).or_default().clone()
        };

        if let Some(publisher) = cell.get() {
            debug!("Reusing publisher {}", key);
            return Ok(publisher.clone());
        }

        let publisher = cell
            .get_or_try_init(|| async {
                debug!("Connecting publisher {}", key);
                let provider = self
                    .connector
                    .connect(&key.rpc_url, key.provider_address)
                    .await?;
                Ok::<_, OrandError>(Arc::new(EpochPublisher::new(key.clone(), provider)))
            })
            .await?;

        Ok(publisher.clone())
    }

    /// Look up an existing publisher without connecting
    pub async fn get(&self, key: &PublisherKey) -> Option<Arc<EpochPublisher>> {
        let handles = self.handles.lock().await;
        handles.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of connected publishers
    pub async fn len(&self) -> usize {
        let handles = self.handles.lock().await;
        handles.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockOrandProvider, MockProviderConnector, OrandProvider};

    const RPC: &str = "http://localhost:8545";

    fn connector_expecting(times: usize) -> MockProviderConnector {
        let mut connector = MockProviderConnector::new();
        connector.expect_connect().times(times).returning(|_, _| {
            Ok(Arc::new(MockOrandProvider::new()) as Arc<dyn OrandProvider>)
        });
        connector
    }

    #[tokio::test]
    async fn test_same_triple_reuses_handle() {
        let registry = PublisherRegistry::new(Arc::new(connector_expecting(1)));
        let provider = Address::repeat_byte(1);
        let consumer = Address::repeat_byte(2);

        let first = registry.acquire(RPC, provider, consumer).await.unwrap();
        let second = registry.acquire(RPC, provider, consumer).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(first.provider(), second.provider()));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_triples_get_distinct_handles() {
        let registry = PublisherRegistry::new(Arc::new(connector_expecting(4)));
        let provider = Address::repeat_byte(1);
        let consumer = Address::repeat_byte(2);

        let base = registry.acquire(RPC, provider, consumer).await.unwrap();
        let other_rpc = registry
            .acquire("http://localhost:9545", provider, consumer)
            .await
            .unwrap();
        let other_provider = registry
            .acquire(RPC, Address::repeat_byte(3), consumer)
            .await
            .unwrap();
        let other_consumer = registry
            .acquire(RPC, provider, Address::repeat_byte(4))
            .await
            .unwrap();

        for other in [&other_rpc, &other_provider, &other_consumer] {
            assert!(!Arc::ptr_eq(&base, other));
        }
        assert_eq!(other_consumer.consumer_address(), Address::repeat_byte(4));
        assert_eq!(registry.len().await, 4);
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried() {
        let mut connector = MockProviderConnector::new();
        let mut seq = mockall::Sequence::new();
        connector
            .expect_connect()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(OrandError::Transport("connection refused".to_string())));
        connector
            .expect_connect()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Arc::new(MockOrandProvider::new()) as Arc<dyn OrandProvider>));

        let registry = PublisherRegistry::new(Arc::new(connector));
        let provider = Address::repeat_byte(1);
        let consumer = Address::repeat_byte(2);

        let err = registry.acquire(RPC, provider, consumer).await;
        assert!(matches!(err, Err(OrandError::Transport(_))));
        assert!(registry.is_empty().await);

        registry.acquire(RPC, provider, consumer).await.unwrap();
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_does_not_connect() {
        let registry = PublisherRegistry::new(Arc::new(connector_expecting(0)));
        let key = PublisherKey::new(RPC, Address::ZERO, Address::ZERO);
        assert!(registry.get(&key).await.is_none());
    }
}
