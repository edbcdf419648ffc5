/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Refcounted endpoint cache keyed by normalized endpoint identity.

use crate::endpoint::Endpoint;
use crate::error::ResolveError;
use crate::observability::events;
use crate::uri::EndpointKey;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

const COMPONENT: &str = "endpoint_cache";

struct EndpointSlot {
    ref_count: usize,
    endpoint: Arc<OnceCell<Arc<dyn Endpoint>>>,
}

/// Shares one [`Endpoint`] between every holder of the same [`EndpointKey`].
///
/// The lock only guards the slot table; endpoint construction runs outside it
/// behind a per-key `OnceCell`, so concurrent first use builds exactly once
/// and unrelated keys never wait on each other.
#[derive(Default)]
pub struct EndpointCache {
    slots: Mutex<HashMap<EndpointKey, EndpointSlot>>,
}

impl EndpointCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a reference on the endpoint for `key`, building it with `create` on first use.
    pub async fn acquire<F, Fut>(
        &self,
        key: &EndpointKey,
        create: F,
    ) -> Result<Arc<dyn Endpoint>, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn Endpoint>, ResolveError>>,
    {
        let cell = {
            let mut slots = self.slots.lock().await;
            let slot = slots.entry(key.clone()).or_insert_with(|| EndpointSlot {
                ref_count: 0,
                endpoint: Arc::new(OnceCell::new()),
            });
            slot.ref_count += 1;
            if slot.endpoint.initialized() {
                debug!(
                    event = events::ENDPOINT_CACHE_HIT,
                    component = COMPONENT,
                    endpoint = %key,
                    ref_count = slot.ref_count,
                    "reusing cached endpoint"
                );
            }
            slot.endpoint.clone()
        };

        match cell.get_or_try_init(create).await {
            Ok(endpoint) => Ok(endpoint.clone()),
            Err(err) => {
                self.release(key).await;
                Err(err)
            }
        }
    }

    /// Drops one reference; the endpoint is evicted when the last holder releases it.
    pub async fn release(&self, key: &EndpointKey) {
        let mut slots = self.slots.lock().await;

        let remaining = {
            let Some(slot) = slots.get_mut(key) else {
                warn!(
                    event = events::ENDPOINT_CACHE_RELEASE_UNKNOWN,
                    component = COMPONENT,
                    endpoint = %key,
                    "release for endpoint that is not cached"
                );
                return;
            };
            slot.ref_count = slot.ref_count.saturating_sub(1);
            slot.ref_count
        };

        if remaining == 0 {
            slots.remove(key);
            debug!(
                event = events::ENDPOINT_CACHE_EVICT,
                component = COMPONENT,
                endpoint = %key,
                "evicted endpoint"
            );
        }
    }

    /// Returns the cached endpoint without taking a reference.
    pub async fn peek(&self, key: &EndpointKey) -> Option<Arc<dyn Endpoint>> {
        let slots = self.slots.lock().await;
        slots
            .get(key)
            .and_then(|slot| slot.endpoint.get())
            .cloned()
    }

    pub async fn ref_count(&self, key: &EndpointKey) -> usize {
        let slots = self.slots.lock().await;
        slots.get(key).map(|slot| slot.ref_count).unwrap_or(0)
    }

    /// Number of distinct endpoints currently held.
    pub async fn endpoint_count(&self) -> usize {
        let slots = self.slots.lock().await;
        slots
            .values()
            .filter(|slot| slot.endpoint.initialized())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::EndpointCache;
    use crate::endpoint::{Endpoint, Producer};
    use crate::error::ResolveError;
    use crate::uri::{EndpointKey, Parameters};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct StubEndpoint {
        key: EndpointKey,
    }

    #[async_trait]
    impl Endpoint for StubEndpoint {
        fn key(&self) -> &EndpointKey {
            &self.key
        }

        async fn create_producer(&self) -> Result<Arc<dyn Producer>, ResolveError> {
            Err(ResolveError::UnsupportedOperation {
                scheme: "stub".to_string(),
                operation: "produce".to_string(),
            })
        }
    }

    fn key(path: &str) -> EndpointKey {
        EndpointKey::new("stub", path, &Parameters::default())
    }

    async fn build(
        key: EndpointKey,
        builds: Arc<AtomicUsize>,
    ) -> Result<Arc<dyn Endpoint>, ResolveError> {
        builds.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(Arc::new(StubEndpoint { key }))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_first_use_builds_once() {
        let cache = Arc::new(EndpointCache::new());
        let builds = Arc::new(AtomicUsize::new(0));
        let key = key("shared");

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let builds = builds.clone();
                let key = key.clone();
                tokio::spawn(async move {
                    cache
                        .acquire(&key, || build(key.clone(), builds))
                        .await
                        .map(|_| ())
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("task should join").expect("acquire ok");
        }

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.ref_count(&key).await, 8);
        assert_eq!(cache.endpoint_count().await, 1);
    }

    #[tokio::test]
    async fn release_evicts_at_zero() {
        let cache = EndpointCache::new();
        let builds = Arc::new(AtomicUsize::new(0));
        let key = key("evict");

        let first = cache
            .acquire(&key, || build(key.clone(), builds.clone()))
            .await
            .unwrap();
        let second = cache
            .acquire(&key, || build(key.clone(), builds.clone()))
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        cache.release(&key).await;
        assert!(cache.peek(&key).await.is_some());
        cache.release(&key).await;
        assert!(cache.peek(&key).await.is_none());

        cache
            .acquire(&key, || build(key.clone(), builds.clone()))
            .await
            .unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_build_does_not_leave_reference() {
        let cache = EndpointCache::new();
        let key = key("broken");

        let result = cache
            .acquire(&key, || async {
                Err(ResolveError::UnresolvedReference {
                    name: "nope".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(cache.ref_count(&key).await, 0);
        assert_eq!(cache.endpoint_count().await, 0);
    }
}
