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

//! Turns URI strings into shared endpoints through the registry and the cache.

use super::{Endpoint, EndpointCache};
use crate::component::EndpointContext;
use crate::error::ResolveError;
use crate::observability::events;
use crate::registry::ComponentRegistry;
use crate::uri::EndpointKey;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "endpoint_resolver";

/// A reference-counted hold on a cached endpoint. Must be handed back with
/// [`EndpointResolver::release`].
#[derive(Clone)]
pub(crate) struct EndpointLease {
    pub(crate) key: EndpointKey,
    pub(crate) endpoint: Arc<dyn Endpoint>,
}

pub(crate) struct EndpointResolver {
    registry: ComponentRegistry,
    cache: Arc<EndpointCache>,
    context: EndpointContext,
}

impl EndpointResolver {
    pub(crate) fn new(
        registry: ComponentRegistry,
        cache: Arc<EndpointCache>,
        context: EndpointContext,
    ) -> Self {
        Self {
            registry,
            cache,
            context,
        }
    }

    pub(crate) fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub(crate) fn cache(&self) -> &Arc<EndpointCache> {
        &self.cache
    }

    /// Resolves `uri` and takes a reference on its endpoint, creating it on first use.
    pub(crate) async fn acquire(&self, uri: &str) -> Result<EndpointLease, ResolveError> {
        let (component, resolved) = self.registry.resolve(uri).map_err(|err| {
            warn!(
                event = events::ENDPOINT_RESOLVE_FAILED,
                component = COMPONENT,
                endpoint = %crate::uri::sanitize(uri),
                err = %err,
                "unable to resolve endpoint uri"
            );
            err
        })?;
        let key = resolved.key().clone();

        let endpoint = self
            .cache
            .acquire(&key, move || async move {
                component.create_endpoint(&self.context, resolved).await
            })
            .await
            .map_err(|err| {
                warn!(
                    event = events::ENDPOINT_RESOLVE_FAILED,
                    component = COMPONENT,
                    endpoint = %key,
                    err = %err,
                    "unable to create endpoint"
                );
                err
            })?;

        debug!(
            event = events::ENDPOINT_RESOLVE_OK,
            component = COMPONENT,
            endpoint = %key,
            "endpoint resolved"
        );
        Ok(EndpointLease { key, endpoint })
    }

    pub(crate) async fn release(&self, lease: &EndpointLease) {
        self.cache.release(&lease.key).await;
    }

    pub(crate) async fn release_all(&self, leases: &[EndpointLease]) {
        for lease in leases.iter().rev() {
            self.release(lease).await;
        }
    }
}
