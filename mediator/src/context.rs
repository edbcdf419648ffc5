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

//! The runtime context: frozen registries, the endpoint cache, and the routes.

use crate::component::{Component, EndpointContext};
use crate::config::MediatorConfig;
use crate::control_plane::route::{ManagedRoute, RouteState};
use crate::control_plane::route_definition::RouteDefinition;
use crate::control_plane::route_table::RouteTable;
use crate::direct::{self, DirectComponent};
use crate::endpoint::resolver::{EndpointLease, EndpointResolver};
use crate::endpoint::{EndpointCache, Producer};
use crate::error::{AdapterError, BuildError, Fault, ResolveError, RouteStartError};
use crate::exchange::{Body, Exchange, Message};
use crate::observability::events;
use crate::registry::{ComponentRegistry, ComponentRegistryBuilder};
use crate::security::{
    SecurityBindingsBuilder, SecurityResolver, SslContextParameters, TlsContext,
};
use crate::uri::EndpointKey;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

const COMPONENT: &str = "context";

/// Collects components, security bindings and settings, then freezes them.
pub struct MediatorContextBuilder {
    config: MediatorConfig,
    components: ComponentRegistryBuilder,
    bindings: SecurityBindingsBuilder,
}

impl MediatorContextBuilder {
    fn new() -> Self {
        Self {
            config: MediatorConfig::default(),
            components: ComponentRegistryBuilder::new(),
            bindings: SecurityBindingsBuilder::new(),
        }
    }

    pub fn config(mut self, config: MediatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn component(mut self, component: Arc<dyn Component>) -> Result<Self, BuildError> {
        self.components.register(component)?;
        Ok(self)
    }

    pub fn bind_ssl_context_parameters(
        mut self,
        name: impl Into<String>,
        parameters: SslContextParameters,
    ) -> Result<Self, BuildError> {
        self.bindings.bind_ssl_context_parameters(name, parameters)?;
        Ok(self)
    }

    pub fn bind_tls_context(
        mut self,
        name: impl Into<String>,
        context: Arc<TlsContext>,
    ) -> Result<Self, BuildError> {
        self.bindings.bind_tls_context(name, context)?;
        Ok(self)
    }

    /// Freezes the registries. The `direct` component is added unless one was registered.
    pub fn build(mut self) -> Result<MediatorContext, BuildError> {
        if !self.components.contains(direct::SCHEME) {
            self.components.register(Arc::new(DirectComponent::new()))?;
        }

        let registry = self.components.build();
        let security = Arc::new(SecurityResolver::new(self.bindings.build()));
        let endpoints = EndpointResolver::new(
            registry,
            Arc::new(EndpointCache::new()),
            EndpointContext::new(security.clone()),
        );

        info!(
            event = events::CONTEXT_BUILT,
            component = COMPONENT,
            name = %self.config.name,
            schemes = ?endpoints.registry().schemes(),
            "context built"
        );
        Ok(MediatorContext {
            config: self.config,
            security,
            endpoints,
            routes: RouteTable::new(),
            templates: DashMap::new(),
            next_route_id: AtomicUsize::new(1),
        })
    }
}

/// Producer created on behalf of [`MediatorContext::send`], held until the context stops.
struct TemplateProducer {
    lease: EndpointLease,
    producer: Arc<dyn Producer>,
}

/// An in-process message-routing runtime.
///
/// ```
/// use mediator::{MediatorContext, Message, RouteDefinition};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let context = MediatorContext::builder().build().unwrap();
/// context
///     .add_route(RouteDefinition::from("direct:hello").set_body("Hello, world"))
///     .await
///     .unwrap();
/// context.start().await.unwrap();
///
/// let reply = context.send("direct:hello", Message::new("ping")).await.unwrap();
/// assert_eq!(reply.body.as_text().as_deref(), Some("Hello, world"));
///
/// context.stop().await;
/// # });
/// ```
pub struct MediatorContext {
    config: MediatorConfig,
    security: Arc<SecurityResolver>,
    endpoints: EndpointResolver,
    routes: RouteTable,
    templates: DashMap<EndpointKey, Arc<OnceCell<TemplateProducer>>>,
    next_route_id: AtomicUsize,
}

impl MediatorContext {
    pub fn builder() -> MediatorContextBuilder {
        MediatorContextBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComponentRegistry {
        self.endpoints.registry()
    }

    pub fn security(&self) -> &SecurityResolver {
        &self.security
    }

    pub fn endpoint_cache(&self) -> &EndpointCache {
        self.endpoints.cache()
    }

    /// Cache identity `uri` resolves to, without creating anything.
    pub fn endpoint_key(&self, uri: &str) -> Result<EndpointKey, ResolveError> {
        let (_, resolved) = self.endpoints.registry().resolve(uri)?;
        Ok(resolved.key().clone())
    }

    /// Registers a route in the stopped state and returns its id.
    /// Routes without an explicit id are named `route1`, `route2`, ...
    pub async fn add_route(&self, definition: RouteDefinition) -> Result<String, RouteStartError> {
        let id = match definition.id() {
            Some(id) => id.to_string(),
            None => format!(
                "route{}",
                self.next_route_id.fetch_add(1, Ordering::SeqCst)
            ),
        };
        let route = Arc::new(ManagedRoute::new(id.clone(), definition.with_id(id.clone())));

        if !self.routes.insert_route(route).await {
            return Err(RouteStartError::DuplicateRoute { route_id: id });
        }
        info!(
            event = events::ROUTE_ADD,
            component = COMPONENT,
            route_id = %id,
            "route added"
        );
        Ok(id)
    }

    pub async fn start_route(&self, route_id: &str) -> Result<(), RouteStartError> {
        self.route(route_id).await?.start(&self.endpoints).await
    }

    /// Gracefully stops a route. Stopping a stopped route is a no-op.
    pub async fn stop_route(&self, route_id: &str) -> Result<(), RouteStartError> {
        self.route(route_id)
            .await?
            .stop(&self.endpoints, self.config.drain_timeout())
            .await;
        Ok(())
    }

    /// Removes a route that is not running.
    pub async fn remove_route(&self, route_id: &str) -> Result<(), RouteStartError> {
        let route = self.route(route_id).await?;
        let state = route.state();
        if matches!(
            state,
            RouteState::Started | RouteState::Starting | RouteState::Stopping
        ) {
            return Err(RouteStartError::InvalidState {
                route_id: route_id.to_string(),
                state,
            });
        }

        self.routes.remove_route(route_id).await;
        info!(
            event = events::ROUTE_REMOVE,
            component = COMPONENT,
            route_id,
            "route removed"
        );
        Ok(())
    }

    pub async fn route_state(&self, route_id: &str) -> Option<RouteState> {
        self.routes.get(route_id).await.map(|route| route.state())
    }

    pub async fn route_ids(&self) -> Vec<String> {
        self.routes
            .routes()
            .await
            .iter()
            .map(|route| route.id().to_string())
            .collect()
    }

    pub async fn route_count(&self) -> usize {
        self.routes.len().await
    }

    /// The definition a route was added with.
    pub async fn route_definition(&self, route_id: &str) -> Option<RouteDefinition> {
        self.routes
            .get(route_id)
            .await
            .map(|route| route.definition().clone())
    }

    /// Starts every route in insertion order. If one fails, the routes started
    /// by this call are stopped again and the failure is returned.
    pub async fn start(&self) -> Result<(), RouteStartError> {
        let mut started: Vec<Arc<ManagedRoute>> = Vec::new();
        for route in self.routes.routes().await {
            let was_running = route.state() == RouteState::Started;
            if let Err(err) = route.start(&self.endpoints).await {
                for route in started.iter().rev() {
                    route
                        .stop(&self.endpoints, self.config.drain_timeout())
                        .await;
                }
                return Err(err);
            }
            if !was_running {
                started.push(route);
            }
        }
        info!(
            event = events::CONTEXT_STARTED,
            component = COMPONENT,
            name = %self.config.name,
            routes = started.len(),
            "context started"
        );
        Ok(())
    }

    /// Stops every route in reverse order and releases producers created by `send`.
    pub async fn stop(&self) {
        for route in self.routes.routes().await.iter().rev() {
            route
                .stop(&self.endpoints, self.config.drain_timeout())
                .await;
        }

        let keys: Vec<EndpointKey> = self
            .templates
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        for key in keys {
            if let Some((_, slot)) = self.templates.remove(&key) {
                if let Some(template) = slot.get() {
                    self.endpoints.release(&template.lease).await;
                }
            }
        }
        info!(
            event = events::CONTEXT_STOPPED,
            component = COMPONENT,
            name = %self.config.name,
            "context stopped"
        );
    }

    /// Sends `message` to the endpoint at `uri` and returns the reply.
    ///
    /// The producer is created on first use and reused until the context
    /// stops; URIs that normalize to the same endpoint share one producer. Failures come back as a [`Fault`]; a fault raised by a
    /// route behind a `direct:` endpoint is returned as is.
    pub async fn send(&self, uri: &str, message: Message) -> Result<Message, Fault> {
        let producer = self.template_producer(uri).await?;
        let mut exchange = Exchange::new(message);

        match producer.send(&mut exchange).await {
            Ok(()) => exchange.complete().into_result(),
            Err(AdapterError::Downstream(fault)) => Err(fault),
            Err(err) => Err(Fault::Producer {
                uri: crate::uri::sanitize(uri),
                cause: Arc::new(err),
            }),
        }
    }

    /// Sends `body` and returns only the reply body.
    pub async fn request_body(&self, uri: &str, body: impl Into<Body>) -> Result<Body, Fault> {
        self.send(uri, Message::new(body))
            .await
            .map(|message| message.body)
    }

    async fn template_producer(&self, uri: &str) -> Result<Arc<dyn Producer>, Fault> {
        let key = self.endpoint_key(uri).map_err(|err| resolve_fault(uri, &err))?;
        let slot = self
            .templates
            .entry(key)
            .or_default()
            .value()
            .clone();

        let template = slot
            .get_or_try_init(|| async {
                let lease = self.endpoints.acquire(uri).await?;
                match lease.endpoint.create_producer().await {
                    Ok(producer) => Ok(TemplateProducer { lease, producer }),
                    Err(err) => {
                        self.endpoints.release(&lease).await;
                        Err(err)
                    }
                }
            })
            .await
            .map_err(|err: ResolveError| resolve_fault(uri, &err))?;

        Ok(template.producer.clone())
    }

    async fn route(&self, route_id: &str) -> Result<Arc<ManagedRoute>, RouteStartError> {
        self.routes
            .get(route_id)
            .await
            .ok_or_else(|| RouteStartError::UnknownRoute {
                route_id: route_id.to_string(),
            })
    }
}

fn resolve_fault(uri: &str, err: &ResolveError) -> Fault {
    Fault::Resolve {
        uri: crate::uri::sanitize(uri),
        message: err.to_string(),
    }
}
