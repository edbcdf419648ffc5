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

//! Built-in `direct:` component: synchronous in-process hand-off between routes.
//!
//! A route consuming `direct:name` registers its pipeline under `name`;
//! producers for the same name call that pipeline on the sending task.

use crate::component::{Component, EndpointContext, ResolvedUri};
use crate::endpoint::{Consumer, Endpoint, ExchangeHandler, Producer};
use crate::error::{AdapterError, Fault, ResolveError};
use crate::exchange::{Exchange, ExchangeOutcome};
use crate::observability::events;
use crate::uri::{EndpointKey, ParamKind, ParameterSchema, ParameterSpec};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

pub const SCHEME: &str = "direct";
const COMPONENT: &str = "direct";
const FAIL_IF_NO_CONSUMERS: &str = "failIfNoConsumers";

type Handlers = Arc<DashMap<String, Arc<dyn ExchangeHandler>>>;

pub struct DirectComponent {
    schema: ParameterSchema,
    handlers: Handlers,
}

impl DirectComponent {
    pub fn new() -> Self {
        Self {
            schema: ParameterSchema::new(SCHEME)
                .with(ParameterSpec::optional(FAIL_IF_NO_CONSUMERS, ParamKind::Boolean)),
            handlers: Arc::new(DashMap::new()),
        }
    }

    /// Whether a consumer is currently registered under `name`.
    pub fn has_consumer(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl Default for DirectComponent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for DirectComponent {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    async fn create_endpoint(
        &self,
        _context: &EndpointContext,
        uri: ResolvedUri,
    ) -> Result<Arc<dyn Endpoint>, ResolveError> {
        let name = uri.path().trim_matches('/');
        if name.is_empty() {
            return Err(ResolveError::MalformedUri {
                uri: uri.key().sanitized().to_string(),
                reason: "direct endpoints need a name".to_string(),
            });
        }

        Ok(Arc::new(DirectEndpoint {
            key: uri.key().clone(),
            name: name.to_string(),
            fail_if_no_consumers: uri
                .parameters()
                .boolean(FAIL_IF_NO_CONSUMERS)
                .unwrap_or(true),
            handlers: self.handlers.clone(),
        }))
    }
}

struct DirectEndpoint {
    key: EndpointKey,
    name: String,
    fail_if_no_consumers: bool,
    handlers: Handlers,
}

#[async_trait]
impl Endpoint for DirectEndpoint {
    fn key(&self) -> &EndpointKey {
        &self.key
    }

    async fn create_producer(&self) -> Result<Arc<dyn Producer>, ResolveError> {
        Ok(Arc::new(DirectProducer {
            uri: self.key.sanitized().to_string(),
            name: self.name.clone(),
            fail_if_no_consumers: self.fail_if_no_consumers,
            handlers: self.handlers.clone(),
        }))
    }

    async fn create_consumer(&self) -> Result<Box<dyn Consumer>, ResolveError> {
        Ok(Box::new(DirectConsumer {
            uri: self.key.sanitized().to_string(),
            name: self.name.clone(),
            handlers: self.handlers.clone(),
            registered: None,
        }))
    }
}

struct DirectProducer {
    uri: String,
    name: String,
    fail_if_no_consumers: bool,
    handlers: Handlers,
}

#[async_trait]
impl Producer for DirectProducer {
    async fn send(&self, exchange: &mut Exchange) -> Result<(), AdapterError> {
        // Clone out of the map so no shard lock is held across the call.
        let handler = self
            .handlers
            .get(&self.name)
            .map(|entry| entry.value().clone());
        let Some(handler) = handler else {
            if self.fail_if_no_consumers {
                return Err(AdapterError::Downstream(Fault::NoConsumer {
                    uri: self.uri.clone(),
                }));
            }
            return Ok(());
        };

        match handler.handle(exchange.input().clone()).await {
            ExchangeOutcome::Completed(message) => {
                exchange.set_output(message);
                Ok(())
            }
            ExchangeOutcome::Faulted(fault) => Err(AdapterError::Downstream(fault)),
        }
    }
}

struct DirectConsumer {
    uri: String,
    name: String,
    handlers: Handlers,
    registered: Option<Arc<dyn ExchangeHandler>>,
}

#[async_trait]
impl Consumer for DirectConsumer {
    async fn start(&mut self, handler: Arc<dyn ExchangeHandler>) -> Result<(), AdapterError> {
        match self.handlers.entry(self.name.clone()) {
            Entry::Occupied(_) => {
                return Err(AdapterError::ConsumerAlreadyRegistered {
                    uri: self.uri.clone(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(handler.clone());
            }
        }
        self.registered = Some(handler);
        debug!(
            event = events::CONSUMER_STARTED,
            component = COMPONENT,
            endpoint = %self.uri,
            "direct consumer registered"
        );
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), AdapterError> {
        if let Some(handler) = self.registered.take() {
            // Only remove our own registration.
            self.handlers
                .remove_if(&self.name, |_, current| Arc::ptr_eq(current, &handler));
            debug!(
                event = events::CONSUMER_STOPPED,
                component = COMPONENT,
                endpoint = %self.uri,
                "direct consumer unregistered"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DirectComponent;
    use crate::component::{Component, EndpointContext, ResolvedUri};
    use crate::endpoint::ExchangeHandler;
    use crate::error::{AdapterError, Fault};
    use crate::exchange::{Exchange, ExchangeOutcome, Message};
    use crate::security::{SecurityBindings, SecurityResolver};
    use crate::uri::EndpointUri;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl ExchangeHandler for Echo {
        async fn handle(&self, message: Message) -> ExchangeOutcome {
            ExchangeOutcome::Completed(message.with_header("echoed", "true"))
        }
    }

    fn context() -> EndpointContext {
        EndpointContext::new(Arc::new(SecurityResolver::new(SecurityBindings::default())))
    }

    fn resolved(component: &DirectComponent, raw: &str) -> ResolvedUri {
        let uri = EndpointUri::parse(raw).unwrap();
        let parameters = component.schema().coerce(&uri).unwrap();
        ResolvedUri::new(uri, parameters)
    }

    #[tokio::test]
    async fn producer_reaches_registered_consumer() {
        let component = DirectComponent::new();
        let endpoint = component
            .create_endpoint(&context(), resolved(&component, "direct:start"))
            .await
            .unwrap();
        let mut consumer = endpoint.create_consumer().await.unwrap();
        consumer.start(Arc::new(Echo)).await.unwrap();
        let producer = endpoint.create_producer().await.unwrap();

        let mut exchange = Exchange::new(Message::new("ping"));
        producer.send(&mut exchange).await.unwrap();

        assert_eq!(exchange.output().and_then(|m| m.header("echoed")), Some("true"));
        assert!(component.has_consumer("start"));

        consumer.stop().await.unwrap();
        assert!(!component.has_consumer("start"));
    }

    #[tokio::test]
    async fn second_consumer_on_same_name_is_rejected() {
        let component = DirectComponent::new();
        let endpoint = component
            .create_endpoint(&context(), resolved(&component, "direct:dup"))
            .await
            .unwrap();
        let mut first = endpoint.create_consumer().await.unwrap();
        let mut second = endpoint.create_consumer().await.unwrap();

        first.start(Arc::new(Echo)).await.unwrap();
        let error = second.start(Arc::new(Echo)).await.unwrap_err();

        assert!(matches!(error, AdapterError::ConsumerAlreadyRegistered { .. }));
        second.stop().await.unwrap();
        assert!(component.has_consumer("dup"));
    }

    #[tokio::test]
    async fn missing_consumer_faults_unless_disabled() {
        let component = DirectComponent::new();
        let strict = component
            .create_endpoint(&context(), resolved(&component, "direct:nobody"))
            .await
            .unwrap()
            .create_producer()
            .await
            .unwrap();
        let lenient = component
            .create_endpoint(
                &context(),
                resolved(&component, "direct:nobody?failIfNoConsumers=false"),
            )
            .await
            .unwrap()
            .create_producer()
            .await
            .unwrap();

        let mut exchange = Exchange::new(Message::new("x"));
        let error = strict.send(&mut exchange).await.unwrap_err();
        assert!(matches!(
            error,
            AdapterError::Downstream(Fault::NoConsumer { ref uri }) if uri == "direct:nobody"
        ));
        assert!(lenient.send(&mut exchange).await.is_ok());
    }
}
