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

//! Producer/consumer capability set exposed to protocol adapters.
//!
//! Any adapter that implements [`Endpoint`], [`Producer`] and [`Consumer`]
//! can be registered through a [`Component`](crate::Component).

pub(crate) mod cache;
pub(crate) mod resolver;

pub use cache::EndpointCache;

use crate::error::{AdapterError, ResolveError};
use crate::exchange::{Exchange, ExchangeOutcome, Message};
use crate::uri::EndpointKey;
use async_trait::async_trait;
use std::sync::Arc;

/// One configured source or destination of messages.
///
/// Endpoints are cached by [`EndpointKey`] and shared by every route that
/// refers to the same normalized URI, so implementations must be thread-safe.
#[async_trait]
pub trait Endpoint: Send + Sync {
    fn key(&self) -> &EndpointKey;

    /// Creates a producer. Called once per route step at route start, which
    /// is where connection and authentication problems must surface.
    async fn create_producer(&self) -> Result<Arc<dyn Producer>, ResolveError>;

    /// Creates a consumer. Endpoints that can only send keep the default.
    async fn create_consumer(&self) -> Result<Box<dyn Consumer>, ResolveError> {
        Err(ResolveError::UnsupportedOperation {
            scheme: scheme_of(self.key()),
            operation: "consume".to_string(),
        })
    }
}

/// Sends an exchange to a destination and merges the reply into it.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn send(&self, exchange: &mut Exchange) -> Result<(), AdapterError>;
}

/// Entry point a consumer hands each received message to.
#[async_trait]
pub trait ExchangeHandler: Send + Sync {
    async fn handle(&self, message: Message) -> ExchangeOutcome;
}

/// Source of messages for a route (a listening socket, an in-process queue).
#[async_trait]
pub trait Consumer: Send + Sync {
    async fn start(&mut self, handler: Arc<dyn ExchangeHandler>) -> Result<(), AdapterError>;

    async fn stop(&mut self) -> Result<(), AdapterError>;
}

fn scheme_of(key: &EndpointKey) -> String {
    key.as_str()
        .split_once(':')
        .map(|(scheme, _)| scheme.to_string())
        .unwrap_or_default()
}
