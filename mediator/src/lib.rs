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

//! # mediator
//!
//! `mediator` is an in-process message-routing runtime. Endpoints are
//! configured by URI (`scheme:path?key=value&...`); a registered
//! [`Component`] per scheme turns a validated URI into an [`Endpoint`], and
//! routes wire one consumer endpoint through an ordered chain of steps to any
//! number of producer endpoints.
//!
//! Everything is reached through a [`MediatorContext`], built once with its
//! components and named TLS contexts and then frozen:
//!
//! ```
//! use mediator::{processor_fn, MediatorContext, RouteDefinition};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let context = MediatorContext::builder().build().unwrap();
//!
//! context
//!     .add_route(
//!         RouteDefinition::from("direct:orders")
//!             .route_id("orders")
//!             .process(
//!                 "validate",
//!                 processor_fn(|exchange| {
//!                     if exchange.input().body.is_empty() {
//!                         return Err("empty order".into());
//!                     }
//!                     Ok(())
//!                 }),
//!             )
//!             .to("direct:audit?failIfNoConsumers=false")
//!             .set_header("status", "accepted"),
//!     )
//!     .await
//!     .unwrap();
//! context.start().await.unwrap();
//!
//! let reply = context
//!     .send("direct:orders", mediator::Message::new("42 widgets"))
//!     .await
//!     .unwrap();
//! assert_eq!(reply.header("status"), Some("accepted"));
//!
//! let fault = context
//!     .send("direct:orders", mediator::Message::default())
//!     .await
//!     .unwrap_err();
//! assert_eq!(fault.as_step().map(|step| step.position), Some(0));
//!
//! context.stop().await;
//! # });
//! ```
//!
//! ## Layers
//!
//! * [`uri`] parses endpoint URIs and coerces their parameters against a
//!   component's [`ParameterSchema`](uri::ParameterSchema).
//! * [`security`] resolves `sslContextParameters` references and inline
//!   credentials, loading each key store at most once.
//! * The control plane starts and stops routes: a route only accepts traffic
//!   once every endpoint it names has been resolved and every producer created.
//! * The data plane runs exchanges through the bound steps; a failing step
//!   ends the exchange with a [`Fault`] naming the step and its position.

mod component;
mod config;
mod context;
mod control_plane;
mod data_plane;
mod direct;
mod endpoint;
mod error;
mod exchange;
pub mod observability;
mod processor;
mod registry;
pub mod security;
pub mod uri;

pub use component::{Component, EndpointContext, ResolvedUri};
pub use config::{MediatorConfig, DEFAULT_DRAIN_TIMEOUT_MS};
pub use context::{MediatorContext, MediatorContextBuilder};
pub use control_plane::route::RouteState;
pub use control_plane::route_definition::{RouteDefinition, StepDefinition};
pub use direct::DirectComponent;
pub use endpoint::{Consumer, Endpoint, EndpointCache, ExchangeHandler, Producer};
pub use error::{
    AdapterError, BoxError, BuildError, Fault, KeyMaterialError, KeyMaterialReason,
    ResolveError, RouteStartError, RouteStoppedError, StepExecutionFault, StepPosition,
};
pub use exchange::{header, Body, Exchange, ExchangeOutcome, Headers, Message};
pub use processor::{processor_fn, Processor};
pub use registry::{ComponentRegistry, ComponentRegistryBuilder};
