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

//! # mediator-restlet
//!
//! HTTP and HTTPS endpoints for `mediator`:
//!
//! ```text
//! restlet:https://localhost:8443/users/?restletMethods=post&sslContextParameters=#mySSLContextParameters
//! ```
//!
//! As a route's `from`, the endpoint listens on the address and hands each
//! request whose path and verb match to the route; the route's final message
//! becomes the response. As a `to`, it sends the exchange body to the address
//! and replaces the message with the response.
//!
//! `https` addresses require `sslContextParameters`, naming a TLS context
//! bound in the [`MediatorContext`](mediator::MediatorContext). Listening
//! additionally requires that context to carry key managers.

mod address;
mod component;
mod consumer;
mod endpoint;
mod producer;

pub use address::HttpAddress;
pub use component::{
    RestletComponent, CONNECT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_SOCKET_TIMEOUT,
    RESTLET_METHOD, RESTLET_METHODS, SCHEME, SOCKET_TIMEOUT, THROW_EXCEPTION_ON_FAILURE,
};
pub use endpoint::{RestletEndpoint, RestletEndpointConfig};
