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

//! Transport security shared by every adapter.
//!
//! Named TLS contexts are bound into a [`SecurityBindings`] table before
//! routes start; endpoints refer to them with `sslContextParameters=#name`.
//! Inline `username`/`password` pairs bypass the table. The two are
//! independent: an endpoint may carry both.

mod bindings;
mod credentials;
mod key_store;
mod resolver;
mod ssl_parameters;
mod tls_context;

pub use bindings::{SecurityBinding, SecurityBindings, SecurityBindingsBuilder};
pub use credentials::Credentials;
pub use key_store::KeyMaterial;
pub use resolver::{SecurityRequest, SecurityResolver, PASSWORD, SSL_CONTEXT_PARAMETERS, USERNAME};
pub use ssl_parameters::{
    ClientAuthentication, KeyManagersParameters, KeyStoreParameters, SslContextParameters,
    TrustManagersParameters,
};
pub use tls_context::TlsContext;

use std::sync::Arc;

/// Resolved security for one endpoint.
#[derive(Clone, Debug, Default)]
pub struct SecurityContext {
    tls: Option<Arc<TlsContext>>,
    credentials: Option<Credentials>,
}

impl SecurityContext {
    pub fn new(tls: Option<Arc<TlsContext>>, credentials: Option<Credentials>) -> Self {
        Self { tls, credentials }
    }

    pub fn tls(&self) -> Option<&Arc<TlsContext>> {
        self.tls.as_ref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.tls.is_none() && self.credentials.is_none()
    }
}
