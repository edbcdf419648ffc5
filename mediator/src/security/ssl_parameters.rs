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

//! Declarative TLS configuration, bound by name before routes start.

use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

/// Whether a TLS server asks connecting clients for a certificate.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ClientAuthentication {
    #[default]
    None,
    Want,
    Require,
}

/// A PEM key store: certificates plus at most one private key.
#[derive(Clone, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KeyStoreParameters {
    pub resource: PathBuf,
    #[serde(default)]
    pub password: String,
}

impl KeyStoreParameters {
    pub fn new(resource: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            password: password.into(),
        }
    }
}

impl Debug for KeyStoreParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStoreParameters")
            .field("resource", &self.resource)
            .field("password", &"xxxxxx")
            .finish()
    }
}

/// Identity presented to peers.
#[derive(Clone, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KeyManagersParameters {
    pub key_store: KeyStoreParameters,
    /// Password of the private key; the key store password is used when absent.
    #[serde(default)]
    pub key_password: Option<String>,
}

impl KeyManagersParameters {
    pub fn new(key_store: KeyStoreParameters) -> Self {
        Self {
            key_store,
            key_password: None,
        }
    }

    pub fn with_key_password(mut self, key_password: impl Into<String>) -> Self {
        self.key_password = Some(key_password.into());
        self
    }

    pub(crate) fn effective_key_password(&self) -> &str {
        self.key_password
            .as_deref()
            .unwrap_or(self.key_store.password.as_str())
    }
}

impl Debug for KeyManagersParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManagersParameters")
            .field("key_store", &self.key_store)
            .field("key_password", &self.key_password.as_ref().map(|_| "xxxxxx"))
            .finish()
    }
}

/// Certificates trusted when verifying peers.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TrustManagersParameters {
    pub key_store: KeyStoreParameters,
}

impl TrustManagersParameters {
    pub fn new(key_store: KeyStoreParameters) -> Self {
        Self { key_store }
    }
}

/// Named TLS configuration, turned into a [`TlsContext`](super::TlsContext)
/// the first time a route refers to it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SslContextParameters {
    #[serde(default)]
    pub key_managers: Option<KeyManagersParameters>,
    #[serde(default)]
    pub trust_managers: Option<TrustManagersParameters>,
    #[serde(default)]
    pub client_authentication: ClientAuthentication,
    /// Overrides the host name used for SNI and certificate verification.
    #[serde(default)]
    pub server_name: Option<String>,
}

impl SslContextParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_managers(mut self, key_managers: KeyManagersParameters) -> Self {
        self.key_managers = Some(key_managers);
        self
    }

    pub fn with_trust_managers(mut self, trust_managers: TrustManagersParameters) -> Self {
        self.trust_managers = Some(trust_managers);
        self
    }

    pub fn with_client_authentication(mut self, client_authentication: ClientAuthentication) -> Self {
        self.client_authentication = client_authentication;
        self
    }

    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }
}
