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

//! Resolves named TLS references and inline credentials into a [`SecurityContext`].

use super::bindings::{SecurityBinding, SecurityBindings};
use super::credentials::Credentials;
use super::key_store::{load_key_store, KeyMaterial, KeyStoreUse};
use super::ssl_parameters::{KeyStoreParameters, SslContextParameters};
use super::tls_context::{LoadedStore, TlsContext};
use super::SecurityContext;
use crate::error::{KeyMaterialError, ResolveError};
use crate::observability::events;
use crate::uri::Parameters;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

const COMPONENT: &str = "security_resolver";

/// URI parameter naming a bound TLS context.
pub const SSL_CONTEXT_PARAMETERS: &str = "sslContextParameters";
pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";

/// What an endpoint asks of the resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecurityRequest<'a> {
    /// Scheme of the requesting endpoint, used in error messages.
    pub scheme: &'a str,
    pub ssl_reference: Option<&'a str>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
}

impl<'a> SecurityRequest<'a> {
    /// Reads the cross-adapter `sslContextParameters`, `username` and `password` parameters.
    pub fn from_parameters(scheme: &'a str, parameters: &'a Parameters) -> Self {
        Self {
            scheme,
            ssl_reference: parameters
                .reference(SSL_CONTEXT_PARAMETERS)
                .or_else(|| parameters.string(SSL_CONTEXT_PARAMETERS)),
            username: parameters.string(USERNAME),
            password: parameters.string(PASSWORD),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct KeyStoreId {
    path: PathBuf,
    password_digest: [u8; 32],
    usage: KeyStoreUse,
}

type Slot<T> = Arc<OnceCell<Arc<T>>>;

/// Reads the frozen bindings table and caches everything expensive it builds.
///
/// Named TLS contexts are built at most once per name, key stores loaded at
/// most once per canonical path and password. Inline credentials are never
/// cached.
pub struct SecurityResolver {
    bindings: SecurityBindings,
    contexts: DashMap<String, Slot<TlsContext>>,
    key_stores: DashMap<KeyStoreId, Slot<KeyMaterial>>,
    key_store_loads: AtomicUsize,
}

impl SecurityResolver {
    pub fn new(bindings: SecurityBindings) -> Self {
        Self {
            bindings,
            contexts: DashMap::new(),
            key_stores: DashMap::new(),
            key_store_loads: AtomicUsize::new(0),
        }
    }

    pub fn bindings(&self) -> &SecurityBindings {
        &self.bindings
    }

    /// Number of key stores read from disk so far.
    pub fn key_store_loads(&self) -> usize {
        self.key_store_loads.load(Ordering::SeqCst)
    }

    pub async fn resolve(
        &self,
        request: SecurityRequest<'_>,
    ) -> Result<SecurityContext, ResolveError> {
        let tls = match request.ssl_reference {
            Some(name) => Some(self.resolve_tls(name).await?),
            None => None,
        };

        let credentials = match (request.username, request.password) {
            (Some(username), Some(password)) => {
                debug!(
                    event = events::SECURITY_INLINE_CREDENTIALS,
                    component = COMPONENT,
                    scheme = request.scheme,
                    username,
                    "using inline credentials"
                );
                Some(Credentials::new(username, password))
            }
            (Some(_), None) => return Err(missing(request.scheme, PASSWORD)),
            (None, Some(_)) => return Err(missing(request.scheme, USERNAME)),
            (None, None) => None,
        };

        Ok(SecurityContext::new(tls, credentials))
    }

    /// Returns the TLS context bound under `name`, building it on first use.
    pub async fn resolve_tls(&self, name: &str) -> Result<Arc<TlsContext>, ResolveError> {
        let name = name.strip_prefix('#').unwrap_or(name);
        let parameters = match self.bindings.get(name) {
            None => {
                return Err(ResolveError::UnresolvedReference {
                    name: name.to_string(),
                })
            }
            Some(SecurityBinding::Context(context)) => return Ok(context.clone()),
            Some(SecurityBinding::Parameters(parameters)) => parameters,
        };

        let slot = self
            .contexts
            .entry(name.to_string())
            .or_default()
            .value()
            .clone();
        let context = slot
            .get_or_try_init(|| self.build_context(name, parameters))
            .await?;
        Ok(context.clone())
    }

    async fn build_context(
        &self,
        name: &str,
        parameters: &SslContextParameters,
    ) -> Result<Arc<TlsContext>, ResolveError> {
        let identity = match &parameters.key_managers {
            Some(key_managers) => Some(
                self.load(
                    &key_managers.key_store,
                    key_managers.effective_key_password(),
                    KeyStoreUse::Identity,
                )
                .await?,
            ),
            None => None,
        };
        let trust = match &parameters.trust_managers {
            Some(trust_managers) => Some(
                self.load(&trust_managers.key_store, "", KeyStoreUse::Trust)
                    .await?,
            ),
            None => None,
        };

        let context = TlsContext::build(
            identity.as_ref(),
            trust.as_ref(),
            parameters.client_authentication,
            parameters.server_name.clone(),
        )?;
        info!(
            event = events::SECURITY_TLS_CONTEXT_BUILT,
            component = COMPONENT,
            name,
            server = context.server_config().is_some(),
            "built tls context"
        );
        Ok(Arc::new(context))
    }

    async fn load(
        &self,
        store: &KeyStoreParameters,
        key_password: &str,
        usage: KeyStoreUse,
    ) -> Result<LoadedStore, KeyMaterialError> {
        let path = tokio::fs::canonicalize(&store.resource)
            .await
            .map_err(|err| KeyMaterialError::new(&store.resource, err))?;

        let mut digest = Sha256::new();
        digest.update(store.password.as_bytes());
        digest.update([0u8]);
        if usage == KeyStoreUse::Identity {
            digest.update(key_password.as_bytes());
        }
        let id = KeyStoreId {
            path: path.clone(),
            password_digest: digest.finalize().into(),
            usage,
        };

        let slot = self.key_stores.entry(id).or_default().value().clone();
        let material = slot
            .get_or_try_init(|| async {
                self.key_store_loads.fetch_add(1, Ordering::SeqCst);
                let load_path = path.clone();
                let key_password = key_password.to_string();
                let loaded = tokio::task::spawn_blocking(move || {
                    load_key_store(&load_path, &key_password, usage)
                })
                .await
                .map_err(|err| KeyMaterialError::new(&path, std::io::Error::other(err)))
                .and_then(|loaded| loaded);

                match loaded {
                    Ok(material) => {
                        debug!(
                            event = events::SECURITY_KEY_STORE_LOAD,
                            component = COMPONENT,
                            path = %path.display(),
                            certificates = material.certificates().len(),
                            "loaded key store"
                        );
                        Ok(Arc::new(material))
                    }
                    Err(err) => {
                        warn!(
                            event = events::SECURITY_KEY_STORE_LOAD_FAILED,
                            component = COMPONENT,
                            path = %path.display(),
                            err = %err.reason,
                            "failed to load key store"
                        );
                        Err(err)
                    }
                }
            })
            .await?
            .clone();

        Ok(LoadedStore { path, material })
    }
}

fn missing(scheme: &str, parameter: &str) -> ResolveError {
    ResolveError::MissingParameter {
        scheme: scheme.to_string(),
        parameter: parameter.to_string(),
    }
}
