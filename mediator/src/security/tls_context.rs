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

//! Transport-ready TLS configuration built from key material.

use super::key_store::KeyMaterial;
use super::ssl_parameters::ClientAuthentication;
use crate::error::{KeyMaterialError, KeyMaterialReason};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key material loaded from one key store, paired with where it came from.
pub(crate) struct LoadedStore {
    pub(crate) path: PathBuf,
    pub(crate) material: Arc<KeyMaterial>,
}

/// A built TLS context shared by every endpoint that references it.
///
/// Holds a server configuration when an identity (key managers) is present and
/// always holds a client configuration.
pub struct TlsContext {
    server: Option<Arc<ServerConfig>>,
    client: Arc<ClientConfig>,
    server_name: Option<String>,
    client_authentication: ClientAuthentication,
}

impl TlsContext {
    pub(crate) fn build(
        identity: Option<&LoadedStore>,
        trust: Option<&LoadedStore>,
        client_authentication: ClientAuthentication,
        server_name: Option<String>,
    ) -> Result<Self, KeyMaterialError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());

        let identity = identity
            .map(|store| {
                let key = store.material.private_key().ok_or_else(|| {
                    KeyMaterialError::new(&store.path, KeyMaterialReason::NoPrivateKey)
                })?;
                Ok::<_, KeyMaterialError>((
                    store.path.as_path(),
                    store.material.certificates().to_vec(),
                    key.clone_key(),
                ))
            })
            .transpose()?;

        // Trust anchors: the trust store, else the identity's own chain, else public roots.
        let roots = match (trust, &identity) {
            (Some(store), _) => root_store(store.material.certificates()),
            (None, Some((_, chain, _))) => root_store(chain),
            (None, None) => {
                let mut roots = RootCertStore::empty();
                roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
                roots
            }
        };
        let roots = Arc::new(roots);

        let client = build_client(&provider, roots.clone(), identity.as_ref())?;
        let server = identity
            .as_ref()
            .map(|identity| build_server(&provider, roots, client_authentication, identity))
            .transpose()?;

        Ok(Self {
            server: server.map(Arc::new),
            client: Arc::new(client),
            server_name,
            client_authentication,
        })
    }

    /// Configuration for accepting TLS connections; `None` without an identity.
    pub fn server_config(&self) -> Option<Arc<ServerConfig>> {
        self.server.clone()
    }

    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client.clone()
    }

    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn client_authentication(&self) -> ClientAuthentication {
        self.client_authentication
    }
}

impl Debug for TlsContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsContext")
            .field("server", &self.server.is_some())
            .field("server_name", &self.server_name)
            .field("client_authentication", &self.client_authentication)
            .finish()
    }
}

type Identity<'a> = (&'a Path, Vec<CertificateDer<'static>>, PrivateKeyDer<'static>);

fn root_store(certificates: &[CertificateDer<'static>]) -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots.add_parsable_certificates(certificates.iter().cloned());
    roots
}

fn build_client(
    provider: &Arc<CryptoProvider>,
    roots: Arc<RootCertStore>,
    identity: Option<&Identity<'_>>,
) -> Result<ClientConfig, KeyMaterialError> {
    let tls_error = |path: &Path, err: rustls::Error| KeyMaterialError::new(path, err);
    let origin = identity.map(|(path, _, _)| *path).unwrap_or(Path::new(""));

    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|err| tls_error(origin, err))?
        .with_root_certificates(roots);

    match identity {
        Some((path, chain, key)) => builder
            .with_client_auth_cert(chain.clone(), key.clone_key())
            .map_err(|err| tls_error(path, err)),
        None => Ok(builder.with_no_client_auth()),
    }
}

fn build_server(
    provider: &Arc<CryptoProvider>,
    roots: Arc<RootCertStore>,
    client_authentication: ClientAuthentication,
    (path, chain, key): &Identity<'_>,
) -> Result<ServerConfig, KeyMaterialError> {
    let builder = ServerConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|err| KeyMaterialError::new(*path, err))?;

    let builder = match client_authentication {
        ClientAuthentication::None => builder.with_no_client_auth(),
        ClientAuthentication::Want | ClientAuthentication::Require => {
            let verifier = WebPkiClientVerifier::builder_with_provider(roots, provider.clone());
            let verifier = if client_authentication == ClientAuthentication::Want {
                verifier.allow_unauthenticated()
            } else {
                verifier
            };
            let verifier = verifier.build().map_err(|err| {
                KeyMaterialError::new(
                    *path,
                    KeyMaterialReason::Tls(rustls::Error::General(err.to_string())),
                )
            })?;
            builder.with_client_cert_verifier(verifier)
        }
    };

    builder
        .with_single_cert(chain.clone(), key.clone_key())
        .map_err(|err| KeyMaterialError::new(*path, err))
}
