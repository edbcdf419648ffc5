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

use crate::address::HttpAddress;
use crate::consumer::RestletConsumer;
use crate::producer::RestletProducer;
use async_trait::async_trait;
use hyper::Method;
use mediator::security::TlsContext;
use mediator::uri::EndpointKey;
use mediator::{
    Consumer, Endpoint, KeyMaterialError, KeyMaterialReason, Producer, ResolveError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_rustls::{TlsAcceptor, TlsConnector};

/// Typed view of a validated `restlet:` URI.
#[derive(Clone, Debug)]
pub struct RestletEndpointConfig {
    pub address: HttpAddress,
    /// Verbs the consumer accepts.
    pub methods: Vec<Method>,
    /// Verb the producer uses when the message carries no `http.method` header.
    pub default_method: Method,
    pub ssl_reference: Option<String>,
    pub connect_timeout: Duration,
    pub socket_timeout: Duration,
    pub throw_exception_on_failure: bool,
}

pub struct RestletEndpoint {
    key: EndpointKey,
    config: RestletEndpointConfig,
    tls: Option<Arc<TlsContext>>,
}

impl RestletEndpoint {
    pub(crate) fn new(
        key: EndpointKey,
        config: RestletEndpointConfig,
        tls: Option<Arc<TlsContext>>,
    ) -> Self {
        Self { key, config, tls }
    }

    pub fn config(&self) -> &RestletEndpointConfig {
        &self.config
    }

    fn acceptor(&self) -> Result<Option<TlsAcceptor>, ResolveError> {
        if !self.config.address.secure {
            return Ok(None);
        }
        let reference = self.config.ssl_reference.as_deref().unwrap_or_default();
        self.tls
            .as_ref()
            .and_then(|tls| tls.server_config())
            .map(|config| Some(TlsAcceptor::from(config)))
            .ok_or_else(|| {
                KeyMaterialError::new(format!("#{reference}"), KeyMaterialReason::NoPrivateKey)
                    .into()
            })
    }

    fn connector(&self) -> Option<(TlsConnector, Option<String>)> {
        if !self.config.address.secure {
            return None;
        }
        self.tls.as_ref().map(|tls| {
            (
                TlsConnector::from(tls.client_config()),
                tls.server_name().map(str::to_string),
            )
        })
    }
}

#[async_trait]
impl Endpoint for RestletEndpoint {
    fn key(&self) -> &EndpointKey {
        &self.key
    }

    async fn create_producer(&self) -> Result<Arc<dyn Producer>, ResolveError> {
        Ok(Arc::new(RestletProducer::new(
            self.key.sanitized().to_string(),
            self.config.clone(),
            self.connector(),
        )))
    }

    async fn create_consumer(&self) -> Result<Box<dyn Consumer>, ResolveError> {
        Ok(Box::new(RestletConsumer::new(
            self.key.sanitized().to_string(),
            self.config.address.clone(),
            self.config.methods.clone(),
            self.acceptor()?,
        )))
    }
}
