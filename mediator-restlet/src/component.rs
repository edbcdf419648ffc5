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
use crate::endpoint::{RestletEndpoint, RestletEndpointConfig};
use async_trait::async_trait;
use hyper::Method;
use mediator::security::SSL_CONTEXT_PARAMETERS;
use mediator::uri::{ParamKind, ParameterSchema, ParameterSpec};
use mediator::{Component, Endpoint, EndpointContext, ResolveError, ResolvedUri};
use std::sync::Arc;
use std::time::Duration;

pub const SCHEME: &str = "restlet";

pub const RESTLET_METHODS: &str = "restletMethods";
pub const RESTLET_METHOD: &str = "restletMethod";
pub const CONNECT_TIMEOUT: &str = "connectTimeout";
pub const SOCKET_TIMEOUT: &str = "socketTimeout";
pub const THROW_EXCEPTION_ON_FAILURE: &str = "throwExceptionOnFailure";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(30);

const VERBS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// The `restlet:` component: `restlet:http(s)://host:port/path?...`.
pub struct RestletComponent {
    schema: ParameterSchema,
}

impl RestletComponent {
    pub fn new() -> Self {
        Self {
            schema: ParameterSchema::new(SCHEME)
                .with(ParameterSpec::optional(
                    RESTLET_METHODS,
                    ParamKind::EnumList(VERBS),
                ))
                .with(ParameterSpec::optional(RESTLET_METHOD, ParamKind::Enum(VERBS)))
                .with(ParameterSpec::optional(
                    SSL_CONTEXT_PARAMETERS,
                    ParamKind::Reference,
                ))
                .with(ParameterSpec::optional(CONNECT_TIMEOUT, ParamKind::Duration))
                .with(ParameterSpec::optional(SOCKET_TIMEOUT, ParamKind::Duration))
                .with(ParameterSpec::optional(
                    THROW_EXCEPTION_ON_FAILURE,
                    ParamKind::Boolean,
                )),
        }
    }
}

impl Default for RestletComponent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for RestletComponent {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    async fn create_endpoint(
        &self,
        context: &EndpointContext,
        uri: ResolvedUri,
    ) -> Result<Arc<dyn Endpoint>, ResolveError> {
        let parameters = uri.parameters();
        let address = HttpAddress::parse(uri.path(), uri.key().sanitized())?;

        let ssl_reference = parameters.reference(SSL_CONTEXT_PARAMETERS);
        if address.secure && ssl_reference.is_none() {
            return Err(ResolveError::MissingParameter {
                scheme: SCHEME.to_string(),
                parameter: SSL_CONTEXT_PARAMETERS.to_string(),
            });
        }
        let security = context.resolve_security(&uri).await?;

        let single = parameters.string(RESTLET_METHOD).map(parse_method);
        let methods: Vec<Method> = match parameters.list(RESTLET_METHODS) {
            Some(names) => names.iter().map(|name| parse_method(name)).collect(),
            None => vec![single.clone().unwrap_or(Method::GET)],
        };
        let default_method = single
            .or_else(|| methods.first().cloned())
            .unwrap_or(Method::GET);

        Ok(Arc::new(RestletEndpoint::new(
            uri.key().clone(),
            RestletEndpointConfig {
                address,
                methods,
                default_method,
                ssl_reference: ssl_reference.map(str::to_string),
                connect_timeout: parameters
                    .duration(CONNECT_TIMEOUT)
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
                socket_timeout: parameters
                    .duration(SOCKET_TIMEOUT)
                    .unwrap_or(DEFAULT_SOCKET_TIMEOUT),
                throw_exception_on_failure: parameters
                    .boolean(THROW_EXCEPTION_ON_FAILURE)
                    .unwrap_or(true),
            },
            security.tls().cloned(),
        )))
    }
}

// Names are validated against VERBS by the schema.
fn parse_method(name: &str) -> Method {
    Method::from_bytes(name.as_bytes()).unwrap_or(Method::GET)
}
