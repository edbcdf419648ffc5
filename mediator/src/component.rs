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

use crate::endpoint::Endpoint;
use crate::error::ResolveError;
use crate::security::{SecurityContext, SecurityRequest, SecurityResolver};
use crate::uri::{EndpointKey, EndpointUri, ParameterSchema, Parameters};
use async_trait::async_trait;
use std::sync::Arc;

/// A factory registered under a URI scheme that turns resolved URIs into endpoints.
///
/// The registry validates and coerces parameters against [`Component::schema`]
/// before [`Component::create_endpoint`] is called, so implementations read
/// typed values and only check combinations the schema cannot express.
#[async_trait]
pub trait Component: Send + Sync {
    fn scheme(&self) -> &'static str;

    fn schema(&self) -> &ParameterSchema;

    /// Builds the endpoint for `uri`. Called at most once per distinct
    /// [`EndpointKey`] while any route holds it.
    async fn create_endpoint(
        &self,
        context: &EndpointContext,
        uri: ResolvedUri,
    ) -> Result<Arc<dyn Endpoint>, ResolveError>;
}

/// A URI that passed schema validation.
#[derive(Clone, Debug)]
pub struct ResolvedUri {
    uri: EndpointUri,
    parameters: Parameters,
    key: EndpointKey,
}

impl ResolvedUri {
    pub(crate) fn new(uri: EndpointUri, parameters: Parameters) -> Self {
        let key = EndpointKey::new(uri.scheme(), uri.path(), &parameters);
        Self {
            uri,
            parameters,
            key,
        }
    }

    pub fn uri(&self) -> &EndpointUri {
        &self.uri
    }

    pub fn scheme(&self) -> &str {
        self.uri.scheme()
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn key(&self) -> &EndpointKey {
        &self.key
    }
}

/// What a component may use while creating an endpoint.
#[derive(Clone)]
pub struct EndpointContext {
    security: Arc<SecurityResolver>,
}

impl EndpointContext {
    pub(crate) fn new(security: Arc<SecurityResolver>) -> Self {
        Self { security }
    }

    pub fn security(&self) -> &Arc<SecurityResolver> {
        &self.security
    }

    /// Resolves the cross-adapter security parameters of `uri`.
    pub async fn resolve_security(
        &self,
        uri: &ResolvedUri,
    ) -> Result<SecurityContext, ResolveError> {
        self.security
            .resolve(SecurityRequest::from_parameters(
                uri.scheme(),
                uri.parameters(),
            ))
            .await
    }
}
