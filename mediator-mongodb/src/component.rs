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

use crate::connector::{MongoConnection, MongoConnector};
use crate::endpoint::{MongoDbEndpoint, MongoEndpointConfig};
use crate::operation::MongoOperation;
use crate::pool::MongoConnectionPool;
use async_trait::async_trait;
use mediator::security::{PASSWORD, SSL_CONTEXT_PARAMETERS, USERNAME};
use mediator::uri::{ParamKind, ParameterSchema, ParameterSpec};
use mediator::{Component, Endpoint, EndpointContext, ResolveError, ResolvedUri};
use std::collections::HashMap;
use std::sync::Arc;

pub const SCHEME: &str = "mongodb";

pub const DATABASE: &str = "database";
pub const COLLECTION: &str = "collection";
pub const OPERATION: &str = "operation";
pub const HOSTS: &str = "hosts";
pub const AUTH_SOURCE: &str = "authSource";

/// The `mongodb:` component.
///
/// `mongodb:<bean>?database=..&collection=..&operation=..` uses a connection
/// registered under `<bean>`; `mongodb:?hosts=..` connects through the
/// pool instead. Inline `username`/`password` authenticate each producer's
/// session against `authSource` (default: `database`).
pub struct MongoDbComponent {
    schema: ParameterSchema,
    pool: Arc<MongoConnectionPool>,
    beans: HashMap<String, Arc<dyn MongoConnection>>,
}

impl MongoDbComponent {
    pub fn new(connector: Arc<dyn MongoConnector>) -> Self {
        Self {
            schema: ParameterSchema::new(SCHEME)
                .with(ParameterSpec::required(DATABASE, ParamKind::String))
                .with(ParameterSpec::optional(COLLECTION, ParamKind::String))
                .with(ParameterSpec::optional(OPERATION, ParamKind::String))
                .with(ParameterSpec::optional(HOSTS, ParamKind::List))
                .with(ParameterSpec::optional(USERNAME, ParamKind::String))
                .with(ParameterSpec::optional(PASSWORD, ParamKind::String).secret())
                .with(ParameterSpec::optional(AUTH_SOURCE, ParamKind::String))
                .with(ParameterSpec::optional(
                    SSL_CONTEXT_PARAMETERS,
                    ParamKind::Reference,
                )),
            pool: Arc::new(MongoConnectionPool::new(connector)),
            beans: HashMap::new(),
        }
    }

    /// Registers a ready connection that endpoints select by URI path.
    pub fn with_connection_bean(
        mut self,
        name: impl Into<String>,
        connection: Arc<dyn MongoConnection>,
    ) -> Self {
        self.beans.insert(name.into(), connection);
        self
    }

    pub fn pool(&self) -> &Arc<MongoConnectionPool> {
        &self.pool
    }
}

#[async_trait]
impl Component for MongoDbComponent {
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
        let missing = |parameter: &str| ResolveError::MissingParameter {
            scheme: SCHEME.to_string(),
            parameter: parameter.to_string(),
        };

        let operation: MongoOperation = parameters
            .string(OPERATION)
            .ok_or_else(|| missing(OPERATION))?
            .parse()
            .map_err(|_| ResolveError::UnsupportedOperation {
                scheme: SCHEME.to_string(),
                operation: parameters.string(OPERATION).unwrap_or_default().to_string(),
            })?;

        let collection = parameters.string(COLLECTION).map(str::to_string);
        if operation.requires_collection() && collection.is_none() {
            return Err(missing(COLLECTION));
        }

        let bean_name = uri.path().trim_matches('/');
        let connection = if bean_name.is_empty() {
            None
        } else {
            Some(
                self.beans
                    .get(bean_name)
                    .cloned()
                    .ok_or_else(|| ResolveError::UnresolvedReference {
                        name: bean_name.to_string(),
                    })?,
            )
        };
        let hosts = parameters.list(HOSTS).map(<[String]>::to_vec);
        if connection.is_none() && hosts.is_none() {
            return Err(missing(HOSTS));
        }

        let database = parameters
            .string(DATABASE)
            .ok_or_else(|| missing(DATABASE))?
            .to_string();
        let auth_source = parameters
            .string(AUTH_SOURCE)
            .map(str::to_string)
            .unwrap_or_else(|| database.clone());

        let security = context.resolve_security(&uri).await?;

        Ok(Arc::new(MongoDbEndpoint::new(
            uri.key().clone(),
            MongoEndpointConfig {
                database,
                collection,
                operation,
                auth_source,
                hosts: hosts.unwrap_or_default(),
            },
            security,
            connection,
            self.pool.clone(),
        )))
    }
}
