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

use crate::connector::{DocumentStore, Filter, MongoConnection};
use crate::operation::MongoOperation;
use crate::pool::MongoConnectionPool;
use async_trait::async_trait;
use mediator::observability::events;
use mediator::security::SecurityContext;
use mediator::uri::EndpointKey;
use mediator::{AdapterError, Body, Endpoint, Exchange, Producer, ResolveError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const COMPONENT: &str = "mongodb";

/// Number of documents written or removed by the last operation.
pub const RECORDS_AFFECTED: &str = "mongodb.recordsAffected";
/// Number of documents returned by `findAll`.
pub const RESULT_TOTAL_SIZE: &str = "mongodb.resultTotalSize";

/// Typed view of a validated `mongodb:` URI.
#[derive(Clone, Debug)]
pub struct MongoEndpointConfig {
    pub database: String,
    pub collection: Option<String>,
    pub operation: MongoOperation,
    pub auth_source: String,
    pub hosts: Vec<String>,
}

pub struct MongoDbEndpoint {
    key: EndpointKey,
    config: MongoEndpointConfig,
    security: SecurityContext,
    connection: Option<Arc<dyn MongoConnection>>,
    pool: Arc<MongoConnectionPool>,
}

impl MongoDbEndpoint {
    pub(crate) fn new(
        key: EndpointKey,
        config: MongoEndpointConfig,
        security: SecurityContext,
        connection: Option<Arc<dyn MongoConnection>>,
        pool: Arc<MongoConnectionPool>,
    ) -> Self {
        Self {
            key,
            config,
            security,
            connection,
            pool,
        }
    }

    pub fn config(&self) -> &MongoEndpointConfig {
        &self.config
    }

    async fn connection(&self) -> Result<Arc<dyn MongoConnection>, AdapterError> {
        match &self.connection {
            Some(connection) => Ok(connection.clone()),
            None => {
                self.pool
                    .connection(&self.config.hosts, self.security.tls().cloned())
                    .await
            }
        }
    }

    async fn open_session(&self) -> Result<Arc<dyn DocumentStore>, AdapterError> {
        let connection = self.connection().await?;
        let credentials = self.security.credentials();
        let session = connection
            .open(&self.config.database, credentials, &self.config.auth_source)
            .await;

        match (&session, credentials) {
            (Ok(_), Some(credentials)) => info!(
                event = events::MONGODB_AUTH_OK,
                component = COMPONENT,
                endpoint = %self.key,
                username = credentials.username(),
                auth_source = %self.config.auth_source,
                "authenticated"
            ),
            (Err(err), _) => warn!(
                event = events::MONGODB_AUTH_FAILED,
                component = COMPONENT,
                endpoint = %self.key,
                err = %err,
                "unable to open session"
            ),
            (Ok(_), None) => {}
        }
        session
    }
}

#[async_trait]
impl Endpoint for MongoDbEndpoint {
    fn key(&self) -> &EndpointKey {
        &self.key
    }

    async fn create_producer(&self) -> Result<Arc<dyn Producer>, ResolveError> {
        let store = self
            .open_session()
            .await
            .map_err(|source| ResolveError::Connection {
                uri: self.key.sanitized().to_string(),
                source,
            })?;

        Ok(Arc::new(MongoDbProducer {
            uri: self.key.sanitized().to_string(),
            operation: self.config.operation,
            collection: self.config.collection.clone().unwrap_or_default(),
            store,
        }))
    }
}

struct MongoDbProducer {
    uri: String,
    operation: MongoOperation,
    collection: String,
    store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl Producer for MongoDbProducer {
    async fn send(&self, exchange: &mut Exchange) -> Result<(), AdapterError> {
        let body = exchange.input().body.clone();
        let collection = self.collection.as_str();

        let mut headers: Vec<(&'static str, String)> = Vec::new();

        let result = match self.operation {
            MongoOperation::Count => {
                let count = self.store.count(collection, &optional_filter(&body)).await?;
                Body::Integer(i64::try_from(count).unwrap_or(i64::MAX))
            }
            MongoOperation::FindAll => {
                let documents = self.store.find(collection, &optional_filter(&body)).await?;
                headers.push((RESULT_TOTAL_SIZE, documents.len().to_string()));
                Body::Json(Value::Array(documents))
            }
            MongoOperation::FindById => {
                let id = document_id(&body).ok_or_else(|| invalid("findById", "an id"))?;
                let mut filter = Filter::new();
                filter.insert("_id".to_string(), id);
                let document = self.store.find_one(collection, &filter).await?;
                document.map(Body::Json).unwrap_or_default()
            }
            MongoOperation::FindOneByQuery => {
                let filter = required_filter(&body, "findOneByQuery")?;
                let document = self.store.find_one(collection, &filter).await?;
                document.map(Body::Json).unwrap_or_default()
            }
            MongoOperation::Insert => {
                let documents = match body.as_json() {
                    Some(Value::Array(documents)) => documents,
                    Some(document @ Value::Object(_)) => vec![document],
                    _ => return Err(invalid("insert", "a JSON document or array of documents")),
                };
                let stored = self.store.insert(collection, documents).await?;
                headers.push((RECORDS_AFFECTED, stored.len().to_string()));
                match <[Value; 1]>::try_from(stored) {
                    Ok([single]) => Body::Json(single),
                    Err(many) => Body::Json(Value::Array(many)),
                }
            }
            MongoOperation::Save => {
                let document = match body.as_json() {
                    Some(document @ Value::Object(_)) => document,
                    _ => return Err(invalid("save", "a JSON document")),
                };
                let stored = self.store.save(collection, document).await?;
                headers.push((RECORDS_AFFECTED, "1".to_string()));
                Body::Json(stored)
            }
            MongoOperation::Remove => {
                let filter = required_filter(&body, "remove")?;
                let removed = self.store.remove(collection, &filter).await?;
                headers.push((RECORDS_AFFECTED, removed.to_string()));
                body
            }
            MongoOperation::GetDbStats => Body::Json(self.store.stats().await?),
        };

        debug!(
            event = events::MONGODB_OPERATION,
            component = COMPONENT,
            endpoint = %self.uri,
            operation = %self.operation,
            "operation completed"
        );

        let mut output = exchange.input().clone();
        output.set_body(result);
        for (name, value) in headers {
            output.set_header(name, value);
        }
        exchange.set_output(output);
        Ok(())
    }
}

/// Text bodies are taken as string ids; anything else by its JSON value.
fn document_id(body: &Body) -> Option<Value> {
    match body {
        Body::Text(_) | Body::Bytes(_) => body
            .as_text()
            .map(|text| Value::String(text.trim().to_string())),
        other => other.as_json(),
    }
}

fn optional_filter(body: &Body) -> Filter {
    match body.as_json() {
        Some(Value::Object(filter)) => filter,
        _ => Filter::new(),
    }
}

fn required_filter(body: &Body, operation: &str) -> Result<Filter, AdapterError> {
    match body.as_json() {
        Some(Value::Object(filter)) => Ok(filter),
        _ => Err(invalid(operation, "a JSON query document")),
    }
}

fn invalid(operation: &str, expected: &str) -> AdapterError {
    AdapterError::InvalidMessage(format!("{operation} expects {expected} as the message body"))
}
