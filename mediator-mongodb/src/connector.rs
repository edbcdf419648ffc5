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

//! Seams between the `mongodb` component and a document-store driver.
//!
//! The component only needs three things from a driver: open a connection
//! to a host set, authenticate a session against a database, and run the
//! handful of operations the endpoint exposes. Everything else about the
//! wire protocol stays behind these traits.

use async_trait::async_trait;
use mediator::security::{Credentials, TlsContext};
use mediator::AdapterError;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Equality filter over top-level document fields. An empty filter matches everything.
pub type Filter = Map<String, Value>;

/// Opens connections to a replica set or standalone server.
#[async_trait]
pub trait MongoConnector: Send + Sync {
    /// Connects to the first reachable host of `hosts`.
    async fn connect(
        &self,
        hosts: &[String],
        tls: Option<Arc<TlsContext>>,
    ) -> Result<Arc<dyn MongoConnection>, AdapterError>;
}

/// An established connection, shared by every endpoint targeting the same hosts.
#[async_trait]
pub trait MongoConnection: Send + Sync {
    /// Opens a session on `database`.
    ///
    /// With `credentials`, the user is authenticated against `auth_source`
    /// first; a failure is reported as [`AdapterError::Authentication`].
    async fn open(
        &self,
        database: &str,
        credentials: Option<&Credentials>,
        auth_source: &str,
    ) -> Result<Arc<dyn DocumentStore>, AdapterError>;
}

/// An authorised session on one database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn database(&self) -> &str;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, AdapterError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, AdapterError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, AdapterError>;

    /// Inserts `documents`, assigning an `_id` to those without one.
    /// Returns the stored documents.
    async fn insert(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<Value>, AdapterError>;

    /// Replaces the document with the same `_id`, or inserts it. Returns the stored document.
    async fn save(&self, collection: &str, document: Value) -> Result<Value, AdapterError>;

    /// Removes every matching document and returns how many were removed.
    async fn remove(&self, collection: &str, filter: &Filter) -> Result<u64, AdapterError>;

    async fn stats(&self) -> Result<Value, AdapterError>;
}

/// Whether `document` has every field of `filter` with an equal value.
pub fn matches_filter(document: &Value, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}
