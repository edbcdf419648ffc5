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

//! In-process document store implementing the connector seams.
//!
//! Holds databases, collections and users in memory so routes can be wired
//! and exercised without a server. Authentication follows server rules: a
//! user is defined on one database and may open sessions on that database,
//! or on any database when defined on `admin`.

use crate::connector::{matches_filter, DocumentStore, Filter, MongoConnection, MongoConnector};
use async_trait::async_trait;
use dashmap::DashMap;
use mediator::observability::events;
use mediator::security::{Credentials, TlsContext};
use mediator::AdapterError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const COMPONENT: &str = "mongodb_in_memory";
const ADMIN_DATABASE: &str = "admin";
const ID_FIELD: &str = "_id";

#[derive(Default)]
struct DatabaseState {
    users: HashMap<String, String>,
    collections: HashMap<String, Vec<Value>>,
}

/// A simulated server reachable at a set of `host:port` addresses.
pub struct InMemoryCluster {
    hosts: Vec<String>,
    databases: DashMap<String, DatabaseState>,
    auth_enabled: AtomicBool,
}

impl InMemoryCluster {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
            databases: DashMap::new(),
            auth_enabled: AtomicBool::new(false),
        }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Defines a user on `database`. The first user switches authentication on.
    pub fn create_user(&self, database: &str, username: &str, password: &str) {
        self.databases
            .entry(database.to_string())
            .or_default()
            .users
            .insert(username.to_string(), password.to_string());
        self.auth_enabled.store(true, Ordering::SeqCst);
    }

    pub fn insert_document(&self, database: &str, collection: &str, document: Value) {
        self.databases
            .entry(database.to_string())
            .or_default()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(with_id(document));
    }

    pub fn document_count(&self, database: &str, collection: &str) -> usize {
        self.databases
            .get(database)
            .and_then(|state| state.collections.get(collection).map(Vec::len))
            .unwrap_or(0)
    }

    pub fn drop_collection(&self, database: &str, collection: &str) {
        if let Some(mut state) = self.databases.get_mut(database) {
            state.collections.remove(collection);
        }
    }

    fn authenticate(
        &self,
        database: &str,
        credentials: Option<&Credentials>,
        auth_source: &str,
    ) -> Result<(), AdapterError> {
        let Some(credentials) = credentials else {
            if self.auth_enabled.load(Ordering::SeqCst) {
                return Err(AdapterError::Operation {
                    operation: "open".to_string(),
                    message: format!("command on '{database}' requires authentication"),
                });
            }
            return Ok(());
        };

        let known = self
            .databases
            .get(auth_source)
            .and_then(|state| state.users.get(credentials.username()).cloned());
        if known.as_deref() != Some(credentials.password()) {
            return Err(AdapterError::Authentication {
                username: credentials.username().to_string(),
                source_name: auth_source.to_string(),
            });
        }

        if auth_source != database && auth_source != ADMIN_DATABASE {
            return Err(AdapterError::Operation {
                operation: "open".to_string(),
                message: format!(
                    "user '{}' is not authorized on '{database}'",
                    credentials.username()
                ),
            });
        }
        Ok(())
    }
}

/// Connects to registered [`InMemoryCluster`]s by host address.
#[derive(Default)]
pub struct InMemoryConnector {
    clusters: DashMap<String, Arc<InMemoryCluster>>,
    connects: AtomicUsize,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `cluster` reachable at each of its hosts.
    pub fn add_cluster(&self, cluster: Arc<InMemoryCluster>) {
        for host in cluster.hosts() {
            self.clusters
                .insert(host.to_ascii_lowercase(), cluster.clone());
        }
    }

    /// Number of successful `connect` calls so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MongoConnector for InMemoryConnector {
    async fn connect(
        &self,
        hosts: &[String],
        tls: Option<Arc<TlsContext>>,
    ) -> Result<Arc<dyn MongoConnection>, AdapterError> {
        let cluster = hosts
            .iter()
            .find_map(|host| self.clusters.get(&host.to_ascii_lowercase()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                AdapterError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("no server reachable at {}", hosts.join(",")),
                ))
            })?;

        self.connects.fetch_add(1, Ordering::SeqCst);
        debug!(
            component = COMPONENT,
            hosts = %hosts.join(","),
            tls = tls.is_some(),
            "connected to in-memory cluster"
        );
        Ok(Arc::new(InMemoryConnection { cluster }))
    }
}

struct InMemoryConnection {
    cluster: Arc<InMemoryCluster>,
}

#[async_trait]
impl MongoConnection for InMemoryConnection {
    async fn open(
        &self,
        database: &str,
        credentials: Option<&Credentials>,
        auth_source: &str,
    ) -> Result<Arc<dyn DocumentStore>, AdapterError> {
        self.cluster
            .authenticate(database, credentials, auth_source)?;
        Ok(Arc::new(InMemoryStore {
            cluster: self.cluster.clone(),
            database: database.to_string(),
        }))
    }
}

struct InMemoryStore {
    cluster: Arc<InMemoryCluster>,
    database: String,
}

impl InMemoryStore {
    fn read<T>(&self, collection: &str, read: impl FnOnce(&[Value]) -> T) -> T {
        let state = self.cluster.databases.get(&self.database);
        let documents = state
            .as_ref()
            .and_then(|state| state.collections.get(collection))
            .map(Vec::as_slice)
            .unwrap_or_default();
        read(documents)
    }

    fn write<T>(&self, collection: &str, write: impl FnOnce(&mut Vec<Value>) -> T) -> T {
        let mut state = self
            .cluster
            .databases
            .entry(self.database.clone())
            .or_default();
        write(state.collections.entry(collection.to_string()).or_default())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn database(&self) -> &str {
        &self.database
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, AdapterError> {
        Ok(self.read(collection, |documents| {
            documents
                .iter()
                .filter(|document| matches_filter(document, filter))
                .count() as u64
        }))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, AdapterError> {
        Ok(self.read(collection, |documents| {
            documents
                .iter()
                .filter(|document| matches_filter(document, filter))
                .cloned()
                .collect()
        }))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Value>, AdapterError> {
        Ok(self.read(collection, |documents| {
            documents
                .iter()
                .find(|document| matches_filter(document, filter))
                .cloned()
        }))
    }

    async fn insert(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<Value>, AdapterError> {
        let documents: Vec<Value> = documents.into_iter().map(with_id).collect();
        self.write(collection, |stored| {
            let duplicate = documents.iter().find(|document| {
                stored
                    .iter()
                    .any(|existing| existing.get(ID_FIELD) == document.get(ID_FIELD))
            });
            if let Some(duplicate) = duplicate {
                return Err(AdapterError::Operation {
                    operation: "insert".to_string(),
                    message: format!(
                        "duplicate key {}",
                        duplicate.get(ID_FIELD).cloned().unwrap_or(Value::Null)
                    ),
                });
            }
            stored.extend(documents.iter().cloned());
            Ok(documents)
        })
    }

    async fn save(&self, collection: &str, document: Value) -> Result<Value, AdapterError> {
        let document = with_id(document);
        self.write(collection, |stored| {
            match stored
                .iter_mut()
                .find(|existing| existing.get(ID_FIELD) == document.get(ID_FIELD))
            {
                Some(existing) => *existing = document.clone(),
                None => stored.push(document.clone()),
            }
        });
        Ok(document)
    }

    async fn remove(&self, collection: &str, filter: &Filter) -> Result<u64, AdapterError> {
        Ok(self.write(collection, |stored| {
            let before = stored.len();
            stored.retain(|document| !matches_filter(document, filter));
            (before - stored.len()) as u64
        }))
    }

    async fn stats(&self) -> Result<Value, AdapterError> {
        let (collections, objects) = self
            .cluster
            .databases
            .get(&self.database)
            .map(|state| {
                (
                    state.collections.len(),
                    state.collections.values().map(Vec::len).sum::<usize>(),
                )
            })
            .unwrap_or((0, 0));
        debug!(
            event = events::MONGODB_OPERATION,
            component = COMPONENT,
            database = %self.database,
            "computed database stats"
        );
        Ok(json!({
            "db": self.database,
            "collections": collections,
            "objects": objects,
            "ok": 1,
        }))
    }
}

fn with_id(mut document: Value) -> Value {
    if let Value::Object(fields) = &mut document {
        fields
            .entry(ID_FIELD)
            .or_insert_with(|| Value::String(Uuid::new_v4().simple().to_string()));
    }
    document
}
