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
use dashmap::DashMap;
use mediator::observability::events;
use mediator::security::TlsContext;
use mediator::AdapterError;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

const COMPONENT: &str = "mongodb_pool";

/// Identity of a pooled connection: the host set plus the TLS context it was
/// opened with, if any. The context is compared by identity; named contexts
/// are built once per binding, so every endpoint naming the same binding
/// shares a key.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct ConnectionKey {
    hosts: String,
    tls: Option<usize>,
}

impl ConnectionKey {
    fn new(hosts: &[String], tls: Option<&Arc<TlsContext>>) -> Self {
        Self {
            hosts: MongoConnectionPool::host_set_key(hosts),
            tls: tls.map(|context| Arc::as_ptr(context) as usize),
        }
    }
}

struct Slot {
    // Held so the context address in the key cannot be reused while pooled.
    _tls: Option<Arc<TlsContext>>,
    connection: OnceCell<Arc<dyn MongoConnection>>,
}

/// Shares one connection per normalized host set and TLS context.
///
/// Endpoints that differ only in database, collection, operation or
/// credentials reuse the same connection; authentication is per session.
/// A plaintext and a TLS endpoint on the same hosts never share one.
/// A failed connect leaves the slot empty so the next route start retries.
pub struct MongoConnectionPool {
    connector: Arc<dyn MongoConnector>,
    connections: DashMap<ConnectionKey, Arc<Slot>>,
}

impl MongoConnectionPool {
    pub fn new(connector: Arc<dyn MongoConnector>) -> Self {
        Self {
            connector,
            connections: DashMap::new(),
        }
    }

    /// Pool key of a host list: lowercased, sorted, deduplicated.
    pub fn host_set_key(hosts: &[String]) -> String {
        let mut hosts: Vec<String> = hosts
            .iter()
            .map(|host| host.trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();
        hosts.sort();
        hosts.dedup();
        hosts.join(",")
    }

    pub async fn connection(
        &self,
        hosts: &[String],
        tls: Option<Arc<TlsContext>>,
    ) -> Result<Arc<dyn MongoConnection>, AdapterError> {
        let key = ConnectionKey::new(hosts, tls.as_ref());
        let slot = self
            .connections
            .entry(key.clone())
            .or_insert_with(|| {
                Arc::new(Slot {
                    _tls: tls.clone(),
                    connection: OnceCell::new(),
                })
            })
            .value()
            .clone();
        let secure = key.tls.is_some();

        if let Some(connection) = slot.connection.get() {
            debug!(
                event = events::MONGODB_CONNECTION_REUSE,
                component = COMPONENT,
                hosts = %key.hosts,
                tls = secure,
                "reusing connection"
            );
            return Ok(connection.clone());
        }

        let connection = slot
            .connection
            .get_or_try_init(|| async {
                match self.connector.connect(hosts, tls).await {
                    Ok(connection) => {
                        info!(
                            event = events::MONGODB_CONNECT_OK,
                            component = COMPONENT,
                            hosts = %key.hosts,
                            tls = secure,
                            "connected"
                        );
                        Ok(connection)
                    }
                    Err(err) => {
                        warn!(
                            event = events::MONGODB_CONNECT_FAILED,
                            component = COMPONENT,
                            hosts = %key.hosts,
                            tls = secure,
                            err = %err,
                            "connect failed"
                        );
                        Err(err)
                    }
                }
            })
            .await?;
        Ok(connection.clone())
    }

    /// Number of established connections.
    pub fn len(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.value().connection.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
