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

//! Ordered route registry owned by a context.

use super::route::ManagedRoute;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Routes {
    order: Vec<String>,
    by_id: HashMap<String, Arc<ManagedRoute>>,
}

/// Route storage keyed by id, preserving insertion order for start/stop.
#[derive(Default)]
pub(crate) struct RouteTable {
    routes: RwLock<Routes>,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a route. Returns `false`, leaving the table unchanged, if the id is taken.
    pub(crate) async fn insert_route(&self, route: Arc<ManagedRoute>) -> bool {
        let mut routes = self.routes.write().await;
        if routes.by_id.contains_key(route.id()) {
            return false;
        }
        routes.order.push(route.id().to_string());
        routes.by_id.insert(route.id().to_string(), route);
        true
    }

    /// Removes a route. Returns it only when it existed.
    pub(crate) async fn remove_route(&self, route_id: &str) -> Option<Arc<ManagedRoute>> {
        let mut routes = self.routes.write().await;
        let removed = routes.by_id.remove(route_id)?;
        routes.order.retain(|id| id != route_id);
        Some(removed)
    }

    pub(crate) async fn get(&self, route_id: &str) -> Option<Arc<ManagedRoute>> {
        self.routes.read().await.by_id.get(route_id).cloned()
    }

    /// All routes in insertion order.
    pub(crate) async fn routes(&self) -> Vec<Arc<ManagedRoute>> {
        let routes = self.routes.read().await;
        routes
            .order
            .iter()
            .filter_map(|id| routes.by_id.get(id).cloned())
            .collect()
    }

    pub(crate) async fn len(&self) -> usize {
        self.routes.read().await.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::RouteTable;
    use crate::control_plane::route::ManagedRoute;
    use crate::control_plane::route_definition::RouteDefinition;
    use std::sync::Arc;

    fn route(id: &str) -> Arc<ManagedRoute> {
        Arc::new(ManagedRoute::new(
            id.to_string(),
            RouteDefinition::from("direct:a"),
        ))
    }

    #[tokio::test]
    async fn insert_is_idempotent_and_ordered() {
        let table = RouteTable::new();

        assert!(table.insert_route(route("b")).await);
        assert!(table.insert_route(route("a")).await);
        assert!(!table.insert_route(route("b")).await);

        let ids: Vec<_> = table
            .routes()
            .await
            .iter()
            .map(|route| route.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let table = RouteTable::new();
        table.insert_route(route("a")).await;

        assert!(table.remove_route("a").await.is_some());
        assert!(table.remove_route("a").await.is_none());
        assert_eq!(table.len().await, 0);
    }
}
