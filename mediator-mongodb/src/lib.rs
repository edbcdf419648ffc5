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

//! # mediator-mongodb
//!
//! Document-store component for `mediator`. Endpoints are configured
//! entirely by URI, including inline credentials:
//!
//! ```text
//! mongodb:?database=myOtherDb&collection=myOtherColl&operation=count&hosts=localhost:27017&username=myUser&password=myPasswd
//! ```
//!
//! The session is authenticated when the route starts, so bad credentials
//! fail `start` rather than the first exchange. Connections are shared per
//! host set through [`MongoConnectionPool`]; the driver itself sits behind
//! [`MongoConnector`], with [`InMemoryConnector`] shipped for tests and
//! local runs.
//!
//! ```
//! use mediator::{MediatorContext, RouteDefinition};
//! use mediator_mongodb::{InMemoryCluster, InMemoryConnector, MongoDbComponent};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cluster = Arc::new(InMemoryCluster::new(["localhost:27017"]));
//! cluster.insert_document("shop", "orders", json!({"_id": "1", "state": "open"}));
//! let connector = Arc::new(InMemoryConnector::new());
//! connector.add_cluster(cluster);
//!
//! let context = MediatorContext::builder()
//!     .component(Arc::new(MongoDbComponent::new(connector)))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! context
//!     .add_route(
//!         RouteDefinition::from("direct:open-orders")
//!             .to("mongodb:?database=shop&collection=orders&operation=count&hosts=localhost:27017"),
//!     )
//!     .await
//!     .unwrap();
//! context.start().await.unwrap();
//!
//! let count = context
//!     .request_body("direct:open-orders", json!({"state": "open"}))
//!     .await
//!     .unwrap();
//! assert_eq!(count.as_integer(), Some(1));
//! context.stop().await;
//! # });
//! ```

mod component;
mod connector;
mod endpoint;
mod in_memory;
mod operation;
mod pool;

pub use component::{MongoDbComponent, AUTH_SOURCE, COLLECTION, DATABASE, HOSTS, OPERATION, SCHEME};
pub use connector::{matches_filter, DocumentStore, Filter, MongoConnection, MongoConnector};
pub use endpoint::{MongoDbEndpoint, MongoEndpointConfig, RECORDS_AFFECTED, RESULT_TOTAL_SIZE};
pub use in_memory::{InMemoryCluster, InMemoryConnector};
pub use operation::{MongoOperation, UnknownOperation};
pub use pool::MongoConnectionPool;
