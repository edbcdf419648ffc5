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

//! Turns a parsed [`Config`] into a ready-to-start [`MediatorContext`].

use crate::config::{ClusterConfig, Config};
use mediator::{BuildError, MediatorContext, RouteStartError};
use mediator_mongodb::{InMemoryCluster, InMemoryConnector, MongoDbComponent};
use mediator_restlet::RestletComponent;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const COMPONENT: &str = "configurable_mediator";

#[derive(Debug, Error)]
pub enum WiringError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Route(#[from] RouteStartError),
}

/// Builds the context with the `restlet` and `mongodb` components, binds every
/// configured SSL context and adds the routes in file order, without starting them.
pub async fn build_context(config: &Config) -> Result<MediatorContext, WiringError> {
    let connector = Arc::new(InMemoryConnector::new());
    for cluster in &config.mongodb.clusters {
        connector.add_cluster(Arc::new(seed_cluster(cluster)));
    }

    let mut builder = MediatorContext::builder()
        .config(config.mediator.clone())
        .component(Arc::new(RestletComponent::new()))?
        .component(Arc::new(MongoDbComponent::new(connector)))?;
    for (name, parameters) in &config.ssl_contexts {
        builder = builder.bind_ssl_context_parameters(name.clone(), parameters.clone())?;
    }
    let context = builder.build()?;

    for route in &config.routes {
        let route_id = context.add_route(route.to_definition()).await?;
        info!(
            component = COMPONENT,
            route_id = %route_id,
            from = %mediator::uri::sanitize(&route.from),
            steps = route.steps.len(),
            "route declared"
        );
    }
    Ok(context)
}

fn seed_cluster(config: &ClusterConfig) -> InMemoryCluster {
    let cluster = InMemoryCluster::new(config.hosts.iter().cloned());
    for user in &config.users {
        cluster.create_user(&user.database, &user.username, &user.password);
    }
    for seed in &config.documents {
        for document in &seed.documents {
            cluster.insert_document(&seed.database, &seed.collection, document.clone());
        }
    }
    cluster
}

#[cfg(test)]
mod tests {
    use super::{build_context, WiringError};
    use crate::config::Config;
    use integration_test_utils::init_logging;
    use mediator::{Fault, RouteStartError, RouteState};

    const CONFIG: &str = r#"{
        mediator: { name: "wiring-test" },
        mongodb: {
            clusters: [{
                hosts: ["db.local:27017"],
                users: [{ database: "inventory", username: "reader", password: "s3cret" }],
                documents: [{
                    database: "inventory",
                    collection: "parts",
                    documents: [{ kind: "bolt" }, { kind: "nut" }, { kind: "bolt" }],
                }],
            }],
        },
        routes: [
            {
                id: "bolts",
                from: "direct:bolts",
                steps: [
                    { set_body: "{\"kind\":\"bolt\"}" },
                    { to: "mongodb:?database=inventory&collection=parts&operation=count&hosts=db.local:27017&username=reader&password=s3cret" },
                    { set_header: { name: "unit", value: "pieces" } },
                ],
            },
        ],
    }"#;

    #[tokio::test(flavor = "multi_thread")]
    async fn declared_routes_run_against_seeded_cluster() {
        init_logging();
        let config = Config::parse(CONFIG).expect("config should parse");
        let context = build_context(&config).await.expect("context should build");

        assert_eq!(context.name(), "wiring-test");
        assert_eq!(context.route_state("bolts").await, Some(RouteState::Stopped));

        context.start().await.expect("routes should start");
        let reply = context
            .send("direct:bolts", mediator::Message::default())
            .await
            .expect("count should succeed");
        assert_eq!(reply.body.as_integer(), Some(2));
        assert_eq!(reply.header("unit"), Some("pieces"));

        context.stop().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wrong_seeded_password_fails_start() {
        init_logging();
        let config = Config::parse(&CONFIG.replace("password=s3cret", "password=guess"))
            .expect("config should parse");
        let context = build_context(&config).await.expect("context should build");

        let error = context.start().await.expect_err("authentication should fail");
        assert!(matches!(error, RouteStartError::Endpoint { .. }));
        assert!(!error.to_string().contains("guess"));

        let fault = context
            .send("direct:bolts", mediator::Message::default())
            .await
            .expect_err("route never started");
        assert!(matches!(fault, Fault::NoConsumer { .. }));
    }

    #[tokio::test]
    async fn duplicate_route_ids_are_rejected() {
        let config = Config::parse(
            r#"{ routes: [{ id: "a", from: "direct:a" }, { id: "a", from: "direct:b" }] }"#,
        )
        .expect("config should parse");

        match build_context(&config).await {
            Err(WiringError::Route(RouteStartError::DuplicateRoute { route_id })) => {
                assert_eq!(route_id, "a")
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("duplicate route id accepted"),
        }
    }
}
