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

use async_trait::async_trait;
use mediator::{
    BoxError, Exchange, MediatorConfig, MediatorContext, Message, Processor, ResolveError,
    RouteDefinition, RouteStartError, RouteState, StepPosition,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct SlowProcessor {
    started: Arc<AtomicBool>,
    delay: Duration,
}

#[async_trait]
impl Processor for SlowProcessor {
    async fn process(&self, exchange: &mut Exchange) -> Result<(), BoxError> {
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        exchange.output_mut().set_body("slow done");
        Ok(())
    }
}

struct CountingProcessor(Arc<AtomicUsize>);

#[async_trait]
impl Processor for CountingProcessor {
    async fn process(&self, _exchange: &mut Exchange) -> Result<(), BoxError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn context(drain_timeout_ms: u64) -> MediatorContext {
    MediatorContext::builder()
        .config(MediatorConfig {
            name: "route-lifecycle-test".to_string(),
            drain_timeout_ms,
        })
        .build()
        .expect("context should build")
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_producer_fails_start_and_never_accepts_messages() {
    integration_test_utils::init_logging();
    let context = context(1_000);
    let exchanges = Arc::new(AtomicUsize::new(0));

    context
        .add_route(
            RouteDefinition::from("direct:guarded")
                .route_id("guarded")
                .process("count", Arc::new(CountingProcessor(exchanges.clone())))
                .to("direct:ok")
                .to("direct:bad?failIfNoConsumers=maybe"),
        )
        .await
        .expect("route should be added");

    let error = context
        .start_route("guarded")
        .await
        .expect_err("start must fail on the bad destination");

    match &error {
        RouteStartError::Endpoint {
            route_id,
            position,
            uri,
            source,
        } => {
            assert_eq!(route_id, "guarded");
            assert_eq!(*position, StepPosition::Step(2));
            assert_eq!(uri, "direct:bad?failIfNoConsumers=maybe");
            assert!(matches!(source, ResolveError::InvalidParameter { parameter, .. } if parameter == "failIfNoConsumers"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(error.to_string().contains("step #2"));
    assert_eq!(context.route_state("guarded").await, Some(RouteState::Failed));
    assert_eq!(context.endpoint_cache().endpoint_count().await, 0);

    let fault = context
        .send("direct:guarded", Message::new("hello"))
        .await
        .expect_err("no consumer is registered for a failed route");
    assert!(fault.to_string().contains("no consumer"));
    assert_eq!(exchanges.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_scheme_on_consumer_is_reported_at_consumer_position() {
    integration_test_utils::init_logging();
    let context = context(1_000);
    context
        .add_route(RouteDefinition::from("jms:queue:orders").route_id("jms"))
        .await
        .unwrap();

    let error = context.start_route("jms").await.unwrap_err();

    assert!(matches!(
        error,
        RouteStartError::Endpoint {
            position: StepPosition::Consumer,
            source: ResolveError::UnknownScheme { .. },
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn routes_are_added_started_stopped_and_removed() {
    integration_test_utils::init_logging();
    let context = context(1_000);

    let generated = context
        .add_route(RouteDefinition::from("direct:a").set_body("A"))
        .await
        .unwrap();
    assert_eq!(generated, "route1");
    assert!(matches!(
        context
            .add_route(RouteDefinition::from("direct:b").route_id("route1"))
            .await,
        Err(RouteStartError::DuplicateRoute { .. })
    ));
    assert_eq!(context.route_state("route1").await, Some(RouteState::Stopped));

    context.start().await.unwrap();
    assert_eq!(context.route_state("route1").await, Some(RouteState::Started));
    assert_eq!(
        context.request_body("direct:a", "x").await.unwrap().as_text().as_deref(),
        Some("A")
    );
    assert!(matches!(
        context.remove_route("route1").await,
        Err(RouteStartError::InvalidState {
            state: RouteState::Started,
            ..
        })
    ));

    context.stop_route("route1").await.unwrap();
    assert_eq!(context.route_state("route1").await, Some(RouteState::Stopped));
    assert!(context.request_body("direct:a", "x").await.is_err());

    context.start_route("route1").await.unwrap();
    assert!(context.request_body("direct:a", "x").await.is_ok());
    context.stop_route("route1").await.unwrap();

    context.remove_route("route1").await.unwrap();
    assert_eq!(context.route_state("route1").await, None);
    assert!(matches!(
        context.start_route("route1").await,
        Err(RouteStartError::UnknownRoute { .. })
    ));
    context.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_context_start_stops_routes_it_started() {
    integration_test_utils::init_logging();
    let context = context(1_000);
    context
        .add_route(RouteDefinition::from("direct:first").route_id("first"))
        .await
        .unwrap();
    context
        .add_route(RouteDefinition::from("direct:first").route_id("clash"))
        .await
        .unwrap();

    let error = context.start().await.unwrap_err();

    assert_eq!(error.route_id(), "clash");
    assert!(matches!(error, RouteStartError::Consumer { .. }));
    assert_eq!(context.route_state("first").await, Some(RouteState::Stopped));
    assert_eq!(context.route_state("clash").await, Some(RouteState::Failed));
    assert_eq!(context.endpoint_cache().endpoint_count().await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_waits_for_in_flight_exchanges() {
    integration_test_utils::init_logging();
    let context = Arc::new(context(5_000));
    let started = Arc::new(AtomicBool::new(false));
    context
        .add_route(
            RouteDefinition::from("direct:slow").route_id("slow").process(
                "sleep",
                Arc::new(SlowProcessor {
                    started: started.clone(),
                    delay: Duration::from_millis(200),
                }),
            ),
        )
        .await
        .unwrap();
    context.start().await.unwrap();

    let sender = context.clone();
    let in_flight =
        tokio::spawn(async move { sender.send("direct:slow", Message::new("go")).await });
    assert!(
        integration_test_utils::wait_until(Duration::from_secs(2), || {
            let started = started.clone();
            async move { started.load(Ordering::SeqCst) }
        })
        .await
    );

    context.stop_route("slow").await.unwrap();

    let reply = in_flight.await.unwrap().expect("in-flight exchange completes");
    assert_eq!(reply.body.as_text().as_deref(), Some("slow done"));
    assert_eq!(context.route_state("slow").await, Some(RouteState::Stopped));
}

#[tokio::test(flavor = "multi_thread")]
async fn exchanges_outliving_the_drain_timeout_fault_with_route_stopped() {
    integration_test_utils::init_logging();
    let context = Arc::new(context(50));
    let started = Arc::new(AtomicBool::new(false));
    let after = Arc::new(AtomicUsize::new(0));
    context
        .add_route(
            RouteDefinition::from("direct:stuck")
                .route_id("stuck")
                .process(
                    "sleep",
                    Arc::new(SlowProcessor {
                        started: started.clone(),
                        delay: Duration::from_millis(400),
                    }),
                )
                .process("after", Arc::new(CountingProcessor(after.clone()))),
        )
        .await
        .unwrap();
    context.start().await.unwrap();

    let sender = context.clone();
    let in_flight =
        tokio::spawn(async move { sender.send("direct:stuck", Message::new("go")).await });
    assert!(
        integration_test_utils::wait_until(Duration::from_secs(2), || {
            let started = started.clone();
            async move { started.load(Ordering::SeqCst) }
        })
        .await
    );

    context.stop_route("stuck").await.unwrap();

    let fault = in_flight.await.unwrap().expect_err("exchange is cancelled");
    assert!(fault.is_route_stopped());
    assert_eq!(after.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn single_step_exchange_outliving_the_drain_timeout_faults() {
    integration_test_utils::init_logging();
    let context = Arc::new(context(50));
    let started = Arc::new(AtomicBool::new(false));
    context
        .add_route(
            RouteDefinition::from("direct:stuck-last")
                .route_id("stuck-last")
                .process(
                    "sleep",
                    Arc::new(SlowProcessor {
                        started: started.clone(),
                        delay: Duration::from_millis(400),
                    }),
                ),
        )
        .await
        .unwrap();
    context.start().await.unwrap();

    let sender = context.clone();
    let in_flight =
        tokio::spawn(async move { sender.send("direct:stuck-last", Message::new("go")).await });
    assert!(
        integration_test_utils::wait_until(Duration::from_secs(2), || {
            let started = started.clone();
            async move { started.load(Ordering::SeqCst) }
        })
        .await
    );

    context.stop_route("stuck-last").await.unwrap();
    assert_eq!(context.route_state("stuck-last").await, Some(RouteState::Stopped));

    let fault = in_flight
        .await
        .unwrap()
        .expect_err("stopped route must not report success");
    assert!(fault.is_route_stopped());
}
