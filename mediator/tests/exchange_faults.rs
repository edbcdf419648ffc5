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

use mediator::{processor_fn, Fault, MediatorContext, Message, RouteDefinition};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
struct ValidationError(&'static str);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed: {}", self.0)
    }
}

impl Error for ValidationError {}

async fn started_context(routes: Vec<RouteDefinition>) -> MediatorContext {
    let context = MediatorContext::builder().build().unwrap();
    for route in routes {
        context.add_route(route).await.unwrap();
    }
    context.start().await.unwrap();
    context
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_step_leaves_fault_and_no_partial_output() {
    integration_test_utils::init_logging();
    let context = started_context(vec![RouteDefinition::from("direct:validate")
        .route_id("validate")
        .set_header("stage", "received")
        .process(
            "check",
            processor_fn(|exchange| {
                exchange.output_mut().set_body("half-written");
                Err(ValidationError("missing customer").into())
            }),
        )
        .set_body("never reached")])
    .await;

    let fault = context
        .send("direct:validate", Message::new("order"))
        .await
        .expect_err("the check step fails");

    let step = fault.as_step().expect("fault comes from a step");
    assert_eq!(step.route_id, "validate");
    assert_eq!(step.position, 1);
    assert_eq!(step.step, "process[check]");
    assert_eq!(step.cause.to_string(), "validation failed: missing customer");
    assert!(step.cause.downcast_ref::<ValidationError>().is_some());
    assert!(fault.to_string().contains("step #1"));

    context.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn fault_in_nested_route_surfaces_at_the_calling_step() {
    integration_test_utils::init_logging();
    let context = started_context(vec![
        RouteDefinition::from("direct:outer")
            .route_id("outer")
            .log("forwarding ${body}")
            .to("direct:inner"),
        RouteDefinition::from("direct:inner")
            .route_id("inner")
            .process("explode", processor_fn(|_| Err("inner boom".into()))),
    ])
    .await;

    let fault = context
        .send("direct:outer", Message::new("x"))
        .await
        .unwrap_err();

    let step = fault.as_step().expect("outer step fault");
    assert_eq!(step.route_id, "outer");
    assert_eq!(step.position, 1);
    assert_eq!(step.step, "to[direct:inner]");
    assert!(step.cause.to_string().contains("inner boom"));

    let direct = context
        .send("direct:inner", Message::new("x"))
        .await
        .unwrap_err();
    assert_eq!(direct.as_step().map(|s| s.route_id.as_str()), Some("inner"));

    context.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn one_faulting_exchange_does_not_affect_others() {
    integration_test_utils::init_logging();
    let context = std::sync::Arc::new(
        started_context(vec![RouteDefinition::from("direct:parity")
            .route_id("parity")
            .process(
                "even-only",
                processor_fn(|exchange| {
                    let value = exchange.input().body.as_integer().unwrap_or(-1);
                    if value % 2 != 0 {
                        return Err(format!("{value} is odd").into());
                    }
                    exchange.output_mut().set_body(value / 2);
                    Ok(())
                }),
            )])
        .await,
    );

    let tasks: Vec<_> = (0..16i64)
        .map(|value| {
            let context = context.clone();
            tokio::spawn(async move {
                (
                    value,
                    context.request_body("direct:parity", value).await,
                )
            })
        })
        .collect();

    for task in tasks {
        let (value, result) = task.await.unwrap();
        if value % 2 == 0 {
            assert_eq!(result.unwrap().as_integer(), Some(value / 2));
        } else {
            assert!(matches!(result, Err(Fault::Step(_))));
        }
    }

    context.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn sending_to_unresolvable_uri_returns_resolve_fault() {
    integration_test_utils::init_logging();
    let context = started_context(vec![]).await;

    let fault = context
        .send("nope:thing?password=secret", Message::default())
        .await
        .unwrap_err();

    match fault {
        Fault::Resolve { uri, message } => {
            assert_eq!(uri, "nope:thing?password=xxxxxx");
            assert!(message.contains("nope"));
        }
        other => panic!("unexpected fault {other:?}"),
    }
}
