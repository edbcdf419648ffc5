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

//! Ordered step execution for one started route.

use super::inflight::InflightTracker;
use crate::endpoint::{ExchangeHandler, Producer};
use crate::error::{BoxError, Fault, RouteStoppedError, StepExecutionFault};
use crate::exchange::{Body, Exchange, ExchangeOutcome, Message};
use crate::observability::{events, fields};
use crate::processor::Processor;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMPONENT: &str = "pipeline";

/// A route step with everything it needs already resolved.
pub(crate) enum BoundAction {
    Process(Arc<dyn Processor>),
    Produce(Arc<dyn Producer>),
    SetBody(Body),
    SetHeader { name: String, value: String },
    Log(String),
}

pub(crate) struct BoundStep {
    pub(crate) label: String,
    pub(crate) action: BoundAction,
}

/// Runs each exchange through the route's steps, strictly in order.
///
/// Distinct exchanges run concurrently; one exchange is only ever touched by
/// the task executing it.
pub(crate) struct Pipeline {
    route_id: String,
    steps: Vec<BoundStep>,
    cancellation: CancellationToken,
    inflight: Arc<InflightTracker>,
}

impl Pipeline {
    pub(crate) fn new(
        route_id: impl Into<String>,
        steps: Vec<BoundStep>,
        cancellation: CancellationToken,
        inflight: Arc<InflightTracker>,
    ) -> Self {
        Self {
            route_id: route_id.into(),
            steps,
            cancellation,
            inflight,
        }
    }

    pub(crate) async fn run(&self, mut exchange: Exchange) -> ExchangeOutcome {
        for (position, step) in self.steps.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                return self.stopped(exchange);
            }

            if let Err(cause) = self.execute(step, &mut exchange).await {
                let fault = Fault::Step(StepExecutionFault::new(
                    self.route_id.as_str(),
                    position,
                    step.label.as_str(),
                    cause,
                ));
                return self.faulted(exchange, fault);
            }
            exchange.promote_output();
        }

        // A route stopped while the last step was running must not report success.
        if self.cancellation.is_cancelled() {
            return self.stopped(exchange);
        }

        debug!(
            event = events::EXCHANGE_COMPLETED,
            component = COMPONENT,
            route_id = %self.route_id,
            exchange_id = exchange.id(),
            "exchange completed"
        );
        exchange.complete()
    }

    async fn execute(&self, step: &BoundStep, exchange: &mut Exchange) -> Result<(), BoxError> {
        match &step.action {
            BoundAction::Process(processor) => processor.process(exchange).await,
            BoundAction::Produce(producer) => {
                producer.send(exchange).await.map_err(BoxError::from)
            }
            BoundAction::SetBody(body) => {
                exchange.input_mut().set_body(body.clone());
                Ok(())
            }
            BoundAction::SetHeader { name, value } => {
                exchange.input_mut().set_header(name.as_str(), value.as_str());
                Ok(())
            }
            BoundAction::Log(template) => {
                info!(
                    event = events::STEP_LOG,
                    component = COMPONENT,
                    route_id = %self.route_id,
                    exchange_id = exchange.id(),
                    "{}",
                    render_log(template, &self.route_id, exchange)
                );
                Ok(())
            }
        }
    }

    fn stopped(&self, exchange: Exchange) -> ExchangeOutcome {
        let fault = Fault::RouteStopped(RouteStoppedError {
            route_id: self.route_id.clone(),
            exchange_id: exchange.id().to_string(),
        });
        self.faulted(exchange, fault)
    }

    fn faulted(&self, exchange: Exchange, fault: Fault) -> ExchangeOutcome {
        warn!(
            event = events::EXCHANGE_FAULTED,
            component = COMPONENT,
            route_id = %self.route_id,
            exchange_id = exchange.id(),
            fault = fields::fault_kind(&fault),
            position = %fields::fault_position(&fault),
            err = %fault,
            "exchange faulted"
        );
        exchange.fail(fault)
    }
}

#[async_trait]
impl ExchangeHandler for Pipeline {
    async fn handle(&self, message: Message) -> ExchangeOutcome {
        let exchange = Exchange::for_route(&self.route_id, message);
        let Some(_guard) = self.inflight.try_enter() else {
            debug!(
                event = events::EXCHANGE_REJECTED,
                component = COMPONENT,
                route_id = %self.route_id,
                exchange_id = exchange.id(),
                "route is stopping; rejecting exchange"
            );
            let fault = Fault::RouteStopped(RouteStoppedError {
                route_id: self.route_id.clone(),
                exchange_id: exchange.id().to_string(),
            });
            return exchange.fail(fault);
        };

        debug!(
            event = events::EXCHANGE_CREATED,
            component = COMPONENT,
            route_id = %self.route_id,
            exchange_id = exchange.id(),
            "exchange created"
        );
        self.run(exchange).await
    }
}

/// Expands `${body}`, `${routeId}`, `${exchangeId}` and `${header.NAME}` in a log template.
fn render_log(template: &str, route_id: &str, exchange: &Exchange) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find('}') else {
            rendered.push_str(&rest[start..]);
            return rendered;
        };
        let expression = &tail[..end];
        match expression {
            "body" => rendered.push_str(&exchange.input().body.as_text().unwrap_or_default()),
            "routeId" => rendered.push_str(route_id),
            "exchangeId" => rendered.push_str(exchange.id()),
            other => match other.strip_prefix("header.") {
                Some(name) => rendered.push_str(exchange.input().header(name).unwrap_or_default()),
                None => {
                    rendered.push_str("${");
                    rendered.push_str(expression);
                    rendered.push('}');
                }
            },
        }
        rest = &tail[end + 1..];
    }
    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::{render_log, BoundAction, BoundStep, Pipeline};
    use crate::data_plane::inflight::InflightTracker;
    use crate::endpoint::ExchangeHandler;
    use crate::exchange::{Exchange, ExchangeOutcome, Message};
    use crate::processor::processor_fn;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn step(label: &str, action: BoundAction) -> BoundStep {
        BoundStep {
            label: label.to_string(),
            action,
        }
    }

    fn pipeline(steps: Vec<BoundStep>) -> (Pipeline, CancellationToken, Arc<InflightTracker>) {
        let token = CancellationToken::new();
        let inflight = InflightTracker::new();
        (
            Pipeline::new("r1", steps, token.clone(), inflight.clone()),
            token,
            inflight,
        )
    }

    #[tokio::test]
    async fn steps_run_in_order_and_output_feeds_next_step() {
        let (pipeline, _, _) = pipeline(vec![
            step(
                "process[append-a]",
                BoundAction::Process(processor_fn(|exchange| {
                    let text = exchange.input().body.as_text().unwrap_or_default();
                    let next = format!("{text}a");
                    exchange.output_mut().set_body(next);
                    Ok(())
                })),
            ),
            step(
                "setHeader[k]",
                BoundAction::SetHeader {
                    name: "k".to_string(),
                    value: "v".to_string(),
                },
            ),
            step(
                "process[append-b]",
                BoundAction::Process(processor_fn(|exchange| {
                    let text = exchange.input().body.as_text().unwrap_or_default();
                    let next = format!("{text}b");
                    exchange.input_mut().set_body(next);
                    Ok(())
                })),
            ),
        ]);

        let message = pipeline.handle(Message::new(">")).await.into_result().unwrap();

        assert_eq!(message.body.as_text().as_deref(), Some(">ab"));
        assert_eq!(message.header("k"), Some("v"));
    }

    #[tokio::test]
    async fn failing_step_faults_with_position_and_discards_output() {
        let (pipeline, _, _) = pipeline(vec![
            step("setBody", BoundAction::SetBody("ok".into())),
            step(
                "process[boom]",
                BoundAction::Process(processor_fn(|exchange| {
                    exchange.output_mut().set_body("partial");
                    Err("boom".into())
                })),
            ),
            step("log", BoundAction::Log("unreachable".to_string())),
        ]);

        let outcome = pipeline.handle(Message::new("in")).await;

        let ExchangeOutcome::Faulted(fault) = outcome else {
            panic!("expected a fault");
        };
        let step = fault.as_step().expect("step fault");
        assert_eq!(step.position, 1);
        assert_eq!(step.step, "process[boom]");
        assert_eq!(step.cause.to_string(), "boom");
    }

    #[tokio::test]
    async fn cancelled_pipeline_faults_at_step_boundary() {
        let (pipeline, token, _) = pipeline(vec![step("setBody", BoundAction::SetBody("x".into()))]);
        token.cancel();

        let fault = pipeline
            .handle(Message::new("in"))
            .await
            .into_result()
            .unwrap_err();

        assert!(fault.is_route_stopped());
    }

    #[tokio::test]
    async fn cancellation_during_last_step_faults_instead_of_completing() {
        let token = CancellationToken::new();
        let stop = token.clone();
        let inflight = InflightTracker::new();
        let pipeline = Pipeline::new(
            "r1",
            vec![step(
                "process[stop-midway]",
                BoundAction::Process(processor_fn(move |exchange| {
                    stop.cancel();
                    exchange.output_mut().set_body("done");
                    Ok(())
                })),
            )],
            token,
            inflight,
        );

        let fault = pipeline
            .handle(Message::new("in"))
            .await
            .into_result()
            .unwrap_err();

        assert!(fault.is_route_stopped());
    }

    #[tokio::test]
    async fn closed_route_rejects_new_exchanges() {
        let (pipeline, _, inflight) = pipeline(vec![]);
        inflight.close();

        let fault = pipeline
            .handle(Message::new("in"))
            .await
            .into_result()
            .unwrap_err();

        assert!(fault.is_route_stopped());
        assert_eq!(inflight.in_flight(), 0);
    }

    #[test]
    fn log_template_expands_known_expressions() {
        let exchange = Exchange::new(Message::new("hi").with_header("user", "ann"));

        assert_eq!(
            render_log("${routeId}: ${body} from ${header.user} ${unknown}", "r1", &exchange),
            "r1: hi from ann ${unknown}"
        );
        assert_eq!(render_log("open ${body", "r1", &exchange), "open ${body");
    }
}
