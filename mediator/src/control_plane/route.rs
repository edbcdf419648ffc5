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

//! Route lifecycle: acquiring endpoints on start, draining and releasing on stop.

use super::route_definition::{RouteDefinition, StepDefinition};
use crate::data_plane::inflight::InflightTracker;
use crate::data_plane::pipeline::{BoundAction, BoundStep, Pipeline};
use crate::endpoint::resolver::{EndpointLease, EndpointResolver};
use crate::endpoint::{Consumer, ExchangeHandler};
use crate::error::{ResolveError, RouteStartError, StepPosition};
use crate::observability::events;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const COMPONENT: &str = "route";

/// Lifecycle state of a route.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouteState {
    /// Defined but not running. Initial state, and the state after a stop.
    Stopped,
    Starting,
    Started,
    Stopping,
    /// The last start attempt failed; the route holds no resources.
    Failed,
}

impl Display for RouteState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            RouteState::Stopped => "stopped",
            RouteState::Starting => "starting",
            RouteState::Started => "started",
            RouteState::Stopping => "stopping",
            RouteState::Failed => "failed",
        };
        f.write_str(state)
    }
}

/// Resources held while a route is started.
struct ActiveRoute {
    consumer: Box<dyn Consumer>,
    leases: Vec<EndpointLease>,
    cancellation: CancellationToken,
    inflight: Arc<InflightTracker>,
}

/// A route registered in a context.
pub(crate) struct ManagedRoute {
    id: String,
    definition: RouteDefinition,
    state: watch::Sender<RouteState>,
    // Serializes start and stop of this route.
    active: Mutex<Option<ActiveRoute>>,
}

impl ManagedRoute {
    pub(crate) fn new(id: String, definition: RouteDefinition) -> Self {
        let (state, _) = watch::channel(RouteState::Stopped);
        Self {
            id,
            definition,
            state,
            active: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn definition(&self) -> &RouteDefinition {
        &self.definition
    }

    pub(crate) fn state(&self) -> RouteState {
        *self.state.borrow()
    }

    fn set_state(&self, state: RouteState) {
        self.state.send_replace(state);
    }

    /// Starts the route. Starting a started route is a no-op.
    pub(crate) async fn start(&self, endpoints: &EndpointResolver) -> Result<(), RouteStartError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Ok(());
        }

        self.set_state(RouteState::Starting);
        info!(
            event = events::ROUTE_START_BEGIN,
            component = COMPONENT,
            route_id = %self.id,
            from = %crate::uri::sanitize(self.definition.from_uri()),
            steps = self.definition.steps().len(),
            "starting route"
        );

        let mut leases = Vec::new();
        match self.activate(endpoints, &mut leases).await {
            Ok(running) => {
                *active = Some(running);
                self.set_state(RouteState::Started);
                info!(
                    event = events::ROUTE_START_OK,
                    component = COMPONENT,
                    route_id = %self.id,
                    endpoints = leases_len(&active),
                    "route started"
                );
                Ok(())
            }
            Err(err) => {
                endpoints.release_all(&leases).await;
                self.set_state(RouteState::Failed);
                warn!(
                    event = events::ROUTE_START_FAILED,
                    component = COMPONENT,
                    route_id = %self.id,
                    err = %err,
                    "route failed to start"
                );
                Err(err)
            }
        }
    }

    /// Acquires every endpoint, binds producers and starts the consumer.
    /// Whatever was acquired is left in `leases` for the caller to release on failure.
    async fn activate(
        &self,
        endpoints: &EndpointResolver,
        leases: &mut Vec<EndpointLease>,
    ) -> Result<ActiveRoute, RouteStartError> {
        let from = self.definition.from_uri();
        let consumer_endpoint = endpoints
            .acquire(from)
            .await
            .map_err(|source| self.endpoint_error(StepPosition::Consumer, from, source))?;
        leases.push(consumer_endpoint.clone());

        let mut steps = Vec::with_capacity(self.definition.steps().len());
        for (position, step) in self.definition.steps().iter().enumerate() {
            let bound = match step {
                StepDefinition::To(uri) => {
                    let lease = endpoints.acquire(uri).await.map_err(|source| {
                        self.endpoint_error(StepPosition::Step(position), uri, source)
                    })?;
                    leases.push(lease.clone());
                    let producer = lease.endpoint.create_producer().await.map_err(|source| {
                        self.endpoint_error(StepPosition::Step(position), uri, source)
                    })?;
                    BoundStep {
                        label: format!("to[{}]", lease.key),
                        action: BoundAction::Produce(producer),
                    }
                }
                StepDefinition::Process { processor, .. } => BoundStep {
                    label: step.label(),
                    action: BoundAction::Process(processor.clone()),
                },
                StepDefinition::SetBody(body) => BoundStep {
                    label: step.label(),
                    action: BoundAction::SetBody(body.clone()),
                },
                StepDefinition::SetHeader { name, value } => BoundStep {
                    label: step.label(),
                    action: BoundAction::SetHeader {
                        name: name.clone(),
                        value: value.clone(),
                    },
                },
                StepDefinition::Log(template) => BoundStep {
                    label: step.label(),
                    action: BoundAction::Log(template.clone()),
                },
            };
            steps.push(bound);
        }

        let mut consumer = consumer_endpoint
            .endpoint
            .create_consumer()
            .await
            .map_err(|source| self.endpoint_error(StepPosition::Consumer, from, source))?;

        let cancellation = CancellationToken::new();
        let inflight = InflightTracker::new();
        let pipeline: Arc<dyn ExchangeHandler> = Arc::new(Pipeline::new(
            self.id.as_str(),
            steps,
            cancellation.clone(),
            inflight.clone(),
        ));
        consumer
            .start(pipeline)
            .await
            .map_err(|source| RouteStartError::Consumer {
                route_id: self.id.clone(),
                uri: consumer_endpoint.key.sanitized().to_string(),
                source,
            })?;

        Ok(ActiveRoute {
            consumer,
            leases: leases.clone(),
            cancellation,
            inflight,
        })
    }

    /// Stops accepting, stops the consumer, drains in-flight exchanges for up to
    /// `drain_timeout`, cancels whatever remains and releases every endpoint.
    /// Returns the number of exchanges still running when the drain timed out.
    pub(crate) async fn stop(&self, endpoints: &EndpointResolver, drain_timeout: Duration) -> usize {
        let mut active = self.active.lock().await;
        let Some(mut running) = active.take() else {
            return 0;
        };

        self.set_state(RouteState::Stopping);
        info!(
            event = events::ROUTE_STOP_BEGIN,
            component = COMPONENT,
            route_id = %self.id,
            in_flight = running.inflight.in_flight(),
            "stopping route"
        );

        running.inflight.close();
        if let Err(err) = running.consumer.stop().await {
            warn!(
                event = events::CONSUMER_STOPPED,
                component = COMPONENT,
                route_id = %self.id,
                err = %err,
                "consumer did not stop cleanly"
            );
        }

        let mut abandoned = 0;
        if !running.inflight.drain(drain_timeout).await {
            abandoned = running.inflight.in_flight();
            warn!(
                event = events::ROUTE_STOP_DRAIN_TIMEOUT,
                component = COMPONENT,
                route_id = %self.id,
                in_flight = abandoned,
                timeout_ms = drain_timeout.as_millis() as u64,
                "drain timed out; cancelling remaining exchanges"
            );
        }
        running.cancellation.cancel();

        endpoints.release_all(&running.leases).await;
        self.set_state(RouteState::Stopped);
        info!(
            event = events::ROUTE_STOP_OK,
            component = COMPONENT,
            route_id = %self.id,
            "route stopped"
        );
        abandoned
    }

    fn endpoint_error(
        &self,
        position: StepPosition,
        uri: &str,
        source: ResolveError,
    ) -> RouteStartError {
        RouteStartError::Endpoint {
            route_id: self.id.clone(),
            position,
            uri: crate::uri::sanitize(uri),
            source,
        }
    }
}

fn leases_len(active: &Option<ActiveRoute>) -> usize {
    active.as_ref().map(|running| running.leases.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::RouteState;

    #[test]
    fn state_display_is_lowercase() {
        assert_eq!(RouteState::Started.to_string(), "started");
        assert_eq!(RouteState::Failed.to_string(), "failed");
    }
}
