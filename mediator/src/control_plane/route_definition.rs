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

//! Declarative route wiring.

use crate::exchange::Body;
use crate::processor::Processor;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// One step of a route, in declaration order.
#[derive(Clone)]
pub enum StepDefinition {
    /// Runs a user-supplied processor.
    Process {
        label: String,
        processor: Arc<dyn Processor>,
    },
    /// Sends the exchange to a producer endpoint and continues with its reply.
    To(String),
    SetBody(Body),
    SetHeader { name: String, value: String },
    /// Logs a message; `${body}`, `${routeId}`, `${exchangeId}` and `${header.NAME}` are expanded.
    Log(String),
}

impl StepDefinition {
    /// Label used in faults and logs. `to` steps are relabelled with the
    /// sanitized endpoint key once resolved.
    pub fn label(&self) -> String {
        match self {
            StepDefinition::Process { label, .. } => format!("process[{label}]"),
            StepDefinition::To(uri) => format!("to[{}]", crate::uri::sanitize(uri)),
            StepDefinition::SetBody(_) => "setBody".to_string(),
            StepDefinition::SetHeader { name, .. } => format!("setHeader[{name}]"),
            StepDefinition::Log(_) => "log".to_string(),
        }
    }
}

impl Debug for StepDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// A route: one consumer URI and an ordered chain of steps.
///
/// ```
/// use mediator::{processor_fn, RouteDefinition};
///
/// let route = RouteDefinition::from("direct:start")
///     .route_id("greeter")
///     .set_header("greeting", "hello")
///     .process(
///         "uppercase",
///         processor_fn(|exchange| {
///             let text = exchange.input().body.as_text().unwrap_or_default().to_uppercase();
///             exchange.output_mut().set_body(text);
///             Ok(())
///         }),
///     )
///     .to("direct:audit");
///
/// assert_eq!(route.id(), Some("greeter"));
/// assert_eq!(route.steps().len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct RouteDefinition {
    id: Option<String>,
    from: String,
    steps: Vec<StepDefinition>,
}

impl RouteDefinition {
    #[allow(clippy::should_implement_trait)]
    pub fn from(uri: impl Into<String>) -> Self {
        Self {
            id: None,
            from: uri.into(),
            steps: Vec::new(),
        }
    }

    pub fn route_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn process(mut self, label: impl Into<String>, processor: Arc<dyn Processor>) -> Self {
        self.steps.push(StepDefinition::Process {
            label: label.into(),
            processor,
        });
        self
    }

    pub fn to(mut self, uri: impl Into<String>) -> Self {
        self.steps.push(StepDefinition::To(uri.into()));
        self
    }

    pub fn set_body(mut self, body: impl Into<Body>) -> Self {
        self.steps.push(StepDefinition::SetBody(body.into()));
        self
    }

    pub fn set_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.steps.push(StepDefinition::SetHeader {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn log(mut self, message: impl Into<String>) -> Self {
        self.steps.push(StepDefinition::Log(message.into()));
        self
    }

    pub fn step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn from_uri(&self) -> &str {
        &self.from
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// URIs of every producer endpoint, in step order.
    pub fn producer_uris(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            StepDefinition::To(uri) => Some(uri.as_str()),
            _ => None,
        })
    }

    pub(crate) fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }
}
