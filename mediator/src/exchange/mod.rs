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

//! The per-invocation unit of work.
//!
//! An [`Exchange`] carries the current input message, an optional staged
//! output and a property bag. Steps mutate it through `&mut`, so a single
//! exchange is never touched by two tasks at once. Completion consumes the
//! exchange and yields an [`ExchangeOutcome`]: either the final message or a
//! fault, never both.

mod message;

pub use message::{header, Body, Headers, Message};

use crate::error::Fault;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug)]
pub struct Exchange {
    id: String,
    route_id: Option<String>,
    input: Message,
    output: Option<Message>,
    properties: HashMap<String, serde_json::Value>,
}

impl Exchange {
    pub fn new(input: Message) -> Self {
        Self {
            id: Uuid::new_v4().hyphenated().to_string(),
            route_id: None,
            input,
            output: None,
            properties: HashMap::new(),
        }
    }

    pub(crate) fn for_route(route_id: &str, input: Message) -> Self {
        let mut exchange = Self::new(input);
        exchange.route_id = Some(route_id.to_string());
        exchange
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn route_id(&self) -> Option<&str> {
        self.route_id.as_deref()
    }

    /// The current input message.
    pub fn input(&self) -> &Message {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Message {
        &mut self.input
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn output(&self) -> Option<&Message> {
        self.output.as_ref()
    }

    /// Stages an output message, creating an empty one on first use.
    pub fn output_mut(&mut self) -> &mut Message {
        self.output.get_or_insert_with(Message::default)
    }

    pub fn set_output(&mut self, message: Message) {
        self.output = Some(message);
    }

    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.properties.insert(name.into(), value);
    }

    /// Promotes a staged output to be the next step's input.
    pub(crate) fn promote_output(&mut self) {
        if let Some(output) = self.output.take() {
            self.input = output;
        }
    }

    /// Completes successfully; the result is the staged output or, if none, the input.
    pub fn complete(mut self) -> ExchangeOutcome {
        self.promote_output();
        ExchangeOutcome::Completed(self.input)
    }

    /// Completes with a fault. Any staged output is discarded.
    pub fn fail(self, fault: Fault) -> ExchangeOutcome {
        ExchangeOutcome::Faulted(fault)
    }
}

/// Result of processing one exchange.
#[derive(Clone, Debug)]
pub enum ExchangeOutcome {
    Completed(Message),
    Faulted(Fault),
}

impl ExchangeOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ExchangeOutcome::Completed(_))
    }

    pub fn into_result(self) -> Result<Message, Fault> {
        match self {
            ExchangeOutcome::Completed(message) => Ok(message),
            ExchangeOutcome::Faulted(fault) => Err(fault),
        }
    }
}

impl From<Result<Message, Fault>> for ExchangeOutcome {
    fn from(value: Result<Message, Fault>) -> Self {
        match value {
            Ok(message) => ExchangeOutcome::Completed(message),
            Err(fault) => ExchangeOutcome::Faulted(fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Exchange, ExchangeOutcome, Message};
    use crate::error::{Fault, RouteStoppedError};

    #[test]
    fn staged_output_becomes_next_input() {
        let mut exchange = Exchange::new(Message::new("in"));
        exchange.output_mut().set_body("out");
        exchange.promote_output();

        assert_eq!(exchange.input().body.as_text().as_deref(), Some("out"));
        assert!(!exchange.has_output());
    }

    #[test]
    fn completion_without_output_returns_input() {
        let exchange = Exchange::new(Message::new("echo"));

        match exchange.complete() {
            ExchangeOutcome::Completed(message) => {
                assert_eq!(message.body.as_text().as_deref(), Some("echo"))
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn failure_discards_partial_output() {
        let mut exchange = Exchange::new(Message::new("in"));
        exchange.output_mut().set_body("partial");
        let exchange_id = exchange.id().to_string();

        let outcome = exchange.fail(Fault::RouteStopped(RouteStoppedError {
            route_id: "r".to_string(),
            exchange_id,
        }));

        assert!(!outcome.is_completed());
        assert!(outcome.into_result().unwrap_err().is_route_stopped());
    }

    #[test]
    fn exchange_ids_are_unique() {
        let a = Exchange::new(Message::default());
        let b = Exchange::new(Message::default());

        assert_ne!(a.id(), b.id());
        assert_eq!(a.route_id(), None);
    }
}
