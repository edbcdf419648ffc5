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

//! Canonical structured field keys and value-format helpers.

use crate::error::Fault;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const ROUTE_ID: &str = "route_id";
pub const EXCHANGE_ID: &str = "exchange_id";
pub const ENDPOINT: &str = "endpoint";
pub const STEP: &str = "step";
pub const POSITION: &str = "position";
pub const REF_COUNT: &str = "ref_count";
pub const ERR: &str = "err";

pub const NONE: &str = "none";

/// Short label describing which kind of fault ended an exchange.
pub fn fault_kind(fault: &Fault) -> &'static str {
    match fault {
        Fault::Step(_) => "step_execution",
        Fault::RouteStopped(_) => "route_stopped",
        Fault::NoConsumer { .. } => "no_consumer",
        Fault::Resolve { .. } => "resolve",
        Fault::Producer { .. } => "producer",
    }
}

/// Position of the failing step, or [`NONE`].
pub fn fault_position(fault: &Fault) -> String {
    fault
        .as_step()
        .map(|step| step.position.to_string())
        .unwrap_or_else(|| NONE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{fault_kind, fault_position, NONE};
    use crate::error::{Fault, StepExecutionFault};

    #[test]
    fn fault_fields_describe_step_faults() {
        let fault = Fault::Step(StepExecutionFault::new(
            "r",
            3,
            "process[x]",
            "bad input".into(),
        ));

        assert_eq!(fault_kind(&fault), "step_execution");
        assert_eq!(fault_position(&fault), "3");
    }

    #[test]
    fn fault_fields_fall_back_for_other_faults() {
        let fault = Fault::NoConsumer {
            uri: "direct:nowhere".to_string(),
        };

        assert_eq!(fault_kind(&fault), "no_consumer");
        assert_eq!(fault_position(&fault), NONE);
    }
}
