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

use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_NAME: &str = "mediator";
pub const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 10_000;

/// Context-wide settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MediatorConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// How long stopping a route waits for in-flight exchanges before cancelling them.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

impl MediatorConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            drain_timeout_ms: DEFAULT_DRAIN_TIMEOUT_MS,
        }
    }
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_drain_timeout_ms() -> u64 {
    DEFAULT_DRAIN_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::MediatorConfig;
    use std::time::Duration;

    #[test]
    fn missing_fields_take_defaults() {
        let config: MediatorConfig = serde_json::from_str(r#"{ "name": "edge" }"#).unwrap();

        assert_eq!(config.name, "edge");
        assert_eq!(config.drain_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<MediatorConfig>(r#"{ "drainTimeout": 1 }"#).is_err());
    }
}
