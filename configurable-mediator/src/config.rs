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

use mediator::security::SslContextParameters;
use mediator::{MediatorConfig, RouteDefinition};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to parse config file '{path}': {source}")]
    Parse { path: PathBuf, source: json5::Error },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub(crate) mediator: MediatorConfig,
    #[serde(default)]
    pub(crate) ssl_contexts: BTreeMap<String, SslContextParameters>,
    #[serde(default)]
    pub(crate) mongodb: MongoDbConfig,
    pub(crate) routes: Vec<RouteConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct MongoDbConfig {
    #[serde(default)]
    pub(crate) clusters: Vec<ClusterConfig>,
}

/// Seed data for one in-memory document store cluster.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    pub(crate) hosts: Vec<String>,
    #[serde(default)]
    pub(crate) users: Vec<UserConfig>,
    #[serde(default)]
    pub(crate) documents: Vec<CollectionSeed>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    pub(crate) database: String,
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CollectionSeed {
    pub(crate) database: String,
    pub(crate) collection: String,
    pub(crate) documents: Vec<serde_json::Value>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    #[serde(default)]
    pub(crate) id: Option<String>,
    pub(crate) from: String,
    #[serde(default)]
    pub(crate) steps: Vec<StepConfig>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum StepConfig {
    To(String),
    SetBody(String),
    SetHeader { name: String, value: String },
    Log(String),
}

impl Config {
    /// Reads and parses `path`. Relative key store paths are resolved against
    /// the directory holding the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(base) = path.parent() {
            config.resolve_resources(base);
        }
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self, json5::Error> {
        json5::from_str(raw)
    }

    fn resolve_resources(&mut self, base: &Path) {
        for parameters in self.ssl_contexts.values_mut() {
            if let Some(key_managers) = parameters.key_managers.as_mut() {
                rebase(&mut key_managers.key_store.resource, base);
            }
            if let Some(trust_managers) = parameters.trust_managers.as_mut() {
                rebase(&mut trust_managers.key_store.resource, base);
            }
        }
    }
}

fn rebase(resource: &mut PathBuf, base: &Path) {
    if resource.is_relative() {
        *resource = base.join(&*resource);
    }
}

impl RouteConfig {
    pub(crate) fn to_definition(&self) -> RouteDefinition {
        let mut definition = RouteDefinition::from(self.from.clone());
        if let Some(id) = &self.id {
            definition = definition.route_id(id.clone());
        }
        self.steps
            .iter()
            .fold(definition, |definition, step| match step {
                StepConfig::To(uri) => definition.to(uri.clone()),
                StepConfig::SetBody(body) => definition.set_body(body.clone()),
                StepConfig::SetHeader { name, value } => {
                    definition.set_header(name.clone(), value.clone())
                }
                StepConfig::Log(message) => definition.log(message.clone()),
            })
    }
}
