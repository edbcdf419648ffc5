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

//! Typed endpoint parameters and their canonical (normalized) form.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub(crate) const SANITIZED_VALUE: &str = "xxxxxx";

/// A schema-coerced parameter value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    /// Multi-valued parameter; kept sorted and deduplicated.
    List(Vec<String>),
    /// Name of an object bound in a bindings table, without the leading `#`.
    Reference(String),
    Duration(Duration),
}

impl ParamValue {
    fn canonical(&self) -> String {
        match self {
            ParamValue::String(value) | ParamValue::Enum(value) => value.clone(),
            ParamValue::Integer(value) => value.to_string(),
            ParamValue::Boolean(value) => value.to_string(),
            ParamValue::List(values) => values.join(","),
            ParamValue::Reference(name) => format!("#{name}"),
            ParamValue::Duration(value) => value.as_millis().to_string(),
        }
    }
}

/// Normalized parameter set for one endpoint.
///
/// Keys are held sorted, so two sets with the same keys and values compare
/// equal regardless of declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, ParamValue>,
    secrets: BTreeSet<String>,
}

impl Parameters {
    pub(crate) fn insert(&mut self, key: &str, value: ParamValue, secret: bool) {
        let value = match value {
            ParamValue::List(values) => {
                let unique: BTreeSet<String> = values.into_iter().collect();
                ParamValue::List(unique.into_iter().collect())
            }
            other => other,
        };
        if secret {
            self.secrets.insert(key.to_string());
        }
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            ParamValue::String(value) | ParamValue::Enum(value) => Some(value),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            ParamValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            ParamValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.values.get(key)? {
            ParamValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn reference(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            ParamValue::Reference(name) => Some(name),
            _ => None,
        }
    }

    pub fn duration(&self, key: &str) -> Option<Duration> {
        match self.values.get(key)? {
            ParamValue::Duration(value) => Some(*value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical query string: keys sorted, list values sorted.
    pub fn normalized(&self) -> String {
        self.render(false)
    }

    /// Canonical query string with secret values masked, safe for logs and errors.
    pub fn sanitized(&self) -> String {
        self.render(true)
    }

    fn render(&self, mask_secrets: bool) -> String {
        self.values
            .iter()
            .map(|(key, value)| {
                if mask_secrets && self.secrets.contains(key) {
                    format!("{key}={SANITIZED_VALUE}")
                } else {
                    format!("{key}={}", value.canonical())
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Cache identity of an endpoint: scheme, path and normalized parameters.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct EndpointKey {
    normalized: String,
    sanitized: String,
}

impl EndpointKey {
    pub fn new(scheme: &str, path: &str, parameters: &Parameters) -> Self {
        Self {
            normalized: Self::render(scheme, path, &parameters.normalized()),
            sanitized: Self::render(scheme, path, &parameters.sanitized()),
        }
    }

    fn render(scheme: &str, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{scheme}:{path}")
        } else {
            format!("{scheme}:{path}?{query}")
        }
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// The key with secret parameter values masked.
    pub fn sanitized(&self) -> &str {
        &self.sanitized
    }
}

impl Display for EndpointKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sanitized)
    }
}

#[cfg(test)]
mod tests {
    use super::{EndpointKey, ParamValue, Parameters};

    fn params(entries: &[(&str, ParamValue)]) -> Parameters {
        let mut parameters = Parameters::default();
        for (key, value) in entries {
            parameters.insert(key, value.clone(), *key == "password");
        }
        parameters
    }

    #[test]
    fn normalization_is_order_independent() {
        let a = params(&[
            ("database", ParamValue::String("db".into())),
            (
                "hosts",
                ParamValue::List(vec!["b:27017".into(), "a:27017".into()]),
            ),
        ]);
        let b = params(&[
            (
                "hosts",
                ParamValue::List(vec!["a:27017".into(), "b:27017".into(), "a:27017".into()]),
            ),
            ("database", ParamValue::String("db".into())),
        ]);

        assert_eq!(a, b);
        assert_eq!(a.normalized(), "database=db&hosts=a:27017,b:27017");
        assert_eq!(
            EndpointKey::new("mongodb", "", &a),
            EndpointKey::new("mongodb", "", &b)
        );
    }

    #[test]
    fn sanitized_form_masks_secrets() {
        let parameters = params(&[
            ("username", ParamValue::String("myUser".into())),
            ("password", ParamValue::String("myPasswd".into())),
        ]);
        let key = EndpointKey::new("mongodb", "", &parameters);

        assert_eq!(key.as_str(), "mongodb:?password=myPasswd&username=myUser");
        assert_eq!(key.sanitized(), "mongodb:?password=xxxxxx&username=myUser");
        assert_eq!(key.to_string(), key.sanitized());
    }

    #[test]
    fn typed_accessors_match_variants() {
        let parameters = params(&[
            ("ref", ParamValue::Reference("ctx".into())),
            ("flag", ParamValue::Boolean(true)),
            ("limit", ParamValue::Integer(5)),
        ]);

        assert_eq!(parameters.reference("ref"), Some("ctx"));
        assert_eq!(parameters.boolean("flag"), Some(true));
        assert_eq!(parameters.integer("limit"), Some(5));
        assert_eq!(parameters.string("limit"), None);
        assert_eq!(
            EndpointKey::new("direct", "x", &Parameters::default()).as_str(),
            "direct:x"
        );
    }
}
