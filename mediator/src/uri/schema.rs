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

//! Per-component parameter schemas and the validating coercion of raw query pairs.

use crate::error::ResolveError;
use crate::uri::params::{ParamValue, Parameters};
use crate::uri::EndpointUri;
use std::time::Duration;

/// Declared type of one endpoint parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    /// One of the listed values, matched case-insensitively and stored as declared.
    Enum(&'static [&'static str]),
    /// Comma-separated list of free-form values.
    List,
    /// Comma-separated list where every value must be one of the listed values.
    EnumList(&'static [&'static str]),
    /// Reference to a bound object, written `#name` (the `#` is optional).
    Reference,
    /// Non-negative milliseconds.
    Duration,
}

impl ParamKind {
    fn expected(&self) -> String {
        match self {
            ParamKind::String => "a string".to_string(),
            ParamKind::Integer => "an integer".to_string(),
            ParamKind::Boolean => "true or false".to_string(),
            ParamKind::Enum(allowed) => format!("one of [{}]", allowed.join(", ")),
            ParamKind::List => "a comma-separated list".to_string(),
            ParamKind::EnumList(allowed) => {
                format!("a comma-separated list of [{}]", allowed.join(", "))
            }
            ParamKind::Reference => "a reference like #name".to_string(),
            ParamKind::Duration => "milliseconds".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Masked in sanitized URIs and logs.
    pub secret: bool,
}

impl ParameterSpec {
    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            secret: false,
        }
    }

    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            secret: false,
        }
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }
}

/// What to do with query keys a component does not declare.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum UnknownKeys {
    #[default]
    Reject,
    Ignore,
}

#[derive(Clone, Debug)]
pub struct ParameterSchema {
    scheme: &'static str,
    specs: Vec<ParameterSpec>,
    unknown_keys: UnknownKeys,
}

impl ParameterSchema {
    pub fn new(scheme: &'static str) -> Self {
        Self {
            scheme,
            specs: Vec::new(),
            unknown_keys: UnknownKeys::Reject,
        }
    }

    pub fn with(mut self, spec: ParameterSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    pub fn spec(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Converts the raw query of `uri` into typed parameters.
    pub fn coerce(&self, uri: &EndpointUri) -> Result<Parameters, ResolveError> {
        let mut parameters = Parameters::default();

        for (key, raw) in uri.query() {
            let Some(spec) = self.spec(key) else {
                match self.unknown_keys {
                    UnknownKeys::Reject => {
                        return Err(ResolveError::UnknownParameter {
                            scheme: self.scheme.to_string(),
                            parameter: key.clone(),
                        })
                    }
                    UnknownKeys::Ignore => continue,
                }
            };
            let value = coerce_value(spec, raw)?;
            parameters.insert(spec.name, value, spec.secret);
        }

        if let Some(missing) = self
            .specs
            .iter()
            .find(|spec| spec.required && !parameters.contains(spec.name))
        {
            return Err(ResolveError::MissingParameter {
                scheme: self.scheme.to_string(),
                parameter: missing.name.to_string(),
            });
        }

        Ok(parameters)
    }
}

fn coerce_value(spec: &ParameterSpec, raw: &str) -> Result<ParamValue, ResolveError> {
    let invalid = || ResolveError::InvalidParameter {
        parameter: spec.name.to_string(),
        value: if spec.secret {
            "xxxxxx".to_string()
        } else {
            raw.to_string()
        },
        expected: spec.kind.expected(),
    };

    let value = match spec.kind {
        ParamKind::String => ParamValue::String(raw.to_string()),
        ParamKind::Integer => ParamValue::Integer(raw.trim().parse().map_err(|_| invalid())?),
        ParamKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => ParamValue::Boolean(true),
            "false" => ParamValue::Boolean(false),
            _ => return Err(invalid()),
        },
        ParamKind::Enum(allowed) => {
            ParamValue::Enum(match_allowed(allowed, raw.trim()).ok_or_else(invalid)?)
        }
        ParamKind::List => {
            let items = split_list(raw);
            if items.is_empty() {
                return Err(invalid());
            }
            ParamValue::List(items)
        }
        ParamKind::EnumList(allowed) => {
            let items = split_list(raw);
            if items.is_empty() {
                return Err(invalid());
            }
            let matched = items
                .iter()
                .map(|item| match_allowed(allowed, item).ok_or_else(invalid))
                .collect::<Result<Vec<_>, _>>()?;
            ParamValue::List(matched)
        }
        ParamKind::Reference => {
            let name = raw.trim().trim_start_matches('#');
            if name.is_empty() {
                return Err(invalid());
            }
            ParamValue::Reference(name.to_string())
        }
        ParamKind::Duration => {
            let millis: u64 = raw.trim().parse().map_err(|_| invalid())?;
            ParamValue::Duration(Duration::from_millis(millis))
        }
    };

    Ok(value)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn match_allowed(allowed: &[&str], candidate: &str) -> Option<String> {
    allowed
        .iter()
        .find(|value| value.eq_ignore_ascii_case(candidate))
        .map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ParamKind, ParameterSchema, ParameterSpec, UnknownKeys};
    use crate::error::ResolveError;
    use crate::uri::{EndpointUri, ParamValue};
    use std::time::Duration;

    const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

    fn schema() -> ParameterSchema {
        ParameterSchema::new("test")
            .with(ParameterSpec::required("database", ParamKind::String))
            .with(ParameterSpec::optional("hosts", ParamKind::List))
            .with(ParameterSpec::optional("limit", ParamKind::Integer))
            .with(ParameterSpec::optional("verbose", ParamKind::Boolean))
            .with(ParameterSpec::optional("methods", ParamKind::EnumList(METHODS)))
            .with(ParameterSpec::optional("ssl", ParamKind::Reference))
            .with(ParameterSpec::optional("timeout", ParamKind::Duration))
            .with(ParameterSpec::optional("password", ParamKind::String).secret())
    }

    fn coerce(raw: &str) -> Result<crate::uri::Parameters, ResolveError> {
        schema().coerce(&EndpointUri::parse(raw).unwrap())
    }

    #[test]
    fn coerces_declared_kinds() {
        let parameters = coerce(
            "test:?database=db&hosts=b,a&limit=10&verbose=TRUE&methods=post,get&ssl=#ctx&timeout=250",
        )
        .expect("parameters should coerce");

        assert_eq!(parameters.string("database"), Some("db"));
        assert_eq!(
            parameters.list("hosts"),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(parameters.integer("limit"), Some(10));
        assert_eq!(parameters.boolean("verbose"), Some(true));
        assert_eq!(
            parameters.get("methods"),
            Some(&ParamValue::List(vec!["GET".into(), "POST".into()]))
        );
        assert_eq!(parameters.reference("ssl"), Some("ctx"));
        assert_eq!(
            parameters.duration("timeout"),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn missing_required_parameter_is_reported() {
        assert!(matches!(
            coerce("test:?limit=1"),
            Err(ResolveError::MissingParameter { parameter, .. }) if parameter == "database"
        ));
    }

    #[test]
    fn unknown_keys_follow_policy() {
        assert!(matches!(
            coerce("test:?database=db&bogus=1"),
            Err(ResolveError::UnknownParameter { parameter, .. }) if parameter == "bogus"
        ));

        let lenient = schema().unknown_keys(UnknownKeys::Ignore);
        let parameters = lenient
            .coerce(&EndpointUri::parse("test:?database=db&bogus=1").unwrap())
            .expect("unknown keys should be ignored");
        assert!(!parameters.contains("bogus"));
    }

    #[test]
    fn invalid_values_are_rejected_without_leaking_secrets() {
        assert!(matches!(
            coerce("test:?database=db&limit=ten"),
            Err(ResolveError::InvalidParameter { parameter, .. }) if parameter == "limit"
        ));
        assert!(matches!(
            coerce("test:?database=db&methods=post,fetch"),
            Err(ResolveError::InvalidParameter { parameter, .. }) if parameter == "methods"
        ));
        assert!(matches!(
            coerce("test:?database=db&ssl=#"),
            Err(ResolveError::InvalidParameter { .. })
        ));
    }
}
