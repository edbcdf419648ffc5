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

//! Endpoint URI parsing.
//!
//! Grammar: `scheme ":" ["//"] remainder ["?" key "=" value ("&" key "=" value)*]`.
//!
//! The remainder is kept verbatim and interpreted by the owning component
//! (`restlet` reads an absolute http address from it, `direct` a name).
//! A `#` inside a query value is literal: it marks a reference to a bound
//! object and never starts a fragment.

pub(crate) mod params;
pub(crate) mod schema;

pub use params::{EndpointKey, ParamValue, Parameters};
pub use schema::{ParamKind, ParameterSchema, ParameterSpec, UnknownKeys};

use crate::error::ResolveError;
use url::form_urlencoded;

/// A syntactically valid, not yet schema-checked endpoint URI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndpointUri {
    raw: String,
    scheme: String,
    path: String,
    query: Vec<(String, String)>,
}

impl EndpointUri {
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let malformed = |reason: &str| ResolveError::MalformedUri {
            uri: sanitize(raw),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(malformed("uri is empty"));
        }

        let Some((scheme, rest)) = trimmed.split_once(':') else {
            return Err(malformed("missing ':' after scheme"));
        };
        if !is_valid_scheme(scheme) {
            return Err(malformed("scheme must match [A-Za-z][A-Za-z0-9+.-]*"));
        }

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        let path = path.strip_prefix("//").unwrap_or(path);

        let mut pairs: Vec<(String, String)> = Vec::new();
        if let Some(query) = query {
            for segment in query.split('&').filter(|segment| !segment.is_empty()) {
                if !segment.contains('=') {
                    return Err(malformed(&format!("parameter '{segment}' has no value")));
                }
                let Some((key, value)) = form_urlencoded::parse(segment.as_bytes()).next() else {
                    return Err(malformed(&format!("unable to decode '{segment}'")));
                };
                if key.is_empty() {
                    return Err(malformed("parameter with empty key"));
                }
                if pairs.iter().any(|(existing, _)| existing == key.as_ref()) {
                    return Err(malformed(&format!("duplicate parameter '{key}'")));
                }
                pairs.push((key.into_owned(), value.into_owned()));
            }
        }

        Ok(Self {
            raw: trimmed.to_string(),
            scheme: scheme.to_ascii_lowercase(),
            path: path.to_string(),
            query: pairs,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Everything between the scheme separator and the query, without a leading `//`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query pairs in declaration order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Masks the values of credential-like query parameters in a raw URI.
///
/// Used where a URI failed before its schema was known, so secrets cannot be
/// identified from the component's parameter specs.
pub fn sanitize(raw: &str) -> String {
    let Some((base, query)) = raw.split_once('?') else {
        return raw.to_string();
    };
    let query = query
        .split('&')
        .map(|segment| match segment.split_once('=') {
            Some((key, _)) if is_secret_key(key) => format!("{key}={}", params::SANITIZED_VALUE),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ["password", "passphrase", "secret", "token"]
        .iter()
        .any(|marker| key.contains(marker))
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}
