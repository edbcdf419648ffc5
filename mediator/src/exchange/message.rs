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

use bytes::Bytes;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Well-known header names shared by adapters.
pub mod header {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const HTTP_METHOD: &str = "http.method";
    pub const HTTP_URI: &str = "http.uri";
    pub const HTTP_QUERY: &str = "http.query";
    pub const HTTP_RESPONSE_CODE: &str = "http.responseCode";
}

/// Message payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    Bytes(Bytes),
    Integer(i64),
    Json(serde_json::Value),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Text view of the body; bytes are decoded lossily, JSON is serialized.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Body::Empty => None,
            Body::Text(text) => Some(Cow::Borrowed(text)),
            Body::Bytes(bytes) => Some(String::from_utf8_lossy(bytes)),
            Body::Integer(value) => Some(Cow::Owned(value.to_string())),
            Body::Json(value) => Some(Cow::Owned(value.to_string())),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Body::Integer(value) => Some(*value),
            Body::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// JSON view of the body; text and bytes are parsed when they hold JSON.
    pub fn as_json(&self) -> Option<serde_json::Value> {
        match self {
            Body::Json(value) => Some(value.clone()),
            Body::Integer(value) => Some(serde_json::Value::from(*value)),
            Body::Text(text) => serde_json::from_str(text).ok(),
            Body::Bytes(bytes) => serde_json::from_slice(bytes).ok(),
            Body::Empty => None,
        }
    }

    /// Wire representation of the body.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Body::Empty => Bytes::new(),
            Body::Bytes(bytes) => bytes.clone(),
            Body::Text(text) => Bytes::from(text.clone()),
            other => Bytes::from(
                other
                    .as_text()
                    .map(|text| text.into_owned())
                    .unwrap_or_default(),
            ),
        }
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Text(value.to_string())
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

impl From<i64> for Body {
    fn from(value: i64) -> Self {
        Body::Integer(value)
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Body::Bytes(value)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

/// Message headers. Names are matched case-insensitively; the first spelling wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, (String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let folded = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.get_mut(&folded) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries.insert(folded, (name, value));
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    pub body: Body,
    pub headers: Headers,
}

impl Message {
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            body: body.into(),
            headers: Headers::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}
