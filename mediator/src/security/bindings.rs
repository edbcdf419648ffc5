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

use super::ssl_parameters::SslContextParameters;
use super::tls_context::TlsContext;
use crate::error::BuildError;
use std::collections::HashMap;
use std::sync::Arc;

/// One named entry in the security bindings table.
#[derive(Clone, Debug)]
pub enum SecurityBinding {
    /// Built lazily, once, the first time a route references the name.
    Parameters(SslContextParameters),
    /// Already built by the embedding application.
    Context(Arc<TlsContext>),
}

/// Collects named security contexts before the table is frozen.
#[derive(Default)]
pub struct SecurityBindingsBuilder {
    entries: HashMap<String, SecurityBinding>,
}

impl SecurityBindingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_ssl_context_parameters(
        &mut self,
        name: impl Into<String>,
        parameters: SslContextParameters,
    ) -> Result<&mut Self, BuildError> {
        self.bind(name.into(), SecurityBinding::Parameters(parameters))
    }

    pub fn bind_tls_context(
        &mut self,
        name: impl Into<String>,
        context: Arc<TlsContext>,
    ) -> Result<&mut Self, BuildError> {
        self.bind(name.into(), SecurityBinding::Context(context))
    }

    fn bind(&mut self, name: String, binding: SecurityBinding) -> Result<&mut Self, BuildError> {
        let name = reference_name(&name).to_string();
        if self.entries.contains_key(&name) {
            return Err(BuildError::DuplicateBinding { name });
        }
        self.entries.insert(name, binding);
        Ok(self)
    }

    pub fn build(self) -> SecurityBindings {
        SecurityBindings {
            entries: Arc::new(self.entries),
        }
    }
}

/// Frozen, read-only bindings table. Lookups take no lock.
#[derive(Clone, Default)]
pub struct SecurityBindings {
    entries: Arc<HashMap<String, SecurityBinding>>,
}

impl SecurityBindings {
    /// Looks up a binding; a leading `#` on `name` is ignored.
    pub fn get(&self, name: &str) -> Option<&SecurityBinding> {
        self.entries.get(reference_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn reference_name(name: &str) -> &str {
    name.strip_prefix('#').unwrap_or(name)
}
