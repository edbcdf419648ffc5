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

//! Scheme-to-component registry, populated once and then frozen.

use crate::component::{Component, ResolvedUri};
use crate::error::{BuildError, ResolveError};
use crate::uri::EndpointUri;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct ComponentRegistryBuilder {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `component` under its scheme. Each scheme may be registered once.
    pub fn register(&mut self, component: Arc<dyn Component>) -> Result<&mut Self, BuildError> {
        let scheme = component.scheme().to_ascii_lowercase();
        if self.components.contains_key(&scheme) {
            return Err(BuildError::DuplicateScheme { scheme });
        }
        self.components.insert(scheme, component);
        Ok(self)
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.components.contains_key(&scheme.to_ascii_lowercase())
    }

    pub fn build(self) -> ComponentRegistry {
        ComponentRegistry {
            components: Arc::new(self.components),
        }
    }
}

/// Immutable scheme table. Cloning shares the table; lookups take no lock.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: Arc<HashMap<String, Arc<dyn Component>>>,
}

impl ComponentRegistry {
    pub fn get(&self, scheme: &str) -> Option<Arc<dyn Component>> {
        self.components.get(&scheme.to_ascii_lowercase()).cloned()
    }

    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.components.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Parses `uri`, finds its component and coerces its parameters. Pure lookup.
    pub fn resolve(&self, uri: &str) -> Result<(Arc<dyn Component>, ResolvedUri), ResolveError> {
        let parsed = EndpointUri::parse(uri)?;
        let component =
            self.components
                .get(parsed.scheme())
                .ok_or_else(|| ResolveError::UnknownScheme {
                    scheme: parsed.scheme().to_string(),
                })?;
        let parameters = component.schema().coerce(&parsed)?;

        Ok((component.clone(), ResolvedUri::new(parsed, parameters)))
    }
}

#[cfg(test)]
mod tests {
    use super::ComponentRegistryBuilder;
    use crate::component::{Component, EndpointContext, ResolvedUri};
    use crate::endpoint::Endpoint;
    use crate::error::{BuildError, ResolveError};
    use crate::uri::{ParamKind, ParameterSchema, ParameterSpec};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedComponent {
        schema: ParameterSchema,
    }

    impl FixedComponent {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                schema: ParameterSchema::new("fixed")
                    .with(ParameterSpec::required("size", ParamKind::Integer))
                    .with(ParameterSpec::optional("hosts", ParamKind::List)),
            })
        }
    }

    #[async_trait]
    impl Component for FixedComponent {
        fn scheme(&self) -> &'static str {
            "fixed"
        }

        fn schema(&self) -> &ParameterSchema {
            &self.schema
        }

        async fn create_endpoint(
            &self,
            _context: &EndpointContext,
            _uri: ResolvedUri,
        ) -> Result<Arc<dyn Endpoint>, ResolveError> {
            Err(ResolveError::UnsupportedOperation {
                scheme: "fixed".to_string(),
                operation: "create".to_string(),
            })
        }
    }

    #[test]
    fn duplicate_scheme_is_rejected() {
        let mut builder = ComponentRegistryBuilder::new();
        builder.register(FixedComponent::new()).expect("first");

        let error = builder.register(FixedComponent::new()).err();

        assert_eq!(
            error,
            Some(BuildError::DuplicateScheme {
                scheme: "fixed".to_string()
            })
        );
    }

    #[test]
    fn resolve_coerces_and_normalizes() {
        let mut builder = ComponentRegistryBuilder::new();
        builder.register(FixedComponent::new()).expect("register");
        let registry = builder.build();

        let (component, a) = registry
            .resolve("fixed:x?size=2&hosts=b,a")
            .expect("resolves");
        let (_, b) = registry
            .resolve("FIXED:x?hosts=a,b,a&size=2")
            .expect("resolves");

        assert_eq!(component.scheme(), "fixed");
        assert_eq!(a.parameters().integer("size"), Some(2));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn resolve_reports_unknown_scheme_and_missing_parameter() {
        let mut builder = ComponentRegistryBuilder::new();
        builder.register(FixedComponent::new()).expect("register");
        let registry = builder.build();

        assert!(matches!(
            registry.resolve("other:x"),
            Err(ResolveError::UnknownScheme { ref scheme }) if scheme == "other"
        ));
        assert!(matches!(
            registry.resolve("fixed:x"),
            Err(ResolveError::MissingParameter { ref parameter, .. }) if parameter == "size"
        ));
        assert!(matches!(
            registry.resolve("fixed"),
            Err(ResolveError::MalformedUri { .. })
        ));
    }
}
