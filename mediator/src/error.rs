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

//! Error taxonomy shared by resolution, route lifecycle and exchange processing.
//!
//! Resolution errors ([`ResolveError`]) are fatal at route-start time and are
//! wrapped into [`RouteStartError`]. Per-message failures never surface as
//! `Err` from a route; they are captured as a [`Fault`] on the exchange.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::control_plane::route::RouteState;

/// Error type accepted from user-provided processors.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Failures turning a URI string into a live endpoint.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("malformed endpoint uri '{uri}': {reason}")]
    MalformedUri { uri: String, reason: String },

    #[error("no component registered for scheme '{scheme}'")]
    UnknownScheme { scheme: String },

    #[error("missing required parameter '{parameter}' for scheme '{scheme}'")]
    MissingParameter { scheme: String, parameter: String },

    #[error("unknown parameter '{parameter}' for scheme '{scheme}'")]
    UnknownParameter { scheme: String, parameter: String },

    #[error("invalid value '{value}' for parameter '{parameter}': expected {expected}")]
    InvalidParameter {
        parameter: String,
        value: String,
        expected: String,
    },

    #[error("operation '{operation}' is not supported by scheme '{scheme}'")]
    UnsupportedOperation { scheme: String, operation: String },

    #[error("unresolved reference '#{name}'")]
    UnresolvedReference { name: String },

    #[error(transparent)]
    KeyMaterial(#[from] KeyMaterialError),

    #[error("endpoint '{uri}' could not be established: {source}")]
    Connection {
        uri: String,
        #[source]
        source: AdapterError,
    },
}

/// Why a key store could not be turned into key material.
#[derive(Debug, Error)]
pub enum KeyMaterialReason {
    #[error("unable to read key store: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to decrypt private key (wrong password?): {0}")]
    Decrypt(String),

    #[error("corrupt key store: {0}")]
    Corrupt(String),

    #[error("key store contains no certificate")]
    NoCertificate,

    #[error("key store contains no private key")]
    NoPrivateKey,

    #[error("key store holds more than one private key")]
    MultiplePrivateKeys,

    #[error("rejected by tls stack: {0}")]
    Tls(#[from] rustls::Error),
}

/// A key store could not be loaded or decrypted. Never retried.
#[derive(Debug, Error)]
#[error("failed to load key material from '{}': {reason}", path.display())]
pub struct KeyMaterialError {
    pub path: PathBuf,
    #[source]
    pub reason: KeyMaterialReason,
}

impl KeyMaterialError {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<KeyMaterialReason>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failures assembling a context before it is frozen.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum BuildError {
    #[error("a component is already registered for scheme '{scheme}'")]
    DuplicateScheme { scheme: String },

    #[error("security context '{name}' is already bound")]
    DuplicateBinding { name: String },
}

/// Protocol adapter failures raised by producers and consumers.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("tls failure: {0}")]
    Tls(String),

    #[error("authentication failed for user '{username}' on '{source_name}'")]
    Authentication {
        username: String,
        source_name: String,
    },

    #[error("{operation} failed: {message}")]
    Operation { operation: String, message: String },

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("endpoint '{uri}' already has an active consumer")]
    ConsumerAlreadyRegistered { uri: String },

    #[error("downstream exchange faulted: {0}")]
    Downstream(Fault),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Where in a route a resolution failure happened.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepPosition {
    Consumer,
    Step(usize),
}

impl Display for StepPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StepPosition::Consumer => write!(f, "consumer"),
            StepPosition::Step(index) => write!(f, "step #{index}"),
        }
    }
}

/// Failures starting a route. Names the route, the position and the sanitized URI.
#[derive(Debug, Error)]
pub enum RouteStartError {
    #[error("route '{route_id}': {position} endpoint '{uri}' could not be resolved: {source}")]
    Endpoint {
        route_id: String,
        position: StepPosition,
        uri: String,
        #[source]
        source: ResolveError,
    },

    #[error("route '{route_id}': consumer '{uri}' failed to start: {source}")]
    Consumer {
        route_id: String,
        uri: String,
        #[source]
        source: AdapterError,
    },

    #[error("route '{route_id}' is {state} and cannot be started")]
    InvalidState { route_id: String, state: RouteState },

    #[error("route '{route_id}' is already defined")]
    DuplicateRoute { route_id: String },

    #[error("route '{route_id}' is not defined")]
    UnknownRoute { route_id: String },
}

impl RouteStartError {
    /// The route this failure belongs to.
    pub fn route_id(&self) -> &str {
        match self {
            RouteStartError::Endpoint { route_id, .. }
            | RouteStartError::Consumer { route_id, .. }
            | RouteStartError::InvalidState { route_id, .. }
            | RouteStartError::DuplicateRoute { route_id }
            | RouteStartError::UnknownRoute { route_id } => route_id,
        }
    }

    /// The underlying resolution failure, when the start failed while resolving an endpoint.
    pub fn resolve_error(&self) -> Option<&ResolveError> {
        match self {
            RouteStartError::Endpoint { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// An exchange was rejected or abandoned because its route is stopping.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("route '{route_id}' stopped before exchange {exchange_id} completed")]
pub struct RouteStoppedError {
    pub route_id: String,
    pub exchange_id: String,
}

/// An unhandled error raised by a processing step.
///
/// Carries the route, the step's zero-based position in the chain, its label,
/// and the original cause.
#[derive(Clone, Debug)]
pub struct StepExecutionFault {
    pub route_id: String,
    pub position: usize,
    pub step: String,
    pub cause: Arc<dyn Error + Send + Sync + 'static>,
}

impl StepExecutionFault {
    pub fn new(
        route_id: impl Into<String>,
        position: usize,
        step: impl Into<String>,
        cause: BoxError,
    ) -> Self {
        Self {
            route_id: route_id.into(),
            position,
            step: step.into(),
            cause: Arc::from(cause),
        }
    }
}

impl Display for StepExecutionFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "route '{}' failed at step #{} ({}): {}",
            self.route_id, self.position, self.step, self.cause
        )
    }
}

impl Error for StepExecutionFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// The fault slot of a completed exchange.
#[derive(Clone, Debug, Error)]
pub enum Fault {
    #[error(transparent)]
    Step(#[from] StepExecutionFault),

    #[error(transparent)]
    RouteStopped(#[from] RouteStoppedError),

    #[error("no consumer available on endpoint '{uri}'")]
    NoConsumer { uri: String },

    #[error("unable to resolve endpoint '{uri}': {message}")]
    Resolve { uri: String, message: String },

    /// A producer invoked outside any route failed.
    #[error("producer for '{uri}' failed: {cause}")]
    Producer {
        uri: String,
        cause: Arc<AdapterError>,
    },
}

impl Fault {
    /// Returns the step fault when this fault originated in a processing step.
    pub fn as_step(&self) -> Option<&StepExecutionFault> {
        match self {
            Fault::Step(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn is_route_stopped(&self) -> bool {
        matches!(self, Fault::RouteStopped(_))
    }
}
