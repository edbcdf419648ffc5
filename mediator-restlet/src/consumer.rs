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

//! HTTP(S) listener feeding a route.
//!
//! The socket is bound in `start`, so an address already in use fails the
//! route start. Each accepted connection is served on its own task;
//! `stop` closes the listener, waits for the accept loop to exit and asks
//! every open connection to shut down once its current response is written.

use crate::address::HttpAddress;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use mediator::observability::events;
use mediator::{header, AdapterError, Body, Consumer, ExchangeHandler, ExchangeOutcome, Message};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const COMPONENT: &str = "restlet_consumer";

pub(crate) struct RestletConsumer {
    uri: String,
    address: HttpAddress,
    methods: Vec<Method>,
    acceptor: Option<TlsAcceptor>,
    running: Option<Running>,
}

struct Running {
    shutdown: CancellationToken,
    accept_loop: JoinHandle<()>,
}

/// What every connection task needs to answer a request.
struct Listener {
    uri: String,
    address: HttpAddress,
    methods: Vec<Method>,
    handler: Arc<dyn ExchangeHandler>,
}

impl RestletConsumer {
    pub(crate) fn new(
        uri: String,
        address: HttpAddress,
        methods: Vec<Method>,
        acceptor: Option<TlsAcceptor>,
    ) -> Self {
        Self {
            uri,
            address,
            methods,
            acceptor,
            running: None,
        }
    }
}

#[async_trait]
impl Consumer for RestletConsumer {
    async fn start(&mut self, handler: Arc<dyn ExchangeHandler>) -> Result<(), AdapterError> {
        if self.running.is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind(self.address.authority()).await?;
        info!(
            event = events::HTTP_LISTENER_BOUND,
            component = COMPONENT,
            endpoint = %self.uri,
            addr = %listener.local_addr()?,
            tls = self.acceptor.is_some(),
            "listening"
        );

        let shared = Arc::new(Listener {
            uri: self.uri.clone(),
            address: self.address.clone(),
            methods: self.methods.clone(),
            handler,
        });
        let shutdown = CancellationToken::new();
        let accept_loop = tokio::spawn(accept_loop(
            listener,
            self.acceptor.clone(),
            shared,
            shutdown.clone(),
        ));

        self.running = Some(Running {
            shutdown,
            accept_loop,
        });
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), AdapterError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        running.shutdown.cancel();
        if let Err(err) = running.accept_loop.await {
            warn!(
                component = COMPONENT,
                endpoint = %self.uri,
                err = %err,
                "accept loop ended abnormally"
            );
        }
        info!(
            event = events::HTTP_LISTENER_CLOSED,
            component = COMPONENT,
            endpoint = %self.uri,
            "listener closed"
        );
        Ok(())
    }
}

async fn accept_loop(
    listener: TcpListener,
    acceptor: Option<TlsAcceptor>,
    shared: Arc<Listener>,
    shutdown: CancellationToken,
) {
    loop {
        let accepted = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        let (stream, peer) = match accepted {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(
                    event = events::CONSUMER_CONNECTION_FAILED,
                    component = COMPONENT,
                    endpoint = %shared.uri,
                    err = %err,
                    "failed to accept connection"
                );
                continue;
            }
        };

        let shared = shared.clone();
        let acceptor = acceptor.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match acceptor {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(stream) => serve(stream, shared, shutdown).await,
                    Err(err) => warn!(
                        event = events::HTTP_TLS_HANDSHAKE_FAILED,
                        component = COMPONENT,
                        endpoint = %shared.uri,
                        peer = %peer,
                        err = %err,
                        "tls handshake failed"
                    ),
                },
                None => serve(stream, shared, shutdown).await,
            }
        });
    }
}

async fn serve<S>(stream: S, shared: Arc<Listener>, shutdown: CancellationToken)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let uri = shared.uri.clone();
    let service = service_fn(move |request: Request<Incoming>| {
        let shared = shared.clone();
        async move { Ok::<_, Infallible>(handle(request, &shared).await) }
    });

    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);
    let served = tokio::select! {
        served = connection.as_mut() => served,
        _ = shutdown.cancelled() => {
            // Finish the response in flight, then close.
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };

    if let Err(err) = served {
        debug!(
            event = events::CONSUMER_CONNECTION_FAILED,
            component = COMPONENT,
            endpoint = %uri,
            err = %err,
            "connection closed with error"
        );
    }
}

async fn handle(request: Request<Incoming>, shared: &Listener) -> Response<Full<Bytes>> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    debug!(
        event = events::HTTP_REQUEST_RECEIVED,
        component = COMPONENT,
        endpoint = %shared.uri,
        method = %method,
        path = %path,
        "request received"
    );

    if !shared.address.matches_path(&path) {
        return rejected(shared, StatusCode::NOT_FOUND, &method, &path);
    }
    if !shared.methods.contains(&method) {
        let mut response = rejected(shared, StatusCode::METHOD_NOT_ALLOWED, &method, &path);
        let allowed = shared
            .methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&allowed) {
            response.headers_mut().insert(ALLOW, value);
        }
        return response;
    }

    let mut message = Message::default();
    for (name, value) in request.headers() {
        if let Ok(value) = value.to_str() {
            message.set_header(name.as_str(), value);
        }
    }
    message.set_header(header::HTTP_METHOD, method.as_str());
    message.set_header(header::HTTP_URI, path.as_str());
    if let Some(query) = request.uri().query() {
        message.set_header(header::HTTP_QUERY, query);
    }

    let body = match request.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            return respond(
                StatusCode::BAD_REQUEST,
                None,
                Bytes::from(format!("unable to read request body: {err}")),
            )
        }
    };
    message.body = match String::from_utf8(body.to_vec()) {
        Ok(text) if text.is_empty() => Body::Empty,
        Ok(text) => Body::Text(text),
        Err(_) => Body::Bytes(body),
    };

    match shared.handler.handle(message).await {
        ExchangeOutcome::Completed(reply) => {
            let status = reply
                .header(header::HTTP_RESPONSE_CODE)
                .and_then(|code| code.trim().parse::<u16>().ok())
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::OK);
            respond(status, reply.header(header::CONTENT_TYPE), reply.body.to_bytes())
        }
        ExchangeOutcome::Faulted(fault) => {
            let status = if fault.is_route_stopped() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            respond(status, Some("text/plain"), Bytes::from(fault.to_string()))
        }
    }
}

fn rejected(
    shared: &Listener,
    status: StatusCode,
    method: &Method,
    path: &str,
) -> Response<Full<Bytes>> {
    debug!(
        event = events::HTTP_REQUEST_REJECTED,
        component = COMPONENT,
        endpoint = %shared.uri,
        method = %method,
        path,
        status = status.as_u16(),
        "request rejected"
    );
    respond(status, None, Bytes::new())
}

fn respond(status: StatusCode, content_type: Option<&str>, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    if let Some(value) = content_type.and_then(|value| HeaderValue::from_str(value).ok()) {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
}
