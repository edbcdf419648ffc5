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

use crate::endpoint::RestletEndpointConfig;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, CONNECTION, HOST, TRANSFER_ENCODING};
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use mediator::observability::events;
use mediator::{header, AdapterError, Body, Exchange, Message, Producer};
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

const COMPONENT: &str = "restlet_producer";

/// Sends each exchange as one HTTP request on a fresh connection.
pub(crate) struct RestletProducer {
    uri: String,
    config: RestletEndpointConfig,
    tls: Option<(TlsConnector, Option<String>)>,
}

impl RestletProducer {
    pub(crate) fn new(
        uri: String,
        config: RestletEndpointConfig,
        tls: Option<(TlsConnector, Option<String>)>,
    ) -> Self {
        Self { uri, config, tls }
    }

    fn request(&self, method: Method, input: &Message) -> Result<Request<Full<Bytes>>, AdapterError> {
        let mut path = self.config.address.path.clone();
        if let Some(query) = input.header(header::HTTP_QUERY) {
            path.push('?');
            path.push_str(query);
        }

        let mut request = Request::builder()
            .method(method)
            .uri(path)
            .header(HOST, self.config.address.authority());
        for (name, value) in input.headers.iter().filter(|(name, _)| forwarded(name)) {
            let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
            else {
                continue;
            };
            request = request.header(name, value);
        }
        request
            .body(Full::new(input.body.to_bytes()))
            .map_err(|err| AdapterError::InvalidMessage(err.to_string()))
    }

    async fn connect(&self) -> Result<TcpStream, AdapterError> {
        let authority = self.config.address.authority();
        tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(&authority))
            .await
            .map_err(|_| AdapterError::Timeout(self.config.connect_timeout))?
            .map_err(AdapterError::from)
    }

    async fn round_trip(
        &self,
        request: Request<Full<Bytes>>,
    ) -> Result<(Response<()>, Bytes), AdapterError> {
        let stream = self.connect().await?;
        match &self.tls {
            Some((connector, server_name)) => {
                let name = server_name
                    .clone()
                    .unwrap_or_else(|| self.config.address.host.clone());
                let name = ServerName::try_from(name)
                    .map_err(|err| AdapterError::Tls(err.to_string()))?;
                let stream = connector
                    .connect(name, stream)
                    .await
                    .map_err(|err| AdapterError::Tls(err.to_string()))?;
                exchange_over(stream, request).await
            }
            None => exchange_over(stream, request).await,
        }
    }
}

async fn exchange_over<S>(
    stream: S,
    request: Request<Full<Bytes>>,
) -> Result<(Response<()>, Bytes), AdapterError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(operation_error)?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            debug!(component = COMPONENT, err = %err, "connection closed with error");
        }
    });

    let response: Response<Incoming> = sender
        .send_request(request)
        .await
        .map_err(operation_error)?;
    let (parts, body) = response.into_parts();
    let body = body.collect().await.map_err(operation_error)?.to_bytes();
    Ok((Response::from_parts(parts, ()), body))
}

/// Message headers sent as request headers: everything except `http.*`
/// bookkeeping and the headers hyper manages itself.
fn forwarded(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    !name.starts_with("http.")
        && ![HOST, CONTENT_LENGTH, TRANSFER_ENCODING, CONNECTION]
            .iter()
            .any(|managed| managed.as_str() == name)
}

fn operation_error(err: hyper::Error) -> AdapterError {
    AdapterError::Operation {
        operation: "http".to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl Producer for RestletProducer {
    async fn send(&self, exchange: &mut Exchange) -> Result<(), AdapterError> {
        let method = exchange
            .input()
            .header(header::HTTP_METHOD)
            .and_then(|name| Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes()).ok())
            .unwrap_or_else(|| self.config.default_method.clone());
        let request = self.request(method.clone(), exchange.input())?;

        debug!(
            event = events::HTTP_CLIENT_REQUEST,
            component = COMPONENT,
            endpoint = %self.uri,
            method = %method,
            "sending request"
        );
        let (response, body) =
            tokio::time::timeout(self.config.socket_timeout, self.round_trip(request))
                .await
                .map_err(|_| AdapterError::Timeout(self.config.socket_timeout))?
                .map_err(|err| {
                    warn!(
                        event = events::HTTP_CLIENT_FAILED,
                        component = COMPONENT,
                        endpoint = %self.uri,
                        err = %err,
                        "request failed"
                    );
                    err
                })?;

        let status = response.status();
        let text = String::from_utf8(body.to_vec()).ok();
        if status.as_u16() >= 400 && self.config.throw_exception_on_failure {
            return Err(AdapterError::Operation {
                operation: format!("{method} {}", self.config.address),
                message: format!(
                    "responded with status {}: {}",
                    status.as_u16(),
                    text.as_deref().unwrap_or_default()
                ),
            });
        }

        let mut reply = Message::default();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                reply.set_header(name.as_str(), value);
            }
        }
        reply.set_header(header::HTTP_RESPONSE_CODE, status.as_u16().to_string());
        reply.body = match text {
            Some(text) if text.is_empty() => Body::Empty,
            Some(text) => Body::Text(text),
            None => Body::Bytes(body),
        };
        exchange.set_output(reply);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RestletProducer;
    use crate::address::HttpAddress;
    use crate::endpoint::RestletEndpointConfig;
    use hyper::Method;
    use mediator::{header, Message};
    use std::time::Duration;

    fn producer() -> RestletProducer {
        RestletProducer::new(
            "restlet:http://localhost:8080/users".to_string(),
            RestletEndpointConfig {
                address: HttpAddress::parse("http://localhost:8080/users", "restlet:x").unwrap(),
                methods: vec![Method::POST],
                default_method: Method::POST,
                ssl_reference: None,
                connect_timeout: Duration::from_millis(100),
                socket_timeout: Duration::from_millis(100),
                throw_exception_on_failure: true,
            },
            None,
        )
    }

    #[test]
    fn request_carries_query_content_type_and_host() {
        let input = Message::new("<a/>")
            .with_header(header::CONTENT_TYPE, "application/xml")
            .with_header(header::HTTP_QUERY, "page=2");

        let request = producer().request(Method::PUT, &input).unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.uri().to_string(), "/users?page=2");
        assert_eq!(request.headers()["host"], "localhost:8080");
        assert_eq!(request.headers()["content-type"], "application/xml");
        assert!(!request.headers().contains_key("http.query"));
    }

    #[test]
    fn bookkeeping_headers_are_not_forwarded() {
        assert!(super::forwarded("X-Trace"));
        assert!(super::forwarded("Content-Type"));
        assert!(!super::forwarded("http.responseCode"));
        assert!(!super::forwarded("Content-Length"));
    }
}
