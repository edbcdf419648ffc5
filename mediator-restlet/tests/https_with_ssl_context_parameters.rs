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

use integration_test_utils::{free_port, key_store_path, KEY_STORE_PASSWORD};
use mediator::security::{KeyManagersParameters, KeyStoreParameters, SslContextParameters};
use mediator::{header, processor_fn, MediatorContext, Message, RouteDefinition};
use mediator_restlet::RestletComponent;
use std::sync::Arc;

const REQUEST_MESSAGE: &str =
    "<mail><body>HelloWorld!</body><subject>test</subject><to>x@y.net</to></mail>";

fn context() -> MediatorContext {
    let key_store = KeyStoreParameters::new(key_store_path(), KEY_STORE_PASSWORD);
    let parameters = SslContextParameters::new().with_key_managers(
        KeyManagersParameters::new(key_store).with_key_password(KEY_STORE_PASSWORD),
    );

    MediatorContext::builder()
        .component(Arc::new(RestletComponent::new()))
        .unwrap()
        .bind_ssl_context_parameters("mySSLContextParameters", parameters)
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn post_xml_over_https() {
    integration_test_utils::init_logging();
    let port = free_port();
    let uri = format!(
        "restlet:https://localhost:{port}/users/?restletMethods=post&sslContextParameters=#mySSLContextParameters"
    );

    let context = context();
    context
        .add_route(RouteDefinition::from(uri.clone()).route_id("users").process(
            "reply",
            processor_fn(|exchange| {
                let body = exchange
                    .input()
                    .body
                    .as_text()
                    .map(|text| text.into_owned())
                    .unwrap_or_default();
                if !body.contains(REQUEST_MESSAGE) {
                    return Err(format!("Get a wrong request message: {body}").into());
                }
                let output = exchange.output_mut();
                output.set_body("<status>OK</status>");
                output.set_header(header::CONTENT_TYPE, "application/xml");
                Ok(())
            }),
        ))
        .await
        .unwrap();
    context.start().await.unwrap();

    let reply = context
        .send(
            &uri,
            Message::new(REQUEST_MESSAGE).with_header(header::CONTENT_TYPE, "application/xml"),
        )
        .await
        .unwrap();

    assert_eq!(reply.header(header::HTTP_RESPONSE_CODE), Some("200"));
    assert_eq!(reply.header(header::CONTENT_TYPE), Some("application/xml"));
    assert_eq!(reply.body.as_text().as_deref(), Some("<status>OK</status>"));

    // one key store read for both the listener and the client side
    assert_eq!(context.security().key_store_loads(), 1);
    context.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_request_message_yields_server_error() {
    integration_test_utils::init_logging();
    let port = free_port();
    let uri = format!(
        "restlet:https://localhost:{port}/users?restletMethods=post&sslContextParameters=#mySSLContextParameters"
    );

    let context = context();
    context
        .add_route(RouteDefinition::from(uri.clone()).process(
            "reject",
            processor_fn(|_| Err("Get a wrong request message".into())),
        ))
        .await
        .unwrap();
    context.start().await.unwrap();

    let lenient = format!("{uri}&throwExceptionOnFailure=false");
    let reply = context
        .send(&lenient, Message::new("<mail/>"))
        .await
        .unwrap();
    assert_eq!(reply.header(header::HTTP_RESPONSE_CODE), Some("500"));
    assert!(reply
        .body
        .as_text()
        .unwrap_or_default()
        .contains("Get a wrong request message"));

    let fault = context
        .send(&uri, Message::new("<mail/>"))
        .await
        .unwrap_err();
    assert!(fault.to_string().contains("500"));

    context.stop().await;
}
