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

use crate::error::BoxError;
use crate::exchange::Exchange;
use async_trait::async_trait;
use std::sync::Arc;

/// A user-supplied processing step.
///
/// Returning `Err` terminates the route's chain for this exchange; the error
/// is kept as the cause of the resulting step fault. Retrying is up to the
/// implementation.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, exchange: &mut Exchange) -> Result<(), BoxError>;
}

struct FnProcessor<F>(F);

#[async_trait]
impl<F> Processor for FnProcessor<F>
where
    F: Fn(&mut Exchange) -> Result<(), BoxError> + Send + Sync,
{
    async fn process(&self, exchange: &mut Exchange) -> Result<(), BoxError> {
        (self.0)(exchange)
    }
}

/// Wraps a synchronous closure as a [`Processor`].
///
/// ```
/// use mediator::processor_fn;
///
/// let upper = processor_fn(|exchange| {
///     let text = exchange.input().body.as_text().unwrap_or_default().to_uppercase();
///     exchange.output_mut().set_body(text);
///     Ok(())
/// });
/// # let _ = upper;
/// ```
pub fn processor_fn<F>(f: F) -> Arc<dyn Processor>
where
    F: Fn(&mut Exchange) -> Result<(), BoxError> + Send + Sync + 'static,
{
    Arc::new(FnProcessor(f))
}
