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

mod config;
mod wiring;

use crate::config::Config;
use clap::Parser;
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

const COMPONENT: &str = "configurable_mediator";

#[derive(Parser)]
#[command(version, about = "Runs mediator routes declared in a json5 file", long_about = None)]
struct MediatorArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let args = MediatorArgs::parse();
    info!(component = COMPONENT, config = %args.config, "loading configuration");
    let config = Config::load(&args.config)?;

    let context = wiring::build_context(&config).await?;
    context.start().await?;
    info!(
        component = COMPONENT,
        name = %context.name(),
        routes = context.route_count().await,
        "mediator running, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    info!(component = COMPONENT, "shutting down");
    context.stop().await;

    Ok(())
}
