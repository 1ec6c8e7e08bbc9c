// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
mod config;
mod error;
mod inventory;
mod kubernetes;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::prelude::*;

use cli::Args;
use config::InventoryConfig;
use inventory::{Inventory, InventoryBuilder};
use kubernetes::KubeConnector;

/// Initialize logging to stderr; stdout carries the inventory document
fn init_logging(verbose: bool) {
    let filter = if verbose { "k8sinv=debug" } else { "k8sinv=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (aws-lc-rs)
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = Args::parse();
    init_logging(args.verbose);

    // The one fatal path: a config file that cannot be loaded
    let config = InventoryConfig::load(&args.config)?;

    let mut inventory = Inventory::new();
    let connector = KubeConnector::new();
    let report = InventoryBuilder::new(&mut inventory, config.plugin.clone())
        .populate(&connector, &config.contexts)
        .await;

    if !report.failures.is_empty() {
        warn!(
            failed = report.failures.len(),
            contexts = config.contexts.len(),
            hosts = report.hosts,
            "completed with context failures"
        );
    }

    match &args.host {
        Some(host) => println!("{}", output::render_host(&inventory, host, &args.output)),
        None => println!("{}", output::render(&inventory, &args.output)),
    }

    Ok(())
}
