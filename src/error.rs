// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Error kinds for inventory population
//!
//! Every fallible step of a context iteration maps to one of these variants so
//! the orchestrator can report a single line and keep going. None of them are
//! fatal to the overall run; the only fatal path is config loading, which goes
//! through `anyhow` in `main`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    /// The context entry is missing fields required by its resolution strategy.
    #[error("context '{context}' is not usable: {reason}")]
    Configuration { context: String, reason: String },

    /// Credentials could not be loaded or the cluster could not be reached.
    #[error("connection failed for context '{context}': {source}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A listing call against the cluster API failed.
    #[error("listing {resource} in namespace '{namespace}' failed: {source}")]
    Api {
        resource: &'static str,
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl InventoryError {
    pub fn configuration(context: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            context: context.to_string(),
            reason: reason.into(),
        }
    }

    pub fn connection(
        context: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            context: context.to_string(),
            source: Box::new(source),
        }
    }

    pub fn api(resource: &'static str, namespace: &str, source: kube::Error) -> Self {
        Self::Api {
            resource,
            namespace: namespace.to_string(),
            source,
        }
    }
}
