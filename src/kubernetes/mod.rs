// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Cluster API access
//!
//! The inventory builder only needs two listing calls per namespace, expressed
//! here as traits so the kube-backed client and the in-memory test double are
//! interchangeable. One connected handle per context; nothing is shared
//! between contexts.

mod client;

pub use client::{ClusterClient, KubeConnector};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Endpoints, Pod};

use crate::config::ClusterContext;
use crate::error::InventoryError;

/// Resolves a context configuration into a connected client handle
#[async_trait]
pub trait Connector {
    type Api: ClusterApi;

    async fn connect(&self, context: &ClusterContext) -> Result<Self::Api, InventoryError>;
}

/// Read-only listing capability of a connected cluster
#[async_trait]
pub trait ClusterApi {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, InventoryError>;

    async fn list_endpoints(&self, namespace: &str) -> Result<Vec<Endpoints>, InventoryError>;
}
