// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! kube-backed cluster access
//!
//! Credential resolution per context, first applicable strategy wins:
//! 1. `local_kube_config: true` — the default local kubeconfig
//! 2. `kubernetes_config_file` — a kubeconfig at an explicit path
//! 3. otherwise an in-memory kubeconfig synthesized from
//!    server/port/token/username, with TLS verification disabled
//!
//! The synthesized document keeps the legacy naming scheme: cluster
//! `{server}:{port}`, context `{namespaces[0]}/{server}:{port}/{username}`,
//! user `{username}/{server}:{port}`. The first namespace only names the
//! default context; it does not restrict which namespaces get queried.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Endpoints, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use serde_json::json;
use tracing::debug;

use super::{ClusterApi, Connector};
use crate::config::ClusterContext;
use crate::error::InventoryError;

/// Timeout for connecting to the K8s API
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading K8s API responses
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves contexts through kube's config machinery
#[derive(Debug, Default)]
pub struct KubeConnector;

impl KubeConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for KubeConnector {
    type Api = ClusterClient;

    async fn connect(&self, context: &ClusterContext) -> Result<ClusterClient, InventoryError> {
        let config = resolve_config(context).await?;
        let client = Client::try_from(config)
            .map_err(|e| InventoryError::connection(&context.name, e))?;
        Ok(ClusterClient { client })
    }
}

async fn resolve_config(context: &ClusterContext) -> Result<Config, InventoryError> {
    let mut config = if context.local_kube_config {
        debug!(context = %context.name, "using local kubeconfig");
        Config::from_kubeconfig(&KubeConfigOptions::default())
            .await
            .map_err(|e| InventoryError::connection(&context.name, e))?
    } else if let Some(path) = &context.kubernetes_config_file {
        debug!(context = %context.name, file = %path.display(), "using explicit kubeconfig");
        let kubeconfig = Kubeconfig::read_from(path)
            .map_err(|e| InventoryError::connection(&context.name, e))?;
        Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| InventoryError::connection(&context.name, e))?
    } else {
        debug!(context = %context.name, "using synthesized token credentials");
        let (document, active_context) = synthesized_kubeconfig(context)?;
        let kubeconfig: Kubeconfig = serde_json::from_value(document).map_err(|e| {
            InventoryError::Unexpected(format!("generated kubeconfig is invalid: {e}"))
        })?;
        let options = KubeConfigOptions {
            context: Some(active_context),
            ..Default::default()
        };
        Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|e| InventoryError::connection(&context.name, e))?
    };

    config.connect_timeout = Some(CONNECT_TIMEOUT);
    config.read_timeout = Some(READ_TIMEOUT);
    Ok(config)
}

/// Build the in-memory kubeconfig document for a token-based context.
/// Returns the document and the name of its active context.
fn synthesized_kubeconfig(
    context: &ClusterContext,
) -> Result<(serde_json::Value, String), InventoryError> {
    let Some(server) = context.server.as_deref() else {
        return Err(InventoryError::configuration(
            &context.name,
            "server is required without local_kube_config or kubernetes_config_file",
        ));
    };
    let Some(port) = context.port else {
        return Err(InventoryError::configuration(
            &context.name,
            "port is required without local_kube_config or kubernetes_config_file",
        ));
    };
    let Some(token) = context.token.as_deref() else {
        return Err(InventoryError::configuration(
            &context.name,
            "token is required without local_kube_config or kubernetes_config_file",
        ));
    };
    let Some(namespace) = context.namespaces.first() else {
        return Err(InventoryError::configuration(
            &context.name,
            "at least one namespace is required",
        ));
    };

    let username = context.username.as_deref().unwrap_or_default();
    let cluster = format!("{server}:{port}");
    let current_context = format!("{namespace}/{cluster}/{username}");
    let user = format!("{username}/{cluster}");

    let document = json!({
        "current-context": &current_context,
        "clusters": [
            {
                "name": &cluster,
                "cluster": {
                    "insecure-skip-tls-verify": true,
                    "server": format!("https://{cluster}"),
                },
            }
        ],
        "contexts": [
            {
                "name": &current_context,
                "context": {
                    "cluster": &cluster,
                    "namespace": namespace,
                    "user": &user,
                },
            }
        ],
        "users": [
            {
                "name": &user,
                "user": {
                    "token": token,
                },
            }
        ],
    });

    Ok((document, current_context))
}

/// A connected, context-scoped cluster handle
pub struct ClusterClient {
    client: Client,
}

#[async_trait]
impl ClusterApi for ClusterClient {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, InventoryError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api
            .list(&ListParams::default())
            .await
            .map_err(|e| InventoryError::api("pods", namespace, e))?;
        Ok(pods.items)
    }

    async fn list_endpoints(&self, namespace: &str) -> Result<Vec<Endpoints>, InventoryError> {
        let api: Api<Endpoints> = Api::namespaced(self.client.clone(), namespace);
        let endpoints = api
            .list(&ListParams::default())
            .await
            .map_err(|e| InventoryError::api("endpoints", namespace, e))?;
        Ok(endpoints.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_context() -> ClusterContext {
        ClusterContext {
            name: "prod".to_string(),
            server: Some("kube.example.com".to_string()),
            port: Some(6443),
            token: Some("sekret".to_string()),
            username: Some("deployer".to_string()),
            namespaces: vec!["web".to_string(), "batch".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_synthesized_naming_scheme() {
        let (document, active) = synthesized_kubeconfig(&token_context()).unwrap();

        assert_eq!(active, "web/kube.example.com:6443/deployer");
        assert_eq!(document["current-context"], active.as_str());
        assert_eq!(document["clusters"][0]["name"], "kube.example.com:6443");
        assert_eq!(
            document["clusters"][0]["cluster"]["server"],
            "https://kube.example.com:6443"
        );
        assert_eq!(
            document["clusters"][0]["cluster"]["insecure-skip-tls-verify"],
            true
        );
        assert_eq!(
            document["contexts"][0]["context"]["user"],
            "deployer/kube.example.com:6443"
        );
        assert_eq!(document["contexts"][0]["context"]["namespace"], "web");
        assert_eq!(document["users"][0]["user"]["token"], "sekret");
    }

    #[test]
    fn test_synthesized_document_is_a_valid_kubeconfig() {
        let (document, active) = synthesized_kubeconfig(&token_context()).unwrap();
        let kubeconfig: Kubeconfig = serde_json::from_value(document).unwrap();

        assert_eq!(kubeconfig.current_context.as_deref(), Some(active.as_str()));
        assert_eq!(kubeconfig.clusters.len(), 1);
        assert_eq!(kubeconfig.contexts.len(), 1);
        assert_eq!(kubeconfig.auth_infos.len(), 1);
    }

    #[test]
    fn test_missing_username_leaves_an_empty_segment() {
        let mut context = token_context();
        context.username = None;

        let (_, active) = synthesized_kubeconfig(&context).unwrap();
        assert_eq!(active, "web/kube.example.com:6443/");
    }

    #[test]
    fn test_missing_server_is_a_configuration_error() {
        let mut context = token_context();
        context.server = None;

        let err = synthesized_kubeconfig(&context).unwrap_err();
        assert!(matches!(err, InventoryError::Configuration { .. }));
        assert!(err.to_string().contains("server is required"));
    }

    #[test]
    fn test_missing_port_is_a_configuration_error() {
        let mut context = token_context();
        context.port = None;

        let err = synthesized_kubeconfig(&context).unwrap_err();
        assert!(matches!(err, InventoryError::Configuration { .. }));
    }

    #[test]
    fn test_missing_token_is_a_configuration_error() {
        let mut context = token_context();
        context.token = None;

        let err = synthesized_kubeconfig(&context).unwrap_err();
        assert!(matches!(err, InventoryError::Configuration { .. }));
    }

    #[test]
    fn test_no_namespaces_is_a_configuration_error() {
        let mut context = token_context();
        context.namespaces.clear();

        let err = synthesized_kubeconfig(&context).unwrap_err();
        assert!(err.to_string().contains("at least one namespace"));
    }
}
