// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Inventory population
//!
//! Walks contexts → namespaces → pods and writes hosts, variables and groups
//! into the sink. Every container of every pod becomes one host keyed
//! `{container}_{pod}`; hosts are grouped by namespace and pod name, pods are
//! grouped by label and by backing service. A failing context is reported and
//! skipped; whatever was already written stays.

use k8s_openapi::api::core::v1::{Container, Pod};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::InventorySink;
use crate::config::ClusterContext;
use crate::error::InventoryError;
use crate::kubernetes::{ClusterApi, Connector};

/// Name fragment of pods created by image-build workflows; those never
/// become hosts.
const BUILD_POD_MARKER: &str = "-build";

/// API port assumed when the context does not name one
const DEFAULT_API_PORT: u16 = 8443;

/// Compute the inventory key for a container within a pod.
///
/// Pod names are unique within a cluster, but container names repeat across
/// the replica pods of a deployment, so the key concatenates both.
pub fn host_key(container_name: &str, pod_name: &str) -> String {
    format!("{container_name}_{pod_name}")
}

fn is_build_pod(pod_name: &str) -> bool {
    pod_name.contains(BUILD_POD_MARKER)
}

/// One context that failed during population
#[derive(Debug)]
pub struct ContextFailure {
    pub context: String,
    pub error: InventoryError,
}

/// Outcome of a population run. Failures are per-context and never fatal;
/// a run where every context failed is an empty, completed inventory.
#[derive(Debug, Default)]
pub struct PopulateReport {
    pub hosts: usize,
    pub failures: Vec<ContextFailure>,
}

/// Populates an inventory sink from cluster listings
pub struct InventoryBuilder<'a, S: InventorySink> {
    sink: &'a mut S,
    plugin: String,
}

impl<'a, S: InventorySink> InventoryBuilder<'a, S> {
    /// `plugin` becomes each host's `ansible_connection`
    pub fn new(sink: &'a mut S, plugin: impl Into<String>) -> Self {
        Self {
            sink,
            plugin: plugin.into(),
        }
    }

    /// Enumerate every context in configured order
    pub async fn populate<C: Connector>(
        &mut self,
        connector: &C,
        contexts: &[ClusterContext],
    ) -> PopulateReport {
        let mut report = PopulateReport::default();

        for context in contexts {
            if context.namespaces.is_empty() {
                warn!(context = %context.name, "no namespaces configured, skipping context");
                continue;
            }

            let api = match connector.connect(context).await {
                Ok(api) => api,
                Err(error) => {
                    error!(context = %context.name, %error, "skipping context");
                    report.failures.push(ContextFailure {
                        context: context.name.clone(),
                        error,
                    });
                    continue;
                }
            };

            match self.populate_context(&api, context).await {
                Ok(hosts) => report.hosts += hosts,
                Err(error) => {
                    error!(context = %context.name, %error, "context enumeration aborted");
                    report.failures.push(ContextFailure {
                        context: context.name.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    async fn populate_context<A: ClusterApi>(
        &mut self,
        api: &A,
        context: &ClusterContext,
    ) -> Result<usize, InventoryError> {
        let mut hosts = 0;

        for namespace in &context.namespaces {
            let pods = api.list_pods(namespace).await?;
            debug!(context = %context.name, namespace = %namespace, pods = pods.len(), "listed pods");

            for pod in &pods {
                hosts += self.add_pod(namespace, pod, context);
            }

            self.group_services(api, namespace).await?;
        }

        info!(context = %context.name, hosts, "context enumerated");
        Ok(hosts)
    }

    /// Hosts and groups for one pod; returns the number of hosts written
    fn add_pod(&mut self, namespace: &str, pod: &Pod, context: &ClusterContext) -> usize {
        let Some(pod_name) = pod.metadata.name.as_deref() else {
            return 0;
        };
        if is_build_pod(pod_name) {
            debug!(namespace = %namespace, pod = %pod_name, "ignoring build pod");
            return 0;
        }

        let containers: &[Container] = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.as_slice())
            .unwrap_or_default();

        for container in containers {
            let host = host_key(&container.name, pod_name);
            self.sink.add_host(&host);
            for (key, value) in
                host_variables(&self.plugin, namespace, pod_name, &container.name, context)
            {
                self.sink.set_variable(&host, key, value);
            }
            self.group_add(namespace, &host);
            self.group_add(pod_name, &host);
        }

        // Label groups carry the pod name, not the host key, so a
        // zero-container pod still lands in its label groups.
        if let Some(labels) = &pod.metadata.labels {
            for (key, value) in labels {
                self.group_add(&format!("{key}_{value}"), pod_name);
            }
        }

        containers.len()
    }

    /// Group the namespace's pods under the services backing them
    async fn group_services<A: ClusterApi>(
        &mut self,
        api: &A,
        namespace: &str,
    ) -> Result<(), InventoryError> {
        let endpoints = api.list_endpoints(namespace).await?;
        debug!(namespace = %namespace, endpoints = endpoints.len(), "listed endpoints");

        for endpoint in &endpoints {
            let Some(service_name) = endpoint.metadata.name.as_deref() else {
                continue;
            };
            self.sink.add_group(service_name);

            for subset in endpoint.subsets.iter().flatten() {
                for address in subset.addresses.iter().flatten() {
                    let Some(target_ref) = &address.target_ref else {
                        continue;
                    };
                    if target_ref.kind.as_deref() != Some("Pod") {
                        continue;
                    }
                    if let Some(pod_name) = target_ref.name.as_deref() {
                        self.sink.add_child(service_name, pod_name);
                    }
                }
            }
        }

        Ok(())
    }

    fn group_add(&mut self, group: &str, child: &str) {
        self.sink.add_group(group);
        self.sink.add_child(group, child);
    }
}

/// The fixed variable set attached to a host at creation time.
/// Optional context fields that are unset produce no variable at all.
fn host_variables(
    plugin: &str,
    namespace: &str,
    pod_name: &str,
    container_name: &str,
    context: &ClusterContext,
) -> Vec<(&'static str, Value)> {
    let mut vars = vec![
        ("ansible_host", json!(pod_name)),
        ("ansible_connection", json!(plugin)),
    ];

    if let Some(username) = &context.username {
        vars.push(("ansible_user", json!(username)));
    }
    if let Some(token) = &context.token {
        vars.push(("ansible_password", json!(token)));
    }

    vars.push((
        "ansible_kubernetes_port",
        json!(context.port.unwrap_or(DEFAULT_API_PORT)),
    ));
    if let Some(server) = &context.server {
        vars.push(("ansible_kubernetes_cluster", json!(server)));
    }

    vars.push(("ansible_kube_namespace", json!(namespace)));
    if let Some(file) = &context.kubernetes_config_file {
        vars.push(("ansible_kube_config_file", json!(file)));
    }
    vars.push(("ansible_kube_container", json!(container_name)));

    vars
}
