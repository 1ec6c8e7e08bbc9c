// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Inventory configuration for k8sinv
//!
//! The config file names the cluster contexts to enumerate and the namespaces
//! to query in each. The file must end in `.kube.yaml` or `.kube.yml`; that
//! extension check is the only file-format validation beyond YAML parsing.
//!
//! ```yaml
//! plugin: kubernetes
//! contexts:
//!   - name: prod
//!     local_kube_config: true
//!     namespaces: [default, web]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

fn default_plugin() -> String {
    "kubernetes".to_string()
}

/// Top-level inventory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Connection plugin name handed to hosts as `ansible_connection`
    #[serde(default = "default_plugin")]
    pub plugin: String,
    /// Cluster contexts to enumerate, in order
    pub contexts: Vec<ClusterContext>,
}

/// One named cluster connection plus its target namespaces
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterContext {
    pub name: String,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// Use the default local kubeconfig (~/.kube/config)
    #[serde(default)]
    pub local_kube_config: bool,
    /// Explicit kubeconfig path, used when `local_kube_config` is false
    #[serde(default)]
    pub kubernetes_config_file: Option<PathBuf>,
    #[serde(default)]
    pub namespaces: Vec<String>,
}

impl InventoryConfig {
    /// Load config from a `.kube.yaml` / `.kube.yml` file
    pub fn load(path: &Path) -> Result<Self> {
        if !is_inventory_path(path) {
            bail!(
                "config file must end in .kube.yaml or .kube.yml: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: InventoryConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

/// Check the inventory file naming convention
pub fn is_inventory_path(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|p| p.ends_with(".kube.yaml") || p.ends_with(".kube.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_context() {
        let yaml = r#"
plugin: kubectl
contexts:
  - name: prod
    server: kube.example.com
    port: 6443
    token: sekret
    username: deployer
    namespaces:
      - web
      - batch
"#;
        let config: InventoryConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.plugin, "kubectl");
        assert_eq!(config.contexts.len(), 1);

        let ctx = &config.contexts[0];
        assert_eq!(ctx.name, "prod");
        assert_eq!(ctx.server.as_deref(), Some("kube.example.com"));
        assert_eq!(ctx.port, Some(6443));
        assert_eq!(ctx.token.as_deref(), Some("sekret"));
        assert_eq!(ctx.username.as_deref(), Some("deployer"));
        assert!(!ctx.local_kube_config);
        assert_eq!(ctx.namespaces, vec!["web", "batch"]);
    }

    #[test]
    fn test_plugin_defaults_to_kubernetes() {
        let yaml = "contexts: []";
        let config: InventoryConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.plugin, "kubernetes");
        assert!(config.contexts.is_empty());
    }

    #[test]
    fn test_missing_contexts_is_an_error() {
        let result: Result<InventoryConfig, _> = serde_yaml::from_str("plugin: kubernetes");
        assert!(result.is_err());
    }

    #[test]
    fn test_local_kube_config_context() {
        let yaml = r#"
contexts:
  - name: local
    local_kube_config: true
    namespaces: [default]
"#;
        let config: InventoryConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.contexts[0].local_kube_config);
        assert!(config.contexts[0].server.is_none());
    }

    #[test]
    fn test_inventory_path_extensions() {
        assert!(is_inventory_path(Path::new("clusters.kube.yaml")));
        assert!(is_inventory_path(Path::new("/etc/ansible/prod.kube.yml")));
        assert!(!is_inventory_path(Path::new("clusters.yaml")));
        assert!(!is_inventory_path(Path::new("clusters.kube.json")));
        assert!(!is_inventory_path(Path::new("kube.yml")));
    }

    #[test]
    fn test_load_rejects_wrong_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clusters.yaml");
        fs::write(&path, "contexts: []").unwrap();

        let result = InventoryConfig::load(&path);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains(".kube.yaml or .kube.yml")
        );
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clusters.kube.yaml");
        fs::write(
            &path,
            "contexts:\n  - name: dev\n    local_kube_config: true\n    namespaces: [default]\n",
        )
        .unwrap();

        let config = InventoryConfig::load(&path).unwrap();
        assert_eq!(config.contexts[0].name, "dev");
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.kube.yml");
        fs::write(&path, "contexts: [unterminated").unwrap();

        assert!(InventoryConfig::load(&path).is_err());
    }
}
