// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Inventory sink and in-memory inventory model
//!
//! The builder writes through the [`InventorySink`] trait; [`Inventory`] is the
//! default implementation and the source the output renderers read from.
//! Groups are created implicitly on first reference and hold an
//! insertion-ordered, de-duplicated list of child names. A child may name a
//! host or another group; the distinction is resolved at render time.

mod builder;

pub use builder::{ContextFailure, InventoryBuilder, PopulateReport, host_key};

use std::collections::BTreeMap;

use serde_json::Value;

/// Write interface the inventory builder populates.
///
/// Every operation is idempotent: repeating a call with identical arguments
/// leaves the sink unchanged, except `set_variable`, where the last write wins.
pub trait InventorySink {
    fn add_group(&mut self, name: &str);
    fn add_child(&mut self, group: &str, child: &str);
    fn add_host(&mut self, host: &str);
    fn set_variable(&mut self, host: &str, key: &str, value: Value);
}

/// A named group of hosts and/or other groups
#[derive(Debug, Default, Clone)]
pub struct Group {
    children: Vec<String>,
}

impl Group {
    /// Child names in insertion order
    pub fn children(&self) -> &[String] {
        &self.children
    }

    fn add_child(&mut self, child: &str) {
        if !self.children.iter().any(|c| c == child) {
            self.children.push(child.to_string());
        }
    }
}

/// In-memory inventory accumulated over a run
#[derive(Debug, Default)]
pub struct Inventory {
    groups: BTreeMap<String, Group>,
    hosts: BTreeMap<String, serde_json::Map<String, Value>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&String, &Group)> {
        self.groups.iter()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn hosts(&self) -> impl Iterator<Item = (&String, &serde_json::Map<String, Value>)> {
        self.hosts.iter()
    }

    pub fn has_host(&self, name: &str) -> bool {
        self.hosts.contains_key(name)
    }

    pub fn host_vars(&self, name: &str) -> Option<&serde_json::Map<String, Value>> {
        self.hosts.get(name)
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}

impl InventorySink for Inventory {
    fn add_group(&mut self, name: &str) {
        self.groups.entry(name.to_string()).or_default();
    }

    fn add_child(&mut self, group: &str, child: &str) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .add_child(child);
    }

    fn add_host(&mut self, host: &str) {
        self.hosts.entry(host.to_string()).or_default();
    }

    fn set_variable(&mut self, host: &str, key: &str, value: Value) {
        self.hosts
            .entry(host.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_group_is_idempotent() {
        let mut inv = Inventory::new();
        inv.add_group("web");
        inv.add_child("web", "web-1");
        inv.add_group("web");

        assert_eq!(inv.groups().count(), 1);
        assert_eq!(inv.group("web").unwrap().children(), ["web-1"]);
    }

    #[test]
    fn test_add_child_is_idempotent() {
        let mut inv = Inventory::new();
        inv.add_child("web", "web-1");
        inv.add_child("web", "web-1");
        inv.add_child("web", "web-2");

        assert_eq!(inv.group("web").unwrap().children(), ["web-1", "web-2"]);
    }

    #[test]
    fn test_add_child_creates_the_group() {
        let mut inv = Inventory::new();
        inv.add_child("ns1", "app_web-1");
        assert!(inv.group("ns1").is_some());
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut inv = Inventory::new();
        inv.add_child("g", "c");
        inv.add_child("g", "a");
        inv.add_child("g", "b");
        inv.add_child("g", "a");

        assert_eq!(inv.group("g").unwrap().children(), ["c", "a", "b"]);
    }

    #[test]
    fn test_add_host_and_variables() {
        let mut inv = Inventory::new();
        inv.add_host("app_web-1");
        inv.set_variable("app_web-1", "ansible_host", json!("web-1"));
        inv.set_variable("app_web-1", "ansible_kubernetes_port", json!(8443));

        assert!(inv.has_host("app_web-1"));
        let vars = inv.host_vars("app_web-1").unwrap();
        assert_eq!(vars["ansible_host"], json!("web-1"));
        assert_eq!(vars["ansible_kubernetes_port"], json!(8443));
    }

    #[test]
    fn test_set_variable_last_write_wins() {
        let mut inv = Inventory::new();
        inv.set_variable("h", "k", json!("first"));
        inv.set_variable("h", "k", json!("second"));

        assert_eq!(inv.host_vars("h").unwrap()["k"], json!("second"));
    }

    #[test]
    fn test_set_variable_creates_the_host() {
        let mut inv = Inventory::new();
        inv.set_variable("h", "k", json!(1));
        assert!(inv.has_host("h"));
    }
}
