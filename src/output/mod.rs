mod json;
mod yaml;

pub use json::JsonFormatter;
pub use yaml::YamlFormatter;

use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::inventory::Inventory;

/// Render the full inventory document (`--list`)
pub fn render(inventory: &Inventory, format: &OutputFormat) -> String {
    let document = to_document(inventory);
    match format {
        OutputFormat::Json => JsonFormatter::format(&document),
        OutputFormat::Yaml => YamlFormatter::format(&document),
    }
}

/// Render one host's variables (`--host`); unknown hosts print an empty map
pub fn render_host(inventory: &Inventory, host: &str, format: &OutputFormat) -> String {
    let vars = inventory
        .host_vars(host)
        .cloned()
        .map(Value::Object)
        .unwrap_or_else(|| json!({}));
    match format {
        OutputFormat::Json => JsonFormatter::format(&vars),
        OutputFormat::Yaml => YamlFormatter::format(&vars),
    }
}

/// Build the Ansible dynamic-inventory document: one object per group with
/// host children and group children split apart, plus `_meta.hostvars`.
/// A child naming a known host lands in `hosts`; anything else (pod-name
/// children of label and service groups) is a group reference.
fn to_document(inventory: &Inventory) -> Value {
    let mut root = serde_json::Map::new();

    for (name, group) in inventory.groups() {
        let mut hosts = Vec::new();
        let mut children = Vec::new();
        for child in group.children() {
            if inventory.has_host(child) {
                hosts.push(child.clone());
            } else {
                children.push(child.clone());
            }
        }
        root.insert(name.clone(), json!({ "hosts": hosts, "children": children }));
    }

    let hostvars: serde_json::Map<String, Value> = inventory
        .hosts()
        .map(|(name, vars)| (name.clone(), Value::Object(vars.clone())))
        .collect();
    root.insert("_meta".to_string(), json!({ "hostvars": hostvars }));

    Value::Object(root)
}
