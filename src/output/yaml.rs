use serde_json::Value;

pub struct YamlFormatter;

impl YamlFormatter {
    pub fn format(document: &Value) -> String {
        serde_yaml::to_string(document).unwrap_or_else(|_| "{}".to_string())
    }
}
