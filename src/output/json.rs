use serde_json::Value;

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(document: &Value) -> String {
        serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string())
    }
}
