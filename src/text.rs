//! String standardisation shared by region types, encoders, rule ids and road types.

use serde_json::{Map, Value};

/// GeoJSON feature property holding a polygon's region type.
pub const REGION_TYPE_KEY: &str = "regiontype";

/// Lower-case and trim. All map keys in the crate are compared in this form.
pub fn std_string(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Find a property by case-insensitive, trimmed key. Null values are skipped;
/// non-string values are rendered as JSON text. The value is not standardised.
pub fn find_property(properties: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    let key = std_string(key);
    properties?
        .iter()
        .filter(|(k, v)| !v.is_null() && std_string(k) == key)
        .map(|(_, v)| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .next()
}

/// Find the region type property of a feature. Not standardised.
pub fn find_region_type(properties: Option<&Map<String, Value>>) -> Option<String> {
    find_property(properties, REGION_TYPE_KEY)
}
