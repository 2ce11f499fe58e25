//! Resource tags and location

use std::collections::HashMap;

use appservice_core::resource::Value;
use appservice_core::schema::{AttributeSchema, AttributeType};

pub fn tags_schema() -> AttributeSchema {
    AttributeSchema::new("tags", AttributeType::Map(Box::new(AttributeType::String))).optional()
}

pub fn tags_schema_computed() -> AttributeSchema {
    tags_schema().into_computed()
}

pub fn expand_tags(input: &HashMap<String, String>) -> Option<HashMap<String, String>> {
    (!input.is_empty()).then(|| input.clone())
}

pub fn flatten_tags(input: Option<&HashMap<String, String>>) -> HashMap<String, String> {
    input.cloned().unwrap_or_default()
}

/// "West Europe" and "westeurope" name the same location
pub fn normalize_location(input: &str) -> String {
    input.replace(' ', "").to_lowercase()
}

pub fn location_schema() -> AttributeSchema {
    AttributeSchema::new("location", AttributeType::String)
        .required()
        .force_new()
        .with_canonical(|value| match value.as_str() {
            Some(location) => Value::String(normalize_location(location)),
            None => value.clone(),
        })
}
