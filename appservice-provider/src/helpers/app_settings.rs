//! Application settings

use std::collections::HashMap;

use appservice_core::schema::{AttributeSchema, AttributeType};

use crate::models::web::StringDictionary;

/// Settings owned by the logs configuration; the platform writes them itself
const LOGS_MANAGED_SETTINGS: &[&str] = &[
    "DIAGNOSTICS_AZUREBLOBCONTAINERSASURL",
    "DIAGNOSTICS_AZUREBLOBRETENTIONINDAYS",
    "WEBSITE_HTTPLOGGING_CONTAINER_URL",
    "WEBSITE_HTTPLOGGING_RETENTION_DAYS",
];

pub fn app_settings_schema() -> AttributeSchema {
    AttributeSchema::new("app_settings", AttributeType::Map(Box::new(AttributeType::String)))
        .optional()
        .computed()
}

/// `None` when no settings are configured
pub fn expand_app_settings(input: &HashMap<String, String>) -> Option<StringDictionary> {
    if input.is_empty() {
        return None;
    }
    Some(expand_app_settings_or_empty(input))
}

/// Always a dictionary, so an update can clear every setting
pub fn expand_app_settings_or_empty(input: &HashMap<String, String>) -> StringDictionary {
    StringDictionary {
        properties: Some(input.clone()),
    }
}

pub fn flatten_app_settings(input: &StringDictionary) -> HashMap<String, String> {
    input
        .properties
        .iter()
        .flatten()
        .filter(|(k, _)| !LOGS_MANAGED_SETTINGS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
