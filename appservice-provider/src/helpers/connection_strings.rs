//! Connection strings

use std::collections::HashMap;

use appservice_core::schema::{AttributeSchema, AttributeType};
use serde::{Deserialize, Serialize};

use crate::models::web::{ConnStringValueTypePair, ConnectionStringDictionary};
use crate::validate::one_of;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionString {
    pub name: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    pub value: String,
}

pub fn connection_string_schema() -> AttributeSchema {
    AttributeSchema::block(
        "connection_string",
        vec![
            AttributeSchema::new("name", AttributeType::String).required(),
            AttributeSchema::new(
                "type",
                one_of(&[
                    "APIHub",
                    "Custom",
                    "DocDb",
                    "EventHub",
                    "MySQL",
                    "NotificationHub",
                    "PostgreSQL",
                    "RedisCache",
                    "ServiceBus",
                    "SQLAzure",
                    "SQLServer",
                ]),
            )
            .required(),
            AttributeSchema::new("value", AttributeType::String)
                .required()
                .sensitive(),
        ],
        None,
    )
    .optional()
    .unordered()
}

pub fn connection_string_schema_computed() -> AttributeSchema {
    connection_string_schema().into_computed()
}

/// `None` when no connection strings are configured
pub fn expand_connection_strings(input: &[ConnectionString]) -> Option<ConnectionStringDictionary> {
    if input.is_empty() {
        return None;
    }
    Some(expand_connection_strings_or_empty(input))
}

/// Always a dictionary; an empty one removes every connection string
pub fn expand_connection_strings_or_empty(input: &[ConnectionString]) -> ConnectionStringDictionary {
    let properties: HashMap<String, ConnStringValueTypePair> = input
        .iter()
        .map(|cs| {
            (
                cs.name.clone(),
                ConnStringValueTypePair {
                    value: cs.value.clone(),
                    connection_type: cs.connection_type.clone(),
                },
            )
        })
        .collect();
    ConnectionStringDictionary {
        properties: Some(properties),
    }
}

/// Sorted by name
pub fn flatten_connection_strings(input: &ConnectionStringDictionary) -> Vec<ConnectionString> {
    let mut strings: Vec<ConnectionString> = input
        .properties
        .iter()
        .flatten()
        .map(|(name, pair)| ConnectionString {
            name: name.clone(),
            connection_type: pair.connection_type.clone(),
            value: pair.value.clone(),
        })
        .collect();
    strings.sort_by(|a, b| a.name.cmp(&b.name));
    strings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let input = vec![ConnectionString {
            name: "Example".to_string(),
            connection_type: "PostgreSQL".to_string(),
            value: "some-postgresql-connection-string".to_string(),
        }];
        let expanded = expand_connection_strings(&input).unwrap();
        assert_eq!(
            serde_json::to_value(&expanded).unwrap(),
            serde_json::json!({"properties": {"Example": {
                "value": "some-postgresql-connection-string",
                "type": "PostgreSQL"
            }}})
        );
        assert_eq!(flatten_connection_strings(&expanded), input);
    }

    #[test]
    fn empty_input() {
        assert!(expand_connection_strings(&[]).is_none());
        assert!(flatten_connection_strings(&ConnectionStringDictionary::default()).is_empty());
    }
}
