//! Storage account mounts

use std::collections::HashMap;

use appservice_core::schema::{AttributeSchema, AttributeType};
use serde::{Deserialize, Serialize};

use crate::models::web::{AzureStorageInfoValue, AzureStoragePropertyDictionary};
use crate::validate::one_of;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageAccount {
    pub name: String,
    #[serde(rename = "type")]
    pub storage_type: String,
    pub account_name: String,
    pub share_name: String,
    pub access_key: String,
    pub mount_path: String,
}

pub fn storage_account_schema() -> AttributeSchema {
    AttributeSchema::block(
        "storage_account",
        vec![
            AttributeSchema::new("name", AttributeType::String).required(),
            AttributeSchema::new("type", one_of(&["AzureBlob", "AzureFiles"])).required(),
            AttributeSchema::new("account_name", AttributeType::String).required(),
            AttributeSchema::new("share_name", AttributeType::String).required(),
            AttributeSchema::new("access_key", AttributeType::String)
                .required()
                .sensitive(),
            AttributeSchema::new("mount_path", AttributeType::String).optional(),
        ],
        None,
    )
    .optional()
    .unordered()
}

pub fn storage_account_schema_computed() -> AttributeSchema {
    storage_account_schema().into_computed()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// `None` when no accounts are configured
pub fn expand_storage_config(input: &[StorageAccount]) -> Option<AzureStoragePropertyDictionary> {
    if input.is_empty() {
        return None;
    }
    Some(expand_storage_config_or_empty(input))
}

/// Always a dictionary; an empty one removes every mount
pub fn expand_storage_config_or_empty(input: &[StorageAccount]) -> AzureStoragePropertyDictionary {
    let properties: HashMap<String, AzureStorageInfoValue> = input
        .iter()
        .map(|account| {
            (
                account.name.clone(),
                AzureStorageInfoValue {
                    storage_type: non_empty(&account.storage_type),
                    account_name: non_empty(&account.account_name),
                    share_name: non_empty(&account.share_name),
                    access_key: non_empty(&account.access_key),
                    mount_path: non_empty(&account.mount_path),
                },
            )
        })
        .collect();
    AzureStoragePropertyDictionary {
        properties: Some(properties),
    }
}

/// Sorted by name
pub fn flatten_storage_accounts(input: &AzureStoragePropertyDictionary) -> Vec<StorageAccount> {
    let mut accounts: Vec<StorageAccount> = input
        .properties
        .iter()
        .flatten()
        .map(|(name, value)| StorageAccount {
            name: name.clone(),
            storage_type: value.storage_type.clone().unwrap_or_default(),
            account_name: value.account_name.clone().unwrap_or_default(),
            share_name: value.share_name.clone().unwrap_or_default(),
            access_key: value.access_key.clone().unwrap_or_default(),
            mount_path: value.mount_path.clone().unwrap_or_default(),
        })
        .collect();
    accounts.sort_by(|a, b| a.name.cmp(&b.name));
    accounts
}
