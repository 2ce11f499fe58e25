//! Microsoft.Media video analyzer bodies (api-version 2021-05-01-preview)

use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "2021-05-01-preview";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeModuleEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<EdgeModuleProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeModuleProperties {
    #[serde(skip_serializing)]
    pub edge_module_id: Option<String>,
}
