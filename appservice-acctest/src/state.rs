//! Terraform state as written to `terraform.tfstate`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{HarnessError, HarnessResult};

/// The state file terraform keeps in the working directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    /// State file format version
    pub version: u32,
    /// Monotonically increasing number for each state modification
    #[serde(default)]
    pub serial: u64,
    #[serde(default)]
    pub lineage: String,
    #[serde(default)]
    pub terraform_version: String,
    #[serde(default)]
    pub resources: Vec<ResourceState>,
}

impl StateFile {
    pub const FILE_NAME: &'static str = "terraform.tfstate";

    /// Read the state file from a working directory, `None` before the first apply
    pub fn load(dir: &Path) -> HarnessResult<Option<Self>> {
        let path = dir.join(Self::FILE_NAME);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let state: StateFile = serde_json::from_str(&content)
            .map_err(|e| HarnessError::InvalidState(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(Some(state))
    }

    /// Find an instance by address, e.g. `azurerm_resource_group.test`
    pub fn instance(&self, address: &str) -> Option<InstanceState> {
        self.instances().into_iter().find(|i| i.address == address)
    }

    /// Every instance of a managed resource type
    pub fn instances_of(&self, resource_type: &str) -> Vec<InstanceState> {
        self.instances()
            .into_iter()
            .filter(|i| i.resource_type == resource_type && !i.address.starts_with("data."))
            .collect()
    }

    pub fn instances(&self) -> Vec<InstanceState> {
        self.resources.iter().flat_map(ResourceState::instance_states).collect()
    }
}

/// One `resource` or `data` block in the state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// "managed" or "data"
    pub mode: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub instances: Vec<InstanceObject>,
}

impl ResourceState {
    fn address(&self) -> String {
        match self.mode.as_str() {
            "data" => format!("data.{}.{}", self.resource_type, self.name),
            _ => format!("{}.{}", self.resource_type, self.name),
        }
    }

    fn instance_states(&self) -> Vec<InstanceState> {
        let address = self.address();
        self.instances
            .iter()
            .map(|instance| {
                let address = match &instance.index_key {
                    Some(Value::Number(n)) => format!("{}.{}", address, n),
                    Some(Value::String(s)) => format!("{}.{}", address, s),
                    _ => address.clone(),
                };
                InstanceState::new(address, &self.resource_type, &instance.attributes)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_key: Option<Value>,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

/// A single instance with its attributes flattened to `a.0.b` keys
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceState {
    pub address: String,
    pub resource_type: String,
    pub id: String,
    pub attributes: HashMap<String, String>,
}

impl InstanceState {
    pub fn new(address: impl Into<String>, resource_type: &str, attributes: &HashMap<String, Value>) -> Self {
        let mut flat = HashMap::new();
        for (key, value) in attributes {
            flatten_into(key, value, &mut flat);
        }
        Self {
            address: address.into(),
            resource_type: resource_type.to_string(),
            id: flat.get("id").cloned().unwrap_or_default(),
            attributes: flat,
        }
    }
}

// Lists get a `.#` count and maps a `.%` count, as in the SDK's flatmap.
fn flatten_into(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Array(items) => {
            out.insert(format!("{}.#", prefix), items.len().to_string());
            for (i, item) in items.iter().enumerate() {
                flatten_into(&format!("{}.{}", prefix, i), item, out);
            }
        }
        Value::Object(entries) => {
            out.insert(format!("{}.%", prefix), entries.len().to_string());
            for (key, item) in entries {
                flatten_into(&format!("{}.{}", prefix, key), item, out);
            }
        }
    }
}
