//! Metadata - Everything a driver sees during one lifecycle event
//!
//! Holds the client bundle, the desired config, the prior state (for update),
//! the resource ID and the state the driver writes back. Config and state are
//! flat attribute maps; drivers work on typed models through `decode`/`encode`.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::differ::changed_attributes;
use crate::provider::{ProviderError, ProviderResult};
use crate::resource::{AttributeMap, State, attributes_from_json, attributes_to_json};
use crate::schema::{ResourceSchema, normalize};

pub struct ResourceMetaData<C> {
    client: Arc<C>,
    schema: ResourceSchema,
    config: AttributeMap,
    prior: Option<AttributeMap>,
    id: Option<String>,
    state: Option<AttributeMap>,
    gone: bool,
}

impl<C> ResourceMetaData<C> {
    pub fn new(client: Arc<C>, schema: ResourceSchema) -> Self {
        Self {
            client,
            schema,
            config: HashMap::new(),
            prior: None,
            id: None,
            state: None,
            gone: false,
        }
    }

    /// Desired config; schema defaults are filled in
    pub fn with_config(mut self, mut config: AttributeMap) -> Self {
        self.schema.apply_defaults(&mut config);
        self.config = config;
        self
    }

    pub fn with_prior_state(mut self, prior: AttributeMap) -> Self {
        self.prior = Some(prior);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn config(&self) -> &AttributeMap {
        &self.config
    }

    /// Convert the desired config into a typed model
    pub fn decode<T: DeserializeOwned>(&self) -> ProviderResult<T> {
        serde_json::from_value(attributes_to_json(&self.config))
            .map_err(|e| ProviderError::decode("decoding config").with_cause(e))
    }

    /// Replace the written-back state with a typed model
    pub fn encode<T: Serialize>(&mut self, model: &T) -> ProviderResult<()> {
        let json = serde_json::to_value(model)
            .map_err(|e| ProviderError::decode("encoding state").with_cause(e))?;
        self.state = Some(attributes_from_json(&json));
        Ok(())
    }

    /// Whether `key` differs between the prior state and the desired config.
    ///
    /// Without a prior state (create) any configured key counts as changed.
    /// An optional+computed key left out of the config never changes.
    pub fn has_change(&self, key: &str) -> bool {
        let schema = self.schema.attributes.get(key);
        let desired = self
            .config
            .get(key)
            .and_then(|v| normalize(schema, v));

        if desired.is_none() && schema.is_some_and(|s| s.computed) {
            return false;
        }

        let prior = self
            .prior
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(|v| normalize(schema, v));

        prior != desired
    }

    pub fn has_changes(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.has_change(k))
    }

    /// All argument keys that changed, sorted
    pub fn changes(&self) -> Vec<String> {
        let desired = self.schema.comparable_arguments(&self.config);
        let prior = self
            .prior
            .as_ref()
            .map(|p| self.schema.comparable_arguments(p))
            .unwrap_or_default();
        changed_attributes(&prior, &desired)
            .into_iter()
            .filter(|k| self.has_change(k))
            .collect()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The ID, or an error if the host supplied none
    pub fn require_id(&self) -> ProviderResult<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| ProviderError::invalid_argument("resource ID is not set"))
    }

    pub fn set_id(&mut self, id: impl Display) {
        self.id = Some(id.to_string());
    }

    /// Record that the remote object no longer exists; the host drops it from state
    pub fn mark_as_gone(&mut self, id: impl Display) -> ProviderResult<()> {
        log::info!("[DEBUG] {} was not found - removing from state", id);
        self.gone = true;
        self.state = None;
        self.id = None;
        Ok(())
    }

    pub fn is_gone(&self) -> bool {
        self.gone
    }

    pub fn resource_requires_import(&self, resource_type: &str, id: impl Display) -> ProviderError {
        ProviderError::already_exists(resource_type, id.to_string())
    }

    pub fn state(&self) -> Option<&AttributeMap> {
        self.state.as_ref()
    }

    /// Final state handed back to the host
    pub fn into_state(self) -> State {
        match (self.gone, self.state) {
            (false, Some(attributes)) => {
                let state = State::existing(attributes);
                match self.id {
                    Some(id) => state.with_id(id),
                    None => state,
                }
            }
            _ => State::not_found(),
        }
    }
}
