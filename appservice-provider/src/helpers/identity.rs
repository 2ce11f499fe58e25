//! Managed identity block

use std::collections::HashMap;

use appservice_core::schema::{AttributeSchema, AttributeType};
use serde::{Deserialize, Serialize};

use crate::models::web::{ManagedServiceIdentity, UserAssignedIdentity};
use crate::validate::one_of;

const SYSTEM_ASSIGNED: &str = "SystemAssigned";
const USER_ASSIGNED: &str = "UserAssigned";
const SYSTEM_ASSIGNED_USER_ASSIGNED: &str = "SystemAssigned, UserAssigned";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    #[serde(rename = "type")]
    pub identity_type: String,
    pub identity_ids: Vec<String>,
    pub principal_id: String,
    pub tenant_id: String,
}

pub fn identity_schema() -> AttributeSchema {
    AttributeSchema::block(
        "identity",
        vec![
            AttributeSchema::new(
                "type",
                one_of(&[
                    SYSTEM_ASSIGNED,
                    USER_ASSIGNED,
                    SYSTEM_ASSIGNED_USER_ASSIGNED,
                ]),
            )
            .required(),
            AttributeSchema::new("identity_ids", AttributeType::List(Box::new(AttributeType::String)))
                .optional()
                .unordered(),
            AttributeSchema::new("principal_id", AttributeType::String).computed(),
            AttributeSchema::new("tenant_id", AttributeType::String).computed(),
        ],
        Some(1),
    )
    .optional()
}

pub fn identity_schema_computed() -> AttributeSchema {
    identity_schema().into_computed()
}

pub fn expand_identity(input: &[Identity]) -> Option<ManagedServiceIdentity> {
    let identity = input.first()?;
    let user_assigned_identities = (!identity.identity_ids.is_empty()).then(|| {
        identity
            .identity_ids
            .iter()
            .map(|id| (id.clone(), UserAssignedIdentity::default()))
            .collect::<HashMap<_, _>>()
    });
    Some(ManagedServiceIdentity {
        identity_type: identity.identity_type.clone(),
        user_assigned_identities,
        ..Default::default()
    })
}

pub fn flatten_identity(input: Option<&ManagedServiceIdentity>) -> Vec<Identity> {
    let Some(identity) = input else {
        return Vec::new();
    };
    if identity.identity_type.is_empty() || identity.identity_type.eq_ignore_ascii_case("None") {
        return Vec::new();
    }

    let mut identity_ids: Vec<String> = identity
        .user_assigned_identities
        .as_ref()
        .map(|ids| ids.keys().cloned().collect())
        .unwrap_or_default();
    identity_ids.sort();

    vec![Identity {
        identity_type: identity.identity_type.clone(),
        identity_ids,
        principal_id: identity.principal_id.clone().unwrap_or_default(),
        tenant_id: identity.tenant_id.clone().unwrap_or_default(),
    }]
}
