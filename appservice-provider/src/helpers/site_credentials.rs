//! Publishing credentials

use appservice_core::schema::{AttributeSchema, AttributeType};
use serde::{Deserialize, Serialize};

use crate::models::web::User;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteCredential {
    pub name: String,
    pub password: String,
}

pub fn site_credential_schema() -> AttributeSchema {
    AttributeSchema::block(
        "site_credential",
        vec![
            AttributeSchema::new("name", AttributeType::String).computed(),
            AttributeSchema::new("password", AttributeType::String)
                .computed()
                .sensitive(),
        ],
        None,
    )
    .computed()
}

pub fn flatten_site_credentials(input: &User) -> Vec<SiteCredential> {
    let Some(props) = &input.properties else {
        return Vec::new();
    };
    vec![SiteCredential {
        name: props.publishing_user_name.clone().unwrap_or_default(),
        password: props.publishing_password.clone().unwrap_or_default(),
    }]
}
