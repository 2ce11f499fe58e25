//! Authentication settings block (App Service Authentication v1)

use std::collections::HashMap;

use appservice_core::resource::Value;
use appservice_core::schema::{AttributeSchema, AttributeType};
use serde::{Deserialize, Serialize};

use crate::models::web::{SiteAuthSettings, SiteAuthSettingsProperties};
use crate::validate::one_of;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub enabled: bool,
    pub additional_login_parameters: HashMap<String, String>,
    pub allowed_external_redirect_urls: Vec<String>,
    pub default_provider: String,
    pub issuer: String,
    pub runtime_version: String,
    pub token_refresh_extension_hours: i64,
    pub token_store_enabled: bool,
    pub unauthenticated_client_action: String,
    pub active_directory: Vec<AadAuthSettings>,
    pub facebook: Vec<FacebookAuthSettings>,
    pub google: Vec<GoogleAuthSettings>,
    pub microsoft: Vec<MicrosoftAuthSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AadAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub allowed_audiences: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookAuthSettings {
    pub app_id: String,
    pub app_secret: String,
    pub oauth_scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub oauth_scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrosoftAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub oauth_scopes: Vec<String>,
}

fn string_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

fn client_block(name: &str, id: &str, secret: &str, list: &str) -> AttributeSchema {
    AttributeSchema::block(
        name,
        vec![
            AttributeSchema::new(id, AttributeType::String).required(),
            AttributeSchema::new(secret, AttributeType::String)
                .optional()
                .sensitive(),
            AttributeSchema::new(list, string_list()).optional(),
        ],
        Some(1),
    )
    .optional()
}

pub fn auth_settings_schema() -> AttributeSchema {
    AttributeSchema::block(
        "auth_settings",
        vec![
            AttributeSchema::new("enabled", AttributeType::Bool).required(),
            AttributeSchema::new(
                "additional_login_parameters",
                AttributeType::Map(Box::new(AttributeType::String)),
            )
            .optional(),
            AttributeSchema::new("allowed_external_redirect_urls", string_list())
                .optional()
                .computed(),
            AttributeSchema::new(
                "default_provider",
                one_of(&[
                    "AzureActiveDirectory",
                    "Facebook",
                    "Google",
                    "MicrosoftAccount",
                    "Twitter",
                    "Github",
                ]),
            )
            .optional(),
            AttributeSchema::new("issuer", AttributeType::String).optional(),
            AttributeSchema::new("runtime_version", AttributeType::String)
                .optional()
                .computed(),
            AttributeSchema::new("token_refresh_extension_hours", AttributeType::Int)
                .optional()
                .with_default(Value::Int(72)),
            AttributeSchema::new("token_store_enabled", AttributeType::Bool)
                .optional()
                .with_default(Value::Bool(false)),
            AttributeSchema::new(
                "unauthenticated_client_action",
                one_of(&["AllowAnonymous", "RedirectToLoginPage"]),
            )
            .optional()
            .computed(),
            client_block("active_directory", "client_id", "client_secret", "allowed_audiences"),
            client_block("facebook", "app_id", "app_secret", "oauth_scopes"),
            client_block("google", "client_id", "client_secret", "oauth_scopes"),
            client_block("microsoft", "client_id", "client_secret", "oauth_scopes"),
        ],
        Some(1),
    )
    .optional()
}

pub fn auth_settings_schema_computed() -> AttributeSchema {
    auth_settings_schema().into_computed()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn non_empty_list(items: &[String]) -> Option<Vec<String>> {
    (!items.is_empty()).then(|| items.to_vec())
}

/// An empty input yields settings without properties
pub fn expand_auth_settings(input: &[AuthSettings]) -> SiteAuthSettings {
    let Some(auth) = input.first() else {
        return SiteAuthSettings::default();
    };

    let mut additional: Vec<String> = auth
        .additional_login_parameters
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    additional.sort();

    let mut props = SiteAuthSettingsProperties {
        enabled: Some(auth.enabled),
        runtime_version: non_empty(&auth.runtime_version),
        unauthenticated_client_action: non_empty(&auth.unauthenticated_client_action),
        token_store_enabled: Some(auth.token_store_enabled),
        allowed_external_redirect_urls: non_empty_list(&auth.allowed_external_redirect_urls),
        default_provider: non_empty(&auth.default_provider),
        token_refresh_extension_hours: Some(auth.token_refresh_extension_hours as f64),
        issuer: non_empty(&auth.issuer),
        additional_login_params: (!additional.is_empty()).then_some(additional),
        ..Default::default()
    };

    if let Some(aad) = auth.active_directory.first() {
        props.client_id = non_empty(&aad.client_id);
        props.client_secret = non_empty(&aad.client_secret);
        props.allowed_audiences = non_empty_list(&aad.allowed_audiences);
    }
    if let Some(facebook) = auth.facebook.first() {
        props.facebook_app_id = non_empty(&facebook.app_id);
        props.facebook_app_secret = non_empty(&facebook.app_secret);
        props.facebook_oauth_scopes = non_empty_list(&facebook.oauth_scopes);
    }
    if let Some(google) = auth.google.first() {
        props.google_client_id = non_empty(&google.client_id);
        props.google_client_secret = non_empty(&google.client_secret);
        props.google_oauth_scopes = non_empty_list(&google.oauth_scopes);
    }
    if let Some(microsoft) = auth.microsoft.first() {
        props.microsoft_account_client_id = non_empty(&microsoft.client_id);
        props.microsoft_account_client_secret = non_empty(&microsoft.client_secret);
        props.microsoft_account_oauth_scopes = non_empty_list(&microsoft.oauth_scopes);
    }

    SiteAuthSettings {
        properties: Some(props),
    }
}

/// Settings that switch authentication off, sent when the block is removed
pub fn disabled_auth_settings() -> SiteAuthSettings {
    SiteAuthSettings {
        properties: Some(SiteAuthSettingsProperties {
            enabled: Some(false),
            ..Default::default()
        }),
    }
}

/// Disabled settings with no provider configured flatten to nothing
pub fn flatten_auth_settings(input: &SiteAuthSettings) -> Vec<AuthSettings> {
    let Some(props) = &input.properties else {
        return Vec::new();
    };

    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let list = |v: &Option<Vec<String>>| v.clone().unwrap_or_default();

    let mut auth = AuthSettings {
        enabled: props.enabled.unwrap_or_default(),
        additional_login_parameters: list(&props.additional_login_params)
            .iter()
            .filter_map(|kv| kv.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        allowed_external_redirect_urls: list(&props.allowed_external_redirect_urls),
        default_provider: text(&props.default_provider),
        issuer: text(&props.issuer),
        runtime_version: text(&props.runtime_version),
        token_refresh_extension_hours: props.token_refresh_extension_hours.unwrap_or_default() as i64,
        token_store_enabled: props.token_store_enabled.unwrap_or_default(),
        unauthenticated_client_action: text(&props.unauthenticated_client_action),
        ..Default::default()
    };

    if props.client_id.is_some() {
        auth.active_directory.push(AadAuthSettings {
            client_id: text(&props.client_id),
            client_secret: text(&props.client_secret),
            allowed_audiences: list(&props.allowed_audiences),
        });
    }
    if props.facebook_app_id.is_some() {
        auth.facebook.push(FacebookAuthSettings {
            app_id: text(&props.facebook_app_id),
            app_secret: text(&props.facebook_app_secret),
            oauth_scopes: list(&props.facebook_oauth_scopes),
        });
    }
    if props.google_client_id.is_some() {
        auth.google.push(GoogleAuthSettings {
            client_id: text(&props.google_client_id),
            client_secret: text(&props.google_client_secret),
            oauth_scopes: list(&props.google_oauth_scopes),
        });
    }
    if props.microsoft_account_client_id.is_some() {
        auth.microsoft.push(MicrosoftAuthSettings {
            client_id: text(&props.microsoft_account_client_id),
            client_secret: text(&props.microsoft_account_client_secret),
            oauth_scopes: list(&props.microsoft_account_oauth_scopes),
        });
    }

    let unconfigured = !auth.enabled
        && auth.default_provider.is_empty()
        && auth.active_directory.is_empty()
        && auth.facebook.is_empty()
        && auth.google.is_empty()
        && auth.microsoft.is_empty();
    if unconfigured {
        return Vec::new();
    }
    vec![auth]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aad_settings() -> AuthSettings {
        AuthSettings {
            enabled: true,
            default_provider: "AzureActiveDirectory".to_string(),
            token_refresh_extension_hours: 72,
            additional_login_parameters: HashMap::from([(
                "response_type".to_string(),
                "code id_token".to_string(),
            )]),
            active_directory: vec![AadAuthSettings {
                client_id: "aadclientid".to_string(),
                client_secret: "aadsecret".to_string(),
                allowed_audiences: vec!["activedirectorytokenaudiences".to_string()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn expand_empty_has_no_properties() {
        assert!(expand_auth_settings(&[]).properties.is_none());
    }

    #[test]
    fn expand_active_directory() {
        let expanded = expand_auth_settings(&[aad_settings()]);
        let props = expanded.properties.unwrap();
        assert_eq!(props.enabled, Some(true));
        assert_eq!(props.client_id.as_deref(), Some("aadclientid"));
        assert_eq!(
            props.additional_login_params,
            Some(vec!["response_type=code id_token".to_string()])
        );
        assert!(props.facebook_app_id.is_none());
    }

    #[test]
    fn flatten_restores_configured_fields() {
        let flattened = flatten_auth_settings(&expand_auth_settings(&[aad_settings()]));
        assert_eq!(flattened, vec![aad_settings()]);
    }

    #[test]
    fn flatten_disabled_defaults_is_empty() {
        let remote = SiteAuthSettings {
            properties: Some(SiteAuthSettingsProperties {
                enabled: Some(false),
                token_store_enabled: Some(false),
                runtime_version: Some("~1".to_string()),
                ..Default::default()
            }),
        };
        assert!(flatten_auth_settings(&remote).is_empty());
    }
}
