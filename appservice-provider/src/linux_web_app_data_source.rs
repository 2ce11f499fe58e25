//! azurerm_linux_web_app data source

use std::collections::HashMap;
use std::sync::Arc;

use appservice_core::metadata::ResourceMetaData;
use appservice_core::provider::{DataSource, ProviderError, ProviderResult};
use appservice_core::schema::{AttributeSchema, AttributeType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::Clients;
use crate::helpers::app_settings::flatten_app_settings;
use crate::helpers::auth::{AuthSettings, auth_settings_schema_computed, flatten_auth_settings};
use crate::helpers::backup::{Backup, backup_schema_computed, flatten_backup_config};
use crate::helpers::connection_strings::{
    ConnectionString, connection_string_schema_computed, flatten_connection_strings,
};
use crate::helpers::identity::{Identity, flatten_identity, identity_schema_computed};
use crate::helpers::logs::{LogsConfig, flatten_logs_config, logs_config_schema_computed};
use crate::helpers::site_config::{SiteConfigLinux, flatten_site_config_linux, site_config_schema_linux_computed};
use crate::helpers::site_credentials::{SiteCredential, flatten_site_credentials, site_credential_schema};
use crate::helpers::storage::{StorageAccount, flatten_storage_accounts, storage_account_schema_computed};
use crate::helpers::tags::{flatten_tags, normalize_location, tags_schema_computed};
use crate::parse::WebAppId;
use crate::site_details::{SiteDetails, api_failure, split_addresses};
use crate::validate::web_app_name_type;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinuxWebAppDataSourceModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub service_plan_id: String,
    pub app_metadata: HashMap<String, String>,
    pub app_settings: HashMap<String, String>,
    pub auth_settings: Vec<AuthSettings>,
    pub backup: Vec<Backup>,
    pub client_affinity_enabled: bool,
    pub client_cert_enabled: bool,
    pub client_cert_mode: String,
    pub connection_string: Vec<ConnectionString>,
    pub custom_domain_verification_id: String,
    pub default_hostname: String,
    pub enabled: bool,
    pub https_only: bool,
    pub identity: Vec<Identity>,
    pub kind: String,
    pub logs: Vec<LogsConfig>,
    pub outbound_ip_addresses: String,
    pub outbound_ip_address_list: Vec<String>,
    pub possible_outbound_ip_addresses: String,
    pub possible_outbound_ip_address_list: Vec<String>,
    pub site_config: Vec<SiteConfigLinux>,
    pub site_credential: Vec<SiteCredential>,
    pub storage_account: Vec<StorageAccount>,
    pub tags: HashMap<String, String>,
}

pub struct LinuxWebAppDataSource;

#[async_trait]
impl DataSource<Clients> for LinuxWebAppDataSource {
    fn resource_type(&self) -> &'static str {
        "azurerm_linux_web_app"
    }

    fn arguments(&self) -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::new("name", web_app_name_type()).required(),
            AttributeSchema::new("resource_group_name", AttributeType::String).required(),
        ]
    }

    fn attributes(&self) -> Vec<AttributeSchema> {
        let string_map = || AttributeType::Map(Box::new(AttributeType::String));
        let string_list = || AttributeType::List(Box::new(AttributeType::String));
        vec![
            AttributeSchema::new("location", AttributeType::String).computed(),
            AttributeSchema::new("app_metadata", string_map()).computed(),
            AttributeSchema::new("app_settings", string_map()).computed(),
            auth_settings_schema_computed(),
            backup_schema_computed(),
            AttributeSchema::new("client_affinity_enabled", AttributeType::Bool).computed(),
            AttributeSchema::new("client_cert_enabled", AttributeType::Bool).computed(),
            AttributeSchema::new("client_cert_mode", AttributeType::String).computed(),
            connection_string_schema_computed(),
            AttributeSchema::new("custom_domain_verification_id", AttributeType::String)
                .computed()
                .sensitive(),
            AttributeSchema::new("default_hostname", AttributeType::String).computed(),
            AttributeSchema::new("enabled", AttributeType::Bool).computed(),
            AttributeSchema::new("https_only", AttributeType::Bool).computed(),
            identity_schema_computed(),
            AttributeSchema::new("kind", AttributeType::String).computed(),
            logs_config_schema_computed(),
            AttributeSchema::new("outbound_ip_addresses", AttributeType::String).computed(),
            AttributeSchema::new("outbound_ip_address_list", string_list()).computed(),
            AttributeSchema::new("possible_outbound_ip_addresses", AttributeType::String).computed(),
            AttributeSchema::new("possible_outbound_ip_address_list", string_list()).computed(),
            site_credential_schema(),
            AttributeSchema::new("service_plan_id", AttributeType::String).computed(),
            site_config_schema_linux_computed(),
            storage_account_schema_computed(),
            tags_schema_computed(),
        ]
    }

    async fn read(&self, metadata: &mut ResourceMetaData<Clients>) -> ProviderResult<()> {
        let mut web_app: LinuxWebAppDataSourceModel = metadata.decode()?;
        let clients = metadata.client();
        let client = Arc::clone(&clients.web_apps);

        let id = WebAppId::new(&clients.subscription_id, &web_app.resource_group_name, &web_app.name);

        let existing = match client.get(&id).await {
            Ok(site) => site,
            Err(e) if e.is_not_found() => {
                return Err(
                    ProviderError::not_found(format!("Linux Web App with {} not found", id)).for_resource(id.id())
                );
            }
            Err(e) => return Err(api_failure(&id, format!("retrieving Linux {}", id))(e)),
        };

        let details = SiteDetails::fetch(client.as_ref(), &id, "Linux").await?;

        web_app.location = normalize_location(existing.location.as_deref().unwrap_or_default());
        web_app.kind = existing.kind.clone().unwrap_or_default();
        web_app.tags = flatten_tags(existing.tags.as_ref());
        web_app.identity = flatten_identity(existing.identity.as_ref());
        if let Some(props) = &existing.properties {
            let text = |v: &Option<String>| v.clone().unwrap_or_default();
            web_app.service_plan_id = text(&props.server_farm_id);
            web_app.client_affinity_enabled = props.client_affinity_enabled.unwrap_or_default();
            web_app.client_cert_enabled = props.client_cert_enabled.unwrap_or_default();
            web_app.client_cert_mode = text(&props.client_cert_mode);
            web_app.custom_domain_verification_id = text(&props.custom_domain_verification_id);
            web_app.default_hostname = text(&props.default_host_name);
            web_app.enabled = props.enabled.unwrap_or_default();
            web_app.https_only = props.https_only.unwrap_or_default();
            web_app.outbound_ip_addresses = text(&props.outbound_ip_addresses);
            web_app.outbound_ip_address_list = split_addresses(&web_app.outbound_ip_addresses);
            web_app.possible_outbound_ip_addresses = text(&props.possible_outbound_ip_addresses);
            web_app.possible_outbound_ip_address_list = split_addresses(&web_app.possible_outbound_ip_addresses);
        }

        web_app.app_metadata = details.metadata.properties.clone().unwrap_or_default();
        web_app.app_settings = flatten_app_settings(&details.app_settings);
        web_app.auth_settings = flatten_auth_settings(&details.auth);
        web_app.backup = flatten_backup_config(details.backup.as_ref());
        web_app.logs = flatten_logs_config(&details.logs);
        web_app.site_config = flatten_site_config_linux(details.site_config.properties.as_ref());
        web_app.storage_account = flatten_storage_accounts(&details.storage_accounts);
        web_app.connection_string = flatten_connection_strings(&details.connection_strings);
        web_app.site_credential = flatten_site_credentials(&details.credentials);

        metadata.set_id(id.id());
        metadata.encode(&web_app)
    }
}
