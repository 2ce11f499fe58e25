//! Microsoft.Web request and response bodies (api-version 2021-02-01)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "2021-02-01";

/// Resource type used in name availability checks
pub const CHECK_NAME_RESOURCE_TYPE_SITES: &str = "Microsoft.Web/sites";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ManagedServiceIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SiteProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_farm_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_config: Option<SiteConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_affinity_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_cert_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_cert_mode: Option<String>,
    #[serde(skip_serializing)]
    pub custom_domain_verification_id: Option<String>,
    #[serde(skip_serializing)]
    pub default_host_name: Option<String>,
    #[serde(skip_serializing)]
    pub outbound_ip_addresses: Option<String>,
    #[serde(skip_serializing)]
    pub possible_outbound_ip_addresses: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagedServiceIdentity {
    #[serde(rename = "type")]
    pub identity_type: String,
    #[serde(skip_serializing)]
    pub principal_id: Option<String>,
    #[serde(skip_serializing)]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_assigned_identities: Option<HashMap<String, UserAssignedIdentity>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAssignedIdentity {
    #[serde(skip_serializing)]
    pub principal_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfigResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SiteConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_command_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_documents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ftps_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http20_enabled: Option<bool>,
    #[serde(rename = "loadBalancing", skip_serializing_if = "Option::is_none")]
    pub load_balancing_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_pipeline_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_tls_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_debugging_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_debugging_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scm_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use32_bit_worker_process: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_sockets_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_workers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_security_restrictions: Option<Vec<IpSecurityRestriction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_framework_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_container_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_fx_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linux_fx_version: Option<String>,
    #[serde(skip_serializing)]
    pub detailed_error_logging_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsSettings {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_credentials: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpSecurityRestriction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnet_subnet_resource_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteAuthSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SiteAuthSettingsProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteAuthSettingsProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unauthenticated_client_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_store_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_external_redirect_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_refresh_extension_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_audiences: Option<Vec<String>>,
    /// Entries are "key=value"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_login_params: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_app_secret: Option<String>,
    #[serde(
        rename = "facebookOAuthScopes",
        skip_serializing_if = "Option::is_none"
    )]
    pub facebook_oauth_scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_client_secret: Option<String>,
    #[serde(rename = "googleOAuthScopes", skip_serializing_if = "Option::is_none")]
    pub google_oauth_scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microsoft_account_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microsoft_account_client_secret: Option<String>,
    #[serde(
        rename = "microsoftAccountOAuthScopes",
        skip_serializing_if = "Option::is_none"
    )]
    pub microsoft_account_oauth_scopes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BackupRequestProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRequestProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_account_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_schedule: Option<BackupSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackupSchedule {
    pub frequency_interval: i64,
    pub frequency_unit: String,
    pub keep_at_least_one_backup: bool,
    pub retention_period_in_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing)]
    pub last_execution_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteLogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SiteLogsConfigProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteLogsConfigProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_logs: Option<ApplicationLogsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_logs: Option<HttpLogsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_requests_tracing: Option<EnabledConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_error_messages: Option<EnabledConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnabledConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationLogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system: Option<FileSystemApplicationLogsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_blob_storage: Option<AzureBlobStorageApplicationLogsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSystemApplicationLogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureBlobStorageApplicationLogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sas_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpLogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_system: Option<FileSystemHttpLogsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_blob_storage: Option<AzureBlobStorageHttpLogsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemHttpLogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_in_mb: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureBlobStorageHttpLogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sas_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Plain key/value dictionary (app settings, site metadata)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringDictionary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureStoragePropertyDictionary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, AzureStorageInfoValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureStorageInfoValue {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStringDictionary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, ConnStringValueTypePair>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnStringValueTypePair {
    pub value: String,
    #[serde(rename = "type")]
    pub connection_type: String,
}

/// Publishing credentials of a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<UserProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishing_user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishing_password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceNameAvailabilityRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fqdn: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNameAvailability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppServicePlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AppServicePlanProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppServicePlanProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting_environment_profile: Option<HostingEnvironmentProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostingEnvironmentProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppServiceEnvironmentResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AppServiceEnvironment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppServiceEnvironment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_suffix: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn site_skips_read_only_fields_on_write() {
        let site = Site {
            location: Some("westeurope".to_string()),
            properties: Some(SiteProperties {
                server_farm_id: Some("/plan".to_string()),
                https_only: Some(true),
                default_host_name: Some("app1.azurewebsites.net".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&site).unwrap(),
            json!({
                "location": "westeurope",
                "properties": {"serverFarmId": "/plan", "httpsOnly": true}
            })
        );
    }

    #[test]
    fn site_config_wire_names() {
        let config: SiteConfig = serde_json::from_value(json!({
            "http20Enabled": true,
            "use32BitWorkerProcess": false,
            "loadBalancing": "LeastRequests",
            "minTlsVersion": "1.2",
            "numberOfWorkers": 2,
        }))
        .unwrap();
        assert_eq!(config.http20_enabled, Some(true));
        assert_eq!(config.use32_bit_worker_process, Some(false));
        assert_eq!(config.load_balancing_mode.as_deref(), Some("LeastRequests"));
        assert_eq!(config.number_of_workers, Some(2));
    }

    #[test]
    fn auth_scopes_wire_names() {
        let props = SiteAuthSettingsProperties {
            facebook_oauth_scopes: Some(vec!["email".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&props).unwrap(),
            json!({"facebookOAuthScopes": ["email"]})
        );
    }
}
