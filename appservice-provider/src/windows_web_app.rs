//! azurerm_windows_web_app resource
//!
//! The site itself is written with a single create-or-update. Settings groups
//! the platform manages through separate endpoints (app settings, auth, logs,
//! backup, storage mounts, connection strings) are applied afterwards, one
//! call per group.

use std::collections::HashMap;
use std::sync::Arc;

use appservice_core::metadata::ResourceMetaData;
use appservice_core::provider::{ProviderError, ProviderResult, Resource};
use appservice_core::resource::Value;
use appservice_core::schema::{AttributeSchema, AttributeType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::{Clients, WebAppsApi};
use crate::helpers::app_settings::{app_settings_schema, expand_app_settings, expand_app_settings_or_empty, flatten_app_settings};
use crate::helpers::auth::{
    AuthSettings, auth_settings_schema, disabled_auth_settings, expand_auth_settings, flatten_auth_settings,
};
use crate::helpers::backup::{Backup, backup_schema, expand_backup_config, flatten_backup_config};
use crate::helpers::connection_strings::{
    ConnectionString, connection_string_schema, expand_connection_strings, expand_connection_strings_or_empty,
    flatten_connection_strings,
};
use crate::helpers::identity::{Identity, expand_identity, flatten_identity, identity_schema};
use crate::helpers::logs::{LogsConfig, disabled_logs_config, expand_logs_config, flatten_logs_config, logs_config_schema};
use crate::helpers::site_config::{
    CURRENT_STACK_KEY, SiteConfigWindows, expand_site_config_windows, flatten_site_config_windows,
    site_config_schema_windows,
};
use crate::helpers::site_credentials::{SiteCredential, flatten_site_credentials, site_credential_schema};
use crate::helpers::storage::{
    StorageAccount, expand_storage_config, expand_storage_config_or_empty, flatten_storage_accounts,
    storage_account_schema,
};
use crate::helpers::tags::{expand_tags, flatten_tags, location_schema, normalize_location, tags_schema};
use crate::models::web::{
    CHECK_NAME_RESOURCE_TYPE_SITES, ResourceNameAvailabilityRequest, Site, SiteConfig, SiteProperties,
    StringDictionary,
};
use crate::parse::{AppServiceEnvironmentId, ServicePlanId, WebAppId};
use crate::site_details::{SiteDetails, api_failure, split_addresses};
use crate::validate::{one_of, service_plan_id_type, web_app_name_type};

const ASE_DNS_SUFFIX: &str = "appserviceenvironment.net";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsWebAppModel {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub service_plan_id: String,
    pub app_settings: HashMap<String, String>,
    pub auth_settings: Vec<AuthSettings>,
    pub backup: Vec<Backup>,
    pub client_affinity_enabled: bool,
    pub client_cert_enabled: bool,
    pub client_cert_mode: String,
    pub enabled: bool,
    pub https_only: bool,
    pub identity: Vec<Identity>,
    pub logs: Vec<LogsConfig>,
    pub site_config: Vec<SiteConfigWindows>,
    pub storage_account: Vec<StorageAccount>,
    pub connection_string: Vec<ConnectionString>,
    pub custom_domain_verification_id: String,
    pub default_hostname: String,
    pub kind: String,
    pub outbound_ip_addresses: String,
    pub outbound_ip_address_list: Vec<String>,
    pub possible_outbound_ip_addresses: String,
    pub possible_outbound_ip_address_list: Vec<String>,
    pub site_credential: Vec<SiteCredential>,
    pub tags: HashMap<String, String>,
}

impl WindowsWebAppModel {
    fn site_envelope(&self, site_config: SiteConfig) -> Site {
        Site {
            location: Some(self.location.clone()),
            tags: expand_tags(&self.tags),
            identity: expand_identity(&self.identity),
            properties: Some(SiteProperties {
                server_farm_id: Some(self.service_plan_id.clone()),
                enabled: Some(self.enabled),
                https_only: Some(self.https_only),
                site_config: Some(site_config),
                client_affinity_enabled: Some(self.client_affinity_enabled),
                client_cert_enabled: Some(self.client_cert_enabled),
                client_cert_mode: (!self.client_cert_mode.is_empty()).then(|| self.client_cert_mode.clone()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Settings groups written through their own endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubResource {
    AppSettings,
    ConnectionStrings,
    AuthSettings,
    Backup,
    Logs,
    StorageAccounts,
}

// App settings can clobber the logs configuration, so they always go before logs.
const CREATE_ORDER: [SubResource; 6] = [
    SubResource::AppSettings,
    SubResource::AuthSettings,
    SubResource::Logs,
    SubResource::Backup,
    SubResource::StorageAccounts,
    SubResource::ConnectionStrings,
];

const UPDATE_ORDER: [SubResource; 6] = [
    SubResource::AppSettings,
    SubResource::ConnectionStrings,
    SubResource::AuthSettings,
    SubResource::Backup,
    SubResource::Logs,
    SubResource::StorageAccounts,
];

impl SubResource {
    /// Argument whose change triggers the update
    fn key(self) -> &'static str {
        match self {
            Self::AppSettings => "app_settings",
            Self::ConnectionStrings => "connection_string",
            Self::AuthSettings => "auth_settings",
            Self::Backup => "backup",
            Self::Logs => "logs",
            Self::StorageAccounts => "storage_account",
        }
    }

    /// Write the configured group after the site exists; unset groups are skipped
    async fn create(self, client: &dyn WebAppsApi, id: &WebAppId, web_app: &WindowsWebAppModel) -> ProviderResult<()> {
        match self {
            Self::AppSettings => {
                if let Some(settings) = expand_app_settings(&web_app.app_settings) {
                    client
                        .update_application_settings(id, &settings)
                        .await
                        .map_err(api_failure(id, format!("setting App Settings for Windows {}", id)))?;
                }
            }
            Self::AuthSettings => {
                let auth = expand_auth_settings(&web_app.auth_settings);
                if auth.properties.is_some() {
                    client
                        .update_auth_settings(id, &auth)
                        .await
                        .map_err(api_failure(id, format!("setting Authorisation Settings for {}", id)))?;
                }
            }
            Self::Logs => {
                let logs = expand_logs_config(&web_app.logs);
                if logs.properties.is_some() {
                    client.update_diagnostic_logs_config(id, &logs).await.map_err(api_failure(
                        id,
                        format!("setting Diagnostic Logs Configuration for Windows {}", id),
                    ))?;
                }
            }
            Self::Backup => {
                let backup = expand_backup_config(&web_app.backup)?;
                if backup.properties.is_some() {
                    client
                        .update_backup_configuration(id, &backup)
                        .await
                        .map_err(api_failure(id, format!("adding Backup Settings for Windows {}", id)))?;
                }
            }
            Self::StorageAccounts => {
                if let Some(accounts) = expand_storage_config(&web_app.storage_account) {
                    client
                        .update_azure_storage_accounts(id, &accounts)
                        .await
                        .map_err(api_failure(id, format!("setting Storage Accounts for Windows {}", id)))?;
                }
            }
            Self::ConnectionStrings => {
                if let Some(connection_strings) = expand_connection_strings(&web_app.connection_string) {
                    client
                        .update_connection_strings(id, &connection_strings)
                        .await
                        .map_err(api_failure(id, format!("setting Connection Strings for Windows {}", id)))?;
                }
            }
        }
        Ok(())
    }

    /// Write the desired group; a removed group is cleared or disabled
    async fn update(self, client: &dyn WebAppsApi, id: &WebAppId, web_app: &WindowsWebAppModel) -> ProviderResult<()> {
        match self {
            Self::AppSettings => {
                let settings = expand_app_settings_or_empty(&web_app.app_settings);
                client
                    .update_application_settings(id, &settings)
                    .await
                    .map_err(api_failure(id, format!("updating App Settings for Windows {}", id)))?;
            }
            Self::ConnectionStrings => {
                let connection_strings = expand_connection_strings_or_empty(&web_app.connection_string);
                client
                    .update_connection_strings(id, &connection_strings)
                    .await
                    .map_err(api_failure(id, format!("updating Connection Strings for Windows {}", id)))?;
            }
            Self::AuthSettings => {
                let mut auth = expand_auth_settings(&web_app.auth_settings);
                if auth.properties.is_none() {
                    auth = disabled_auth_settings();
                }
                client
                    .update_auth_settings(id, &auth)
                    .await
                    .map_err(api_failure(id, format!("updating Auth Settings for Windows {}", id)))?;
            }
            Self::Backup => {
                let backup = expand_backup_config(&web_app.backup)?;
                if backup.properties.is_none() {
                    client
                        .delete_backup_configuration(id)
                        .await
                        .map_err(api_failure(id, format!("removing Backup Settings for Windows {}", id)))?;
                } else {
                    client
                        .update_backup_configuration(id, &backup)
                        .await
                        .map_err(api_failure(id, format!("updating Backup Settings for Windows {}", id)))?;
                }
            }
            Self::Logs => {
                let mut logs = expand_logs_config(&web_app.logs);
                if logs.properties.is_none() {
                    logs = disabled_logs_config();
                }
                client
                    .update_diagnostic_logs_config(id, &logs)
                    .await
                    .map_err(api_failure(id, format!("updating Logs Config for Windows {}", id)))?;
            }
            Self::StorageAccounts => {
                let accounts = expand_storage_config_or_empty(&web_app.storage_account);
                client
                    .update_azure_storage_accounts(id, &accounts)
                    .await
                    .map_err(api_failure(id, format!("updating Storage Accounts for Windows {}", id)))?;
            }
        }
        Ok(())
    }
}

/// Build the name check. Sites on an App Service Environment are checked by
/// FQDN; a failed ASE lookup only degrades the suffix.
async fn name_availability_request(
    clients: &Clients,
    name: &str,
    service_plan_id: &ServicePlanId,
) -> ProviderResult<ResourceNameAvailabilityRequest> {
    let plan = clients
        .service_plans
        .get(service_plan_id)
        .await
        .map_err(|e| ProviderError::new(format!("reading App {}", service_plan_id)).with_cause(e))?;

    let mut request = ResourceNameAvailabilityRequest {
        name: name.to_string(),
        resource_type: CHECK_NAME_RESOURCE_TYPE_SITES.to_string(),
        is_fqdn: None,
    };

    let Some(ase) = plan.properties.and_then(|p| p.hosting_environment_profile) else {
        return Ok(request);
    };

    let mut suffix = ASE_DNS_SUFFIX.to_string();
    if let Some(ase_id) = &ase.id {
        match AppServiceEnvironmentId::parse(ase_id) {
            Err(e) => {
                log::warn!(
                    "could not parse App Service Environment ID to determine FQDN for name availability check, defaulting to `{}.{}.{}`: {}",
                    name,
                    service_plan_id.server_farm_name,
                    suffix,
                    e
                );
            }
            Ok(ase_id) => {
                suffix = format!("{}.{}", ase_id.hosting_environment_name, ASE_DNS_SUFFIX);
                match clients.app_service_environments.get(&ase_id).await {
                    Err(e) => {
                        log::warn!(
                            "could not read App Service Environment to determine FQDN for name availability check, defaulting to `{}.{}.{}`: {}",
                            name,
                            service_plan_id.server_farm_name,
                            suffix,
                            e
                        );
                    }
                    Ok(existing) => {
                        if let Some(dns_suffix) = existing
                            .properties
                            .and_then(|p| p.dns_suffix)
                            .filter(|s| !s.is_empty())
                        {
                            suffix = dns_suffix;
                        }
                    }
                }
            }
        }
    }

    request.name = format!("{}.{}.{}", name, service_plan_id.server_farm_name, suffix);
    request.is_fqdn = Some(true);
    Ok(request)
}

/// Record the Windows stack in site metadata; the site config has no field for it
async fn write_current_stack(client: &dyn WebAppsApi, id: &WebAppId, current_stack: Option<&str>) -> ProviderResult<()> {
    let Some(stack) = current_stack.filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    let metadata = StringDictionary {
        properties: Some(HashMap::from([(CURRENT_STACK_KEY.to_string(), stack.to_string())])),
    };
    client.update_metadata(id, &metadata).await.map_err(api_failure(
        id,
        format!("setting Site Metadata for Current Stack on Windows {}", id),
    ))?;
    Ok(())
}

pub struct WindowsWebAppResource;

#[async_trait]
impl Resource<Clients> for WindowsWebAppResource {
    fn resource_type(&self) -> &'static str {
        "azurerm_windows_web_app"
    }

    fn arguments(&self) -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::new("name", web_app_name_type())
                .required()
                .force_new(),
            AttributeSchema::new("resource_group_name", AttributeType::String)
                .required()
                .force_new(),
            location_schema(),
            AttributeSchema::new("service_plan_id", service_plan_id_type()).required(),
            app_settings_schema(),
            auth_settings_schema(),
            backup_schema(),
            AttributeSchema::new("client_affinity_enabled", AttributeType::Bool)
                .optional()
                .with_default(Value::Bool(false)),
            AttributeSchema::new("client_cert_enabled", AttributeType::Bool)
                .optional()
                .with_default(Value::Bool(false)),
            AttributeSchema::new("client_cert_mode", one_of(&["Optional", "Required"]))
                .optional()
                .with_default(Value::String("Required".to_string())),
            connection_string_schema(),
            AttributeSchema::new("enabled", AttributeType::Bool)
                .optional()
                .with_default(Value::Bool(true)),
            AttributeSchema::new("https_only", AttributeType::Bool)
                .optional()
                .with_default(Value::Bool(false)),
            identity_schema(),
            logs_config_schema(),
            site_config_schema_windows(),
            storage_account_schema(),
            tags_schema(),
        ]
    }

    fn attributes(&self) -> Vec<AttributeSchema> {
        let string_list = || AttributeType::List(Box::new(AttributeType::String));
        vec![
            AttributeSchema::new("custom_domain_verification_id", AttributeType::String)
                .computed()
                .sensitive(),
            AttributeSchema::new("default_hostname", AttributeType::String).computed(),
            AttributeSchema::new("kind", AttributeType::String).computed(),
            AttributeSchema::new("outbound_ip_addresses", AttributeType::String).computed(),
            AttributeSchema::new("outbound_ip_address_list", string_list()).computed(),
            AttributeSchema::new("possible_outbound_ip_addresses", AttributeType::String).computed(),
            AttributeSchema::new("possible_outbound_ip_address_list", string_list()).computed(),
            site_credential_schema(),
        ]
    }

    fn validate_id(&self, id: &str) -> Result<(), String> {
        WebAppId::parse(id).map(|_| ()).map_err(|e| e.to_string())
    }

    async fn create(&self, metadata: &mut ResourceMetaData<Clients>) -> ProviderResult<()> {
        let web_app: WindowsWebAppModel = metadata.decode()?;
        let clients = metadata.client().clone();
        let client = Arc::clone(&clients.web_apps);

        let id = WebAppId::new(&clients.subscription_id, &web_app.resource_group_name, &web_app.name);

        match client.get(&id).await {
            Ok(_) => return Err(metadata.resource_requires_import(self.resource_type(), id.id())),
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                return Err(api_failure(
                    &id,
                    format!("checking for presence of existing Windows {}", id),
                )(e));
            }
        }

        let service_plan_id = ServicePlanId::parse(&web_app.service_plan_id)?;
        let request = name_availability_request(&clients, &web_app.name, &service_plan_id).await?;
        let availability = client
            .check_name_availability(&clients.subscription_id, &request)
            .await
            .map_err(api_failure(&id, format!("checking name availability for {}", id)))?;
        if !availability.name_available.unwrap_or_default() {
            return Err(ProviderError::invalid_argument(format!(
                "the Site Name {:?} failed the availability check: {}",
                id.site_name,
                availability.message.unwrap_or_default()
            ))
            .for_resource(id.id()));
        }

        let (site_config, current_stack) = expand_site_config_windows(&web_app.site_config)?;
        let site = web_app.site_envelope(site_config);

        let operation = client
            .create_or_update(&id, &site)
            .await
            .map_err(api_failure(&id, format!("creating Windows {}", id)))?;
        client
            .poll_until_done(operation)
            .await
            .map_err(api_failure(&id, format!("waiting for creation of Windows {}", id)))?;

        write_current_stack(client.as_ref(), &id, current_stack.as_deref()).await?;

        metadata.set_id(id.id());

        for sub_resource in CREATE_ORDER {
            sub_resource.create(client.as_ref(), &id, &web_app).await?;
        }

        Ok(())
    }

    async fn read(&self, metadata: &mut ResourceMetaData<Clients>) -> ProviderResult<()> {
        let id = WebAppId::parse(metadata.require_id()?)?;
        let client = Arc::clone(&metadata.client().web_apps);

        let site = match client.get(&id).await {
            Ok(site) => site,
            Err(e) if e.is_not_found() => return metadata.mark_as_gone(&id),
            Err(e) => return Err(api_failure(&id, format!("reading Windows {}", id))(e)),
        };

        let Some(props) = site.properties.as_ref() else {
            return Err(ProviderError::new(format!("reading properties of Windows {}", id)).for_resource(id.id()));
        };

        let details = SiteDetails::fetch(client.as_ref(), &id, "Windows").await?;

        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let outbound_ip_addresses = text(&props.outbound_ip_addresses);
        let possible_outbound_ip_addresses = text(&props.possible_outbound_ip_addresses);

        let state = WindowsWebAppModel {
            name: id.site_name.clone(),
            resource_group_name: id.resource_group.clone(),
            location: normalize_location(site.location.as_deref().unwrap_or_default()),
            service_plan_id: text(&props.server_farm_id),
            app_settings: flatten_app_settings(&details.app_settings),
            auth_settings: flatten_auth_settings(&details.auth),
            backup: flatten_backup_config(details.backup.as_ref()),
            client_affinity_enabled: props.client_affinity_enabled.unwrap_or_default(),
            client_cert_enabled: props.client_cert_enabled.unwrap_or_default(),
            client_cert_mode: text(&props.client_cert_mode),
            enabled: props.enabled.unwrap_or_default(),
            https_only: props.https_only.unwrap_or_default(),
            identity: flatten_identity(site.identity.as_ref()),
            logs: flatten_logs_config(&details.logs),
            site_config: flatten_site_config_windows(
                details.site_config.properties.as_ref(),
                details.metadata_value(CURRENT_STACK_KEY),
            ),
            storage_account: flatten_storage_accounts(&details.storage_accounts),
            connection_string: flatten_connection_strings(&details.connection_strings),
            custom_domain_verification_id: text(&props.custom_domain_verification_id),
            default_hostname: text(&props.default_host_name),
            kind: text(&site.kind),
            outbound_ip_address_list: split_addresses(&outbound_ip_addresses),
            outbound_ip_addresses,
            possible_outbound_ip_address_list: split_addresses(&possible_outbound_ip_addresses),
            possible_outbound_ip_addresses,
            site_credential: flatten_site_credentials(&details.credentials),
            tags: flatten_tags(site.tags.as_ref()),
        };

        metadata.encode(&state)
    }

    async fn update(&self, metadata: &mut ResourceMetaData<Clients>) -> ProviderResult<()> {
        let id = WebAppId::parse(metadata.require_id()?)?;
        let client = Arc::clone(&metadata.client().web_apps);

        // TODO: lock the service plan here once resources sharing it can be updated concurrently

        let web_app: WindowsWebAppModel = metadata.decode()?;

        let (site_config, current_stack) = expand_site_config_windows(&web_app.site_config).map_err(|e| ProviderError {
            message: format!("expanding Site Config for Windows {}: {}", id, e.message),
            ..e
        })?;
        let site = web_app.site_envelope(site_config);

        let operation = client
            .create_or_update(&id, &site)
            .await
            .map_err(api_failure(&id, format!("updating Windows {}", id)))?;
        client
            .poll_until_done(operation)
            .await
            .map_err(api_failure(&id, format!("waiting to update {}", id)))?;

        write_current_stack(client.as_ref(), &id, current_stack.as_deref()).await?;

        for sub_resource in UPDATE_ORDER {
            if metadata.has_change(sub_resource.key()) {
                log::debug!("updating {} for {}", sub_resource.key(), id);
                sub_resource.update(client.as_ref(), &id, &web_app).await?;
            }
        }

        Ok(())
    }

    async fn delete(&self, metadata: &mut ResourceMetaData<Clients>) -> ProviderResult<()> {
        let id = WebAppId::parse(metadata.require_id()?)?;
        let client = Arc::clone(&metadata.client().web_apps);

        log::info!("deleting {}", id);

        client
            .delete(&id, true, false)
            .await
            .map_err(api_failure(&id, format!("deleting Windows {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appservice_core::host::Lifecycle;
    use appservice_core::provider::ErrorKind;
    use appservice_core::resource::AttributeMap;

    use crate::testing::FakeArm;

    const PLAN_ID: &str = "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Web/serverfarms/plan1";

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    fn block(fields: Vec<(&str, Value)>) -> Value {
        Value::List(vec![Value::Map(
            fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        )])
    }

    fn config(extra: Vec<(&str, Value)>) -> AttributeMap {
        let mut config: AttributeMap = [
            ("name", s("app1")),
            ("resource_group_name", s("rg1")),
            ("location", s("West Europe")),
            ("service_plan_id", s(PLAN_ID)),
            ("site_config", block(vec![])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        for (k, v) in extra {
            config.insert(k.to_string(), v);
        }
        config
    }

    fn settings(pairs: &[(&str, &str)]) -> Value {
        Value::Map(pairs.iter().map(|(k, v)| (k.to_string(), s(v))).collect())
    }

    fn web_app_id() -> WebAppId {
        WebAppId::new("sub", "rg1", "app1")
    }

    fn fake() -> Arc<FakeArm> {
        let fake = Arc::new(FakeArm::default());
        fake.add_service_plan(&ServicePlanId::parse(PLAN_ID).unwrap(), None);
        fake
    }

    #[tokio::test]
    async fn create_then_read() {
        let fake = fake();
        let host = Lifecycle::new(Arc::new(fake.clients()));

        let state = host
            .create(
                &WindowsWebAppResource,
                config(vec![("app_settings", settings(&[("foo", "bar")]))]),
            )
            .await
            .unwrap();

        assert_eq!(state.id.as_deref(), Some(web_app_id().id().as_str()));
        assert_eq!(state.attributes.get("location"), Some(&s("westeurope")));
        assert_eq!(state.attributes.get("app_settings"), Some(&settings(&[("foo", "bar")])));
        assert_eq!(
            state.attributes.get("outbound_ip_address_list"),
            Some(&Value::List(vec![s("10.0.0.1"), s("10.0.0.2")]))
        );

        let checks = fake.name_checks();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].name, "app1");
        assert_eq!(checks[0].is_fqdn, None);
    }

    #[tokio::test]
    async fn create_of_existing_site_requires_import() {
        let fake = Arc::new(FakeArm::with_site(&web_app_id()));
        let host = Lifecycle::new(Arc::new(fake.clients()));

        let err = host
            .create(&WindowsWebAppResource, config(vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyExists);
        assert!(err.to_string().contains("azurerm_windows_web_app"));
        assert_eq!(fake.calls(), vec!["get"]);
    }

    #[tokio::test]
    async fn unavailable_name_fails_before_create() {
        let fake = fake();
        fake.set_name_unavailable("Hostname 'app1' already exists.");
        let host = Lifecycle::new(Arc::new(fake.clients()));

        let err = host
            .create(&WindowsWebAppResource, config(vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "the Site Name \"app1\" failed the availability check: Hostname 'app1' already exists."
        );
        assert!(!fake.calls().contains(&"create_or_update".to_string()));
    }

    #[tokio::test]
    async fn sites_on_an_environment_check_the_fqdn() {
        let fake = Arc::new(FakeArm::default());
        let ase_id = AppServiceEnvironmentId::new("sub", "rg1", "ase1");
        fake.add_service_plan(&ServicePlanId::parse(PLAN_ID).unwrap(), Some(ase_id.id()));
        fake.add_environment(&ase_id, Some("internal.contoso.com"));
        let host = Lifecycle::new(Arc::new(fake.clients()));

        host.create(&WindowsWebAppResource, config(vec![]))
            .await
            .unwrap();

        let checks = fake.name_checks();
        assert_eq!(checks[0].name, "app1.plan1.internal.contoso.com");
        assert_eq!(checks[0].is_fqdn, Some(true));
    }

    #[tokio::test]
    async fn unreadable_environment_falls_back_to_the_default_suffix() {
        let fake = Arc::new(FakeArm::default());
        let ase_id = AppServiceEnvironmentId::new("sub", "rg1", "ase1");
        fake.add_service_plan(&ServicePlanId::parse(PLAN_ID).unwrap(), Some(ase_id.id()));
        let host = Lifecycle::new(Arc::new(fake.clients()));

        host.create(&WindowsWebAppResource, config(vec![]))
            .await
            .unwrap();

        assert_eq!(fake.name_checks()[0].name, "app1.plan1.ase1.appserviceenvironment.net");
    }

    #[tokio::test]
    async fn unparseable_environment_id_uses_the_bare_suffix() {
        let fake = Arc::new(FakeArm::default());
        fake.add_service_plan(&ServicePlanId::parse(PLAN_ID).unwrap(), Some("not-an-id".to_string()));
        let host = Lifecycle::new(Arc::new(fake.clients()));

        host.create(&WindowsWebAppResource, config(vec![]))
            .await
            .unwrap();

        assert_eq!(fake.name_checks()[0].name, "app1.plan1.appserviceenvironment.net");
    }

    #[tokio::test]
    async fn current_stack_is_stored_as_metadata() {
        let fake = fake();
        let host = Lifecycle::new(Arc::new(fake.clients()));

        let state = host
            .create(
                &WindowsWebAppResource,
                config(vec![(
                    "site_config",
                    block(vec![(
                        "application_stack",
                        block(vec![("current_stack", s("node")), ("node_version", s("14.15.0"))]),
                    )]),
                )]),
            )
            .await
            .unwrap();

        let record = fake.site(&web_app_id()).unwrap();
        assert_eq!(
            record.metadata.properties.unwrap().get(CURRENT_STACK_KEY).map(String::as_str),
            Some("node")
        );
        let Some(Value::List(site_config)) = state.attributes.get("site_config") else {
            panic!("site_config missing");
        };
        let Value::Map(site_config) = &site_config[0] else {
            panic!("site_config is not a block");
        };
        let Some(Value::List(stack)) = site_config.get("application_stack") else {
            panic!("application_stack missing");
        };
        let Value::Map(stack) = &stack[0] else {
            panic!("application_stack is not a block");
        };
        assert_eq!(stack.get("current_stack"), Some(&s("node")));
    }

    #[tokio::test]
    async fn create_sends_app_settings_before_logs() {
        let fake = fake();
        let host = Lifecycle::new(Arc::new(fake.clients()));

        host.create(
            &WindowsWebAppResource,
            config(vec![
                ("app_settings", settings(&[("foo", "bar")])),
                (
                    "logs",
                    block(vec![("detailed_error_messages", Value::Bool(true))]),
                ),
            ]),
        )
        .await
        .unwrap();

        let calls = fake.calls();
        let position = |call: &str| calls.iter().position(|c| c == call).unwrap();
        assert!(position("create_or_update") < position("update_application_settings"));
        assert!(position("update_application_settings") < position("update_diagnostic_logs_config"));
    }

    #[tokio::test]
    async fn read_of_deleted_site_is_gone() {
        let fake = fake();
        let host = Lifecycle::new(Arc::new(fake.clients()));

        let state = host
            .read(&WindowsWebAppResource, &web_app_id().id())
            .await
            .unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn read_failure_is_wrapped() {
        let fake = Arc::new(FakeArm::with_site(&web_app_id()));
        fake.fail_on("get_auth_settings");
        let host = Lifecycle::new(Arc::new(fake.clients()));

        let err = host
            .read(&WindowsWebAppResource, &web_app_id().id())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteFailure);
        assert!(err.to_string().starts_with("reading Auth Settings for Windows Web App: (Site Name \"app1\""));
    }

    #[tokio::test]
    async fn update_only_touches_changed_groups() {
        let fake = fake();
        let host = Lifecycle::new(Arc::new(fake.clients()));
        let created = host
            .create(
                &WindowsWebAppResource,
                config(vec![("app_settings", settings(&[("foo", "bar")]))]),
            )
            .await
            .unwrap();
        fake.clear_calls();

        host.update(
            &WindowsWebAppResource,
            &web_app_id().id(),
            created.attributes,
            config(vec![("app_settings", settings(&[("foo", "baz")]))]),
        )
        .await
        .unwrap();

        let writes: Vec<String> = fake
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("update_") || c.starts_with("delete_"))
            .collect();
        assert_eq!(writes, vec!["update_application_settings"]);
        let record = fake.site(&web_app_id()).unwrap();
        assert_eq!(
            record.app_settings.properties.unwrap().get("foo").map(String::as_str),
            Some("baz")
        );
    }

    fn list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|v| s(v)).collect())
    }

    fn blocks(items: Vec<Vec<(&str, Value)>>) -> Value {
        Value::List(
            items
                .into_iter()
                .map(|fields| Value::Map(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect()))
                .collect(),
        )
    }

    fn every_settings_group() -> AttributeMap {
        let storage_account = |name: &str| {
            vec![
                ("name", s(name)),
                ("type", s("AzureFiles")),
                ("account_name", s("acctestsa")),
                ("share_name", s(name)),
                ("access_key", s("key")),
                ("mount_path", s(&format!("/mounts/{}", name))),
            ]
        };
        let connection_string = |name: &str| {
            vec![
                ("name", s(name)),
                ("type", s("PostgreSQL")),
                ("value", s(&format!("{}-connection-string", name))),
            ]
        };
        config(vec![
            ("app_settings", settings(&[("foo", "bar")])),
            (
                "auth_settings",
                block(vec![
                    ("enabled", Value::Bool(true)),
                    ("default_provider", s("AzureActiveDirectory")),
                    (
                        "active_directory",
                        block(vec![
                            ("client_id", s("aadclientid")),
                            ("client_secret", s("aadsecret")),
                            ("allowed_audiences", list(&["audience"])),
                        ]),
                    ),
                ]),
            ),
            (
                "logs",
                block(vec![
                    ("detailed_error_messages", Value::Bool(true)),
                    ("application_logs", block(vec![("file_system_level", s("Warning"))])),
                    (
                        "http_logs",
                        block(vec![(
                            "file_system",
                            block(vec![
                                ("retention_in_days", Value::Int(30)),
                                ("retention_in_mb", Value::Int(35)),
                            ]),
                        )]),
                    ),
                ]),
            ),
            (
                "backup",
                block(vec![
                    ("name", s("daily")),
                    (
                        "storage_account_url",
                        s("https://account.blob.core.windows.net/backups?sv=2018-11-09&sig=x"),
                    ),
                    (
                        "schedule",
                        block(vec![
                            ("frequency_interval", Value::Int(1)),
                            ("frequency_unit", s("Day")),
                            ("start_time", s("2030-01-01T10:00:00+02:00")),
                        ]),
                    ),
                ]),
            ),
            (
                "storage_account",
                blocks(vec![storage_account("b"), storage_account("a")]),
            ),
            (
                "connection_string",
                blocks(vec![connection_string("b"), connection_string("a")]),
            ),
            (
                "identity",
                block(vec![
                    ("type", s("UserAssigned")),
                    ("identity_ids", list(&["/identities/b", "/identities/a"])),
                ]),
            ),
            (
                "site_config",
                block(vec![
                    (
                        "cors",
                        block(vec![("allowed_origins", list(&["https://b.example.com", "https://a.example.com"]))]),
                    ),
                    (
                        "ip_restriction",
                        blocks(vec![
                            vec![("ip_address", s("10.10.10.10/32")), ("name", s("office"))],
                            vec![("service_tag", s("AzureFrontDoor.Backend")), ("priority", Value::Int(100))],
                        ]),
                    ),
                ]),
            ),
        ])
    }

    #[tokio::test]
    async fn unchanged_config_writes_nothing() {
        let fake = fake();
        let host = Lifecycle::new(Arc::new(fake.clients()));
        let created = host
            .create(&WindowsWebAppResource, every_settings_group())
            .await
            .unwrap();
        fake.clear_calls();

        let updated = host
            .update(
                &WindowsWebAppResource,
                &web_app_id().id(),
                created.attributes,
                every_settings_group(),
            )
            .await
            .unwrap();

        let writes: Vec<String> = fake
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("update_") || c.starts_with("delete_"))
            .collect();
        assert!(writes.is_empty(), "writes on unchanged config: {:?}", writes);

        let schema = WindowsWebAppResource.schema();
        let mut desired = every_settings_group();
        schema.apply_defaults(&mut desired);
        assert_eq!(
            schema.comparable_arguments(&updated.attributes),
            schema.comparable_arguments(&desired)
        );
    }

    #[tokio::test]
    async fn removed_app_settings_are_dropped() {
        let fake = fake();
        let host = Lifecycle::new(Arc::new(fake.clients()));
        let created = host
            .create(
                &WindowsWebAppResource,
                config(vec![("app_settings", settings(&[("foo", "bar"), ("keep", "me")]))]),
            )
            .await
            .unwrap();

        let updated = host
            .update(
                &WindowsWebAppResource,
                &web_app_id().id(),
                created.attributes,
                config(vec![("app_settings", settings(&[("keep", "me")]))]),
            )
            .await
            .unwrap();

        assert_eq!(updated.attributes.get("app_settings"), Some(&settings(&[("keep", "me")])));
    }

    #[tokio::test]
    async fn removing_backup_deletes_it() {
        let fake = fake();
        let host = Lifecycle::new(Arc::new(fake.clients()));
        let backup = block(vec![
            ("name", s("daily")),
            (
                "storage_account_url",
                s("https://account.blob.core.windows.net/backups?sv=2018-11-09&sig=x"),
            ),
            (
                "schedule",
                block(vec![
                    ("frequency_interval", Value::Int(1)),
                    ("frequency_unit", s("Day")),
                ]),
            ),
        ]);
        let created = host
            .create(&WindowsWebAppResource, config(vec![("backup", backup)]))
            .await
            .unwrap();
        assert!(fake.site(&web_app_id()).unwrap().backup.is_some());
        fake.clear_calls();

        host.update(
            &WindowsWebAppResource,
            &web_app_id().id(),
            created.attributes,
            config(vec![]),
        )
        .await
        .unwrap();

        assert!(fake.calls().contains(&"delete_backup_configuration".to_string()));
        assert!(fake.site(&web_app_id()).unwrap().backup.is_none());
    }

    #[tokio::test]
    async fn update_order_puts_app_settings_before_logs() {
        let position = |s: SubResource| UPDATE_ORDER.iter().position(|o| *o == s).unwrap();
        assert!(position(SubResource::AppSettings) < position(SubResource::Logs));
        let position = |s: SubResource| CREATE_ORDER.iter().position(|o| *o == s).unwrap();
        assert!(position(SubResource::AppSettings) < position(SubResource::Logs));
    }

    #[tokio::test]
    async fn delete_keeps_the_service_plan() {
        let fake = Arc::new(FakeArm::with_site(&web_app_id()));
        let host = Lifecycle::new(Arc::new(fake.clients()));

        host.delete(&WindowsWebAppResource, &web_app_id().id())
            .await
            .unwrap();

        assert_eq!(fake.deletes(), vec![(web_app_id().id(), true, false)]);
        assert!(fake.site(&web_app_id()).is_none());
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let host = Lifecycle::new(Arc::new(fake().clients()));
        let err = host
            .read(&WindowsWebAppResource, "/subscriptions/sub/resourceGroups/rg1")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
