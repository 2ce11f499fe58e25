//! In-memory resource manager used by the driver tests
//!
//! Every API call is recorded by method name so tests can assert which
//! endpoints were hit and in what order.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::clients::{
    ApiError, AppServiceEnvironmentsApi, Clients, EdgeModulesApi, LongRunningOperation, ServicePlansApi, WebAppsApi,
};
use crate::models::video_analyzer::EdgeModuleEntity;
use crate::models::web::{
    AppServiceEnvironment, AppServiceEnvironmentResource, AppServicePlan, AppServicePlanProperties,
    AzureStoragePropertyDictionary, BackupRequest, ConnectionStringDictionary, HostingEnvironmentProfile,
    ResourceNameAvailability, ResourceNameAvailabilityRequest, Site, SiteAuthSettings, SiteConfig,
    SiteConfigResource, SiteLogsConfig, StringDictionary, User, UserProperties,
};
use crate::parse::{AppServiceEnvironmentId, EdgeModuleId, ServicePlanId, WebAppId};

pub const SUBSCRIPTION_ID: &str = "sub";

/// Everything stored for one site
#[derive(Debug, Clone, Default)]
pub struct SiteRecord {
    pub site: Site,
    pub config: SiteConfig,
    pub auth: SiteAuthSettings,
    pub backup: Option<BackupRequest>,
    pub logs: SiteLogsConfig,
    pub app_settings: StringDictionary,
    pub storage_accounts: AzureStoragePropertyDictionary,
    pub connection_strings: ConnectionStringDictionary,
    pub metadata: StringDictionary,
}

impl SiteRecord {
    /// A site as the platform reports it right after creation
    pub fn new(id: &WebAppId, mut site: Site) -> Self {
        let mut props = site.properties.take().unwrap_or_default();
        let config = props.site_config.take().unwrap_or_default();
        props.default_host_name = Some(format!("{}.azurewebsites.net", id.site_name));
        props.custom_domain_verification_id = Some("7F2A9C".to_string());
        props.outbound_ip_addresses = Some("10.0.0.1,10.0.0.2".to_string());
        props.possible_outbound_ip_addresses = Some("10.0.0.1,10.0.0.2,10.0.0.3".to_string());
        props.enabled.get_or_insert(true);
        if props.server_farm_id.is_none() {
            props.server_farm_id = Some(format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/serverfarms/plan1",
                id.subscription_id, id.resource_group
            ));
        }

        site.id = Some(id.id());
        site.name = Some(id.site_name.clone());
        site.kind.get_or_insert_with(|| "app".to_string());
        site.location.get_or_insert_with(|| "West Europe".to_string());
        site.properties = Some(props);

        Self {
            site,
            config,
            ..Default::default()
        }
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    failing: HashSet<String>,
    sites: HashMap<String, SiteRecord>,
    service_plans: HashMap<String, AppServicePlan>,
    environments: HashMap<String, AppServiceEnvironmentResource>,
    name_checks: Vec<ResourceNameAvailabilityRequest>,
    unavailable_reason: Option<String>,
    deletes: Vec<(String, bool, bool)>,
}

#[derive(Default)]
pub struct FakeArm {
    state: Mutex<FakeState>,
}

fn not_found(what: &str) -> ApiError {
    ApiError::not_found(format!("{} was not found", what))
}

impl FakeArm {
    pub fn with_site(id: &WebAppId) -> Self {
        let fake = Self::default();
        fake.insert_site(id, SiteRecord::new(id, Site::default()));
        fake
    }

    /// Client bundle backed by this fake
    pub fn clients(self: &Arc<Self>) -> Clients {
        Clients {
            subscription_id: SUBSCRIPTION_ID.to_string(),
            web_apps: self.clone(),
            service_plans: self.clone(),
            app_service_environments: self.clone(),
            edge_modules: self.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Log the call and fail it if requested
    fn record(&self, call: &str) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.lock();
        state.calls.push(call.to_string());
        if state.failing.contains(call) {
            return Err(ApiError::Status {
                status: 500,
                code: "InternalServerError".to_string(),
                message: format!("{} failed", call),
            });
        }
        Ok(state)
    }

    fn with_record<T>(
        &self,
        call: &str,
        id: &WebAppId,
        f: impl FnOnce(&mut SiteRecord) -> T,
    ) -> Result<T, ApiError> {
        let mut state = self.record(call)?;
        state
            .sites
            .get_mut(&id.id())
            .map(f)
            .ok_or_else(|| not_found(&id.to_string()))
    }

    pub fn insert_site(&self, id: &WebAppId, record: SiteRecord) {
        self.lock().sites.insert(id.id(), record);
    }

    pub fn site(&self, id: &WebAppId) -> Option<SiteRecord> {
        self.lock().sites.get(&id.id()).cloned()
    }

    pub fn add_service_plan(&self, id: &ServicePlanId, environment_id: Option<String>) {
        let plan = AppServicePlan {
            id: Some(id.id()),
            name: Some(id.server_farm_name.clone()),
            properties: Some(AppServicePlanProperties {
                hosting_environment_profile: environment_id.map(|ase| HostingEnvironmentProfile {
                    id: Some(ase),
                    name: None,
                }),
            }),
        };
        self.lock().service_plans.insert(id.id(), plan);
    }

    pub fn add_environment(&self, id: &AppServiceEnvironmentId, dns_suffix: Option<&str>) {
        let environment = AppServiceEnvironmentResource {
            id: Some(id.id()),
            name: Some(id.hosting_environment_name.clone()),
            properties: Some(AppServiceEnvironment {
                dns_suffix: dns_suffix.map(str::to_string),
            }),
        };
        self.lock().environments.insert(id.id(), environment);
    }

    pub fn set_name_unavailable(&self, message: &str) {
        self.lock().unavailable_reason = Some(message.to_string());
    }

    /// Make every call to `method` fail with a 500
    pub fn fail_on(&self, method: &str) {
        self.lock().failing.insert(method.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn name_checks(&self) -> Vec<ResourceNameAvailabilityRequest> {
        self.lock().name_checks.clone()
    }

    /// `(id, delete_metrics, delete_empty_server_farm)` per site delete
    pub fn deletes(&self) -> Vec<(String, bool, bool)> {
        self.lock().deletes.clone()
    }
}

#[async_trait]
impl WebAppsApi for FakeArm {
    async fn get(&self, id: &WebAppId) -> Result<Site, ApiError> {
        self.with_record("get", id, |r| r.site.clone())
    }

    async fn create_or_update(&self, id: &WebAppId, site: &Site) -> Result<LongRunningOperation, ApiError> {
        let mut state = self.record("create_or_update")?;
        let existing = state.sites.remove(&id.id());
        let mut record = SiteRecord::new(id, site.clone());
        if let Some(existing) = existing {
            record = SiteRecord {
                site: record.site,
                config: record.config,
                ..existing
            };
        }
        let body = serde_json::to_value(&record.site)?;
        state.sites.insert(id.id(), record);
        Ok(LongRunningOperation::Done(body))
    }

    async fn delete(&self, id: &WebAppId, delete_metrics: bool, delete_empty_server_farm: bool) -> Result<(), ApiError> {
        let mut state = self.record("delete")?;
        state
            .sites
            .remove(&id.id())
            .ok_or_else(|| not_found(&id.to_string()))?;
        state
            .deletes
            .push((id.id(), delete_metrics, delete_empty_server_farm));
        Ok(())
    }

    async fn check_name_availability(
        &self,
        _subscription_id: &str,
        request: &ResourceNameAvailabilityRequest,
    ) -> Result<ResourceNameAvailability, ApiError> {
        let mut state = self.record("check_name_availability")?;
        state.name_checks.push(request.clone());
        Ok(match &state.unavailable_reason {
            Some(message) => ResourceNameAvailability {
                name_available: Some(false),
                reason: Some("AlreadyExists".to_string()),
                message: Some(message.clone()),
            },
            None => ResourceNameAvailability {
                name_available: Some(true),
                ..Default::default()
            },
        })
    }

    async fn get_configuration(&self, id: &WebAppId) -> Result<SiteConfigResource, ApiError> {
        self.with_record("get_configuration", id, |r| SiteConfigResource {
            properties: Some(r.config.clone()),
        })
    }

    async fn get_auth_settings(&self, id: &WebAppId) -> Result<SiteAuthSettings, ApiError> {
        self.with_record("get_auth_settings", id, |r| r.auth.clone())
    }

    async fn update_auth_settings(&self, id: &WebAppId, settings: &SiteAuthSettings) -> Result<SiteAuthSettings, ApiError> {
        self.with_record("update_auth_settings", id, |r| {
            r.auth = settings.clone();
            r.auth.clone()
        })
    }

    async fn get_backup_configuration(&self, id: &WebAppId) -> Result<BackupRequest, ApiError> {
        self.with_record("get_backup_configuration", id, |r| r.backup.clone())?
            .ok_or_else(|| not_found("backup configuration"))
    }

    async fn update_backup_configuration(&self, id: &WebAppId, backup: &BackupRequest) -> Result<BackupRequest, ApiError> {
        self.with_record("update_backup_configuration", id, |r| {
            r.backup = Some(backup.clone());
            backup.clone()
        })
    }

    async fn delete_backup_configuration(&self, id: &WebAppId) -> Result<(), ApiError> {
        self.with_record("delete_backup_configuration", id, |r| r.backup = None)
    }

    async fn get_diagnostic_logs_configuration(&self, id: &WebAppId) -> Result<SiteLogsConfig, ApiError> {
        self.with_record("get_diagnostic_logs_configuration", id, |r| r.logs.clone())
    }

    async fn update_diagnostic_logs_config(&self, id: &WebAppId, logs: &SiteLogsConfig) -> Result<SiteLogsConfig, ApiError> {
        self.with_record("update_diagnostic_logs_config", id, |r| {
            r.logs = logs.clone();
            r.logs.clone()
        })
    }

    async fn list_application_settings(&self, id: &WebAppId) -> Result<StringDictionary, ApiError> {
        self.with_record("list_application_settings", id, |r| r.app_settings.clone())
    }

    async fn update_application_settings(
        &self,
        id: &WebAppId,
        settings: &StringDictionary,
    ) -> Result<StringDictionary, ApiError> {
        self.with_record("update_application_settings", id, |r| {
            r.app_settings = settings.clone();
            r.app_settings.clone()
        })
    }

    async fn list_azure_storage_accounts(&self, id: &WebAppId) -> Result<AzureStoragePropertyDictionary, ApiError> {
        self.with_record("list_azure_storage_accounts", id, |r| r.storage_accounts.clone())
    }

    async fn update_azure_storage_accounts(
        &self,
        id: &WebAppId,
        accounts: &AzureStoragePropertyDictionary,
    ) -> Result<AzureStoragePropertyDictionary, ApiError> {
        self.with_record("update_azure_storage_accounts", id, |r| {
            r.storage_accounts = accounts.clone();
            r.storage_accounts.clone()
        })
    }

    async fn list_connection_strings(&self, id: &WebAppId) -> Result<ConnectionStringDictionary, ApiError> {
        self.with_record("list_connection_strings", id, |r| r.connection_strings.clone())
    }

    async fn update_connection_strings(
        &self,
        id: &WebAppId,
        connection_strings: &ConnectionStringDictionary,
    ) -> Result<ConnectionStringDictionary, ApiError> {
        self.with_record("update_connection_strings", id, |r| {
            r.connection_strings = connection_strings.clone();
            r.connection_strings.clone()
        })
    }

    async fn list_publishing_credentials(&self, id: &WebAppId) -> Result<LongRunningOperation, ApiError> {
        let user = self.with_record("list_publishing_credentials", id, |_| User {
            properties: Some(UserProperties {
                publishing_user_name: Some(format!("${}", id.site_name)),
                publishing_password: Some("publishing-secret".to_string()),
            }),
        })?;
        Ok(LongRunningOperation::Done(serde_json::to_value(user)?))
    }

    async fn list_metadata(&self, id: &WebAppId) -> Result<StringDictionary, ApiError> {
        self.with_record("list_metadata", id, |r| r.metadata.clone())
    }

    async fn update_metadata(&self, id: &WebAppId, metadata: &StringDictionary) -> Result<StringDictionary, ApiError> {
        self.with_record("update_metadata", id, |r| {
            r.metadata = metadata.clone();
            r.metadata.clone()
        })
    }

    async fn poll_until_done(&self, operation: LongRunningOperation) -> Result<serde_json::Value, ApiError> {
        self.record("poll_until_done")?;
        match operation {
            LongRunningOperation::Done(body) => Ok(body),
            LongRunningOperation::Pending(pending) => Err(ApiError::OperationFailed {
                status: "Unsupported".to_string(),
                message: format!("the fake cannot poll {}", pending.poll_url),
            }),
        }
    }
}

#[async_trait]
impl ServicePlansApi for FakeArm {
    async fn get(&self, id: &ServicePlanId) -> Result<AppServicePlan, ApiError> {
        let state = self.record("service_plans.get")?;
        state
            .service_plans
            .get(&id.id())
            .cloned()
            .ok_or_else(|| not_found(&id.to_string()))
    }
}

#[async_trait]
impl AppServiceEnvironmentsApi for FakeArm {
    async fn get(&self, id: &AppServiceEnvironmentId) -> Result<AppServiceEnvironmentResource, ApiError> {
        let state = self.record("app_service_environments.get")?;
        state
            .environments
            .get(&id.id())
            .cloned()
            .ok_or_else(|| not_found(&id.to_string()))
    }
}

#[async_trait]
impl EdgeModulesApi for FakeArm {
    async fn get(&self, id: &EdgeModuleId) -> Result<EdgeModuleEntity, ApiError> {
        self.record("edge_modules.get")?;
        Err(not_found(&id.to_string()))
    }
}

