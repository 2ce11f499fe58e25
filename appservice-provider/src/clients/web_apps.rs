//! Microsoft.Web/sites operations

use async_trait::async_trait;
use reqwest::Method;

use super::arm::{ApiError, ArmClient};
use super::lro::LongRunningOperation;
use crate::models::web::{
    API_VERSION, AzureStoragePropertyDictionary, BackupRequest, ConnectionStringDictionary,
    ResourceNameAvailability, ResourceNameAvailabilityRequest, Site, SiteAuthSettings,
    SiteConfigResource, SiteLogsConfig, StringDictionary,
};
use crate::parse::WebAppId;

#[async_trait]
pub trait WebAppsApi: Send + Sync {
    async fn get(&self, id: &WebAppId) -> Result<Site, ApiError>;

    /// Starts the create or update; poll the result with `poll_until_done`
    async fn create_or_update(&self, id: &WebAppId, site: &Site) -> Result<LongRunningOperation, ApiError>;

    async fn delete(
        &self,
        id: &WebAppId,
        delete_metrics: bool,
        delete_empty_server_farm: bool,
    ) -> Result<(), ApiError>;

    async fn check_name_availability(
        &self,
        subscription_id: &str,
        request: &ResourceNameAvailabilityRequest,
    ) -> Result<ResourceNameAvailability, ApiError>;

    async fn get_configuration(&self, id: &WebAppId) -> Result<SiteConfigResource, ApiError>;

    async fn get_auth_settings(&self, id: &WebAppId) -> Result<SiteAuthSettings, ApiError>;

    async fn update_auth_settings(
        &self,
        id: &WebAppId,
        settings: &SiteAuthSettings,
    ) -> Result<SiteAuthSettings, ApiError>;

    async fn get_backup_configuration(&self, id: &WebAppId) -> Result<BackupRequest, ApiError>;

    async fn update_backup_configuration(
        &self,
        id: &WebAppId,
        backup: &BackupRequest,
    ) -> Result<BackupRequest, ApiError>;

    async fn delete_backup_configuration(&self, id: &WebAppId) -> Result<(), ApiError>;

    async fn get_diagnostic_logs_configuration(&self, id: &WebAppId) -> Result<SiteLogsConfig, ApiError>;

    async fn update_diagnostic_logs_config(
        &self,
        id: &WebAppId,
        logs: &SiteLogsConfig,
    ) -> Result<SiteLogsConfig, ApiError>;

    async fn list_application_settings(&self, id: &WebAppId) -> Result<StringDictionary, ApiError>;

    async fn update_application_settings(
        &self,
        id: &WebAppId,
        settings: &StringDictionary,
    ) -> Result<StringDictionary, ApiError>;

    async fn list_azure_storage_accounts(&self, id: &WebAppId) -> Result<AzureStoragePropertyDictionary, ApiError>;

    async fn update_azure_storage_accounts(
        &self,
        id: &WebAppId,
        accounts: &AzureStoragePropertyDictionary,
    ) -> Result<AzureStoragePropertyDictionary, ApiError>;

    async fn list_connection_strings(&self, id: &WebAppId) -> Result<ConnectionStringDictionary, ApiError>;

    async fn update_connection_strings(
        &self,
        id: &WebAppId,
        connection_strings: &ConnectionStringDictionary,
    ) -> Result<ConnectionStringDictionary, ApiError>;

    /// Starts listing the publishing credentials; the result arrives through `poll_until_done`
    async fn list_publishing_credentials(&self, id: &WebAppId) -> Result<LongRunningOperation, ApiError>;

    async fn list_metadata(&self, id: &WebAppId) -> Result<StringDictionary, ApiError>;

    async fn update_metadata(
        &self,
        id: &WebAppId,
        metadata: &StringDictionary,
    ) -> Result<StringDictionary, ApiError>;

    async fn poll_until_done(&self, operation: LongRunningOperation) -> Result<serde_json::Value, ApiError>;
}

fn sub_path(id: &WebAppId, suffix: &str) -> String {
    format!("{}/{}", id.id(), suffix)
}

#[async_trait]
impl WebAppsApi for ArmClient {
    async fn get(&self, id: &WebAppId) -> Result<Site, ApiError> {
        ArmClient::get(self, &id.id(), API_VERSION).await
    }

    async fn create_or_update(&self, id: &WebAppId, site: &Site) -> Result<LongRunningOperation, ApiError> {
        let body = serde_json::to_value(site)?;
        self.begin(Method::PUT, &id.id(), API_VERSION, Some(body), true)
            .await
    }

    async fn delete(
        &self,
        id: &WebAppId,
        delete_metrics: bool,
        delete_empty_server_farm: bool,
    ) -> Result<(), ApiError> {
        let delete_metrics = delete_metrics.to_string();
        let delete_empty_server_farm = delete_empty_server_farm.to_string();
        ArmClient::delete(
            self,
            &id.id(),
            API_VERSION,
            &[
                ("deleteMetrics", delete_metrics.as_str()),
                ("deleteEmptyServerFarm", delete_empty_server_farm.as_str()),
            ],
        )
        .await
    }

    async fn check_name_availability(
        &self,
        subscription_id: &str,
        request: &ResourceNameAvailabilityRequest,
    ) -> Result<ResourceNameAvailability, ApiError> {
        let path = format!(
            "/subscriptions/{}/providers/Microsoft.Web/checknameavailability",
            subscription_id
        );
        self.post(&path, API_VERSION, Some(request)).await
    }

    async fn get_configuration(&self, id: &WebAppId) -> Result<SiteConfigResource, ApiError> {
        ArmClient::get(self, &sub_path(id, "config/web"), API_VERSION).await
    }

    async fn get_auth_settings(&self, id: &WebAppId) -> Result<SiteAuthSettings, ApiError> {
        self.post::<(), _>(&sub_path(id, "config/authsettings/list"), API_VERSION, None)
            .await
    }

    async fn update_auth_settings(
        &self,
        id: &WebAppId,
        settings: &SiteAuthSettings,
    ) -> Result<SiteAuthSettings, ApiError> {
        self.put(&sub_path(id, "config/authsettings"), API_VERSION, settings)
            .await
    }

    async fn get_backup_configuration(&self, id: &WebAppId) -> Result<BackupRequest, ApiError> {
        self.post::<(), _>(&sub_path(id, "config/backup/list"), API_VERSION, None)
            .await
    }

    async fn update_backup_configuration(
        &self,
        id: &WebAppId,
        backup: &BackupRequest,
    ) -> Result<BackupRequest, ApiError> {
        self.put(&sub_path(id, "config/backup"), API_VERSION, backup)
            .await
    }

    async fn delete_backup_configuration(&self, id: &WebAppId) -> Result<(), ApiError> {
        ArmClient::delete(self, &sub_path(id, "config/backup"), API_VERSION, &[]).await
    }

    async fn get_diagnostic_logs_configuration(&self, id: &WebAppId) -> Result<SiteLogsConfig, ApiError> {
        ArmClient::get(self, &sub_path(id, "config/logs"), API_VERSION).await
    }

    async fn update_diagnostic_logs_config(
        &self,
        id: &WebAppId,
        logs: &SiteLogsConfig,
    ) -> Result<SiteLogsConfig, ApiError> {
        self.put(&sub_path(id, "config/logs"), API_VERSION, logs)
            .await
    }

    async fn list_application_settings(&self, id: &WebAppId) -> Result<StringDictionary, ApiError> {
        self.post::<(), _>(&sub_path(id, "config/appsettings/list"), API_VERSION, None)
            .await
    }

    async fn update_application_settings(
        &self,
        id: &WebAppId,
        settings: &StringDictionary,
    ) -> Result<StringDictionary, ApiError> {
        self.put(&sub_path(id, "config/appsettings"), API_VERSION, settings)
            .await
    }

    async fn list_azure_storage_accounts(&self, id: &WebAppId) -> Result<AzureStoragePropertyDictionary, ApiError> {
        self.post::<(), _>(
            &sub_path(id, "config/azurestorageaccounts/list"),
            API_VERSION,
            None,
        )
        .await
    }

    async fn update_azure_storage_accounts(
        &self,
        id: &WebAppId,
        accounts: &AzureStoragePropertyDictionary,
    ) -> Result<AzureStoragePropertyDictionary, ApiError> {
        self.put(
            &sub_path(id, "config/azurestorageaccounts"),
            API_VERSION,
            accounts,
        )
        .await
    }

    async fn list_connection_strings(&self, id: &WebAppId) -> Result<ConnectionStringDictionary, ApiError> {
        self.post::<(), _>(
            &sub_path(id, "config/connectionstrings/list"),
            API_VERSION,
            None,
        )
        .await
    }

    async fn update_connection_strings(
        &self,
        id: &WebAppId,
        connection_strings: &ConnectionStringDictionary,
    ) -> Result<ConnectionStringDictionary, ApiError> {
        self.put(
            &sub_path(id, "config/connectionstrings"),
            API_VERSION,
            connection_strings,
        )
        .await
    }

    async fn list_publishing_credentials(&self, id: &WebAppId) -> Result<LongRunningOperation, ApiError> {
        self.begin(
            Method::POST,
            &sub_path(id, "config/publishingcredentials/list"),
            API_VERSION,
            None,
            false,
        )
        .await
    }

    async fn list_metadata(&self, id: &WebAppId) -> Result<StringDictionary, ApiError> {
        self.post::<(), _>(&sub_path(id, "config/metadata/list"), API_VERSION, None)
            .await
    }

    async fn update_metadata(
        &self,
        id: &WebAppId,
        metadata: &StringDictionary,
    ) -> Result<StringDictionary, ApiError> {
        self.put(&sub_path(id, "config/metadata"), API_VERSION, metadata)
            .await
    }

    async fn poll_until_done(&self, operation: LongRunningOperation) -> Result<serde_json::Value, ApiError> {
        ArmClient::poll_until_done(self, operation).await
    }
}
