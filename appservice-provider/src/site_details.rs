//! Auxiliary reads shared by the web app resource and data source
//!
//! The site `GET` never carries the site config or any of the separately
//! managed settings groups, so every read fans out to the config endpoints
//! one after another.

use appservice_core::provider::ProviderError;

use crate::clients::{ApiError, WebAppsApi};
use crate::models::web::{
    AzureStoragePropertyDictionary, BackupRequest, ConnectionStringDictionary, SiteAuthSettings,
    SiteConfigResource, SiteLogsConfig, StringDictionary, User,
};
use crate::parse::WebAppId;

/// Wrap an API failure as "<message>: <cause>" against the site ID
pub(crate) fn api_failure(id: &WebAppId, message: String) -> impl FnOnce(ApiError) -> ProviderError {
    let resource_id = id.id();
    move |e| ProviderError::new(message).for_resource(resource_id).with_cause(e)
}

pub(crate) struct SiteDetails {
    pub site_config: SiteConfigResource,
    pub auth: SiteAuthSettings,
    /// `None` when no backup has ever been configured
    pub backup: Option<BackupRequest>,
    pub logs: SiteLogsConfig,
    pub app_settings: StringDictionary,
    pub storage_accounts: AzureStoragePropertyDictionary,
    pub connection_strings: ConnectionStringDictionary,
    pub credentials: User,
    pub metadata: StringDictionary,
}

impl SiteDetails {
    /// `os` is "Windows" or "Linux" and only affects error messages
    pub(crate) async fn fetch(client: &dyn WebAppsApi, id: &WebAppId, os: &str) -> Result<Self, ProviderError> {
        let site_config = client
            .get_configuration(id)
            .await
            .map_err(api_failure(id, format!("reading Site Config for {} {}", os, id)))?;

        let auth = client
            .get_auth_settings(id)
            .await
            .map_err(api_failure(id, format!("reading Auth Settings for {} {}", os, id)))?;

        let backup = match client.get_backup_configuration(id).await {
            Ok(backup) => Some(backup),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                return Err(api_failure(id, format!("reading Backup Settings for {} {}", os, id))(e));
            }
        };

        let logs = client
            .get_diagnostic_logs_configuration(id)
            .await
            .map_err(api_failure(
                id,
                format!("reading Diagnostic Logs information for {} {}", os, id),
            ))?;

        let app_settings = client
            .list_application_settings(id)
            .await
            .map_err(api_failure(id, format!("reading App Settings for {} {}", os, id)))?;

        let storage_accounts = client
            .list_azure_storage_accounts(id)
            .await
            .map_err(api_failure(
                id,
                format!("reading Storage Account information for {} {}", os, id),
            ))?;

        let connection_strings = client
            .list_connection_strings(id)
            .await
            .map_err(api_failure(
                id,
                format!("reading Connection String information for {} {}", os, id),
            ))?;

        let operation = client.list_publishing_credentials(id).await.map_err(api_failure(
            id,
            format!("listing Site Publishing Credential information for {} {}", os, id),
        ))?;
        let body = client.poll_until_done(operation).await.map_err(api_failure(
            id,
            format!("waiting for Site Publishing Credential information for {} {}", os, id),
        ))?;
        let credentials: User = serde_json::from_value(body).map_err(|e| {
            ProviderError::decode(format!(
                "reading Site Publishing Credential information for {} {}",
                os, id
            ))
            .for_resource(id.id())
            .with_cause(e)
        })?;

        let metadata = client
            .list_metadata(id)
            .await
            .map_err(api_failure(id, format!("reading Site Metadata for {} {}", os, id)))?;

        Ok(Self {
            site_config,
            auth,
            backup,
            logs,
            app_settings,
            storage_accounts,
            connection_strings,
            credentials,
            metadata,
        })
    }

    /// Value of a site metadata key, empty when unset
    pub(crate) fn metadata_value(&self, key: &str) -> &str {
        self.metadata
            .properties
            .as_ref()
            .and_then(|p| p.get(key))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Split a comma separated address list; an empty string has no addresses
pub(crate) fn split_addresses(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    input.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeArm;

    fn id() -> WebAppId {
        WebAppId::new("sub", "rg1", "app1")
    }

    #[tokio::test]
    async fn missing_backup_is_tolerated() {
        let fake = FakeArm::with_site(&id());
        let details = SiteDetails::fetch(&fake, &id(), "Windows").await.unwrap();
        assert!(details.backup.is_none());
        assert_eq!(details.credentials.properties.unwrap().publishing_user_name.as_deref(), Some("$app1"));
    }

    #[tokio::test]
    async fn failures_name_the_operation() {
        let fake = FakeArm::with_site(&id());
        fake.fail_on("list_connection_strings");
        let err = SiteDetails::fetch(&fake, &id(), "Linux").await.err().unwrap();
        assert!(
            err.to_string().starts_with(
                "reading Connection String information for Linux Web App: (Site Name \"app1\" / Resource Group \"rg1\"): "
            ),
            "{}",
            err
        );
    }

    #[test]
    fn addresses() {
        assert_eq!(split_addresses("1.1.1.1,2.2.2.2"), vec!["1.1.1.1", "2.2.2.2"]);
        assert!(split_addresses("").is_empty());
    }
}
