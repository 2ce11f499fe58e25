//! Provider configuration read from `ARM_*` environment variables

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the environment variable {0} must be set")]
    Missing(&'static str),

    #[error("unknown cloud environment {0:?}, expected one of: public, usgovernment, china")]
    UnknownEnvironment(String),

    #[error("invalid resource manager endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Sovereign cloud the provider talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloudEnvironment {
    #[default]
    Public,
    UsGovernment,
    China,
}

impl CloudEnvironment {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "" | "public" => Ok(Self::Public),
            "usgovernment" => Ok(Self::UsGovernment),
            "china" => Ok(Self::China),
            _ => Err(ConfigError::UnknownEnvironment(name.to_string())),
        }
    }

    pub fn resource_manager_endpoint(&self) -> &'static str {
        match self {
            Self::Public => "https://management.azure.com",
            Self::UsGovernment => "https://management.usgovcloudapi.net",
            Self::China => "https://management.chinacloudapi.cn",
        }
    }

    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Public => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub subscription_id: String,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Pre-issued bearer token; skips the client credentials flow
    pub access_token: Option<String>,
    pub environment: CloudEnvironment,
    /// Overrides the resource manager endpoint of `environment`
    pub metadata_host: Option<String>,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let subscription_id =
            get("ARM_SUBSCRIPTION_ID").ok_or(ConfigError::Missing("ARM_SUBSCRIPTION_ID"))?;
        let environment = match get("ARM_ENVIRONMENT") {
            Some(name) => CloudEnvironment::parse(&name)?,
            None => CloudEnvironment::Public,
        };

        let config = Self {
            subscription_id,
            tenant_id: get("ARM_TENANT_ID"),
            client_id: get("ARM_CLIENT_ID"),
            client_secret: get("ARM_CLIENT_SECRET"),
            access_token: get("ARM_ACCESS_TOKEN"),
            environment,
            metadata_host: get("ARM_METADATA_HOSTNAME"),
        };

        if config.access_token.is_none() {
            config
                .tenant_id
                .as_ref()
                .ok_or(ConfigError::Missing("ARM_TENANT_ID"))?;
            config
                .client_id
                .as_ref()
                .ok_or(ConfigError::Missing("ARM_CLIENT_ID"))?;
            config
                .client_secret
                .as_ref()
                .ok_or(ConfigError::Missing("ARM_CLIENT_SECRET"))?;
        }

        Ok(config)
    }

    /// Base URL for resource manager requests
    pub fn resource_manager_url(&self) -> Result<Url, ConfigError> {
        match &self.metadata_host {
            Some(host) if host.contains("://") => Ok(Url::parse(host)?),
            Some(host) => Ok(Url::parse(&format!("https://{}", host))?),
            None => Ok(Url::parse(self.environment.resource_manager_endpoint())?),
        }
    }
}
