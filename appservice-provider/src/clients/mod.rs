//! Clients for the resource manager APIs the provider calls
//!
//! Every API group is a trait so drivers can be exercised against an
//! in-memory fake; [`ArmClient`] implements all of them over REST.

pub mod app_service;
pub mod arm;
pub mod auth;
pub mod lro;
pub mod video_analyzer;
pub mod web_apps;

use std::sync::Arc;

pub use app_service::{AppServiceEnvironmentsApi, ServicePlansApi};
pub use arm::{ApiError, ArmClient};
pub use auth::TokenCredential;
pub use lro::LongRunningOperation;
pub use video_analyzer::EdgeModulesApi;
pub use web_apps::WebAppsApi;

use crate::config::{ConfigError, ProviderConfig};

/// Client bundle handed to every driver
#[derive(Clone)]
pub struct Clients {
    pub subscription_id: String,
    pub web_apps: Arc<dyn WebAppsApi>,
    pub service_plans: Arc<dyn ServicePlansApi>,
    pub app_service_environments: Arc<dyn AppServiceEnvironmentsApi>,
    pub edge_modules: Arc<dyn EdgeModulesApi>,
}

impl Clients {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let credential = TokenCredential::from_config(config)?;
        let arm = Arc::new(ArmClient::new(config.resource_manager_url()?, credential));
        Ok(Self {
            subscription_id: config.subscription_id.clone(),
            web_apps: arm.clone(),
            service_plans: arm.clone(),
            app_service_environments: arm.clone(),
            edge_modules: arm,
        })
    }
}
