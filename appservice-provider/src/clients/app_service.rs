//! Service plans and App Service Environments

use async_trait::async_trait;

use super::arm::{ApiError, ArmClient};
use crate::models::web::{API_VERSION, AppServiceEnvironmentResource, AppServicePlan};
use crate::parse::{AppServiceEnvironmentId, ServicePlanId};

#[async_trait]
pub trait ServicePlansApi: Send + Sync {
    async fn get(&self, id: &ServicePlanId) -> Result<AppServicePlan, ApiError>;
}

#[async_trait]
pub trait AppServiceEnvironmentsApi: Send + Sync {
    async fn get(&self, id: &AppServiceEnvironmentId) -> Result<AppServiceEnvironmentResource, ApiError>;
}

#[async_trait]
impl ServicePlansApi for ArmClient {
    async fn get(&self, id: &ServicePlanId) -> Result<AppServicePlan, ApiError> {
        ArmClient::get(self, &id.id(), API_VERSION).await
    }
}

#[async_trait]
impl AppServiceEnvironmentsApi for ArmClient {
    async fn get(&self, id: &AppServiceEnvironmentId) -> Result<AppServiceEnvironmentResource, ApiError> {
        ArmClient::get(self, &id.id(), API_VERSION).await
    }
}
