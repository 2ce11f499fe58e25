//! Microsoft.Media video analyzer edge modules

use async_trait::async_trait;

use super::arm::{ApiError, ArmClient};
use crate::models::video_analyzer::{API_VERSION, EdgeModuleEntity};
use crate::parse::EdgeModuleId;

#[async_trait]
pub trait EdgeModulesApi: Send + Sync {
    async fn get(&self, id: &EdgeModuleId) -> Result<EdgeModuleEntity, ApiError>;
}

#[async_trait]
impl EdgeModulesApi for ArmClient {
    async fn get(&self, id: &EdgeModuleId) -> Result<EdgeModuleEntity, ApiError> {
        ArmClient::get(self, &id.id(), API_VERSION).await
    }
}
