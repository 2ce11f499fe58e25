//! App Service Core
//!
//! Schema declarations, resource metadata and driver traits shared by the
//! App Service provider resources

pub mod differ;
pub mod host;
pub mod metadata;
pub mod provider;
pub mod resource;
pub mod schema;
