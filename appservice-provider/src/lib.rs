//! Azure App Service Provider
//!
//! Resources and data sources for App Service web apps, backed by the Azure
//! Resource Manager REST API.
//!
//! ## Module Structure
//!
//! - `clients` - ARM REST client and the per-API-group traits
//! - `models` - Wire models for requests and responses
//! - `helpers` - Expand/flatten between config models and wire models
//! - `parse` - Composite resource IDs
//! - `windows_web_app` - `azurerm_windows_web_app` resource
//! - `linux_web_app_data_source` - `azurerm_linux_web_app` data source

pub mod clients;
pub mod config;
pub mod helpers;
pub mod linux_web_app_data_source;
pub mod models;
pub mod parse;
pub mod validate;
pub mod windows_web_app;

mod site_details;

#[cfg(test)]
mod testing;

// Re-export main types
pub use clients::Clients;
pub use config::{ConfigError, ProviderConfig};
pub use linux_web_app_data_source::LinuxWebAppDataSource;
pub use windows_web_app::WindowsWebAppResource;

use appservice_core::provider::{DataSource, Resource};

/// Every resource this provider serves
pub fn resources() -> Vec<Box<dyn Resource<Clients>>> {
    vec![Box::new(WindowsWebAppResource)]
}

/// Every data source this provider serves
pub fn data_sources() -> Vec<Box<dyn DataSource<Clients>>> {
    vec![Box::new(LinuxWebAppDataSource)]
}

pub fn resource(resource_type: &str) -> Option<Box<dyn Resource<Clients>>> {
    resources().into_iter().find(|r| r.resource_type() == resource_type)
}

pub fn data_source(resource_type: &str) -> Option<Box<dyn DataSource<Clients>>> {
    data_sources().into_iter().find(|d| d.resource_type() == resource_type)
}
