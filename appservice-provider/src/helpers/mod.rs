//! Expand/flatten helpers between the typed config models and the wire models
//!
//! Each settings group has a model, an argument schema, a computed schema for
//! data sources, and a pair of conversions.

pub mod app_settings;
pub mod auth;
pub mod backup;
pub mod connection_strings;
pub mod identity;
pub mod logs;
pub mod site_config;
pub mod site_credentials;
pub mod storage;
pub mod tags;
