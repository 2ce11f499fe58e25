//! Diagnostic logs block

use appservice_core::schema::{AttributeSchema, AttributeType};
use serde::{Deserialize, Serialize};

use crate::models::web::{
    ApplicationLogsConfig, AzureBlobStorageApplicationLogsConfig, AzureBlobStorageHttpLogsConfig,
    EnabledConfig, FileSystemApplicationLogsConfig, FileSystemHttpLogsConfig, HttpLogsConfig,
    SiteLogsConfig, SiteLogsConfigProperties,
};
use crate::validate::one_of;

const LOG_LEVELS: &[&str] = &["Off", "Error", "Warning", "Information", "Verbose"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub application_logs: Vec<ApplicationLog>,
    pub http_logs: Vec<HttpLog>,
    pub failed_request_tracing: bool,
    pub detailed_error_messages: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationLog {
    pub file_system_level: String,
    pub azure_blob_storage: Vec<AppLogBlobStorage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppLogBlobStorage {
    pub level: String,
    pub sas_url: String,
    pub retention_in_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpLog {
    pub file_system: Vec<LogsFileSystem>,
    pub azure_blob_storage: Vec<HttpLogBlobStorage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsFileSystem {
    pub retention_in_days: i64,
    pub retention_in_mb: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpLogBlobStorage {
    pub sas_url: String,
    pub retention_in_days: i64,
}

pub fn logs_config_schema() -> AttributeSchema {
    AttributeSchema::block(
        "logs",
        vec![
            AttributeSchema::block(
                "application_logs",
                vec![
                    AttributeSchema::new("file_system_level", one_of(LOG_LEVELS)).required(),
                    AttributeSchema::block(
                        "azure_blob_storage",
                        vec![
                            AttributeSchema::new("level", one_of(LOG_LEVELS)).required(),
                            AttributeSchema::new("sas_url", AttributeType::String)
                                .required()
                                .sensitive(),
                            AttributeSchema::new("retention_in_days", AttributeType::Int).required(),
                        ],
                        Some(1),
                    )
                    .optional(),
                ],
                Some(1),
            )
            .optional(),
            AttributeSchema::block(
                "http_logs",
                vec![
                    AttributeSchema::block(
                        "file_system",
                        vec![
                            AttributeSchema::new("retention_in_days", AttributeType::Int).required(),
                            AttributeSchema::new("retention_in_mb", AttributeType::Int).required(),
                        ],
                        Some(1),
                    )
                    .optional(),
                    AttributeSchema::block(
                        "azure_blob_storage",
                        vec![
                            AttributeSchema::new("sas_url", AttributeType::String)
                                .required()
                                .sensitive(),
                            AttributeSchema::new("retention_in_days", AttributeType::Int).optional(),
                        ],
                        Some(1),
                    )
                    .optional(),
                ],
                Some(1),
            )
            .optional(),
            AttributeSchema::new("failed_request_tracing", AttributeType::Bool).optional(),
            AttributeSchema::new("detailed_error_messages", AttributeType::Bool).optional(),
        ],
        Some(1),
    )
    .optional()
}

pub fn logs_config_schema_computed() -> AttributeSchema {
    logs_config_schema().into_computed()
}

fn enabled(value: bool) -> Option<EnabledConfig> {
    Some(EnabledConfig {
        enabled: Some(value),
    })
}

/// An empty input yields a config without properties
pub fn expand_logs_config(input: &[LogsConfig]) -> SiteLogsConfig {
    let Some(logs) = input.first() else {
        return SiteLogsConfig::default();
    };

    let application_logs = logs.application_logs.first().map(|app| ApplicationLogsConfig {
        file_system: Some(FileSystemApplicationLogsConfig {
            level: Some(app.file_system_level.clone()),
        }),
        azure_blob_storage: app
            .azure_blob_storage
            .first()
            .map(|blob| AzureBlobStorageApplicationLogsConfig {
                level: Some(blob.level.clone()),
                sas_url: Some(blob.sas_url.clone()),
                retention_in_days: Some(blob.retention_in_days),
            }),
    });

    let http_logs = logs.http_logs.first().map(|http| HttpLogsConfig {
        file_system: http.file_system.first().map(|fs| FileSystemHttpLogsConfig {
            retention_in_mb: Some(fs.retention_in_mb),
            retention_in_days: Some(fs.retention_in_days),
            enabled: Some(true),
        }),
        azure_blob_storage: http
            .azure_blob_storage
            .first()
            .map(|blob| AzureBlobStorageHttpLogsConfig {
                sas_url: Some(blob.sas_url.clone()),
                retention_in_days: Some(blob.retention_in_days),
                enabled: Some(true),
            }),
    });

    SiteLogsConfig {
        properties: Some(SiteLogsConfigProperties {
            application_logs,
            http_logs,
            failed_requests_tracing: enabled(logs.failed_request_tracing),
            detailed_error_messages: enabled(logs.detailed_error_messages),
        }),
    }
}

/// Config that switches every log off, sent when the block is removed
pub fn disabled_logs_config() -> SiteLogsConfig {
    SiteLogsConfig {
        properties: Some(SiteLogsConfigProperties {
            application_logs: Some(ApplicationLogsConfig {
                file_system: Some(FileSystemApplicationLogsConfig {
                    level: Some("Off".to_string()),
                }),
                azure_blob_storage: None,
            }),
            http_logs: Some(HttpLogsConfig {
                file_system: Some(FileSystemHttpLogsConfig {
                    enabled: Some(false),
                    ..Default::default()
                }),
                azure_blob_storage: None,
            }),
            failed_requests_tracing: enabled(false),
            detailed_error_messages: enabled(false),
        }),
    }
}

/// Everything switched off flattens to nothing
pub fn flatten_logs_config(input: &SiteLogsConfig) -> Vec<LogsConfig> {
    let Some(props) = &input.properties else {
        return Vec::new();
    };

    let is_enabled = |c: &Option<EnabledConfig>| {
        c.as_ref().and_then(|c| c.enabled).unwrap_or_default()
    };

    let mut logs = LogsConfig {
        failed_request_tracing: is_enabled(&props.failed_requests_tracing),
        detailed_error_messages: is_enabled(&props.detailed_error_messages),
        ..Default::default()
    };

    if let Some(app) = &props.application_logs {
        let file_system_level = app
            .file_system
            .as_ref()
            .and_then(|fs| fs.level.clone())
            .unwrap_or_default();
        let azure_blob_storage: Vec<AppLogBlobStorage> = app
            .azure_blob_storage
            .as_ref()
            .filter(|blob| blob.sas_url.as_deref().is_some_and(|s| !s.is_empty()))
            .map(|blob| AppLogBlobStorage {
                level: blob.level.clone().unwrap_or_default(),
                sas_url: blob.sas_url.clone().unwrap_or_default(),
                retention_in_days: blob.retention_in_days.unwrap_or_default(),
            })
            .into_iter()
            .collect();
        let level_on = !file_system_level.is_empty() && file_system_level != "Off";
        if level_on || !azure_blob_storage.is_empty() {
            logs.application_logs.push(ApplicationLog {
                file_system_level,
                azure_blob_storage,
            });
        }
    }

    if let Some(http) = &props.http_logs {
        let file_system: Vec<LogsFileSystem> = http
            .file_system
            .as_ref()
            .filter(|fs| fs.enabled.unwrap_or_default())
            .map(|fs| LogsFileSystem {
                retention_in_days: fs.retention_in_days.unwrap_or_default(),
                retention_in_mb: fs.retention_in_mb.unwrap_or_default(),
            })
            .into_iter()
            .collect();
        let azure_blob_storage: Vec<HttpLogBlobStorage> = http
            .azure_blob_storage
            .as_ref()
            .filter(|blob| blob.enabled.unwrap_or_default())
            .map(|blob| HttpLogBlobStorage {
                sas_url: blob.sas_url.clone().unwrap_or_default(),
                retention_in_days: blob.retention_in_days.unwrap_or_default(),
            })
            .into_iter()
            .collect();
        if !file_system.is_empty() || !azure_blob_storage.is_empty() {
            logs.http_logs.push(HttpLog {
                file_system,
                azure_blob_storage,
            });
        }
    }

    if logs == LogsConfig::default() {
        return Vec::new();
    }
    vec![logs]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logs() -> LogsConfig {
        LogsConfig {
            application_logs: vec![ApplicationLog {
                file_system_level: "Warning".to_string(),
                azure_blob_storage: vec![],
            }],
            http_logs: vec![HttpLog {
                file_system: vec![LogsFileSystem {
                    retention_in_days: 30,
                    retention_in_mb: 35,
                }],
                azure_blob_storage: vec![],
            }],
            failed_request_tracing: false,
            detailed_error_messages: true,
        }
    }

    #[test]
    fn round_trip() {
        assert_eq!(flatten_logs_config(&expand_logs_config(&[logs()])), vec![logs()]);
    }

    #[test]
    fn disabled_config_flattens_to_nothing() {
        assert!(flatten_logs_config(&disabled_logs_config()).is_empty());
        assert!(flatten_logs_config(&SiteLogsConfig::default()).is_empty());
    }

    #[test]
    fn expand_empty_has_no_properties() {
        assert!(expand_logs_config(&[]).properties.is_none());
    }

    #[test]
    fn http_file_system_logs_are_enabled() {
        let expanded = expand_logs_config(&[logs()]);
        let http = expanded.properties.unwrap().http_logs.unwrap();
        assert_eq!(http.file_system.unwrap().enabled, Some(true));
        assert!(http.azure_blob_storage.is_none());
    }
}
