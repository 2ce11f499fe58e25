//! Backup block

use appservice_core::provider::{ProviderError, ProviderResult};
use appservice_core::resource::Value;
use appservice_core::schema::{AttributeSchema, AttributeType};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::web::{BackupRequest, BackupRequestProperties, BackupSchedule as ApiBackupSchedule};
use crate::validate::one_of;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backup {
    pub name: String,
    pub storage_account_url: String,
    pub enabled: bool,
    pub schedule: Vec<BackupSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSchedule {
    pub frequency_interval: i64,
    pub frequency_unit: String,
    pub keep_at_least_one_backup: bool,
    pub retention_period_days: i64,
    pub start_time: String,
    pub last_execution_time: String,
}

fn rfc3339() -> AttributeType {
    AttributeType::Custom {
        name: "RFC3339Time".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|_| ())
                .map_err(|e| format!("{:?} is not a valid RFC3339 time: {}", s, e)),
            _ => Err("Expected string".to_string()),
        },
    }
}

pub fn backup_schema() -> AttributeSchema {
    AttributeSchema::block(
        "backup",
        vec![
            AttributeSchema::new("name", AttributeType::String).required(),
            AttributeSchema::new("storage_account_url", AttributeType::String)
                .required()
                .sensitive(),
            AttributeSchema::new("enabled", AttributeType::Bool)
                .optional()
                .with_default(Value::Bool(true)),
            AttributeSchema::block(
                "schedule",
                vec![
                    AttributeSchema::new("frequency_interval", AttributeType::Int).required(),
                    AttributeSchema::new("frequency_unit", one_of(&["Day", "Hour"])).required(),
                    AttributeSchema::new("keep_at_least_one_backup", AttributeType::Bool)
                        .optional()
                        .with_default(Value::Bool(false)),
                    AttributeSchema::new("retention_period_days", AttributeType::Int)
                        .optional()
                        .with_default(Value::Int(30)),
                    AttributeSchema::new("start_time", rfc3339())
                        .optional()
                        .computed()
                        .with_canonical(utc_time),
                    AttributeSchema::new("last_execution_time", AttributeType::String).computed(),
                ],
                Some(1),
            )
            .required(),
        ],
        Some(1),
    )
    .optional()
}

pub fn backup_schema_computed() -> AttributeSchema {
    backup_schema().into_computed()
}

fn normalize_time(input: &str) -> Result<String, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(input)?
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Offsets denoting the same instant compare equal
fn utc_time(value: &Value) -> Value {
    match value.as_str().map(normalize_time) {
        Some(Ok(time)) => Value::String(time),
        _ => value.clone(),
    }
}

/// An empty input yields a request without properties, which callers treat as "no backup"
pub fn expand_backup_config(input: &[Backup]) -> ProviderResult<BackupRequest> {
    let Some(backup) = input.first() else {
        return Ok(BackupRequest::default());
    };

    let backup_schedule = match backup.schedule.first() {
        Some(schedule) => {
            let start_time = if schedule.start_time.is_empty() {
                None
            } else {
                Some(normalize_time(&schedule.start_time).map_err(|e| {
                    ProviderError::invalid_argument(format!(
                        "parsing backup start_time {:?}",
                        schedule.start_time
                    ))
                    .with_cause(e)
                })?)
            };
            Some(ApiBackupSchedule {
                frequency_interval: schedule.frequency_interval,
                frequency_unit: schedule.frequency_unit.clone(),
                keep_at_least_one_backup: schedule.keep_at_least_one_backup,
                retention_period_in_days: schedule.retention_period_days,
                start_time,
                last_execution_time: None,
            })
        }
        None => None,
    };

    Ok(BackupRequest {
        properties: Some(BackupRequestProperties {
            backup_name: Some(backup.name.clone()),
            enabled: Some(backup.enabled),
            storage_account_url: Some(backup.storage_account_url.clone()),
            backup_schedule,
        }),
    })
}

pub fn flatten_backup_config(input: Option<&BackupRequest>) -> Vec<Backup> {
    let Some(props) = input.and_then(|b| b.properties.as_ref()) else {
        return Vec::new();
    };

    let schedule = props
        .backup_schedule
        .as_ref()
        .map(|s| BackupSchedule {
            frequency_interval: s.frequency_interval,
            frequency_unit: s.frequency_unit.clone(),
            keep_at_least_one_backup: s.keep_at_least_one_backup,
            retention_period_days: s.retention_period_in_days,
            start_time: s
                .start_time
                .as_deref()
                .map(|t| normalize_time(t).unwrap_or_else(|_| t.to_string()))
                .unwrap_or_default(),
            last_execution_time: s.last_execution_time.clone().unwrap_or_default(),
        })
        .into_iter()
        .collect();

    vec![Backup {
        name: props.backup_name.clone().unwrap_or_default(),
        storage_account_url: props.storage_account_url.clone().unwrap_or_default(),
        enabled: props.enabled.unwrap_or_default(),
        schedule,
    }]
}
