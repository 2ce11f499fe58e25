//! Composite resource-manager IDs
//!
//! IDs are parsed segment by segment: every key must appear in order with a
//! non-empty value, and nothing may follow the last segment.

use std::fmt;

use appservice_core::provider::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseIdError {
    #[error("ID was empty")]
    Empty,

    #[error("expected the segment {expected:?} but got {got:?} in {id:?}")]
    UnexpectedSegment {
        id: String,
        expected: String,
        got: String,
    },

    #[error("the segment {key:?} has no value in {id:?}")]
    MissingValue { id: String, key: String },

    #[error("{id:?} has unexpected trailing segments after {last:?}")]
    TrailingSegments { id: String, last: String },
}

impl From<ParseIdError> for ProviderError {
    fn from(e: ParseIdError) -> Self {
        ProviderError::invalid_argument(e.to_string())
    }
}

/// One `key/value` pair of an ID. `fixed` pins the value (the provider namespace).
struct Segment {
    key: &'static str,
    fixed: Option<&'static str>,
}

const fn key(key: &'static str) -> Segment {
    Segment { key, fixed: None }
}

const fn provider(namespace: &'static str) -> Segment {
    Segment {
        key: "providers",
        fixed: Some(namespace),
    }
}

fn keys_match(expected: &str, got: &str) -> bool {
    // resource groups are frequently lower-cased by the platform
    if expected == "resourceGroups" || expected == "providers" {
        expected.eq_ignore_ascii_case(got)
    } else {
        expected == got
    }
}

/// Parse `id` against `segments`, returning the values of the non-fixed segments in order
fn parse_segments(id: &str, segments: &[Segment]) -> Result<Vec<String>, ParseIdError> {
    if id.trim().is_empty() {
        return Err(ParseIdError::Empty);
    }

    let mut parts = id.trim_start_matches('/').split('/');
    let mut values = Vec::new();

    for segment in segments {
        let got = parts.next().unwrap_or_default();
        if !keys_match(segment.key, got) {
            return Err(ParseIdError::UnexpectedSegment {
                id: id.to_string(),
                expected: segment.key.to_string(),
                got: got.to_string(),
            });
        }

        let value = parts.next().unwrap_or_default();
        if value.is_empty() {
            return Err(ParseIdError::MissingValue {
                id: id.to_string(),
                key: segment.key.to_string(),
            });
        }

        match segment.fixed {
            Some(namespace) if !namespace.eq_ignore_ascii_case(value) => {
                return Err(ParseIdError::UnexpectedSegment {
                    id: id.to_string(),
                    expected: namespace.to_string(),
                    got: value.to_string(),
                });
            }
            Some(_) => {}
            None => values.push(value.to_string()),
        }
    }

    if parts.any(|p| !p.is_empty()) {
        let last = segments.last().map(|s| s.key).unwrap_or_default();
        return Err(ParseIdError::TrailingSegments {
            id: id.to_string(),
            last: last.to_string(),
        });
    }

    Ok(values)
}

const WEB_APP_SEGMENTS: &[Segment] = &[
    key("subscriptions"),
    key("resourceGroups"),
    provider("Microsoft.Web"),
    key("sites"),
];

const SERVICE_PLAN_SEGMENTS: &[Segment] = &[
    key("subscriptions"),
    key("resourceGroups"),
    provider("Microsoft.Web"),
    key("serverfarms"),
];

const APP_SERVICE_ENVIRONMENT_SEGMENTS: &[Segment] = &[
    key("subscriptions"),
    key("resourceGroups"),
    provider("Microsoft.Web"),
    key("hostingEnvironments"),
];

const EDGE_MODULE_SEGMENTS: &[Segment] = &[
    key("subscriptions"),
    key("resourceGroups"),
    provider("Microsoft.Media"),
    key("videoAnalyzers"),
    key("edgeModules"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAppId {
    pub subscription_id: String,
    pub resource_group: String,
    pub site_name: String,
}

impl WebAppId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        site_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            site_name: site_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseIdError> {
        let [subscription_id, resource_group, site_name]: [String; 3] =
            into_array(parse_segments(input, WEB_APP_SEGMENTS)?);
        Ok(Self {
            subscription_id,
            resource_group,
            site_name,
        })
    }

    /// Resource-manager path
    pub fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}",
            self.subscription_id, self.resource_group, self.site_name
        )
    }
}

impl fmt::Display for WebAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Web App: (Site Name {:?} / Resource Group {:?})",
            self.site_name, self.resource_group
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePlanId {
    pub subscription_id: String,
    pub resource_group: String,
    pub server_farm_name: String,
}

impl ServicePlanId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        server_farm_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            server_farm_name: server_farm_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseIdError> {
        let [subscription_id, resource_group, server_farm_name]: [String; 3] =
            into_array(parse_segments(input, SERVICE_PLAN_SEGMENTS)?);
        Ok(Self {
            subscription_id,
            resource_group,
            server_farm_name,
        })
    }

    pub fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/serverfarms/{}",
            self.subscription_id, self.resource_group, self.server_farm_name
        )
    }
}

impl fmt::Display for ServicePlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Service Plan: (Serverfarm Name {:?} / Resource Group {:?})",
            self.server_farm_name, self.resource_group
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppServiceEnvironmentId {
    pub subscription_id: String,
    pub resource_group: String,
    pub hosting_environment_name: String,
}

impl AppServiceEnvironmentId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        hosting_environment_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            hosting_environment_name: hosting_environment_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseIdError> {
        let [subscription_id, resource_group, hosting_environment_name]: [String; 3] =
            into_array(parse_segments(input, APP_SERVICE_ENVIRONMENT_SEGMENTS)?);
        Ok(Self {
            subscription_id,
            resource_group,
            hosting_environment_name,
        })
    }

    pub fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/hostingEnvironments/{}",
            self.subscription_id, self.resource_group, self.hosting_environment_name
        )
    }
}

impl fmt::Display for AppServiceEnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "App Service Environment: (Hosting Environment Name {:?} / Resource Group {:?})",
            self.hosting_environment_name, self.resource_group
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeModuleId {
    pub subscription_id: String,
    pub resource_group: String,
    pub video_analyzer_name: String,
    pub edge_module_name: String,
}

impl EdgeModuleId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        video_analyzer_name: impl Into<String>,
        edge_module_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            video_analyzer_name: video_analyzer_name.into(),
            edge_module_name: edge_module_name.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseIdError> {
        let [subscription_id, resource_group, video_analyzer_name, edge_module_name]: [String; 4] =
            into_array(parse_segments(input, EDGE_MODULE_SEGMENTS)?);
        Ok(Self {
            subscription_id,
            resource_group,
            video_analyzer_name,
            edge_module_name,
        })
    }

    pub fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Media/videoAnalyzers/{}/edgeModules/{}",
            self.subscription_id, self.resource_group, self.video_analyzer_name, self.edge_module_name
        )
    }
}

impl fmt::Display for EdgeModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Edge Module: (Edge Module Name {:?} / Video Analyzer Name {:?} / Resource Group {:?})",
            self.edge_module_name, self.video_analyzer_name, self.resource_group
        )
    }
}

// parse_segments yields exactly one value per non-fixed segment
fn into_array<const N: usize>(values: Vec<String>) -> [String; N] {
    let mut iter = values.into_iter();
    std::array::from_fn(|_| iter.next().unwrap_or_default())
}
