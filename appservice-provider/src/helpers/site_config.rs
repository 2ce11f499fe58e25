//! Site configuration blocks
//!
//! Windows apps pick their runtime through individual version fields plus a
//! `CURRENT_STACK` marker, which the platform keeps in site metadata instead
//! of the site config. Linux apps encode the runtime in `linuxFxVersion`
//! (`STACK|version`), which is decoded into `application_stack` on read.

use appservice_core::provider::{ProviderError, ProviderResult};
use appservice_core::resource::Value;
use appservice_core::schema::{AttributeSchema, AttributeType};
use serde::{Deserialize, Serialize};

use crate::models::web::{CorsSettings, IpSecurityRestriction, SiteConfig};
use crate::validate::one_of;

/// Site metadata key holding the Windows stack marker
pub const CURRENT_STACK_KEY: &str = "CURRENT_STACK";

const DOCKER_PREFIX: &str = "DOCKER|";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfigWindows {
    pub always_on: bool,
    pub app_command_line: String,
    pub default_documents: Vec<String>,
    pub ftps_state: String,
    pub health_check_path: String,
    pub http2_enabled: bool,
    pub load_balancing_mode: String,
    pub managed_pipeline_mode: String,
    pub minimum_tls_version: String,
    pub remote_debugging: bool,
    pub remote_debugging_version: String,
    pub scm_type: String,
    pub use_32_bit_worker: bool,
    pub websockets_enabled: bool,
    pub worker_count: i64,
    pub detailed_error_logging_enabled: bool,
    pub cors: Vec<Cors>,
    pub ip_restriction: Vec<IpRestriction>,
    pub application_stack: Vec<ApplicationStackWindows>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationStackWindows {
    pub current_stack: String,
    pub dotnet_version: String,
    pub php_version: String,
    pub python_version: String,
    pub node_version: String,
    pub java_version: String,
    pub java_container: String,
    pub java_container_version: String,
    pub docker_container_name: String,
    pub docker_container_registry: String,
    pub docker_container_tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfigLinux {
    pub always_on: bool,
    pub app_command_line: String,
    pub default_documents: Vec<String>,
    pub ftps_state: String,
    pub health_check_path: String,
    pub http2_enabled: bool,
    pub linux_fx_version: String,
    pub load_balancing_mode: String,
    pub managed_pipeline_mode: String,
    pub minimum_tls_version: String,
    pub remote_debugging: bool,
    pub remote_debugging_version: String,
    pub scm_type: String,
    pub use_32_bit_worker: bool,
    pub websockets_enabled: bool,
    pub worker_count: i64,
    pub detailed_error_logging_enabled: bool,
    pub cors: Vec<Cors>,
    pub ip_restriction: Vec<IpRestriction>,
    pub application_stack: Vec<ApplicationStackLinux>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationStackLinux {
    pub docker_image: String,
    pub docker_image_tag: String,
    pub dotnet_version: String,
    pub java_server: String,
    pub java_server_version: String,
    pub java_version: String,
    pub node_version: String,
    pub php_version: String,
    pub python_version: String,
    pub ruby_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
    pub support_credentials: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRestriction {
    pub ip_address: String,
    pub service_tag: String,
    pub virtual_network_subnet_id: String,
    pub name: String,
    pub priority: i64,
    pub action: String,
}

fn string_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

fn cors_schema() -> AttributeSchema {
    AttributeSchema::block(
        "cors",
        vec![
            AttributeSchema::new("allowed_origins", string_list())
                .required()
                .unordered(),
            AttributeSchema::new("support_credentials", AttributeType::Bool)
                .optional()
                .with_default(Value::Bool(false)),
        ],
        Some(1),
    )
    .optional()
}

fn ip_restriction_schema() -> AttributeSchema {
    AttributeSchema::block(
        "ip_restriction",
        vec![
            AttributeSchema::new("ip_address", AttributeType::String).optional(),
            AttributeSchema::new("service_tag", AttributeType::String).optional(),
            AttributeSchema::new("virtual_network_subnet_id", AttributeType::String).optional(),
            AttributeSchema::new("name", AttributeType::String)
                .optional()
                .computed(),
            AttributeSchema::new("priority", AttributeType::Int)
                .optional()
                .with_default(Value::Int(65000)),
            AttributeSchema::new("action", one_of(&["Allow", "Deny"]))
                .optional()
                .with_default(Value::String("Allow".to_string())),
        ],
        None,
    )
    .optional()
}

fn common_site_config_arguments() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new("always_on", AttributeType::Bool)
            .optional()
            .with_default(Value::Bool(true)),
        AttributeSchema::new("app_command_line", AttributeType::String).optional(),
        AttributeSchema::new("default_documents", string_list())
            .optional()
            .computed(),
        AttributeSchema::new("ftps_state", one_of(&["AllAllowed", "Disabled", "FtpsOnly"]))
            .optional()
            .with_default(Value::String("Disabled".to_string())),
        AttributeSchema::new("health_check_path", AttributeType::String).optional(),
        AttributeSchema::new("http2_enabled", AttributeType::Bool)
            .optional()
            .with_default(Value::Bool(false)),
        AttributeSchema::new(
            "load_balancing_mode",
            one_of(&[
                "LeastRequests",
                "LeastResponseTime",
                "PerSiteRoundRobin",
                "RequestHash",
                "WeightedRoundRobin",
                "WeightedTotalTraffic",
            ]),
        )
        .optional()
        .with_default(Value::String("LeastRequests".to_string())),
        AttributeSchema::new("managed_pipeline_mode", one_of(&["Classic", "Integrated"]))
            .optional()
            .with_default(Value::String("Integrated".to_string())),
        AttributeSchema::new("minimum_tls_version", one_of(&["1.0", "1.1", "1.2"]))
            .optional()
            .with_default(Value::String("1.2".to_string())),
        AttributeSchema::new("remote_debugging", AttributeType::Bool)
            .optional()
            .with_default(Value::Bool(false)),
        AttributeSchema::new(
            "remote_debugging_version",
            one_of(&["VS2017", "VS2019"]),
        )
        .optional()
        .computed(),
        AttributeSchema::new("scm_type", AttributeType::String).computed(),
        AttributeSchema::new("use_32_bit_worker", AttributeType::Bool)
            .optional()
            .with_default(Value::Bool(true)),
        AttributeSchema::new("websockets_enabled", AttributeType::Bool)
            .optional()
            .with_default(Value::Bool(false)),
        AttributeSchema::new("worker_count", AttributeType::Int)
            .optional()
            .computed(),
        AttributeSchema::new("detailed_error_logging_enabled", AttributeType::Bool).computed(),
        cors_schema(),
        ip_restriction_schema(),
    ]
}

pub fn site_config_schema_windows() -> AttributeSchema {
    let mut attributes = common_site_config_arguments();
    attributes.push(
        AttributeSchema::block(
            "application_stack",
            vec![
                AttributeSchema::new(
                    "current_stack",
                    one_of(&["dotnet", "node", "python", "php", "java"]),
                )
                .optional()
                .computed(),
                AttributeSchema::new(
                    "dotnet_version",
                    one_of(&["v2.0", "v3.0", "v4.0", "v5.0", "v6.0"]),
                )
                .optional()
                .computed(),
                AttributeSchema::new("php_version", AttributeType::String).optional(),
                AttributeSchema::new("python_version", AttributeType::String).optional(),
                AttributeSchema::new("node_version", AttributeType::String).optional(),
                AttributeSchema::new("java_version", AttributeType::String).optional(),
                AttributeSchema::new("java_container", AttributeType::String).optional(),
                AttributeSchema::new("java_container_version", AttributeType::String).optional(),
                AttributeSchema::new("docker_container_name", AttributeType::String).optional(),
                AttributeSchema::new("docker_container_registry", AttributeType::String)
                    .optional(),
                AttributeSchema::new("docker_container_tag", AttributeType::String).optional(),
            ],
            Some(1),
        )
        .optional()
        .computed(),
    );
    AttributeSchema::block("site_config", attributes, Some(1)).required()
}

pub fn site_config_schema_linux_computed() -> AttributeSchema {
    let mut attributes = common_site_config_arguments();
    attributes.push(AttributeSchema::new("linux_fx_version", AttributeType::String).computed());
    attributes.push(AttributeSchema::block(
        "application_stack",
        [
            "docker_image",
            "docker_image_tag",
            "dotnet_version",
            "java_server",
            "java_server_version",
            "java_version",
            "node_version",
            "php_version",
            "python_version",
            "ruby_version",
        ]
        .into_iter()
        .map(|name| AttributeSchema::new(name, AttributeType::String).optional())
        .collect(),
        Some(1),
    ));
    AttributeSchema::block("site_config", attributes, Some(1))
        .optional()
        .into_computed()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn expand_cors(input: &[Cors]) -> Option<CorsSettings> {
    input.first().map(|cors| CorsSettings {
        allowed_origins: cors.allowed_origins.clone(),
        support_credentials: Some(cors.support_credentials),
    })
}

fn flatten_cors(input: Option<&CorsSettings>) -> Vec<Cors> {
    input
        .filter(|cors| !cors.allowed_origins.is_empty())
        .map(|cors| Cors {
            allowed_origins: cors.allowed_origins.clone(),
            support_credentials: cors.support_credentials.unwrap_or_default(),
        })
        .into_iter()
        .collect()
}

fn expand_ip_restrictions(input: &[IpRestriction]) -> ProviderResult<Option<Vec<IpSecurityRestriction>>> {
    if input.is_empty() {
        return Ok(None);
    }
    input
        .iter()
        .map(|r| {
            let sources = [&r.ip_address, &r.service_tag, &r.virtual_network_subnet_id]
                .iter()
                .filter(|s| !s.is_empty())
                .count();
            if sources != 1 {
                return Err(ProviderError::invalid_argument(
                    "exactly one of `ip_address`, `service_tag` or `virtual_network_subnet_id` must be set for an IP restriction",
                ));
            }
            let tag = (!r.service_tag.is_empty()).then(|| "ServiceTag".to_string());
            Ok(IpSecurityRestriction {
                ip_address: non_empty(&r.ip_address).or_else(|| non_empty(&r.service_tag)),
                name: non_empty(&r.name),
                priority: Some(r.priority),
                action: non_empty(&r.action),
                tag,
                vnet_subnet_resource_id: non_empty(&r.virtual_network_subnet_id),
            })
        })
        .collect::<ProviderResult<Vec<_>>>()
        .map(Some)
}

/// The platform appends an implicit "Allow all" rule, which is not reported
fn flatten_ip_restrictions(input: Option<&Vec<IpSecurityRestriction>>) -> Vec<IpRestriction> {
    input
        .into_iter()
        .flatten()
        .filter(|r| !(r.ip_address.as_deref() == Some("Any") && r.name.as_deref() == Some("Allow all")))
        .map(|r| {
            let is_service_tag = r.tag.as_deref() == Some("ServiceTag");
            let address = r.ip_address.clone().unwrap_or_default();
            IpRestriction {
                ip_address: if is_service_tag { String::new() } else { address.clone() },
                service_tag: if is_service_tag { address } else { String::new() },
                virtual_network_subnet_id: r.vnet_subnet_resource_id.clone().unwrap_or_default(),
                name: r.name.clone().unwrap_or_default(),
                priority: r.priority.unwrap_or_default(),
                action: r.action.clone().unwrap_or_default(),
            }
        })
        .collect()
}

/// Expand the Windows site config. The returned stack marker is not part of
/// the config; it is stored as site metadata under [`CURRENT_STACK_KEY`].
pub fn expand_site_config_windows(input: &[SiteConfigWindows]) -> ProviderResult<(SiteConfig, Option<String>)> {
    let Some(config) = input.first() else {
        return Ok((SiteConfig::default(), None));
    };

    let mut expanded = SiteConfig {
        always_on: Some(config.always_on),
        app_command_line: non_empty(&config.app_command_line),
        default_documents: (!config.default_documents.is_empty())
            .then(|| config.default_documents.clone()),
        ftps_state: non_empty(&config.ftps_state),
        health_check_path: non_empty(&config.health_check_path),
        http20_enabled: Some(config.http2_enabled),
        load_balancing_mode: non_empty(&config.load_balancing_mode),
        managed_pipeline_mode: non_empty(&config.managed_pipeline_mode),
        min_tls_version: non_empty(&config.minimum_tls_version),
        remote_debugging_enabled: Some(config.remote_debugging),
        remote_debugging_version: non_empty(&config.remote_debugging_version),
        use32_bit_worker_process: Some(config.use_32_bit_worker),
        web_sockets_enabled: Some(config.websockets_enabled),
        number_of_workers: (config.worker_count > 0).then_some(config.worker_count),
        cors: expand_cors(&config.cors),
        ip_security_restrictions: expand_ip_restrictions(&config.ip_restriction)?,
        ..Default::default()
    };

    let mut current_stack = None;
    if let Some(stack) = config.application_stack.first() {
        expanded.net_framework_version = non_empty(&stack.dotnet_version);
        expanded.php_version = non_empty(&stack.php_version);
        expanded.python_version = non_empty(&stack.python_version);
        expanded.node_version = non_empty(&stack.node_version);

        if !stack.java_container.is_empty() && stack.java_container_version.is_empty() {
            return Err(ProviderError::invalid_argument(
                "`java_container_version` must be specified when `java_container` is set",
            ));
        }
        expanded.java_version = non_empty(&stack.java_version);
        expanded.java_container = non_empty(&stack.java_container);
        expanded.java_container_version = non_empty(&stack.java_container_version);

        let docker = [
            &stack.docker_container_name,
            &stack.docker_container_registry,
            &stack.docker_container_tag,
        ];
        match docker.iter().filter(|s| !s.is_empty()).count() {
            0 => {}
            3 => {
                expanded.windows_fx_version = Some(format!(
                    "{}{}/{}:{}",
                    DOCKER_PREFIX,
                    stack.docker_container_registry,
                    stack.docker_container_name,
                    stack.docker_container_tag
                ));
            }
            _ => {
                return Err(ProviderError::invalid_argument(
                    "`docker_container_name`, `docker_container_registry` and `docker_container_tag` must all be set for a docker application stack",
                ));
            }
        }

        current_stack = non_empty(&stack.current_stack);
    }

    Ok((expanded, current_stack))
}

/// Split "registry/name:tag"
fn parse_windows_docker(image: &str) -> (String, String, String) {
    let (registry, rest) = image.split_once('/').unwrap_or(("", image));
    let (name, tag) = rest.rsplit_once(':').unwrap_or((rest, ""));
    (registry.to_string(), name.to_string(), tag.to_string())
}

pub fn flatten_site_config_windows(input: Option<&SiteConfig>, current_stack: &str) -> Vec<SiteConfigWindows> {
    let Some(config) = input else {
        return Vec::new();
    };
    let text = |v: &Option<String>| v.clone().unwrap_or_default();

    let mut stack = ApplicationStackWindows {
        current_stack: current_stack.to_string(),
        dotnet_version: text(&config.net_framework_version),
        php_version: text(&config.php_version),
        python_version: text(&config.python_version),
        node_version: text(&config.node_version),
        java_version: text(&config.java_version),
        java_container: text(&config.java_container),
        java_container_version: text(&config.java_container_version),
        ..Default::default()
    };
    if let Some(image) = config
        .windows_fx_version
        .as_deref()
        .and_then(|v| v.strip_prefix(DOCKER_PREFIX))
    {
        let (registry, name, tag) = parse_windows_docker(image);
        stack.docker_container_registry = registry;
        stack.docker_container_name = name;
        stack.docker_container_tag = tag;
    }

    vec![SiteConfigWindows {
        always_on: config.always_on.unwrap_or_default(),
        app_command_line: text(&config.app_command_line),
        default_documents: config.default_documents.clone().unwrap_or_default(),
        ftps_state: text(&config.ftps_state),
        health_check_path: text(&config.health_check_path),
        http2_enabled: config.http20_enabled.unwrap_or_default(),
        load_balancing_mode: text(&config.load_balancing_mode),
        managed_pipeline_mode: text(&config.managed_pipeline_mode),
        minimum_tls_version: text(&config.min_tls_version),
        remote_debugging: config.remote_debugging_enabled.unwrap_or_default(),
        remote_debugging_version: text(&config.remote_debugging_version),
        scm_type: text(&config.scm_type),
        use_32_bit_worker: config.use32_bit_worker_process.unwrap_or_default(),
        websockets_enabled: config.web_sockets_enabled.unwrap_or_default(),
        worker_count: config.number_of_workers.unwrap_or_default(),
        detailed_error_logging_enabled: config.detailed_error_logging_enabled.unwrap_or_default(),
        cors: flatten_cors(config.cors.as_ref()),
        ip_restriction: flatten_ip_restrictions(config.ip_security_restrictions.as_ref()),
        application_stack: if stack == ApplicationStackWindows::default() {
            Vec::new()
        } else {
            vec![stack]
        },
    }]
}

/// Decode a `linuxFxVersion` value such as `NODE|14-lts` or `DOCKER|nginx:latest`
pub fn decode_linux_fx_version(fx_version: &str) -> Option<ApplicationStackLinux> {
    let (stack, version) = fx_version.split_once('|')?;
    let version = version.to_string();
    let mut decoded = ApplicationStackLinux::default();

    match stack.to_ascii_uppercase().as_str() {
        "DOCKER" => {
            // a registry port also contains ':', so only split on one after the last '/'
            let (image, tag) = match version.rsplit_once(':') {
                Some((image, tag)) if !tag.contains('/') => (image.to_string(), tag.to_string()),
                _ => (version, String::new()),
            };
            decoded.docker_image = image;
            decoded.docker_image_tag = tag;
        }
        "DOTNETCORE" | "DOTNET" => decoded.dotnet_version = version,
        "NODE" => decoded.node_version = version,
        "PYTHON" => decoded.python_version = version,
        "PHP" => decoded.php_version = version,
        "RUBY" => decoded.ruby_version = version,
        server @ ("JAVA" | "TOMCAT" | "JBOSSEAP") => {
            let (server_version, java_version) = version
                .split_once('-')
                .map(|(s, j)| (s.to_string(), j.to_string()))
                .unwrap_or((version, String::new()));
            decoded.java_server = server.to_string();
            decoded.java_server_version = server_version;
            decoded.java_version = java_version;
        }
        _ => return None,
    }
    Some(decoded)
}

pub fn flatten_site_config_linux(input: Option<&SiteConfig>) -> Vec<SiteConfigLinux> {
    let Some(config) = input else {
        return Vec::new();
    };
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let linux_fx_version = text(&config.linux_fx_version);

    vec![SiteConfigLinux {
        always_on: config.always_on.unwrap_or_default(),
        app_command_line: text(&config.app_command_line),
        default_documents: config.default_documents.clone().unwrap_or_default(),
        ftps_state: text(&config.ftps_state),
        health_check_path: text(&config.health_check_path),
        http2_enabled: config.http20_enabled.unwrap_or_default(),
        application_stack: decode_linux_fx_version(&linux_fx_version)
            .into_iter()
            .collect(),
        linux_fx_version,
        load_balancing_mode: text(&config.load_balancing_mode),
        managed_pipeline_mode: text(&config.managed_pipeline_mode),
        minimum_tls_version: text(&config.min_tls_version),
        remote_debugging: config.remote_debugging_enabled.unwrap_or_default(),
        remote_debugging_version: text(&config.remote_debugging_version),
        scm_type: text(&config.scm_type),
        use_32_bit_worker: config.use32_bit_worker_process.unwrap_or_default(),
        websockets_enabled: config.web_sockets_enabled.unwrap_or_default(),
        worker_count: config.number_of_workers.unwrap_or_default(),
        detailed_error_logging_enabled: config.detailed_error_logging_enabled.unwrap_or_default(),
        cors: flatten_cors(config.cors.as_ref()),
        ip_restriction: flatten_ip_restrictions(config.ip_security_restrictions.as_ref()),
    }]
}
