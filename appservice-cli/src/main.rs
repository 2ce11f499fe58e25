use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use appservice_core::host::Lifecycle;
use appservice_core::provider::{DataSource, Resource};
use appservice_core::resource::{AttributeMap, State, Value, attributes_from_json, attributes_to_json};
use appservice_core::schema::{AttributeSchema, ResourceSchema};
use appservice_provider::{Clients, ProviderConfig};

const DEFAULT_RESOURCE: &str = "azurerm_windows_web_app";
const DEFAULT_DATA_SOURCE: &str = "azurerm_linux_web_app";

#[derive(Parser)]
#[command(name = "appservice")]
#[command(about = "Manage Azure App Service web apps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the arguments and attributes of a resource or data source
    Schema {
        /// Resource type, e.g. azurerm_windows_web_app
        resource_type: String,

        /// Look the type up among data sources
        #[arg(long)]
        data_source: bool,
    },
    /// Create a resource from a JSON config and print its state
    Create {
        /// Path to a JSON object of arguments
        config: PathBuf,

        #[arg(long, default_value = DEFAULT_RESOURCE)]
        resource_type: String,
    },
    /// Read a resource by ID
    Read {
        id: String,

        #[arg(long, default_value = DEFAULT_RESOURCE)]
        resource_type: String,
    },
    /// Update an existing resource towards a JSON config
    Apply {
        id: String,

        /// Path to a JSON object of arguments
        config: PathBuf,

        #[arg(long, default_value = DEFAULT_RESOURCE)]
        resource_type: String,
    },
    /// Delete a resource by ID
    Destroy {
        id: String,

        #[arg(long, default_value = DEFAULT_RESOURCE)]
        resource_type: String,

        /// Skip confirmation prompt (auto-approve)
        #[arg(long)]
        auto_approve: bool,
    },
    /// Look up an existing Linux web app
    Lookup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        resource_group: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Schema {
            resource_type,
            data_source,
        } => run_schema(&resource_type, data_source),
        Commands::Create {
            config,
            resource_type,
        } => run_create(&resource_type, &config).await,
        Commands::Read { id, resource_type } => run_read(&resource_type, &id).await,
        Commands::Apply {
            id,
            config,
            resource_type,
        } => run_apply(&resource_type, &id, &config).await,
        Commands::Destroy {
            id,
            resource_type,
            auto_approve,
        } => run_destroy(&resource_type, &id, auto_approve).await,
        Commands::Lookup {
            name,
            resource_group,
        } => run_lookup(&name, &resource_group).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn get_resource(resource_type: &str) -> Result<Box<dyn Resource<Clients>>, String> {
    appservice_provider::resource(resource_type).ok_or_else(|| format!("Unknown resource type: {}", resource_type))
}

fn get_data_source(resource_type: &str) -> Result<Box<dyn DataSource<Clients>>, String> {
    appservice_provider::data_source(resource_type)
        .ok_or_else(|| format!("Unknown data source type: {}", resource_type))
}

fn get_host() -> Result<Lifecycle<Clients>, String> {
    let config = ProviderConfig::from_env().map_err(|e| e.to_string())?;
    let clients = Clients::from_config(&config).map_err(|e| e.to_string())?;
    Ok(Lifecycle::new(Arc::new(clients)))
}

fn load_config(path: &Path) -> Result<AttributeMap, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    if !json.is_object() {
        return Err(format!("{} must contain a JSON object", path.display()));
    }
    Ok(attributes_from_json(&json))
}

fn run_schema(resource_type: &str, data_source: bool) -> Result<(), String> {
    let (arguments, attributes, schema) = if data_source {
        let source = get_data_source(resource_type)?;
        (source.arguments(), source.attributes(), source.schema())
    } else {
        let resource = get_resource(resource_type)?;
        (resource.arguments(), resource.attributes(), resource.schema())
    };

    println!("{}", schema.resource_type.cyan().bold());
    print_attributes("Arguments", arguments);
    print_attributes("Attributes", attributes);
    Ok(())
}

fn print_attributes(title: &str, mut attributes: Vec<AttributeSchema>) {
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    println!();
    println!("{}", format!("{}:", title).bold());
    for attr in attributes {
        println!(
            "  {} {} {}",
            attr.name.green(),
            attr.attr_type.to_string().dimmed(),
            format!("({})", attr.flags()).yellow()
        );
    }
}

async fn run_create(resource_type: &str, config_path: &Path) -> Result<(), String> {
    let resource = get_resource(resource_type)?;
    let config = load_config(config_path)?;
    let host = get_host()?;

    println!("{}", "Creating...".green().bold());
    let state = host
        .create(resource.as_ref(), config)
        .await
        .map_err(|e| e.to_string())?;

    println!("{} {}", "✓".green(), state.id.as_deref().unwrap_or_default());
    print_state(&state, &resource.schema())
}

async fn run_read(resource_type: &str, id: &str) -> Result<(), String> {
    let resource = get_resource(resource_type)?;
    let host = get_host()?;

    match host.read(resource.as_ref(), id).await.map_err(|e| e.to_string())? {
        Some(state) => print_state(&state, &resource.schema()),
        None => {
            println!("{}", "resource gone".yellow());
            Ok(())
        }
    }
}

async fn run_apply(resource_type: &str, id: &str, config_path: &Path) -> Result<(), String> {
    let resource = get_resource(resource_type)?;
    let config = load_config(config_path)?;
    let host = get_host()?;
    let schema = resource.schema();

    let prior = host
        .read(resource.as_ref(), id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("{} no longer exists, create it instead", id))?;

    let mut desired = config.clone();
    schema.apply_defaults(&mut desired);
    print_diff(
        id,
        &render(&schema.comparable_arguments(&prior.attributes), &schema)?,
        &render(&schema.comparable_arguments(&desired), &schema)?,
    );

    println!("{}", "Applying...".green().bold());
    let state = host
        .update(resource.as_ref(), id, prior.attributes, config)
        .await
        .map_err(|e| e.to_string())?;

    println!("{} {}", "✓".green(), id);
    print_state(&state, &schema)
}

async fn run_destroy(resource_type: &str, id: &str, auto_approve: bool) -> Result<(), String> {
    let resource = get_resource(resource_type)?;
    let host = get_host()?;

    if host
        .read(resource.as_ref(), id)
        .await
        .map_err(|e| e.to_string())?
        .is_none()
    {
        println!("{}", "No resources to destroy.".green());
        return Ok(());
    }

    println!("{}", "Destroy Plan:".red().bold());
    println!();
    println!("  {} {}", "-".red().bold(), id);
    println!();

    // Confirmation prompt
    if !auto_approve {
        println!("{}", "Do you really want to destroy this resource?".yellow().bold());
        println!("  {}", "This action cannot be undone. Type 'yes' to confirm.".yellow());
        print!("\n  Enter a value: ");
        std::io::Write::flush(&mut std::io::stdout()).map_err(|e| e.to_string())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input).map_err(|e| e.to_string())?;

        if input.trim() != "yes" {
            println!();
            println!("{}", "Destroy cancelled.".yellow());
            return Ok(());
        }
        println!();
    }

    host.delete(resource.as_ref(), id).await.map_err(|e| e.to_string())?;
    println!("  {} {}", "✓".green(), id);
    Ok(())
}

async fn run_lookup(name: &str, resource_group: &str) -> Result<(), String> {
    let source = get_data_source(DEFAULT_DATA_SOURCE)?;
    let host = get_host()?;

    let config = AttributeMap::from([
        ("name".to_string(), Value::String(name.to_string())),
        ("resource_group_name".to_string(), Value::String(resource_group.to_string())),
    ]);
    let state = host
        .read_data_source(source.as_ref(), config)
        .await
        .map_err(|e| e.to_string())?;
    print_state(&state, &source.schema())
}

/// Pretty JSON with top-level sensitive attributes masked
fn render(attributes: &AttributeMap, schema: &ResourceSchema) -> Result<String, String> {
    let mut json = attributes_to_json(attributes);
    if let serde_json::Value::Object(map) = &mut json {
        for (key, value) in map.iter_mut() {
            if schema.attributes.get(key).is_some_and(|a| a.sensitive) {
                *value = serde_json::Value::String("(sensitive)".to_string());
            }
        }
    }
    serde_json::to_string_pretty(&json).map_err(|e| e.to_string())
}

fn print_state(state: &State, schema: &ResourceSchema) -> Result<(), String> {
    if let Some(id) = &state.id {
        println!("{} {}", "id:".bold(), id);
    }
    println!("{}", render(&state.attributes, schema)?);
    Ok(())
}

fn print_diff(id: &str, prior: &str, desired: &str) {
    println!("\n{} {}:", "Diff for".cyan().bold(), id);

    let diff = TextDiff::from_lines(prior, desired);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use appservice_core::schema::AttributeType;

    fn schema() -> ResourceSchema {
        ResourceSchema::new("azurerm_windows_web_app").with_attributes([
            AttributeSchema::new("name", AttributeType::String).required(),
            AttributeSchema::new("custom_domain_verification_id", AttributeType::String)
                .computed()
                .sensitive(),
            AttributeSchema::new("default_hostname", AttributeType::String).computed(),
        ])
    }

    fn attrs() -> AttributeMap {
        AttributeMap::from([
            ("name".to_string(), Value::String("app1".to_string())),
            (
                "custom_domain_verification_id".to_string(),
                Value::String("7F2A9C".to_string()),
            ),
            (
                "default_hostname".to_string(),
                Value::String("app1.azurewebsites.net".to_string()),
            ),
        ])
    }

    #[test]
    fn test_render_masks_sensitive_attributes() {
        let rendered = render(&attrs(), &schema()).unwrap();
        assert!(rendered.contains("\"custom_domain_verification_id\": \"(sensitive)\""));
        assert!(!rendered.contains("7F2A9C"));
        assert!(rendered.contains("app1.azurewebsites.net"));
    }

    #[test]
    fn test_diff_compares_arguments_only() {
        let prior = render(&schema().comparable_arguments(&attrs()), &schema()).unwrap();
        let desired = AttributeMap::from([("name".to_string(), Value::String("app1".to_string()))]);
        assert_eq!(prior, render(&schema().comparable_arguments(&desired), &schema()).unwrap());
    }

    #[test]
    fn test_load_config_requires_an_object() {
        let dir = tempfile::tempdir().unwrap();

        let object = dir.path().join("object.json");
        fs::write(&object, r#"{"name": "app1", "https_only": true}"#).unwrap();
        let config = load_config(&object).unwrap();
        assert_eq!(config.get("https_only"), Some(&Value::Bool(true)));

        let list = dir.path().join("list.json");
        fs::write(&list, "[1, 2]").unwrap();
        assert!(load_config(&list).unwrap_err().contains("must contain a JSON object"));
    }

    #[test]
    fn test_unknown_types_are_reported() {
        assert!(get_resource("azurerm_linux_web_app").is_err());
        assert!(get_data_source("azurerm_linux_web_app").is_ok());
    }
}
