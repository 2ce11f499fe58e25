//! Drives terraform through the steps of an acceptance test

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;

use appservice_core::provider::ProviderError;
use appservice_provider::{Clients, ProviderConfig};
use async_trait::async_trait;
use regex::Regex;
use tempfile::TempDir;
use tokio::process::Command;

use crate::check::CheckContext;
use crate::data::TestData;
use crate::error::{HarnessError, HarnessResult};
use crate::state::{InstanceState, StateFile};
use crate::step::TestStep;

pub const ACCEPTANCE_ENV: &str = "TF_ACC";
pub const TERRAFORM_PATH_ENV: &str = "TF_ACC_TERRAFORM_PATH";

/// A resource type an acceptance test can look up in the remote API
#[async_trait]
pub trait TestResource: Send + Sync {
    /// `Some(true)` when the object behind `state` exists
    async fn exists(&self, clients: &Clients, state: &InstanceState) -> Result<Option<bool>, ProviderError>;
}

/// Whether acceptance tests should run for this value of `TF_ACC`
pub fn acceptance_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v != "0")
}

/// A terraform working directory
pub struct Terraform {
    binary: PathBuf,
    dir: TempDir,
    initialized: bool,
}

impl Terraform {
    pub fn new() -> HarnessResult<Self> {
        let binary = std::env::var_os(TERRAFORM_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("terraform"));
        Self::with_binary(binary)
    }

    pub fn with_binary(binary: PathBuf) -> HarnessResult<Self> {
        let dir = tempfile::Builder::new().prefix("acctest").tempdir()?;
        Ok(Self {
            binary,
            dir,
            initialized: false,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub async fn write_config(&self, config: &str) -> HarnessResult<()> {
        tokio::fs::write(self.dir().join("main.tf"), config).await?;
        Ok(())
    }

    pub fn state(&self) -> HarnessResult<Option<StateFile>> {
        StateFile::load(self.dir())
    }

    async fn output(&self, args: &[&str]) -> HarnessResult<Output> {
        log::debug!("running terraform {} in {}", args.join(" "), self.dir().display());
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(self.dir())
            .env("TF_IN_AUTOMATION", "1")
            .output()
            .await?;
        Ok(output)
    }

    async fn run(&self, args: &[&str]) -> HarnessResult<()> {
        let output = self.output(args).await?;
        if output.status.success() {
            return Ok(());
        }
        Err(HarnessError::Terraform {
            command: args.first().copied().unwrap_or_default().to_string(),
            stderr: normalize_diagnostics(&String::from_utf8_lossy(&output.stderr)),
        })
    }

    pub async fn init(&mut self) -> HarnessResult<()> {
        if self.initialized {
            return Ok(());
        }
        self.run(&["init", "-input=false", "-no-color"]).await?;
        self.initialized = true;
        Ok(())
    }

    pub async fn apply(&self) -> HarnessResult<()> {
        self.run(&["apply", "-auto-approve", "-input=false", "-no-color"]).await
    }

    /// `true` when a fresh plan has nothing to change
    pub async fn plan_is_empty(&self) -> HarnessResult<bool> {
        let output = self
            .output(&["plan", "-detailed-exitcode", "-input=false", "-no-color"])
            .await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(2) => Ok(false),
            _ => Err(HarnessError::Terraform {
                command: "plan".to_string(),
                stderr: normalize_diagnostics(&String::from_utf8_lossy(&output.stderr)),
            }),
        }
    }

    pub async fn import(&self, address: &str, id: &str) -> HarnessResult<()> {
        self.run(&["import", "-input=false", "-no-color", address, id]).await
    }

    pub async fn destroy(&self) -> HarnessResult<()> {
        self.run(&["destroy", "-auto-approve", "-input=false", "-no-color"]).await
    }
}

/// Collapse terraform's boxed, wrapped diagnostics into one line per run
fn normalize_diagnostics(stderr: &str) -> String {
    stderr
        .lines()
        .map(|line| line.trim_start_matches(['│', '╷', '╵', ' ']))
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

impl TestData {
    /// Run `steps` against real infrastructure, then destroy everything and
    /// check that no instance of the resource under test survived.
    ///
    /// Does nothing unless `TF_ACC` is set.
    pub async fn resource_test<R>(&self, resource: R, steps: Vec<TestStep>) -> HarnessResult<()>
    where
        R: TestResource + 'static,
    {
        if !acceptance_enabled(std::env::var(ACCEPTANCE_ENV).ok().as_deref()) {
            log::info!(
                "skipping acceptance test for {}: set {} to run it",
                self.resource_name,
                ACCEPTANCE_ENV
            );
            return Ok(());
        }

        let clients = Clients::from_config(&ProviderConfig::from_env()?)?;
        let resource: Arc<dyn TestResource> = Arc::new(resource);
        let mut terraform = Terraform::new()?;

        let outcome = self.run_steps(&mut terraform, &clients, &steps).await;

        // Destroy even when a step failed, then report the step failure first
        let destroyed = self.destroy(&terraform, &clients, resource.as_ref()).await;
        outcome.and(destroyed)
    }

    async fn run_steps(&self, terraform: &mut Terraform, clients: &Clients, steps: &[TestStep]) -> HarnessResult<()> {
        let mut last_config: Option<&str> = None;
        for (i, step) in steps.iter().enumerate() {
            let number = i + 1;
            log::info!("{}: step {}/{}", self.resource_name, number, steps.len());

            if step.import_state {
                let config = last_config.ok_or_else(|| {
                    HarnessError::MissingInstance(format!("step {}: config to import into", number))
                })?;
                self.run_import_step(terraform, config, step).await?;
                continue;
            }

            let Some(config) = step.config.as_deref() else {
                continue;
            };
            terraform.write_config(config).await?;
            terraform.init().await?;

            let applied = terraform.apply().await;
            if let Some(pattern) = &step.expect_error {
                let re = Regex::new(pattern).map_err(|e| {
                    HarnessError::CheckFailed(format!("step {}: invalid expect_error pattern: {}", number, e))
                })?;
                match applied {
                    Ok(()) => {
                        return Err(HarnessError::ExpectedError {
                            step: number,
                            pattern: pattern.clone(),
                        });
                    }
                    Err(HarnessError::Terraform { stderr, .. }) if re.is_match(&stderr) => continue,
                    Err(HarnessError::Terraform { stderr, .. }) => {
                        return Err(HarnessError::UnexpectedError {
                            step: number,
                            pattern: pattern.clone(),
                            stderr,
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
            applied?;
            last_config = Some(config);

            let state = terraform.state()?.unwrap_or_default();
            let ctx = CheckContext {
                state: &state,
                clients: Some(clients),
            };
            for check in &step.checks {
                check.check(&ctx).await?;
            }

            if !terraform.plan_is_empty().await? {
                return Err(HarnessError::NonEmptyPlan { step: number });
            }
        }
        Ok(())
    }

    async fn run_import_step(&self, applied: &Terraform, config: &str, step: &TestStep) -> HarnessResult<()> {
        let address = step.resource_name.as_deref().unwrap_or(&self.resource_name);
        let expected = applied
            .state()?
            .and_then(|s| s.instance(address))
            .ok_or_else(|| HarnessError::MissingInstance(address.to_string()))?;

        let mut scratch = Terraform::with_binary(applied.binary.clone())?;
        scratch.write_config(config).await?;
        scratch.init().await?;
        scratch.import(address, &expected.id).await?;

        if !step.import_state_verify {
            return Ok(());
        }
        let imported = scratch
            .state()?
            .and_then(|s| s.instance(address))
            .ok_or_else(|| HarnessError::MissingInstance(address.to_string()))?;

        let differences = import_differences(&expected, &imported, &step.import_state_verify_ignore);
        if differences.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::ImportMismatch {
                address: address.to_string(),
                differences,
            })
        }
    }

    async fn destroy(&self, terraform: &Terraform, clients: &Clients, resource: &dyn TestResource) -> HarnessResult<()> {
        let Some(state) = terraform.state()? else {
            return Ok(());
        };
        let instances = state.instances_of(&self.resource_type);

        terraform.destroy().await?;

        for instance in &instances {
            destroyed_verdict(&instance.address, resource.exists(clients, instance).await)?;
        }
        Ok(())
    }
}

/// A failed lookup counts as gone; a lookup must answer one way or the other
fn destroyed_verdict(address: &str, result: Result<Option<bool>, ProviderError>) -> HarnessResult<()> {
    match result {
        Err(e) => {
            log::debug!("{} treated as destroyed: {}", address, e);
            Ok(())
        }
        Ok(Some(false)) => Ok(()),
        Ok(Some(true)) => Err(HarnessError::NotDestroyed(address.to_string())),
        Ok(None) => Err(HarnessError::CheckFailed(format!(
            "should have either an error or a result when checking if {:?} has been destroyed",
            address
        ))),
    }
}

/// Keys whose values differ, ignoring `timeouts` and any ignored prefix
fn import_differences(expected: &InstanceState, imported: &InstanceState, ignore: &[String]) -> Vec<String> {
    let skipped = |key: &str| {
        key.starts_with("timeouts") || ignore.iter().any(|prefix| key.starts_with(prefix.as_str()))
    };
    let keys: BTreeSet<&String> = expected.attributes.keys().chain(imported.attributes.keys()).collect();
    keys.into_iter()
        .filter(|key| !skipped(key))
        .filter(|key| expected.attributes.get(*key) != imported.attributes.get(*key))
        .map(|key| {
            format!(
                "{}: {:?} != {:?}",
                key,
                expected.attributes.get(key).map(String::as_str).unwrap_or_default(),
                imported.attributes.get(key).map(String::as_str).unwrap_or_default()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn instance(pairs: &[(&str, serde_json::Value)]) -> InstanceState {
        let attributes: HashMap<String, serde_json::Value> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        InstanceState::new("azurerm_windows_web_app.test", "azurerm_windows_web_app", &attributes)
    }

    #[test]
    fn test_acceptance_enabled() {
        assert!(!acceptance_enabled(None));
        assert!(!acceptance_enabled(Some("")));
        assert!(!acceptance_enabled(Some("0")));
        assert!(acceptance_enabled(Some("1")));
        assert!(acceptance_enabled(Some("true")));
    }

    #[test]
    fn test_destroyed_verdict() {
        let addr = "azurerm_video_analyzer_edge_module.test";
        assert!(destroyed_verdict(addr, Ok(Some(false))).is_ok());
        assert!(destroyed_verdict(addr, Err(ProviderError::not_found("gone"))).is_ok());
        assert!(matches!(
            destroyed_verdict(addr, Ok(Some(true))),
            Err(HarnessError::NotDestroyed(a)) if a == addr
        ));
        assert!(matches!(destroyed_verdict(addr, Ok(None)), Err(HarnessError::CheckFailed(_))));
    }

    #[test]
    fn test_import_differences() {
        let expected = instance(&[
            ("id", serde_json::json!("/x")),
            ("app_settings", serde_json::json!({"A": "1"})),
            ("site_credential", serde_json::json!([{"password": "secret"}])),
            ("timeouts", serde_json::json!({"create": "30m"})),
        ]);
        let imported = instance(&[
            ("id", serde_json::json!("/x")),
            ("app_settings", serde_json::json!({"A": "2"})),
            ("site_credential", serde_json::json!([{"password": "other"}])),
        ]);

        let differences = import_differences(&expected, &imported, &["site_credential".to_string()]);
        assert_eq!(differences, vec!["app_settings.A: \"1\" != \"2\"".to_string()]);
    }

    #[test]
    fn test_normalize_diagnostics() {
        let stderr = "╷\n│ Error: A resource with the ID \"/x\" already exists - to be managed via\n│ Terraform this resource needs to be imported into the State.\n╵\n";
        assert_eq!(
            normalize_diagnostics(stderr),
            "Error: A resource with the ID \"/x\" already exists - to be managed via Terraform this resource needs to be imported into the State."
        );
    }

    #[tokio::test]
    async fn test_resource_test_is_skipped_without_tf_acc() {
        struct Never;

        #[async_trait]
        impl TestResource for Never {
            async fn exists(&self, _: &Clients, _: &InstanceState) -> Result<Option<bool>, ProviderError> {
                panic!("no lookup expected when acceptance tests are off");
            }
        }

        if acceptance_enabled(std::env::var(ACCEPTANCE_ENV).ok().as_deref()) {
            return;
        }
        let data = TestData::build("azurerm_windows_web_app", "test");
        data.resource_test(Never, vec![TestStep::apply("# nothing")]).await.unwrap();
    }

    #[tokio::test]
    async fn test_import_step_needs_an_applied_instance() {
        let data = TestData::build("azurerm_windows_web_app", "test");
        let applied = Terraform::with_binary(PathBuf::from("terraform")).unwrap();

        let err = data
            .run_import_step(&applied, "# config", &data.import_step())
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::MissingInstance(a) if a == "azurerm_windows_web_app.test"));
    }

    #[tokio::test]
    async fn test_config_is_written_to_the_working_directory() {
        let terraform = Terraform::with_binary(PathBuf::from("terraform")).unwrap();
        terraform.write_config("resource \"x\" \"y\" {}").await.unwrap();
        let written = std::fs::read_to_string(terraform.dir().join("main.tf")).unwrap();
        assert_eq!(written, "resource \"x\" \"y\" {}");
        assert!(terraform.state().unwrap().is_none());
    }
}
