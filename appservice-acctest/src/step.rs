//! Test steps

use crate::check::Check;

/// One step of an acceptance test: either apply a config or import a resource
#[derive(Default)]
pub struct TestStep {
    pub config: Option<String>,
    /// Run after a successful apply, aggregated
    pub checks: Vec<Box<dyn Check>>,
    /// Regex the apply's error output must match; the apply must fail
    pub expect_error: Option<String>,
    pub import_state: bool,
    pub import_state_verify: bool,
    /// Attribute prefixes left out of the import comparison
    pub import_state_verify_ignore: Vec<String>,
    /// Address to import, e.g. `azurerm_windows_web_app.test`
    pub resource_name: Option<String>,
}

impl TestStep {
    pub fn apply(config: impl Into<String>) -> Self {
        Self {
            config: Some(config.into()),
            ..Default::default()
        }
    }

    pub fn import(resource_name: impl Into<String>) -> Self {
        Self {
            import_state: true,
            import_state_verify: true,
            resource_name: Some(resource_name.into()),
            ..Default::default()
        }
    }

    pub fn with_check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn with_expect_error(mut self, pattern: impl Into<String>) -> Self {
        self.expect_error = Some(pattern.into());
        self
    }

    pub fn ignoring(mut self, keys: &[&str]) -> Self {
        self.import_state_verify_ignore
            .extend(keys.iter().map(|k| k.to_string()));
        self
    }
}
