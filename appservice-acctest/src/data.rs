//! Per-test data: random name parts and locations

use chrono::Local;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::step::TestStep;

pub const LOCATION_ENV: &str = "ARM_TEST_LOCATION";
pub const LOCATION_ALT_ENV: &str = "ARM_TEST_LOCATION_ALT";

const DEFAULT_LOCATION: &str = "westeurope";
const DEFAULT_LOCATION_ALT: &str = "northeurope";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    pub primary: String,
    pub secondary: String,
}

impl Locations {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            primary: get(LOCATION_ENV, DEFAULT_LOCATION),
            secondary: get(LOCATION_ALT_ENV, DEFAULT_LOCATION_ALT),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestData {
    /// Date-prefixed number, unique enough to keep parallel runs apart
    pub random_integer: i64,
    /// Five lowercase alphanumerics, for names with tight length limits
    pub random_string: String,
    pub locations: Locations,
    pub resource_type: String,
    pub resource_label: String,
    /// `<resource_type>.<resource_label>`
    pub resource_name: String,
}

impl TestData {
    pub fn build(resource_type: &str, resource_label: &str) -> Self {
        Self {
            random_integer: random_time_int(),
            random_string: random_string(5),
            locations: Locations::from_env(),
            resource_type: resource_type.to_string(),
            resource_label: resource_label.to_string(),
            resource_name: format!("{}.{}", resource_type, resource_label),
        }
    }

    /// Import the resource under test and compare it with the applied state
    pub fn import_step(&self) -> TestStep {
        TestStep::import(&self.resource_name)
    }

    /// Apply `config_fn`'s config, which duplicates the resource under test,
    /// and expect the requires-import error
    pub fn requires_import_error_step(&self, config_fn: impl FnOnce(&TestData) -> String) -> TestStep {
        TestStep::apply(config_fn(self)).with_expect_error(requires_import_error(&self.resource_type))
    }
}

/// Pattern for the error a create raises when the object already exists
pub fn requires_import_error(resource_type: &str) -> String {
    regex::escape(&format!(
        "to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for {:?} for more information.",
        resource_type
    ))
}

fn random_time_int() -> i64 {
    let suffix: u8 = rand::thread_rng().gen_range(0..100);
    let digits = format!("{}{:02}", Local::now().format("%y%m%d%H%M"), suffix);
    digits.parse().unwrap_or_default()
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
