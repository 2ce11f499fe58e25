//! Post-apply checks against the state and the live API

use std::sync::Arc;

use appservice_provider::Clients;
use async_trait::async_trait;

use crate::error::{HarnessError, HarnessResult};
use crate::runner::TestResource;
use crate::state::StateFile;

/// What a check can look at after an apply
pub struct CheckContext<'a> {
    pub state: &'a StateFile,
    /// `None` when a check runs outside an acceptance run
    pub clients: Option<&'a Clients>,
}

#[async_trait]
pub trait Check: Send + Sync {
    async fn check(&self, ctx: &CheckContext<'_>) -> HarnessResult<()>;
}

/// Runs every check and reports all failures together
pub struct Aggregate(Vec<Box<dyn Check>>);

pub fn compose_aggregate_test_check_func(checks: Vec<Box<dyn Check>>) -> Aggregate {
    Aggregate(checks)
}

#[async_trait]
impl Check for Aggregate {
    async fn check(&self, ctx: &CheckContext<'_>) -> HarnessResult<()> {
        let mut failures = Vec::new();
        for (i, check) in self.0.iter().enumerate() {
            if let Err(e) = check.check(ctx).await {
                failures.push(format!("check {}/{} error: {}", i + 1, self.0.len(), e));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::CheckFailed(failures.join("\n")))
        }
    }
}

pub struct ResourceAttr {
    name: String,
    key: String,
    value: String,
}

/// The flattened attribute `key` of instance `name` equals `value`
pub fn check_resource_attr(name: &str, key: &str, value: &str) -> ResourceAttr {
    ResourceAttr {
        name: name.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[async_trait]
impl Check for ResourceAttr {
    async fn check(&self, ctx: &CheckContext<'_>) -> HarnessResult<()> {
        let instance = ctx
            .state
            .instance(&self.name)
            .ok_or_else(|| HarnessError::MissingInstance(self.name.clone()))?;
        match instance.attributes.get(&self.key) {
            Some(actual) if *actual == self.value => Ok(()),
            Some(actual) => Err(HarnessError::CheckFailed(format!(
                "{}: attribute {:?} expected {:?}, got {:?}",
                self.name, self.key, self.value, actual
            ))),
            None => Err(HarnessError::CheckFailed(format!(
                "{}: attribute {:?} not found",
                self.name, self.key
            ))),
        }
    }
}

pub struct Exists {
    name: String,
    resource: Arc<dyn TestResource>,
}

/// Instance `name` exists in the remote API
pub fn check_exists(name: &str, resource: Arc<dyn TestResource>) -> Exists {
    Exists {
        name: name.to_string(),
        resource,
    }
}

#[async_trait]
impl Check for Exists {
    async fn check(&self, ctx: &CheckContext<'_>) -> HarnessResult<()> {
        let instance = ctx
            .state
            .instance(&self.name)
            .ok_or_else(|| HarnessError::MissingInstance(self.name.clone()))?;
        let clients = ctx
            .clients
            .ok_or_else(|| HarnessError::CheckFailed(format!("{}: no API clients to check with", self.name)))?;
        match self.resource.exists(clients, &instance).await? {
            Some(true) => Ok(()),
            _ => Err(HarnessError::CheckFailed(format!("{} did not exist", self.name))),
        }
    }
}
