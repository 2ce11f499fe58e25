//! App Service Acceptance Tests
//!
//! A small harness for acceptance tests that run terraform against real
//! infrastructure.
//!
//! # Overview
//!
//! - **TestData**: random name parts and locations for one test
//! - **TestStep**: apply a config, expect an error, or import a resource
//! - **Check**: assertions run against the state after an apply
//! - **TestResource**: how a test looks up its resource in the remote API
//!
//! # Example
//!
//! ```ignore
//! let data = TestData::build("azurerm_video_analyzer_edge_module", "test");
//!
//! data.resource_test(VideoAnalyzerEdgeModuleResource, vec![
//!     TestStep::apply(basic(&data)).with_check(compose_aggregate_test_check_func(vec![])),
//!     data.import_step(),
//! ])
//! .await?;
//! ```
//!
//! Tests are skipped unless `TF_ACC` is set.

pub mod check;
pub mod data;
pub mod error;
pub mod runner;
pub mod state;
pub mod step;

// Re-export main types for convenience
pub use check::{Check, CheckContext, check_exists, check_resource_attr, compose_aggregate_test_check_func};
pub use data::{Locations, TestData};
pub use error::{HarnessError, HarnessResult};
pub use runner::{TestResource, Terraform};
pub use state::{InstanceState, StateFile};
pub use step::TestStep;
