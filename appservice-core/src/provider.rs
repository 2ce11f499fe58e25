//! Provider - Traits abstracting resource lifecycle operations
//!
//! A resource driver declares its schema and implements create/read/update/delete
//! against a client bundle `C`. A data source only declares a schema and a read.
//! Drivers are stateless between invocations; everything they need arrives via
//! [`ResourceMetaData`].

use std::time::Duration;

use async_trait::async_trait;

use crate::metadata::ResourceMetaData;
use crate::schema::{AttributeSchema, ResourceSchema};

/// Classification of a driver failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Create found an object with the same ID
    AlreadyExists,
    /// The remote object does not exist
    NotFound,
    /// Config or ID failed validation, or the name is unavailable
    InvalidArgument,
    /// Any other remote API error
    RemoteFailure,
    /// A lifecycle event ran past its budget
    Timeout,
    /// Config or state could not be converted to or from the typed model
    Decode,
}

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub kind: ErrorKind,
    pub message: String,
    /// Composite ID of the resource the error concerns
    pub resource_id: Option<String>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}", self.message, cause),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    /// A remote failure with the given description
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::RemoteFailure,
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(ErrorKind::InvalidArgument)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(ErrorKind::NotFound)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(ErrorKind::Decode)
    }

    pub fn timeout(operation: &str, after: Duration) -> Self {
        Self::new(format!(
            "{} did not complete within {}s",
            operation,
            after.as_secs()
        ))
        .with_kind(ErrorKind::Timeout)
    }

    /// The import hint returned when create finds an existing object
    pub fn already_exists(resource_type: &str, id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(format!(
            "A resource with the ID {:?} already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for {:?} for more information.",
            id, resource_type
        ))
        .with_kind(ErrorKind::AlreadyExists)
        .for_resource(id)
    }

    pub fn for_resource(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Time budget for each lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

/// A managed resource driver
///
/// Each method is invoked at most once per lifecycle event by the host.
#[async_trait]
pub trait Resource<C: Send + Sync>: Send + Sync {
    /// Resource type name (e.g., "azurerm_windows_web_app")
    fn resource_type(&self) -> &'static str;

    /// Fields the user may set
    fn arguments(&self) -> Vec<AttributeSchema>;

    /// Fields reported back by the remote system only
    fn attributes(&self) -> Vec<AttributeSchema>;

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.resource_type())
            .with_attributes(self.arguments())
            .with_attributes(self.attributes())
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::default()
    }

    /// Check that an ID string is well-formed for this resource type
    fn validate_id(&self, id: &str) -> Result<(), String>;

    async fn create(&self, metadata: &mut ResourceMetaData<C>) -> ProviderResult<()>;

    /// Populate state from the remote object, or mark it gone
    async fn read(&self, metadata: &mut ResourceMetaData<C>) -> ProviderResult<()>;

    async fn update(&self, metadata: &mut ResourceMetaData<C>) -> ProviderResult<()>;

    async fn delete(&self, metadata: &mut ResourceMetaData<C>) -> ProviderResult<()>;
}

/// A read-only data source
#[async_trait]
pub trait DataSource<C: Send + Sync>: Send + Sync {
    fn resource_type(&self) -> &'static str;

    fn arguments(&self) -> Vec<AttributeSchema>;

    fn attributes(&self) -> Vec<AttributeSchema>;

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.resource_type())
            .with_attributes(self.arguments())
            .with_attributes(self.attributes())
    }

    fn read_timeout(&self) -> Duration {
        Timeouts::default().read
    }

    async fn read(&self, metadata: &mut ResourceMetaData<C>) -> ProviderResult<()>;
}
