//! Host - Invoke resource drivers for single lifecycle events
//!
//! A minimal stand-in for the plugin host: validates config against the schema,
//! builds the metadata for the event, enforces the per-operation timeout, and
//! follows create/update with a read so callers always get fresh state back.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::metadata::ResourceMetaData;
use crate::provider::{DataSource, ProviderError, ProviderResult, Resource};
use crate::resource::{AttributeMap, State};
use crate::schema::ResourceSchema;

pub struct Lifecycle<C> {
    client: Arc<C>,
}

impl<C: Send + Sync> Lifecycle<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Create the resource, then read it back
    pub async fn create<R>(&self, resource: &R, config: AttributeMap) -> ProviderResult<State>
    where
        R: Resource<C> + ?Sized,
    {
        let schema = resource.schema();
        validate_config(&schema, &config)?;

        let mut metadata = ResourceMetaData::new(self.client.clone(), schema).with_config(config);
        let timeouts = resource.timeouts();
        with_timeout("create", timeouts.create, resource.create(&mut metadata)).await?;

        let id = metadata.id().map(str::to_string).ok_or_else(|| {
            ProviderError::new(format!(
                "{} create completed without setting an ID",
                resource.resource_type()
            ))
        })?;

        self.read(resource, &id).await?.ok_or_else(|| {
            ProviderError::not_found(format!("{} disappeared after create", id)).for_resource(id)
        })
    }

    /// Read the resource; `None` means it no longer exists remotely
    pub async fn read<R>(&self, resource: &R, id: &str) -> ProviderResult<Option<State>>
    where
        R: Resource<C> + ?Sized,
    {
        validate_id::<C, R>(resource, id)?;

        let mut metadata =
            ResourceMetaData::new(self.client.clone(), resource.schema()).with_id(id);
        with_timeout("read", resource.timeouts().read, resource.read(&mut metadata)).await?;

        if metadata.is_gone() {
            return Ok(None);
        }
        Ok(Some(metadata.into_state()))
    }

    /// Update the resource from `prior` towards `config`, then read it back
    pub async fn update<R>(
        &self,
        resource: &R,
        id: &str,
        prior: AttributeMap,
        config: AttributeMap,
    ) -> ProviderResult<State>
    where
        R: Resource<C> + ?Sized,
    {
        validate_id::<C, R>(resource, id)?;
        let schema = resource.schema();
        validate_config(&schema, &config)?;

        let mut metadata = ResourceMetaData::new(self.client.clone(), schema)
            .with_config(config)
            .with_prior_state(prior)
            .with_id(id);
        log::debug!("updating {} (changed: {:?})", id, metadata.changes());
        with_timeout(
            "update",
            resource.timeouts().update,
            resource.update(&mut metadata),
        )
        .await?;

        self.read(resource, id).await?.ok_or_else(|| {
            ProviderError::not_found(format!("{} disappeared after update", id)).for_resource(id)
        })
    }

    pub async fn delete<R>(&self, resource: &R, id: &str) -> ProviderResult<()>
    where
        R: Resource<C> + ?Sized,
    {
        validate_id::<C, R>(resource, id)?;

        let mut metadata =
            ResourceMetaData::new(self.client.clone(), resource.schema()).with_id(id);
        with_timeout(
            "delete",
            resource.timeouts().delete,
            resource.delete(&mut metadata),
        )
        .await
    }

    /// Look up a data source
    pub async fn read_data_source<D>(&self, source: &D, config: AttributeMap) -> ProviderResult<State>
    where
        D: DataSource<C> + ?Sized,
    {
        let schema = source.schema();
        validate_config(&schema, &config)?;

        let mut metadata = ResourceMetaData::new(self.client.clone(), schema).with_config(config);
        with_timeout("read", source.read_timeout(), source.read(&mut metadata)).await?;
        Ok(metadata.into_state())
    }
}

fn validate_config(schema: &ResourceSchema, config: &AttributeMap) -> ProviderResult<()> {
    schema.validate(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        ProviderError::invalid_argument(format!(
            "invalid config for {}: {}",
            schema.resource_type,
            messages.join("; ")
        ))
    })
}

fn validate_id<C, R>(resource: &R, id: &str) -> ProviderResult<()>
where
    C: Send + Sync,
    R: Resource<C> + ?Sized,
{
    resource.validate_id(id).map_err(|msg| {
        ProviderError::invalid_argument(format!("parsing ID {:?}: {}", id, msg)).for_resource(id)
    })
}

async fn with_timeout<T>(
    operation: &str,
    budget: Duration,
    fut: impl Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::timeout(operation, budget)),
    }
}
