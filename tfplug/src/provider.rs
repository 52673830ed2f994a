//! Provider trait and the resource registry it produces
//!
//! Configuration yields an explicit `Registry`: a table from type name to
//! handler, built once and then only borrowed. There is no global plugin
//! table.

use crate::context::Context;
use crate::data_source::DataSource;
use crate::error::{Result, TfplugError};
use crate::resource::Resource;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Prefix shared by all resource and data source type names
    fn type_name(&self) -> &str;

    fn schema(&self) -> Schema;

    /// Validate the provider block and build the handler registry
    async fn configure(
        &self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;
}

#[derive(Debug, Clone)]
pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    /// `None` whenever diagnostics contain an error
    pub registry: Option<Registry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Immutable table of resource and data source handlers
#[derive(Clone, Default)]
pub struct Registry {
    resources: BTreeMap<String, Arc<dyn Resource>>,
    data_sources: BTreeMap<String, Arc<dyn DataSource>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn Resource> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()))
    }

    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSource> {
        self.data_sources
            .get(type_name)
            .map(|d| d.as_ref())
            .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }

    /// Schemas keyed by type name, as Terraform requests them
    pub fn resource_schemas(&self) -> BTreeMap<String, Schema> {
        self.resources
            .iter()
            .map(|(name, r)| (name.clone(), r.schema()))
            .collect()
    }

    pub fn data_source_schemas(&self) -> BTreeMap<String, Schema> {
        self.data_sources
            .iter()
            .map(|(name, d)| (name.clone(), d.schema()))
            .collect()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    resources: BTreeMap<String, Arc<dyn Resource>>,
    data_sources: BTreeMap<String, Arc<dyn DataSource>>,
}

impl RegistryBuilder {
    /// Registers under `resource.type_name()`; a later registration replaces an earlier one
    pub fn resource(mut self, resource: impl Resource + 'static) -> Self {
        self.resources
            .insert(resource.type_name().to_string(), Arc::new(resource));
        self
    }

    pub fn data_source(mut self, data_source: impl DataSource + 'static) -> Self {
        self.data_sources
            .insert(data_source.type_name().to_string(), Arc::new(data_source));
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            resources: self.resources,
            data_sources: self.data_sources,
        }
    }
}
