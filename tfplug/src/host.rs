//! In-process dispatch of Terraform operations onto registered handlers
//!
//! `Host` borrows a configured `Registry`, applies schema defaults, runs
//! validation and only then invokes the handler inside a request span.
//! Configuration that fails validation never reaches a handler.

use crate::context::Context;
use crate::data_source::{ReadDataSourceRequest, ReadDataSourceResponse};
use crate::error::Result;
use crate::provider::Registry;
use crate::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ReadResourceRequest, ReadResourceResponse, UpdateResourceRequest,
    UpdateResourceResponse,
};
use crate::schema::Schema;
use crate::types::{has_errors, AttributePath, Diagnostic, DynamicValue};
use tracing::Instrument;

pub struct Host<'a> {
    registry: &'a Registry,
}

impl<'a> Host<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub async fn create(
        &self,
        type_name: &str,
        config: DynamicValue,
    ) -> Result<CreateResourceResponse> {
        let resource = self.registry.resource(type_name)?;
        let (config, diagnostics) = prepare(&resource.schema(), config);
        if has_errors(&diagnostics) {
            return Ok(CreateResourceResponse {
                new_state: config,
                diagnostics,
            });
        }

        let ctx = Context::for_operation("create");
        let request = CreateResourceRequest {
            type_name: type_name.to_string(),
            planned_state: config.clone(),
            config,
        };
        Ok(resource.create(ctx.clone(), request).instrument(ctx.span()).await)
    }

    pub async fn read(&self, type_name: &str, state: DynamicValue) -> Result<ReadResourceResponse> {
        let resource = self.registry.resource(type_name)?;
        let ctx = Context::for_operation("read");
        let request = ReadResourceRequest {
            type_name: type_name.to_string(),
            current_state: state,
        };
        Ok(resource.read(ctx.clone(), request).instrument(ctx.span()).await)
    }

    pub async fn update(
        &self,
        type_name: &str,
        prior_state: DynamicValue,
        config: DynamicValue,
    ) -> Result<UpdateResourceResponse> {
        let resource = self.registry.resource(type_name)?;
        let schema = resource.schema();
        let (config, mut diagnostics) = prepare(&schema, config);
        diagnostics.extend(
            schema
                .replacement_paths(&prior_state, &config)
                .into_iter()
                .map(replacement_required),
        );
        if has_errors(&diagnostics) {
            return Ok(UpdateResourceResponse {
                new_state: prior_state,
                diagnostics,
            });
        }

        let ctx = Context::for_operation("update");
        let request = UpdateResourceRequest {
            type_name: type_name.to_string(),
            prior_state,
            planned_state: config.clone(),
            config,
        };
        Ok(resource.update(ctx.clone(), request).instrument(ctx.span()).await)
    }

    pub async fn delete(
        &self,
        type_name: &str,
        prior_state: DynamicValue,
    ) -> Result<DeleteResourceResponse> {
        let resource = self.registry.resource(type_name)?;
        let ctx = Context::for_operation("delete");
        let request = DeleteResourceRequest {
            type_name: type_name.to_string(),
            prior_state,
        };
        Ok(resource.delete(ctx.clone(), request).instrument(ctx.span()).await)
    }

    /// Import followed by a read of the imported state
    pub async fn import(&self, type_name: &str, id: &str) -> Result<ReadResourceResponse> {
        let resource = self.registry.resource(type_name)?;
        let ctx = Context::for_operation("import");
        let request = ImportResourceStateRequest {
            type_name: type_name.to_string(),
            id: id.to_string(),
        };
        let imported = resource
            .import_state(ctx.clone(), request)
            .instrument(ctx.span())
            .await;

        let state = match imported.state {
            Some(state) if !has_errors(&imported.diagnostics) => state,
            _ => {
                return Ok(ReadResourceResponse {
                    new_state: None,
                    diagnostics: imported.diagnostics,
                })
            }
        };

        let mut response = self.read(type_name, state).await?;
        let mut diagnostics = imported.diagnostics;
        diagnostics.append(&mut response.diagnostics);
        response.diagnostics = diagnostics;
        Ok(response)
    }

    pub async fn read_data_source(
        &self,
        type_name: &str,
        config: DynamicValue,
    ) -> Result<ReadDataSourceResponse> {
        let data_source = self.registry.data_source(type_name)?;
        let (config, diagnostics) = prepare(&data_source.schema(), config);
        if has_errors(&diagnostics) {
            return Ok(ReadDataSourceResponse {
                state: config,
                diagnostics,
            });
        }

        let ctx = Context::for_operation("read_data_source");
        let request = ReadDataSourceRequest {
            type_name: type_name.to_string(),
            config,
        };
        Ok(data_source
            .read(ctx.clone(), request)
            .instrument(ctx.span())
            .await)
    }
}

/// In-place updates cannot change `force_new` fields
fn replacement_required(path: AttributePath) -> Diagnostic {
    Diagnostic::error(
        "Attribute requires replacement",
        format!("Changing \"{}\" requires the resource to be replaced", path),
    )
    .with_attribute(path)
}

fn prepare(schema: &Schema, mut config: DynamicValue) -> (DynamicValue, Vec<Diagnostic>) {
    schema.apply_defaults(&mut config);
    let diagnostics = schema.validate(&config);
    if has_errors(&diagnostics) {
        tracing::debug!("configuration rejected with {} diagnostics", diagnostics.len());
    }
    (config, diagnostics)
}
