//! Schema types and builders for tfplug
//!
//! Schemas describe attributes and nested blocks. Besides describing the
//! shape to Terraform, the host uses them to fill defaults and to validate
//! configuration before a handler runs.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use crate::validator::Validator;
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType mirrors Terraform's type system
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block.block_types.iter().find(|b| b.type_name == name)
    }

    /// Fills unset optional attributes with their defaults, recursing into blocks
    pub fn apply_defaults(&self, config: &mut DynamicValue) {
        if config.is_null() {
            config.value = Dynamic::Map(HashMap::new());
        }
        self.block.apply_defaults(&mut config.value);
    }

    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = vec![];
        self.block
            .validate(&config.value, &AttributePath::root(), &mut diagnostics);
        diagnostics
    }

    /// Top-level `force_new` attributes and blocks whose configured value
    /// differs from the prior state
    ///
    /// Null and unknown configuration values are not compared. Inside a block
    /// only the attributes the configuration sets are compared, so computed
    /// fields in the prior state never count as a change.
    pub fn replacement_paths(
        &self,
        prior: &DynamicValue,
        config: &DynamicValue,
    ) -> Vec<AttributePath> {
        let empty = HashMap::new();
        let prior_fields = prior.value.as_map().unwrap_or(&empty);
        let config_fields = config.value.as_map().unwrap_or(&empty);
        let mut paths = vec![];

        for attr in self.block.attributes.iter().filter(|a| a.force_new) {
            let Some(wanted) = config_fields.get(&attr.name).filter(|v| is_set(v)) else {
                continue;
            };
            if prior_fields.get(&attr.name) != Some(wanted) {
                paths.push(AttributePath::new(&attr.name));
            }
        }

        for nested in self.block.block_types.iter().filter(|b| b.force_new) {
            let items = |fields: &HashMap<String, Dynamic>| {
                fields
                    .get(&nested.type_name)
                    .and_then(Dynamic::as_list)
                    .map(<[Dynamic]>::to_vec)
                    .unwrap_or_default()
            };
            let (before, after) = (items(prior_fields), items(config_fields));
            let changed = before.len() != after.len()
                || before
                    .iter()
                    .zip(&after)
                    .any(|(old, new)| nested.block.configured_fields_differ(old, new));
            if changed {
                paths.push(AttributePath::new(&nested.type_name));
            }
        }
        paths
    }
}

fn is_set(value: &Dynamic) -> bool {
    !value.is_null() && !value.is_unknown()
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
}

impl Block {
    fn configured_fields_differ(&self, prior: &Dynamic, config: &Dynamic) -> bool {
        let empty = HashMap::new();
        let prior_fields = prior.as_map().unwrap_or(&empty);
        let config_fields = config.as_map().unwrap_or(&empty);
        self.attributes.iter().any(|attr| {
            config_fields
                .get(&attr.name)
                .filter(|v| is_set(v))
                .is_some_and(|wanted| prior_fields.get(&attr.name) != Some(wanted))
        })
    }

    fn apply_defaults(&self, value: &mut Dynamic) {
        let Dynamic::Map(fields) = value else {
            return;
        };

        for attr in &self.attributes {
            if let Some(default) = &attr.default {
                let slot = fields.entry(attr.name.clone()).or_default();
                if slot.is_null() {
                    *slot = default.clone();
                }
            }
        }

        for nested in &self.block_types {
            if let Some(Dynamic::List(items)) = fields.get_mut(&nested.type_name) {
                for item in items.iter_mut() {
                    nested.block.apply_defaults(item);
                }
            }
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let empty = HashMap::new();
        let fields = value.as_map().unwrap_or(&empty);

        for attr in &self.attributes {
            let attr_path = child(path, &attr.name);
            match fields.get(&attr.name) {
                None | Some(Dynamic::Null) if attr.required => diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required", attr_path),
                    )
                    .with_attribute(attr_path),
                ),
                Some(v) if !v.is_null() && !v.is_unknown() => {
                    for validator in &attr.validators {
                        validator.validate(v, &attr_path, diagnostics);
                    }
                }
                _ => {}
            }
        }

        for nested in &self.block_types {
            let block_path = child(path, &nested.type_name);
            let items = fields
                .get(&nested.type_name)
                .and_then(Dynamic::as_list)
                .unwrap_or(&[]);
            let count = items.len() as i64;

            if count < nested.min_items {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Insufficient {} blocks", nested.type_name),
                        format!(
                            "At least {} \"{}\" block(s) are required",
                            nested.min_items, block_path
                        ),
                    )
                    .with_attribute(block_path.clone()),
                );
            }
            if nested.max_items > 0 && count > nested.max_items {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Too many {} blocks", nested.type_name),
                        format!(
                            "No more than {} \"{}\" block(s) are allowed",
                            nested.max_items, block_path
                        ),
                    )
                    .with_attribute(block_path.clone()),
                );
            }

            for (idx, item) in items.iter().enumerate() {
                nested
                    .block
                    .validate(item, &block_path.clone().index(idx as i64), diagnostics);
            }
        }
    }
}

fn child(path: &AttributePath, name: &str) -> AttributePath {
    if path.steps.is_empty() {
        AttributePath::new(name)
    } else {
        path.clone().attribute(name)
    }
}

#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing this attribute forces the resource to be replaced
    pub force_new: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub default: Option<Dynamic>,
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("force_new", &self.force_new)
            .field(
                "validators",
                &self
                    .validators
                    .iter()
                    .map(|v| v.description())
                    .collect::<Vec<_>>(),
            )
            .field("default", &self.default)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    /// Zero means unbounded
    pub max_items: i64,
    /// Changing any item forces the resource to be replaced
    pub force_new: bool,
}

impl NestedBlock {
    pub fn list(type_name: &str, block: Block) -> Self {
        Self::with_nesting(type_name, block, NestingMode::List)
    }

    pub fn set(type_name: &str, block: Block) -> Self {
        Self::with_nesting(type_name, block, NestingMode::Set)
    }

    fn with_nesting(type_name: &str, block: Block, nesting: NestingMode) -> Self {
        Self {
            type_name: type_name.to_string(),
            block,
            nesting,
            min_items: 0,
            max_items: 0,
            force_new: false,
        }
    }

    pub fn min_items(mut self, min: i64) -> Self {
        self.min_items = min;
        self
    }

    pub fn max_items(mut self, max: i64) -> Self {
        self.max_items = max;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingMode {
    List,
    Set,
}

/// AttributeBuilder provides fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                force_new: false,
                validators: Vec::new(),
                default: None,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.attribute.force_new = true;
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    pub fn default_value(mut self, value: impl Into<Dynamic>) -> Self {
        self.attribute.default = Some(value.into());
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// BlockBuilder assembles the body of a nested block
#[derive(Default)]
pub struct BlockBuilder {
    block: Block,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.block.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.block.block_types.push(block);
        self
    }

    pub fn build(self) -> Block {
        self.block
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    version: i64,
    block: BlockBuilder,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            version: 0,
            block: BlockBuilder::new(),
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.block = self.block.description(desc);
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.block = self.block.attribute(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.block = self.block.block(block);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            block: self.block.build(),
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
