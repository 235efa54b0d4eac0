//! Serverless Framework deployment descriptor
//!
//! The descriptor is kept as an opaque YAML mapping. Detection only needs a
//! handful of membership and substring checks, so the sections it reads are
//! exposed through accessors that tolerate any shape: a section with an
//! unexpected type behaves exactly like a missing one.

use std::path::Path;

use log::{debug, warn};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::errors::{PolicyBuilderError, Result};

/// Descriptor file used when the caller does not name one.
pub const DEFAULT_CONFIG_PATH: &str = "serverless.yml";
/// Service name used when `service` is absent.
pub const DEFAULT_SERVICE_NAME: &str = "serverless-service";
/// Stage used when `provider.stage` is absent.
pub const DEFAULT_STAGE: &str = "dev";
/// Region used when `provider.region` is absent.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Account placeholder; the deploying account is not known statically.
pub const WILDCARD_ACCOUNT: &str = "*";

/// A parsed `serverless.yml` document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentDescriptor {
    root: Mapping,
}

impl DeploymentDescriptor {
    /// Build a descriptor from an already parsed YAML value.
    ///
    /// A root that is not a mapping (an empty file, a bare list or scalar) has
    /// no sections, so it yields an empty descriptor.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Mapping(root) => Self { root },
            Value::Null => Self::default(),
            other => {
                warn!(
                    "Descriptor root is {}, not a mapping; treating it as empty",
                    kind_of(&other)
                );
                Self::default()
            }
        }
    }

    /// Parse descriptor text. YAML merge keys (`<<`) are resolved.
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let mut value: Value = serde_yaml::from_str(content)?;
        value.apply_merge()?;
        Ok(Self::from_value(value))
    }

    /// Load a descriptor from disk.
    ///
    /// Fails with [`PolicyBuilderError::ConfigNotFound`] when the path does not
    /// exist and [`PolicyBuilderError::ConfigParse`] when it is not valid YAML.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::metadata(path) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PolicyBuilderError::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(PolicyBuilderError::file_system("access", path, e)),
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PolicyBuilderError::file_system("read", path, e))?;
        let descriptor = Self::from_yaml_str(&content)
            .map_err(|e| PolicyBuilderError::config_parse(path, e))?;

        debug!(
            "Loaded descriptor {} with {} top-level sections",
            path.display(),
            descriptor.root.len()
        );
        Ok(descriptor)
    }

    /// Top-level section by key.
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// Field of the `provider` section.
    pub fn provider_field(&self, key: &str) -> Option<&Value> {
        self.section("provider").and_then(|provider| provider.get(key))
    }

    /// The `functions` section.
    pub fn functions(&self) -> Option<&Value> {
        self.section("functions")
    }

    /// `Type` strings of every entry in `resources.Resources`.
    ///
    /// Entries without a string `Type` are skipped.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.section("resources")
            .and_then(|resources| resources.get("Resources"))
            .and_then(Value::as_mapping)
            .into_iter()
            .flat_map(Mapping::values)
            .filter_map(|resource| resource.get("Type").and_then(Value::as_str))
    }

    /// Values of `provider.environment`.
    pub fn environment_values(&self) -> impl Iterator<Item = &Value> {
        self.provider_field("environment")
            .and_then(Value::as_mapping)
            .into_iter()
            .flat_map(Mapping::values)
    }

    /// The free-form `custom` section.
    pub fn custom(&self) -> Option<&Value> {
        self.section("custom")
    }

    /// Service name, falling back to [`DEFAULT_SERVICE_NAME`].
    ///
    /// Accepts both `service: name` and the older `service: { name: ... }` form.
    pub fn service_name(&self) -> String {
        self.section("service")
            .and_then(|service| {
                scalar_text(service).or_else(|| service.get("name").and_then(scalar_text))
            })
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string())
    }

    /// Deployment stage, falling back to [`DEFAULT_STAGE`].
    pub fn stage(&self) -> String {
        self.provider_field("stage")
            .and_then(scalar_text)
            .unwrap_or_else(|| DEFAULT_STAGE.to_string())
    }

    /// Deployment region, falling back to [`DEFAULT_REGION`].
    pub fn region(&self) -> String {
        self.provider_field("region")
            .and_then(scalar_text)
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    /// Naming parameters used to scope generated resource patterns.
    pub fn naming_params(&self) -> NamingParams {
        NamingParams::new(self.service_name(), self.stage(), self.region())
    }
}

/// Service name, stage, region and account used to fill ARN templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamingParams {
    pub service: String,
    pub stage: String,
    pub region: String,
    pub account: String,
}

impl NamingParams {
    /// Naming parameters for the wildcard account.
    pub fn new(
        service: impl Into<String>,
        stage: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            stage: stage.into(),
            region: region.into(),
            account: WILDCARD_ACCOUNT.to_string(),
        }
    }
}

impl Default for NamingParams {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME, DEFAULT_STAGE, DEFAULT_REGION)
    }
}

/// Whether a value counts as set: null, `false`, zero and the empty string do not.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => true,
    }
}

/// Text of a truthy scalar; numbers and `true` are rendered.
fn scalar_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
