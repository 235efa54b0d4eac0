//! Core library for deriving a deployment IAM policy from a Serverless
//! Framework descriptor:
//! - Service detection over `serverless.yml`
//! - Category to action mapping (embedded or external permission table)
//! - Policy synthesis with resource ARNs scoped to service, stage and region
//!
//! The pipeline is two pure steps, [`detect_categories`] followed by
//! [`Synthesizer::synthesize`]; [`api::generate_policy`] wraps them with file
//! loading.

pub mod api;
mod descriptor;
mod detection;
mod errors;
mod permissions;
mod policy_generation;
pub mod report;

// Re-exports for a small, focused public API
pub use descriptor::{
    DeploymentDescriptor, NamingParams, DEFAULT_CONFIG_PATH, DEFAULT_REGION,
    DEFAULT_SERVICE_NAME, DEFAULT_STAGE, WILDCARD_ACCOUNT,
};
pub use detection::{
    baseline_services, category_for_resource_type, custom_services, detect_categories,
    environment_services, function_services, resource_services, vpc_services, CategorySet,
    DetectionRule, ServiceCategory, DETECTION_RULES,
};
pub use errors::{PolicyBuilderError, Result};
pub use permissions::PermissionTable;
pub use policy_generation::{
    ArnTemplate, Effect, IamPolicy, Statement, Synthesizer, SynthesizerConfig, PARTITION,
    POLICY_VERSION, WILDCARD_RESOURCE,
};
