//! Request and result types for the policy generation API

use std::path::PathBuf;

use serde::Serialize;

use crate::descriptor::{NamingParams, DEFAULT_CONFIG_PATH};
use crate::detection::CategorySet;
use crate::policy_generation::{IamPolicy, SynthesizerConfig};

/// Configuration for [`generate_policy`](super::generate_policy)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratePolicyConfig {
    /// Path of the `serverless.yml` descriptor
    pub config_path: PathBuf,
    /// External permission table; the embedded table is used when `None`
    pub permission_table_path: Option<PathBuf>,
    /// Synthesis options
    pub synthesizer: SynthesizerConfig,
}

impl Default for GeneratePolicyConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            permission_table_path: None,
            synthesizer: SynthesizerConfig::default(),
        }
    }
}

/// Outcome of one detection and synthesis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratePolicyResult {
    /// Detected service categories
    pub categories: CategorySet,
    /// Naming parameters the resource patterns were scoped to
    pub naming: NamingParams,
    /// The synthesized policy document
    pub policy: IamPolicy,
}
