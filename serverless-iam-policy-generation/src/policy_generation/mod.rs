//! IAM policy document model and policy synthesis
//!
//! The document model serializes to the standard IAM JSON grammar
//! (`Version`, `Statement`, `Effect`, `Action`, `Resource`).

use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub(crate) mod arn_templates;
pub(crate) mod synthesizer;

pub use arn_templates::{ArnTemplate, PARTITION};
pub use synthesizer::{Synthesizer, SynthesizerConfig, WILDCARD_RESOURCE};

/// IAM policy language version emitted in every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Statement effect. Generated policies only grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
}

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

impl Statement {
    /// Create an `Allow` statement.
    pub fn allow(action: Vec<String>, resource: Vec<String>) -> Self {
        Self {
            effect: Effect::Allow,
            action,
            resource,
        }
    }
}

/// An IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamPolicy {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl IamPolicy {
    /// Create an empty policy with the current policy language version.
    pub fn new() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: Vec::new(),
        }
    }

    /// Append a statement.
    pub fn add_statement(&mut self, statement: Statement) {
        self.statement.push(statement);
    }

    /// Total number of actions across all statements.
    pub fn action_count(&self) -> usize {
        self.statement.iter().map(|s| s.action.len()).sum()
    }

    /// Total number of resources across all statements.
    pub fn resource_count(&self) -> usize {
        self.statement.iter().map(|s| s.resource.len()).sum()
    }

    /// Compact JSON, as passed inline to STS.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for IamPolicy {
    fn default() -> Self {
        Self::new()
    }
}
