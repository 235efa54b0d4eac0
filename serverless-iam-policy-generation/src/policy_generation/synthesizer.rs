//! Policy synthesis
//!
//! Turns a detected [`CategorySet`] into a single-statement [`IamPolicy`]:
//! the union of the permission table's actions for every category, scoped to
//! resource patterns derived from the service name, stage and region.

use std::collections::{BTreeSet, HashSet};

use log::debug;

use super::arn_templates::ArnTemplate;
use super::{IamPolicy, Statement};
use crate::descriptor::NamingParams;
use crate::detection::CategorySet;
use crate::permissions::PermissionTable;

/// Resource pattern matching every resource.
pub const WILDCARD_RESOURCE: &str = "*";

/// Synthesis options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesizerConfig {
    /// Append `"*"` after the category-specific resource patterns.
    ///
    /// On by default. When off, the statement is limited to the
    /// category-specific patterns.
    pub include_wildcard_fallback: bool,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            include_wildcard_fallback: true,
        }
    }
}

/// Builds deployment policies from detected categories.
///
/// Holds the permission table for its whole lifetime; synthesis itself is a
/// pure function of its inputs.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    permissions: PermissionTable,
    config: SynthesizerConfig,
}

impl Synthesizer {
    pub fn new(permissions: PermissionTable, config: SynthesizerConfig) -> Self {
        Self {
            permissions,
            config,
        }
    }

    /// Synthesizer with the default configuration.
    pub fn with_permissions(permissions: PermissionTable) -> Self {
        Self::new(permissions, SynthesizerConfig::default())
    }

    /// Generate the policy for a set of categories.
    pub fn synthesize(&self, categories: &CategorySet, naming: &NamingParams) -> IamPolicy {
        let actions = self.collect_actions(categories);
        let resources = self.collect_resources(categories, naming);
        debug!(
            "Synthesized policy with {} actions and {} resources",
            actions.len(),
            resources.len()
        );

        let mut policy = IamPolicy::new();
        policy.add_statement(Statement::allow(actions, resources));
        policy
    }

    /// Union of the table's actions for every category, sorted and deduplicated.
    pub fn collect_actions(&self, categories: &CategorySet) -> Vec<String> {
        let mut actions = BTreeSet::new();
        for category in categories.iter() {
            let category_actions = self.permissions.actions_for(category);
            if category_actions.is_empty() {
                debug!("No permission table entry for {}", category);
            }
            actions.extend(category_actions.iter().cloned());
        }
        actions.into_iter().collect()
    }

    /// Resource patterns for every category in canonical order, deduplicated
    /// keeping the first occurrence, followed by the wildcard fallback.
    pub fn collect_resources(&self, categories: &CategorySet, naming: &NamingParams) -> Vec<String> {
        let patterns = categories
            .iter()
            .flat_map(ArnTemplate::for_category)
            .map(|template| template.expand(naming));

        let mut seen = HashSet::new();
        let mut resources: Vec<String> = patterns.filter(|p| seen.insert(p.clone())).collect();

        // A statement without resources is invalid, keep the wildcard then.
        if self.config.include_wildcard_fallback || resources.is_empty() {
            resources.push(WILDCARD_RESOURCE.to_string());
        }
        resources
    }
}
