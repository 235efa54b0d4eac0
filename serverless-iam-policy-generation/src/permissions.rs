//! Category to IAM action table
//!
//! The curated table ships with the binary (embedded at compile time from
//! `resources/config/permission-table.json`) and can be replaced by an
//! external JSON file of the same shape:
//!
//! ```json
//! { "s3": ["s3:CreateBucket", "s3:PutObject"], "iam": ["iam:PassRole"] }
//! ```
//!
//! A table is loaded once and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use rust_embed::RustEmbed;

use crate::detection::ServiceCategory;
use crate::errors::{PolicyBuilderError, Result};

const EMBEDDED_TABLE_FILE: &str = "permission-table.json";

/// Embedded permission table shipped with the tool.
#[derive(RustEmbed)]
#[folder = "resources/config"]
#[include = "permission-table.json"]
struct EmbeddedConfig;

/// Ordered IAM actions granted for each service category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionTable {
    actions: BTreeMap<ServiceCategory, Vec<String>>,
}

impl PermissionTable {
    /// The curated table embedded in the binary.
    pub fn embedded() -> Result<Self> {
        let file = EmbeddedConfig::get(EMBEDDED_TABLE_FILE).ok_or_else(|| {
            PolicyBuilderError::permission_table(EMBEDDED_TABLE_FILE, "embedded file is missing")
        })?;
        let content = std::str::from_utf8(&file.data)
            .map_err(|e| PolicyBuilderError::permission_table(EMBEDDED_TABLE_FILE, e.to_string()))?;
        Self::from_json_str(EMBEDDED_TABLE_FILE, content)
    }

    /// Load a table from an external JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PolicyBuilderError::permission_table(path.display().to_string(), e.to_string())
        })?;
        Self::from_json_str(&path.display().to_string(), &content)
    }

    /// Parse a table from JSON text. `source` names the table in errors and logs.
    ///
    /// Keys that are not known category labels are ignored.
    pub fn from_json_str(source: &str, content: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(content)
            .map_err(|e| PolicyBuilderError::permission_table(source, e.to_string()))?;

        let mut actions = BTreeMap::new();
        for (label, category_actions) in raw {
            match label.parse::<ServiceCategory>() {
                Ok(category) => {
                    actions.insert(category, category_actions);
                }
                Err(reason) => warn!("Ignoring permission table entry in {}: {}", source, reason),
            }
        }

        let table = Self { actions };
        debug!(
            "Loaded permission table {} covering {} categories",
            source,
            table.actions.len()
        );
        Ok(table)
    }

    /// Build a table directly from category/action pairs.
    pub fn from_entries<I, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ServiceCategory, A)>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            actions: entries
                .into_iter()
                .map(|(category, actions)| {
                    (category, actions.into_iter().map(Into::into).collect())
                })
                .collect(),
        }
    }

    /// Actions for a category; empty when the table has no entry for it.
    pub fn actions_for(&self, category: ServiceCategory) -> &[String] {
        self.actions
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_table_covers_every_category() {
        let table = PermissionTable::embedded().unwrap();
        for category in ServiceCategory::ALL {
            assert!(
                !table.actions_for(category).is_empty(),
                "no actions for {}",
                category
            );
        }
    }

    #[test]
    fn test_embedded_actions_are_well_formed() {
        let table = PermissionTable::embedded().unwrap();
        for category in ServiceCategory::ALL {
            for action in table.actions_for(category) {
                let (service, name) = action
                    .split_once(':')
                    .unwrap_or_else(|| panic!("malformed action {}", action));
                assert!(!service.is_empty() && !name.is_empty(), "{}", action);
            }
        }
    }

    #[test]
    fn test_missing_category_yields_no_actions() {
        let table = PermissionTable::from_json_str("inline", r#"{"s3": ["s3:GetObject"]}"#).unwrap();
        assert_eq!(table.actions_for(ServiceCategory::S3), ["s3:GetObject"]);
        assert!(table.actions_for(ServiceCategory::Rds).is_empty());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let table = PermissionTable::from_json_str(
            "inline",
            r#"{"sqs": ["sqs:CreateQueue"], "iam": ["iam:GetRole"]}"#,
        )
        .unwrap();
        assert_eq!(
            table,
            PermissionTable::from_entries([(ServiceCategory::Iam, ["iam:GetRole"])])
        );
    }

    #[test]
    fn test_action_order_is_preserved() {
        let table =
            PermissionTable::from_json_str("inline", r#"{"logs": ["logs:B", "logs:A"]}"#).unwrap();
        assert_eq!(table.actions_for(ServiceCategory::Logs), ["logs:B", "logs:A"]);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = PermissionTable::from_json_str("inline", r#"{"s3": "s3:GetObject"}"#).unwrap_err();
        assert!(matches!(err, PolicyBuilderError::PermissionTable { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"ec2": ["ec2:DescribeVpcs"]}}"#).unwrap();
        let table = PermissionTable::from_file(file.path()).unwrap();
        assert_eq!(table.actions_for(ServiceCategory::Ec2), ["ec2:DescribeVpcs"]);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PermissionTable::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PolicyBuilderError::PermissionTable { .. }));
    }

    #[test]
    fn test_from_entries() {
        let table = PermissionTable::from_entries([(ServiceCategory::Rds, ["rds:DescribeDBInstances"])]);
        assert_eq!(table.actions_for(ServiceCategory::Rds), ["rds:DescribeDBInstances"]);
    }
}
