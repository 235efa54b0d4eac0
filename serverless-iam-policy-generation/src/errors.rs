//! Error types for descriptor loading, permission table loading and policy output.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while building a deployment policy.
///
/// Only failures at the I/O boundary are represented here. Missing optional
/// descriptor sections, unknown resource types and empty category sets are
/// valid input and never produce an error.
#[derive(Debug, Error)]
pub enum PolicyBuilderError {
    /// The descriptor path does not exist.
    #[error("Serverless config file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// The descriptor is not a YAML document the model accepts.
    #[error("Error reading {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A permission table could not be loaded.
    #[error("Invalid permission table {path}: {message}")]
    PermissionTable { path: String, message: String },

    /// Any other file system failure.
    #[error("Failed to {operation} {}", path.display())]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON rendering failed.
    #[error("JSON serialization failed")]
    Serialization(#[from] serde_json::Error),
}

impl PolicyBuilderError {
    /// Create a file system error with operation context
    pub fn file_system(
        operation: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a permission table error
    pub fn permission_table(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PermissionTable {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn config_parse(path: impl AsRef<Path>, source: serde_yaml::Error) -> Self {
        Self::ConfigParse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PolicyBuilderError>;
