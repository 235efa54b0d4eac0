//! Persisting generated policies

use std::path::Path;

use log::debug;

use crate::errors::{PolicyBuilderError, Result};
use crate::policy_generation::IamPolicy;

/// Where the policy is written when the caller does not choose a path.
pub const DEFAULT_OUTPUT_PATH: &str = "output/generated-policy.json";

/// Write the policy as pretty JSON, creating parent directories as needed.
pub fn write_policy(policy: &IamPolicy, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| PolicyBuilderError::file_system("create directory", parent, e))?;
    }

    let json = policy.to_json_pretty()?;
    std::fs::write(path, json).map_err(|e| PolicyBuilderError::file_system("write", path, e))?;
    debug!("Wrote policy to {}", path.display());
    Ok(())
}
