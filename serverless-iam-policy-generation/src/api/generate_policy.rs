use log::info;

use super::model::{GeneratePolicyConfig, GeneratePolicyResult};
use crate::descriptor::DeploymentDescriptor;
use crate::detection::detect_categories;
use crate::errors::Result;
use crate::permissions::PermissionTable;
use crate::policy_generation::Synthesizer;

/// Detect the services of an in-memory descriptor and synthesize its policy.
pub fn generate_policy_for_descriptor(
    descriptor: &DeploymentDescriptor,
    synthesizer: &Synthesizer,
) -> GeneratePolicyResult {
    let categories = detect_categories(descriptor);
    let naming = descriptor.naming_params();
    info!(
        "Scoping resources to service '{}', stage '{}', region '{}'",
        naming.service, naming.stage, naming.region
    );

    let policy = synthesizer.synthesize(&categories, &naming);
    GeneratePolicyResult {
        categories,
        naming,
        policy,
    }
}

/// Load the descriptor and permission table named by `config` and generate the policy.
///
/// Fails when the descriptor is missing or unparsable, or when an explicitly
/// configured permission table cannot be loaded.
pub fn generate_policy(config: &GeneratePolicyConfig) -> Result<GeneratePolicyResult> {
    let descriptor = DeploymentDescriptor::load(&config.config_path)?;

    let permissions = match &config.permission_table_path {
        Some(path) => {
            info!("Using permission table {}", path.display());
            PermissionTable::from_file(path)?
        }
        None => PermissionTable::embedded()?,
    };

    let synthesizer = Synthesizer::new(permissions, config.synthesizer);
    Ok(generate_policy_for_descriptor(&descriptor, &synthesizer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::ServiceCategory;
    use crate::errors::PolicyBuilderError;
    use crate::policy_generation::SynthesizerConfig;
    use std::fs;
    use tempfile::TempDir;

    fn write_descriptor(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("serverless.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_generate_policy_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(
            &dir,
            "service: api\nprovider:\n  stage: prod\n  region: eu-west-1\nfunctions:\n  hello:\n    handler: handler.hello\n",
        );

        let result = generate_policy(&GeneratePolicyConfig {
            config_path: path,
            ..GeneratePolicyConfig::default()
        })
        .unwrap();

        assert_eq!(
            result.categories.labels(),
            vec!["cloudformation", "iam", "lambda"]
        );
        assert_eq!(result.naming.service, "api");
        let resources = &result.policy.statement[0].resource;
        assert!(resources.contains(&"arn:aws:lambda:eu-west-1:*:function:api-prod-*".to_string()));
        assert_eq!(resources.last().unwrap(), "*");
    }

    #[test]
    fn test_generate_policy_for_empty_descriptor() {
        let synthesizer = Synthesizer::with_permissions(PermissionTable::embedded().unwrap());
        let result = generate_policy_for_descriptor(&DeploymentDescriptor::default(), &synthesizer);

        assert_eq!(result.categories.labels(), vec!["cloudformation", "iam"]);
        assert_eq!(result.naming.service, "serverless-service");
        assert_eq!(result.naming.stage, "dev");
        assert_eq!(result.naming.region, "us-east-1");
        assert!(result.policy.statement[0]
            .resource
            .contains(&"arn:aws:iam::*:role/serverless-service-dev-*".to_string()));
    }

    #[test]
    fn test_generate_policy_with_external_table() {
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, "service: api\n");
        let table = dir.path().join("table.json");
        fs::write(&table, r#"{"iam": ["iam:GetRole"], "cloudformation": ["cloudformation:DescribeStacks"]}"#)
            .unwrap();

        let result = generate_policy(&GeneratePolicyConfig {
            config_path: path,
            permission_table_path: Some(table),
            synthesizer: SynthesizerConfig {
                include_wildcard_fallback: false,
            },
        })
        .unwrap();

        let statement = &result.policy.statement[0];
        assert_eq!(
            statement.action,
            vec!["cloudformation:DescribeStacks", "iam:GetRole"]
        );
        assert!(!statement.resource.contains(&"*".to_string()));
        assert!(!result.categories.contains(ServiceCategory::Lambda));
    }

    #[test]
    fn test_generate_policy_missing_descriptor() {
        let dir = TempDir::new().unwrap();
        let err = generate_policy(&GeneratePolicyConfig {
            config_path: dir.path().join("serverless.yml"),
            ..GeneratePolicyConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, PolicyBuilderError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_generate_policy_unparsable_descriptor() {
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, "service: [api\nprovider: {name: aws\n");
        let err = generate_policy(&GeneratePolicyConfig {
            config_path: path,
            ..GeneratePolicyConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, PolicyBuilderError::ConfigParse { .. }));
    }

    #[test]
    fn test_generate_policy_missing_external_table() {
        let dir = TempDir::new().unwrap();
        let path = write_descriptor(&dir, "service: api\n");
        let err = generate_policy(&GeneratePolicyConfig {
            config_path: path,
            permission_table_path: Some(dir.path().join("absent.json")),
            ..GeneratePolicyConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, PolicyBuilderError::PermissionTable { .. }));
    }
}
