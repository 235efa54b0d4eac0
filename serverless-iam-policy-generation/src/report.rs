//! Human-readable console report
//!
//! Renders the detected services, the policy, a short summary and the
//! parameters for an STS `AssumeRole` call that scopes a CI/CD session down to
//! the generated policy.

use serde::Serialize;

use crate::api::model::GeneratePolicyResult;
use crate::errors::Result;
use crate::policy_generation::IamPolicy;

/// Placeholder for the role the pipeline assumes.
pub const ROLE_ARN_PLACEHOLDER: &str = "${ROLE_ARN}";
/// Session name used for deployment sessions.
pub const SESSION_NAME: &str = "CI-CD-Session";
/// Session duration; STS accepts 900 seconds as the minimum.
pub const SESSION_DURATION_SECONDS: u32 = 900;

/// Parameters of an STS `AssumeRole` request carrying the policy inline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssumeRoleParameters {
    pub role_arn: String,
    pub role_session_name: String,
    pub duration_seconds: u32,
    /// Compact policy JSON
    pub policy: String,
}

impl AssumeRoleParameters {
    pub fn for_policy(policy: &IamPolicy) -> Result<Self> {
        Ok(Self {
            role_arn: ROLE_ARN_PLACEHOLDER.to_string(),
            role_session_name: SESSION_NAME.to_string(),
            duration_seconds: SESSION_DURATION_SECONDS,
            policy: policy.to_json()?,
        })
    }
}

/// Action and resource counts.
pub fn render_summary(policy: &IamPolicy) -> String {
    format!(
        "Total Actions: {}\nTotal Resources: {}",
        policy.action_count(),
        policy.resource_count()
    )
}

/// Pretty JSON of the `AssumeRole` parameters.
pub fn render_assume_role_snippet(policy: &IamPolicy) -> Result<String> {
    Ok(serde_json::to_string_pretty(&AssumeRoleParameters::for_policy(
        policy,
    )?)?)
}

/// Full report for one generation run.
pub fn render_report(result: &GeneratePolicyResult) -> Result<String> {
    Ok(format!(
        "Detected services: {}\n\
         \n=== Generated IAM Policy ===\n\
         {}\n\
         \n=== Policy Summary ===\n\
         {}\n\
         \n=== Policy for STS AssumeRole ===\n\
         Use these parameters in your STS AssumeRole call (replace {}):\n\
         {}\n",
        result.categories,
        result.policy.to_json_pretty()?,
        render_summary(&result.policy),
        ROLE_ARN_PLACEHOLDER,
        render_assume_role_snippet(&result.policy)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::generate_policy_for_descriptor;
    use crate::descriptor::DeploymentDescriptor;
    use crate::permissions::PermissionTable;
    use crate::policy_generation::Synthesizer;

    fn sample_result() -> GeneratePolicyResult {
        let descriptor =
            DeploymentDescriptor::from_yaml_str("service: api\nfunctions:\n  hello: {}\n").unwrap();
        let synthesizer = Synthesizer::with_permissions(PermissionTable::from_entries([
            (crate::detection::ServiceCategory::Lambda, vec!["lambda:CreateFunction"]),
            (crate::detection::ServiceCategory::Iam, vec!["iam:PassRole"]),
        ]));
        generate_policy_for_descriptor(&descriptor, &synthesizer)
    }

    #[test]
    fn test_summary_counts() {
        let result = sample_result();
        assert_eq!(
            render_summary(&result.policy),
            "Total Actions: 2\nTotal Resources: 7"
        );
    }

    #[test]
    fn test_assume_role_parameters_embed_compact_policy() {
        let result = sample_result();
        let params = AssumeRoleParameters::for_policy(&result.policy).unwrap();
        assert_eq!(params.duration_seconds, 900);
        assert_eq!(params.role_session_name, "CI-CD-Session");

        let inline: IamPolicy = serde_json::from_str(&params.policy).unwrap();
        assert_eq!(inline, result.policy);
        assert!(!params.policy.contains('\n'));
    }

    #[test]
    fn test_snippet_uses_sts_field_names() {
        let snippet = render_assume_role_snippet(&sample_result().policy).unwrap();
        let value: serde_json::Value = serde_json::from_str(&snippet).unwrap();
        assert_eq!(value["RoleArn"], "${ROLE_ARN}");
        assert_eq!(value["RoleSessionName"], "CI-CD-Session");
        assert_eq!(value["DurationSeconds"], 900);
        assert!(value["Policy"].as_str().unwrap().starts_with("{\"Version\""));
    }

    #[test]
    fn test_report_sections_in_order() {
        let report = render_report(&sample_result()).unwrap();
        let detected = report.find("Detected services: cloudformation, iam, lambda").unwrap();
        let policy = report.find("=== Generated IAM Policy ===").unwrap();
        let summary = report.find("=== Policy Summary ===").unwrap();
        let sts = report.find("=== Policy for STS AssumeRole ===").unwrap();
        assert!(detected < policy && policy < summary && summary < sts);
        assert!(report.contains("Total Actions: 2"));
    }

    #[test]
    fn test_report_layout() {
        let result = sample_result();
        let report = render_report(&result).unwrap();
        let expected_head = format!(
            "Detected services: cloudformation, iam, lambda\n\n=== Generated IAM Policy ===\n{}\n\n=== Policy Summary ===\nTotal Actions: 2\nTotal Resources: 7\n\n=== Policy for STS AssumeRole ===\n",
            result.policy.to_json_pretty().unwrap()
        );
        assert!(report.starts_with(&expected_head));
        assert!(report.contains("in your STS AssumeRole call (replace ${ROLE_ARN}):\n{\n"));
        assert!(report.ends_with("}\n"));
    }
}
