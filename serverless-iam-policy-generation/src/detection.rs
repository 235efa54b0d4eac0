//! Service detection
//!
//! Infers which AWS service categories a deployment touches by inspecting the
//! descriptor statically. Every rule is an independent function from the
//! descriptor to the categories it contributes; [`detect_categories`] is the
//! union of all of them, so rule order never changes the result.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::descriptor::{is_truthy, DeploymentDescriptor};

/// A family of AWS resources the deployment needs permissions for.
///
/// Declaration order is the canonical output order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    CloudFormation,
    Iam,
    Lambda,
    S3,
    DynamoDb,
    Ec2,
    Rds,
    Logs,
}

impl ServiceCategory {
    /// Every category, in canonical order.
    pub const ALL: [ServiceCategory; 8] = [
        ServiceCategory::CloudFormation,
        ServiceCategory::Iam,
        ServiceCategory::Lambda,
        ServiceCategory::S3,
        ServiceCategory::DynamoDb,
        ServiceCategory::Ec2,
        ServiceCategory::Rds,
        ServiceCategory::Logs,
    ];

    /// Label used in the permission table and in console output.
    pub fn label(self) -> &'static str {
        match self {
            ServiceCategory::CloudFormation => "cloudformation",
            ServiceCategory::Iam => "iam",
            ServiceCategory::Lambda => "lambda",
            ServiceCategory::S3 => "s3",
            ServiceCategory::DynamoDb => "dynamodb",
            ServiceCategory::Ec2 => "ec2",
            ServiceCategory::Rds => "rds",
            ServiceCategory::Logs => "logs",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceCategory::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| format!("unknown service category '{}'", s))
    }
}

/// Deduplicated set of detected categories, iterated in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategorySet(BTreeSet<ServiceCategory>);

impl CategorySet {
    pub fn contains(&self, category: ServiceCategory) -> bool {
        self.0.contains(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = ServiceCategory> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels in canonical order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.iter().map(ServiceCategory::label).collect()
    }
}

impl FromIterator<ServiceCategory> for CategorySet {
    fn from_iter<T: IntoIterator<Item = ServiceCategory>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join(", "))
    }
}

/// A detection rule: the categories one aspect of the descriptor implies.
pub type DetectionRule = fn(&DeploymentDescriptor) -> Vec<ServiceCategory>;

/// All detection rules with the names they are logged under.
pub const DETECTION_RULES: [(&str, DetectionRule); 6] = [
    ("baseline", baseline_services),
    ("functions", function_services),
    ("resources", resource_services),
    ("vpc", vpc_services),
    ("environment", environment_services),
    ("custom", custom_services),
];

/// Detect the service categories a deployment uses.
///
/// Never fails: missing or oddly shaped sections contribute nothing.
pub fn detect_categories(descriptor: &DeploymentDescriptor) -> CategorySet {
    let categories: CategorySet = DETECTION_RULES
        .iter()
        .flat_map(|(name, rule)| {
            let found = rule(descriptor);
            if !found.is_empty() {
                debug!("Detection rule '{}' matched: {:?}", name, found);
            }
            found
        })
        .collect();

    info!("Detected services: {}", categories);
    categories
}

/// CloudFormation and IAM are needed by every Serverless deployment.
pub fn baseline_services(_descriptor: &DeploymentDescriptor) -> Vec<ServiceCategory> {
    vec![ServiceCategory::CloudFormation, ServiceCategory::Iam]
}

/// A non-empty `functions` section means Lambda.
pub fn function_services(descriptor: &DeploymentDescriptor) -> Vec<ServiceCategory> {
    let has_functions = match descriptor.functions() {
        Some(Value::Mapping(functions)) => !functions.is_empty(),
        Some(Value::Sequence(functions)) => !functions.is_empty(),
        _ => false,
    };
    if has_functions {
        vec![ServiceCategory::Lambda]
    } else {
        Vec::new()
    }
}

/// Categories implied by CloudFormation resource type prefixes.
pub fn resource_services(descriptor: &DeploymentDescriptor) -> Vec<ServiceCategory> {
    descriptor
        .resource_types()
        .filter_map(category_for_resource_type)
        .collect()
}

/// Map a CloudFormation resource type to its category; unknown prefixes map to nothing.
pub fn category_for_resource_type(resource_type: &str) -> Option<ServiceCategory> {
    const PREFIXES: [(&str, ServiceCategory); 5] = [
        ("AWS::S3::", ServiceCategory::S3),
        ("AWS::DynamoDB::", ServiceCategory::DynamoDb),
        ("AWS::EC2::", ServiceCategory::Ec2),
        ("AWS::RDS::", ServiceCategory::Rds),
        ("AWS::Lambda::", ServiceCategory::Lambda),
    ];

    PREFIXES
        .into_iter()
        .find(|(prefix, _)| resource_type.starts_with(prefix))
        .map(|(_, category)| category)
}

/// A VPC configuration means EC2 networking resources.
pub fn vpc_services(descriptor: &DeploymentDescriptor) -> Vec<ServiceCategory> {
    if descriptor.provider_field("vpc").is_some_and(is_truthy) {
        vec![ServiceCategory::Ec2]
    } else {
        Vec::new()
    }
}

/// Environment variables mentioning `dynamodb` mean DynamoDB.
pub fn environment_services(descriptor: &DeploymentDescriptor) -> Vec<ServiceCategory> {
    let mentions_dynamodb = descriptor
        .environment_values()
        .filter_map(Value::as_str)
        .any(|value| value.contains("dynamodb"));
    if mentions_dynamodb {
        vec![ServiceCategory::DynamoDb]
    } else {
        Vec::new()
    }
}

/// Substring heuristic over the whole `custom` section.
///
/// Any mention of a service keyword anywhere in `custom` counts, so unrelated
/// text can produce false positives.
pub fn custom_services(descriptor: &DeploymentDescriptor) -> Vec<ServiceCategory> {
    let Some(custom) = descriptor.custom() else {
        return Vec::new();
    };
    let text = lowercase_text(custom);

    let mut found = Vec::new();
    if text.contains("s3") {
        found.push(ServiceCategory::S3);
    }
    if text.contains("dynamodb") {
        found.push(ServiceCategory::DynamoDb);
    }
    if text.contains("rds") {
        found.push(ServiceCategory::Rds);
    }
    if text.contains("ec2") || text.contains("vpc") {
        found.push(ServiceCategory::Ec2);
    }
    found
}

/// Compact JSON rendering of a section, lowercased.
fn lowercase_text(value: &Value) -> String {
    let text = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!("custom section is not representable as JSON ({}), scanning its scalars", e);
            let mut text = String::new();
            push_scalars(value, &mut text);
            text
        }
    };
    text.to_lowercase()
}

/// Every key, scalar and tag of a value, space separated.
fn push_scalars(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => out.push_str(text),
        Value::Sequence(items) => {
            for item in items {
                push_scalars(item, out);
                out.push(' ');
            }
        }
        Value::Mapping(entries) => {
            for (key, item) in entries {
                push_scalars(key, out);
                out.push(' ');
                push_scalars(item, out);
                out.push(' ');
            }
        }
        Value::Tagged(tagged) => {
            out.push_str(&tagged.tag.to_string());
            out.push(' ');
            push_scalars(&tagged.value, out);
        }
    }
}
