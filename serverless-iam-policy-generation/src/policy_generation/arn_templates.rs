//! Resource ARN templates per service category
//!
//! Templates use `${Partition}`, `${Service}`, `${Stage}`, `${Region}` and
//! `${Account}` placeholders. Expansion is a single left-to-right pass, so a
//! substituted value is never expanded again.

use crate::descriptor::NamingParams;
use crate::detection::ServiceCategory;

/// AWS partition used in every generated ARN.
pub const PARTITION: &str = "aws";

/// An ARN pattern with placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArnTemplate(&'static str);

const S3_TEMPLATES: &[ArnTemplate] = &[
    ArnTemplate("arn:${Partition}:s3:::${Service}-${Stage}-*"),
    ArnTemplate("arn:${Partition}:s3:::${Service}-${Stage}-*/*"),
];

const LAMBDA_TEMPLATES: &[ArnTemplate] = &[
    ArnTemplate("arn:${Partition}:lambda:${Region}:${Account}:function:${Service}-${Stage}-*"),
    ArnTemplate("arn:${Partition}:lambda:${Region}:${Account}:layer:${Service}-${Stage}-*"),
];

const DYNAMODB_TEMPLATES: &[ArnTemplate] = &[
    ArnTemplate("arn:${Partition}:dynamodb:${Region}:${Account}:table/${Service}-${Stage}-*"),
    ArnTemplate(
        "arn:${Partition}:dynamodb:${Region}:${Account}:table/${Service}-${Stage}-*/index/*",
    ),
];

const LOGS_TEMPLATES: &[ArnTemplate] = &[
    ArnTemplate(
        "arn:${Partition}:logs:${Region}:${Account}:log-group:/aws/lambda/${Service}-${Stage}-*",
    ),
    ArnTemplate(
        "arn:${Partition}:logs:${Region}:${Account}:log-group:/aws/lambda/${Service}-${Stage}-*:*",
    ),
];

const CLOUDFORMATION_TEMPLATES: &[ArnTemplate] = &[
    ArnTemplate("arn:${Partition}:cloudformation:${Region}:${Account}:stack/${Service}-${Stage}/*"),
    ArnTemplate(
        "arn:${Partition}:cloudformation:${Region}:${Account}:stack/${Service}-${Stage}-*/*",
    ),
];

const IAM_TEMPLATES: &[ArnTemplate] = &[
    ArnTemplate("arn:${Partition}:iam::${Account}:role/${Service}-${Stage}-*"),
    ArnTemplate("arn:${Partition}:iam::${Account}:role/*-${Service}-${Stage}-*"),
];

const EC2_TEMPLATES: &[ArnTemplate] = &[
    ArnTemplate("arn:${Partition}:ec2:${Region}:${Account}:security-group/*"),
    ArnTemplate("arn:${Partition}:ec2:${Region}:${Account}:network-interface/*"),
    ArnTemplate("arn:${Partition}:ec2:${Region}:${Account}:vpc/*"),
    ArnTemplate("arn:${Partition}:ec2:${Region}:${Account}:subnet/*"),
];

const RDS_TEMPLATES: &[ArnTemplate] = &[
    ArnTemplate("arn:${Partition}:rds:${Region}:${Account}:db:${Service}-${Stage}-*"),
    ArnTemplate("arn:${Partition}:rds:${Region}:${Account}:subgrp:${Service}-${Stage}-*"),
    ArnTemplate("arn:${Partition}:rds:${Region}:${Account}:pg:${Service}-${Stage}-*"),
];

impl ArnTemplate {
    /// Templates scoping the resources of one category.
    pub fn for_category(category: ServiceCategory) -> &'static [ArnTemplate] {
        match category {
            ServiceCategory::S3 => S3_TEMPLATES,
            ServiceCategory::Lambda => LAMBDA_TEMPLATES,
            ServiceCategory::DynamoDb => DYNAMODB_TEMPLATES,
            ServiceCategory::Logs => LOGS_TEMPLATES,
            ServiceCategory::CloudFormation => CLOUDFORMATION_TEMPLATES,
            ServiceCategory::Iam => IAM_TEMPLATES,
            ServiceCategory::Ec2 => EC2_TEMPLATES,
            ServiceCategory::Rds => RDS_TEMPLATES,
        }
    }

    /// Substitute naming parameters into the template.
    ///
    /// Unknown placeholders are left untouched.
    pub fn expand(self, naming: &NamingParams) -> String {
        let mut expanded = String::with_capacity(self.0.len() + 32);
        let mut rest = self.0;

        while let Some(start) = rest.find("${") {
            expanded.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                rest = &rest[start..];
                break;
            };
            let name = &after[..end];
            match placeholder_value(name, naming) {
                Some(value) => expanded.push_str(value),
                None => expanded.push_str(&rest[start..start + 2 + end + 1]),
            }
            rest = &after[end + 1..];
        }
        expanded.push_str(rest);
        expanded
    }
}

fn placeholder_value<'a>(name: &str, naming: &'a NamingParams) -> Option<&'a str> {
    match name {
        "Partition" => Some(PARTITION),
        "Service" => Some(&naming.service),
        "Stage" => Some(&naming.stage),
        "Region" => Some(&naming.region),
        "Account" => Some(&naming.account),
        _ => None,
    }
}
