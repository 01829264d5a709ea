//! `AWS::S3::*` resources.

use serde::Serialize;

use super::Tag;
use super::iam::PolicyDocument;
use crate::template::ResourceProperties;
use crate::value::Value;

/// `AWS::S3::Bucket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bucket {
    /// Physical bucket name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<Value>,
    /// Static website hosting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_configuration: Option<WebsiteConfiguration>,
    /// Public access block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_access_block_configuration: Option<PublicAccessBlockConfiguration>,
    /// Resource tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl ResourceProperties for Bucket {
    const RESOURCE_TYPE: &'static str = "AWS::S3::Bucket";
}

/// Index and error documents of a website bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebsiteConfiguration {
    /// Object served for directory requests.
    pub index_document: String,
    /// Object served on errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_document: Option<String>,
}

/// Public access block settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct PublicAccessBlockConfiguration {
    /// Reject public ACLs on requests.
    pub block_public_acls: bool,
    /// Reject public bucket policies.
    pub block_public_policy: bool,
    /// Ignore existing public ACLs.
    pub ignore_public_acls: bool,
    /// Restrict access granted by public policies.
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlockConfiguration {
    /// Block every form of public access.
    pub const BLOCK_ALL: Self = Self {
        block_public_acls: true,
        block_public_policy: true,
        ignore_public_acls: true,
        restrict_public_buckets: true,
    };
}

/// `AWS::S3::BucketPolicy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketPolicy {
    /// Bucket the policy is attached to.
    pub bucket: Value,
    /// Policy document.
    pub policy_document: PolicyDocument,
}

impl ResourceProperties for BucketPolicy {
    const RESOURCE_TYPE: &'static str = "AWS::S3::BucketPolicy";
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::template::Resource;

    #[test]
    fn test_should_render_private_website_bucket() {
        let bucket = Bucket {
            bucket_name: Some(Value::lit("prod.test.pro")),
            website_configuration: Some(WebsiteConfiguration {
                index_document: "index.html".into(),
                error_document: Some("index.html".into()),
            }),
            public_access_block_configuration: Some(PublicAccessBlockConfiguration::BLOCK_ALL),
            tags: vec![Tag::new("siteItems", Value::lit("prod.test.pro"))],
        };
        let resource = Resource::new(&bucket).unwrap();

        assert_eq!(resource.resource_type, "AWS::S3::Bucket");
        assert_eq!(
            serde_json::Value::Object(resource.properties),
            json!({
                "BucketName": "prod.test.pro",
                "WebsiteConfiguration": {"IndexDocument": "index.html", "ErrorDocument": "index.html"},
                "PublicAccessBlockConfiguration": {
                    "BlockPublicAcls": true,
                    "BlockPublicPolicy": true,
                    "IgnorePublicAcls": true,
                    "RestrictPublicBuckets": true
                },
                "Tags": [{"Key": "siteItems", "Value": "prod.test.pro"}]
            })
        );
    }
}
