//! Custom resources.

use serde::Serialize;

use crate::template::ResourceProperties;
use crate::value::Value;

/// `Custom::CDKBucketDeployment`: sync an asset into a bucket, then invalidate
/// a distribution.
///
/// The property names match the handler shipped with the CDK
/// `BucketDeployment` construct so the same handler package can serve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketDeployment {
    /// ARN of the handler function.
    pub service_token: Value,
    /// Buckets holding the source archives.
    pub source_bucket_names: Vec<Value>,
    /// Keys of the source archives.
    pub source_object_keys: Vec<Value>,
    /// Bucket the archives are extracted into.
    pub destination_bucket_name: Value,
    /// Delete destination objects missing from the sources.
    pub prune: bool,
    /// Keep destination objects when the resource is deleted.
    pub retain_on_delete: bool,
    /// Distribution to invalidate after the sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_id: Option<Value>,
    /// Paths to invalidate.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distribution_paths: Vec<String>,
}

impl ResourceProperties for BucketDeployment {
    const RESOURCE_TYPE: &'static str = "Custom::CDKBucketDeployment";
}
