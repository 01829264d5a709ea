//! `AWS::Lambda::Function`.

use serde::Serialize;

use crate::template::ResourceProperties;
use crate::value::Value;

/// `AWS::Lambda::Function`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Function {
    /// Deployment package location.
    pub code: Code,
    /// Entry point.
    pub handler: String,
    /// Memory in MiB.
    pub memory_size: u32,
    /// Execution role ARN.
    pub role: Value,
    /// Runtime identifier.
    pub runtime: String,
    /// Timeout in seconds.
    pub timeout: u32,
}

impl ResourceProperties for Function {
    const RESOURCE_TYPE: &'static str = "AWS::Lambda::Function";
}

/// Deployment package stored in S3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Code {
    /// Bucket holding the package.
    #[serde(rename = "S3Bucket")]
    pub s3_bucket: Value,
    /// Object key of the package.
    #[serde(rename = "S3Key")]
    pub s3_key: Value,
}
