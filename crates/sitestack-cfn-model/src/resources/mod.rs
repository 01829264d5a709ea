//! Typed properties for the resource types a static site needs.
//!
//! Field names follow the CloudFormation resource reference; `serde` renames
//! them to PascalCase (with explicit renames where AWS deviates from it).

pub mod acm;
pub mod cloudfront;
pub mod custom;
pub mod iam;
pub mod lambda;
pub mod route53;
pub mod s3;

use serde::Serialize;

use crate::value::Value;

/// A resource tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: Value,
}

impl Tag {
    /// Create a tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}
