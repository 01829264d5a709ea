//! `AWS::CertificateManager::Certificate`.

use serde::Serialize;

use super::Tag;
use crate::template::ResourceProperties;
use crate::types::ValidationMethod;
use crate::value::Value;

/// `AWS::CertificateManager::Certificate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    /// Fully qualified domain name the certificate covers.
    pub domain_name: Value,
    /// Where the validation records for each domain are created.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain_validation_options: Vec<DomainValidationOption>,
    /// DNS or email validation.
    pub validation_method: ValidationMethod,
    /// Resource tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl ResourceProperties for Certificate {
    const RESOURCE_TYPE: &'static str = "AWS::CertificateManager::Certificate";
}

/// Hosted zone used to validate one domain of a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainValidationOption {
    /// Domain being validated.
    pub domain_name: Value,
    /// Zone the validation CNAME is written to.
    pub hosted_zone_id: Value,
}
