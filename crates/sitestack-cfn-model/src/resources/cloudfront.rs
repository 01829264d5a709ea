//! `AWS::CloudFront::*` resources.

use serde::Serialize;

use super::Tag;
use crate::template::ResourceProperties;
use crate::types::{HttpVersion, PriceClass, SecurityPolicyProtocol, SslSupportMethod, ViewerProtocolPolicy};
use crate::value::Value;

/// `AWS::CloudFront::CloudFrontOriginAccessIdentity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudFrontOriginAccessIdentity {
    /// Identity configuration.
    pub cloud_front_origin_access_identity_config: OriginAccessIdentityConfig,
}

impl ResourceProperties for CloudFrontOriginAccessIdentity {
    const RESOURCE_TYPE: &'static str = "AWS::CloudFront::CloudFrontOriginAccessIdentity";
}

/// Configuration of an origin access identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OriginAccessIdentityConfig {
    /// Free-form comment.
    pub comment: Value,
}

/// `AWS::CloudFront::Distribution`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Distribution {
    /// Distribution configuration.
    pub distribution_config: DistributionConfig,
    /// Resource tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl ResourceProperties for Distribution {
    const RESOURCE_TYPE: &'static str = "AWS::CloudFront::Distribution";
}

/// Body of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistributionConfig {
    /// Alternate domain names (CNAMEs).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<Value>,
    /// Error code rewrites.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_error_responses: Vec<CustomErrorResponse>,
    /// Behavior for every path.
    pub default_cache_behavior: DefaultCacheBehavior,
    /// Object returned for `/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_root_object: Option<String>,
    /// Whether the distribution accepts requests.
    pub enabled: bool,
    /// HTTP version served to viewers.
    pub http_version: HttpVersion,
    /// Whether IPv6 is enabled.
    #[serde(rename = "IPV6Enabled")]
    pub ipv6_enabled: bool,
    /// Origins.
    pub origins: Vec<Origin>,
    /// Edge location price class.
    pub price_class: PriceClass,
    /// TLS certificate served to viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_certificate: Option<ViewerCertificate>,
}

/// An error code rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomErrorResponse {
    /// Origin status code being rewritten.
    pub error_code: u16,
    /// Status code returned to the viewer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    /// Object returned to the viewer instead of the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_page_path: Option<String>,
    /// Seconds the rewritten response is cached.
    #[serde(rename = "ErrorCachingMinTTL", skip_serializing_if = "Option::is_none")]
    pub error_caching_min_ttl: Option<u32>,
}

/// Default cache behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefaultCacheBehavior {
    /// Methods CloudFront forwards.
    pub allowed_methods: Vec<String>,
    /// Methods CloudFront caches.
    pub cached_methods: Vec<String>,
    /// Whether objects are compressed at the edge.
    pub compress: bool,
    /// Legacy cache key settings.
    pub forwarded_values: ForwardedValues,
    /// Origin the behavior routes to.
    pub target_origin_id: String,
    /// HTTP/HTTPS handling.
    pub viewer_protocol_policy: ViewerProtocolPolicy,
}

/// Legacy cache key settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForwardedValues {
    /// Whether the query string is part of the cache key.
    pub query_string: bool,
}

/// An origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Origin {
    /// Origin host name.
    pub domain_name: Value,
    /// Id referenced by cache behaviors.
    pub id: String,
    /// S3 origin settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_origin_config: Option<S3OriginConfig>,
}

/// S3 origin settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3OriginConfig {
    /// `origin-access-identity/cloudfront/<id>`.
    pub origin_access_identity: Value,
}

/// TLS certificate served to viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ViewerCertificate {
    /// ACM certificate ARN (must live in `us-east-1`).
    pub acm_certificate_arn: Value,
    /// Minimum TLS version.
    pub minimum_protocol_version: SecurityPolicyProtocol,
    /// SNI or dedicated IP.
    pub ssl_support_method: SslSupportMethod,
}
