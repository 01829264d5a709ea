//! `AWS::Route53::*` resources.

use serde::Serialize;

use super::Tag;
use crate::template::ResourceProperties;
use crate::types::RecordType;
use crate::value::Value;

/// Fixed hosted zone id of every CloudFront distribution alias target.
pub const CLOUDFRONT_ALIAS_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// `AWS::Route53::HostedZone`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZone {
    /// Zone apex, e.g. `test.pro.`.
    pub name: Value,
    /// Zone tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosted_zone_tags: Vec<Tag>,
}

impl ResourceProperties for HostedZone {
    const RESOURCE_TYPE: &'static str = "AWS::Route53::HostedZone";
}

/// `AWS::Route53::RecordSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordSet {
    /// Record name.
    pub name: Value,
    /// Record type.
    #[serde(rename = "Type")]
    pub record_type: RecordType,
    /// Zone the record lives in.
    pub hosted_zone_id: Value,
    /// Alias target; mutually exclusive with plain resource records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<AliasTarget>,
}

impl ResourceProperties for RecordSet {
    const RESOURCE_TYPE: &'static str = "AWS::Route53::RecordSet";
}

/// Target of an alias record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasTarget {
    /// DNS name of the target.
    #[serde(rename = "DNSName")]
    pub dns_name: Value,
    /// Hosted zone of the target.
    #[serde(rename = "HostedZoneId")]
    pub hosted_zone_id: Value,
}

impl AliasTarget {
    /// Alias to a CloudFront distribution domain name.
    #[must_use]
    pub fn cloudfront(dns_name: Value) -> Self {
        Self {
            dns_name,
            hosted_zone_id: Value::lit(CLOUDFRONT_ALIAS_ZONE_ID),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_render_cloudfront_alias_record() {
        let record = RecordSet {
            name: Value::lit("prod.test.pro"),
            record_type: RecordType::A,
            hosted_zone_id: Value::lit("Z123"),
            alias_target: Some(AliasTarget::cloudfront(Value::get_att("Dist", "DomainName"))),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "Name": "prod.test.pro",
                "Type": "A",
                "HostedZoneId": "Z123",
                "AliasTarget": {
                    "DNSName": {"Fn::GetAtt": ["Dist", "DomainName"]},
                    "HostedZoneId": "Z2FDTNDATAQYW2"
                }
            })
        );
    }
}
