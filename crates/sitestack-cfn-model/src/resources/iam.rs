//! IAM policy documents and `AWS::IAM::Role`.

use serde::Serialize;

use super::Tag;
use crate::template::ResourceProperties;
use crate::value::Value;

/// IAM policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";

/// An IAM policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version.
    pub version: &'static str,
    /// Statements.
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Document holding the given statements.
    #[must_use]
    pub fn new(statement: Vec<PolicyStatement>) -> Self {
        Self {
            version: POLICY_VERSION,
            statement,
        }
    }
}

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    /// Grant.
    Allow,
}

/// Who a resource policy statement applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Principal {
    /// An AWS service, e.g. `lambda.amazonaws.com`.
    Service(String),
    /// A canonical user id, e.g. a CloudFront origin access identity.
    CanonicalUser(Value),
}

/// One policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    /// Allow or deny.
    pub effect: Effect,
    /// Principal, for resource and trust policies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    /// Actions, e.g. `s3:GetObject`.
    pub action: Vec<String>,
    /// Resources the statement covers; omitted in trust policies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<Value>,
}

impl PolicyStatement {
    /// An `Allow` statement.
    #[must_use]
    pub fn allow<I, S>(actions: I, resources: Vec<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            effect: Effect::Allow,
            principal: None,
            action: actions.into_iter().map(Into::into).collect(),
            resource: resources,
        }
    }

    /// Attach a principal.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }
}

/// `AWS::IAM::Role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    /// Trust policy.
    pub assume_role_policy_document: PolicyDocument,
    /// Managed policies attached to the role.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<Value>,
    /// Inline policies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<InlinePolicy>,
    /// Resource tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl ResourceProperties for Role {
    const RESOURCE_TYPE: &'static str = "AWS::IAM::Role";
}

impl Role {
    /// A role assumable by the given service principal.
    #[must_use]
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            assume_role_policy_document: PolicyDocument::new(vec![
                PolicyStatement::allow(["sts:AssumeRole"], Vec::new())
                    .with_principal(Principal::Service(service.into())),
            ]),
            managed_policy_arns: Vec::new(),
            policies: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// A policy embedded in a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlinePolicy {
    /// Policy name, unique within the role.
    pub policy_name: String,
    /// Policy document.
    pub policy_document: PolicyDocument,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_render_service_trust_policy() {
        let role = Role::for_service("lambda.amazonaws.com");
        assert_eq!(
            serde_json::to_value(&role).unwrap(),
            json!({
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": {"Service": "lambda.amazonaws.com"},
                        "Action": ["sts:AssumeRole"]
                    }]
                }
            })
        );
    }

    #[test]
    fn test_should_render_canonical_user_principal() {
        let statement = PolicyStatement::allow(["s3:GetObject"], vec![Value::lit("arn:aws:s3:::b/*")])
            .with_principal(Principal::CanonicalUser(Value::get_att("Oai", "S3CanonicalUserId")));
        assert_eq!(
            serde_json::to_value(&statement).unwrap(),
            json!({
                "Effect": "Allow",
                "Principal": {"CanonicalUser": {"Fn::GetAtt": ["Oai", "S3CanonicalUserId"]}},
                "Action": ["s3:GetObject"],
                "Resource": ["arn:aws:s3:::b/*"]
            })
        );
    }
}
