//! Common AWS identifiers shared across the workspace.

use std::fmt;

use crate::error::{SiteStackError, SiteStackResult};

/// AWS Account ID (12-digit string), or the environment-agnostic `default`.
///
/// An environment-agnostic account renders as the `AWS::AccountId` pseudo
/// parameter, leaving the choice of account to deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Placeholder meaning "whatever account the stack is deployed into".
    pub const DEFAULT: &str = "default";

    /// Create a new account ID from a string.
    ///
    /// # Errors
    /// Returns an error if the account ID is neither `default` nor a 12-digit
    /// numeric string.
    pub fn new(id: impl Into<String>) -> SiteStackResult<Self> {
        let id = id.into();
        if id == Self::DEFAULT {
            return Ok(Self(id));
        }
        if id.len() != 12 || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(SiteStackError::InvalidAccountId(id));
        }
        Ok(Self(id))
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the account is left to be resolved at deploy time.
    #[must_use]
    pub fn is_environment_agnostic(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// AWS Region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Default region. CloudFront only accepts ACM certificates issued here.
    pub const DEFAULT: &str = "us-east-1";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// CloudFormation stack name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StackName(String);

impl StackName {
    /// Stack name used when none is configured.
    pub const DEFAULT: &str = "StaticSite";

    const MAX_LEN: usize = 128;

    /// Create a validated stack name.
    ///
    /// Rules: 1-128 characters, starts with a letter, and contains only ASCII
    /// letters, digits, and hyphens.
    ///
    /// # Errors
    /// Returns [`SiteStackError::InvalidStackName`] if any rule is violated.
    pub fn new(name: impl Into<String>) -> SiteStackResult<Self> {
        let name = name.into();
        let reject = |reason: &str| SiteStackError::InvalidStackName {
            name: name.clone(),
            reason: reason.to_owned(),
        };

        if name.is_empty() || name.len() > Self::MAX_LEN {
            return Err(reject("must be between 1 and 128 characters long"));
        }
        if !name.as_bytes()[0].is_ascii_alphabetic() {
            return Err(reject("must start with a letter"));
        }
        if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(reject("must only contain letters, digits, and hyphens"));
        }
        Ok(Self(name))
    }

    /// Get the stack name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StackName {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
