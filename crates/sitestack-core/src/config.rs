//! SiteStack configuration.
//!
//! Provides [`SiteStackConfig`]. Values are loaded from environment variables
//! and may then be overridden by synthesis context entries (`key=value`), the
//! same way `cdk synth -c key=value` feeds a CDK app.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{SiteStackError, SiteStackResult};

/// Synthesis configuration.
///
/// # Examples
///
/// ```
/// use sitestack_core::SiteStackConfig;
///
/// let config = SiteStackConfig::default();
/// assert_eq!(config.stack_name, "StaticSite");
/// assert_eq!(config.environment, "dev");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SiteStackConfig {
    /// CloudFormation stack name.
    #[builder(default = String::from("StaticSite"))]
    pub stack_name: String,

    /// Deployment environment used as the `environmentName` parameter default.
    #[builder(default = String::from("dev"))]
    pub environment: String,

    /// Region the stack is synthesized for.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,

    /// Target account, or `default` for an environment-agnostic stack.
    #[builder(default = String::from("default"))]
    pub account: String,

    /// Directory the template and manifest are written to.
    #[builder(default = String::from("cdk.out"))]
    pub out_dir: String,

    /// Local build output uploaded by the deployment action.
    #[builder(default, setter(strip_option))]
    pub build_dir: Option<String>,

    /// Base domain used by every row of the settings table.
    #[builder(default = String::from("test.pro"))]
    pub domain_name: String,

    /// Route53 hosted zone id for `domain_name`.
    #[builder(default = String::from("Z0000000TESTPRO"))]
    pub hosted_zone_id: String,

    /// Declare a new hosted zone instead of referencing `hosted_zone_id`.
    #[builder(default = false)]
    pub create_zone: bool,

    /// Bootstrap qualifier of the asset staging bucket.
    #[builder(default = String::from("hnb659fds"))]
    pub asset_qualifier: String,

    /// Object key of the bucket-deployment handler package in the staging bucket.
    #[builder(default = String::from("bucket-deployment-handler.zip"))]
    pub deployment_handler_key: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for SiteStackConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SiteStackConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SITESTACK_STACK_NAME` | `StaticSite` |
    /// | `SITESTACK_ENVIRONMENT` | `dev` |
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `SITESTACK_ACCOUNT` | `default` |
    /// | `SITESTACK_OUT_DIR` | `cdk.out` |
    /// | `SITESTACK_BUILD_DIR` | *(unset)* |
    /// | `SITESTACK_DOMAIN_NAME` | `test.pro` |
    /// | `SITESTACK_HOSTED_ZONE_ID` | `Z0000000TESTPRO` |
    /// | `SITESTACK_CREATE_ZONE` | `false` |
    /// | `SITESTACK_ASSET_QUALIFIER` | `hnb659fds` |
    /// | `SITESTACK_DEPLOYMENT_HANDLER_KEY` | `bucket-deployment-handler.zip` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("SITESTACK_STACK_NAME") {
            config.stack_name = v;
        }
        if let Ok(v) = std::env::var("SITESTACK_ENVIRONMENT") {
            config.environment = v;
        }
        if let Ok(v) = std::env::var("DEFAULT_REGION") {
            config.default_region = v;
        }
        if let Ok(v) = std::env::var("SITESTACK_ACCOUNT") {
            config.account = v;
        }
        if let Ok(v) = std::env::var("SITESTACK_OUT_DIR") {
            config.out_dir = v;
        }
        if let Ok(v) = std::env::var("SITESTACK_BUILD_DIR") {
            config.build_dir = Some(v);
        }
        if let Ok(v) = std::env::var("SITESTACK_DOMAIN_NAME") {
            config.domain_name = v;
        }
        if let Ok(v) = std::env::var("SITESTACK_HOSTED_ZONE_ID") {
            config.hosted_zone_id = v;
        }
        if let Ok(v) = std::env::var("SITESTACK_CREATE_ZONE") {
            config.create_zone = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("SITESTACK_ASSET_QUALIFIER") {
            config.asset_qualifier = v;
        }
        if let Ok(v) = std::env::var("SITESTACK_DEPLOYMENT_HANDLER_KEY") {
            config.deployment_handler_key = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Apply a single `key=value` context entry.
    pub fn apply_context_entry(&mut self, entry: &str) -> SiteStackResult<()> {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| SiteStackError::MalformedContext(entry.to_owned()))?;
        let key: ContextKey = key.trim().parse()?;
        self.apply_context(key, value.trim());
        Ok(())
    }

    /// Override one configuration value from synthesis context.
    pub fn apply_context(&mut self, key: ContextKey, value: &str) {
        tracing::debug!(key = %key, value, "applying context value");
        match key {
            ContextKey::Environment => self.environment = value.to_owned(),
            ContextKey::BuildDir => self.build_dir = Some(value.to_owned()),
            ContextKey::DomainName => self.domain_name = value.to_owned(),
            ContextKey::HostedZoneId => self.hosted_zone_id = value.to_owned(),
            ContextKey::CreateZone => self.create_zone = parse_bool(value),
        }
    }
}

/// Context keys accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    /// `environment`: the active deployment environment.
    Environment,
    /// `buildDir`: local directory synced into the site bucket.
    BuildDir,
    /// `domainName`: base domain of the settings table.
    DomainName,
    /// `hostedZoneId`: id of the existing hosted zone.
    HostedZoneId,
    /// `createZone`: declare the hosted zone instead of referencing it.
    CreateZone,
}

impl ContextKey {
    /// Every accepted key.
    pub const ALL: [Self; 5] = [
        Self::Environment,
        Self::BuildDir,
        Self::DomainName,
        Self::HostedZoneId,
        Self::CreateZone,
    ];

    /// Returns the context key as written on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::BuildDir => "buildDir",
            Self::DomainName => "domainName",
            Self::HostedZoneId => "hostedZoneId",
            Self::CreateZone => "createZone",
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextKey {
    type Err = SiteStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SiteStackError::UnknownContextKey(s.to_owned()))
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = SiteStackConfig::default();
        assert_eq!(config.stack_name, "StaticSite");
        assert_eq!(config.environment, "dev");
        assert_eq!(config.default_region, "us-east-1");
        assert_eq!(config.account, "default");
        assert_eq!(config.out_dir, "cdk.out");
        assert!(config.build_dir.is_none());
        assert_eq!(config.domain_name, "test.pro");
        assert!(!config.create_zone);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_should_load_from_env() {
        let config = SiteStackConfig::from_env();
        assert!(!config.stack_name.is_empty());
    }

    #[test]
    fn test_should_build_with_typed_builder() {
        let config = SiteStackConfig::builder()
            .stack_name("Docs".into())
            .environment("prod".into())
            .build_dir("dist".into())
            .create_zone(true)
            .build();

        assert_eq!(config.stack_name, "Docs");
        assert_eq!(config.environment, "prod");
        assert_eq!(config.build_dir.as_deref(), Some("dist"));
        assert!(config.create_zone);
    }

    #[test]
    fn test_should_apply_context_entries() {
        let mut config = SiteStackConfig::default();
        config.apply_context_entry("environment=prod").unwrap();
        config.apply_context_entry("buildDir=./build").unwrap();
        config.apply_context_entry("domainName = example.org").unwrap();
        config.apply_context_entry("createZone=TRUE").unwrap();

        assert_eq!(config.environment, "prod");
        assert_eq!(config.build_dir.as_deref(), Some("./build"));
        assert_eq!(config.domain_name, "example.org");
        assert!(config.create_zone);
    }

    #[test]
    fn test_should_reject_unknown_or_malformed_context() {
        let mut config = SiteStackConfig::default();
        assert!(matches!(
            config.apply_context_entry("region=eu-west-1"),
            Err(SiteStackError::UnknownContextKey(k)) if k == "region"
        ));
        assert!(matches!(
            config.apply_context_entry("environment"),
            Err(SiteStackError::MalformedContext(_))
        ));
    }

    #[test]
    fn test_should_serialize_to_camel_case_json() {
        let json = serde_json::to_string(&SiteStackConfig::default()).expect("test serialization");
        assert!(json.contains("stackName"));
        assert!(json.contains("hostedZoneId"));
    }

    #[test]
    fn test_should_parse_bool_values() {
        assert!(parse_bool("1"));
        assert!(parse_bool("True"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(""));
    }
}
