//! Per-environment settings and their deferred lookup.
//!
//! The settings table is rendered into the template as the
//! `environmentSettings` mapping, keyed by the `environmentName` parameter.
//! [`CompiledSettings::get_value`] therefore never returns a concrete string:
//! it returns an `Fn::FindInMap` value that CloudFormation evaluates when the
//! stack is deployed. Only the removal policy is fixed at synthesis time,
//! because `DeletionPolicy` does not accept intrinsic functions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use sitestack_cfn_model::{Mapping, Parameter, Template, Value};
use sitestack_core::SiteStackConfig;
use typed_builder::TypedBuilder;

use crate::error::{SiteError, SiteResult};
use crate::removal::RemovalPolicy;
use crate::validation::{site_domain, validate_bucket_name, validate_domain_name};

/// Name of the settings mapping in the template.
pub const MAPPING_NAME: &str = "environmentSettings";

/// Name of the parameter selecting the mapping row.
pub const PARAMETER_NAME: &str = "environmentName";

/// Derived mapping column holding the lower-cased site domain.
pub const BUCKET_NAME_KEY: &str = "bucketName";

// ---------------------------------------------------------------------------
// Environment names and keys
// ---------------------------------------------------------------------------

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EnvironmentName {
    /// Development.
    #[default]
    Dev,
    /// Pre-production.
    Staging,
    /// Production.
    Prod,
}

impl EnvironmentName {
    /// Every environment, in declaration order.
    pub const ALL: [Self; 3] = [Self::Dev, Self::Staging, Self::Prod];

    /// The environment name as used in context and the mapping.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentName {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "prod" => Ok(Self::Prod),
            _ => Err(SiteError::UnknownEnvironment { name: s.to_owned() }),
        }
    }
}

impl Serialize for EnvironmentName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A column of the settings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Base domain, e.g. `test.pro`.
    DomainName,
    /// Label prepended to the base domain.
    SiteSubDomain,
    /// Route53 hosted zone of the base domain.
    HostedZoneId,
    /// Removal policy name, e.g. `RETAIN`.
    RemovalPolicy,
}

impl SettingKey {
    /// Every key, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::DomainName,
        Self::SiteSubDomain,
        Self::HostedZoneId,
        Self::RemovalPolicy,
    ];

    /// The key as stored in the mapping.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DomainName => "domainName",
            Self::SiteSubDomain => "siteSubDomain",
            Self::HostedZoneId => "hostedZoneId",
            Self::RemovalPolicy => "removalPolicy",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SiteError::UnknownSettingKey(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Settings table
// ---------------------------------------------------------------------------

/// One row of the settings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSettings {
    /// Base domain.
    #[builder(setter(into))]
    pub domain_name: String,
    /// Label prepended to the base domain.
    #[builder(setter(into))]
    pub site_sub_domain: String,
    /// Hosted zone of the base domain.
    #[builder(setter(into))]
    pub hosted_zone_id: String,
    /// Removal policy name.
    #[builder(setter(into))]
    pub removal_policy: String,
}

impl EnvironmentSettings {
    /// The value stored under `key`.
    #[must_use]
    pub fn get(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::DomainName => &self.domain_name,
            SettingKey::SiteSubDomain => &self.site_sub_domain,
            SettingKey::HostedZoneId => &self.hosted_zone_id,
            SettingKey::RemovalPolicy => &self.removal_policy,
        }
    }

    /// `siteSubDomain.domainName`.
    #[must_use]
    pub fn site_domain(&self) -> String {
        site_domain(&self.site_sub_domain, &self.domain_name)
    }

    /// The site domain in the form S3 accepts as a bucket name.
    #[must_use]
    pub fn bucket_name(&self) -> String {
        self.site_domain().to_ascii_lowercase()
    }

    /// The parsed removal policy.
    pub fn removal_policy(&self) -> SiteResult<RemovalPolicy> {
        self.removal_policy.parse()
    }

    fn validate(&self, environment: EnvironmentName) -> SiteResult<()> {
        for key in SettingKey::ALL {
            if self.get(key).trim().is_empty() {
                return Err(SiteError::EmptySetting {
                    environment: environment.to_string(),
                    key: key.to_string(),
                });
            }
        }
        validate_domain_name(&self.domain_name)?;
        validate_domain_name(&self.site_domain())?;
        validate_bucket_name(&self.bucket_name())?;
        self.removal_policy()?;
        Ok(())
    }
}

/// Values shared by every row of the standard table.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ContextDefaults {
    /// Base domain.
    #[builder(default = String::from("test.pro"), setter(into))]
    pub domain_name: String,
    /// Hosted zone of the base domain.
    #[builder(default = String::from("Z0000000TESTPRO"), setter(into))]
    pub hosted_zone_id: String,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<&SiteStackConfig> for ContextDefaults {
    fn from(config: &SiteStackConfig) -> Self {
        Self {
            domain_name: config.domain_name.clone(),
            hosted_zone_id: config.hosted_zone_id.clone(),
        }
    }
}

/// Immutable lookup table from environment to settings.
///
/// Every environment has a row, and every row has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SettingsTable {
    rows: BTreeMap<EnvironmentName, EnvironmentSettings>,
}

impl SettingsTable {
    /// The standard table: `5DE4B68` for dev, `staging`, and `prod`, all on
    /// the default domain. Only prod retains its bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitestack_site::{ContextDefaults, EnvironmentName, SettingsTable};
    ///
    /// let table = SettingsTable::standard(&ContextDefaults::default()).unwrap();
    /// let prod = table.row(EnvironmentName::Prod).unwrap();
    /// assert_eq!(prod.site_domain(), "prod.test.pro");
    /// ```
    pub fn standard(defaults: &ContextDefaults) -> SiteResult<Self> {
        let row = |sub_domain: &str, removal: RemovalPolicy| {
            EnvironmentSettings::builder()
                .domain_name(defaults.domain_name.clone())
                .site_sub_domain(sub_domain)
                .hosted_zone_id(defaults.hosted_zone_id.clone())
                .removal_policy(removal.as_str())
                .build()
        };
        Self::from_rows([
            (EnvironmentName::Dev, row("5DE4B68", RemovalPolicy::Destroy)),
            (EnvironmentName::Staging, row("staging", RemovalPolicy::Destroy)),
            (EnvironmentName::Prod, row("prod", RemovalPolicy::Retain)),
        ])
    }

    /// Build a table from explicit rows.
    ///
    /// # Errors
    ///
    /// Fails if an environment has no row or a row fails validation.
    pub fn from_rows<I>(rows: I) -> SiteResult<Self>
    where
        I: IntoIterator<Item = (EnvironmentName, EnvironmentSettings)>,
    {
        let rows: BTreeMap<_, _> = rows.into_iter().collect();
        for environment in EnvironmentName::ALL {
            let row = rows
                .get(&environment)
                .ok_or_else(|| SiteError::MissingEnvironment(environment.to_string()))?;
            row.validate(environment)?;
        }
        Ok(Self { rows })
    }

    /// The row of one environment.
    pub fn row(&self, environment: EnvironmentName) -> SiteResult<&EnvironmentSettings> {
        self.rows
            .get(&environment)
            .ok_or_else(|| SiteError::MissingEnvironment(environment.to_string()))
    }

    /// The concrete value of one cell.
    pub fn lookup(&self, environment: EnvironmentName, key: SettingKey) -> SiteResult<&str> {
        Ok(self.row(environment)?.get(key))
    }

    /// Rows in environment order.
    pub fn rows(&self) -> impl Iterator<Item = (EnvironmentName, &EnvironmentSettings)> {
        self.rows.iter().map(|(env, row)| (*env, row))
    }

    /// Render the table as the `environmentSettings` mapping.
    #[must_use]
    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        for (environment, row) in &self.rows {
            for key in SettingKey::ALL {
                mapping.insert(environment.as_str(), key.as_str(), row.get(key));
            }
            mapping.insert(environment.as_str(), BUCKET_NAME_KEY, row.bucket_name());
        }
        mapping
    }
}

// ---------------------------------------------------------------------------
// Compiled settings
// ---------------------------------------------------------------------------

/// Settings declared into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSettings {
    environment: EnvironmentName,
    removal_policy: RemovalPolicy,
}

impl CompiledSettings {
    /// Deferred lookup of one setting for the deployed environment.
    #[must_use]
    pub fn get_value(&self, key: SettingKey) -> Value {
        deferred_setting(key)
    }

    /// `siteSubDomain.domainName`, deferred.
    #[must_use]
    pub fn site_domain(&self) -> Value {
        Value::join(
            ".",
            [
                self.get_value(SettingKey::SiteSubDomain),
                self.get_value(SettingKey::DomainName),
            ],
        )
    }

    /// Lower-cased site domain, deferred.
    #[must_use]
    pub fn bucket_name(&self) -> Value {
        lookup(BUCKET_NAME_KEY)
    }

    /// `https://` followed by the site domain, deferred.
    #[must_use]
    pub fn site_url(&self) -> Value {
        Value::join("", [Value::lit("https://"), self.site_domain()])
    }

    /// Removal policy of the environment the template was synthesized for.
    #[must_use]
    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal_policy
    }

    /// Environment the template was synthesized for.
    #[must_use]
    pub fn environment(&self) -> EnvironmentName {
        self.environment
    }
}

/// `Fn::FindInMap` of one setting, keyed by the environment parameter.
///
/// Valid in any template that went through [`compile_settings`].
#[must_use]
pub fn deferred_setting(key: SettingKey) -> Value {
    lookup(key.as_str())
}

/// Environments a template with `removal_policy` may be deployed to.
fn deployable_environments(
    table: &SettingsTable,
    removal_policy: RemovalPolicy,
) -> SiteResult<Vec<EnvironmentName>> {
    let mut allowed = Vec::with_capacity(EnvironmentName::ALL.len());
    for env in EnvironmentName::ALL {
        if table.row(env)?.removal_policy()? == removal_policy {
            allowed.push(env);
        }
    }
    Ok(allowed)
}

fn lookup(key: &str) -> Value {
    Value::find_in_map(MAPPING_NAME, Value::reference(PARAMETER_NAME), Value::lit(key))
}

/// Declare the settings mapping and the environment parameter.
///
/// The parameter defaults to `environment`. Retention cannot follow the
/// parameter, so it only accepts environments whose removal policy matches
/// the one applied at synthesis.
pub fn compile_settings(
    template: &mut Template,
    table: &SettingsTable,
    environment: EnvironmentName,
) -> SiteResult<CompiledSettings> {
    let removal_policy = table.row(environment)?.removal_policy()?;
    let allowed = deployable_environments(table, removal_policy)?;

    template.add_mapping(MAPPING_NAME, table.to_mapping())?;
    template.add_parameter(
        PARAMETER_NAME,
        Parameter::string()
            .with_default(environment.as_str())
            .with_allowed_values(allowed.iter().map(EnvironmentName::as_str))
            .with_description("Deployment environment selecting the settings row"),
    )?;

    tracing::debug!(
        environment = %environment,
        removal_policy = %removal_policy,
        allowed = ?allowed,
        "compiled settings"
    );

    Ok(CompiledSettings {
        environment,
        removal_policy,
    })
}
