//! Assembly of the static-site resource graph.
//!
//! Construct tree (paths are relative to the stack):
//!
//! ```text
//! SiteBucket/Resource                 AWS::S3::Bucket
//! SiteBucket/Policy/Resource          AWS::S3::BucketPolicy
//! SiteZone/Resource                   AWS::Route53::HostedZone (create_zone only)
//! SiteCertificate/Resource            AWS::CertificateManager::Certificate
//! SiteOai/Resource                    AWS::CloudFront::CloudFrontOriginAccessIdentity
//! SiteDistribution/Resource           AWS::CloudFront::Distribution
//! SiteAliasRecord/Resource            AWS::Route53::RecordSet
//! DeploymentHandler/ServiceRole/...   AWS::IAM::Role            (asset only)
//! DeploymentHandler/Resource          AWS::Lambda::Function     (asset only)
//! DeployWithInvalidation/CustomResource/Default
//!                                     Custom::CDKBucketDeployment (asset only)
//! ```

use sitestack_cfn_model::resources::Tag;
use sitestack_cfn_model::resources::acm::{Certificate, DomainValidationOption};
use sitestack_cfn_model::resources::cloudfront::{
    CloudFrontOriginAccessIdentity, CustomErrorResponse, DefaultCacheBehavior, Distribution,
    DistributionConfig, ForwardedValues, Origin, OriginAccessIdentityConfig, S3OriginConfig,
    ViewerCertificate,
};
use sitestack_cfn_model::resources::custom::BucketDeployment;
use sitestack_cfn_model::resources::iam::{InlinePolicy, PolicyDocument, PolicyStatement, Principal, Role};
use sitestack_cfn_model::resources::lambda::{Code, Function};
use sitestack_cfn_model::resources::route53::{AliasTarget, HostedZone, RecordSet};
use sitestack_cfn_model::resources::s3::{Bucket, BucketPolicy, PublicAccessBlockConfiguration, WebsiteConfiguration};
use sitestack_cfn_model::types::{
    HttpVersion, PriceClass, RecordType, SecurityPolicyProtocol, SslSupportMethod, ValidationMethod,
    ViewerProtocolPolicy,
};
use sitestack_cfn_model::{Output, PseudoParameter, Resource, ResourceProperties, Template, Value, logical_id};
use sitestack_core::{AccountId, AwsRegion, SiteStackConfig, StackName};
use typed_builder::TypedBuilder;

use crate::asset::AssetSource;
use crate::error::{SiteError, SiteResult};
use crate::settings::{CompiledSettings, EnvironmentName, SettingKey, SettingsTable, compile_settings};

/// Tag applied to every taggable resource, valued with the site domain.
pub const SITE_TAG_KEY: &str = "siteItems";

/// Document served for `/` and for every missing key.
pub const INDEX_DOCUMENT: &str = "index.html";

/// Region CloudFront reads viewer certificates from.
pub const CERTIFICATE_REGION: &str = "us-east-1";

const ORIGIN_ID: &str = "SiteBucketOrigin";
const HANDLER_RUNTIME: &str = "python3.11";
const HANDLER_ENTRY_POINT: &str = "index.handler";
const HANDLER_MEMORY_MIB: u32 = 128;
const HANDLER_TIMEOUT_SECS: u32 = 900;
const LAMBDA_BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

/// Inputs of stack assembly that do not come from the settings table.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct StackProps {
    /// Stack name, also the root of every construct path.
    #[builder(default)]
    pub stack_name: StackName,
    /// Environment the template is synthesized for.
    #[builder(default)]
    pub environment: EnvironmentName,
    /// Target region.
    #[builder(default)]
    pub region: AwsRegion,
    /// Target account.
    #[builder(default)]
    pub account: AccountId,
    /// Declare a hosted zone instead of referencing one by id.
    #[builder(default = false)]
    pub create_zone: bool,
    /// Bootstrap qualifier of the asset staging bucket.
    #[builder(default = String::from("hnb659fds"), setter(into))]
    pub asset_qualifier: String,
    /// Key of the deployment handler package in the staging bucket.
    #[builder(default = String::from("bucket-deployment-handler.zip"), setter(into))]
    pub deployment_handler_key: String,
}

impl StackProps {
    /// Build props from configuration, validating its strings.
    pub fn from_config(config: &SiteStackConfig) -> SiteResult<Self> {
        Ok(Self {
            stack_name: StackName::new(config.stack_name.clone())?,
            environment: config.environment.parse()?,
            region: AwsRegion::new(config.default_region.clone()),
            account: AccountId::new(config.account.clone())?,
            create_zone: config.create_zone,
            asset_qualifier: config.asset_qualifier.clone(),
            deployment_handler_key: config.deployment_handler_key.clone(),
        })
    }

    /// `Fn::Sub` value of the asset staging bucket name.
    ///
    /// A concrete account is written into the name; an environment-agnostic
    /// one is left to the `AWS::AccountId` pseudo parameter.
    #[must_use]
    pub fn staging_bucket(&self) -> Value {
        Value::sub(format!(
            "cdk-{}-assets-{}-${{AWS::Region}}",
            self.asset_qualifier,
            self.account_placeholder()
        ))
    }

    fn staging_bucket_arn(&self) -> Value {
        Value::sub(format!(
            "arn:${{AWS::Partition}}:s3:::cdk-{}-assets-{}-${{AWS::Region}}",
            self.asset_qualifier,
            self.account_placeholder()
        ))
    }

    fn account_placeholder(&self) -> String {
        if self.account.is_environment_agnostic() {
            format!("${{{}}}", PseudoParameter::AccountId.as_str())
        } else {
            self.account.to_string()
        }
    }
}

/// Logical ids of the declared resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIds {
    /// Site bucket.
    pub bucket: String,
    /// Bucket policy granting the origin access identity read access.
    pub bucket_policy: String,
    /// Hosted zone, when declared by the stack.
    pub zone: Option<String>,
    /// Viewer certificate.
    pub certificate: String,
    /// Origin access identity.
    pub origin_access_identity: String,
    /// CloudFront distribution.
    pub distribution: String,
    /// Alias record pointing the site domain at the distribution.
    pub alias_record: String,
    /// Deployment custom resource.
    pub deployment: Option<String>,
    /// Function backing the deployment.
    pub deployment_handler: Option<String>,
    /// Execution role of the deployment function.
    pub deployment_role: Option<String>,
}

/// An assembled static-site stack.
#[derive(Debug, Clone)]
pub struct StaticSiteStack {
    template: Template,
    settings: CompiledSettings,
    ids: ResourceIds,
}

impl StaticSiteStack {
    /// Declare every resource of the site into a fresh template.
    ///
    /// The deployment action and its handler are only declared when `asset`
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::CertificateRegion`] outside `us-east-1`, and
    /// template errors for duplicate ids or unresolvable settings.
    pub fn build(props: &StackProps, table: &SettingsTable, asset: Option<&AssetSource>) -> SiteResult<Self> {
        if props.region.as_str() != CERTIFICATE_REGION {
            return Err(SiteError::CertificateRegion {
                region: props.region.to_string(),
            });
        }

        let mut template = Template::new();
        template.set_description(format!(
            "Static site {} ({})",
            props.stack_name, props.environment
        ));
        let settings = compile_settings(&mut template, table, props.environment)?;

        let mut scope = Scope {
            stack_name: props.stack_name.as_str(),
            template: &mut template,
        };
        let site_domain = settings.site_domain();
        let site_tag = || vec![Tag::new(SITE_TAG_KEY, settings.site_domain())];

        // Storage
        let bucket = scope.add(
            &["SiteBucket", "Resource"],
            settings.removal_policy().apply(Resource::new(&Bucket {
                bucket_name: Some(settings.bucket_name()),
                website_configuration: Some(WebsiteConfiguration {
                    index_document: INDEX_DOCUMENT.to_owned(),
                    error_document: Some(INDEX_DOCUMENT.to_owned()),
                }),
                public_access_block_configuration: Some(PublicAccessBlockConfiguration::BLOCK_ALL),
                tags: site_tag(),
            })?),
        )?;

        // DNS
        let zone = if props.create_zone {
            Some(scope.declare(
                &["SiteZone", "Resource"],
                &HostedZone {
                    name: settings.get_value(SettingKey::DomainName),
                    hosted_zone_tags: site_tag(),
                },
            )?)
        } else {
            None
        };
        let zone_id = zone.as_ref().map_or_else(
            || settings.get_value(SettingKey::HostedZoneId),
            Value::reference,
        );

        let certificate = scope.declare(
            &["SiteCertificate", "Resource"],
            &Certificate {
                domain_name: site_domain.clone(),
                domain_validation_options: vec![DomainValidationOption {
                    domain_name: site_domain.clone(),
                    hosted_zone_id: zone_id.clone(),
                }],
                validation_method: ValidationMethod::Dns,
                tags: site_tag(),
            },
        )?;

        // Origin access
        let oai = scope.declare(
            &["SiteOai", "Resource"],
            &CloudFrontOriginAccessIdentity {
                cloud_front_origin_access_identity_config: OriginAccessIdentityConfig {
                    comment: Value::join("", [Value::lit("OAI for "), site_domain.clone()]),
                },
            },
        )?;
        let bucket_policy = scope.declare(
            &["SiteBucket", "Policy", "Resource"],
            &BucketPolicy {
                bucket: Value::reference(&bucket),
                policy_document: PolicyDocument::new(vec![
                    PolicyStatement::allow(["s3:GetObject"], vec![objects_of(&bucket)])
                        .with_principal(Principal::CanonicalUser(Value::get_att(&oai, "S3CanonicalUserId"))),
                ]),
            },
        )?;

        // Distribution
        let distribution = scope.declare(
            &["SiteDistribution", "Resource"],
            &Distribution {
                distribution_config: distribution_config(&settings, &bucket, &oai, &certificate),
                tags: site_tag(),
            },
        )?;
        let alias_record = scope.declare(
            &["SiteAliasRecord", "Resource"],
            &RecordSet {
                name: site_domain.clone(),
                record_type: RecordType::A,
                hosted_zone_id: zone_id,
                alias_target: Some(AliasTarget::cloudfront(Value::get_att(&distribution, "DomainName"))),
            },
        )?;

        // Deployment
        let (deployment, deployment_handler, deployment_role) = match asset {
            Some(asset) => {
                let (deployment, handler, role) =
                    declare_deployment(&mut scope, props, asset, &bucket, &distribution, site_tag())?;
                (Some(deployment), Some(handler), Some(role))
            }
            None => {
                tracing::info!("no build directory given, skipping deployment action");
                (None, None, None)
            }
        };

        template.add_output(
            "Site",
            Output::new(settings.site_url()).with_description("Public URL of the site"),
        )?;
        template.add_output(
            "Bucket",
            Output::new(Value::reference(&bucket)).with_description("Name of the site bucket"),
        )?;
        template.add_output(
            "DistributionId",
            Output::new(Value::reference(&distribution)).with_description("CloudFront distribution id"),
        )?;

        tracing::info!(
            stack = %props.stack_name,
            environment = %props.environment,
            removal_policy = %settings.removal_policy(),
            resources = template.resources().len(),
            "assembled static site stack"
        );

        Ok(Self {
            template,
            settings,
            ids: ResourceIds {
                bucket,
                bucket_policy,
                zone,
                certificate,
                origin_access_identity: oai,
                distribution,
                alias_record,
                deployment,
                deployment_handler,
                deployment_role,
            },
        })
    }

    /// The assembled template.
    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Consume the stack, keeping only its template.
    #[must_use]
    pub fn into_template(self) -> Template {
        self.template
    }

    /// The compiled settings handle.
    #[must_use]
    pub fn settings(&self) -> &CompiledSettings {
        &self.settings
    }

    /// Logical ids of the declared resources.
    #[must_use]
    pub fn ids(&self) -> &ResourceIds {
        &self.ids
    }
}

/// Adds resources under the stack's construct path.
struct Scope<'a> {
    stack_name: &'a str,
    template: &'a mut Template,
}

impl Scope<'_> {
    fn add(&mut self, path: &[&str], resource: Resource) -> SiteResult<String> {
        let id = logical_id(path)?;
        let full_path = format!("{}/{}", self.stack_name, path.join("/"));
        tracing::debug!(logical_id = %id, path = %full_path, resource_type = %resource.resource_type, "declaring resource");
        self.template.add_resource(id.clone(), resource.with_path(full_path))?;
        Ok(id)
    }

    fn declare<P: ResourceProperties>(&mut self, path: &[&str], properties: &P) -> SiteResult<String> {
        self.add(path, Resource::new(properties)?)
    }
}

fn objects_of(bucket: &str) -> Value {
    Value::join("", [Value::get_att(bucket, "Arn"), Value::lit("/*")])
}

fn distribution_config(
    settings: &CompiledSettings,
    bucket: &str,
    oai: &str,
    certificate: &str,
) -> DistributionConfig {
    DistributionConfig {
        aliases: vec![settings.site_domain()],
        custom_error_responses: vec![CustomErrorResponse {
            error_code: 403,
            response_code: Some(200),
            response_page_path: Some(format!("/{INDEX_DOCUMENT}")),
            error_caching_min_ttl: Some(200),
        }],
        default_cache_behavior: DefaultCacheBehavior {
            allowed_methods: vec!["GET".into(), "HEAD".into(), "OPTIONS".into()],
            cached_methods: vec!["GET".into(), "HEAD".into()],
            compress: true,
            forwarded_values: ForwardedValues { query_string: false },
            target_origin_id: ORIGIN_ID.to_owned(),
            viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
        },
        default_root_object: Some(INDEX_DOCUMENT.to_owned()),
        enabled: true,
        http_version: HttpVersion::Http2,
        ipv6_enabled: true,
        origins: vec![Origin {
            domain_name: Value::get_att(bucket, "RegionalDomainName"),
            id: ORIGIN_ID.to_owned(),
            s3_origin_config: Some(S3OriginConfig {
                origin_access_identity: Value::join(
                    "",
                    [Value::lit("origin-access-identity/cloudfront/"), Value::reference(oai)],
                ),
            }),
        }],
        price_class: PriceClass::PriceClass100,
        viewer_certificate: Some(ViewerCertificate {
            acm_certificate_arn: Value::reference(certificate),
            minimum_protocol_version: SecurityPolicyProtocol::TlsV12_2021,
            ssl_support_method: SslSupportMethod::SniOnly,
        }),
    }
}

fn declare_deployment(
    scope: &mut Scope<'_>,
    props: &StackProps,
    asset: &AssetSource,
    bucket: &str,
    distribution: &str,
    tags: Vec<Tag>,
) -> SiteResult<(String, String, String)> {
    let staging_arn = props.staging_bucket_arn();

    let mut role = Role::for_service("lambda.amazonaws.com");
    role.managed_policy_arns.push(Value::join(
        "",
        [
            Value::lit("arn:"),
            Value::pseudo(PseudoParameter::Partition),
            Value::lit(format!(":iam::aws:policy/{LAMBDA_BASIC_EXECUTION_POLICY}")),
        ],
    ));
    role.policies.push(InlinePolicy {
        policy_name: "DeploymentPolicy".to_owned(),
        policy_document: PolicyDocument::new(vec![
            PolicyStatement::allow(
                ["s3:GetObject*", "s3:GetBucket*", "s3:List*"],
                vec![
                    staging_arn.clone(),
                    Value::join("", [staging_arn, Value::lit("/*")]),
                ],
            ),
            PolicyStatement::allow(
                [
                    "s3:GetObject*",
                    "s3:GetBucket*",
                    "s3:List*",
                    "s3:DeleteObject*",
                    "s3:PutObject",
                    "s3:PutObjectLegalHold",
                    "s3:PutObjectRetention",
                    "s3:PutObjectTagging",
                    "s3:PutObjectVersionTagging",
                    "s3:Abort*",
                ],
                vec![Value::get_att(bucket, "Arn"), objects_of(bucket)],
            ),
            PolicyStatement::allow(
                ["cloudfront:GetInvalidation", "cloudfront:CreateInvalidation"],
                vec![Value::lit("*")],
            ),
        ]),
    });
    role.tags = tags;
    let role = scope.declare(&["DeploymentHandler", "ServiceRole", "Resource"], &role)?;

    let handler = scope.declare(
        &["DeploymentHandler", "Resource"],
        &Function {
            code: Code {
                s3_bucket: props.staging_bucket(),
                s3_key: Value::lit(&props.deployment_handler_key),
            },
            handler: HANDLER_ENTRY_POINT.to_owned(),
            memory_size: HANDLER_MEMORY_MIB,
            role: Value::get_att(&role, "Arn"),
            runtime: HANDLER_RUNTIME.to_owned(),
            timeout: HANDLER_TIMEOUT_SECS,
        },
    )?;

    let deployment = scope.declare(
        &["DeployWithInvalidation", "CustomResource", "Default"],
        &BucketDeployment {
            service_token: Value::get_att(&handler, "Arn"),
            source_bucket_names: vec![props.staging_bucket()],
            source_object_keys: vec![Value::lit(asset.object_key())],
            destination_bucket_name: Value::reference(bucket),
            prune: true,
            retain_on_delete: false,
            distribution_id: Some(Value::reference(distribution)),
            distribution_paths: vec!["/*".to_owned()],
        },
    )?;

    tracing::info!(
        asset = %asset.fingerprint(),
        objects = asset.objects().len(),
        bytes = asset.total_size(),
        "declared deployment with invalidation"
    );

    Ok((deployment, handler, role))
}
