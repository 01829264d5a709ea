//! SiteStack - synthesize a static site stack.
//!
//! Produces a CloudFormation template declaring a private S3 bucket behind a
//! CloudFront distribution, an ACM certificate, a Route53 alias record, and a
//! deployment action for the local build output.
//!
//! # Usage
//!
//! ```text
//! sitestack synth -c environment=prod -c buildDir=dist
//! sitestack settings --json
//! sitestack resolve --env staging
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SITESTACK_STACK_NAME` | `StaticSite` | Stack name |
//! | `SITESTACK_ENVIRONMENT` | `dev` | Default environment |
//! | `DEFAULT_REGION` | `us-east-1` | Target region |
//! | `SITESTACK_ACCOUNT` | `default` | Target account |
//! | `SITESTACK_OUT_DIR` | `cdk.out` | Output directory |
//! | `SITESTACK_BUILD_DIR` | *(unset)* | Build output to deploy |
//! | `SITESTACK_DOMAIN_NAME` | `test.pro` | Base domain |
//! | `SITESTACK_HOSTED_ZONE_ID` | `Z0000000TESTPRO` | Hosted zone id |
//! | `SITESTACK_CREATE_ZONE` | `false` | Declare the hosted zone |
//! | `SITESTACK_ASSET_QUALIFIER` | `hnb659fds` | Bootstrap qualifier of the staging bucket |
//! | `SITESTACK_DEPLOYMENT_HANDLER_KEY` | `bucket-deployment-handler.zip` | Handler code key |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use sitestack_cfn_model::Resolver;
use sitestack_core::SiteStackConfig;
use sitestack_site::settings::{PARAMETER_NAME, deferred_setting};
use sitestack_site::{EnvironmentName, SettingKey, SynthRequest, synthesize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
/// Logs go to stderr so templates printed to stdout stay machine-readable.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn synth(config: &SiteStackConfig, stdout: bool) -> Result<()> {
    let request = SynthRequest::from_config(config).context("invalid synthesis configuration")?;
    let output = synthesize(&request).context("failed to synthesize stack")?;

    if stdout {
        println!("{}", output.template_json()?);
        return Ok(());
    }

    let written = output
        .write_to(&config.out_dir)
        .with_context(|| format!("failed to write cloud assembly to {}", config.out_dir))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn show_settings(config: &SiteStackConfig, json: bool) -> Result<()> {
    let request = SynthRequest::from_config(config).context("invalid synthesis configuration")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&request.table)?);
        return Ok(());
    }

    println!(
        "{:<8} {:<12} {:<14} {:<18} {:<10} siteDomain",
        "env", "domainName", "siteSubDomain", "hostedZoneId", "removal"
    );
    for (env, row) in request.table.rows() {
        println!(
            "{:<8} {:<12} {:<14} {:<18} {:<10} {}",
            env,
            row.domain_name,
            row.site_sub_domain,
            row.hosted_zone_id,
            row.removal_policy,
            row.site_domain()
        );
    }
    Ok(())
}

fn resolve(config: &SiteStackConfig, env: Option<&str>) -> Result<()> {
    let environment: EnvironmentName = env
        .unwrap_or(&config.environment)
        .parse()
        .context("invalid environment")?;
    let mut request =
        SynthRequest::from_config(config).context("invalid synthesis configuration")?;
    request.props.environment = environment;
    request.build_dir = None;
    let output = synthesize(&request).context("failed to synthesize stack")?;

    let template = &output.template;
    let resolver = Resolver::new(template).with_parameter(PARAMETER_NAME, environment.as_str());
    for key in SettingKey::ALL {
        let value = resolver
            .resolve_string(&deferred_setting(key))
            .with_context(|| format!("failed to resolve {key}"))?;
        println!("{key}={value}");
    }
    let site = resolver
        .resolve_output("Site")
        .context("failed to resolve Site output")?;
    println!("Site={site}");

    info!(environment = %environment, "resolved settings");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SiteStackConfig::from_env();
    cli.apply(&mut config)?;

    init_tracing(&config.log_level)?;

    match &cli.command {
        Commands::Synth { stdout, .. } => synth(&config, *stdout),
        Commands::Settings { json } => show_settings(&config, *json),
        Commands::Resolve { env } => resolve(&config, env.as_deref()),
    }
}
