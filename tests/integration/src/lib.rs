//! End-to-end synthesis tests for SiteStack.
//!
//! Each test synthesizes a full stack from configuration, writes the cloud
//! assembly into a temporary directory, and inspects the files.
//!
//! ```text
//! cargo test -p sitestack-integration
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use sitestack_core::SiteStackConfig;
use sitestack_site::{SynthOutput, SynthRequest, synthesize};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Create a build directory with a small static site.
pub fn create_site_dir(root: &Path) -> Result<PathBuf> {
    let dir = root.join("dist");
    std::fs::create_dir_all(dir.join("static"))?;
    std::fs::write(dir.join("index.html"), "<!doctype html><title>site</title>")?;
    std::fs::write(dir.join("static/app.js"), "document.title = 'site';")?;
    Ok(dir)
}

/// Synthesize from configuration.
pub fn synth(config: &SiteStackConfig) -> Result<SynthOutput> {
    init_tracing();
    let request = SynthRequest::from_config(config).context("invalid configuration")?;
    synthesize(&request).context("synthesis failed")
}

/// Synthesize and write the assembly into `out`, returning the parsed
/// template and manifest.
pub fn synth_to_dir(
    config: &SiteStackConfig,
    out: &Path,
) -> Result<(serde_json::Value, serde_json::Value)> {
    let output = synth(config)?;
    let written = output.write_to(out)?;
    let template = serde_json::from_str(&std::fs::read_to_string(&written[0])?)?;
    let manifest = serde_json::from_str(&std::fs::read_to_string(&written[1])?)?;
    Ok((template, manifest))
}

/// Logical ids of every resource of `resource_type` in a rendered template.
#[must_use]
pub fn resources_of_type<'a>(template: &'a serde_json::Value, resource_type: &str) -> Vec<&'a str> {
    template["Resources"]
        .as_object()
        .map(|resources| {
            resources
                .iter()
                .filter(|(_, r)| r["Type"] == resource_type)
                .map(|(id, _)| id.as_str())
                .collect()
        })
        .unwrap_or_default()
}

mod test_settings;
mod test_synth;
