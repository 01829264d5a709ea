//! Command-line interface.
//!
//! Flags override the values `SiteStackConfig::from_env` loaded; `-c` entries
//! are applied last, in the order given.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sitestack_core::SiteStackConfig;

/// SiteStack - static site stack synthesizer
#[derive(Parser, Debug)]
#[command(name = "sitestack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Context entry `key=value` (environment, buildDir, domainName, hostedZoneId, createZone)
    #[arg(short = 'c', long = "context", value_name = "KEY=VALUE", global = true)]
    pub context: Vec<String>,

    /// Stack name
    #[arg(long, global = true)]
    pub stack_name: Option<String>,

    /// Target region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Target account id, or `default`
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Log level filter (ignored when RUST_LOG is set)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the template and manifest to the output directory
    Synth {
        /// Output directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print the template to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
    },

    /// Show the settings table
    Settings {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve every setting and output for one environment
    Resolve {
        /// Environment to resolve (defaults to the configured one)
        #[arg(short, long)]
        env: Option<String>,
    },
}

impl Cli {
    /// Apply flags and context entries on top of `config`.
    pub fn apply(&self, config: &mut SiteStackConfig) -> anyhow::Result<()> {
        if let Some(v) = &self.stack_name {
            config.stack_name.clone_from(v);
        }
        if let Some(v) = &self.region {
            config.default_region.clone_from(v);
        }
        if let Some(v) = &self.account {
            config.account.clone_from(v);
        }
        if let Some(v) = &self.log_level {
            config.log_level.clone_from(v);
        }
        if let Commands::Synth {
            out_dir: Some(dir), ..
        } = &self.command
        {
            config.out_dir = dir.display().to_string();
        }
        for entry in &self.context {
            config.apply_context_entry(entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_synth_with_context() {
        let cli = Cli::try_parse_from([
            "sitestack",
            "synth",
            "-c",
            "environment=prod",
            "--context",
            "buildDir=dist",
            "--stdout",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Synth { stdout: true, .. }));

        let mut config = SiteStackConfig::default();
        cli.apply(&mut config).unwrap();
        assert_eq!(config.environment, "prod");
        assert_eq!(config.build_dir.as_deref(), Some("dist"));
    }

    #[test]
    fn test_should_override_config_from_flags() {
        let cli = Cli::try_parse_from([
            "sitestack",
            "--stack-name",
            "Blog",
            "synth",
            "--out-dir",
            "out",
            "--region",
            "us-east-1",
        ])
        .unwrap();
        let mut config = SiteStackConfig::default();
        cli.apply(&mut config).unwrap();
        assert_eq!(config.stack_name, "Blog");
        assert_eq!(config.out_dir, "out");
    }

    #[test]
    fn test_should_reject_unknown_context_key() {
        let cli = Cli::try_parse_from(["sitestack", "settings", "-c", "bucket=x"]).unwrap();
        let mut config = SiteStackConfig::default();
        assert!(cli.apply(&mut config).is_err());
    }

    #[test]
    fn test_should_require_subcommand() {
        assert!(Cli::try_parse_from(["sitestack"]).is_err());
    }
}
