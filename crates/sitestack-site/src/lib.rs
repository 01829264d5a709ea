//! Static-site stack for SiteStack.
//!
//! Turns an environment name and a settings table into a CloudFormation
//! template declaring a private S3 bucket behind a CloudFront distribution,
//! with an ACM certificate, a Route53 alias record, and a deployment action
//! that syncs a local build directory into the bucket.
//!
//! # Architecture
//!
//! ```text
//! SiteStackConfig ──> StackProps ─┐
//!                                  │
//! SettingsTable ──> compile_settings ──> CompiledSettings (FindInMap handles)
//!                                  │
//! AssetSource (build dir) ─────────┤
//!                                  v
//!                         StaticSiteStack::build
//!                                  │
//!                                  v
//!                   synthesize ──> SynthOutput::write_to(out_dir)
//! ```

pub mod asset;
pub mod error;
pub mod removal;
pub mod settings;
pub mod stack;
pub mod synth;
pub mod validation;

pub use asset::{AssetObject, AssetSource};
pub use error::{SiteError, SiteResult};
pub use removal::RemovalPolicy;
pub use settings::{
    CompiledSettings, ContextDefaults, EnvironmentName, EnvironmentSettings, SettingKey,
    SettingsTable, compile_settings,
};
pub use stack::{ResourceIds, StackProps, StaticSiteStack};
pub use synth::{Manifest, SynthOutput, SynthRequest, synthesize};
