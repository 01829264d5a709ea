//! Core types, configuration, and errors for SiteStack.
//!
//! This crate provides the building blocks shared by the template model, the
//! static-site stack, and the CLI: the environment-driven configuration and
//! common AWS identifiers.

mod config;
mod error;
mod types;

pub use config::{ContextKey, SiteStackConfig};
pub use error::{SiteStackError, SiteStackResult};
pub use types::{AccountId, AwsRegion, StackName};
