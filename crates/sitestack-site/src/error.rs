//! Static-site error types.

use std::path::PathBuf;

use sitestack_cfn_model::TemplateError;
use sitestack_core::SiteStackError;

/// Errors raised while resolving settings, assembling the stack, or
/// synthesizing its output.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    // -----------------------------------------------------------------------
    // Settings errors
    // -----------------------------------------------------------------------
    /// An environment name outside the closed set.
    #[error("unknown environment '{name}' (expected one of: dev, staging, prod)")]
    UnknownEnvironment {
        /// The rejected name.
        name: String,
    },

    /// A settings key that the table does not define.
    #[error("unknown setting key: {0}")]
    UnknownSettingKey(String),

    /// A removal policy string with no matching policy.
    #[error("invalid removal policy '{0}' (expected DESTROY, RETAIN, SNAPSHOT or RETAIN_ON_UPDATE_OR_DELETE)")]
    InvalidRemovalPolicy(String),

    /// The settings table lacks a row for an environment.
    #[error("settings table has no row for environment '{0}'")]
    MissingEnvironment(String),

    /// A settings value that is empty.
    #[error("setting '{key}' for environment '{environment}' must not be empty")]
    EmptySetting {
        /// Environment of the row.
        environment: String,
        /// Setting key.
        key: String,
    },

    // -----------------------------------------------------------------------
    // Validation errors
    // -----------------------------------------------------------------------
    /// A domain name that DNS would not accept.
    #[error("invalid domain name: {name}: {reason}")]
    InvalidDomainName {
        /// The invalid name.
        name: String,
        /// The reason for the error.
        reason: String,
    },

    /// A site domain that S3 would not accept as a bucket name.
    #[error("invalid bucket name: {name}: {reason}")]
    InvalidBucketName {
        /// The invalid bucket name.
        name: String,
        /// The reason for the error.
        reason: String,
    },

    /// The stack targets a region CloudFront cannot take certificates from.
    #[error("CloudFront certificates must be issued in us-east-1, stack region is {region}")]
    CertificateRegion {
        /// The configured region.
        region: String,
    },

    // -----------------------------------------------------------------------
    // Asset errors
    // -----------------------------------------------------------------------
    /// The build directory does not exist.
    #[error("build directory not found: {}", path.display())]
    AssetNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The build path exists but is not a directory.
    #[error("build path is not a directory: {}", path.display())]
    AssetNotDirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// Filesystem error while reading assets or writing output.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    // -----------------------------------------------------------------------
    // Wrapped errors
    // -----------------------------------------------------------------------
    /// Template construction, validation, or resolution error.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] SiteStackError),

    /// JSON rendering error.
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for static-site operations.
pub type SiteResult<T> = Result<T, SiteError>;
