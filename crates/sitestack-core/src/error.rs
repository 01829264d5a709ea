//! Error types for the SiteStack core.

/// Core error type for SiteStack configuration and identifiers.
#[derive(Debug, thiserror::Error)]
pub enum SiteStackError {
    /// Invalid AWS account ID format.
    #[error("invalid AWS account ID: {0} (must be 12-digit numeric string or 'default')")]
    InvalidAccountId(String),

    /// Invalid CloudFormation stack name.
    #[error("invalid stack name: {name}: {reason}")]
    InvalidStackName {
        /// The rejected stack name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// A context key that SiteStack does not understand.
    #[error("unknown context key: {0}")]
    UnknownContextKey(String),

    /// A context entry that is not of the form `key=value`.
    #[error("malformed context entry '{0}' (expected key=value)")]
    MalformedContext(String),
}

/// Convenience result type for SiteStack core operations.
pub type SiteStackResult<T> = Result<T, SiteStackError>;
