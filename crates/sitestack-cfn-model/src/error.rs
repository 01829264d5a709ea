//! Template model error types.

/// Errors raised while building, validating, or resolving a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    // -----------------------------------------------------------------------
    // Construction errors
    // -----------------------------------------------------------------------
    /// A string that is not a member of a closed enumeration.
    #[error("unknown {kind} value: {value}")]
    UnknownEnumValue {
        /// Enumeration name.
        kind: &'static str,
        /// Rejected string.
        value: String,
    },

    /// Two entities were declared with the same logical id.
    #[error("duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    /// A construct path with no usable components.
    #[error("construct path must not be empty")]
    EmptyConstructPath,

    /// Resource properties could not be serialized.
    #[error("failed to serialize properties of {resource_type}: {source}")]
    Properties {
        /// CloudFormation resource type.
        resource_type: &'static str,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// The template could not be rendered to JSON.
    #[error("failed to render template: {0}")]
    Render(#[from] serde_json::Error),

    // -----------------------------------------------------------------------
    // Validation errors
    // -----------------------------------------------------------------------
    /// A `Ref`, `Fn::GetAtt`, or `DependsOn` that points at nothing.
    #[error("{from} references undeclared {kind} '{target}'")]
    DanglingReference {
        /// Entity holding the reference.
        from: String,
        /// Kind of entity expected (`resource`, `parameter`, `mapping`).
        kind: &'static str,
        /// Missing target name.
        target: String,
    },

    /// The resource graph contains a cycle.
    #[error("dependency cycle between resources: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),

    // -----------------------------------------------------------------------
    // Resolution errors
    // -----------------------------------------------------------------------
    /// A parameter without a value or default.
    #[error("parameter '{0}' has no value and no default")]
    MissingParameterValue(String),

    /// A parameter value outside its `AllowedValues`.
    #[error("parameter '{name}' value '{value}' is not one of: {}", .allowed.join(", "))]
    DisallowedParameterValue {
        /// Parameter name.
        name: String,
        /// Supplied value.
        value: String,
        /// Values the parameter accepts.
        allowed: Vec<String>,
    },

    /// `Fn::FindInMap` keys that are not present in the mapping.
    #[error("mapping '{map}' has no entry [{top_level_key}][{second_level_key}]")]
    MissingMappingEntry {
        /// Mapping name.
        map: String,
        /// First-level key.
        top_level_key: String,
        /// Second-level key.
        second_level_key: String,
    },

    /// A value that only exists once the stack is deployed.
    #[error("'{0}' is only known after deployment")]
    Unresolvable(String),

    /// An intrinsic whose arguments have the wrong shape.
    #[error("malformed intrinsic function: {0}")]
    MalformedIntrinsic(String),
}

/// Convenience result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
