//! Removal policy of stateful resources.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use sitestack_cfn_model::{DeletionPolicy, Resource};

use crate::error::SiteError;

/// What happens to a resource when it leaves the stack.
///
/// The settings table stores the policy as its upper-case name
/// (`"DESTROY"`, `"RETAIN"`, ...).
///
/// # Examples
///
/// ```
/// use sitestack_site::RemovalPolicy;
///
/// let policy: RemovalPolicy = "RETAIN".parse().unwrap();
/// assert_eq!(policy, RemovalPolicy::Retain);
/// assert!("KEEP".parse::<RemovalPolicy>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RemovalPolicy {
    /// Delete the physical resource.
    #[default]
    Destroy,
    /// Orphan the physical resource.
    Retain,
    /// Snapshot, then delete.
    Snapshot,
    /// Retain unless the resource failed during creation.
    RetainOnUpdateOrDelete,
}

impl RemovalPolicy {
    /// Every policy, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Destroy,
        Self::Retain,
        Self::Snapshot,
        Self::RetainOnUpdateOrDelete,
    ];

    /// The settings-table spelling of this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Destroy => "DESTROY",
            Self::Retain => "RETAIN",
            Self::Snapshot => "SNAPSHOT",
            Self::RetainOnUpdateOrDelete => "RETAIN_ON_UPDATE_OR_DELETE",
        }
    }

    /// The `DeletionPolicy` attribute this policy renders to.
    #[must_use]
    pub fn deletion_policy(&self) -> DeletionPolicy {
        match self {
            Self::Destroy => DeletionPolicy::Delete,
            Self::Retain => DeletionPolicy::Retain,
            Self::Snapshot => DeletionPolicy::Snapshot,
            Self::RetainOnUpdateOrDelete => DeletionPolicy::RetainExceptOnCreate,
        }
    }

    /// The `UpdateReplacePolicy` attribute this policy renders to.
    #[must_use]
    pub fn update_replace_policy(&self) -> DeletionPolicy {
        match self {
            Self::Destroy => DeletionPolicy::Delete,
            Self::Retain | Self::RetainOnUpdateOrDelete => DeletionPolicy::Retain,
            Self::Snapshot => DeletionPolicy::Snapshot,
        }
    }

    /// Set both policy attributes on a resource.
    #[must_use]
    pub fn apply(&self, resource: Resource) -> Resource {
        resource.with_policies(self.deletion_policy(), self.update_replace_policy())
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemovalPolicy {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| SiteError::InvalidRemovalPolicy(s.to_owned()))
    }
}

impl Serialize for RemovalPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_table_spellings() {
        assert_eq!("DESTROY".parse::<RemovalPolicy>().unwrap(), RemovalPolicy::Destroy);
        assert_eq!("RETAIN".parse::<RemovalPolicy>().unwrap(), RemovalPolicy::Retain);
        assert_eq!("SNAPSHOT".parse::<RemovalPolicy>().unwrap(), RemovalPolicy::Snapshot);
        assert_eq!(
            "RETAIN_ON_UPDATE_OR_DELETE".parse::<RemovalPolicy>().unwrap(),
            RemovalPolicy::RetainOnUpdateOrDelete
        );
    }

    #[test]
    fn test_should_reject_unknown_policy() {
        assert!(matches!(
            "destroy".parse::<RemovalPolicy>(),
            Err(SiteError::InvalidRemovalPolicy(s)) if s == "destroy"
        ));
        assert!("".parse::<RemovalPolicy>().is_err());
    }

    #[test]
    fn test_should_map_to_resource_policies() {
        assert_eq!(RemovalPolicy::Destroy.deletion_policy(), DeletionPolicy::Delete);
        assert_eq!(RemovalPolicy::Retain.update_replace_policy(), DeletionPolicy::Retain);
        assert_eq!(
            RemovalPolicy::RetainOnUpdateOrDelete.deletion_policy(),
            DeletionPolicy::RetainExceptOnCreate
        );
        assert_eq!(
            RemovalPolicy::RetainOnUpdateOrDelete.update_replace_policy(),
            DeletionPolicy::Retain
        );
    }
}
