//! Logical id allocation from construct paths.
//!
//! Ids follow the AWS CDK scheme so that a template synthesized here keeps the
//! same logical ids as one produced by a CDK app with the same construct tree:
//! the alphanumeric "human" part of the path followed by the first 8 hex
//! digits (uppercase) of the MD5 of the path.

use md5::{Digest, Md5};

use crate::error::{TemplateError, TemplateResult};

/// Path component skipped entirely (`Default` children are transparent).
const HIDDEN_ID: &str = "Default";

/// Path component hidden from the human part but kept in the hash.
const HIDDEN_FROM_HUMAN_ID: &str = "Resource";

const HASH_LEN: usize = 8;
const MAX_HUMAN_LEN: usize = 240;
const MAX_ID_LEN: usize = 255;

/// Compute the logical id for a construct path relative to its stack.
///
/// # Examples
///
/// ```
/// use sitestack_cfn_model::logical_id;
///
/// assert_eq!(logical_id(&["SiteBucket", "Resource"]).unwrap(), "SiteBucket397A1860");
/// assert_eq!(logical_id(&["Site"]).unwrap(), "Site");
/// ```
pub fn logical_id<S: AsRef<str>>(components: &[S]) -> TemplateResult<String> {
    let components: Vec<&str> = components
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| *c != HIDDEN_ID)
        .collect();

    match components.as_slice() {
        [] => return Err(TemplateError::EmptyConstructPath),
        [single] => {
            let candidate = remove_non_alphanumeric(single);
            if candidate.is_empty() {
                return Err(TemplateError::EmptyConstructPath);
            }
            if candidate.len() <= MAX_ID_LEN {
                return Ok(candidate);
            }
        }
        _ => {}
    }

    let mut human: String = remove_dupes(&components)
        .into_iter()
        .filter(|c| *c != HIDDEN_FROM_HUMAN_ID)
        .map(remove_non_alphanumeric)
        .collect();
    human.truncate(MAX_HUMAN_LEN);

    Ok(human + &path_hash(&components))
}

fn path_hash(components: &[&str]) -> String {
    let digest = Md5::digest(components.join("/").as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(HASH_LEN);
    hash.to_ascii_uppercase()
}

fn remove_non_alphanumeric(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Drop components already implied by the previous one (`Site/Site` -> `Site`).
fn remove_dupes<'a>(components: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::with_capacity(components.len());
    for &component in components {
        if out.last().is_none_or(|prev| !prev.ends_with(component)) {
            out.push(component);
        }
    }
    out
}
