//! Validation of names that end up in resource declarations.
//!
//! Checks run at synthesis time so a bad table row fails here instead of
//! halfway through a stack deployment. Bucket rules follow the
//! [Amazon S3 documentation](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html).

use std::net::Ipv4Addr;

use crate::error::{SiteError, SiteResult};

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Prefixes S3 reserves for its own naming schemes.
const RESERVED_BUCKET_PREFIXES: [&str; 2] = ["xn--", "sthree-"];

/// Suffixes S3 reserves for access point, Object Lambda and directory bucket aliases.
const RESERVED_BUCKET_SUFFIXES: [&str; 3] = ["-s3alias", "--ol-s3", "--x-s3"];

/// Maximum length of a domain name without the trailing dot.
const MAX_DOMAIN_NAME_LEN: usize = 253;

/// Maximum length of a single DNS label.
const MAX_LABEL_LEN: usize = 63;

/// Validate an S3 bucket name.
///
/// The site bucket is named after the site domain, so besides the S3 rules
/// (3-63 characters of lowercase letters, digits, hyphens and dots, starting
/// and ending with a letter or digit) this rejects names that are not usable
/// as a host name: empty labels and IPv4 addresses. Prefixes and suffixes S3
/// reserves (`xn--`, `sthree-`, `-s3alias`, `--ol-s3`, `--x-s3`) are refused.
///
/// # Errors
///
/// Returns [`SiteError::InvalidBucketName`] if any rule is violated.
///
/// # Examples
///
/// ```
/// use sitestack_site::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("prod.test.pro").is_ok());
/// assert!(validate_bucket_name("Prod.test.pro").is_err());
/// assert!(validate_bucket_name("sthree-site.test.pro").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> SiteResult<()> {
    let reject = |reason: String| SiteError::InvalidBucketName {
        name: name.to_owned(),
        reason,
    };

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&name.len()) {
        return Err(reject(format!(
            "Bucket name must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
        )));
    }

    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
    {
        return Err(reject(format!(
            "Bucket name must only contain lowercase letters, numbers, hyphens, and dots, found '{c}'"
        )));
    }

    let alphanumeric = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !alphanumeric(name.chars().next()) || !alphanumeric(name.chars().last()) {
        return Err(reject(
            "Bucket name must start and end with a letter or number".to_owned(),
        ));
    }

    if name.split('.').any(str::is_empty) {
        return Err(reject("Bucket name must not contain consecutive dots".to_owned()));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(reject(
            "Bucket name must not be formatted as an IP address".to_owned(),
        ));
    }

    if let Some(prefix) = RESERVED_BUCKET_PREFIXES.iter().find(|p| name.starts_with(*p)) {
        return Err(reject(format!("Bucket name must not start with '{prefix}'")));
    }

    if let Some(suffix) = RESERVED_BUCKET_SUFFIXES.iter().find(|s| name.ends_with(*s)) {
        return Err(reject(format!("Bucket name must not end with '{suffix}'")));
    }

    Ok(())
}

/// Validate a DNS domain name such as `test.pro` or `prod.test.pro`.
///
/// Labels are 1-63 characters of ASCII letters, digits, and hyphens, and do
/// not start or end with a hyphen. A single trailing dot is accepted.
///
/// # Errors
///
/// Returns [`SiteError::InvalidDomainName`] if any rule is violated.
pub fn validate_domain_name(name: &str) -> SiteResult<()> {
    let reject = |reason: String| SiteError::InvalidDomainName {
        name: name.to_owned(),
        reason,
    };
    let trimmed = name.strip_suffix('.').unwrap_or(name);

    if trimmed.is_empty() {
        return Err(reject("Domain name must not be empty".to_owned()));
    }
    if trimmed.len() > MAX_DOMAIN_NAME_LEN {
        return Err(reject(format!(
            "Domain name must not exceed {MAX_DOMAIN_NAME_LEN} characters"
        )));
    }

    for label in trimmed.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(reject(format!(
                "Label '{label}' must be between 1 and {MAX_LABEL_LEN} characters long"
            )));
        }
        if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(reject(format!(
                "Label '{label}' must only contain letters, numbers, and hyphens"
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(reject(format!(
                "Label '{label}' must not start or end with a hyphen"
            )));
        }
    }

    Ok(())
}

/// Join a subdomain and base domain the way the stack does.
///
/// # Examples
///
/// ```
/// use sitestack_site::validation::site_domain;
///
/// assert_eq!(site_domain("prod", "test.pro"), "prod.test.pro");
/// ```
#[must_use]
pub fn site_domain(site_sub_domain: &str, domain_name: &str) -> String {
    format!("{site_sub_domain}.{domain_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_valid_bucket_names() {
        assert!(validate_bucket_name("prod.test.pro").is_ok());
        assert!(validate_bucket_name("5de4b68.test.pro").is_ok());
        assert!(validate_bucket_name("abc").is_ok());
    }

    #[test]
    fn test_should_reject_invalid_bucket_names() {
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name(&"a".repeat(64)).is_err());
        assert!(validate_bucket_name("5DE4B68.test.pro").is_err());
        assert!(validate_bucket_name("-site.test.pro").is_err());
        assert!(validate_bucket_name("site..test.pro").is_err());
        assert!(validate_bucket_name("192.168.0.1").is_err());
        assert!(validate_bucket_name("xn--site").is_err());
        assert!(validate_bucket_name("site-s3alias").is_err());
        assert!(validate_bucket_name("site--ol-s3").is_err());
    }

    #[test]
    fn test_should_report_bucket_name_reason() {
        let err = validate_bucket_name("Site.test.pro").unwrap_err();
        assert!(err.to_string().contains("lowercase"));
    }

    #[test]
    fn test_should_reject_reserved_bucket_prefix() {
        let err = validate_bucket_name("sthree-site.test.pro").unwrap_err();
        assert!(matches!(
            &err,
            SiteError::InvalidBucketName { reason, .. } if reason.contains("'sthree-'")
        ));
        assert!(validate_bucket_name("three-site.test.pro").is_ok());
    }

    #[test]
    fn test_should_validate_domain_names() {
        assert!(validate_domain_name("test.pro").is_ok());
        assert!(validate_domain_name("test.pro.").is_ok());
        assert!(validate_domain_name("my-site.example.co.uk").is_ok());
        assert!(validate_domain_name("").is_err());
        assert!(validate_domain_name(".").is_err());
        assert!(validate_domain_name("test..pro").is_err());
        assert!(validate_domain_name("-test.pro").is_err());
        assert!(validate_domain_name("te_st.pro").is_err());
        assert!(validate_domain_name(&format!("{}.pro", "a".repeat(64))).is_err());
    }

    #[test]
    fn test_should_join_site_domain() {
        assert_eq!(site_domain("staging", "test.pro"), "staging.test.pro");
    }
}
