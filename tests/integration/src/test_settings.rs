//! Settings resolution integration tests.

#[cfg(test)]
mod tests {
    use sitestack_cfn_model::{DeletionPolicy, Resolver, TemplateError};
    use sitestack_core::SiteStackConfig;
    use sitestack_site::settings::{PARAMETER_NAME, deferred_setting};
    use sitestack_site::{EnvironmentName, SettingKey, SiteError};

    use crate::synth;

    #[test]
    fn test_should_resolve_each_environment_from_its_template() {
        let expected = [
            (EnvironmentName::Dev, "5DE4B68", "https://5DE4B68.test.pro"),
            (EnvironmentName::Staging, "staging", "https://staging.test.pro"),
            (EnvironmentName::Prod, "prod", "https://prod.test.pro"),
        ];

        for (env, sub_domain, url) in expected {
            let mut config = SiteStackConfig::default();
            config.apply_context_entry(&format!("environment={env}")).unwrap();
            let output = synth(&config).unwrap();
            let resolver = Resolver::new(&output.template).with_parameter(PARAMETER_NAME, env.as_str());
            assert_eq!(
                resolver.resolve_string(&deferred_setting(SettingKey::DomainName)).unwrap(),
                "test.pro"
            );
            assert_eq!(
                resolver.resolve_string(&deferred_setting(SettingKey::SiteSubDomain)).unwrap(),
                sub_domain
            );
            assert_eq!(resolver.resolve_output("Site").unwrap(), url);
        }
    }

    #[test]
    fn test_should_reject_unknown_environment_parameter() {
        let output = synth(&SiteStackConfig::default()).unwrap();
        let resolver = Resolver::new(&output.template).with_parameter(PARAMETER_NAME, "qa");
        assert!(matches!(
            resolver.resolve_output("Site"),
            Err(TemplateError::DisallowedParameterValue { .. })
        ));
    }

    #[test]
    fn test_should_share_destroyable_template_between_dev_and_staging() {
        let output = synth(&SiteStackConfig::default()).unwrap();
        let resolver = Resolver::new(&output.template).with_parameter(PARAMETER_NAME, "staging");
        assert_eq!(resolver.resolve_output("Site").unwrap(), "https://staging.test.pro");
    }

    #[test]
    fn test_should_refuse_dev_template_deployed_as_prod() {
        let output = synth(&SiteStackConfig::default()).unwrap();
        let bucket = output.template.resource("SiteBucket397A1860").unwrap();
        assert_eq!(bucket.deletion_policy, Some(DeletionPolicy::Delete));

        let resolver = Resolver::new(&output.template).with_parameter(PARAMETER_NAME, "prod");
        assert!(matches!(
            resolver.resolve_json(bucket.property("BucketName").unwrap()),
            Err(TemplateError::DisallowedParameterValue { value, .. }) if value == "prod"
        ));
    }

    #[test]
    fn test_should_reject_unknown_environment_context() {
        let mut config = SiteStackConfig::default();
        config.apply_context_entry("environment=qa").unwrap();
        let err = synth(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::UnknownEnvironment { name }) if name == "qa"
        ));
    }

    #[test]
    fn test_should_apply_domain_context() {
        let mut config = SiteStackConfig::default();
        config.apply_context_entry("domainName=example.org").unwrap();
        config.apply_context_entry("hostedZoneId=Z0EXAMPLE").unwrap();
        let output = synth(&config).unwrap();

        let resolver = Resolver::new(&output.template).with_parameter(PARAMETER_NAME, "staging");
        assert_eq!(resolver.resolve_output("Site").unwrap(), "https://staging.example.org");
        assert_eq!(
            resolver.resolve_string(&deferred_setting(SettingKey::HostedZoneId)).unwrap(),
            "Z0EXAMPLE"
        );
    }

    #[test]
    fn test_should_reject_domain_that_is_not_a_bucket_name() {
        let mut config = SiteStackConfig::default();
        config.apply_context_entry("domainName=bad_domain.pro").unwrap();
        let err = synth(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::InvalidDomainName { .. })
        ));
    }
}
