//! Synthesis integration tests.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sitestack_cfn_model::Resolver;
    use sitestack_core::SiteStackConfig;
    use sitestack_site::SiteError;

    use crate::{create_site_dir, resources_of_type, synth, synth_to_dir};

    fn prod_config() -> SiteStackConfig {
        let mut config = SiteStackConfig::default();
        config.apply_context_entry("environment=prod").unwrap();
        config
    }

    #[test]
    fn test_should_synthesize_prod_site_url() {
        let output = synth(&prod_config()).unwrap();
        let resolver = Resolver::new(&output.template);
        assert_eq!(resolver.resolve_output("Site").unwrap(), "https://prod.test.pro");
    }

    #[test]
    fn test_should_write_cloud_assembly() {
        let out = tempfile::tempdir().unwrap();
        let (template, manifest) = synth_to_dir(&prod_config(), out.path()).unwrap();

        assert!(out.path().join("StaticSite.template.json").is_file());
        assert!(out.path().join("manifest.json").is_file());

        assert_eq!(template["Parameters"]["environmentName"]["AllowedValues"], json!(["prod"]));
        assert_eq!(
            template["Mappings"]["environmentSettings"]["prod"]["removalPolicy"],
            "RETAIN"
        );
        assert_eq!(
            template["Outputs"]["Site"]["Value"],
            json!({"Fn::Join": ["", ["https://", {"Fn::Join": [".", [
                {"Fn::FindInMap": ["environmentSettings", {"Ref": "environmentName"}, "siteSubDomain"]},
                {"Fn::FindInMap": ["environmentSettings", {"Ref": "environmentName"}, "domainName"]}
            ]]}]]})
        );
        assert_eq!(manifest["environment"], "prod");
        assert_eq!(manifest["outputs"], json!(["Bucket", "DistributionId", "Site"]));
    }

    #[test]
    fn test_should_declare_every_site_resource() {
        let out = tempfile::tempdir().unwrap();
        let (template, _) = synth_to_dir(&prod_config(), out.path()).unwrap();

        for resource_type in [
            "AWS::S3::Bucket",
            "AWS::S3::BucketPolicy",
            "AWS::CertificateManager::Certificate",
            "AWS::CloudFront::CloudFrontOriginAccessIdentity",
            "AWS::CloudFront::Distribution",
            "AWS::Route53::RecordSet",
        ] {
            assert_eq!(resources_of_type(&template, resource_type).len(), 1, "{resource_type}");
        }
        assert!(resources_of_type(&template, "Custom::CDKBucketDeployment").is_empty());
        assert!(resources_of_type(&template, "AWS::Route53::HostedZone").is_empty());

        let bucket = &template["Resources"]["SiteBucket397A1860"];
        assert_eq!(bucket["DeletionPolicy"], "Retain");
        assert_eq!(bucket["Metadata"]["aws:cdk:path"], "StaticSite/SiteBucket/Resource");
    }

    #[test]
    fn test_should_deploy_build_dir_with_invalidation() {
        let tmp = tempfile::tempdir().unwrap();
        let site = create_site_dir(tmp.path()).unwrap();
        let mut config = prod_config();
        config
            .apply_context_entry(&format!("buildDir={}", site.display()))
            .unwrap();

        let (template, manifest) = synth_to_dir(&config, &tmp.path().join("cdk.out")).unwrap();

        let deployments = resources_of_type(&template, "Custom::CDKBucketDeployment");
        assert_eq!(deployments, vec!["DeployWithInvalidationCustomResourceE3FF7455"]);
        let deployment = &template["Resources"][deployments[0]]["Properties"];
        assert_eq!(deployment["DistributionPaths"], json!(["/*"]));
        assert_eq!(deployment["Prune"], true);

        let asset = &manifest["assets"][0];
        assert_eq!(asset["objectCount"], 2);
        assert_eq!(
            deployment["SourceObjectKeys"][0],
            json!(format!("{}.zip", asset["id"].as_str().unwrap()))
        );
        assert_eq!(resources_of_type(&template, "AWS::Lambda::Function").len(), 1);
        assert_eq!(resources_of_type(&template, "AWS::IAM::Role").len(), 1);
    }

    #[test]
    fn test_should_fail_when_build_dir_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = prod_config();
        config.build_dir = Some(tmp.path().join("missing").display().to_string());

        let err = synth(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::AssetNotFound { .. })
        ));
    }

    #[test]
    fn test_should_declare_hosted_zone_from_context() {
        let mut config = prod_config();
        config.apply_context_entry("createZone=true").unwrap();
        let output = synth(&config).unwrap();
        let zones: Vec<_> = output.template.resources_of_type("AWS::Route53::HostedZone").collect();
        assert_eq!(zones.len(), 1);
        output.template.validate().unwrap();
    }

    #[test]
    fn test_should_reject_non_us_east_1_region() {
        let config = SiteStackConfig::builder().default_region("eu-central-1".to_owned()).build();
        let err = synth(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SiteError>(),
            Some(SiteError::CertificateRegion { .. })
        ));
    }

    #[test]
    fn test_should_write_identical_files_for_same_inputs() {
        let tmp = tempfile::tempdir().unwrap();
        let site = create_site_dir(tmp.path()).unwrap();
        let mut config = prod_config();
        config.build_dir = Some(site.display().to_string());

        let (a, _) = synth_to_dir(&config, &tmp.path().join("a")).unwrap();
        let (b, _) = synth_to_dir(&config, &tmp.path().join("b")).unwrap();
        assert_eq!(a, b);
    }
}
