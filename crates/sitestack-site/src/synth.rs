//! Synthesis of the stack into a cloud assembly directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sitestack_cfn_model::Template;
use sitestack_core::SiteStackConfig;
use typed_builder::TypedBuilder;

use crate::asset::AssetSource;
use crate::error::{SiteError, SiteResult};
use crate::settings::{ContextDefaults, EnvironmentName, SettingsTable};
use crate::stack::{StackProps, StaticSiteStack};

/// Version of the manifest layout.
pub const MANIFEST_VERSION: &str = "1";

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Everything needed to synthesize one stack.
#[derive(Debug, Clone, TypedBuilder)]
pub struct SynthRequest {
    /// Stack identity and target.
    pub props: StackProps,
    /// Settings table.
    pub table: SettingsTable,
    /// Build output to deploy, if any.
    #[builder(default, setter(strip_option, into))]
    pub build_dir: Option<PathBuf>,
}

impl SynthRequest {
    /// Build a request from configuration using the standard settings table.
    pub fn from_config(config: &SiteStackConfig) -> SiteResult<Self> {
        Ok(Self {
            props: StackProps::from_config(config)?,
            table: SettingsTable::standard(&ContextDefaults::from(config))?,
            build_dir: config.build_dir.as_ref().map(PathBuf::from),
        })
    }
}

/// An asset recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestAsset {
    /// Content fingerprint.
    pub id: String,
    /// Local source directory.
    pub path: PathBuf,
    /// How the directory is packaged for upload.
    pub packaging: &'static str,
    /// Key of the packaged archive in the staging bucket.
    pub object_key: String,
    /// Number of files.
    pub object_count: usize,
    /// Total size of the files in bytes.
    pub size: u64,
}

/// A resource recorded in the manifest, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResource {
    /// Logical id.
    pub logical_id: String,
    /// CloudFormation type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Construct path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Summary of a synthesized stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest layout version.
    pub version: &'static str,
    /// Stack name.
    pub stack_name: String,
    /// Environment the template defaults to.
    pub environment: EnvironmentName,
    /// Target region.
    pub region: String,
    /// Target account.
    pub account: String,
    /// Template file name, relative to the manifest.
    pub template_file: String,
    /// Assets to upload before deployment.
    pub assets: Vec<ManifestAsset>,
    /// Resources in creation order.
    pub resources: Vec<ManifestResource>,
    /// Output names.
    pub outputs: Vec<String>,
}

/// A validated template and its manifest.
#[derive(Debug, Clone)]
pub struct SynthOutput {
    /// The template.
    pub template: Template,
    /// The manifest.
    pub manifest: Manifest,
}

impl SynthOutput {
    /// The template as pretty-printed JSON.
    pub fn template_json(&self) -> SiteResult<String> {
        Ok(self.template.to_json_string()?)
    }

    /// Write the template and manifest into `dir`, creating it if needed.
    ///
    /// Returns the paths written.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> SiteResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| SiteError::io(dir, e))?;

        let template_path = dir.join(&self.manifest.template_file);
        let mut template_json = self.template_json()?;
        template_json.push('\n');
        std::fs::write(&template_path, template_json).map_err(|e| SiteError::io(&template_path, e))?;

        let manifest_path = dir.join(MANIFEST_FILE);
        let mut manifest_json = serde_json::to_string_pretty(&self.manifest)?;
        manifest_json.push('\n');
        std::fs::write(&manifest_path, manifest_json).map_err(|e| SiteError::io(&manifest_path, e))?;

        tracing::info!(
            dir = %dir.display(),
            template = %template_path.display(),
            "wrote cloud assembly"
        );

        Ok(vec![template_path, manifest_path])
    }
}

/// Assemble, validate, and summarize the stack.
///
/// # Errors
///
/// Fails if the build directory is missing, the stack cannot be assembled, or
/// the template has dangling references or a dependency cycle.
///
/// # Examples
///
/// ```
/// use sitestack_site::{ContextDefaults, EnvironmentName, SettingsTable, StackProps, SynthRequest, synthesize};
///
/// let request = SynthRequest::builder()
///     .props(StackProps::builder().environment(EnvironmentName::Prod).build())
///     .table(SettingsTable::standard(&ContextDefaults::default()).unwrap())
///     .build();
/// let output = synthesize(&request).unwrap();
/// assert_eq!(output.manifest.template_file, "StaticSite.template.json");
/// ```
pub fn synthesize(request: &SynthRequest) -> SiteResult<SynthOutput> {
    let asset = request
        .build_dir
        .as_deref()
        .map(AssetSource::from_dir)
        .transpose()?;

    let stack = StaticSiteStack::build(&request.props, &request.table, asset.as_ref())?;
    let template = stack.into_template();
    template.validate()?;

    let order = template.graph()?.topological_order()?;
    let resources = order
        .into_iter()
        .filter_map(|id| {
            template.resource(&id).map(|resource| ManifestResource {
                resource_type: resource.resource_type.clone(),
                path: resource.path().map(str::to_owned),
                logical_id: id,
            })
        })
        .collect();

    let props = &request.props;
    let manifest = Manifest {
        version: MANIFEST_VERSION,
        stack_name: props.stack_name.to_string(),
        environment: props.environment,
        region: props.region.to_string(),
        account: props.account.to_string(),
        template_file: format!("{}.template.json", props.stack_name),
        assets: asset
            .iter()
            .map(|asset| ManifestAsset {
                id: asset.fingerprint().to_owned(),
                path: asset.path().to_path_buf(),
                packaging: "zip",
                object_key: asset.object_key(),
                object_count: asset.objects().len(),
                size: asset.total_size(),
            })
            .collect(),
        resources,
        outputs: template.outputs().keys().cloned().collect(),
    };

    tracing::info!(
        stack = %manifest.stack_name,
        environment = %manifest.environment,
        resources = manifest.resources.len(),
        assets = manifest.assets.len(),
        "synthesized stack"
    );

    Ok(SynthOutput { template, manifest })
}
