//! Template, parameters, mappings, resources, and outputs.

use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{TemplateError, TemplateResult};
use crate::graph::ResourceGraph;
use crate::types::{DeletionPolicy, ParameterType};
use crate::value::{Reference, Value, collect_references};

/// Template format version written into every template.
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Metadata key recording the construct path of a resource.
pub const PATH_METADATA_KEY: &str = "aws:cdk:path";

/// Typed properties of one CloudFormation resource type.
pub trait ResourceProperties: Serialize {
    /// CloudFormation type name, e.g. `AWS::S3::Bucket`.
    const RESOURCE_TYPE: &'static str;
}

/// A template parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    /// Parameter type.
    #[serde(rename = "Type")]
    pub param_type: ParameterType,
    /// Value used when none is supplied at deploy time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Closed set of accepted values; empty means unrestricted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// A `String` parameter with no default or constraints.
    #[must_use]
    pub fn string() -> Self {
        Self {
            param_type: ParameterType::String,
            default: None,
            allowed_values: Vec::new(),
            description: None,
        }
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restrict the parameter to a closed set of values.
    #[must_use]
    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check a candidate value against `AllowedValues`.
    pub fn check_value(&self, name: &str, value: &str) -> TemplateResult<()> {
        if self.allowed_values.is_empty() || self.allowed_values.iter().any(|v| v == value) {
            Ok(())
        } else {
            Err(TemplateError::DisallowedParameterValue {
                name: name.to_owned(),
                value: value.to_owned(),
                allowed: self.allowed_values.clone(),
            })
        }
    }
}

/// A two-level string lookup table (`Mappings` section).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Mapping(BTreeMap<String, BTreeMap<String, String>>);

impl Mapping {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `[top_level_key][second_level_key] = value`.
    pub fn insert(
        &mut self,
        top_level_key: impl Into<String>,
        second_level_key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.0
            .entry(top_level_key.into())
            .or_default()
            .insert(second_level_key.into(), value.into());
    }

    /// Look up `[top_level_key][second_level_key]`.
    #[must_use]
    pub fn find(&self, top_level_key: &str, second_level_key: &str) -> Option<&str> {
        self.0
            .get(top_level_key)
            .and_then(|row| row.get(second_level_key))
            .map(String::as_str)
    }

    /// First-level keys in sorted order.
    pub fn top_level_keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A declared resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// CloudFormation resource type.
    #[serde(rename = "Type")]
    pub resource_type: String,
    /// Rendered properties.
    #[serde(rename = "Properties", skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Explicit ordering edges in addition to the implicit reference edges.
    #[serde(rename = "DependsOn", skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,
    /// What happens to the physical resource when it leaves the stack.
    #[serde(rename = "DeletionPolicy", skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
    /// What happens to the old physical resource on replacement.
    #[serde(rename = "UpdateReplacePolicy", skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<DeletionPolicy>,
    /// Free-form metadata.
    #[serde(rename = "Metadata", skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Resource {
    /// Render typed properties into a resource declaration.
    pub fn new<P: ResourceProperties>(properties: &P) -> TemplateResult<Self> {
        let rendered = serde_json::to_value(properties).map_err(|source| {
            TemplateError::Properties {
                resource_type: P::RESOURCE_TYPE,
                source,
            }
        })?;
        let properties = match rendered {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        Ok(Self {
            resource_type: P::RESOURCE_TYPE.to_owned(),
            properties,
            depends_on: BTreeSet::new(),
            deletion_policy: None,
            update_replace_policy: None,
            metadata: BTreeMap::new(),
        })
    }

    /// Set the deletion and update-replace policies.
    #[must_use]
    pub fn with_policies(mut self, deletion: DeletionPolicy, update_replace: DeletionPolicy) -> Self {
        self.deletion_policy = Some(deletion);
        self.update_replace_policy = Some(update_replace);
        self
    }

    /// Record the construct path in the resource metadata.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.metadata
            .insert(PATH_METADATA_KEY.to_owned(), serde_json::Value::String(path.into()));
        self
    }

    /// Add an explicit `DependsOn` edge.
    pub fn add_dependency(&mut self, logical_id: impl Into<String>) {
        self.depends_on.insert(logical_id.into());
    }

    /// A top-level property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    /// The construct path recorded in metadata, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.metadata
            .get(PATH_METADATA_KEY)
            .and_then(serde_json::Value::as_str)
    }

    /// References made from within the properties.
    #[must_use]
    pub fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        for value in self.properties.values() {
            collect_references(value, &mut out);
        }
        out
    }
}

/// A stack output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    /// Output value.
    pub value: Value,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Output {
    /// Output with only a value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            description: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A CloudFormation template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    description: Option<String>,
    parameters: BTreeMap<String, Parameter>,
    mappings: BTreeMap<String, Mapping>,
    resources: BTreeMap<String, Resource>,
    outputs: BTreeMap<String, Output>,
}

impl Template {
    /// Create an empty template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// The template description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declare a parameter.
    pub fn add_parameter(&mut self, id: impl Into<String>, parameter: Parameter) -> TemplateResult<()> {
        let id = id.into();
        self.ensure_unique_ref_target(&id)?;
        self.parameters.insert(id, parameter);
        Ok(())
    }

    /// Declare a mapping.
    pub fn add_mapping(&mut self, id: impl Into<String>, mapping: Mapping) -> TemplateResult<()> {
        let id = id.into();
        if self.mappings.contains_key(&id) {
            return Err(TemplateError::DuplicateLogicalId(id));
        }
        self.mappings.insert(id, mapping);
        Ok(())
    }

    /// Declare a resource.
    pub fn add_resource(&mut self, id: impl Into<String>, resource: Resource) -> TemplateResult<()> {
        let id = id.into();
        self.ensure_unique_ref_target(&id)?;
        self.resources.insert(id, resource);
        Ok(())
    }

    /// Declare an output.
    pub fn add_output(&mut self, id: impl Into<String>, output: Output) -> TemplateResult<()> {
        let id = id.into();
        if self.outputs.contains_key(&id) {
            return Err(TemplateError::DuplicateLogicalId(id));
        }
        self.outputs.insert(id, output);
        Ok(())
    }

    fn ensure_unique_ref_target(&self, id: &str) -> TemplateResult<()> {
        if self.parameters.contains_key(id) || self.resources.contains_key(id) {
            return Err(TemplateError::DuplicateLogicalId(id.to_owned()));
        }
        Ok(())
    }

    /// Parameters by logical id.
    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<String, Parameter> {
        &self.parameters
    }

    /// Mappings by name.
    #[must_use]
    pub fn mappings(&self) -> &BTreeMap<String, Mapping> {
        &self.mappings
    }

    /// Resources by logical id.
    #[must_use]
    pub fn resources(&self) -> &BTreeMap<String, Resource> {
        &self.resources
    }

    /// Outputs by logical id.
    #[must_use]
    pub fn outputs(&self) -> &BTreeMap<String, Output> {
        &self.outputs
    }

    /// A parameter by logical id.
    #[must_use]
    pub fn parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.get(id)
    }

    /// A mapping by name.
    #[must_use]
    pub fn mapping(&self, id: &str) -> Option<&Mapping> {
        self.mappings.get(id)
    }

    /// A resource by logical id.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// An output by logical id.
    #[must_use]
    pub fn output(&self, id: &str) -> Option<&Output> {
        self.outputs.get(id)
    }

    /// Logical ids of every resource of the given type.
    pub fn resources_of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a str> {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
            .map(|(id, _)| id.as_str())
    }

    /// Build the resource graph, checking every reference.
    pub fn graph(&self) -> TemplateResult<ResourceGraph> {
        ResourceGraph::from_template(self)
    }

    /// Check references, acyclicity, and outputs.
    pub fn validate(&self) -> TemplateResult<()> {
        self.graph()?.topological_order()?;

        for (id, output) in &self.outputs {
            let mut refs = Vec::new();
            collect_references(&serde_json::to_value(output)?, &mut refs);
            for reference in refs {
                self.check_reference(&format!("output {id}"), &reference)?;
            }
        }
        Ok(())
    }

    /// Check that a single reference points at a declared entity.
    pub(crate) fn check_reference(&self, from: &str, reference: &Reference) -> TemplateResult<()> {
        let (found, kind) = match reference {
            Reference::Ref(t) => (
                self.resources.contains_key(t) || self.parameters.contains_key(t),
                "resource or parameter",
            ),
            Reference::GetAtt(t) => (self.resources.contains_key(t), "resource"),
            Reference::Mapping(t) => (self.mappings.contains_key(t), "mapping"),
        };
        if found {
            Ok(())
        } else {
            Err(TemplateError::DanglingReference {
                from: from.to_owned(),
                kind,
                target: reference.target().to_owned(),
            })
        }
    }

    /// Render the template as a JSON value.
    pub fn to_json(&self) -> TemplateResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Render the template as pretty-printed JSON text.
    pub fn to_json_string(&self) -> TemplateResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("AWSTemplateFormatVersion", FORMAT_VERSION)?;
        if let Some(description) = &self.description {
            map.serialize_entry("Description", description)?;
        }
        if !self.parameters.is_empty() {
            map.serialize_entry("Parameters", &self.parameters)?;
        }
        if !self.mappings.is_empty() {
            map.serialize_entry("Mappings", &self.mappings)?;
        }
        map.serialize_entry("Resources", &self.resources)?;
        if !self.outputs.is_empty() {
            map.serialize_entry("Outputs", &self.outputs)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Topic {
        topic_name: Value,
    }

    impl ResourceProperties for Topic {
        const RESOURCE_TYPE: &'static str = "AWS::SNS::Topic";
    }

    #[test]
    fn test_should_render_minimal_template() {
        let mut template = Template::new();
        template.set_description("demo");
        template
            .add_resource("Topic", Resource::new(&Topic { topic_name: Value::lit("t") }).unwrap())
            .unwrap();

        assert_eq!(
            template.to_json().unwrap(),
            json!({
                "AWSTemplateFormatVersion": "2010-09-09",
                "Description": "demo",
                "Resources": {
                    "Topic": {"Type": "AWS::SNS::Topic", "Properties": {"TopicName": "t"}}
                }
            })
        );
    }

    #[test]
    fn test_should_render_parameter_with_allowed_values() {
        let param = Parameter::string()
            .with_default("dev")
            .with_allowed_values(["dev", "prod"]);
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({"Type": "String", "Default": "dev", "AllowedValues": ["dev", "prod"]})
        );
        assert!(param.check_value("env", "prod").is_ok());
        assert!(matches!(
            param.check_value("env", "qa"),
            Err(TemplateError::DisallowedParameterValue { value, .. }) if value == "qa"
        ));
    }

    #[test]
    fn test_should_reject_duplicate_ids_across_parameters_and_resources() {
        let mut template = Template::new();
        template.add_parameter("Name", Parameter::string()).unwrap();
        let resource = Resource::new(&Topic { topic_name: Value::lit("t") }).unwrap();
        assert!(matches!(
            template.add_resource("Name", resource),
            Err(TemplateError::DuplicateLogicalId(id)) if id == "Name"
        ));
    }

    #[test]
    fn test_should_render_policies_and_path_metadata() {
        let resource = Resource::new(&Topic { topic_name: Value::lit("t") })
            .unwrap()
            .with_policies(DeletionPolicy::Retain, DeletionPolicy::Retain)
            .with_path("Stack/Topic/Resource");
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["DeletionPolicy"], "Retain");
        assert_eq!(json["UpdateReplacePolicy"], "Retain");
        assert_eq!(json["Metadata"]["aws:cdk:path"], "Stack/Topic/Resource");
        assert_eq!(resource.path(), Some("Stack/Topic/Resource"));
    }

    #[test]
    fn test_should_detect_dangling_output_reference() {
        let mut template = Template::new();
        template
            .add_output("Missing", Output::new(Value::reference("Nope")))
            .unwrap();
        assert!(matches!(
            template.validate(),
            Err(TemplateError::DanglingReference { target, .. }) if target == "Nope"
        ));
    }

    #[test]
    fn test_should_look_up_mapping_entries() {
        let mut mapping = Mapping::new();
        mapping.insert("dev", "domainName", "test.pro");
        assert_eq!(mapping.find("dev", "domainName"), Some("test.pro"));
        assert_eq!(mapping.find("dev", "other"), None);
        assert_eq!(mapping.top_level_keys().collect::<Vec<_>>(), vec!["dev"]);
    }
}
