//! Local evaluation of intrinsic functions.
//!
//! [`Resolver`] performs the render-time evaluation CloudFormation would do
//! for a given set of parameter values: `Ref` to parameters and pseudo
//! parameters, `Fn::FindInMap`, `Fn::Join`, and `Fn::Sub`. Values that only
//! exist after deployment (resource physical ids and attributes) fail with
//! [`TemplateError::Unresolvable`] unless they are bound explicitly.

use std::collections::BTreeMap;

use crate::error::{TemplateError, TemplateResult};
use crate::template::Template;
use crate::value::{PseudoParameter, Value};

/// Evaluates template values against concrete parameter values.
///
/// # Examples
///
/// ```
/// use sitestack_cfn_model::{Mapping, Parameter, Resolver, Template, Value};
///
/// let mut template = Template::new();
/// let mut mapping = Mapping::new();
/// mapping.insert("prod", "domainName", "test.pro");
/// template.add_mapping("settings", mapping).unwrap();
/// template.add_parameter("env", Parameter::string().with_default("prod")).unwrap();
///
/// let value = Value::find_in_map("settings", Value::reference("env"), Value::lit("domainName"));
/// let resolved = Resolver::new(&template).resolve_string(&value).unwrap();
/// assert_eq!(resolved, "test.pro");
/// ```
#[derive(Debug, Clone)]
pub struct Resolver<'t> {
    template: &'t Template,
    parameter_values: BTreeMap<String, String>,
    pseudo_values: BTreeMap<&'static str, String>,
    physical_ids: BTreeMap<String, String>,
    attributes: BTreeMap<(String, String), String>,
}

impl<'t> Resolver<'t> {
    /// Resolver using parameter defaults and the `aws` partition.
    #[must_use]
    pub fn new(template: &'t Template) -> Self {
        let mut pseudo_values = BTreeMap::new();
        pseudo_values.insert(PseudoParameter::Partition.as_str(), "aws".to_owned());
        pseudo_values.insert(PseudoParameter::UrlSuffix.as_str(), "amazonaws.com".to_owned());

        Self {
            template,
            parameter_values: BTreeMap::new(),
            pseudo_values,
            physical_ids: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Supply a parameter value, as `--parameter-overrides` would.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameter_values.insert(name.into(), value.into());
        self
    }

    /// Bind a pseudo parameter such as `AWS::Region`.
    #[must_use]
    pub fn with_pseudo(mut self, param: PseudoParameter, value: impl Into<String>) -> Self {
        self.pseudo_values.insert(param.as_str(), value.into());
        self
    }

    /// Bind the physical id a resource `Ref` evaluates to.
    #[must_use]
    pub fn with_physical_id(mut self, logical_id: impl Into<String>, physical_id: impl Into<String>) -> Self {
        self.physical_ids.insert(logical_id.into(), physical_id.into());
        self
    }

    /// Bind the value of a resource attribute.
    #[must_use]
    pub fn with_attribute(
        mut self,
        logical_id: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes
            .insert((logical_id.into(), attribute.into()), value.into());
        self
    }

    /// Effective value of a parameter: the supplied value, else the default.
    pub fn parameter_value(&self, name: &str) -> TemplateResult<String> {
        let parameter = self
            .template
            .parameter(name)
            .ok_or_else(|| TemplateError::DanglingReference {
                from: "resolver".to_owned(),
                kind: "parameter",
                target: name.to_owned(),
            })?;
        let value = self
            .parameter_values
            .get(name)
            .cloned()
            .or_else(|| parameter.default.clone())
            .ok_or_else(|| TemplateError::MissingParameterValue(name.to_owned()))?;
        parameter.check_value(name, &value)?;
        Ok(value)
    }

    /// Evaluate a value to JSON with every intrinsic replaced.
    pub fn resolve(&self, value: &Value) -> TemplateResult<serde_json::Value> {
        self.resolve_json(&value.to_json())
    }

    /// Evaluate a value that must produce a scalar.
    pub fn resolve_string(&self, value: &Value) -> TemplateResult<String> {
        let resolved = self.resolve(value)?;
        scalar_to_string(&resolved)
    }

    /// Evaluate the value of a declared output.
    pub fn resolve_output(&self, id: &str) -> TemplateResult<String> {
        let output = self
            .template
            .output(id)
            .ok_or_else(|| TemplateError::DanglingReference {
                from: "resolver".to_owned(),
                kind: "output",
                target: id.to_owned(),
            })?;
        self.resolve_string(&output.value)
    }

    /// Evaluate rendered CloudFormation JSON.
    pub fn resolve_json(&self, json: &serde_json::Value) -> TemplateResult<serde_json::Value> {
        match json {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_json(item))
                .collect::<TemplateResult<Vec<_>>>()
                .map(serde_json::Value::Array),
            serde_json::Value::Object(map) => {
                if map.len() == 1 {
                    if let Some((key, args)) = map.iter().next() {
                        match key.as_str() {
                            "Ref" => return self.resolve_ref(args).map(serde_json::Value::String),
                            "Fn::GetAtt" => {
                                return self.resolve_get_att(args).map(serde_json::Value::String);
                            }
                            "Fn::Join" => return self.resolve_join(args).map(serde_json::Value::String),
                            "Fn::FindInMap" => {
                                return self.resolve_find_in_map(args).map(serde_json::Value::String);
                            }
                            "Fn::Sub" => return self.resolve_sub(args).map(serde_json::Value::String),
                            _ => {}
                        }
                    }
                }
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.resolve_json(value)?);
                }
                Ok(serde_json::Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_ref(&self, args: &serde_json::Value) -> TemplateResult<String> {
        let name = args
            .as_str()
            .ok_or_else(|| TemplateError::MalformedIntrinsic(format!("Ref {args}")))?;
        self.lookup_name(name)
    }

    fn lookup_name(&self, name: &str) -> TemplateResult<String> {
        if PseudoParameter::from_ref(name).is_some() {
            return self
                .pseudo_values
                .get(name)
                .cloned()
                .ok_or_else(|| TemplateError::Unresolvable(name.to_owned()));
        }
        if self.template.parameter(name).is_some() {
            return self.parameter_value(name);
        }
        if self.template.resource(name).is_some() {
            return self
                .physical_ids
                .get(name)
                .cloned()
                .ok_or_else(|| TemplateError::Unresolvable(name.to_owned()));
        }
        Err(TemplateError::DanglingReference {
            from: "resolver".to_owned(),
            kind: "resource or parameter",
            target: name.to_owned(),
        })
    }

    fn resolve_get_att(&self, args: &serde_json::Value) -> TemplateResult<String> {
        let (Some(id), Some(attribute)) = (
            args.get(0).and_then(serde_json::Value::as_str),
            args.get(1).and_then(serde_json::Value::as_str),
        ) else {
            return Err(TemplateError::MalformedIntrinsic(format!("Fn::GetAtt {args}")));
        };
        self.lookup_attribute(id, attribute)
    }

    fn lookup_attribute(&self, id: &str, attribute: &str) -> TemplateResult<String> {
        if self.template.resource(id).is_none() {
            return Err(TemplateError::DanglingReference {
                from: "resolver".to_owned(),
                kind: "resource",
                target: id.to_owned(),
            });
        }
        self.attributes
            .get(&(id.to_owned(), attribute.to_owned()))
            .cloned()
            .ok_or_else(|| TemplateError::Unresolvable(format!("{id}.{attribute}")))
    }

    fn resolve_join(&self, args: &serde_json::Value) -> TemplateResult<String> {
        let (Some(delimiter), Some(parts)) = (
            args.get(0).and_then(serde_json::Value::as_str),
            args.get(1).and_then(serde_json::Value::as_array),
        ) else {
            return Err(TemplateError::MalformedIntrinsic(format!("Fn::Join {args}")));
        };
        let parts = parts
            .iter()
            .map(|part| scalar_to_string(&self.resolve_json(part)?))
            .collect::<TemplateResult<Vec<_>>>()?;
        Ok(parts.join(delimiter))
    }

    fn resolve_find_in_map(&self, args: &serde_json::Value) -> TemplateResult<String> {
        let (Some(map_name), Some(top), Some(second)) = (
            args.get(0).and_then(serde_json::Value::as_str),
            args.get(1),
            args.get(2),
        ) else {
            return Err(TemplateError::MalformedIntrinsic(format!("Fn::FindInMap {args}")));
        };
        let top_level_key = scalar_to_string(&self.resolve_json(top)?)?;
        let second_level_key = scalar_to_string(&self.resolve_json(second)?)?;

        self.template
            .mapping(map_name)
            .and_then(|m| m.find(&top_level_key, &second_level_key))
            .map(ToOwned::to_owned)
            .ok_or_else(|| TemplateError::MissingMappingEntry {
                map: map_name.to_owned(),
                top_level_key,
                second_level_key,
            })
    }

    fn resolve_sub(&self, args: &serde_json::Value) -> TemplateResult<String> {
        let template = args
            .as_str()
            .ok_or_else(|| TemplateError::MalformedIntrinsic(format!("Fn::Sub {args}")))?;

        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return Ok(out);
            };
            let placeholder = &after[..end];
            if let Some(literal) = placeholder.strip_prefix('!') {
                out.push_str("${");
                out.push_str(literal);
                out.push('}');
            } else {
                let value = match placeholder.split_once('.') {
                    Some((id, attribute)) => self.lookup_attribute(id, attribute)?,
                    None => self.lookup_name(placeholder)?,
                };
                out.push_str(&value);
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn scalar_to_string(value: &serde_json::Value) -> TemplateResult<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(TemplateError::MalformedIntrinsic(format!(
            "expected a scalar, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::*;
    use crate::template::{Mapping, Parameter, Resource, ResourceProperties};

    #[derive(Serialize)]
    struct Empty {}

    impl ResourceProperties for Empty {
        const RESOURCE_TYPE: &'static str = "Custom::Empty";
    }

    fn template() -> Template {
        let mut template = Template::new();
        let mut mapping = Mapping::new();
        mapping.insert("dev", "sub", "dev");
        mapping.insert("dev", "domain", "test.pro");
        mapping.insert("prod", "sub", "prod");
        mapping.insert("prod", "domain", "test.pro");
        template.add_mapping("settings", mapping).unwrap();
        template
            .add_parameter(
                "env",
                Parameter::string()
                    .with_default("dev")
                    .with_allowed_values(["dev", "prod"]),
            )
            .unwrap();
        template
            .add_resource("Bucket", Resource::new(&Empty {}).unwrap())
            .unwrap();
        template
    }

    fn setting(key: &str) -> Value {
        Value::find_in_map("settings", Value::reference("env"), Value::lit(key))
    }

    #[test]
    fn test_should_resolve_find_in_map_through_parameter_default() {
        let template = template();
        let resolver = Resolver::new(&template);
        assert_eq!(resolver.resolve_string(&setting("sub")).unwrap(), "dev");
    }

    #[test]
    fn test_should_resolve_join_with_parameter_override() {
        let template = template();
        let resolver = Resolver::new(&template).with_parameter("env", "prod");
        let domain = Value::join(".", [setting("sub"), setting("domain")]);
        assert_eq!(resolver.resolve_string(&domain).unwrap(), "prod.test.pro");
    }

    #[test]
    fn test_should_reject_disallowed_parameter_values() {
        let template = template();
        let resolver = Resolver::new(&template).with_parameter("env", "qa");
        assert!(matches!(
            resolver.resolve_string(&setting("sub")),
            Err(TemplateError::DisallowedParameterValue { value, .. }) if value == "qa"
        ));
    }

    #[test]
    fn test_should_report_missing_mapping_entries() {
        let template = template();
        let resolver = Resolver::new(&template);
        assert!(matches!(
            resolver.resolve_string(&setting("nope")),
            Err(TemplateError::MissingMappingEntry { second_level_key, .. }) if second_level_key == "nope"
        ));
    }

    #[test]
    fn test_should_leave_deploy_time_values_unresolved() {
        let template = template();
        let resolver = Resolver::new(&template);
        assert!(matches!(
            resolver.resolve_string(&Value::reference("Bucket")),
            Err(TemplateError::Unresolvable(name)) if name == "Bucket"
        ));
        assert!(matches!(
            resolver.resolve_string(&Value::get_att("Bucket", "Arn")),
            Err(TemplateError::Unresolvable(name)) if name == "Bucket.Arn"
        ));

        let bound = resolver
            .with_physical_id("Bucket", "prod.test.pro")
            .with_attribute("Bucket", "Arn", "arn:aws:s3:::prod.test.pro");
        assert_eq!(bound.resolve_string(&Value::reference("Bucket")).unwrap(), "prod.test.pro");
        assert_eq!(
            bound.resolve_string(&Value::get_att("Bucket", "Arn")).unwrap(),
            "arn:aws:s3:::prod.test.pro"
        );
    }

    #[test]
    fn test_should_substitute_sub_placeholders() {
        let template = template();
        let resolver = Resolver::new(&template)
            .with_pseudo(PseudoParameter::AccountId, "123456789012")
            .with_pseudo(PseudoParameter::Region, "us-east-1");
        let value = Value::sub("cdk-assets-${AWS::AccountId}-${AWS::Region}-${env}-${!Literal}");
        assert_eq!(
            resolver.resolve_string(&value).unwrap(),
            "cdk-assets-123456789012-us-east-1-dev-${Literal}"
        );
        assert!(matches!(
            Resolver::new(&template).resolve_string(&Value::sub("${AWS::AccountId}")),
            Err(TemplateError::Unresolvable(_))
        ));
    }

    #[test]
    fn test_should_not_rescan_substituted_values() {
        let template = template();
        let resolver = Resolver::new(&template)
            .with_pseudo(PseudoParameter::AccountId, "${env}-${!Literal}")
            .with_pseudo(PseudoParameter::Region, "us-east-1");

        assert_eq!(
            resolver
                .resolve_string(&Value::sub("${AWS::AccountId}/${AWS::Region}/${env}"))
                .unwrap(),
            "${env}-${!Literal}/us-east-1/dev"
        );
        assert_eq!(
            resolver.resolve_string(&Value::sub("${!AWS::Region}-${AWS::Region}")).unwrap(),
            "${AWS::Region}-us-east-1"
        );
        assert_eq!(resolver.resolve_string(&Value::sub("open ${brace")).unwrap(), "open ${brace");
    }

    #[test]
    fn test_should_resolve_nested_structures() {
        let template = template();
        let resolver = Resolver::new(&template);
        let json = json!({"Aliases": [{"Fn::Join": [".", [{"Ref": "env"}, "x"]]}], "Enabled": true});
        assert_eq!(
            resolver.resolve_json(&json).unwrap(),
            json!({"Aliases": ["dev.x"], "Enabled": true})
        );
    }
}
