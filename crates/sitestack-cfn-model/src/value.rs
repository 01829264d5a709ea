//! Template values: literals and deferred intrinsic functions.
//!
//! A [`Value`] is the "pending value" handle of the model. Builders embed it
//! in resource properties without knowing the concrete string; CloudFormation
//! (or the local [`Resolver`](crate::Resolver)) evaluates it at render time.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A CloudFormation property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Literal string.
    String(String),
    /// Literal integer.
    Number(i64),
    /// Literal boolean.
    Bool(bool),
    /// List of values.
    List(Vec<Value>),
    /// `{"Ref": name}` against a parameter, resource, or pseudo parameter.
    Ref(String),
    /// `{"Fn::GetAtt": [logical_id, attribute]}`.
    GetAtt {
        /// Logical id of the referenced resource.
        logical_id: String,
        /// Attribute name, e.g. `Arn` or `DomainName`.
        attribute: String,
    },
    /// `{"Fn::Join": [delimiter, [parts...]]}`.
    Join {
        /// Delimiter placed between parts.
        delimiter: String,
        /// Parts to join.
        parts: Vec<Value>,
    },
    /// `{"Fn::FindInMap": [map, top_level_key, second_level_key]}`.
    FindInMap {
        /// Mapping name.
        map_name: String,
        /// First-level key, usually a `Ref` to a parameter.
        top_level_key: Box<Value>,
        /// Second-level key.
        second_level_key: Box<Value>,
    },
    /// `{"Fn::Sub": template}` with `${Name}` / `${Resource.Attr}` placeholders.
    Sub(String),
}

impl Value {
    /// Literal string value.
    #[must_use]
    pub fn lit(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// `Ref` to a parameter, resource, or pseudo parameter.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    /// `Ref` to a pseudo parameter such as `AWS::Region`.
    #[must_use]
    pub fn pseudo(param: PseudoParameter) -> Self {
        Self::Ref(param.as_str().to_owned())
    }

    /// `Fn::GetAtt` on a resource attribute.
    #[must_use]
    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    /// `Fn::Join`. Adjacent literal parts are not merged.
    #[must_use]
    pub fn join(delimiter: impl Into<String>, parts: impl IntoIterator<Item = Value>) -> Self {
        Self::Join {
            delimiter: delimiter.into(),
            parts: parts.into_iter().collect(),
        }
    }

    /// `Fn::FindInMap`.
    #[must_use]
    pub fn find_in_map(map_name: impl Into<String>, top_level_key: Value, second_level_key: Value) -> Self {
        Self::FindInMap {
            map_name: map_name.into(),
            top_level_key: Box::new(top_level_key),
            second_level_key: Box::new(second_level_key),
        }
    }

    /// `Fn::Sub`.
    #[must_use]
    pub fn sub(template: impl Into<String>) -> Self {
        Self::Sub(template.into())
    }

    /// Whether the value is a literal with no intrinsic functions inside.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::String(_) | Self::Number(_) | Self::Bool(_) => true,
            Self::List(items) => items.iter().all(Self::is_literal),
            _ => false,
        }
    }

    /// The literal string, if this is one.
    #[must_use]
    pub fn as_literal_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as CloudFormation JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing plain enums and strings into serde_json::Value cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Entities this value refers to.
    #[must_use]
    pub fn references(&self) -> Vec<Reference> {
        let mut out = Vec::new();
        collect_references(&self.to_json(), &mut out);
        out
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_i64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Ref(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", name)?;
                map.end()
            }
            Self::GetAtt {
                logical_id,
                attribute,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[logical_id, attribute])?;
                map.end()
            }
            Self::Join { delimiter, parts } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &(delimiter, parts))?;
                map.end()
            }
            Self::FindInMap {
                map_name,
                top_level_key,
                second_level_key,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(
                    "Fn::FindInMap",
                    &(map_name, top_level_key.as_ref(), second_level_key.as_ref()),
                )?;
                map.end()
            }
            Self::Sub(template) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Sub", template)?;
                map.end()
            }
        }
    }
}

/// AWS pseudo parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoParameter {
    /// `AWS::AccountId`.
    AccountId,
    /// `AWS::Partition`.
    Partition,
    /// `AWS::Region`.
    Region,
    /// `AWS::StackName`.
    StackName,
    /// `AWS::URLSuffix`.
    UrlSuffix,
}

impl PseudoParameter {
    /// Every supported pseudo parameter.
    pub const ALL: [Self; 5] = [
        Self::AccountId,
        Self::Partition,
        Self::Region,
        Self::StackName,
        Self::UrlSuffix,
    ];

    /// Returns the `Ref` name of this pseudo parameter.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountId => "AWS::AccountId",
            Self::Partition => "AWS::Partition",
            Self::Region => "AWS::Region",
            Self::StackName => "AWS::StackName",
            Self::UrlSuffix => "AWS::URLSuffix",
        }
    }

    /// Look up a pseudo parameter by its `Ref` name.
    #[must_use]
    pub fn from_ref(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for PseudoParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge from a value to another template entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reference {
    /// `Ref` to a parameter or resource (pseudo parameters are excluded).
    Ref(String),
    /// `Fn::GetAtt` on a resource.
    GetAtt(String),
    /// `Fn::FindInMap` against a mapping.
    Mapping(String),
}

impl Reference {
    /// Name of the referenced entity.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Ref(t) | Self::GetAtt(t) | Self::Mapping(t) => t,
        }
    }
}

/// Collect every reference inside rendered CloudFormation JSON.
pub fn collect_references(json: &serde_json::Value, out: &mut Vec<Reference>) {
    match json {
        serde_json::Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            if map.len() == 1 {
                if let Some(serde_json::Value::String(name)) = map.get("Ref") {
                    if PseudoParameter::from_ref(name).is_none() {
                        out.push(Reference::Ref(name.clone()));
                    }
                    return;
                }
                if let Some(serde_json::Value::Array(args)) = map.get("Fn::GetAtt") {
                    if let Some(serde_json::Value::String(id)) = args.first() {
                        out.push(Reference::GetAtt(id.clone()));
                    }
                    return;
                }
                if let Some(serde_json::Value::Array(args)) = map.get("Fn::FindInMap") {
                    if let Some(serde_json::Value::String(name)) = args.first() {
                        out.push(Reference::Mapping(name.clone()));
                    }
                    for arg in args.iter().skip(1) {
                        collect_references(arg, out);
                    }
                    return;
                }
                if let Some(serde_json::Value::String(template)) = map.get("Fn::Sub") {
                    for placeholder in sub_placeholders(template) {
                        match placeholder.split_once('.') {
                            Some((id, _)) => out.push(Reference::GetAtt(id.to_owned())),
                            None if PseudoParameter::from_ref(placeholder).is_none() => {
                                out.push(Reference::Ref(placeholder.to_owned()));
                            }
                            None => {}
                        }
                    }
                    return;
                }
            }
            for value in map.values() {
                collect_references(value, out);
            }
        }
        _ => {}
    }
}

/// Names inside `${...}` placeholders of an `Fn::Sub` template.
///
/// `${!Literal}` escapes are skipped.
pub(crate) fn sub_placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.starts_with('!') {
            names.push(name);
        }
        rest = &after[end + 1..];
    }
    names
}
