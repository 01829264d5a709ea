//! Typed CloudFormation template model for SiteStack.
//!
//! A [`Template`] holds parameters, mappings, resources, and outputs. Resource
//! properties embed [`Value`]s, which are either literals or intrinsic
//! functions (`Ref`, `Fn::GetAtt`, `Fn::Join`, `Fn::FindInMap`, `Fn::Sub`)
//! evaluated later by CloudFormation. The [`Resolver`] performs the same
//! evaluation locally for previews and tests.
//!
//! # Architecture
//!
//! ```text
//! resources::* (typed properties)
//!        |
//!        v
//!   Resource (type + JSON properties + policies)
//!        |
//!        v
//!   Template ──> ResourceGraph (references, DependsOn, ordering)
//!        |
//!        v
//!   to_json() / Resolver
//! ```

pub mod error;
pub mod graph;
pub mod logical_id;
pub mod resolve;
pub mod resources;
pub mod template;
pub mod types;
pub mod value;

pub use error::{TemplateError, TemplateResult};
pub use graph::ResourceGraph;
pub use logical_id::logical_id;
pub use resolve::Resolver;
pub use template::{Mapping, Output, Parameter, Resource, ResourceProperties, Template};
pub use types::{DeletionPolicy, ParameterType};
pub use value::{PseudoParameter, Value};
