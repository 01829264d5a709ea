//! Resource dependency graph.
//!
//! Edges come from two sources: `Ref`/`Fn::GetAtt` values inside properties
//! and explicit `DependsOn` entries. References to parameters and mappings are
//! checked but do not create edges.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{TemplateError, TemplateResult};
use crate::template::Template;
use crate::value::Reference;

/// Dependency graph over the resources of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGraph {
    /// `dependencies[a]` holds every resource `a` must be created after.
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl ResourceGraph {
    /// Build the graph, rejecting references to undeclared entities.
    pub fn from_template(template: &Template) -> TemplateResult<Self> {
        let mut dependencies = BTreeMap::new();

        for (id, resource) in template.resources() {
            let from = format!("resource {id}");
            let mut deps = BTreeSet::new();

            for reference in resource.references() {
                template.check_reference(&from, &reference)?;
                if let Reference::Ref(target) | Reference::GetAtt(target) = &reference {
                    if template.resource(target).is_some() {
                        deps.insert(target.clone());
                    }
                }
            }
            for target in &resource.depends_on {
                if template.resource(target).is_none() {
                    return Err(TemplateError::DanglingReference {
                        from,
                        kind: "resource",
                        target: target.clone(),
                    });
                }
                deps.insert(target.clone());
            }

            dependencies.insert(id.clone(), deps);
        }

        Ok(Self { dependencies })
    }

    /// Resources `id` depends on directly.
    #[must_use]
    pub fn dependencies_of(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(id)
    }

    /// Resources that depend directly on `id`.
    #[must_use]
    pub fn dependents_of(&self, id: &str) -> BTreeSet<&str> {
        self.dependencies
            .iter()
            .filter(|(_, deps)| deps.contains(id))
            .map(|(dependent, _)| dependent.as_str())
            .collect()
    }

    /// Whether `id` depends on `target`, directly or transitively.
    #[must_use]
    pub fn depends_on(&self, id: &str, target: &str) -> bool {
        let mut stack = vec![id];
        let mut seen = BTreeSet::new();
        while let Some(current) = stack.pop() {
            let Some(deps) = self.dependencies.get(current) else {
                continue;
            };
            for dep in deps {
                if dep == target {
                    return true;
                }
                if seen.insert(dep.as_str()) {
                    stack.push(dep);
                }
            }
        }
        false
    }

    /// Number of resources in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Whether the graph has no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Resources in creation order; ties are broken by logical id.
    ///
    /// # Errors
    /// Returns [`TemplateError::DependencyCycle`] naming the resources left
    /// unordered when the graph has a cycle.
    pub fn topological_order(&self) -> TemplateResult<Vec<String>> {
        let mut remaining: BTreeMap<&str, usize> = self
            .dependencies
            .iter()
            .map(|(id, deps)| (id.as_str(), deps.len()))
            .collect();
        let mut ready: BTreeSet<&str> = remaining
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(self.dependencies.len());

        while let Some(id) = ready.pop_first() {
            remaining.remove(id);
            order.push(id.to_owned());
            for dependent in self.dependents_of(id) {
                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if remaining.is_empty() {
            Ok(order)
        } else {
            Err(TemplateError::DependencyCycle(
                remaining.keys().map(|id| (*id).to_owned()).collect(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;
    use crate::template::{Parameter, Resource, ResourceProperties};
    use crate::value::Value;

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Node {
        target: Option<Value>,
    }

    impl ResourceProperties for Node {
        const RESOURCE_TYPE: &'static str = "Custom::Node";
    }

    fn node(target: Option<Value>) -> Resource {
        Resource::new(&Node { target }).unwrap()
    }

    #[test]
    fn test_should_order_resources_by_reference() {
        let mut template = Template::new();
        template.add_resource("Record", node(Some(Value::get_att("Dist", "DomainName")))).unwrap();
        template.add_resource("Dist", node(Some(Value::reference("Bucket")))).unwrap();
        template.add_resource("Bucket", node(None)).unwrap();

        let graph = template.graph().unwrap();
        assert_eq!(graph.topological_order().unwrap(), vec!["Bucket", "Dist", "Record"]);
        assert!(graph.depends_on("Record", "Bucket"));
        assert!(!graph.depends_on("Bucket", "Record"));
        assert_eq!(graph.dependents_of("Bucket"), BTreeSet::from(["Dist"]));
    }

    #[test]
    fn test_should_not_add_edges_for_parameters() {
        let mut template = Template::new();
        template.add_parameter("Env", Parameter::string()).unwrap();
        template.add_resource("A", node(Some(Value::reference("Env")))).unwrap();

        let graph = template.graph().unwrap();
        assert!(graph.dependencies_of("A").unwrap().is_empty());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_should_honor_explicit_depends_on() {
        let mut template = Template::new();
        let mut a = node(None);
        a.add_dependency("B");
        template.add_resource("A", a).unwrap();
        template.add_resource("B", node(None)).unwrap();

        assert_eq!(template.graph().unwrap().topological_order().unwrap(), vec!["B", "A"]);
    }

    #[test]
    fn test_should_reject_dangling_references() {
        let mut template = Template::new();
        template.add_resource("A", node(Some(Value::get_att("Ghost", "Arn")))).unwrap();
        assert!(matches!(
            template.graph(),
            Err(TemplateError::DanglingReference { target, kind: "resource", .. }) if target == "Ghost"
        ));

        let mut template = Template::new();
        let mut a = node(None);
        a.add_dependency("Ghost");
        template.add_resource("A", a).unwrap();
        assert!(template.graph().is_err());
    }

    #[test]
    fn test_should_detect_cycles() {
        let mut template = Template::new();
        template.add_resource("A", node(Some(Value::reference("B")))).unwrap();
        template.add_resource("B", node(Some(Value::reference("A")))).unwrap();
        template.add_resource("C", node(None)).unwrap();

        let err = template.graph().unwrap().topological_order().unwrap_err();
        assert!(matches!(err, TemplateError::DependencyCycle(ids) if ids == vec!["A", "B"]));
        assert!(template.validate().is_err());
    }
}
