//! One-shot classification of listing nodes.

use super::location::{branch, package_segments};
use super::node::DependencyNode;

/// What a listing node is, decided once before the resolver acts on it.
///
/// Each variant borrows only the fields meaningful to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeClass<'a> {
    /// No `_id`: a missing or unmet dependency.
    Unresolved,
    /// Has an identifier but no download URL; its real entry lives elsewhere
    /// in the tree as a root-level dependency.
    DeferredRoot {
        name: &'a str,
        required_by: &'a [String],
    },
    /// Installed directly under the top-level package.
    Root {
        name: &'a str,
        url: &'a str,
        location: &'a str,
    },
    /// Installed below some other package.
    Nested {
        id: &'a str,
        url: &'a str,
        location: &'a str,
        required_by: &'a [String],
    },
}

impl NodeClass<'_> {
    /// Whether the resolver should descend into the node's children.
    #[must_use]
    pub fn descends(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// Classify a node.
#[must_use]
pub fn classify(node: &DependencyNode) -> NodeClass<'_> {
    let Some(id) = node.id.as_deref() else {
        return NodeClass::Unresolved;
    };
    let name = node.package_name().unwrap_or(id);

    let Some(url) = node.resolved.as_deref() else {
        return NodeClass::DeferredRoot {
            name,
            required_by: &node.required_by,
        };
    };

    let location = node.location.as_deref().unwrap_or_default();
    if package_segments(&branch(location)).len() == 1 {
        NodeClass::Root {
            name,
            url,
            location,
        }
    } else {
        NodeClass::Nested {
            id,
            url,
            location,
            required_by: &node.required_by,
        }
    }
}
