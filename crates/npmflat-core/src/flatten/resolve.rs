//! Tree resolution.
//!
//! Walks the nested listing depth-first in listing order, classifying each
//! node and building the flat resource map plus the location index. Parent
//! references are left as raw locations here and rewritten by
//! [`normalize_parents`](super::normalize::normalize_parents).

use super::classify::{classify, NodeClass};
use super::error::FlattenError;
use super::native::{rewrite_install_script, NativeAddon};
use super::node::{Dependencies, DependencyNode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// One deduplicated installable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    /// Bare package name for root-level resources, `name@version` otherwise.
    pub name: String,
    pub url: String,
    /// False when the top-level package depends on this resource directly.
    pub is_nested: bool,
    /// Identifiers of the resources requiring this one, first-seen order.
    pub parents: Vec<String>,
    /// Executable name → path, captured for root-level resources in
    /// native-addon mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_mappings: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    /// Lowercase hex SHA-256 of the tarball, once fetched.
    #[serde(default)]
    pub sha256: Option<String>,
    /// Raw requirer locations awaiting normalization.
    #[serde(skip)]
    pub(crate) pending_parents: Vec<String>,
}

impl ResourceRecord {
    fn root(name: &str, url: &str, bin_mappings: Option<IndexMap<String, String>>) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            is_nested: false,
            parents: Vec::new(),
            bin_mappings,
            install_command: None,
            sha256: None,
            pending_parents: Vec::new(),
        }
    }

    fn nested(id: &str, url: &str, required_by: &[String]) -> Self {
        Self {
            name: id.to_string(),
            url: url.to_string(),
            is_nested: true,
            parents: Vec::new(),
            bin_mappings: None,
            install_command: None,
            sha256: None,
            pending_parents: required_by.to_vec(),
        }
    }

    /// Add a parent identifier unless already present.
    pub fn add_parent(&mut self, parent: &str) {
        if !self.parents.iter().any(|p| p == parent) {
            self.parents.push(parent.to_string());
        }
    }

    /// Raw requirer locations not yet normalized.
    #[must_use]
    pub fn pending_parents(&self) -> &[String] {
        &self.pending_parents
    }
}

/// Tree location → resource identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationIndex {
    entries: IndexMap<String, String>,
}

impl LocationIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point a location at a resource, replacing any previous entry.
    pub fn insert(&mut self, location: &str, resource: &str) {
        self.entries
            .insert(location.to_string(), resource.to_string());
    }

    #[must_use]
    pub fn get(&self, location: &str) -> Option<&str> {
        self.entries.get(location).map(String::as_str)
    }
}

/// A root dependency first seen only as an unresolved reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredRootDependency {
    pub name: String,
    /// Raw locations of the packages referencing it.
    pub required_by: Vec<String>,
}

/// Options for tree resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Capture `bin` mappings of root-level resources.
    pub native_addons: bool,
}

/// Counters accumulated over one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub visited: usize,
    pub skipped: usize,
    pub deferred: usize,
    pub merged: usize,
}

/// Mutable state of one resolution run, threaded through the walk.
#[derive(Debug, Default)]
pub struct ResolveContext {
    pub resources: IndexMap<String, ResourceRecord>,
    pub locations: LocationIndex,
    pub deferred: IndexMap<String, DeferredRootDependency>,
    pub native_addons: Vec<NativeAddon>,
    pub stats: ResolveStats,
}

impl ResolveContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn defer(&mut self, name: &str, required_by: &[String]) {
        self.stats.deferred += 1;
        self.deferred
            .entry(name.to_string())
            .or_insert_with(|| DeferredRootDependency {
                name: name.to_string(),
                required_by: Vec::new(),
            })
            .required_by
            .extend(required_by.iter().cloned());
    }
}

/// Resolve a dependency map into `ctx`.
///
/// # Errors
/// Returns `TREE_DUPLICATE_ROOT` if two root-level nodes share a name.
pub fn resolve_tree(
    deps: &Dependencies,
    opts: &ResolveOptions,
    ctx: &mut ResolveContext,
) -> Result<(), FlattenError> {
    for (key, node) in deps {
        resolve_node(key, node, opts, ctx)?;
    }
    Ok(())
}

fn resolve_node(
    key: &str,
    node: &DependencyNode,
    opts: &ResolveOptions,
    ctx: &mut ResolveContext,
) -> Result<(), FlattenError> {
    ctx.stats.visited += 1;
    let label = node.id.as_deref().unwrap_or(key);

    if node.declares_bundled() {
        warn!(
            package = label,
            "bundled dependencies are not flattened; npm will install them again inside the package"
        );
    }
    if node.declares_optional() {
        let optional: Vec<&str> = node.optional_dependencies.keys().map(String::as_str).collect();
        warn!(
            package = label,
            optional = ?optional,
            "optional dependencies are not supported and will be dropped"
        );
    }

    let resource_id = match classify(node) {
        NodeClass::Unresolved => {
            // Children of an unresolved node are not visited.
            debug!(package = key, "skipping dependency without identifier");
            ctx.stats.skipped += 1;
            return Ok(());
        }
        NodeClass::DeferredRoot { name, required_by } => {
            trace!(package = name, "deferring unresolved reference");
            ctx.defer(name, required_by);
            None
        }
        NodeClass::Root {
            name,
            url,
            location,
        } => {
            if ctx.resources.contains_key(name) {
                return Err(FlattenError::duplicate_root(name));
            }
            let bin_mappings = if opts.native_addons {
                node.bin.as_ref().map(|bin| bin.mappings(name))
            } else {
                None
            };
            ctx.resources
                .insert(name.to_string(), ResourceRecord::root(name, url, bin_mappings));
            ctx.locations.insert(location, name);
            Some(name)
        }
        NodeClass::Nested {
            id,
            url,
            location,
            required_by,
        } => {
            if let Some(existing) = ctx.resources.get_mut(id) {
                existing.pending_parents.extend(required_by.iter().cloned());
                ctx.stats.merged += 1;
            } else {
                ctx.resources
                    .insert(id.to_string(), ResourceRecord::nested(id, url, required_by));
            }
            ctx.locations.insert(location, id);
            Some(id)
        }
    };

    if let (Some(id), Some(script)) = (resource_id, node.install_script()) {
        record_native_addon(id, script, ctx);
    }

    resolve_tree(&node.dependencies, opts, ctx)
}

/// Store a (rewritten) install command on a resource, once per resource.
fn record_native_addon(id: &str, script: &str, ctx: &mut ResolveContext) {
    let Some(record) = ctx.resources.get_mut(id) else {
        return;
    };
    if record.install_command.is_some() {
        return;
    }

    let command = rewrite_install_script(script);
    debug!(resource = id, command = %command, "native addon needs a post-install build");
    record.install_command = Some(command.clone());
    ctx.native_addons.push(NativeAddon {
        resource: id.to_string(),
        command,
    });
}
