//! Dependency tree flattening.
//!
//! Turns the nested `npm ls --json --long` listing into a flat, deduplicated
//! list of resources:
//! - Classifying each occurrence as root-level or nested
//! - Merging duplicate nested occurrences into one resource
//! - Rewriting parent references from tree locations to resource identifiers
//! - Hashing every tarball (SHA-256, https only)
//! - Rendering the result as recipe `resource` stanzas or JSON

pub mod classify;
pub mod error;
pub mod hash;
pub mod listing;
pub mod location;
pub mod native;
pub mod node;
pub mod normalize;
pub mod recipe;
pub mod resolve;

pub use classify::{classify, NodeClass};
pub use error::{codes as flatten_codes, ErrorKind, FlattenError};
pub use hash::{HashFetcher, MAX_CONCURRENT_FETCHES};
pub use listing::{read_listing, run_npm_ls, NPM_ENV};
pub use location::branch;
pub use native::{rewrite_install_script, NativeAddon};
pub use node::{BinField, Dependencies, DependencyNode, DependencyTree};
pub use normalize::normalize_parents;
pub use recipe::{render_recipe, to_json, write_output};
pub use resolve::{
    resolve_tree, DeferredRootDependency, LocationIndex, ResolveContext, ResolveOptions,
    ResolveStats, ResourceRecord,
};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

/// The flattened result of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatResolution {
    /// Resource identifier → record, in discovery order.
    pub resources: IndexMap<String, ResourceRecord>,
    /// Resources needing a post-install build step, in discovery order.
    pub native_addons: Vec<NativeAddon>,
    /// Tree location → resource identifier.
    pub locations: LocationIndex,
}

impl From<ResolveContext> for FlatResolution {
    fn from(ctx: ResolveContext) -> Self {
        Self {
            resources: ctx.resources,
            native_addons: ctx.native_addons,
            locations: ctx.locations,
        }
    }
}

/// Resolve and normalize a listing without fetching any hashes.
///
/// # Errors
/// Returns a structural error if the tree is inconsistent.
pub fn resolve_and_normalize(
    tree: &DependencyTree,
    opts: &ResolveOptions,
) -> Result<FlatResolution, FlattenError> {
    let mut ctx = ResolveContext::new();
    resolve_tree(&tree.dependencies, opts, &mut ctx)?;
    normalize_parents(&mut ctx)?;

    info!(
        resources = ctx.resources.len(),
        visited = ctx.stats.visited,
        merged = ctx.stats.merged,
        deferred = ctx.stats.deferred,
        skipped = ctx.stats.skipped,
        native_addons = ctx.native_addons.len(),
        "flattened dependency tree"
    );

    Ok(ctx.into())
}

/// Flatten a listing and, when a fetcher is given, hash every tarball.
///
/// The tree is fully resolved and normalized before any fetch starts, so a
/// structural error never costs network traffic.
///
/// # Errors
/// Returns a structural error for an inconsistent tree, or the first hash
/// fetch failure.
pub async fn flatten_tree(
    tree: &DependencyTree,
    opts: &ResolveOptions,
    fetcher: Option<&HashFetcher>,
) -> Result<FlatResolution, FlattenError> {
    let mut flat = resolve_and_normalize(tree, opts)?;

    if let Some(fetcher) = fetcher {
        fetcher.fill_hashes(&mut flat.resources).await?;
    }

    Ok(flat)
}
