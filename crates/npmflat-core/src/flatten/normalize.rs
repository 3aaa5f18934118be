//! Parent normalization.
//!
//! Runs after the resolver has populated the whole context. Rewrites every
//! parent reference from a raw tree location into a resource identifier.

use super::error::FlattenError;
use super::location::is_top_level;
use super::resolve::{LocationIndex, ResolveContext};
use tracing::debug;

/// Normalize parents in two passes: deferred root dependencies first, then
/// the pending parents of every nested resource.
///
/// Requirer entries naming the top-level package (`/`) are not resources and
/// are skipped.
///
/// # Errors
/// - `TREE_ROOT_UNRESOLVED` if a deferred dependency has no root-level record.
/// - `TREE_LOCATION_UNINDEXED` if a requirer location was never indexed.
/// - `TREE_PARENTS_EMPTY` if a nested resource has no requirer.
pub fn normalize_parents(ctx: &mut ResolveContext) -> Result<(), FlattenError> {
    reconcile_deferred(ctx)?;
    resolve_pending(ctx)
}

fn reconcile_deferred(ctx: &mut ResolveContext) -> Result<(), FlattenError> {
    let ResolveContext {
        resources,
        locations,
        deferred,
        ..
    } = ctx;

    for dep in deferred.values() {
        let record = resources
            .get_mut(&dep.name)
            .ok_or_else(|| FlattenError::root_unresolved(&dep.name))?;

        for location in &dep.required_by {
            if is_top_level(location) {
                continue;
            }
            let parent = lookup(locations, location, &dep.name)?;
            record.add_parent(parent);
        }
        debug!(resource = %dep.name, parents = record.parents.len(), "reconciled deferred root dependency");
    }

    Ok(())
}

fn resolve_pending(ctx: &mut ResolveContext) -> Result<(), FlattenError> {
    let ResolveContext {
        resources,
        locations,
        ..
    } = ctx;

    for (id, record) in resources.iter_mut().filter(|(_, r)| r.is_nested) {
        let pending = std::mem::take(&mut record.pending_parents);
        if pending.is_empty() {
            return Err(FlattenError::parents_empty(id));
        }

        let mut parents: Vec<String> = Vec::with_capacity(pending.len());
        for location in &pending {
            if is_top_level(location) {
                continue;
            }
            let parent = lookup(locations, location, id)?;
            if !parents.iter().any(|p| p == parent) {
                parents.push(parent.to_string());
            }
        }

        if parents.is_empty() {
            return Err(FlattenError::parents_empty(id));
        }
        record.parents = parents;
    }

    Ok(())
}

fn lookup<'a>(
    locations: &'a LocationIndex,
    location: &str,
    resource: &str,
) -> Result<&'a str, FlattenError> {
    locations
        .get(location)
        .ok_or_else(|| FlattenError::location_unindexed(location, resource))
}
