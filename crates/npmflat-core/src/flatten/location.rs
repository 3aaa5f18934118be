//! Tree location tokenizing.
//!
//! npm reports each installed package's position as a `/`-delimited path
//! (`/a` for a root-level install, `/a/b` for `b` nested under `a`).

/// Segment delimiter in tree locations.
pub const LOCATION_DELIMITER: char = '/';

/// Split a location into its non-empty segments, in order.
///
/// Never fails: malformed input simply yields fewer segments.
#[must_use]
pub fn branch(location: &str) -> Vec<&str> {
    location
        .split(LOCATION_DELIMITER)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Fold a branch into package segments, joining each `@scope` segment with
/// the segment that follows it.
///
/// `/@types/node` tokenizes to two segments but names a single root-level
/// package.
#[must_use]
pub fn package_segments(branch: &[&str]) -> Vec<String> {
    let mut packages = Vec::with_capacity(branch.len());
    let mut iter = branch.iter();

    while let Some(segment) = iter.next() {
        match (segment.starts_with('@'), iter.clone().next()) {
            (true, Some(name)) => {
                packages.push(format!("{segment}/{name}"));
                iter.next();
            }
            _ => packages.push((*segment).to_string()),
        }
    }

    packages
}

/// Whether a location names the top-level package itself (`/`).
#[must_use]
pub fn is_top_level(location: &str) -> bool {
    branch(location).is_empty()
}
