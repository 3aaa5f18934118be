//! Obtaining the dependency listing.
//!
//! Either runs `npm ls --json --long` in a project directory or reads a
//! listing saved earlier.

use super::error::FlattenError;
use super::node::DependencyTree;
use crate::error::Error;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Environment variable overriding the npm executable.
pub const NPM_ENV: &str = "NPMFLAT_NPM";

/// Run `npm ls --json --long` in `cwd`, using `$NPMFLAT_NPM` or `npm`.
///
/// # Errors
/// Returns `LISTING_FAILED` if npm cannot be run or prints nothing, and
/// `LISTING_INVALID` if its output is not a listing.
pub async fn run_npm_ls(cwd: &Path) -> Result<DependencyTree, FlattenError> {
    let npm = std::env::var(NPM_ENV).unwrap_or_else(|_| "npm".to_string());
    run_npm_ls_with(&npm, cwd).await
}

/// Run `<npm> ls --json --long` in `cwd`.
///
/// npm exits non-zero for extraneous or invalid packages while still
/// printing a complete listing, so a failing status is only fatal when
/// stdout is empty.
///
/// # Errors
/// See [`run_npm_ls`].
pub async fn run_npm_ls_with(npm: &str, cwd: &Path) -> Result<DependencyTree, FlattenError> {
    debug!(npm, cwd = %cwd.display(), "listing dependency tree");

    let output = Command::new(npm)
        .args(["ls", "--json", "--long"])
        .current_dir(cwd)
        .output()
        .await
        .map_err(|e| FlattenError::listing_failed(format!("Failed to run '{npm} ls': {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.trim().is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FlattenError::listing_failed(format!(
            "'{npm} ls' produced no listing ({}): {}",
            output.status,
            stderr.trim()
        )));
    }

    if !output.status.success() {
        warn!(status = %output.status, "npm ls reported problems; using its listing anyway");
    }

    DependencyTree::from_json(&stdout)
}

/// Read a saved listing from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a listing.
pub async fn read_listing(path: &Path) -> Result<DependencyTree, Error> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::ListingRead {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(DependencyTree::from_json(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::error::codes;
    use tempfile::tempdir;

    const LISTING: &str = r#"{
        "name": "app",
        "version": "1.0.0",
        "dependencies": {
            "a": {
                "_id": "a@1.0.0",
                "_resolved": "https://registry.example/a/-/a-1.0.0.tgz",
                "_location": "/a",
                "_requiredBy": ["/"]
            }
        }
    }"#;

    #[tokio::test]
    async fn test_read_listing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listing.json");
        std::fs::write(&path, LISTING).unwrap();

        let tree = read_listing(&path).await.unwrap();
        assert_eq!(tree.name.as_deref(), Some("app"));
        assert!(tree.dependencies.contains_key("a"));
    }

    #[tokio::test]
    async fn test_read_missing_listing() {
        let dir = tempdir().unwrap();
        let err = read_listing(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, Error::ListingRead { .. }));
    }

    #[tokio::test]
    async fn test_read_invalid_listing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("listing.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_listing(&path).await.unwrap_err();
        assert_eq!(err.code(), Some(codes::LISTING_INVALID));
    }

    #[tokio::test]
    async fn test_missing_npm_binary() {
        let dir = tempdir().unwrap();
        let err = run_npm_ls_with("npmflat-definitely-not-npm", dir.path())
            .await
            .unwrap_err();
        assert_eq!(err.code(), codes::LISTING_FAILED);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fake_npm_listing_with_failing_status() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let listing = dir.path().join("listing.json");
        std::fs::write(&listing, LISTING).unwrap();

        // Prints a listing, then exits 1 like npm does for extraneous packages.
        let script = dir.path().join("fake-npm");
        std::fs::write(
            &script,
            format!("#!/bin/sh\ncat '{}'\nexit 1\n", listing.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let tree = run_npm_ls_with(script.to_str().unwrap(), dir.path())
            .await
            .unwrap();
        assert!(tree.dependencies.contains_key("a"));
    }
}
