//! Version and build identification.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `User-Agent` sent with tarball fetches.
pub const USER_AGENT: &str = concat!("npmflat/", env!("CARGO_PKG_VERSION"));

/// `npmflat <version>`, plus the commit when built with `NPMFLAT_BUILD_GIT_HASH`.
#[must_use]
pub fn version_string() -> String {
    match option_env!("NPMFLAT_BUILD_GIT_HASH") {
        Some(hash) => format!("npmflat {VERSION} ({hash})"),
        None => format!("npmflat {VERSION}"),
    }
}
