//! Native addon install scripts.
//!
//! Packages with an `install` script usually build or download a compiled
//! artifact. Recipes build from source, so known prebuilt-binary downloaders
//! are forced into compile mode and the command is kept for a manual
//! post-install step.

use serde::{Deserialize, Serialize};

/// A resource that needs a post-install build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeAddon {
    /// Resource identifier (bare name for root-level, `name@version` otherwise).
    pub resource: String,
    /// Install command, rewritten to build from source where recognised.
    pub command: String,
}

/// Prebuilt-binary tools and the flag that forces each to compile.
const PREBUILT_TOOLS: &[(&str, &str)] = &[
    (r"node-pre-gyp\s+install\b[^&|;]*", "--build-from-source"),
    (r"\bprebuild\s+--install\b[^&|;]*", "--compile"),
];

/// Rewrite an install script so prebuilt-binary downloads become source builds.
///
/// Unrecognised commands are returned unchanged.
#[must_use]
pub fn rewrite_install_script(script: &str) -> String {
    let mut result = script.to_string();

    for (pattern, flag) in PREBUILT_TOOLS {
        if let Ok(re) = regex_lite::Regex::new(pattern) {
            result = re
                .replace_all(&result, |caps: &regex_lite::Captures| {
                    let invocation = &caps[0];
                    let trimmed = invocation.trim_end();
                    if trimmed.split_whitespace().any(|arg| arg == *flag) {
                        return invocation.to_string();
                    }
                    let trailing = &invocation[trimmed.len()..];
                    format!("{trimmed} {flag}{trailing}")
                })
                .into_owned();
        }
    }

    result
}
