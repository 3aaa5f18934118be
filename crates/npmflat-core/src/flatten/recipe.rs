//! Rendering a flat resolution for a build recipe.

use super::FlatResolution;
use crate::error::Error;
use std::fmt::Write;
use std::path::Path;

/// Indentation of a stanza inside the recipe class body.
const INDENT: &str = "  ";

/// Render one `resource` stanza per resource, in resolution order.
///
/// A resource with parents notes them in a leading comment. Native addons are listed afterwards as a comment block, since their build
/// step has to be written by hand.
#[must_use]
pub fn render_recipe(flat: &FlatResolution) -> String {
    let mut out = String::new();

    for (i, record) in flat.resources.values().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{INDENT}resource {} do", quote(&record.name));
        if !record.parents.is_empty() {
            let _ = writeln!(out, "{INDENT}  # required by {}", record.parents.join(", "));
        }
        let _ = writeln!(out, "{INDENT}  url {}", quote(&record.url));
        if let Some(sha256) = &record.sha256 {
            let _ = writeln!(out, "{INDENT}  sha256 {}", quote(sha256));
        }
        let _ = writeln!(out, "{INDENT}end");
    }

    if !flat.native_addons.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{INDENT}# Native addons needing a post-install build:");
        for addon in &flat.native_addons {
            let _ = writeln!(out, "{INDENT}#   {}: {}", addon.resource, addon.command);
        }
    }

    out
}

/// Serialize the resolution as pretty JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn to_json(flat: &FlatResolution) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(flat)
}

/// Write rendered output to `path`.
///
/// # Errors
/// Returns `Error::OutputWrite` if the file cannot be written.
pub fn write_output(path: &Path, content: &str) -> Result<(), Error> {
    std::fs::write(path, content).map_err(|source| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Double-quoted string literal with `\` and `"` escaped.
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
