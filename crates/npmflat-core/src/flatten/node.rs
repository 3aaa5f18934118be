//! Model of the `npm ls --json --long` listing.
//!
//! Only the fields the flattener reads are modelled; everything else in the
//! listing is ignored. Child maps keep the listing's order, which drives the
//! order resources are discovered in.

use super::error::FlattenError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

/// Child dependencies in listing order.
pub type Dependencies = IndexMap<String, DependencyNode>;

/// The top-level listing document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyTree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: Dependencies,
}

impl DependencyTree {
    /// Decode a listing from a JSON string.
    ///
    /// # Errors
    /// Returns `LISTING_INVALID` if the document is not a valid listing.
    pub fn from_json(json: &str) -> Result<Self, FlattenError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a listing from a reader.
    ///
    /// # Errors
    /// Returns `LISTING_INVALID` if the document is not a valid listing.
    pub fn from_reader(reader: impl Read) -> Result<Self, FlattenError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// One installed package occurrence in the listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
    /// Composite `name@version` identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Download URL. Absent when the entry is only a reference to a package
    /// installed elsewhere in the tree.
    #[serde(rename = "_resolved", default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(rename = "_location", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Locations of the packages that require this one directly.
    #[serde(rename = "_requiredBy", default, skip_serializing_if = "Vec::is_empty")]
    pub required_by: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scripts: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<BinField>,
    #[serde(
        alias = "bundledDependencies",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bundle_dependencies: Option<Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub optional_dependencies: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: Dependencies,
}

impl DependencyNode {
    /// Bare package name, from `name` or else parsed out of `_id`.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.id.as_deref().map(|id| split_id(id).0))
    }

    /// The `install` lifecycle script, if declared.
    #[must_use]
    pub fn install_script(&self) -> Option<&str> {
        self.scripts
            .get("install")
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Whether the package ships bundled dependencies.
    ///
    /// npm accepts `true`, a list of names, or (rarely) a map here.
    #[must_use]
    pub fn declares_bundled(&self) -> bool {
        match &self.bundle_dependencies {
            Some(Value::Bool(b)) => *b,
            Some(Value::Array(names)) => !names.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn declares_optional(&self) -> bool {
        !self.optional_dependencies.is_empty()
    }
}

/// The `bin` field: either a single executable named after the package, or a
/// map of executable name to path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinField {
    Single(String),
    Map(IndexMap<String, String>),
}

impl BinField {
    /// Normalize into executable name → path.
    ///
    /// A single-path `bin` is exposed under the unscoped package name.
    #[must_use]
    pub fn mappings(&self, package_name: &str) -> IndexMap<String, String> {
        match self {
            Self::Single(path) => {
                let exe = package_name
                    .rsplit_once('/')
                    .map_or(package_name, |(_, name)| name);
                IndexMap::from([(exe.to_string(), path.clone())])
            }
            Self::Map(map) => map.clone(),
        }
    }
}

/// Split a composite `name@version` identifier.
///
/// The leading `@` of a scoped name is never treated as the separator.
#[must_use]
pub fn split_id(id: &str) -> (&str, Option<&str>) {
    match id.rfind('@') {
        Some(pos) if pos > 0 => (&id[..pos], Some(&id[pos + 1..])),
        _ => (id, None),
    }
}
