//! Flattening error types.

use std::fmt;

/// Flattening error codes.
pub mod codes {
    // Structural: the tree violates the flattener's assumptions.
    pub const TREE_DUPLICATE_ROOT: &str = "TREE_DUPLICATE_ROOT";
    pub const TREE_LOCATION_UNINDEXED: &str = "TREE_LOCATION_UNINDEXED";
    pub const TREE_PARENTS_EMPTY: &str = "TREE_PARENTS_EMPTY";
    pub const TREE_ROOT_UNRESOLVED: &str = "TREE_ROOT_UNRESOLVED";

    // Transport
    pub const HASH_FETCH_FAILED: &str = "HASH_FETCH_FAILED";

    // Input / output glue
    pub const LISTING_INVALID: &str = "LISTING_INVALID";
    pub const LISTING_FAILED: &str = "LISTING_FAILED";
}

/// Broad classification of a [`FlattenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The dependency tree is structurally inconsistent. Never recoverable.
    Structural,
    /// A hash fetch failed at the network level.
    Transport,
    /// The listing could not be produced or decoded.
    Input,
}

/// Flattening error.
#[derive(Debug)]
pub struct FlattenError {
    code: &'static str,
    message: String,
}

impl FlattenError {
    /// Create a new error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Classify the error by its code.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.code {
            codes::TREE_DUPLICATE_ROOT
            | codes::TREE_LOCATION_UNINDEXED
            | codes::TREE_PARENTS_EMPTY
            | codes::TREE_ROOT_UNRESOLVED => ErrorKind::Structural,
            codes::HASH_FETCH_FAILED => ErrorKind::Transport,
            _ => ErrorKind::Input,
        }
    }

    /// A root-level dependency was declared twice.
    #[must_use]
    pub fn duplicate_root(name: &str) -> Self {
        Self::new(
            codes::TREE_DUPLICATE_ROOT,
            format!("Root dependency declared more than once: {name}"),
        )
    }

    /// A requirer location has no resource in the location index.
    #[must_use]
    pub fn location_unindexed(location: &str, resource: &str) -> Self {
        Self::new(
            codes::TREE_LOCATION_UNINDEXED,
            format!("Location '{location}' (required by '{resource}') was never indexed"),
        )
    }

    /// A nested resource has no requirer.
    #[must_use]
    pub fn parents_empty(resource: &str) -> Self {
        Self::new(
            codes::TREE_PARENTS_EMPTY,
            format!("Nested dependency has no parents: {resource}"),
        )
    }

    /// A root dependency was only ever seen without a resolved URL.
    #[must_use]
    pub fn root_unresolved(name: &str) -> Self {
        Self::new(
            codes::TREE_ROOT_UNRESOLVED,
            format!("Root dependency never resolved: {name}"),
        )
    }

    /// Create a hash fetch error.
    pub fn hash_fetch(msg: impl Into<String>) -> Self {
        Self::new(codes::HASH_FETCH_FAILED, msg)
    }

    /// Create a listing decode error.
    pub fn listing_invalid(msg: impl Into<String>) -> Self {
        Self::new(codes::LISTING_INVALID, msg)
    }

    /// Create a listing subprocess error.
    pub fn listing_failed(msg: impl Into<String>) -> Self {
        Self::new(codes::LISTING_FAILED, msg)
    }
}

impl fmt::Display for FlattenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for FlattenError {}

impl From<reqwest::Error> for FlattenError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::hash_fetch(format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::hash_fetch(format!("Connection failed: {e}"))
        } else {
            Self::hash_fetch(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FlattenError {
    fn from(e: serde_json::Error) -> Self {
        Self::listing_invalid(format!("Invalid JSON: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        let err = FlattenError::duplicate_root("left-pad");
        assert_eq!(err.code(), codes::TREE_DUPLICATE_ROOT);
        assert!(err.to_string().contains(codes::TREE_DUPLICATE_ROOT));
        assert!(err.message().contains("left-pad"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            FlattenError::parents_empty("b@1.0.0").kind(),
            ErrorKind::Structural
        );
        assert_eq!(
            FlattenError::location_unindexed("/a/b", "b@1.0.0").kind(),
            ErrorKind::Structural
        );
        assert_eq!(
            FlattenError::root_unresolved("a").kind(),
            ErrorKind::Structural
        );
        assert_eq!(FlattenError::hash_fetch("boom").kind(), ErrorKind::Transport);
        assert_eq!(FlattenError::listing_invalid("bad").kind(), ErrorKind::Input);
    }

    #[test]
    fn test_json_error_is_listing_invalid() {
        let err: FlattenError = serde_json::from_str::<serde_json::Value>("{{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), codes::LISTING_INVALID);
    }

    #[test]
    fn test_error_codes_uppercase() {
        // All codes should be SCREAMING_SNAKE_CASE
        let all_codes = [
            codes::TREE_DUPLICATE_ROOT,
            codes::TREE_LOCATION_UNINDEXED,
            codes::TREE_PARENTS_EMPTY,
            codes::TREE_ROOT_UNRESOLVED,
            codes::HASH_FETCH_FAILED,
            codes::LISTING_INVALID,
            codes::LISTING_FAILED,
        ];

        for code in all_codes {
            assert!(
                code.chars().all(|c| c.is_uppercase() || c == '_'),
                "Error code '{code}' should be SCREAMING_SNAKE_CASE"
            );
        }
    }
}
