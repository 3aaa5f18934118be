#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod flatten;
pub mod version;

pub use config::Config;
pub use error::Error;
pub use flatten::{
    flatten_tree, resolve_and_normalize, DependencyTree, FlatResolution, FlattenError,
    HashFetcher, ResolveOptions, ResourceRecord,
};
pub use version::VERSION;
