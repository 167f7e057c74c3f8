//! Query layer
//!
//! # Modules
//!
//! - [`types`]: `Query` and its name matcher
//! - [`environment`]: Interpreters and architectures of interest, resolve options
//! - [`compatibility`]: Interpreter and architecture compatibility predicates
//! - [`engine`]: Query sets, `resolve` and the latest-only reduction

pub mod compatibility;
pub mod engine;
pub mod environment;
pub mod types;

pub use compatibility::{CompatibilityResolver, is_arch_compatible, is_interpreter_compatible};
pub use engine::{
    InvalidQuery, QueryOutcome, QuerySet, QueryStatus, ResultSet, latest_only, resolve,
};
pub use environment::{
    EnvironmentContext, PythonVersion, PythonVersionError, ResolveOptions, Selection, VersionMode,
};
pub use types::{NameMatcher, Query};
