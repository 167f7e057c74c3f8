//! Version layer for wheel selection
//!
//! # Modules
//!
//! - [`pep440`]: Version grammar and the `dev < pre < final < post` ordering
//! - [`specifier`]: Version specifiers (`==`, `~=`, `1.21.*`, ...) compiled and matched against versions
//! - [`error`]: Error types for version and specifier parsing

pub mod error;
pub mod pep440;
pub mod specifier;

pub use error::{SpecifierError, VersionParseError};
pub use pep440::{PreRelease, Version};
pub use specifier::{Operator, VersionSpecifier, VersionSpecifiers, matches};
