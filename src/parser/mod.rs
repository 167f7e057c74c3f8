//! Parser layer
//! - traits.rs: Parser trait definition and parse errors
//! - types.rs: Common types (PackageName, Arch, BuildTag, ArtifactRecord)
//! - wheel_filename.rs: Wheel filename parser
//! - requirement.rs: Requirement line parser

pub mod requirement;
pub mod traits;
pub mod types;
pub mod wheel_filename;

pub use requirement::{RequirementParser, requirement_lines};
pub use traits::{ParseError, Parser, RequirementError};
pub use types::{Arch, ArtifactRecord, BuildTag, PackageName, normalize_name};
pub use wheel_filename::{WHEEL_EXTENSION, WheelFilenameParser};
