//! Parser trait definition

use thiserror::Error;

use crate::version::{SpecifierError, VersionParseError};

/// Trait for parsers that turn one line of text into a typed value
pub trait Parser {
    type Output;
    type Error;

    /// Parse a single input (a filename, a requirement line, ...)
    fn parse(&self, input: &str) -> Result<Self::Output, Self::Error>;
}

/// Why a wheel filename could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    #[error("Expected 5 or 6 '-' separated fields, found {found}: {filename}")]
    WrongFieldCount { filename: String, found: usize },

    #[error("Invalid distribution name '{0}'")]
    InvalidName(String),

    #[error("Invalid version in {filename}: {source}")]
    InvalidVersion {
        filename: String,
        #[source]
        source: VersionParseError,
    },

    #[error("Invalid build tag '{0}': must start with a digit")]
    InvalidBuildTag(String),

    #[error("Invalid {kind} tag '{tag}' in {filename}")]
    InvalidTag {
        filename: String,
        kind: &'static str,
        tag: String,
    },
}

/// Why a query (a requirement line or a CLI name/version pair) could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    #[error("Invalid requirement syntax: '{0}'")]
    InvalidSyntax(String),

    #[error("Invalid name pattern '{0}'")]
    InvalidPattern(String),

    #[error("Invalid version specifier in '{requirement}': {source}")]
    InvalidSpecifier {
        requirement: String,
        #[source]
        source: SpecifierError,
    },
}
