use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("Empty version")]
    Empty,

    #[error("Invalid release segment '{segment}' in version '{version}'")]
    InvalidRelease { version: String, segment: String },

    #[error("Invalid suffix '{suffix}' in version '{version}'")]
    InvalidSuffix { version: String, suffix: String },

    #[error("Invalid local version label '{label}' in version '{version}'")]
    InvalidLocal { version: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecifierError {
    #[error("Empty specifier clause in '{0}'")]
    EmptyClause(String),

    #[error("Unknown operator in specifier '{0}'")]
    UnknownOperator(String),

    #[error("Invalid version '{operand}' in specifier: {source}")]
    InvalidVersion {
        operand: String,
        #[source]
        source: VersionParseError,
    },

    #[error("Wildcard '{operand}' is not allowed with operator '{operator}'")]
    WildcardNotAllowed { operator: String, operand: String },

    #[error("Compatible release '~={0}' needs at least two release segments")]
    CompatibleTooShort(String),

    #[error("Invalid glob '{0}'")]
    InvalidGlob(String),
}
