//! Query types shared by the CLI and requirement-file inputs

use std::fmt;
use std::str::FromStr;

use crate::parser::traits::RequirementError;
use crate::parser::types::{PackageName, normalize_name};
use crate::version::{Version, VersionSpecifiers};

/// Match a package name either exactly or by glob
///
/// Both the pattern and the candidate are normalized first, so matching is
/// case-insensitive and `-`, `_`, `.` are interchangeable.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Exact(PackageName),
    /// `*` matches any run of characters, `?` one character, `[...]` a class
    Glob(glob::Pattern),
}

impl NameMatcher {
    pub fn matches(&self, name: &PackageName) -> bool {
        match self {
            NameMatcher::Exact(exact) => exact == name,
            NameMatcher::Glob(pattern) => pattern.matches(name.as_str()),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, NameMatcher::Exact(_))
    }
}

impl FromStr for NameMatcher {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(RequirementError::InvalidPattern(s.to_string()));
        }
        if trimmed.contains(['*', '?', '[']) {
            glob::Pattern::new(&normalize_name(trimmed))
                .map(NameMatcher::Glob)
                .map_err(|_| RequirementError::InvalidPattern(s.to_string()))
        } else {
            Ok(NameMatcher::Exact(PackageName::new(trimmed)))
        }
    }
}

impl fmt::Display for NameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameMatcher::Exact(name) => write!(f, "{name}"),
            NameMatcher::Glob(pattern) => f.write_str(pattern.as_str()),
        }
    }
}

/// One selection request: a name pattern plus an optional version specifier
///
/// CLI arguments and requirement-file lines both produce this type.
#[derive(Debug, Clone)]
pub struct Query {
    pattern: String,
    name: NameMatcher,
    specifier: Option<VersionSpecifiers>,
}

impl Query {
    /// Build a query from a name pattern and an optional specifier string.
    ///
    /// A specifier without an operator (`1.15*`) is read as `==`.
    pub fn new(pattern: &str, specifier: Option<&str>) -> Result<Self, RequirementError> {
        let name = NameMatcher::from_str(pattern)?;
        let specifier = specifier
            .map(str::trim)
            .filter(|spec| !spec.is_empty())
            .map(|spec| {
                VersionSpecifiers::from_str(spec).map_err(|source| {
                    RequirementError::InvalidSpecifier {
                        requirement: format!("{}{}", pattern.trim(), spec),
                        source,
                    }
                })
            })
            .transpose()?;

        Ok(Self {
            pattern: pattern.trim().to_string(),
            name,
            specifier,
        })
    }

    /// The implicit query used when nothing was asked for
    pub fn any() -> Self {
        Self {
            pattern: "*".to_string(),
            name: NameMatcher::Glob(glob::Pattern::new("*").expect("'*' is a valid glob")),
            specifier: None,
        }
    }

    /// The name pattern as given
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn specifier(&self) -> Option<&VersionSpecifiers> {
        self.specifier.as_ref()
    }

    pub fn matches_name(&self, name: &PackageName) -> bool {
        self.name.matches(name)
    }

    /// True when there is no specifier or the version satisfies it
    pub fn matches_version(&self, version: &Version) -> bool {
        self.specifier
            .as_ref()
            .is_none_or(|specifier| specifier.contains(version))
    }

    /// Key used to report this query, e.g. `numpy<1.23`
    pub fn label(&self) -> String {
        match &self.specifier {
            Some(specifier) => format!("{}{}", self.pattern, specifier),
            None => self.pattern.clone(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("numpy", "numpy", true)]
    #[case("NumPy", "numpy", true)]
    #[case("netcdf4", "netCDF4", true)]
    #[case("torch-cpu", "torch_cpu", true)]
    #[case("numpy", "numpy_cli", false)]
    #[case("*scipy*", "scipy", true)]
    #[case("Nump*", "numpy", true)]
    #[case("torch*", "torch_cpu", true)]
    #[case("numpy-*", "numpy_cli", true)]
    #[case("*cdf*", "netCDF4", true)]
    #[case("*cdf*", "numpy", false)]
    #[case("*", "anything", true)]
    #[case("[m-o]umpy", "numpy", true)]
    #[case("[m-o]umpy", "pumpy", false)]
    #[case("torch-[cg]pu", "torch_gpu", true)]
    fn name_matcher_matches_case_and_separator_insensitively(
        #[case] pattern: &str,
        #[case] name: &str,
        #[case] expected: bool,
    ) {
        let matcher: NameMatcher = pattern.parse().unwrap();
        assert_eq!(matcher.matches(&PackageName::new(name)), expected);
    }

    #[test]
    fn name_matcher_is_exact_without_glob_characters() {
        assert!("numpy".parse::<NameMatcher>().unwrap().is_exact());
        assert!(!"numpy*".parse::<NameMatcher>().unwrap().is_exact());
    }

    #[test]
    fn name_matcher_rejects_empty_pattern() {
        assert!("  ".parse::<NameMatcher>().is_err());
    }

    #[test]
    fn query_without_specifier_matches_every_version() {
        let query = Query::new("numpy", None).unwrap();
        assert!(query.matches_version(&"0.1".parse().unwrap()));
        assert_eq!(query.label(), "numpy");
    }

    #[test]
    fn query_reads_bare_version_as_equality() {
        let query = Query::new("numpy", Some("1.15*")).unwrap();
        assert!(query.matches_version(&"1.15.4".parse().unwrap()));
        assert!(!query.matches_version(&"1.16.0".parse().unwrap()));
        assert_eq!(query.label(), "numpy==1.15*");
    }

    #[test]
    fn query_with_invalid_specifier_fails() {
        let result = Query::new("numpy", Some("=>1.0"));
        assert!(matches!(result, Err(RequirementError::InvalidSpecifier { .. })));
    }

    #[test]
    fn any_query_matches_everything() {
        let query = Query::any();
        assert!(query.matches_name(&PackageName::new("whatever")));
        assert_eq!(query.pattern(), "*");
    }
}
