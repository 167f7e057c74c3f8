//! Version specifiers for selecting wheels by version
//!
//! Supports:
//! - `==1.21`, `!=1.21`, `<1.21`, `<=1.21`, `>1.21`, `>=1.21` - comparisons, zero-padded
//! - `~=1.4` - compatible release: `>=1.4` and `==1.4.*`
//! - `~=1.4.2` - compatible release: `>=1.4.2` and `==1.4.*`
//! - `==1.21.*`, `!=1.21.*` - release prefix match
//! - `===1.0.0` - exact text match
//! - `1.15*`, `==*` - glob over the version text
//! - `>=1.0, <2.0` - every clause must match
//!
//! An operand without an operator is read as `==`.

use std::fmt;
use std::str::FromStr;

use crate::version::error::{SpecifierError, VersionParseError};
use crate::version::pep440::Version;

/// Comparison operator of a single specifier clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Compatible,
    Arbitrary,
}

impl Operator {
    /// Longest tokens first so that `===` is not read as `==`
    const TOKENS: [(&'static str, Operator); 8] = [
        ("===", Operator::Arbitrary),
        ("==", Operator::Equal),
        ("!=", Operator::NotEqual),
        ("<=", Operator::LessThanEqual),
        (">=", Operator::GreaterThanEqual),
        ("~=", Operator::Compatible),
        ("<", Operator::LessThan),
        (">", Operator::GreaterThan),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanEqual => ">=",
            Operator::Compatible => "~=",
            Operator::Arbitrary => "===",
        }
    }

    /// Split a clause into its operator and operand.
    ///
    /// Returns `None` for the operator when the clause has none.
    fn split(clause: &str) -> (Option<Operator>, &str) {
        Self::TOKENS
            .iter()
            .find_map(|(token, op)| clause.strip_prefix(*token).map(|rest| (Some(*op), rest.trim())))
            .unwrap_or((None, clause))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single compiled specifier clause
#[derive(Debug, Clone)]
pub enum VersionSpecifier {
    /// Ordered or equality comparison against a version
    Compare { operator: Operator, version: Version },
    /// `~=`: at least `lower`, within the `prefix` release family
    Compatible { lower: Version, prefix: Vec<u64> },
    /// `==X.Y.*` or `!=X.Y.*`
    Prefix { negated: bool, release: Vec<u64> },
    /// `===text`
    Arbitrary(String),
    /// Glob over the rendered version
    Glob(glob::Pattern),
}

impl VersionSpecifier {
    /// Check whether a version satisfies this clause
    pub fn contains(&self, version: &Version) -> bool {
        match self {
            VersionSpecifier::Compare { operator, version: wanted } => {
                compare(*operator, version, wanted)
            }
            VersionSpecifier::Compatible { lower, prefix } => {
                version.cmp_public(lower).is_ge() && version.has_release_prefix(prefix)
            }
            VersionSpecifier::Prefix { negated, release } => {
                version.has_release_prefix(release) != *negated
            }
            VersionSpecifier::Arbitrary(text) => version.to_string() == *text,
            VersionSpecifier::Glob(pattern) => pattern.matches(&version.to_string()),
        }
    }
}

fn compare(operator: Operator, candidate: &Version, wanted: &Version) -> bool {
    let ordering = candidate.cmp_public(wanted);
    // A local label on the specifier must match exactly; without one the candidate's is ignored
    let local_matches = wanted.local().is_none() || wanted.local() == candidate.local();

    match operator {
        Operator::Equal => ordering.is_eq() && local_matches,
        Operator::NotEqual => !(ordering.is_eq() && local_matches),
        Operator::LessThan => ordering.is_lt(),
        Operator::LessThanEqual => ordering.is_le(),
        Operator::GreaterThan => ordering.is_gt(),
        Operator::GreaterThanEqual => ordering.is_ge(),
        Operator::Compatible | Operator::Arbitrary => false,
    }
}

impl FromStr for VersionSpecifier {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clause = s.trim();
        if clause.is_empty() {
            return Err(SpecifierError::EmptyClause(s.to_string()));
        }

        let (operator, operand) = match Operator::split(clause) {
            (Some(operator), operand) => (operator, operand),
            (None, _) if clause.starts_with(['=', '<', '>', '!', '~']) => {
                return Err(SpecifierError::UnknownOperator(clause.to_string()));
            }
            (None, operand) => (Operator::Equal, operand),
        };

        if operand.is_empty() {
            return Err(SpecifierError::EmptyClause(clause.to_string()));
        }

        if operator == Operator::Arbitrary {
            return Ok(VersionSpecifier::Arbitrary(operand.to_string()));
        }

        if operand.contains(['*', '?', '[']) {
            return parse_wildcard(operator, operand);
        }

        let version = parse_operand(operand)?;

        if operator == Operator::Compatible {
            if version.release().len() < 2 || version.local().is_some() {
                return Err(SpecifierError::CompatibleTooShort(operand.to_string()));
            }
            let keep = (version.release().len() - 1).max(2);
            let prefix = version.release()[..keep].to_vec();
            return Ok(VersionSpecifier::Compatible {
                lower: version,
                prefix,
            });
        }

        Ok(VersionSpecifier::Compare { operator, version })
    }
}

fn parse_operand(operand: &str) -> Result<Version, SpecifierError> {
    Version::from_str(operand).map_err(|source| SpecifierError::InvalidVersion {
        operand: operand.to_string(),
        source,
    })
}

fn parse_wildcard(operator: Operator, operand: &str) -> Result<VersionSpecifier, SpecifierError> {
    let not_allowed = || SpecifierError::WildcardNotAllowed {
        operator: operator.as_str().to_string(),
        operand: operand.to_string(),
    };

    if let Some(head) = operand.strip_suffix(".*")
        && !head.contains(['*', '?', '['])
    {
        let negated = match operator {
            Operator::Equal => false,
            Operator::NotEqual => true,
            _ => return Err(not_allowed()),
        };
        let version = parse_operand(head)?;
        if !version.is_plain_release() {
            return Err(SpecifierError::InvalidVersion {
                operand: operand.to_string(),
                source: VersionParseError::InvalidSuffix {
                    version: head.to_string(),
                    suffix: version.to_string(),
                },
            });
        }
        return Ok(VersionSpecifier::Prefix {
            negated,
            release: version.release().to_vec(),
        });
    }

    if operator != Operator::Equal {
        return Err(not_allowed());
    }

    glob::Pattern::new(operand)
        .map(VersionSpecifier::Glob)
        .map_err(|_| SpecifierError::InvalidGlob(operand.to_string()))
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpecifier::Compare { operator, version } => write!(f, "{operator}{version}"),
            VersionSpecifier::Compatible { lower, .. } => write!(f, "~={lower}"),
            VersionSpecifier::Prefix { negated, release } => {
                let release = release
                    .iter()
                    .map(|segment| segment.to_string())
                    .collect::<Vec<_>>()
                    .join(".");
                let operator = if *negated { "!=" } else { "==" };
                write!(f, "{operator}{release}.*")
            }
            VersionSpecifier::Arbitrary(text) => write!(f, "==={text}"),
            VersionSpecifier::Glob(pattern) => write!(f, "=={}", pattern.as_str()),
        }
    }
}

/// A comma-separated conjunction of specifier clauses
#[derive(Debug, Clone)]
pub struct VersionSpecifiers(Vec<VersionSpecifier>);

impl VersionSpecifiers {
    /// Check whether a version satisfies every clause
    pub fn contains(&self, version: &Version) -> bool {
        self.0.iter().all(|specifier| specifier.contains(version))
    }

    pub fn iter(&self) -> impl Iterator<Item = &VersionSpecifier> {
        self.0.iter()
    }
}

impl FromStr for VersionSpecifiers {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(SpecifierError::EmptyClause(s.to_string()));
        }
        s.split(',')
            .map(VersionSpecifier::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(VersionSpecifiers)
    }
}

impl fmt::Display for VersionSpecifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses = self
            .0
            .iter()
            .map(|specifier| specifier.to_string())
            .collect::<Vec<_>>();
        f.write_str(&clauses.join(","))
    }
}

/// Check a version against a specifier string.
///
/// An invalid specifier matches nothing.
pub fn matches(specifier: &str, version: &Version) -> bool {
    VersionSpecifiers::from_str(specifier)
        .map(|specifiers| specifiers.contains(version))
        .unwrap_or(false)
}
