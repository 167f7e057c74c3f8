//! Query engine: selects the records answering a set of queries
//!
//! Per query the corpus goes through a name filter, the compatibility filter,
//! the version specifier and, unless every version is wanted, the latest-only
//! reduction. The per-query results are then merged into one sorted set.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::parser::{ArtifactRecord, PackageName, Parser, RequirementError, RequirementParser};
use crate::query::compatibility::CompatibilityResolver;
use crate::query::environment::{EnvironmentContext, ResolveOptions, VersionMode};
use crate::query::types::Query;

/// A query that could not be parsed, kept so it is reported as unavailable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidQuery {
    pub raw: String,
    pub error: RequirementError,
}

/// The queries of one run, valid and invalid
#[derive(Debug, Clone, Default)]
pub struct QuerySet {
    queries: Vec<Query>,
    invalid: Vec<InvalidQuery>,
}

impl QuerySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair every name with every version; no version means no specifier.
    pub fn from_cli(names: &[String], versions: &[String]) -> Self {
        let mut set = Self::new();
        for name in names {
            if versions.is_empty() {
                set.add(name, Query::new(name, None));
                continue;
            }
            for version in versions {
                set.add(&format!("{name}{version}"), Query::new(name, Some(version)));
            }
        }
        set
    }

    /// Parse requirement lines, keeping unparsable ones as invalid queries
    pub fn from_requirements<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let parser = RequirementParser::new();
        let mut set = Self::new();
        for line in lines {
            set.add(line.trim(), parser.parse(line));
        }
        set
    }

    fn add(&mut self, raw: &str, query: Result<Query, RequirementError>) {
        match query {
            Ok(query) => self.queries.push(query),
            Err(error) => self.invalid.push(InvalidQuery {
                raw: raw.to_string(),
                error,
            }),
        }
    }

    pub fn push(&mut self, query: Query) {
        self.queries.push(query);
    }

    pub fn extend(&mut self, other: QuerySet) {
        self.queries.extend(other.queries);
        self.invalid.extend(other.invalid);
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn invalid(&self) -> &[InvalidQuery] {
        &self.invalid
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty() && self.invalid.is_empty()
    }
}

/// Outcome of a single query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryStatus {
    Available { matches: usize },
    NotAvailable,
    Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    /// Name pattern of the query, shown in not-available rows
    pub pattern: String,
    #[serde(flatten)]
    pub status: QueryStatus,
}

impl QueryOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self.status, QueryStatus::Available { .. })
    }
}

/// Records answering a query set, with per-query bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    /// Sorted by [`ArtifactRecord::listing_cmp`], without duplicates
    pub records: Vec<ArtifactRecord>,
    /// Keyed by query label, in first-seen order.
    ///
    /// Identical queries (e.g. `numpy` on the command line and in a requirements
    /// file) share one entry.
    pub queries: IndexMap<String, QueryOutcome>,
}

impl ResultSet {
    /// Queries that matched nothing or could not be parsed
    pub fn not_available(&self) -> impl Iterator<Item = (&String, &QueryOutcome)> {
        self.queries.iter().filter(|(_, outcome)| !outcome.is_available())
    }
}

/// Select the records answering `queries` under `context`.
///
/// No query at all means one query matching everything.
pub fn resolve(
    corpus: &[ArtifactRecord],
    queries: &QuerySet,
    context: &EnvironmentContext,
    options: ResolveOptions,
) -> ResultSet {
    let implicit;
    let valid = if queries.is_empty() {
        implicit = [Query::any()];
        &implicit[..]
    } else {
        queries.queries()
    };

    let resolver = CompatibilityResolver::new(context);
    let mut outcomes = IndexMap::new();
    let mut selected: Vec<&ArtifactRecord> = Vec::new();

    for query in valid {
        let label = query.label();
        if outcomes.contains_key(&label) {
            debug!("Query {} already resolved", label);
            continue;
        }
        let matching = select(corpus, query, &resolver, options);
        debug!("Query {} matched {} wheels", query, matching.len());

        let status = if matching.is_empty() {
            QueryStatus::NotAvailable
        } else {
            QueryStatus::Available {
                matches: matching.len(),
            }
        };
        outcomes.insert(
            label,
            QueryOutcome {
                pattern: query.pattern().to_string(),
                status,
            },
        );
        selected.extend(matching);
    }

    for invalid in queries.invalid() {
        if outcomes.contains_key(&invalid.raw) {
            continue;
        }
        warn!("Invalid query {}: {}", invalid.raw, invalid.error);
        outcomes.insert(
            invalid.raw.clone(),
            QueryOutcome {
                pattern: invalid.raw.clone(),
                status: QueryStatus::Invalid {
                    reason: invalid.error.to_string(),
                },
            },
        );
    }

    selected.sort_by(|a, b| a.listing_cmp(b));
    selected.dedup();

    ResultSet {
        records: selected.into_iter().cloned().collect(),
        queries: outcomes,
    }
}

fn select<'c>(
    corpus: &'c [ArtifactRecord],
    query: &Query,
    resolver: &CompatibilityResolver<'_>,
    options: ResolveOptions,
) -> Vec<&'c ArtifactRecord> {
    let matching: Vec<&ArtifactRecord> = corpus
        .iter()
        .filter(|record| query.matches_name(&record.name))
        .filter(|record| resolver.is_compatible(record))
        .filter(|record| query.matches_version(&record.version))
        .collect();

    // An explicit specifier asks for every matching version
    if options.versions == VersionMode::All || query.specifier().is_some() {
        matching
    } else {
        latest_only(matching)
    }
}

/// Keep the highest version of each (name, local label) group.
///
/// Records equal but for their build tag keep only the highest build.
pub fn latest_only<'c>(records: Vec<&'c ArtifactRecord>) -> Vec<&'c ArtifactRecord> {
    let mut groups: BTreeMap<(PackageName, Option<String>), Vec<&ArtifactRecord>> =
        BTreeMap::new();
    for record in records {
        groups
            .entry((record.name.clone(), record.local_version().map(str::to_string)))
            .or_default()
            .push(record);
    }

    let mut latest = Vec::new();
    for group in groups.into_values() {
        let Some(highest) = group
            .iter()
            .map(|record| &record.version)
            .max_by(|a, b| a.cmp_public(b))
        else {
            continue;
        };
        let newest: Vec<&ArtifactRecord> = group
            .iter()
            .copied()
            .filter(|record| record.version.cmp_public(highest) == Ordering::Equal)
            .collect();
        latest.extend(highest_builds(newest));
    }
    latest
}

/// Among records differing only by build tag, keep the highest build
fn highest_builds<'c>(records: Vec<&'c ArtifactRecord>) -> Vec<&'c ArtifactRecord> {
    records
        .iter()
        .copied()
        .filter(|record| {
            !records.iter().any(|other| {
                other.build_tag > record.build_tag
                    && other.python_tag() == record.python_tag()
                    && other.abi_tag == record.abi_tag
                    && other.platform_tag == record.platform_tag
                    && other.arch == record.arch
            })
        })
        .collect()
}
