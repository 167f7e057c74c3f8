//! Report layer: turns a [`ResultSet`] into printable output
//!
//! - mod.rs: Columns, options and row building (not-available rows, condensing)
//! - table.rs: Simple and MediaWiki table rendering

pub mod table;

use std::fmt;

use clap::ValueEnum;
use indexmap::IndexMap;

use crate::parser::ArtifactRecord;
use crate::query::ResultSet;

/// A column of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Column {
    Name,
    Version,
    Build,
    Python,
    Abi,
    Platform,
    Arch,
}

impl Column {
    /// Columns shown when none are requested
    pub const DEFAULTS: [Column; 5] = [
        Column::Name,
        Column::Version,
        Column::Build,
        Column::Python,
        Column::Arch,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Version => "version",
            Column::Build => "build",
            Column::Python => "python",
            Column::Abi => "abi",
            Column::Platform => "platform",
            Column::Arch => "arch",
        }
    }

    pub fn value(&self, record: &ArtifactRecord) -> String {
        match self {
            Column::Name => record.distribution.clone(),
            Column::Version => record.version.to_string(),
            Column::Build => record
                .build_tag
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            Column::Python => record
                .interpreter_tags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(","),
            Column::Abi => record.abi_tag.clone(),
            Column::Platform => record.platform_tag.clone(),
            Column::Arch => record.arch.to_string(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain-text table
    #[default]
    Simple,
    /// MediaWiki table markup
    Mediawiki,
    /// One wheel path per line
    Raw,
    /// JSON array of objects keyed by column
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub columns: Vec<Column>,
    pub format: OutputFormat,
    /// One row per package, each cell listing the distinct values
    pub condense: bool,
    /// Only report the queries that matched nothing
    pub not_available_only: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            columns: Column::DEFAULTS.to_vec(),
            format: OutputFormat::default(),
            condense: false,
            not_available_only: false,
        }
    }
}

/// Table cells, one row per record followed by the not-available queries
pub fn rows(result: &ResultSet, options: &ReportOptions) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    if !options.not_available_only {
        let records = result
            .records
            .iter()
            .map(|record| (record.name.as_str(), cells(record, &options.columns)));
        if options.condense {
            rows.extend(condense(records));
        } else {
            rows.extend(records.map(|(_, row)| row));
        }
    }

    rows.extend(result.not_available().map(|(_, outcome)| {
        options
            .columns
            .iter()
            .map(|column| match column {
                Column::Name => outcome.pattern.clone(),
                _ => String::new(),
            })
            .collect()
    }));

    rows
}

fn cells(record: &ArtifactRecord, columns: &[Column]) -> Vec<String> {
    columns.iter().map(|column| column.value(record)).collect()
}

/// Merge the rows of each package into one, keeping distinct values in row order
fn condense<'a>(rows: impl Iterator<Item = (&'a str, Vec<String>)>) -> Vec<Vec<String>> {
    let mut packages: IndexMap<&str, Vec<Vec<String>>> = IndexMap::new();
    for (name, row) in rows {
        let columns = packages
            .entry(name)
            .or_insert_with(|| vec![Vec::new(); row.len()]);
        for (values, cell) in columns.iter_mut().zip(row) {
            if !values.contains(&cell) {
                values.push(cell);
            }
        }
    }

    packages
        .into_values()
        .map(|columns| columns.into_iter().map(|values| values.join(", ")).collect())
        .collect()
}

/// Render the result in the requested format
pub fn render(result: &ResultSet, options: &ReportOptions) -> Result<String, serde_json::Error> {
    let output = match options.format {
        OutputFormat::Simple => table::simple(&options.columns, &rows(result, options)),
        OutputFormat::Mediawiki => table::mediawiki(&options.columns, &rows(result, options)),
        OutputFormat::Raw => raw(result, options),
        OutputFormat::Json => json(result, options)?,
    };
    Ok(output)
}

fn raw(result: &ResultSet, options: &ReportOptions) -> String {
    if options.not_available_only {
        return result
            .not_available()
            .map(|(_, outcome)| format!("{}\n", outcome.pattern))
            .collect();
    }
    result
        .records
        .iter()
        .map(|record| format!("{record}\n"))
        .collect()
}

fn json(result: &ResultSet, options: &ReportOptions) -> Result<String, serde_json::Error> {
    let objects: Vec<IndexMap<&str, String>> = rows(result, options)
        .into_iter()
        .map(|row| {
            options
                .columns
                .iter()
                .map(Column::header)
                .zip(row)
                .collect()
        })
        .collect();
    serde_json::to_string_pretty(&objects).map(|mut output| {
        output.push('\n');
        output
    })
}
