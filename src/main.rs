use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use avail_wheels::config::{AVAILABLE_ARCHITECTURES, LOG_ENV, RuntimeEnvironment, log_path};
use avail_wheels::parser::{Arch, requirement_lines};
use avail_wheels::query::{
    EnvironmentContext, PythonVersion, QuerySet, ResolveOptions, Selection, VersionMode, resolve,
};
use avail_wheels::report::{Column, OutputFormat, ReportOptions, render};
use avail_wheels::scanner::{DirectoryWheelSource, build_corpus, filter_search_paths};
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "avail-wheels")]
#[command(
    about = "List the wheels available in the wheelhouse",
    long_about = "List the wheels available in the wheelhouse.\n\n\
        By default only the latest version of each wheel compatible with the \
        current python and architecture is shown.",
    disable_version_flag = true
)]
struct Cli {
    /// Names to look for (case insensitive, `*` wildcards allowed)
    wheel: Vec<String>,

    /// Names to look for (case insensitive, `*` wildcards allowed)
    #[arg(short, long, num_args = 1..)]
    name: Vec<String>,

    /// Requirements files to read the queries from
    #[arg(short, long, num_args = 1..)]
    requirement: Vec<PathBuf>,

    /// Versions to look for (`1.15*`, `<1.23`, `>=1.0,<2.0`, ...)
    #[arg(short, long, num_args = 1.., conflicts_with = "all_versions")]
    version: Vec<String>,

    /// Show every version of each wheel
    #[arg(long, visible_alias = "all_versions")]
    all_versions: bool,

    /// Python versions to look for
    #[arg(short, long, num_args = 1.., conflicts_with = "all_pythons")]
    python: Vec<PythonVersion>,

    /// Show wheels for every python
    #[arg(long, visible_alias = "all_pythons")]
    all_pythons: bool,

    /// Architectures to look for
    #[arg(
        short,
        long,
        num_args = 1..,
        ignore_case = true,
        value_parser = AVAILABLE_ARCHITECTURES,
        conflicts_with = "all_archs"
    )]
    arch: Vec<String>,

    /// Show wheels for every architecture
    #[arg(long, visible_alias = "all_archs")]
    all_archs: bool,

    /// Print the wheel paths only
    #[arg(long, conflicts_with_all = ["mediawiki", "json", "column", "condense"])]
    raw: bool,

    /// Print a MediaWiki table
    #[arg(long, conflicts_with = "json")]
    mediawiki: bool,

    /// Print a JSON array
    #[arg(long)]
    json: bool,

    /// Columns to display, in order
    #[arg(long, value_enum, num_args = 1..)]
    column: Vec<Column>,

    /// One row per wheel name listing every value
    #[arg(long)]
    condense: bool,

    /// Only show the queries that matched nothing
    #[arg(long)]
    not_available: bool,

    /// Write logs to the data directory instead of stderr
    #[arg(long)]
    log_file: bool,
}

impl Cli {
    fn output_format(&self) -> OutputFormat {
        if self.raw {
            OutputFormat::Raw
        } else if self.mediawiki {
            OutputFormat::Mediawiki
        } else if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Simple
        }
    }

    fn pythons(&self) -> Option<Selection<PythonVersion>> {
        if self.all_pythons {
            Some(Selection::All)
        } else if self.python.is_empty() {
            None
        } else {
            Some(Selection::Explicit(self.python.clone()))
        }
    }

    fn archs(&self) -> Option<Selection<Arch>> {
        if self.all_archs {
            Some(Selection::All)
        } else if self.arch.is_empty() {
            None
        } else {
            Some(Selection::Explicit(
                self.arch.iter().map(|arch| Arch::new(arch)).collect(),
            ))
        }
    }

    fn queries(&self) -> anyhow::Result<QuerySet> {
        let mut names: Vec<String> = self.wheel.iter().chain(&self.name).cloned().collect();
        if names.is_empty() && !self.version.is_empty() {
            names.push("*".to_string());
        }

        let mut queries = QuerySet::from_cli(&names, &self.version);
        for path in &self.requirement {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read requirements file {}", path.display()))?;
            queries.extend(QuerySet::from_requirements(requirement_lines(&content)));
        }
        Ok(queries)
    }
}

fn init_logging(log_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV)
        .from_env()?;

    if !log_file {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .without_time()
            .finish()
            .try_init()?;
        return Ok(None);
    }

    let path = log_path();
    let directory = path.parent().context("Log path has no parent directory")?;
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create {}", directory.display()))?;
    let file_name = path.file_name().context("Log path has no file name")?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish()
        .try_init()?;
    Ok(Some(guard))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file)?;

    let runtime = RuntimeEnvironment::from_env();
    debug!("Runtime environment: {:?}", runtime);

    let context = EnvironmentContext::discover(&runtime, cli.pythons(), cli.archs());
    let queries = cli.queries()?;

    let search_paths = filter_search_paths(runtime.search_paths()?, &context.archs);
    info!("Scanning {} search paths", search_paths.len());
    let corpus = build_corpus(&DirectoryWheelSource::new(search_paths))?;

    let options = ResolveOptions {
        versions: if cli.all_versions {
            VersionMode::All
        } else {
            VersionMode::Latest
        },
    };
    let result = resolve(&corpus.records, &queries, &context, options);

    let report = ReportOptions {
        columns: if cli.column.is_empty() {
            Column::DEFAULTS.to_vec()
        } else {
            cli.column.clone()
        },
        format: cli.output_format(),
        condense: cli.condense,
        not_available_only: cli.not_available,
    };
    print!("{}", render(&result, &report)?);

    Ok(())
}
