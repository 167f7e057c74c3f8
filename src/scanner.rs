//! Wheelhouse scanning
//!
//! Lists `.whl` files from the search paths and parses them into the corpus.
//! A malformed filename is collected as a failure and never aborts the scan.

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::parser::{
    Arch, ArtifactRecord, ParseError, Parser, WHEEL_EXTENSION, WheelFilenameParser,
};
use crate::query::Selection;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No readable search path among: {}", display_paths(.0))]
    NoReadablePath(Vec<PathBuf>),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A wheel file found in a search path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelEntry {
    pub path: PathBuf,
    pub filename: String,
    /// Name of the directory holding the file (`avx2`, `generic`, ...)
    pub directory: Option<String>,
}

impl WheelEntry {
    pub fn new(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());
        Self {
            path,
            filename,
            directory,
        }
    }
}

/// Source of wheel files
#[cfg_attr(test, automock)]
pub trait WheelSource {
    /// List every wheel file, in a stable order
    fn list_wheels(&self) -> Result<Vec<WheelEntry>, ScanError>;
}

/// Lists the wheels directly inside each search path
pub struct DirectoryWheelSource {
    search_paths: Vec<PathBuf>,
}

impl DirectoryWheelSource {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn list_directory(path: &Path) -> Result<Vec<WheelEntry>, ScanError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ScanError::Io {
                path: path.to_path_buf(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(WHEEL_EXTENSION) {
                entries.push(WheelEntry::new(entry.into_path()));
            }
        }
        Ok(entries)
    }
}

impl WheelSource for DirectoryWheelSource {
    fn list_wheels(&self) -> Result<Vec<WheelEntry>, ScanError> {
        let mut wheels = Vec::new();
        let mut readable = 0;

        for path in &self.search_paths {
            let Ok(entries) = Self::list_directory(path)
                .inspect_err(|e| warn!("Skipping search path: {}", e))
            else {
                continue;
            };
            debug!("Found {} wheels in {}", entries.len(), path.display());
            readable += 1;
            wheels.extend(entries);
        }

        if readable == 0 && !self.search_paths.is_empty() {
            return Err(ScanError::NoReadablePath(self.search_paths.clone()));
        }

        Ok(wheels)
    }
}

/// Parsed wheels plus the filenames that could not be parsed
#[derive(Debug, Default)]
pub struct Corpus {
    pub records: Vec<ArtifactRecord>,
    pub failures: Vec<ParseError>,
}

/// List and parse every wheel of a source
pub fn build_corpus(source: &dyn WheelSource) -> Result<Corpus, ScanError> {
    let parser = WheelFilenameParser::new();
    let mut corpus = Corpus::default();

    for entry in source.list_wheels()? {
        match parser.parse(&entry.filename) {
            Ok(record) => corpus
                .records
                .push(record.located_at(entry.path, entry.directory.as_deref())),
            Err(e) => {
                warn!("Skipping {}: {}", entry.path.display(), e);
                corpus.failures.push(e);
            }
        }
    }

    debug!(
        "Corpus has {} wheels, {} unparsable",
        corpus.records.len(),
        corpus.failures.len()
    );
    Ok(corpus)
}

/// Every leaf directory under the wheelhouse, sorted
pub fn default_search_paths(wheelhouse: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut leaves = Vec::new();
    let mut walker = WalkDir::new(wheelhouse).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| ScanError::Io {
            path: wheelhouse.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let has_subdirectory = std::fs::read_dir(entry.path())
            .map_err(|source| ScanError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?
            .filter_map(Result::ok)
            .any(|child| child.file_type().is_ok_and(|kind| kind.is_dir()));
        if !has_subdirectory {
            leaves.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    Ok(leaves)
}

/// Drop the architecture directories that were not requested.
///
/// `generic` directories and directories not named after an architecture are always kept.
pub fn filter_search_paths(paths: Vec<PathBuf>, archs: &Selection<Arch>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| Arch::known(&name.to_string_lossy()))
                .is_none_or(|arch| arch.is_generic() || archs.allows(&arch))
        })
        .collect()
}
