use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::scanner::{ScanError, default_search_paths};

// =============================================================================
// Environment defaults
// =============================================================================

/// Wheelhouse used when `WHEELHOUSE` is not set
pub const DEFAULT_WHEELHOUSE: &str = "/cvmfs/soft.computecanada.ca/custom/python/wheelhouse";

/// Python installation directories used when `PYTHON_DIRS` is not set
pub const DEFAULT_PYTHON_DIRS: &str =
    "/cvmfs/soft.computecanada.ca/easybuild/software/20*/Core/python";

/// Instruction sets wheels are built for
pub const AVAILABLE_ARCHITECTURES: [&str; 5] = ["avx", "avx2", "avx512", "generic", "sse3"];

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "AVAIL_WHEELS_LOG";

/// pip configuration sections searched for `find-links`, in order
const PIP_SECTIONS: [&str; 3] = ["wheel", "install", "global"];

/// Snapshot of the environment variables that drive wheel discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEnvironment {
    pub wheelhouse: PathBuf,
    pub pip_config_file: Option<PathBuf>,
    /// Current interpreter as `major.minor`
    pub current_python: Option<String>,
    /// `:`-separated glob patterns of python installation directories
    pub python_dirs: String,
    pub current_architecture: Option<String>,
}

impl RuntimeEnvironment {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup; empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        // An active virtual environment wins over a loaded python module
        let current_python = var("VIRTUAL_ENV")
            .and_then(|venv| venv_python(Path::new(&venv)))
            .or_else(|| var("EBVERSIONPYTHON"))
            .map(|python| major_minor(&python));

        Self {
            wheelhouse: var("WHEELHOUSE")
                .unwrap_or_else(|| DEFAULT_WHEELHOUSE.to_string())
                .into(),
            pip_config_file: var("PIP_CONFIG_FILE").map(PathBuf::from),
            current_python,
            python_dirs: var("PYTHON_DIRS").unwrap_or_else(|| DEFAULT_PYTHON_DIRS.to_string()),
            current_architecture: var("RSNT_ARCH"),
        }
    }

    /// Python versions installed under the python directories, as sorted `major.minor`
    pub fn available_pythons(&self) -> Vec<String> {
        let mut versions = BTreeSet::new();

        for pattern in self.python_dirs.split(':').filter(|p| !p.is_empty()) {
            let Ok(directories) = glob::glob(pattern) else {
                debug!("Invalid python directory pattern: {}", pattern);
                continue;
            };
            for directory in directories.filter_map(Result::ok) {
                let Ok(children) = fs::read_dir(&directory) else {
                    continue;
                };
                for child in children.filter_map(Result::ok) {
                    let name = child.file_name().to_string_lossy().into_owned();
                    let mut parts = name.split('.');
                    if let (Some(Ok(major)), Some(Ok(minor))) = (
                        parts.next().map(str::parse::<u64>),
                        parts.next().map(str::parse::<u64>),
                    ) {
                        versions.insert((major, minor));
                    }
                }
            }
        }

        versions
            .into_iter()
            .map(|(major, minor)| format!("{major}.{minor}"))
            .collect()
    }

    /// Directories to scan: the pip `find-links` when configured, else every
    /// leaf directory of the wheelhouse
    pub fn search_paths(&self) -> Result<Vec<PathBuf>, ScanError> {
        if let Some(config) = &self.pip_config_file {
            let content = fs::read_to_string(config).map_err(|source| ScanError::Io {
                path: config.clone(),
                source,
            })?;
            if let Some(links) = pip_find_links(&content) {
                debug!("Using find-links from {}", config.display());
                return Ok(links);
            }
        }
        default_search_paths(&self.wheelhouse)
    }
}

/// Python version recorded in a virtual environment's `pyvenv.cfg`
fn venv_python(venv: &Path) -> Option<String> {
    let content = fs::read_to_string(venv.join("pyvenv.cfg")).ok()?;
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        matches!(key.trim(), "version" | "version_info").then(|| value.trim().to_string())
    })
}

fn major_minor(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

/// Extract the whitespace-separated `find-links` of a pip configuration.
///
/// Indented lines continue the previous value.
pub fn pip_find_links(content: &str) -> Option<Vec<PathBuf>> {
    let mut section = String::new();
    let mut found: Vec<(String, String)> = Vec::new();
    let mut in_find_links = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(['#', ';']) {
            continue;
        }
        if in_find_links && line.starts_with([' ', '\t']) {
            if let Some((_, value)) = found.last_mut() {
                value.push(' ');
                value.push_str(trimmed);
            }
            continue;
        }
        in_find_links = false;

        if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            section = name.trim().to_string();
        } else if let Some((key, value)) = trimmed.split_once(['=', ':'])
            && matches!(key.trim(), "find-links" | "find_links")
        {
            found.push((section.clone(), value.trim().to_string()));
            in_find_links = true;
        }
    }

    PIP_SECTIONS.iter().find_map(|wanted| {
        found
            .iter()
            .find(|(section, _)| section == wanted)
            .map(|(_, value)| value.split_whitespace().map(PathBuf::from).collect())
    })
}

/// Returns the path to the data directory for avail-wheels.
/// Uses $XDG_DATA_HOME/avail-wheels if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/avail-wheels,
/// or ./avail-wheels if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("avail-wheels.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("avail-wheels")
}
