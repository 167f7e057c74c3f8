//! Environment context: which interpreters and architectures a query is for

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::RuntimeEnvironment;
use crate::parser::Arch;

/// A value of interest: detected from the environment, chosen by the user, or unrestricted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    Detected(T),
    Explicit(Vec<T>),
    All,
}

impl<T: PartialEq> Selection<T> {
    pub fn allows(&self, value: &T) -> bool {
        match self {
            Selection::Detected(detected) => detected == value,
            Selection::Explicit(values) => values.contains(value),
            Selection::All => true,
        }
    }

    pub fn values(&self) -> &[T] {
        match self {
            Selection::Detected(detected) => std::slice::from_ref(detected),
            Selection::Explicit(values) => values,
            Selection::All => &[],
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid python version '{0}': expected MAJOR.MINOR")]
pub struct PythonVersionError(String);

/// An interpreter version reduced to `major.minor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u64,
    pub minor: u64,
}

impl PythonVersion {
    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }

    /// Interpreter tags a wheel may carry to run on this version: `py3`, `py39`, `cp39`
    pub fn compatible_tags(&self) -> [String; 3] {
        [
            format!("py{}", self.major),
            format!("py{}{}", self.major, self.minor),
            format!("cp{}{}", self.major, self.minor),
        ]
    }
}

impl FromStr for PythonVersion {
    type Err = PythonVersionError;

    /// Accepts `3.9` as well as a full `3.9.10`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PythonVersionError(s.to_string());
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(invalid)?;
        Ok(Self { major, minor })
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Interpreters and architectures of interest, fixed for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentContext {
    pub pythons: Selection<PythonVersion>,
    pub archs: Selection<Arch>,
}

impl EnvironmentContext {
    pub fn new(pythons: Selection<PythonVersion>, archs: Selection<Arch>) -> Self {
        Self { pythons, archs }
    }

    /// Every interpreter and every architecture
    pub fn unrestricted() -> Self {
        Self::new(Selection::All, Selection::All)
    }

    /// Build the context from the runtime environment and the user's choices.
    ///
    /// Pythons: user choice, else the current python, else the available pythons,
    /// else all. Architectures: user choice, else `RSNT_ARCH`, else all.
    pub fn discover(
        runtime: &RuntimeEnvironment,
        pythons: Option<Selection<PythonVersion>>,
        archs: Option<Selection<Arch>>,
    ) -> Self {
        let pythons = pythons.unwrap_or_else(|| {
            if let Some(current) = runtime
                .current_python
                .as_deref()
                .and_then(|python| python.parse().ok())
            {
                return Selection::Detected(current);
            }
            let available: Vec<PythonVersion> = runtime
                .available_pythons()
                .iter()
                .filter_map(|python| python.parse().ok())
                .collect();
            if available.is_empty() {
                Selection::All
            } else {
                Selection::Explicit(available)
            }
        });

        let archs = archs.unwrap_or_else(|| {
            runtime
                .current_architecture
                .as_deref()
                .map(|arch| Selection::Detected(Arch::new(arch)))
                .unwrap_or(Selection::All)
        });

        Self { pythons, archs }
    }
}

/// How many versions per package a result keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionMode {
    /// Only the highest version of each package
    #[default]
    Latest,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    pub versions: VersionMode,
}
