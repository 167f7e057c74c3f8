//! Common types for parsed wheels

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::config::AVAILABLE_ARCHITECTURES;
use crate::parser::traits::ParseError;
use crate::version::Version;

/// Normalized package name
///
/// Lower-cased, with every run of `-`, `_` and `.` collapsed into a single `_`,
/// so `Torch-CPU`, `torch_cpu` and `torch..cpu` are the same package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(name: &str) -> Self {
        Self(normalize_name(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case a name and collapse separator runs into `_`.
///
/// Glob characters are left untouched so patterns normalize the same way as names,
/// and a `[...]` class is only lower-cased so its ranges (`[m-o]`) survive.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;
    let mut in_class = false;
    for c in name.chars() {
        if in_class {
            normalized.extend(c.to_lowercase());
            in_class = c != ']';
        } else if c == '[' {
            normalized.push(c);
            in_class = true;
            in_separator = false;
        } else if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('_');
            }
            in_separator = true;
        } else {
            normalized.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    normalized
}

/// CPU micro-architecture a wheel was built for (`avx2`, `generic`, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Arch(String);

impl Arch {
    pub const GENERIC: &'static str = "generic";

    pub fn new(name: &str) -> Self {
        Self(name.to_ascii_lowercase())
    }

    pub fn generic() -> Self {
        Self(Self::GENERIC.to_string())
    }

    pub fn is_generic(&self) -> bool {
        self.0 == Self::GENERIC
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the architecture named by `hint` when it is a known one
    pub fn known(hint: &str) -> Option<Self> {
        let hint = hint.to_ascii_lowercase();
        AVAILABLE_ARCHITECTURES
            .contains(&hint.as_str())
            .then_some(Self(hint))
    }

    /// Extract the instruction-set hint embedded at the end of a platform tag.
    ///
    /// `linux_x86_64_avx2` -> `avx2`; `linux_x86_64` and `any` carry no hint.
    pub fn from_platform_tag(platform: &str) -> Option<Self> {
        platform.rsplit('_').next().and_then(Self::known)
    }
}

impl FromStr for Arch {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wheel build tag: a leading number and an optional free-form remainder
///
/// Ordered numerically first, then by the remainder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildTag {
    number: u64,
    suffix: String,
}

impl BuildTag {
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl FromStr for BuildTag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        if digits == 0 {
            return Err(ParseError::InvalidBuildTag(s.to_string()));
        }
        let number = s[..digits]
            .parse()
            .map_err(|_| ParseError::InvalidBuildTag(s.to_string()))?;
        Ok(BuildTag {
            number,
            suffix: s[digits..].to_string(),
        })
    }
}

impl fmt::Display for BuildTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.suffix)
    }
}

impl Serialize for BuildTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// One wheel file, decomposed from its filename
///
/// Two records are equal when their parsed fields and location are; the raw
/// filename is left out so `Py3.PY2` and `py2.py3` spellings compare equal.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactRecord {
    /// Normalized package name, used for matching and grouping
    pub name: PackageName,
    /// Package name as spelled in the filename (e.g. `netCDF4`)
    pub distribution: String,
    pub version: Version,
    pub build_tag: Option<BuildTag>,
    /// Every interpreter tag of the dot-joined python field (`py2.py3` -> {py2, py3})
    pub interpreter_tags: BTreeSet<String>,
    /// Lower-cased
    pub abi_tag: String,
    /// Lower-cased
    pub platform_tag: String,
    pub arch: Arch,
    pub raw_filename: String,
    /// Where the file was found, when it came from a directory scan
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl ArtifactRecord {
    /// Local version label (after `+`), if any
    pub fn local_version(&self) -> Option<&str> {
        self.version.local()
    }

    /// Interpreter tags joined the way they appear in a filename
    pub fn python_tag(&self) -> String {
        self.interpreter_tags
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Recombine the parsed fields into a wheel filename
    pub fn to_filename(&self) -> String {
        let build = self
            .build_tag
            .as_ref()
            .map(|tag| format!("-{tag}"))
            .unwrap_or_default();
        format!(
            "{}-{}{}-{}-{}-{}.whl",
            self.distribution,
            self.version,
            build,
            self.python_tag(),
            self.abi_tag,
            self.platform_tag
        )
    }

    /// Attach the location a scanned file came from.
    ///
    /// The directory name becomes the architecture unless the platform tag already names one.
    pub fn located_at(mut self, path: PathBuf, directory: Option<&str>) -> Self {
        if Arch::from_platform_tag(&self.platform_tag).is_none()
            && let Some(arch) = directory.and_then(Arch::known)
        {
            self.arch = arch;
        }
        self.path = Some(path);
        self
    }

    /// Order used for listings: name ascending, version descending, arch descending,
    /// python descending, then filename and location.
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| other.version.listing_cmp(&self.version))
            .then_with(|| other.arch.cmp(&self.arch))
            .then_with(|| other.python_tag().cmp(&self.python_tag()))
            .then_with(|| self.raw_filename.cmp(&other.raw_filename))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialEq for ArtifactRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.distribution == other.distribution
            && self.version == other.version
            && self.build_tag == other.build_tag
            && self.interpreter_tags == other.interpreter_tags
            && self.abi_tag == other.abi_tag
            && self.platform_tag == other.platform_tag
            && self.arch == other.arch
            && self.path == other.path
    }
}

impl Eq for ArtifactRecord {}

impl fmt::Display for ArtifactRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str(&self.raw_filename),
        }
    }
}
