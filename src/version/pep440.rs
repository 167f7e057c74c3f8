//! Wheel version grammar and ordering
//!
//! Grammar: `release[.release]*[{a|b|rc}N][.postN][.devN][+local]`
//!
//! For equal release tuples the order is `dev < pre-release < final < post-release`,
//! and missing release segments compare as zero (`1.21 == 1.21.0`).
//! Versions with different local labels are never equal and have no order.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::version::error::VersionParseError;

static RELEASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*").expect("valid release regex"));

static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<pre_l>a|b|rc)(?P<pre_n>\d+))?(?:\.post(?P<post>\d+))?(?:\.dev(?P<dev>\d+))?$")
        .expect("valid suffix regex")
});

static LOCAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+(?:[._][A-Za-z0-9]+)*$").expect("valid local regex"));

/// Pre-release marker, ordered `a < b < rc` and then by number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha(u64),
    Beta(u64),
    Rc(u64),
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Alpha(n) => write!(f, "a{n}"),
            PreRelease::Beta(n) => write!(f, "b{n}"),
            PreRelease::Rc(n) => write!(f, "rc{n}"),
        }
    }
}

/// Where a version sits relative to its release tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    /// `1.0.dev1`: development release of the final version, before any pre-release
    DevOfFinal,
    Pre(PreRelease),
    Final,
}

/// A `.devN` marker sorts before the same version without one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DevMarker {
    Dev(u64),
    Absent,
}

/// A parsed wheel version
#[derive(Debug, Clone)]
pub struct Version {
    release: Vec<u64>,
    pre: Option<PreRelease>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

impl Version {
    /// Build a final release version from its segments
    pub fn from_release(release: impl Into<Vec<u64>>) -> Self {
        Self {
            release: release.into(),
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn pre(&self) -> Option<PreRelease> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    /// Local version label (the part after `+`)
    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// True when the version only carries release segments
    pub fn is_plain_release(&self) -> bool {
        self.pre.is_none() && self.post.is_none() && self.dev.is_none() && self.local.is_none()
    }

    /// Compare the public part of two versions, ignoring local labels.
    pub fn cmp_public(&self, other: &Self) -> Ordering {
        compare_release(&self.release, &other.release)
            .then_with(|| self.stage().cmp(&other.stage()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_marker().cmp(&other.dev_marker()))
    }

    /// Total order used for listings: public order first, then local labels lexically.
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        self.cmp_public(other)
            .then_with(|| self.local.cmp(&other.local))
    }

    /// True when the release tuple starts with `prefix`, zero-padding the release.
    pub fn has_release_prefix(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, segment)| self.release.get(i).copied().unwrap_or(0) == *segment)
    }

    fn stage(&self) -> Stage {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => Stage::DevOfFinal,
            (Some(pre), _, _) => Stage::Pre(pre),
            (None, _, _) => Stage::Final,
        }
    }

    fn dev_marker(&self) -> DevMarker {
        self.dev.map_or(DevMarker::Absent, DevMarker::Dev)
    }

    /// Release segments with trailing zeros removed, so `1.0` and `1` hash alike
    fn trimmed_release(&self) -> &[u64] {
        let len = self
            .release
            .iter()
            .rposition(|segment| *segment != 0)
            .map_or(0, |i| i + 1);
        &self.release[..len]
    }
}

fn compare_release(left: &[u64], right: &[u64]) -> Ordering {
    let len = left.len().max(right.len());
    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or(0);
            let r = right.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local && self.cmp_public(other).is_eq()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.trimmed_release().hash(state);
        self.pre.hash(state);
        self.post.hash(state);
        self.dev.hash(state);
        self.local.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.local != other.local {
            return None;
        }
        Some(self.cmp_public(other))
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = s.trim();
        if version.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let (public, local) = match version.split_once('+') {
            Some((public, label)) => {
                if !LOCAL_RE.is_match(label) {
                    return Err(VersionParseError::InvalidLocal {
                        version: version.to_string(),
                        label: label.to_string(),
                    });
                }
                (public, Some(label.to_string()))
            }
            None => (version, None),
        };

        let Some(release_match) = RELEASE_RE.find(public) else {
            return Err(VersionParseError::InvalidRelease {
                version: version.to_string(),
                segment: public.split('.').next().unwrap_or_default().to_string(),
            });
        };

        let release = release_match
            .as_str()
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| VersionParseError::InvalidRelease {
                        version: version.to_string(),
                        segment: segment.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let suffix = &public[release_match.end()..];
        let Some(captures) = SUFFIX_RE.captures(suffix) else {
            // `1.x` is a broken release segment rather than an unknown modifier
            if let Some(segment) = suffix.strip_prefix('.')
                && !segment.starts_with("post")
                && !segment.starts_with("dev")
            {
                return Err(VersionParseError::InvalidRelease {
                    version: version.to_string(),
                    segment: segment.split('.').next().unwrap_or_default().to_string(),
                });
            }
            return Err(VersionParseError::InvalidSuffix {
                version: version.to_string(),
                suffix: suffix.to_string(),
            });
        };

        let number = |name: &str| -> Result<Option<u64>, VersionParseError> {
            captures
                .name(name)
                .map(|m| {
                    m.as_str()
                        .parse::<u64>()
                        .map_err(|_| VersionParseError::InvalidSuffix {
                            version: version.to_string(),
                            suffix: suffix.to_string(),
                        })
                })
                .transpose()
        };

        let pre = match (captures.name("pre_l").map(|m| m.as_str()), number("pre_n")?) {
            (Some("a"), Some(n)) => Some(PreRelease::Alpha(n)),
            (Some("b"), Some(n)) => Some(PreRelease::Beta(n)),
            (Some("rc"), Some(n)) => Some(PreRelease::Rc(n)),
            _ => None,
        };

        Ok(Version {
            release,
            pre,
            post: number("post")?,
            dev: number("dev")?,
            local,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release = self
            .release
            .iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{release}")?;
        if let Some(pre) = self.pre {
            write!(f, "{pre}")?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        if let Some(local) = &self.local {
            write!(f, "+{local}")?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
