//! Wheel filename parser
//!
//! Decomposes `{distribution}-{version}(-{build tag})?-{python tag}-{abi tag}-{platform tag}.whl`
//! into an [`ArtifactRecord`].
//!
//! Format examples:
//! - `netCDF4-1.3.1-cp36-cp36m-linux_x86_64.whl`
//! - `pydicom-1.1.0-1-py2.py3-none-any.whl` (build tag `1`)
//! - `shiboken2-5.15.0-5.15.0-cp35.cp36.cp37.cp38-abi3-linux_x86_64.whl` (compressed python tags)
//! - `numpy-1.23.0-cp39-cp39-linux_x86_64_avx2.whl` (architecture hint in the platform tag)

use std::collections::BTreeSet;
use std::str::FromStr;

use regex::Regex;

use crate::parser::traits::{ParseError, Parser};
use crate::parser::types::{Arch, ArtifactRecord, BuildTag, PackageName};
use crate::version::Version;

/// Only binary wheels are inventoried
pub const WHEEL_EXTENSION: &str = ".whl";

/// Parser for wheel filenames
pub struct WheelFilenameParser {
    /// Distribution name: alphanumerics, `.` and `_`, starting and ending alphanumeric
    name_re: Regex,
    /// A single python, abi or platform tag
    tag_re: Regex,
}

impl WheelFilenameParser {
    pub fn new() -> Self {
        Self {
            name_re: Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._]*[A-Za-z0-9])?$").unwrap(),
            tag_re: Regex::new(r"^[A-Za-z0-9_]+$").unwrap(),
        }
    }

    fn parse_tags(
        &self,
        filename: &str,
        kind: &'static str,
        field: &str,
    ) -> Result<Vec<String>, ParseError> {
        field
            .split('.')
            .map(|tag| {
                if self.tag_re.is_match(tag) {
                    Ok(tag.to_string())
                } else {
                    Err(ParseError::InvalidTag {
                        filename: filename.to_string(),
                        kind,
                        tag: field.to_string(),
                    })
                }
            })
            .collect()
    }
}

impl Default for WheelFilenameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for WheelFilenameParser {
    type Output = ArtifactRecord;
    type Error = ParseError;

    fn parse(&self, filename: &str) -> Result<ArtifactRecord, ParseError> {
        let Some(stem) = filename.strip_suffix(WHEEL_EXTENSION) else {
            return Err(ParseError::UnsupportedExtension(filename.to_string()));
        };

        let fields: Vec<&str> = stem.split('-').collect();
        let (distribution, version, build, python, abi, platform) = match fields.as_slice() {
            [name, version, python, abi, platform] => (*name, *version, None, *python, *abi, *platform),
            [name, version, build, python, abi, platform] => {
                (*name, *version, Some(*build), *python, *abi, *platform)
            }
            _ => {
                return Err(ParseError::WrongFieldCount {
                    filename: filename.to_string(),
                    found: fields.len(),
                });
            }
        };

        if !self.name_re.is_match(distribution) {
            return Err(ParseError::InvalidName(distribution.to_string()));
        }

        let version = Version::from_str(version).map_err(|source| ParseError::InvalidVersion {
            filename: filename.to_string(),
            source,
        })?;

        let build_tag = build.map(BuildTag::from_str).transpose()?;

        let interpreter_tags: BTreeSet<String> = self
            .parse_tags(filename, "python", python)?
            .into_iter()
            .map(|tag| tag.to_ascii_lowercase())
            .collect();

        // abi is a single tag; platform may be a compressed set
        if !self.tag_re.is_match(abi) {
            return Err(ParseError::InvalidTag {
                filename: filename.to_string(),
                kind: "abi",
                tag: abi.to_string(),
            });
        }
        self.parse_tags(filename, "platform", platform)?;

        Ok(ArtifactRecord {
            name: PackageName::new(distribution),
            distribution: distribution.to_string(),
            version,
            build_tag,
            interpreter_tags,
            abi_tag: abi.to_ascii_lowercase(),
            platform_tag: platform.to_ascii_lowercase(),
            arch: Arch::from_platform_tag(platform).unwrap_or_else(Arch::generic),
            raw_filename: filename.to_string(),
            path: None,
        })
    }
}

impl FromStr for ArtifactRecord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WheelFilenameParser::new().parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tags(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[rstest]
    #[case(
        "netCDF4-1.3.1-cp36-cp36m-linux_x86_64.whl",
        "netcdf4", "netCDF4", "1.3.1", None, &["cp36"], "cp36m", "linux_x86_64", "generic"
    )]
    #[case(
        "tensorflow_cpu-1.6.0+computecanada-cp36-cp36m-linux_x86_64.whl",
        "tensorflow_cpu", "tensorflow_cpu", "1.6.0+computecanada", None, &["cp36"], "cp36m", "linux_x86_64", "generic"
    )]
    #[case(
        "backports.functools_lru_cache-1.4-py2.py3-none-any.whl",
        "backports_functools_lru_cache", "backports.functools_lru_cache", "1.4", None, &["py2", "py3"], "none", "any", "generic"
    )]
    #[case(
        "Shapely-1.6.2.post1-cp35-cp35m-linux_x86_64.whl",
        "shapely", "Shapely", "1.6.2.post1", None, &["cp35"], "cp35m", "linux_x86_64", "generic"
    )]
    #[case(
        "shiboken2-5.15.0-5.15.0-cp35.cp36.cp37.cp38-abi3-linux_x86_64.whl",
        "shiboken2", "shiboken2", "5.15.0", Some("5.15.0"), &["cp35", "cp36", "cp37", "cp38"], "abi3", "linux_x86_64", "generic"
    )]
    #[case(
        "pydicom-1.1.0-1-py2.py3-none-any.whl",
        "pydicom", "pydicom", "1.1.0", Some("1"), &["py2", "py3"], "none", "any", "generic"
    )]
    #[case(
        "numpy-1.23.0-cp39-cp39-linux_x86_64_avx2.whl",
        "numpy", "numpy", "1.23.0", None, &["cp39"], "cp39", "linux_x86_64_avx2", "avx2"
    )]
    #[allow(clippy::too_many_arguments)]
    fn parse_extracts_all_fields(
        #[case] filename: &str,
        #[case] name: &str,
        #[case] distribution: &str,
        #[case] version: &str,
        #[case] build: Option<&str>,
        #[case] python: &[&str],
        #[case] abi: &str,
        #[case] platform: &str,
        #[case] arch: &str,
    ) {
        let record = WheelFilenameParser::new().parse(filename).unwrap();

        assert_eq!(record.name.as_str(), name);
        assert_eq!(record.distribution, distribution);
        assert_eq!(record.version.to_string(), version);
        assert_eq!(record.build_tag.map(|b| b.to_string()).as_deref(), build);
        assert_eq!(record.interpreter_tags, tags(python));
        assert_eq!(record.abi_tag, abi);
        assert_eq!(record.platform_tag, platform);
        assert_eq!(record.arch.as_str(), arch);
        assert_eq!(record.raw_filename, filename);
    }

    #[test]
    fn parse_exposes_local_version_label() {
        let record: ArtifactRecord = "torch_cpu-0.2.0+d8f3c60-cp27-cp27mu-linux_x86_64.whl"
            .parse()
            .unwrap();
        assert_eq!(record.local_version(), Some("d8f3c60"));
        assert_eq!(record.build_tag, None);
    }

    #[test]
    fn names_differing_by_case_and_separator_parse_to_same_name() {
        let a: ArtifactRecord = "Torch_CPU-1.0-py3-none-any.whl".parse().unwrap();
        let b: ArtifactRecord = "torch.cpu-1.0-py3-none-any.whl".parse().unwrap();
        assert_eq!(a.name, b.name);
    }

    #[rstest]
    #[case("netCDF4-1.3.1.cp36-cp36m-linux_x86_64.whl")]
    #[case("netCDF4-1.3.1-cp36cp36m-linux_x86_64.whl")]
    #[case("netCDF4-1-2-3-4-5-6-7.whl")]
    fn parse_rejects_wrong_field_count(#[case] filename: &str) {
        assert!(matches!(
            WheelFilenameParser::new().parse(filename),
            Err(ParseError::WrongFieldCount { .. })
        ));
    }

    #[test]
    fn parse_rejects_missing_name() {
        // Without a name the version is read as the name and the fields fall short
        let result = WheelFilenameParser::new().parse("1.3.1-cp36-cp36m-linux_x86_64.whl");
        assert!(matches!(result, Err(ParseError::WrongFieldCount { found: 4, .. })));
    }

    #[rstest]
    #[case("numpy-1.x.0-cp39-cp39-linux_x86_64.whl")]
    #[case("numpy-latest-cp39-cp39-linux_x86_64.whl")]
    fn parse_rejects_non_numeric_release(#[case] filename: &str) {
        assert!(matches!(
            WheelFilenameParser::new().parse(filename),
            Err(ParseError::InvalidVersion { .. })
        ));
    }

    #[rstest]
    #[case("numpy-1.23.0.tar.gz")]
    #[case("numpy-1.23.0-cp39-cp39-linux_x86_64.zip")]
    #[case("numpy-1.23.0-cp39-cp39-linux_x86_64.WHL")]
    fn parse_rejects_unknown_extension(#[case] filename: &str) {
        assert!(matches!(
            WheelFilenameParser::new().parse(filename),
            Err(ParseError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn parse_rejects_build_tag_without_leading_digit() {
        let result =
            WheelFilenameParser::new().parse("torch_cpu-0.2.0-d8f3c60-cp27-cp27mu-linux_x86_64.whl");
        assert_eq!(result, Err(ParseError::InvalidBuildTag("d8f3c60".to_string())));
    }

    #[rstest]
    #[case("nu!mpy-1.0-py3-none-any.whl")]
    #[case("_numpy-1.0-py3-none-any.whl")]
    fn parse_rejects_invalid_name(#[case] filename: &str) {
        assert!(matches!(
            WheelFilenameParser::new().parse(filename),
            Err(ParseError::InvalidName(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_python_tag() {
        let result = WheelFilenameParser::new().parse("numpy-1.0-py3..py2-none-any.whl");
        assert!(matches!(result, Err(ParseError::InvalidTag { kind: "python", .. })));
    }

    #[test]
    fn parse_lower_cases_every_tag() {
        let record: ArtifactRecord = "numpy-1.0-CP39-CP39-LINUX_X86_64_AVX2.whl".parse().unwrap();

        assert_eq!(record.interpreter_tags, tags(&["cp39"]));
        assert_eq!(record.abi_tag, "cp39");
        assert_eq!(record.platform_tag, "linux_x86_64_avx2");
        assert_eq!(record.arch.as_str(), "avx2");
    }

    #[rstest]
    #[case("six-1.16.0-py3.py2-none-any.whl", "six-1.16.0-py2.py3-none-any.whl")]
    #[case("numpy-1.0-CP39-cp39-linux_x86_64.whl", "numpy-1.0-cp39-cp39-linux_x86_64.whl")]
    #[case("numpy-1.0-cp39-Cp39-Linux_X86_64.whl", "numpy-1.0-cp39-cp39-linux_x86_64.whl")]
    fn to_filename_of_non_canonical_name_reparses_equal(
        #[case] filename: &str,
        #[case] canonical: &str,
    ) {
        let record: ArtifactRecord = filename.parse().unwrap();
        let recombined = record.to_filename();
        let reparsed: ArtifactRecord = recombined.parse().unwrap();

        assert_eq!(recombined, canonical);
        assert_eq!(reparsed, record);
    }

    #[rstest]
    #[case("pydicom-1.1.0-1-py2.py3-none-any.whl")]
    #[case("shiboken2-5.15.0-5.15.0-cp35.cp36.cp37.cp38-abi3-linux_x86_64.whl")]
    #[case("numpy-1.23.0rc1.post2.dev3+cc-cp39-cp39-linux_x86_64_avx2.whl")]
    fn to_filename_recombines_fields(#[case] filename: &str) {
        let record: ArtifactRecord = filename.parse().unwrap();
        assert_eq!(record.to_filename(), filename);
    }

    #[rstest]
    #[case("scipy-1.1.0-cp36-cp36m-linux_x86_64.whl", Some("avx2"), "avx2")]
    #[case("scipy-1.1.0-cp36-cp36m-linux_x86_64.whl", Some("wheels"), "generic")]
    #[case("scipy-1.1.0-cp36-cp36m-linux_x86_64.whl", None, "generic")]
    #[case("scipy-1.1.0-cp36-cp36m-linux_x86_64_avx512.whl", Some("avx2"), "avx512")]
    fn located_at_prefers_platform_hint_over_directory(
        #[case] filename: &str,
        #[case] directory: Option<&str>,
        #[case] expected: &str,
    ) {
        let record: ArtifactRecord = filename.parse().unwrap();
        let record = record.located_at(format!("/wh/{filename}").into(), directory);
        assert_eq!(record.arch.as_str(), expected);
        assert!(record.path.is_some());
    }
}
