//! Requirement line parser
//!
//! Reads `name[specifier]` lines where the name may carry `*` wildcards:
//! - `numpy`, `NumPy==1.0.*`, `numpy>=1.0,<2.0`
//! - `*numpy*`, `numpy-*`, `*numpy*==1.0.0`
//!
//! Trailing `# comments` and `; markers` are ignored.

use regex::Regex;

use crate::parser::traits::{Parser, RequirementError};
use crate::query::Query;

/// Parser for a single requirement line
pub struct RequirementParser {
    requirement_re: Regex,
}

impl RequirementParser {
    pub fn new() -> Self {
        Self {
            // A bare `*`, or a name with an optional leading `*`, an optional trailing `*`
            // and an optional separator-star suffix (`numpy*-*`), then an operator-led specifier
            requirement_re: Regex::new(
                r"^(?P<name>\*|\*?[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?\*?(?:[-_.]\*)?)\s*(?P<spec>(?:===|==|!=|<=|>=|~=|<|>).*)?$",
            )
            .unwrap(),
        }
    }
}

impl Default for RequirementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for RequirementParser {
    type Output = Query;
    type Error = RequirementError;

    fn parse(&self, line: &str) -> Result<Query, RequirementError> {
        let requirement = strip_annotations(line);

        let Some(captures) = self.requirement_re.captures(requirement) else {
            return Err(RequirementError::InvalidSyntax(line.trim().to_string()));
        };

        let name = &captures["name"];
        let specifier = captures.name("spec").map(|m| m.as_str());
        Query::new(name, specifier)
    }
}

/// Drop a trailing `# comment` and `; environment marker`
fn strip_annotations(line: &str) -> &str {
    let line = line.split_once('#').map_or(line, |(head, _)| head);
    let line = line.split_once(';').map_or(line, |(head, _)| head);
    line.trim()
}

/// Lines of a requirements file that carry a requirement.
///
/// Blank lines, comments and option lines (`-r other.txt`, `--index-url ...`) are skipped.
pub fn requirement_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().map(str::trim).filter(|line| {
        !line.is_empty() && !line.starts_with('#') && !line.starts_with('-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("numpy")]
    #[case("NumPy")]
    #[case("numpy==1")]
    #[case("numpy==1.0")]
    #[case("numpy==1.0.0")]
    #[case("numpy===1.0.0")]
    #[case("numpy<1.0.0")]
    #[case("numpy<=1.0.0")]
    #[case("numpy>1.0.0")]
    #[case("numpy>=1.0.0")]
    #[case("numpy~=1.0.0")]
    #[case("numpy==1.0.*")]
    #[case("numpy==1.*")]
    #[case("numpy==*")]
    #[case("numpy >= 1.0, < 2.0")]
    fn parse_accepts_valid_requirement(#[case] line: &str) {
        assert!(RequirementParser::new().parse(line).is_ok());
    }

    #[rstest]
    #[case("numpy*")]
    #[case("*numpy*")]
    #[case("numpy*==1.0")]
    #[case("*numpy*==1.0.0")]
    #[case("*numpy*==1.0.*")]
    #[case("numpy_*")]
    #[case("numpy-*")]
    #[case("*numpy-*")]
    #[case("*numpy*-*")]
    #[case("*")]
    fn parse_accepts_wild_requirement(#[case] line: &str) {
        assert!(RequirementParser::new().parse(line).is_ok());
    }

    #[rstest]
    #[case("nu!mpy")]
    #[case("*num*py*")]
    #[case("(numpy)")]
    #[case("[numpy]")]
    #[case("*numpy*cli-*")]
    #[case("")]
    #[case("numpy 1.0")]
    #[case("numpy=>1.0")]
    #[case("numpy!1.0")]
    fn parse_rejects_invalid_requirement(#[case] line: &str) {
        assert!(matches!(
            RequirementParser::new().parse(line),
            Err(RequirementError::InvalidSyntax(_))
        ));
    }

    #[test]
    fn parse_reads_bang_inside_name_as_syntax_error() {
        assert!(matches!(
            RequirementParser::new().parse("nu!mpy"),
            Err(RequirementError::InvalidSyntax(line)) if line == "nu!mpy"
        ));
    }

    #[test]
    fn parse_rejects_malformed_specifier() {
        assert!(matches!(
            RequirementParser::new().parse("numpy==1.x"),
            Err(RequirementError::InvalidSpecifier { .. })
        ));
    }

    #[rstest]
    #[case("NumPy==1.0.0", "numpy==1.0.0")]
    #[case("SpaCy-metrics!=1.0.0", "SpaCy-metrics!=1.0.0")]
    #[case("numpy==1.0.0  # pinned", "numpy==1.0.0")]
    #[case("numpy>=1.20; python_version >= '3.8'", "numpy>=1.20")]
    fn parse_keeps_pattern_and_specifier(#[case] line: &str, #[case] label: &str) {
        let query = RequirementParser::new().parse(line).unwrap();
        assert_eq!(query.label().to_lowercase(), label.to_lowercase());
    }

    #[test]
    fn parsed_query_matches_normalized_names() {
        use crate::parser::types::PackageName;

        let query = RequirementParser::new().parse("SpaCy-metrics!=1.0.0").unwrap();
        assert!(query.matches_name(&PackageName::new("spacy_metrics")));
        assert!(!query.matches_version(&"1.0.0".parse().unwrap()));
        assert!(query.matches_version(&"1.1.0".parse().unwrap()));
    }

    #[test]
    fn requirement_lines_skips_blank_comment_and_option_lines() {
        let content = "\
# scientific stack
numpy==1.23.0

-r base.txt
--index-url https://example.org/simple
  scipy
";
        let lines: Vec<&str> = requirement_lines(content).collect();
        assert_eq!(lines, vec!["numpy==1.23.0", "scipy"]);
    }
}
