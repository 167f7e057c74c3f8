use avail_wheels::version::{SpecifierError, Version, VersionSpecifiers, matches};
use rstest::rstest;

fn versions(list: &[&str]) -> Vec<Version> {
    list.iter().map(|v| v.parse().unwrap()).collect()
}

#[test]
fn listing_order_sorts_dev_pre_final_post() {
    let mut sorted = versions(&[
        "1.0.post1",
        "1.0",
        "1.0rc1",
        "1.0.dev1",
        "1.0a2",
        "0.9",
        "1.0b1",
        "1.0a1",
    ]);
    sorted.sort_by(Version::listing_cmp);

    let rendered: Vec<String> = sorted.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "0.9",
            "1.0.dev1",
            "1.0a1",
            "1.0a2",
            "1.0b1",
            "1.0rc1",
            "1.0",
            "1.0.post1",
        ]
    );
}

#[test]
fn local_labels_are_unordered_but_listed_lexically() {
    let [plain, local] = [
        "1.8.0".parse::<Version>().unwrap(),
        "1.8.0+computecanada".parse::<Version>().unwrap(),
    ];

    assert_eq!(plain.partial_cmp(&local), None);
    assert!(plain.listing_cmp(&local).is_lt());
}

#[rstest]
#[case("numpy 1.23 wheel selection", "1.23.0", "==1.23", true)]
#[case("prefix glob", "1.15.4", "1.15*", true)]
#[case("prefix glob other minor", "1.16.0", "1.15*", false)]
#[case("release prefix", "1.21.6", "==1.21.*", true)]
#[case("excluded prefix", "1.21.6", "!=1.21.*", false)]
#[case("range", "1.5.0", ">=1.0,<2.0", true)]
#[case("range upper bound", "2.0.0", ">=1.0,<2.0", false)]
#[case("compatible release", "1.4.5", "~=1.4.2", true)]
#[case("compatible release next minor", "1.5.0", "~=1.4.2", false)]
#[case("compatible release two segments", "1.4.9", "~=1.4", true)]
#[case("compatible release two segments next minor", "1.5.0", "~=1.4", false)]
#[case("local label ignored without one", "1.8.0+computecanada", "==1.8.0", true)]
#[case("local label must match", "1.8.0+computecanada", "==1.8.0+other", false)]
#[case("arbitrary equality", "1.0", "===1.0", true)]
#[case("arbitrary equality is textual", "1.0.0", "===1.0", false)]
#[case("any version", "0.0.1", "==*", true)]
#[case("invalid specifier matches nothing", "1.0", "=>1.0", false)]
fn matches_selects_versions(
    #[case] _description: &str,
    #[case] version: &str,
    #[case] specifier: &str,
    #[case] expected: bool,
) {
    let version: Version = version.parse().unwrap();
    assert_eq!(matches(specifier, &version), expected);
}

#[rstest]
#[case("")]
#[case(">=1.0,")]
#[case("=>1.0")]
#[case("~=1")]
#[case(">=1.*")]
fn invalid_specifiers_are_rejected(#[case] specifier: &str) {
    assert!(specifier.parse::<VersionSpecifiers>().is_err());
}

#[test]
fn compatible_release_needs_two_segments() {
    let error = "~=1".parse::<VersionSpecifiers>().unwrap_err();
    assert!(matches!(error, SpecifierError::CompatibleTooShort(_)));
}

#[test]
fn specifiers_display_in_canonical_form() {
    let specifiers: VersionSpecifiers = ">= 1.0, <2.0, !=1.5.*".parse().unwrap();
    assert_eq!(specifiers.to_string(), ">=1.0,<2.0,!=1.5.*");
}
