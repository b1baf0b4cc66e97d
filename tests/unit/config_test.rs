//! Unit tests for quota configuration parsing

use pretty_assertions::assert_eq;
use quotrak::config::QuotaConfig;
use rstest::rstest;
use std::collections::HashMap;

#[rstest]
#[case("intelx=25", &[("intelx", 25)])]
#[case("intelx=25,osintalternative=5", &[("intelx", 25), ("osintalternative", 5)])]
#[case(" intelx = 25 , shodan = 100 ", &[("intelx", 25), ("shodan", 100)])]
#[case("blocked=0", &[("blocked", 0)])]
fn test_parse_service_defaults(#[case] raw: &str, #[case] expected: &[(&str, i32)]) {
    let parsed = QuotaConfig::parse_service_defaults(raw);
    let expected: HashMap<String, i32> = expected
        .iter()
        .map(|(s, l)| (s.to_string(), *l))
        .collect();
    assert_eq!(parsed, expected);
}

#[rstest]
#[case("")]
#[case("no-equals-sign")]
#[case("=25")]
#[case("intelx=notanumber")]
#[case("intelx=-5")]
fn test_parse_service_defaults_skips_malformed(#[case] raw: &str) {
    assert!(QuotaConfig::parse_service_defaults(raw).is_empty());
}

#[test]
fn test_parse_keeps_valid_entries_among_malformed() {
    let parsed = QuotaConfig::parse_service_defaults("intelx=25,bogus,shodan=abc,censys=10");
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed["intelx"], 25);
    assert_eq!(parsed["censys"], 10);
}

#[test]
fn test_default_limit_for_falls_back_to_global() {
    let config = QuotaConfig {
        default_daily_limit: 200,
        service_defaults: QuotaConfig::parse_service_defaults("intelx=25"),
        zero_limit_grace: true,
    };

    assert_eq!(config.default_limit_for("intelx"), 25);
    assert_eq!(config.default_limit_for("anything-else"), 200);
}
