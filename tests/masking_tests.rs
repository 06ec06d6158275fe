//! Masking engine tests
//!
//! The engine's DOM pass runs in-page; these tests exercise the pure parts:
//! positional pool selection, literal escaping, and the rendered script.

use guideshot::masking::{MaskingEngine, MaskingProfile, MaskingRule};
use pretty_assertions::assert_eq;

// ============================================================================
// Positional selection
// ============================================================================

#[test]
fn test_row_at_ordinal_receives_pool_mod_len() {
    let profile = MaskingProfile::default();
    let rules = profile.positional_rules();
    let rule = rules.iter().find(|r| r.search == "John Doe").unwrap();
    let n = profile.identities.len();

    // A row containing "John Doe" at ordinal i receives names[i % n],
    // rendered as "First Last".
    for i in 0..(2 * n) {
        let expected = profile.identities[i % n].full_name();
        assert_eq!(rule.pick(i), Some(expected.as_str()));
        assert!(expected.contains(' '), "identity renders as First Last");
    }
}

#[test]
fn test_repeated_rows_get_distinct_identities() {
    let profile = MaskingProfile::default();
    let rules = profile.positional_rules();
    let rule = rules.iter().find(|r| r.search == "John Doe").unwrap();
    assert_ne!(rule.pick(0), rule.pick(1));
    assert_ne!(rule.pick(1), rule.pick(2));
}

#[test]
fn test_email_and_phone_rules_present() {
    let profile = MaskingProfile::default();
    let rules = profile.positional_rules();
    assert!(rules.iter().any(|r| r.search == profile.sentinel_email));
    assert!(rules.iter().any(|r| r.search == profile.sentinel_phone));
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_second_pass_is_a_no_op() {
    // After the first pass the page contains only substitute values; none
    // of them re-match any rule's search string, so a second application
    // substitutes nothing.
    let profile = MaskingProfile::default();
    for rule in profile.positional_rules() {
        for substitute in &rule.pool {
            assert!(!substitute.contains(&rule.search));
        }
    }
    for (search, replacement) in profile.chrome_rules() {
        assert!(!replacement.contains(&search));
    }
}

// ============================================================================
// Script rendering & escaping
// ============================================================================

#[test]
fn test_literal_search_is_escaped_before_pattern_use() {
    let profile = MaskingProfile::default();
    let script = MaskingEngine::script(&profile).unwrap();
    // '+' in the phone sentinel must not reach RegExp as a quantifier
    assert!(script.contains(r"\+254 722 000 000"));
}

#[test]
fn test_custom_rule_with_metacharacters() {
    let rule = MaskingRule::new("Acme (Pty) Ltd.", vec!["Umbrella Corp".to_string()]);
    let escaped = regex::escape(&rule.search);
    assert!(escaped.contains(r"\("));
    assert!(escaped.contains(r"\)"));
    assert!(escaped.contains(r"\."));
}

#[test]
fn test_script_covers_all_scopes() {
    let profile = MaskingProfile::default();
    let script = MaskingEngine::script(&profile).unwrap();
    assert!(script.contains(guideshot::masking::ROW_SCOPE));
    assert!(script.contains(guideshot::masking::DETAIL_SCOPE));
    assert!(script.contains(guideshot::masking::CHROME_SCOPE));
    assert!(script.contains(guideshot::masking::SIDENAV_SCOPE));
}

#[test]
fn test_script_substitutes_operator_identity_in_chrome() {
    let profile = MaskingProfile::default();
    let script = MaskingEngine::script(&profile).unwrap();
    assert!(script.contains(&profile.operator_email));
    assert!(script.contains(&profile.operator_email_placeholder));
}

#[test]
fn test_profile_loads_from_json() {
    let json = r#"{
        "identities": [{"first": "Ada", "last": "Lovelace"}],
        "emails": ["ada@example.com"],
        "phones": ["+44 20 0000 0000"],
        "sentinel_names": ["Jane Roe"]
    }"#;
    let profile: MaskingProfile = serde_json::from_str(json).unwrap();
    assert_eq!(profile.identities.len(), 1);
    assert_eq!(profile.identities[0].full_name(), "Ada Lovelace");
    // Unset fields keep their defaults
    assert_eq!(profile.sentinel_email, "customer@example.com");

    let rules = profile.positional_rules();
    let rule = rules.iter().find(|r| r.search == "Jane Roe").unwrap();
    assert_eq!(rule.pick(5), Some("Ada Lovelace"));
}
