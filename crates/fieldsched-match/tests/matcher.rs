use fieldsched_match::{FingerprintMatcher, SelectionPolicy, detect_profile, preview_mappings};
use serde_json::json;
use fieldsched_model::{CompanyCode, CompanyProfile};

fn profile(code: &str, fingerprint: &[&str]) -> CompanyProfile {
    CompanyProfile::new(CompanyCode::new(code).unwrap(), format!("Company {code}"))
        .with_fingerprint(fingerprint.iter().copied())
}

fn headers(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn shorter_fingerprint_first_in_catalog_wins() {
    let catalog = vec![
        profile("PA", &["a", "b", "c"]),
        profile("PB", &["a", "b", "c", "d"]),
    ];

    let matched = detect_profile(&headers(&["a", "b", "c"]), &catalog);

    assert_eq!(matched.map(|p| p.code.as_str()), Some("PA"));

    let scores = FingerprintMatcher::new().score_catalog(&headers(&["a", "b", "c"]), &catalog);
    assert_eq!(scores[0].ratio, 1.0);
    assert!(scores[0].confident);
    assert_eq!(scores[1].ratio, 0.75);
    assert!(!scores[1].confident);
}

#[test]
fn first_confident_profile_wins_over_later_ones() {
    let catalog = vec![
        profile("PB", &["a", "b", "c", "d"]),
        profile("PA", &["a", "b", "c"]),
    ];

    let matched = detect_profile(&headers(&["a", "b", "c", "d"]), &catalog);

    assert_eq!(matched.map(|p| p.code.as_str()), Some("PB"));
}

#[test]
fn matching_ignores_case_and_edge_whitespace() {
    let catalog = vec![profile("CN", &["claim number", "address"])];

    let matched = detect_profile(&headers(&["Claim Number", "ADDRESS "]), &catalog);

    assert_eq!(matched.map(|p| p.code.as_str()), Some("CN"));
}

#[test]
fn internal_whitespace_is_significant() {
    let catalog = vec![profile("CN", &["claim number"])];

    assert!(detect_profile(&headers(&["claim  number"]), &catalog).is_none());
}

#[test]
fn threshold_boundary_is_inclusive() {
    let expected = ["h0", "h1", "h2", "h3", "h4", "h5", "h6", "h7", "h8", "h9"];
    let catalog = vec![profile("TN", &expected)];

    let nine = headers(&expected[..9]);
    assert!(detect_profile(&nine, &catalog).is_some());

    let eight = headers(&expected[..8]);
    assert!(detect_profile(&eight, &catalog).is_none());
}

#[test]
fn extra_headers_do_not_lower_the_ratio() {
    let catalog = vec![profile("EX", &["a", "b"])];

    let matched = detect_profile(&headers(&["x", "a", "y", "b", "z"]), &catalog);

    assert!(matched.is_some());
}

#[test]
fn empty_fingerprint_never_matches() {
    let catalog = vec![profile("EM", &[]), profile("BL", &["", "   "])];

    assert!(detect_profile(&headers(&["a", "b"]), &catalog).is_none());
    assert!(detect_profile(&headers(&["", "   "]), &catalog).is_none());
    assert!(
        FingerprintMatcher::new()
            .score_catalog(&headers(&["a"]), &catalog)
            .is_empty()
    );
}

#[test]
fn empty_headers_never_match() {
    let catalog = vec![profile("PA", &["a"]), profile("PB", &["b"])];

    assert!(detect_profile::<String>(&[], &catalog).is_none());
}

#[test]
fn empty_catalog_never_matches() {
    assert!(detect_profile(&headers(&["a", "b"]), &[]).is_none());
}

#[test]
fn custom_threshold_applies() {
    let catalog = vec![profile("PB", &["a", "b", "c", "d"])];
    let matcher = FingerprintMatcher::new().with_threshold(0.75);

    let matched = matcher.find_match(&headers(&["a", "b", "c"]), &catalog);

    assert_eq!(matched.map(|p| p.code.as_str()), Some("PB"));
}

#[test]
fn explain_output_serializes_with_stable_field_names() {
    let mut catalog = vec![profile("PA", &["Policy #", "Insured", "Address", "Zip"])];
    catalog[0].column_mappings = [("Policy #", "policy_number"), ("Zip", "zip")]
        .into_iter()
        .map(|(source, field)| (source.to_string(), field.to_string()))
        .collect();
    let file_headers = headers(&["policy #", "Insured"]);

    let scores = FingerprintMatcher::new().score_catalog(&file_headers, &catalog);
    assert_eq!(
        serde_json::to_value(&scores).unwrap(),
        json!([{
            "code": "PA",
            "name": "Company PA",
            "matched": 2,
            "expected": 4,
            "ratio": 0.5,
            "confident": false,
            "missing": ["address", "zip"],
        }])
    );

    let preview = preview_mappings(&file_headers, &catalog[0]);
    assert_eq!(
        serde_json::to_value(&preview).unwrap(),
        json!({
            "mapped": [{"source": "policy #", "field": "policy_number"}],
            "unmapped": ["Insured"],
            "missing": ["Zip"],
        })
    );
}

#[test]
fn selection_policy_reads_snake_case_names() {
    let policy: SelectionPolicy = serde_json::from_value(json!("best_ratio")).unwrap();
    assert_eq!(policy, SelectionPolicy::BestRatio);
    assert_eq!(
        serde_json::to_value(SelectionPolicy::FirstMatch).unwrap(),
        json!("first_match")
    );
}
