//! Tests for fieldsched-model types.

use fieldsched_model::{
    AppointmentType, CompanyProfile, DurationDefaults, ModelError, ProfileUpsert,
};

#[test]
fn upsert_uppercases_code_and_trims_name() {
    let mut request = ProfileUpsert::new("wis", "  Wisdom Inspections ");
    request.column_fingerprint = vec!["Claim Number".to_string()];
    request.appointment_type = AppointmentType::CallAhead;

    let profile = request.into_profile().expect("valid upsert");

    assert_eq!(profile.code.as_str(), "WIS");
    assert_eq!(profile.name, "Wisdom Inspections");
    assert_eq!(profile.column_fingerprint, vec!["Claim Number"]);
    assert_eq!(profile.appointment_type, AppointmentType::CallAhead);
    assert!(profile.is_active);
    assert!(profile.created_at.is_none());
}

#[test]
fn upsert_rejects_invalid_requests() {
    let err = ProfileUpsert::new("", "Name").into_profile().unwrap_err();
    assert!(matches!(err, ModelError::InvalidCompanyCode(_)));

    let err = ProfileUpsert::new("AB", "   ").into_profile().unwrap_err();
    assert_eq!(err, ModelError::EmptyCompanyName);

    let mut request = ProfileUpsert::new("AB", "Alpha");
    request.durations = DurationDefaults {
        standard_minutes: 0,
        high_value_minutes: 45,
    };
    let err = request.into_profile().unwrap_err();
    assert_eq!(err, ModelError::InvalidDuration { field: "standard" });
}

#[test]
fn profile_reads_store_rows() {
    let json = r#"{
        "company_code": "mm",
        "company_name": "MainStreet Mutual",
        "column_fingerprint": ["Policy #", "Insured Name", "Address "],
        "column_mappings": {"Policy #": "policy_number"},
        "standard_minutes": 20,
        "high_value_minutes": 90,
        "appointment_type": "date_and_time",
        "is_active": false,
        "created_at": "2026-01-05T10:00:00Z"
    }"#;

    let profile: CompanyProfile = serde_json::from_str(json).expect("decode profile");

    assert_eq!(profile.code.as_str(), "MM");
    assert_eq!(profile.column_fingerprint.len(), 3);
    assert_eq!(profile.column_fingerprint[2], "Address ");
    assert_eq!(
        profile.column_mappings.get("Policy #").map(String::as_str),
        Some("policy_number")
    );
    assert_eq!(profile.durations.standard_minutes, 20);
    assert_eq!(profile.durations.high_value_minutes, 90);
    assert_eq!(profile.appointment_type, AppointmentType::DateAndTime);
    assert!(!profile.is_active);
    assert!(profile.created_at.is_some());
}

#[test]
fn profile_fills_defaults_for_sparse_rows() {
    let json = r#"{"company_code": "AB", "company_name": "Alpha"}"#;
    let profile: CompanyProfile = serde_json::from_str(json).expect("decode profile");

    assert!(profile.column_fingerprint.is_empty());
    assert!(!profile.has_fingerprint());
    assert_eq!(profile.durations, DurationDefaults::default());
    assert_eq!(profile.appointment_type, AppointmentType::None);
    assert!(profile.is_active);
}

#[test]
fn profile_reads_null_columns_as_defaults() {
    let json = r#"{
        "company_code": "NL",
        "company_name": "Null Lane",
        "column_fingerprint": null,
        "column_mappings": null,
        "standard_minutes": null,
        "high_value_minutes": null,
        "appointment_type": null,
        "is_active": null
    }"#;

    let profile: CompanyProfile = serde_json::from_str(json).expect("decode profile");

    assert!(profile.column_fingerprint.is_empty());
    assert!(!profile.has_fingerprint());
    assert!(profile.column_mappings.is_empty());
    assert_eq!(profile.durations, DurationDefaults::default());
    assert_eq!(profile.appointment_type, AppointmentType::None);
    assert!(profile.is_active);
}

#[test]
fn profile_reads_codes_the_upsert_path_would_reject() {
    let json = r#"[
        {"company_code": "a-1", "company_name": "Dashed"},
        {"company_code": "LONGCOMPANY", "company_name": "Too Long"},
        {"company_code": " ok ", "company_name": "Fine"}
    ]"#;

    let profiles: Vec<CompanyProfile> = serde_json::from_str(json).expect("decode catalog");

    let codes: Vec<&str> = profiles.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["A-1", "LONGCOMPANY", "OK"]);
    let err = ProfileUpsert::new("a-1", "Dashed").into_profile().unwrap_err();
    assert!(matches!(err, ModelError::InvalidCompanyCode(_)));
}

#[test]
fn profile_serializes_with_store_field_names() {
    let profile = ProfileUpsert::new("ab", "Alpha").into_profile().unwrap();
    let value = serde_json::to_value(&profile).unwrap();

    assert_eq!(value["company_code"], "AB");
    assert_eq!(value["company_name"], "Alpha");
    assert_eq!(value["standard_minutes"], 30);
    assert_eq!(value["appointment_type"], "none");
    assert!(value.get("created_at").is_none());
}
