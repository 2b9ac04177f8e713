use std::fs;
use std::path::Path;

use fieldsched_cli::detect::{collect_inputs, detect_file};
use fieldsched_match::{FingerprintMatcher, SelectionPolicy};
use fieldsched_model::{CompanyCode, CompanyProfile};

fn profile(code: &str, name: &str, fingerprint: &[&str]) -> CompanyProfile {
    let mut profile = CompanyProfile::new(CompanyCode::new(code).unwrap(), name)
        .with_fingerprint(fingerprint.iter().copied());
    profile
        .column_mappings
        .insert("Claim Number".to_string(), "claim_number".to_string());
    profile
}

fn catalog() -> Vec<CompanyProfile> {
    vec![
        profile(
            "MM",
            "MainStreet",
            &["Policy #", "Insured", "Street", "City"],
        ),
        profile(
            "WIS",
            "Wisdom",
            &["Claim Number", "Insured Name", "Address", "Zip"],
        ),
    ]
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn detects_company_from_csv_header() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "june.csv",
        "claim number,INSURED NAME,Address,Zip,Notes\n1,Ann,1 Main,12345,\n",
    );

    let detection = detect_file(&file, &catalog(), &FingerprintMatcher::new(), false).unwrap();

    assert!(detection.is_match());
    assert_eq!(detection.matched.unwrap().code.as_str(), "WIS");
    assert_eq!(detection.header_row.len(), 5);
    assert!(detection.scores.is_empty());
    assert!(detection.preview.is_none());
}

#[test]
fn partial_overlap_is_not_a_match() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "partial.csv", "Claim Number,Insured Name,Address\n");

    let detection = detect_file(&file, &catalog(), &FingerprintMatcher::new(), true).unwrap();

    assert!(!detection.is_match());
    let wisdom = detection.scores.iter().find(|s| s.code == "WIS").unwrap();
    assert_eq!((wisdom.matched, wisdom.expected), (3, 4));
    assert!(!wisdom.confident);
    assert!(detection.preview.is_none());
}

#[test]
fn lower_threshold_and_explain_fill_preview() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "partial.csv", "Claim Number,Insured Name,Address,Extra\n");
    let matcher = FingerprintMatcher::new()
        .with_threshold(0.75)
        .with_policy(SelectionPolicy::BestRatio);

    let detection = detect_file(&file, &catalog(), &matcher, true).unwrap();

    assert_eq!(detection.matched.as_ref().unwrap().code.as_str(), "WIS");
    let preview = detection.preview.unwrap();
    assert_eq!(preview.field_for("Claim Number"), Some("claim_number"));
    assert!(preview.unmapped.contains(&"Extra".to_string()));
    assert_eq!(detection.scores.len(), 2);
}

#[test]
fn unreadable_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");

    let err = detect_file(&missing, &catalog(), &FingerprintMatcher::new(), false).unwrap_err();

    assert!(format!("{err:#}").contains("missing.csv"));
}

#[test]
fn directories_expand_to_their_exports() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.csv", "x\n");
    write(dir.path(), "a.tsv", "x\n");
    write(dir.path(), "notes.md", "x\n");
    let single = write(dir.path(), "single.csv", "x\n");

    let files = collect_inputs(&[dir.path().to_path_buf(), single.clone()]).unwrap();

    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.tsv", "b.csv", "single.csv", "single.csv"]);
}

#[test]
fn empty_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    assert!(collect_inputs(&[dir.path().to_path_buf()]).is_err());
}
