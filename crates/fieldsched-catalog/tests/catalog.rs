use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use fieldsched_catalog::{
    CachedCatalog, JsonFileStore, MemoryStore, ProfileStore, Result, StoreError,
};
use fieldsched_model::{CompanyProfile, ProfileUpsert};

fn upsert(code: &str, name: &str, fingerprint: &[&str]) -> ProfileUpsert {
    let mut request = ProfileUpsert::new(code, name);
    request.column_fingerprint = fingerprint.iter().map(|h| h.to_string()).collect();
    request
}

/// Counts catalog reads against an inner memory store.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
}

impl CountingStore {
    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ProfileStore for CountingStore {
    fn list_active(&self) -> Result<Vec<CompanyProfile>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.list_active()
    }

    fn upsert(&self, request: ProfileUpsert) -> Result<CompanyProfile> {
        self.inner.upsert(request)
    }
}

#[test]
fn json_store_round_trips_and_orders_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested/profiles.json"));

    assert!(store.list_active().unwrap().is_empty());

    store.upsert(upsert("wis", "Wisdom", &["Claim Number"])).unwrap();
    store.upsert(upsert("AB", "alpha", &["Policy"])).unwrap();

    let listed = store.list_active().unwrap();
    let codes: Vec<_> = listed.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["AB", "WIS"]);
    assert!(listed.iter().all(|p| p.created_at.is_some()));

    let reopened = JsonFileStore::new(store.path());
    assert_eq!(reopened.list_active().unwrap(), listed);
}

#[test]
fn json_store_upsert_replaces_by_code() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("profiles.json"));

    let created = store.upsert(upsert("mm", "MainStreet", &["a"])).unwrap();
    let updated = store.upsert(upsert("MM", "MainStreet Mutual", &["a", "b"])).unwrap();

    let all = store.load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "MainStreet Mutual");
    assert_eq!(all[0].column_fingerprint, vec!["a", "b"]);
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn json_store_hides_inactive_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    fs::write(
        &path,
        r#"[
            {"company_code": "AA", "company_name": "Active"},
            {"company_code": "OFF", "company_name": "Retired", "is_active": false}
        ]"#,
    )
    .unwrap();

    let store = JsonFileStore::new(&path);

    let active = store.list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].code.as_str(), "AA");
    assert_eq!(store.load_all().unwrap().len(), 2);
}

#[test]
fn json_store_lists_legacy_codes_and_still_accepts_upserts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    fs::write(
        &path,
        r#"[
            {"company_code": "A-1", "company_name": "Dashed", "column_fingerprint": null},
            {"company_code": "LONGCOMPANY", "company_name": "Legacy"},
            {"company_code": "ok", "company_name": "Modern"}
        ]"#,
    )
    .unwrap();
    let store = JsonFileStore::new(&path);

    let codes: Vec<_> = store
        .list_active()
        .unwrap()
        .iter()
        .map(|p| p.code.as_str().to_string())
        .collect();
    assert_eq!(codes, vec!["A-1", "LONGCOMPANY", "OK"]);

    store.upsert(upsert("nu", "Newcomer", &["Policy"])).unwrap();
    assert_eq!(store.load_all().unwrap().len(), 4);
    let err = store.upsert(upsert("A-1", "Dashed", &[])).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn json_store_reports_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    fs::write(&path, "{not json").unwrap();

    let err = JsonFileStore::new(&path).list_active().unwrap_err();

    assert!(matches!(err, StoreError::Json { .. }));
}

#[test]
fn invalid_upsert_is_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("profiles.json"));

    let err = store.upsert(upsert("bad code", "Name", &[])).unwrap_err();

    assert!(matches!(err, StoreError::Invalid(_)));
    assert!(!store.path().exists());
}

#[test]
fn cache_serves_reads_within_ttl() {
    let store = CountingStore::default();
    store.upsert(upsert("AA", "Alpha", &["a"])).unwrap();
    let mut catalog = CachedCatalog::new(&store).with_ttl(Duration::from_secs(3600));

    assert_eq!(catalog.profiles().unwrap().len(), 1);
    assert_eq!(catalog.profiles().unwrap().len(), 1);
    assert!(catalog.is_fresh());
    assert_eq!(store.reads(), 1);
}

#[test]
fn cache_upsert_invalidates() {
    let store = CountingStore::default();
    let mut catalog = CachedCatalog::new(&store).with_ttl(Duration::from_secs(3600));

    assert!(catalog.profiles().unwrap().is_empty());
    catalog.upsert(upsert("bb", "Beta", &["b"])).unwrap();
    assert!(!catalog.is_fresh());

    let profiles = catalog.profiles().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].code.as_str(), "BB");
    assert_eq!(store.reads(), 2);
}

#[test]
fn cache_refetches_when_expired_or_invalidated() {
    let store = CountingStore::default();
    let mut zero_ttl = CachedCatalog::new(&store).with_ttl(Duration::ZERO);
    zero_ttl.profiles().unwrap();
    zero_ttl.profiles().unwrap();
    assert_eq!(store.reads(), 2);

    let mut catalog = CachedCatalog::new(&store);
    catalog.profiles().unwrap();
    catalog.invalidate();
    catalog.profiles().unwrap();
    catalog.refresh().unwrap();
    assert_eq!(store.reads(), 5);
}
