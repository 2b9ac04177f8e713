//! Profile stores.
//!
//! A store answers two requests: "all active profiles, ordered by name" and
//! "upsert this profile, keyed on its code". There is no delete.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use fieldsched_model::{CompanyProfile, ProfileUpsert};
use tracing::{debug, info};

use crate::error::{Result, StoreError};

/// Source of company profiles.
pub trait ProfileStore {
    /// Active profiles ordered by name.
    fn list_active(&self) -> Result<Vec<CompanyProfile>>;

    /// Create or replace the profile with the request's code and return the
    /// stored record.
    fn upsert(&self, request: ProfileUpsert) -> Result<CompanyProfile>;
}

impl<S: ProfileStore + ?Sized> ProfileStore for &S {
    fn list_active(&self) -> Result<Vec<CompanyProfile>> {
        (**self).list_active()
    }

    fn upsert(&self, request: ProfileUpsert) -> Result<CompanyProfile> {
        (**self).upsert(request)
    }
}

impl<S: ProfileStore + ?Sized> ProfileStore for Box<S> {
    fn list_active(&self) -> Result<Vec<CompanyProfile>> {
        (**self).list_active()
    }

    fn upsert(&self, request: ProfileUpsert) -> Result<CompanyProfile> {
        (**self).upsert(request)
    }
}

/// Catalog order: name (case-insensitive), then code.
pub fn catalog_order(left: &CompanyProfile, right: &CompanyProfile) -> Ordering {
    left.name
        .to_lowercase()
        .cmp(&right.name.to_lowercase())
        .then_with(|| left.code.cmp(&right.code))
}

/// Active profiles from `profiles`, in catalog order.
pub fn active_in_order(profiles: &[CompanyProfile]) -> Vec<CompanyProfile> {
    let mut active: Vec<CompanyProfile> = profiles.iter().filter(|p| p.is_active).cloned().collect();
    active.sort_by(catalog_order);
    active
}

/// Apply an upsert to an in-memory record list. An existing record keeps its
/// `created_at` and `is_active`; `updated_at` is set to `now`.
pub fn apply_upsert(
    records: &mut Vec<CompanyProfile>,
    request: ProfileUpsert,
    now: DateTime<Utc>,
) -> Result<CompanyProfile> {
    let mut profile = request.into_profile()?;
    profile.updated_at = Some(now);
    match records.iter_mut().find(|existing| existing.code == profile.code) {
        Some(existing) => {
            profile.created_at = existing.created_at.or(Some(now));
            profile.is_active = existing.is_active;
            *existing = profile.clone();
            debug!(company_code = %profile.code, "updated profile");
        }
        None => {
            profile.created_at = Some(now);
            records.push(profile.clone());
            debug!(company_code = %profile.code, "created profile");
        }
    }
    Ok(profile)
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<CompanyProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<CompanyProfile>) -> Self {
        Self {
            records: Mutex::new(profiles),
        }
    }
}

impl ProfileStore for MemoryStore {
    fn list_active(&self) -> Result<Vec<CompanyProfile>> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(active_in_order(&records))
    }

    fn upsert(&self, request: ProfileUpsert) -> Result<CompanyProfile> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        apply_upsert(&mut records, request, Utc::now())
    }
}

/// Catalog persisted as a JSON array of profiles. A missing file reads as an
/// empty catalog; the file is created on first upsert.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored profile, active or not, in file order.
    pub fn load_all(&self) -> Result<Vec<CompanyProfile>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no catalog file, starting empty");
                return Ok(Vec::new());
            }
            Err(error) => return Err(StoreError::io(&self.path, error)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|error| StoreError::json(&self.path, error))
    }

    fn save_all(&self, records: &[CompanyProfile]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| StoreError::io(parent, error))?;
        }
        let json = serde_json::to_string_pretty(records)
            .map_err(|error| StoreError::json(&self.path, error))?;
        fs::write(&self.path, json).map_err(|error| StoreError::io(&self.path, error))
    }
}

impl ProfileStore for JsonFileStore {
    fn list_active(&self) -> Result<Vec<CompanyProfile>> {
        Ok(active_in_order(&self.load_all()?))
    }

    fn upsert(&self, request: ProfileUpsert) -> Result<CompanyProfile> {
        let mut records = self.load_all()?;
        let stored = apply_upsert(&mut records, request, Utc::now())?;
        self.save_all(&records)?;
        info!(
            company_code = %stored.code,
            path = %self.path.display(),
            "saved profile"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use fieldsched_model::CompanyCode;

    use super::*;

    #[test]
    fn upsert_keeps_creation_time_and_active_flag() {
        let first = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let mut records = Vec::new();

        apply_upsert(&mut records, ProfileUpsert::new("ab", "Alpha"), first).unwrap();
        records[0].is_active = false;
        let updated =
            apply_upsert(&mut records, ProfileUpsert::new("AB", "Alpha Two"), second).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(updated.name, "Alpha Two");
        assert_eq!(updated.created_at, Some(first));
        assert_eq!(updated.updated_at, Some(second));
        assert!(!updated.is_active);
    }

    #[test]
    fn catalog_order_is_by_name_then_code() {
        let profiles = vec![
            CompanyProfile::new(CompanyCode::new("ZZ").unwrap(), "beta"),
            CompanyProfile::new(CompanyCode::new("BB").unwrap(), "Alpha"),
            CompanyProfile::new(CompanyCode::new("AA").unwrap(), "Alpha"),
        ];
        let ordered: Vec<_> = active_in_order(&profiles)
            .into_iter()
            .map(|p| p.code.to_string())
            .collect();
        assert_eq!(ordered, vec!["AA", "BB", "ZZ"]);
    }
}
