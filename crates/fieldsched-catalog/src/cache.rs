//! Caller-owned profile cache.
//!
//! The catalog is cached under a single "all profiles" key with a short TTL.
//! Any upsert made through the cache invalidates it, so the next read sees
//! the new record.

use std::time::{Duration, Instant};

use fieldsched_model::{CompanyProfile, ProfileUpsert};
use tracing::debug;

use crate::error::Result;
use crate::store::ProfileStore;

pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct CacheEntry {
    profiles: Vec<CompanyProfile>,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct CachedCatalog<S> {
    store: S,
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl<S: ProfileStore> CachedCatalog<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ttl: DEFAULT_CATALOG_TTL,
            entry: None,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True when a cached catalog exists and is younger than the TTL.
    pub fn is_fresh(&self) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.fetched_at.elapsed() < self.ttl)
    }

    /// Active profiles in catalog order, fetched only when the cache is stale.
    pub fn profiles(&mut self) -> Result<&[CompanyProfile]> {
        if !self.is_fresh() {
            self.fetch()?;
        }
        Ok(self.cached())
    }

    /// Fetch from the store regardless of freshness.
    pub fn refresh(&mut self) -> Result<&[CompanyProfile]> {
        self.fetch()?;
        Ok(self.cached())
    }

    /// Upsert through the store, then drop the cached catalog.
    pub fn upsert(&mut self, request: ProfileUpsert) -> Result<CompanyProfile> {
        let stored = self.store.upsert(request)?;
        self.invalidate();
        Ok(stored)
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("profile cache invalidated");
        }
    }

    fn fetch(&mut self) -> Result<()> {
        let profiles = self.store.list_active()?;
        debug!(profile_count = profiles.len(), "profile cache filled");
        self.entry = Some(CacheEntry {
            profiles,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    fn cached(&self) -> &[CompanyProfile] {
        self.entry
            .as_ref()
            .map(|entry| entry.profiles.as_slice())
            .unwrap_or_default()
    }
}
