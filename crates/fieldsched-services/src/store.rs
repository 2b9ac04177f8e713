//! Hosted profile store over the backend's REST interface.

use fieldsched_catalog::{ProfileStore, StoreError};
use fieldsched_model::{CompanyProfile, ProfileUpsert, Session};
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::http::{self, HttpSettings};

const PROFILES_PATH: &str = "rest/v1/company_profiles";

/// [`ProfileStore`] backed by the hosted relational store.
///
/// Reads go out with the signed-in user's token when one is attached, so
/// row-level access rules on the backend apply to them.
#[derive(Debug, Clone)]
pub struct RestProfileStore {
    client: Client,
    settings: HttpSettings,
    base_url: String,
    access_token: Option<String>,
}

impl RestProfileStore {
    pub fn new(base_url: impl Into<String>, settings: HttpSettings) -> Result<Self> {
        Ok(Self {
            client: settings.build_client()?,
            settings,
            base_url: base_url.into(),
            access_token: None,
        })
    }

    #[must_use]
    pub fn with_session(mut self, session: Option<&Session>) -> Self {
        self.access_token = session.map(|s| s.access_token.clone());
        self
    }

    /// Active profiles ordered by name, straight from the backend.
    pub fn fetch_active(&self) -> Result<Vec<CompanyProfile>> {
        let url = format!(
            "{}?select=*&is_active=eq.true&order=company_name.asc",
            http::endpoint(&self.base_url, PROFILES_PATH)
        );
        debug!(url = %url, "fetching company profiles");

        let request = http::authorize(
            self.client.get(&url),
            self.access_token.as_deref(),
            &self.settings,
        )?;
        let profiles: Vec<CompanyProfile> = http::read_json(&url, http::send(&url, request)?)?;
        debug!(profile_count = profiles.len(), "fetched company profiles");
        Ok(profiles)
    }

    /// Upsert keyed on `company_code` and return the stored row.
    pub fn push_upsert(&self, profile: &CompanyProfile) -> Result<CompanyProfile> {
        let url = format!(
            "{}?on_conflict=company_code",
            http::endpoint(&self.base_url, PROFILES_PATH)
        );

        let mut body = serde_json::to_value(profile).map_err(|source| ServiceError::Decode {
            url: url.clone(),
            source,
        })?;
        // The active flag and timestamps belong to the backend.
        if let Some(fields) = body.as_object_mut() {
            fields.remove("is_active");
            fields.remove("created_at");
            fields.remove("updated_at");
        }

        let request = http::authorize(
            self.client
                .post(&url)
                .header("Prefer", "resolution=merge-duplicates,return=representation")
                .json(&body),
            self.access_token.as_deref(),
            &self.settings,
        )?;
        let mut rows: Vec<CompanyProfile> = http::read_json(&url, http::send(&url, request)?)?;
        if rows.is_empty() {
            return Err(ServiceError::Rejected(format!(
                "store returned no row for {}",
                profile.code
            )));
        }
        let stored = rows.swap_remove(0);
        info!(company_code = %stored.code, "saved profile to hosted store");
        Ok(stored)
    }
}

impl ProfileStore for RestProfileStore {
    fn list_active(&self) -> fieldsched_catalog::Result<Vec<CompanyProfile>> {
        self.fetch_active()
            .map_err(|error| StoreError::Remote(Box::new(error)))
    }

    fn upsert(&self, request: ProfileUpsert) -> fieldsched_catalog::Result<CompanyProfile> {
        let profile = request.into_profile()?;
        self.push_upsert(&profile)
            .map_err(|error| StoreError::Remote(Box::new(error)))
    }
}
