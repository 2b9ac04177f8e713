//! Payments provider, reached through the backend's edge functions.

use fieldsched_model::{PortalSession, Session, Subscription};
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::http::{self, HttpSettings};

/// Subscription lookups and billing portal sessions.
pub trait PaymentsProvider {
    fn check_subscription(&self, session: &Session) -> Result<Subscription>;

    /// Start a billing portal session. The provider redirects to
    /// `return_url` when the user leaves the portal.
    fn open_portal(&self, session: &Session, return_url: Option<&str>) -> Result<PortalSession>;
}

#[derive(Serialize)]
struct PortalRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct PaymentsClient {
    client: Client,
    settings: HttpSettings,
    functions_url: String,
}

impl PaymentsClient {
    pub fn new(functions_url: impl Into<String>, settings: HttpSettings) -> Result<Self> {
        Ok(Self {
            client: settings.build_client()?,
            settings,
            functions_url: functions_url.into(),
        })
    }

    fn call<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        function: &str,
        session: &Session,
        body: &B,
    ) -> Result<T> {
        let url = http::endpoint(&self.functions_url, function);
        debug!(url = %url, "invoking payments function");
        let request = http::authorize(
            self.client.post(&url).json(body),
            Some(&session.access_token),
            &self.settings,
        )?;
        http::read_json(&url, http::send(&url, request)?)
    }
}

impl PaymentsProvider for PaymentsClient {
    fn check_subscription(&self, session: &Session) -> Result<Subscription> {
        self.call("check-subscription", session, &serde_json::json!({}))
    }

    fn open_portal(&self, session: &Session, return_url: Option<&str>) -> Result<PortalSession> {
        self.call("customer-portal", session, &PortalRequest { return_url })
    }
}
