//! Hosted auth provider client: password sign-in and sign-out.

use chrono::{Duration as ChronoDuration, Utc};
use fieldsched_model::Session;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::http::{self, HttpSettings};

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    settings: HttpSettings,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, settings: HttpSettings) -> Result<Self> {
        Ok(Self {
            client: settings.build_client()?,
            settings,
            base_url: base_url.into(),
        })
    }

    /// Exchange an email and password for a session.
    pub fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!(
            "{}?grant_type=password",
            http::endpoint(&self.base_url, "auth/v1/token")
        );
        debug!(url = %url, "signing in");

        let request = self
            .client
            .post(&url)
            .json(&PasswordGrant { email, password });
        let token: TokenResponse = http::read_json(&url, http::send(&url, request)?)?;

        let expires_at = token
            .expires_in
            .map(|seconds| Utc::now() + ChronoDuration::seconds(seconds));
        let session = Session {
            user_id: token.user.id,
            access_token: token.access_token,
            email: token.user.email.or_else(|| Some(email.to_string())),
            expires_at,
        };
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    /// Revoke the session on the provider.
    pub fn sign_out(&self, session: &Session) -> Result<()> {
        let url = http::endpoint(&self.base_url, "auth/v1/logout");
        let request = http::authorize(
            self.client.post(&url),
            Some(&session.access_token),
            &self.settings,
        )?;
        http::read_body(&url, http::send(&url, request)?)?;
        info!(user_id = %session.user_id, "signed out");
        Ok(())
    }
}
