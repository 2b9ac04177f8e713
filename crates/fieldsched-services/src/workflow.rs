//! External workflow service: file ingestion and route queries.
//!
//! What the workflow does with a file or query is opaque here. A call
//! succeeds when the service answers 2xx and its envelope does not report a
//! failure.

use fieldsched_model::{IngestionRequest, RouteQuery, Session, WorkflowResponse};
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::http::{self, HttpSettings};

pub trait WorkflowService {
    fn submit_file(&self, request: &IngestionRequest) -> Result<WorkflowResponse>;
    fn submit_route_query(&self, query: &RouteQuery) -> Result<WorkflowResponse>;
}

#[derive(Debug, Clone)]
pub struct WorkflowClient {
    client: Client,
    settings: HttpSettings,
    ingest_url: Option<String>,
    route_url: Option<String>,
    access_token: Option<String>,
}

impl WorkflowClient {
    pub fn new(settings: HttpSettings) -> Result<Self> {
        Ok(Self {
            client: settings.build_client()?,
            settings,
            ingest_url: None,
            route_url: None,
            access_token: None,
        })
    }

    #[must_use]
    pub fn with_ingest_url(mut self, url: impl Into<String>) -> Self {
        self.ingest_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_route_url(mut self, url: impl Into<String>) -> Self {
        self.route_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: Option<&Session>) -> Self {
        self.access_token = session.map(|s| s.access_token.clone());
        self
    }
}

/// Turn a `success: false` envelope into [`ServiceError::Rejected`].
fn accept(response: WorkflowResponse) -> Result<WorkflowResponse> {
    if response.success {
        return Ok(response);
    }
    let message = response
        .message
        .unwrap_or_else(|| "workflow reported a failure".to_string());
    Err(ServiceError::Rejected(message))
}

impl WorkflowService for WorkflowClient {
    fn submit_file(&self, request: &IngestionRequest) -> Result<WorkflowResponse> {
        let url = self
            .ingest_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured("workflow ingest URL"))?;
        debug!(
            url,
            file_name = %request.file_name,
            size = request.bytes.len(),
            "submitting file to workflow"
        );

        let mut form = Form::new().part(
            "file",
            Part::bytes(request.bytes.clone()).file_name(request.file_name.clone()),
        );
        if let Some(code) = &request.company_hint {
            form = form.text("company_hint", code.to_string());
        }

        let builder = http::authorize(
            self.client.post(url).multipart(form),
            self.access_token.as_deref(),
            &self.settings,
        )?;
        let response = accept(http::read_json(url, http::send(url, builder)?)?)?;
        info!(file_name = %request.file_name, "workflow accepted file");
        Ok(response)
    }

    fn submit_route_query(&self, query: &RouteQuery) -> Result<WorkflowResponse> {
        let url = self
            .route_url
            .as_deref()
            .ok_or(ServiceError::NotConfigured("workflow route URL"))?;
        debug!(
            url,
            service_date = %query.service_date,
            inspections = query.inspection_ids.len(),
            "submitting route query"
        );

        let builder = http::authorize(
            self.client.post(url).json(query),
            self.access_token.as_deref(),
            &self.settings,
        )?;
        accept(http::read_json(url, http::send(url, builder)?)?)
    }
}
