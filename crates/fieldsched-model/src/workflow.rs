//! Payloads exchanged with the external workflow service. Its internal
//! behaviour is opaque; only the envelope is modelled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CompanyCode;

/// An export file to hand to the ingestion workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Pre-classified company, when the fingerprint matcher found one.
    pub company_hint: Option<CompanyCode>,
}

/// A request for an optimized route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub service_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,
    #[serde(default)]
    pub inspection_ids: Vec<String>,
}

/// Response envelope from either workflow call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

fn default_success() -> bool {
    true
}
