#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ModelError;

/// Longest company abbreviation accepted by the catalog.
pub const MAX_COMPANY_CODE_LEN: usize = 8;

/// Short uppercase company abbreviation, unique across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CompanyCode(String);

impl CompanyCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty()
            || trimmed.len() > MAX_COMPANY_CODE_LEN
            || !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric())
        {
            return Err(ModelError::InvalidCompanyCode(value));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Normalizes a code read back from a store without validating it, so
    /// rows written by older clients or by hand still load.
    pub fn from_stored(value: &str) -> Self {
        Self(value.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CompanyCode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for CompanyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_stored(&raw))
    }
}
