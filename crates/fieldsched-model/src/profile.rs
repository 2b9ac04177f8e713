//! Company profiles: stored templates describing one external company's
//! spreadsheet export format and its default appointment settings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{CompanyCode, ModelError};

/// How appointments for a company's inspections are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    /// No appointment needed.
    #[default]
    None,
    /// Inspector calls ahead before arriving.
    CallAhead,
    /// Appointment fixed to a date, any time of day.
    DateOnly,
    /// Appointment fixed to a date and time.
    DateAndTime,
}

impl AppointmentType {
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::CallAhead,
        Self::DateOnly,
        Self::DateAndTime,
    ];

    /// Wire name, as stored by the hosted store.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CallAhead => "call_ahead",
            Self::DateOnly => "date_only",
            Self::DateAndTime => "date_and_time",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::CallAhead => "Call ahead",
            Self::DateOnly => "Date only",
            Self::DateAndTime => "Date and time",
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppointmentType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ModelError::UnknownAppointmentType(s.to_string()))
    }
}

/// Default appointment lengths, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationDefaults {
    #[serde(
        default = "default_standard_minutes",
        deserialize_with = "standard_minutes_or_default"
    )]
    pub standard_minutes: u32,
    #[serde(
        default = "default_high_value_minutes",
        deserialize_with = "high_value_minutes_or_default"
    )]
    pub high_value_minutes: u32,
}

fn default_standard_minutes() -> u32 {
    30
}

fn default_high_value_minutes() -> u32 {
    60
}

fn standard_minutes_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<u32, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_standard_minutes))
}

fn high_value_minutes_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<u32, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_high_value_minutes))
}

/// Stored rows may carry an explicit `null` for optional columns; read it
/// the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn active_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_active))
}

impl Default for DurationDefaults {
    fn default() -> Self {
        Self {
            standard_minutes: default_standard_minutes(),
            high_value_minutes: default_high_value_minutes(),
        }
    }
}

impl DurationDefaults {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.standard_minutes == 0 {
            return Err(ModelError::InvalidDuration { field: "standard" });
        }
        if self.high_value_minutes == 0 {
            return Err(ModelError::InvalidDuration {
                field: "high-value",
            });
        }
        Ok(())
    }
}

fn default_active() -> bool {
    true
}

/// A stored company profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Company abbreviation; the upsert key.
    #[serde(rename = "company_code")]
    pub code: CompanyCode,
    /// Display name.
    #[serde(rename = "company_name")]
    pub name: String,
    /// Expected header strings, stored verbatim. Only used for matching.
    #[serde(default, deserialize_with = "null_as_default")]
    pub column_fingerprint: Vec<String>,
    /// Source header to canonical field name, consumed by ingestion.
    #[serde(default, deserialize_with = "null_as_default")]
    pub column_mappings: BTreeMap<String, String>,
    #[serde(flatten)]
    pub durations: DurationDefaults,
    #[serde(default, deserialize_with = "null_as_default")]
    pub appointment_type: AppointmentType,
    #[serde(default = "default_active", deserialize_with = "active_or_default")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CompanyProfile {
    pub fn new(code: CompanyCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            column_fingerprint: Vec::new(),
            column_mappings: BTreeMap::new(),
            durations: DurationDefaults::default(),
            appointment_type: AppointmentType::default(),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[must_use]
    pub fn with_fingerprint<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_fingerprint = headers.into_iter().map(Into::into).collect();
        self
    }

    /// A profile is only eligible for matching when its fingerprint has at
    /// least one non-blank entry.
    pub fn has_fingerprint(&self) -> bool {
        self.column_fingerprint
            .iter()
            .any(|header| !header.trim().is_empty())
    }
}

/// Request body for creating or updating a profile, keyed on its code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpsert {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub column_fingerprint: Vec<String>,
    #[serde(default)]
    pub column_mappings: BTreeMap<String, String>,
    #[serde(default)]
    pub durations: DurationDefaults,
    #[serde(default)]
    pub appointment_type: AppointmentType,
}

impl ProfileUpsert {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            column_fingerprint: Vec::new(),
            column_mappings: BTreeMap::new(),
            durations: DurationDefaults::default(),
            appointment_type: AppointmentType::default(),
        }
    }

    /// Validate the request and build the record to store. The code is
    /// uppercased here, before it reaches any store.
    pub fn into_profile(self) -> Result<CompanyProfile, ModelError> {
        let code = CompanyCode::new(self.code)?;
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ModelError::EmptyCompanyName);
        }
        self.durations.validate()?;
        Ok(CompanyProfile {
            code,
            name,
            column_fingerprint: self.column_fingerprint,
            column_mappings: self.column_mappings,
            durations: self.durations,
            appointment_type: self.appointment_type,
            is_active: true,
            created_at: None,
            updated_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_type_parses_loose_spellings() {
        assert_eq!(
            "call-ahead".parse::<AppointmentType>().unwrap(),
            AppointmentType::CallAhead
        );
        assert_eq!(
            "Date and time".parse::<AppointmentType>().unwrap(),
            AppointmentType::DateAndTime
        );
        assert!("weekly".parse::<AppointmentType>().is_err());
    }

    #[test]
    fn blank_fingerprint_is_not_eligible() {
        let code = CompanyCode::new("AB").unwrap();
        let profile = CompanyProfile::new(code.clone(), "Alpha");
        assert!(!profile.has_fingerprint());
        let blanks = CompanyProfile::new(code.clone(), "Alpha").with_fingerprint(["", "  "]);
        assert!(!blanks.has_fingerprint());
        let real = CompanyProfile::new(code, "Alpha").with_fingerprint(["Address"]);
        assert!(real.has_fingerprint());
    }
}
