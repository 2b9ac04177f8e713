//! Preview of how a profile's column mappings apply to an uploaded header row.
//!
//! The ingestion workflow performs the real translation; this only reports
//! which headers would land on which canonical fields.

use std::collections::{BTreeMap, BTreeSet};

use fieldsched_model::CompanyProfile;
use serde::Serialize;

use crate::normalize::normalize_header;

/// One header resolved to a canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedColumn {
    /// Header as it appears in the file.
    pub source: String,
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingPreview {
    pub mapped: Vec<MappedColumn>,
    /// Headers in the file with no mapping entry.
    pub unmapped: Vec<String>,
    /// Mapping keys that do not appear in the file.
    pub missing: Vec<String>,
}

impl MappingPreview {
    pub fn field_for(&self, source: &str) -> Option<&str> {
        self.mapped
            .iter()
            .find(|column| column.source == source)
            .map(|column| column.field.as_str())
    }
}

/// Resolve `headers` through `profile.column_mappings`, comparing normalized
/// header text. Each header is reported once, in file order.
pub fn preview_mappings<S: AsRef<str>>(headers: &[S], profile: &CompanyProfile) -> MappingPreview {
    let lookup: BTreeMap<String, &str> = profile
        .column_mappings
        .iter()
        .map(|(source, field)| (normalize_header(source), field.as_str()))
        .collect();

    let mut preview = MappingPreview::default();
    let mut seen = BTreeSet::new();
    for header in headers {
        let header = header.as_ref();
        let key = normalize_header(header);
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        match lookup.get(&key) {
            Some(field) => preview.mapped.push(MappedColumn {
                source: header.to_string(),
                field: (*field).to_string(),
            }),
            None => preview.unmapped.push(header.to_string()),
        }
    }
    preview.missing = profile
        .column_mappings
        .keys()
        .filter(|source| !seen.contains(&normalize_header(source)))
        .cloned()
        .collect();
    preview
}
