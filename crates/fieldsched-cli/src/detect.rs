//! Detection of the company an export belongs to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use fieldsched_ingest::{HeaderRow, discover_spreadsheets, read_headers};
use fieldsched_match::{FingerprintMatcher, MappingPreview, ProfileScore, preview_mappings};
use fieldsched_model::CompanyProfile;
use tracing::{debug, info};

use crate::logging::header_list;

/// Outcome of classifying one file.
#[derive(Debug, Clone)]
pub struct FileDetection {
    pub path: PathBuf,
    pub header_row: HeaderRow,
    pub matched: Option<CompanyProfile>,
    /// Per-profile scores, filled only when an explanation was requested.
    pub scores: Vec<ProfileScore>,
    /// How the matched profile's mappings apply to these headers.
    pub preview: Option<MappingPreview>,
}

impl FileDetection {
    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

/// Expand directories into the exports they contain. Files are kept as
/// given, in order.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = discover_spreadsheets(path)?;
            if found.is_empty() {
                bail!("no CSV or spreadsheet files in {}", path.display());
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Read the header row of `path` and classify it against `profiles`.
pub fn detect_file(
    path: &Path,
    profiles: &[CompanyProfile],
    matcher: &FingerprintMatcher,
    explain: bool,
) -> Result<FileDetection> {
    let header_row =
        read_headers(path).with_context(|| format!("read headers from {}", path.display()))?;
    debug!(
        file = %path.display(),
        row = header_row.row_index,
        headers = %header_list(&header_row.headers),
        "read header row"
    );

    let matched = matcher.find_match(&header_row.headers, profiles).cloned();
    match &matched {
        Some(profile) => info!(file = %path.display(), company_code = %profile.code, "detected company"),
        None => info!(file = %path.display(), "no company profile matched"),
    }

    let (scores, preview) = if explain {
        (
            matcher.score_catalog(&header_row.headers, profiles),
            matched
                .as_ref()
                .map(|profile| preview_mappings(&header_row.headers, profile)),
        )
    } else {
        (Vec::new(), None)
    };

    Ok(FileDetection {
        path: path.to_path_buf(),
        header_row,
        matched,
        scores,
        preview,
    })
}

/// Parse `SOURCE=FIELD` mapping arguments. The source header may itself
/// contain `=`; the last one splits.
pub fn parse_mappings(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut mappings = BTreeMap::new();
    for pair in pairs {
        let Some((source, field)) = pair.rsplit_once('=') else {
            bail!("invalid mapping {pair:?}: expected SOURCE=FIELD");
        };
        let (source, field) = (source.trim(), field.trim());
        if source.is_empty() || field.is_empty() {
            bail!("invalid mapping {pair:?}: source and field must be non-empty");
        }
        mappings.insert(source.to_string(), field.to_string());
    }
    Ok(mappings)
}
