//! Fingerprint matching: decide which company's export format a header row
//! belongs to.
//!
//! Every eligible profile is scored by the share of its fingerprint present in
//! the uploaded headers:
//!
//! ```text
//! ratio = |fingerprint ∩ headers| / |fingerprint|
//! ```
//!
//! Both sides are normalized with [`normalize_header`](crate::normalize_header)
//! and compared as sets. A ratio at or above the threshold (0.9 by default) is
//! a confident match. Profiles without a fingerprint never match.

use fieldsched_model::CompanyProfile;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::HeaderSet;

/// Minimum fingerprint overlap for a confident match.
pub const CONFIDENT_MATCH_THRESHOLD: f64 = 0.9;

/// How to choose among several profiles that clear the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First confident profile in catalog order.
    #[default]
    FirstMatch,
    /// Highest ratio; equal ratios resolved by catalog order.
    BestRatio,
}

/// Overlap score of one profile against a header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileScore {
    pub code: String,
    pub name: String,
    /// Fingerprint entries found in the headers.
    pub matched: usize,
    /// Distinct fingerprint entries.
    pub expected: usize,
    pub ratio: f64,
    pub confident: bool,
    /// Normalized fingerprint entries absent from the headers.
    pub missing: Vec<String>,
}

impl ProfileScore {
    pub fn explain(&self) -> String {
        let mut text = format!(
            "{} ({}): {}/{} headers, {:.0}%",
            self.code,
            self.name,
            self.matched,
            self.expected,
            self.ratio * 100.0
        );
        if !self.missing.is_empty() {
            text.push_str("; missing: ");
            text.push_str(&self.missing.join(", "));
        }
        text
    }
}

/// Share of `fingerprint` present in `headers`, or `None` when the
/// fingerprint has no usable entries.
pub fn match_ratio<S: AsRef<str>>(fingerprint: &[S], headers: &HeaderSet) -> Option<f64> {
    let expected = HeaderSet::new(fingerprint);
    if expected.is_empty() {
        return None;
    }
    Some(expected.overlap(headers) as f64 / expected.len() as f64)
}

/// Classifies header rows against a profile catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerprintMatcher {
    threshold: f64,
    policy: SelectionPolicy,
}

impl Default for FingerprintMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintMatcher {
    pub fn new() -> Self {
        Self {
            threshold: CONFIDENT_MATCH_THRESHOLD,
            policy: SelectionPolicy::default(),
        }
    }

    /// Override the confidence threshold. Values are clamped into `(0, 1]`;
    /// NaN keeps the default.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        if !threshold.is_nan() {
            self.threshold = threshold.clamp(f64::MIN_POSITIVE, 1.0);
        }
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Return the profile the headers belong to, if any clears the threshold.
    pub fn find_match<'a, S: AsRef<str>>(
        &self,
        headers: &[S],
        profiles: &'a [CompanyProfile],
    ) -> Option<&'a CompanyProfile> {
        let header_set = HeaderSet::new(headers);
        if header_set.is_empty() || profiles.is_empty() {
            debug!(
                header_count = header_set.len(),
                profile_count = profiles.len(),
                "nothing to match"
            );
            return None;
        }

        let mut best: Option<(&CompanyProfile, f64)> = None;
        for profile in profiles {
            let Some(ratio) = match_ratio(&profile.column_fingerprint, &header_set) else {
                continue;
            };
            if ratio < self.threshold {
                continue;
            }
            match self.policy {
                SelectionPolicy::FirstMatch => {
                    debug!(company_code = %profile.code, ratio, "confident match");
                    return Some(profile);
                }
                SelectionPolicy::BestRatio => {
                    if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
                        best = Some((profile, ratio));
                    }
                }
            }
        }

        match best {
            Some((profile, ratio)) => {
                debug!(company_code = %profile.code, ratio, "best confident match");
                Some(profile)
            }
            None => {
                debug!(profile_count = profiles.len(), "no confident match");
                None
            }
        }
    }

    /// Score every eligible profile, in catalog order.
    pub fn score_catalog<S: AsRef<str>>(
        &self,
        headers: &[S],
        profiles: &[CompanyProfile],
    ) -> Vec<ProfileScore> {
        let header_set = HeaderSet::new(headers);
        profiles
            .iter()
            .filter_map(|profile| {
                let expected = HeaderSet::new(&profile.column_fingerprint);
                if expected.is_empty() {
                    return None;
                }
                let missing: Vec<String> = expected
                    .iter()
                    .filter(|header| !header_set.contains(header))
                    .map(str::to_string)
                    .collect();
                let matched = expected.len() - missing.len();
                let ratio = matched as f64 / expected.len() as f64;
                Some(ProfileScore {
                    code: profile.code.to_string(),
                    name: profile.name.clone(),
                    matched,
                    expected: expected.len(),
                    ratio,
                    confident: ratio >= self.threshold,
                    missing,
                })
            })
            .collect()
    }
}

/// Match with the default threshold and first-match selection.
pub fn detect_profile<'a, S: AsRef<str>>(
    headers: &[S],
    profiles: &'a [CompanyProfile],
) -> Option<&'a CompanyProfile> {
    FingerprintMatcher::new().find_match(headers, profiles)
}

#[cfg(test)]
mod tests {
    use fieldsched_model::{CompanyCode, CompanyProfile};

    use super::*;

    fn profile(code: &str, fingerprint: &[&str]) -> CompanyProfile {
        CompanyProfile::new(CompanyCode::new(code).unwrap(), format!("Company {code}"))
            .with_fingerprint(fingerprint.iter().copied())
    }

    #[test]
    fn ratio_ignores_duplicates() {
        let headers = HeaderSet::new(["a", "b"]);
        assert_eq!(match_ratio(&["a", "A ", "b", "c"], &headers), Some(2.0 / 3.0));
        assert_eq!(match_ratio::<&str>(&[], &headers), None);
    }

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(FingerprintMatcher::new().with_threshold(1.5).threshold(), 1.0);
        assert!(FingerprintMatcher::new().with_threshold(-1.0).threshold() > 0.0);
        assert_eq!(
            FingerprintMatcher::new().with_threshold(f64::NAN).threshold(),
            CONFIDENT_MATCH_THRESHOLD
        );
    }

    #[test]
    fn best_ratio_prefers_higher_overlap() {
        let catalog = vec![
            profile("AA", &["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]),
            profile("BB", &["a", "b", "c"]),
        ];
        let headers = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];

        let first = FingerprintMatcher::new().find_match(&headers, &catalog);
        assert_eq!(first.unwrap().code.as_str(), "AA");

        let best = FingerprintMatcher::new()
            .with_policy(SelectionPolicy::BestRatio)
            .find_match(&headers, &catalog);
        assert_eq!(best.unwrap().code.as_str(), "BB");
    }

    #[test]
    fn best_ratio_ties_keep_catalog_order() {
        let catalog = vec![profile("AA", &["a"]), profile("BB", &["b"])];
        let matched = FingerprintMatcher::new()
            .with_policy(SelectionPolicy::BestRatio)
            .find_match(&["a", "b"], &catalog);
        assert_eq!(matched.unwrap().code.as_str(), "AA");
    }

    #[test]
    fn explain_lists_missing_headers() {
        let catalog = vec![profile("AA", &["Address", "City"])];
        let scores = FingerprintMatcher::new().score_catalog(&["address"], &catalog);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].explain(), "AA (Company AA): 1/2 headers, 50%; missing: city");
    }
}
