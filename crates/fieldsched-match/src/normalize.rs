//! Header normalization shared by matching and mapping preview.

use std::collections::BTreeSet;

/// Lower-case and trim a header. Internal whitespace and punctuation are kept
/// as-is, so `"Claim  No."` and `"claim no."` stay distinct.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalized, de-duplicated header set. Blank headers are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet(BTreeSet<String>);

impl HeaderSet {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            headers
                .into_iter()
                .map(|header| normalize_header(header.as_ref()))
                .filter(|header| !header.is_empty())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.0.contains(normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of entries present in both sets.
    pub fn overlap(&self, other: &HeaderSet) -> usize {
        self.0.intersection(&other.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_edges_only() {
        assert_eq!(normalize_header("  Claim Number "), "claim number");
        assert_eq!(normalize_header("ADDRESS\t"), "address");
        assert_eq!(normalize_header("Zip  Code"), "zip  code");
        assert_eq!(normalize_header("Policy #"), "policy #");
    }

    #[test]
    fn set_dedupes_after_normalization() {
        let set = HeaderSet::new(["Address", "address ", " ADDRESS", "City", ""]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("address"));
        assert!(set.contains("city"));
    }

    #[test]
    fn overlap_counts_shared_entries() {
        let a = HeaderSet::new(["a", "b", "c"]);
        let b = HeaderSet::new(["B", "c", "d"]);
        assert_eq!(a.overlap(&b), 2);
    }
}
