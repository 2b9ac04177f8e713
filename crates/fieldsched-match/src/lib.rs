#![deny(unsafe_code)]

//! Company-profile detection for uploaded inspection exports.

pub mod mapping;
pub mod matcher;
pub mod normalize;

pub use mapping::{MappedColumn, MappingPreview, preview_mappings};
pub use matcher::{
    CONFIDENT_MATCH_THRESHOLD, FingerprintMatcher, ProfileScore, SelectionPolicy, detect_profile,
    match_ratio,
};
pub use normalize::{HeaderSet, normalize_header};
