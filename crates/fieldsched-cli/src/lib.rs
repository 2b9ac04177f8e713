//! Library side of the `fieldsched` command-line client.

pub mod config;
pub mod detect;
pub mod logging;
pub mod session;

/// Command finished.
pub const EXIT_OK: i32 = 0;
/// Command failed.
pub const EXIT_FAILED: i32 = 1;
/// `detect` found no confident profile for at least one file.
pub const EXIT_NO_MATCH: i32 = 2;
