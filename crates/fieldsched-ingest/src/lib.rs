//! Reading inspection exports far enough to classify them.
//!
//! Only the header row is extracted here; parsing the full export is the
//! ingestion workflow's job.

pub mod discovery;
pub mod error;
pub mod header;
pub mod kind;

pub use discovery::discover_spreadsheets;
pub use error::{IngestError, Result};
pub use header::{HeaderRow, read_csv_headers_from_reader, read_headers};
pub use kind::SpreadsheetKind;
