pub mod account;
pub mod code;
pub mod error;
pub mod profile;
pub mod workflow;

pub use account::{AuthState, PortalSession, Session, Subscription};
pub use code::{CompanyCode, MAX_COMPANY_CODE_LEN};
pub use error::{ModelError, Result};
pub use profile::{AppointmentType, CompanyProfile, DurationDefaults, ProfileUpsert};
pub use workflow::{IngestionRequest, RouteQuery, WorkflowResponse};
