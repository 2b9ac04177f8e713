//! Clients for the services `fieldsched` talks to: the hosted profile store,
//! the hosted auth provider, the payments functions and the external
//! workflow service.
//!
//! All clients are blocking and share [`HttpSettings`]. Failures surface as
//! [`ServiceError`]; nothing is retried.

pub mod auth;
pub mod error;
pub mod http;
pub mod payments;
pub mod store;
pub mod workflow;

pub use auth::AuthClient;
pub use error::{Result, ServiceError};
pub use http::{DEFAULT_TIMEOUT, HttpSettings};
pub use payments::{PaymentsClient, PaymentsProvider};
pub use store::RestProfileStore;
pub use workflow::{WorkflowClient, WorkflowService};
