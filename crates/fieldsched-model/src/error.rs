use thiserror::Error;

/// Validation failures for model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid company code '{0}': expected 1-8 ASCII letters or digits")]
    InvalidCompanyCode(String),

    #[error("company name must not be empty")]
    EmptyCompanyName,

    #[error("{field} duration must be greater than zero")]
    InvalidDuration { field: &'static str },

    #[error("unknown appointment type '{0}'")]
    UnknownAppointmentType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
