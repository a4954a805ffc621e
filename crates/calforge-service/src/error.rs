use thiserror::Error;

/// Errors that abort a whole generation run.
///
/// Problems confined to one event are reported as
/// [`SkipReason`](crate::calendar::SkipReason) instead.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid input shape: {0}")]
    InvalidInputShape(String),

    #[error("Unresolvable timezone: {0}")]
    UnresolvableTimezone(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
