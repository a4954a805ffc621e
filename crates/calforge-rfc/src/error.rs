use thiserror::Error;

/// RFC modelling errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}
