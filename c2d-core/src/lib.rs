pub mod enrollment;
pub mod order;
pub mod payment;
pub mod profile;
pub mod program;
pub mod repository;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Gateway error: {0}")]
    Gateway(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
