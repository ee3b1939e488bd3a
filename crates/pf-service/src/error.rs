use pf_core::CoreError;
use pf_spatial::BuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("graph build failed: {0}")]
    Build(#[from] BuildError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
