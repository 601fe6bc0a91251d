use thiserror::Error;

/// Failure modes of the game service boundary.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServiceError {
    #[error("game service is unreachable")]
    ServiceUnavailable,
    #[error("game service returned an unexpected payload")]
    InvalidResponseShape,
    #[error("game session is no longer known to the service")]
    SessionNotFound,
    #[error("move was rejected by the game service")]
    InvalidMove,
}

pub type Result<T> = core::result::Result<T, ServiceError>;
