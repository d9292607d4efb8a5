use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
    #[error("invalid order transition: {0}")]
    InvalidTransition(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u32 },
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DeliveryError {
    pub fn courier_not_found(id: u32) -> Self {
        Self::NotFound {
            entity: "courier",
            id,
        }
    }

    pub fn order_not_found(id: u32) -> Self {
        Self::NotFound { entity: "order", id }
    }
}

pub type Result<T> = std::result::Result<T, DeliveryError>;
