use thiserror::Error;
use uuid::Uuid;

use crate::models::BookingStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("validation failed for {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("conflicting write on {collection} record {id}")]
    Conflict { collection: &'static str, id: Uuid },

    #[error("{collection} record {id} not found")]
    NotFound { collection: &'static str, id: Uuid },

    #[error("duplicate {collection} record {id}")]
    Duplicate { collection: &'static str, id: Uuid },

    #[error("actor {0} already owns a vendor profile")]
    AlreadyVendor(Uuid),

    #[error("booking {0} has already been reviewed")]
    AlreadyReviewed(Uuid),

    #[error("rating must be an integer between 1 and 5, got {0}")]
    InvalidRating(i32),

    #[error("booking {booking_id} is {status}, expected {expected}")]
    InvalidState {
        booking_id: Uuid,
        status: BookingStatus,
        expected: BookingStatus,
    },

    #[error("no actor is signed in")]
    Unauthenticated,

    #[error("{operation} partially completed, retry step '{step}': {source}")]
    Integrity {
        operation: &'static str,
        step: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Error::Forbidden(message.into())
    }
}
