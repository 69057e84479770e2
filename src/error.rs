/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse through the shared envelope (response::send)
 * - StoreError is attached to the 500 body as {code, message}; auth failures stay opaque
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::repos::StoreError;
use crate::response::{Envelope, ErrorDetail, send};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(&'static str),
    /// A request the extractors could not take apart; keeps the extractor's status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("{message}: {source}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("User is not authorized to access this resource")]
    Forbidden,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn storage(message: &'static str, source: StoreError) -> Self {
        Self::Storage { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                send(StatusCode::BAD_REQUEST, Envelope::message_only(message))
            }
            AppError::NotFound(message) => {
                send(StatusCode::NOT_FOUND, Envelope::message_only(message))
            }
            AppError::Rejected { status, message } => send(status, Envelope::message_only(message)),
            AppError::Storage { message, source } => send(
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::<()> {
                    message: message.to_string(),
                    data: None,
                    error: Some(ErrorDetail {
                        code: source.code(),
                        message: source.to_string(),
                    }),
                },
            ),
            AppError::Unauthorized => send(
                StatusCode::UNAUTHORIZED,
                Envelope::message_only("Unauthorized"),
            ),
            AppError::Forbidden => send(
                StatusCode::FORBIDDEN,
                Envelope::message_only("User is not authorized to access this resource"),
            ),
            AppError::Internal => send(
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::message_only("internal server error"),
            ),
        }
    }
}
