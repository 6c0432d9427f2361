use airport_catalog::{FieldErrors, ValidationError};
use airport_core::StoreError;
use airport_order::OrderError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    AuthorizationError(String),
    #[error("{message}")]
    ValidationError { message: String, fields: FieldErrors },
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    InternalServerError(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    fn field(message: String, field: &str) -> Self {
        AppError::ValidationError {
            fields: FieldErrors::single(field, message.clone()),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, fields) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::ValidationError { message, fields } => {
                (StatusCode::BAD_REQUEST, message, Some(fields))
            }
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
        };

        let body = match fields {
            Some(fields) if !fields.is_empty() => Json(json!({
                "error": error_message,
                "fields": fields,
            })),
            _ => Json(json!({
                "error": error_message,
            })),
        };

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError {
            fields: FieldErrors::single("body", rejection.body_text()),
            message: "Invalid request body".to_string(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError {
            fields: FieldErrors::single("query", rejection.body_text()),
            message: "Invalid query parameters".to_string(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError {
            fields: FieldErrors::single("path", rejection.body_text()),
            message: "Invalid path parameter".to_string(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError {
            message: err.to_string(),
            fields: err.fields().clone(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFoundError(err.to_string()),
            StoreError::DuplicateSeat { .. } => AppError::field(err.to_string(), "seat"),
            StoreError::Conflict { field, .. } => AppError::field(err.to_string(), field),
            StoreError::InvalidReference { field, .. } => AppError::field(err.to_string(), field),
            StoreError::Validation(err) => err.into(),
            StoreError::Backend(_) => AppError::Anyhow(anyhow::Error::new(err)),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyOrder => AppError::field(err.to_string(), "tickets"),
            OrderError::OutOfRange { ref fields, .. } => AppError::ValidationError {
                fields: fields.clone(),
                message: err.to_string(),
            },
            OrderError::DuplicateSeat { .. } => AppError::field(err.to_string(), "seat"),
            OrderError::NotFound { .. } => AppError::NotFoundError(err.to_string()),
            OrderError::Store(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_seat_maps_to_bad_request() {
        let err: AppError = StoreError::DuplicateSeat { flight: 1, row: 3, seat: 4 }.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_order_maps_to_not_found() {
        let err: AppError = OrderError::NotFound { entity: "order", id: 7 }.into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_backend_failure_is_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err: AppError = StoreError::backend(io).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
