use crate::services::StoreError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
        }
    }
}

/// Failures a handler reports on purpose. Anything else reaching the
/// error catcher is treated as unhandled.
#[derive(Debug)]
pub enum ApiError {
    MissingFields,
    EmailTaken,
    Internal,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingFields => write!(f, "Name and email are required"),
            ApiError::EmailTaken => write!(f, "Email already exists"),
            ApiError::Internal => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey => ApiError::EmailTaken,
            StoreError::StoreUnavailable(_) => ApiError::Internal,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields => StatusCode::BAD_REQUEST,
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case(StoreError::DuplicateKey, StatusCode::CONFLICT)]
    #[case(StoreError::StoreUnavailable("down".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn store_errors_map_to_status(#[case] err: StoreError, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(err).status_code(), status);
    }

    #[actix_web::test]
    async fn internal_error_does_not_leak_details() {
        let response = ApiError::from(StoreError::StoreUnavailable("secret host".to_string()))
            .error_response();

        let body = to_bytes(response.into_body()).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(payload.error, "Internal server error");
    }

    #[actix_web::test]
    async fn missing_fields_is_bad_request() {
        let response = ApiError::MissingFields.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.error, "Name and email are required");
    }
}
