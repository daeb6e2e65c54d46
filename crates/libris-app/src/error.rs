use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use libris_dal::{Error as DalError, FieldError};
use serde::Serialize;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Dal(#[from] DalError),

    #[error("Token error: {0}")]
    Token(#[from] libris_auth::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid request body: {0}")]
    Payload(#[from] JsonRejection),
}

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Serialize)]
pub(crate) struct ErrorBody<'a, F: Serialize> {
    pub message: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<&'a [F]>,
}

const INTERNAL_ERROR: &str = "Internal Server Error - An unexpected error occurred.";
const SERVICE_UNAVAILABLE: &str =
    "Service Unavailable - Unable to connect to the database.";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut fields: Option<&[FieldError]> = None;
        let (status, code, message) = match &self {
            ApiError::Dal(err) => match err {
                DalError::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
                }
                DalError::InvalidField(field) => {
                    fields = Some(std::slice::from_ref(field));
                    (StatusCode::BAD_REQUEST, "INVALID_FIELD", field.to_string())
                }
                DalError::InvalidFields(invalid) => {
                    fields = Some(invalid.as_slice());
                    (StatusCode::BAD_REQUEST, "INVALID_FIELDS", err.to_string())
                }
                DalError::NoFieldsProvided => (
                    StatusCode::BAD_REQUEST,
                    "NO_FIELDS_PROVIDED",
                    "No fields provided - The request must contain at least one field to update."
                        .to_string(),
                ),
                DalError::InvalidOperation(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_OPERATION", msg.clone())
                }
                DalError::InvalidCredentials => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_CREDENTIALS",
                    "Invalid Credentials".to_string(),
                ),
                DalError::RecordNotFound(msg) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
                }
                DalError::AlreadyExists(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                DalError::Unavailable(e) => {
                    error!(error = %e, "Database unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "UNAVAILABLE",
                        SERVICE_UNAVAILABLE.to_string(),
                    )
                }
                DalError::Contended(msg) => {
                    error!("Contention: {msg}");
                    (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg.clone())
                }
                DalError::MultipleMatched(msg) => {
                    error!("Uniqueness violated: {msg}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MULTIPLE_MATCHED",
                        format!("Server Error - {msg}"),
                    )
                }
                DalError::DatabaseError(_) | DalError::UserPasswordError(_) => {
                    error!(error = %err, "Internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_ERROR.to_string(),
                    )
                }
            },
            ApiError::Token(err) => {
                error!(error = %err, "Token error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_ERROR.to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Payload(rejection) => {
                (rejection.status(), "INVALID_BODY", rejection.body_text())
            }
        };

        let body = ErrorBody {
            message,
            code,
            fields,
        };

        (status, Json(body)).into_response()
    }
}
