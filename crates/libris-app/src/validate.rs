use std::fmt::{Display, Formatter};
use std::ops::Deref;

use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::{Report, Validate};
use http::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

/// JSON body extractor, malformed bodies are rejected with [`ApiError::Payload`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct Payload<T>(pub T);

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extractor running garde validation on the payload of the inner extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Garde<E>(pub E);

impl<E> Deref for Garde<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<E> Garde<E> {
    pub fn into_inner(self) -> E {
        self.0
    }
}

#[derive(Debug)]
pub enum GardeRejection<E> {
    /// Payload was parsed but failed validation
    Valid(Report),
    /// Inner extractor failed
    Inner(E),
}

impl<E: Display> Display for GardeRejection<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GardeRejection::Valid(errors) => write!(f, "{errors}"),
            GardeRejection::Inner(error) => write!(f, "{error}"),
        }
    }
}

#[derive(Serialize)]
struct InvalidPath {
    field: String,
    message: String,
}

impl<E: IntoResponse> IntoResponse for GardeRejection<E> {
    fn into_response(self) -> Response {
        match self {
            GardeRejection::Valid(report) => {
                let fields: Vec<InvalidPath> = report
                    .iter()
                    .map(|(path, error)| InvalidPath {
                        field: path.to_string(),
                        message: error.to_string(),
                    })
                    .collect();
                let body = ErrorBody {
                    message: format!("Validation failed: {}", report.to_string().trim()),
                    code: "VALIDATION_FAILED",
                    fields: Some(fields.as_slice()),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            GardeRejection::Inner(e) => e.into_response(),
        }
    }
}

impl<Extractor, T> FromRequest<AppState> for Garde<Extractor>
where
    T: Validate<Context = ()>,
    Extractor: Deref<Target = T> + FromRequest<AppState>,
{
    type Rejection = GardeRejection<<Extractor as FromRequest<AppState>>::Rejection>;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let inner = Extractor::from_request(req, state)
            .await
            .map_err(GardeRejection::Inner)?;

        inner.deref().validate().map_err(|report| {
            debug!("Payload rejected: {report}");
            GardeRejection::Valid(report)
        })?;
        Ok(Garde(inner))
    }
}
