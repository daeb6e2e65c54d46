use axum::{
    extract::{FromRequestParts, Request},
    middleware::Next,
    response::Response,
    RequestPartsExt,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use http::request::Parts;
use libris_types::claim::ApiClaim;
use tracing::debug;

use crate::{error::ApiError, state::AppState};

impl FromRequestParts<AppState> for ApiClaim {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                debug!("No bearer token: {e}");
                ApiError::Unauthorized("Missing or malformed bearer token".to_string())
            })?;

        state
            .tokens()
            .validate::<ApiClaim>(bearer.token())
            .map_err(|e| {
                if e.is_expired() {
                    ApiError::Unauthorized("Token expired".to_string())
                } else {
                    ApiError::Unauthorized("Invalid token".to_string())
                }
            })
    }
}

/// Lets through only requests carrying a valid access token, the claim is
/// then available to handlers as a request extension.
pub async fn require_token(claim: ApiClaim, mut request: Request, next: Next) -> Response {
    debug!(account = %claim.sub, "Authorized request");
    request.extensions_mut().insert(claim);
    next.run(request).await
}
