use axum::{
    extract::State,
    response::IntoResponse,
    routing::{patch, post},
    Json,
};
use http::StatusCode;
use libris_dal::{
    account::{Account, AccountRepository, ChangePassword, CreateAccount, Credentials},
    messages,
};
use libris_types::claim::ApiClaim;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::ApiResult,
    repository_from_request,
    state::AppState,
    validate::{Garde, Payload},
};

pub mod token;

repository_from_request!(AccountRepository);

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGranted {
    pub access_token: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChanged {
    pub access_token: String,
    pub message: String,
}

fn issue_token(state: &AppState, account: &Account) -> ApiResult<String> {
    let claim = ApiClaim::new_expired(
        account.id.to_string(),
        account.display_name(),
        [account.role.as_str()],
    );
    let token = state.tokens().issue(claim)?;
    Ok(token)
}

pub async fn login(
    State(state): State<AppState>,
    accounts: AccountRepository,
    Garde(Payload(credentials)): Garde<Payload<Credentials>>,
) -> ApiResult<impl IntoResponse> {
    let account = accounts
        .check_password(credentials.email.as_ref(), &credentials.password)
        .await?;
    debug!(account = account.id, "Login succeeded");
    let access_token = issue_token(&state, &account)?;
    Ok(Json(AccessGranted {
        access_token,
        id: account.id,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    accounts: AccountRepository,
    Garde(Payload(payload)): Garde<Payload<CreateAccount>>,
) -> ApiResult<impl IntoResponse> {
    let account = accounts.create(payload).await?;
    let access_token = issue_token(&state, &account)?;
    Ok((
        StatusCode::CREATED,
        Json(AccessGranted {
            access_token,
            id: account.id,
        }),
    ))
}

pub async fn change_password(
    State(state): State<AppState>,
    accounts: AccountRepository,
    Garde(Payload(payload)): Garde<Payload<ChangePassword>>,
) -> ApiResult<impl IntoResponse> {
    let account = accounts.change_password(&payload).await?;
    let access_token = issue_token(&state, &account)?;
    Ok(Json(PasswordChanged {
        access_token,
        message: messages::PASSWORD_CHANGED.to_string(),
    }))
}

/// Builds authentication router - must be nested on /auth path!
pub fn auth_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/change-password", patch(change_password))
}
