//! User Routes

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};
use auth::NewUser;
use storage::UserRecord;

/// Create an account. Duplicate usernames are rejected outright.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(new_user): Json<NewUser>,
) -> Result<StatusCode, ApiError> {
    state.users.register(new_user)?;
    Ok(StatusCode::CREATED)
}

/// Form-encoded credentials, OAuth2 password-grant style.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state.users.authenticate(&form.username, &form.password)?;
    let access_token = state.tokens.issue(&user.username)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub disabled: bool,
}

/// Profile of the token's owner.
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Profile>, ApiError> {
    let user = current_user(&state, &headers)?;
    Ok(Json(Profile {
        username: user.username,
        email: user.email,
        full_name: user.full_name,
        disabled: user.disabled,
    }))
}

#[derive(Debug, Serialize)]
pub struct Item {
    pub item_id: String,
    pub owner: String,
}

/// Items owned by the token's owner.
pub async fn me_items(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Item>>, ApiError> {
    let user = current_user(&state, &headers)?;
    Ok(Json(vec![Item {
        item_id: "Foo".to_string(),
        owner: user.username,
    }]))
}

/// Resolve the bearer token to its account. The subject is looked up fresh
/// on every call, so account removal takes effect immediately even for
/// tokens that have not expired.
fn current_user(state: &AppState, headers: &HeaderMap) -> Result<UserRecord, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.tokens.verify(token)?;
    let user = state.users.lookup(&claims.sub)?;
    if user.disabled {
        return Err(ApiError::InactiveUser);
    }
    Ok(user)
}
