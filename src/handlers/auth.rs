use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::auth::TokenResponse;
use crate::errors::AppError;

use super::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// `POST /auth/login`.
async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<TokenResponse>, AppError> {
    request.validate()?;
    let token = state.auth.login(&request.username, &request.password).await?;
    Ok(Json(token))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}
