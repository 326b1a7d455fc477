use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::accounts::{self, ProfileChanges};
use crate::auth::extractor::AuthUser;
use crate::auth::{password, token};
use crate::db;
use crate::error::AppError;
use crate::extract::Json;
use crate::models::User;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct ReplaceMeRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn create(
    State(state): State<SharedState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    password::validate(&req.password).map_err(AppError::BadRequest)?;

    let user =
        accounts::create_user(&state.pool, &req.email, &req.password, req.name.as_deref()).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn token(
    State(state): State<SharedState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = accounts::normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Must include \"email\" and \"password\".".to_string(),
        ));
    }

    if let Err(retry_after) = state.login_limiter.check(&email) {
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let user = match accounts::verify_credentials(&state.pool, &email, &req.password).await {
        Ok(user) => user,
        Err(AppError::Unauthorized(msg)) => {
            state.login_limiter.record_failure(&email);
            tracing::warn!("Failed token request for {email}");
            return Err(AppError::BadRequest(msg));
        }
        Err(e) => return Err(e),
    };

    state.login_limiter.reset(&email);
    let token = token::issue_token(&state.pool, &user).await?;

    Ok(Json(TokenResponse { token }))
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

pub async fn replace_me(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ReplaceMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let changes = ProfileChanges {
        email: Some(req.email),
        name: Some(req.name),
        password: Some(req.password),
    };
    let user = accounts::update_profile(&state.pool, auth.user_id, changes).await?;
    Ok(Json(user.into()))
}

pub async fn update_me(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let changes = ProfileChanges {
        email: req.email,
        name: req.name,
        password: req.password,
    };
    let user = accounts::update_profile(&state.pool, auth.user_id, changes).await?;

    if user.email != auth.email {
        tracing::info!(user_id = %user.id, "User changed email");
    }
    Ok(Json(user.into()))
}
