//! Handlers shared by `/recipe/tags` and `/recipe/ingredients`, instantiated
//! per attribute type in the router.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::Attribute;
use crate::state::SharedState;

const MAX_NAME_LENGTH: usize = 255;

#[derive(Deserialize)]
pub struct AttributeQuery {
    pub assigned_only: Option<String>,
}

#[derive(Deserialize)]
pub struct AttributeRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct PatchAttributeRequest {
    pub name: Option<String>,
}

/// Interprets a boolean query flag: integers (non-zero is true) or
/// `true`/`false`. Absent or empty means false.
pub fn parse_flag(raw: Option<&str>) -> Result<bool, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(false);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => other
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| AppError::BadRequest(format!("Invalid boolean flag: {raw}"))),
    }
}

/// Trims a name or title and enforces the non-blank and length rules.
pub fn validate_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("This field may not be blank.".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Ensure this field has no more than {MAX_NAME_LENGTH} characters."
        )));
    }
    Ok(name.to_string())
}

fn not_found<A: Attribute>() -> AppError {
    AppError::NotFound(format!("{} not found", A::LABEL))
}

pub async fn list<A: Attribute>(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<AttributeQuery>,
) -> Result<Json<Vec<A>>, AppError> {
    let assigned_only = parse_flag(query.assigned_only.as_deref())?;
    let items = db::attributes::list::<A>(&state.pool, auth.user_id, assigned_only).await?;
    Ok(Json(items))
}

pub async fn create<A: Attribute>(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<AttributeRequest>,
) -> Result<(StatusCode, Json<A>), AppError> {
    let name = validate_name(&req.name)?;
    let item = db::attributes::create::<A>(&state.pool, auth.user_id, &name).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get<A: Attribute>(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<A>, AppError> {
    let item = db::attributes::find_by_id::<A>(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(not_found::<A>)?;
    Ok(Json(item))
}

pub async fn update<A: Attribute>(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AttributeRequest>,
) -> Result<Json<A>, AppError> {
    let name = validate_name(&req.name)?;
    let item = db::attributes::update::<A>(&state.pool, id, auth.user_id, &name)
        .await?
        .ok_or_else(not_found::<A>)?;
    Ok(Json(item))
}

pub async fn patch<A: Attribute>(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PatchAttributeRequest>,
) -> Result<Json<A>, AppError> {
    let item = match req.name {
        Some(raw) => {
            let name = validate_name(&raw)?;
            db::attributes::update::<A>(&state.pool, id, auth.user_id, &name).await?
        }
        None => db::attributes::find_by_id::<A>(&state.pool, id, auth.user_id).await?,
    };
    Ok(Json(item.ok_or_else(not_found::<A>)?))
}

pub async fn delete<A: Attribute>(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let removed = db::attributes::delete::<A>(&state.pool, id, auth.user_id).await?;
    if removed == 0 {
        return Err(not_found::<A>());
    }
    Ok(StatusCode::NO_CONTENT)
}
