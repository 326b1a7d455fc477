use std::collections::HashMap;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::association;
use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::recipes::RecipeFilter;
use crate::error::AppError;
use crate::extract::{Body, Json, Path, Query};
use crate::media::{self, MediaStore};
use crate::models::{Attribute, Ingredient, Recipe, Tag};
use crate::routes::attributes::validate_name;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RecipeQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

#[derive(Deserialize)]
pub struct RecipeRequest {
    pub title: String,
    pub time_minutes: i64,
    pub price: Decimal,
    #[serde(default)]
    pub tags: Vec<Uuid>,
    #[serde(default)]
    pub ingredients: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct PatchRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<Decimal>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

/// List/create/update representation: linked attributes as ids.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
    pub image: Option<String>,
}

/// Detail representation: linked attributes as full objects.
#[derive(Debug, Serialize)]
pub struct RecipeDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: Uuid,
    pub image: String,
}

/// Validated scalar fields of a recipe.
#[derive(Debug, PartialEq)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
}

impl RecipeFields {
    pub fn validate(title: &str, time_minutes: i64, price: Decimal) -> Result<Self, AppError> {
        let title = validate_name(title)?;

        let time_minutes = i32::try_from(time_minutes)
            .ok()
            .filter(|t| *t >= 0)
            .ok_or_else(|| {
                AppError::BadRequest(
                    "time_minutes: Ensure this value is greater than or equal to 0.".to_string(),
                )
            })?;

        if price.is_sign_negative() && !price.is_zero() {
            return Err(AppError::BadRequest(
                "price: Ensure this value is greater than or equal to 0.".to_string(),
            ));
        }
        if price.normalize().scale() > 2 {
            return Err(AppError::BadRequest(
                "price: Ensure that there are no more than 2 decimal places.".to_string(),
            ));
        }
        if price >= Decimal::ONE_THOUSAND {
            return Err(AppError::BadRequest(
                "price: Ensure that there are no more than 5 digits in total.".to_string(),
            ));
        }

        let mut price = price.abs();
        price.rescale(2);

        Ok(Self {
            title,
            time_minutes,
            price,
        })
    }
}

/// Parses a comma-separated list of ids from a query parameter.
pub fn parse_ids(raw: Option<&str>) -> Result<Vec<Uuid>, AppError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Uuid>()
                .map_err(|_| AppError::BadRequest(format!("Invalid id in filter: {s}")))
        })
        .collect()
}

fn not_found() -> AppError {
    AppError::NotFound("Recipe not found".to_string())
}

async fn group_links<A: Attribute>(
    pool: &PgPool,
    recipe_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, AppError> {
    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (recipe_id, attribute_id) in db::recipes::link_ids::<A>(pool, recipe_ids).await? {
        grouped.entry(recipe_id).or_default().push(attribute_id);
    }
    Ok(grouped)
}

async fn summarize(
    pool: &PgPool,
    media: &MediaStore,
    recipes: Vec<Recipe>,
) -> Result<Vec<RecipeResponse>, AppError> {
    let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let mut tags = group_links::<Tag>(pool, &ids).await?;
    let mut ingredients = group_links::<Ingredient>(pool, &ids).await?;

    Ok(recipes
        .into_iter()
        .map(|r| RecipeResponse {
            id: r.id,
            tags: tags.remove(&r.id).unwrap_or_default(),
            ingredients: ingredients.remove(&r.id).unwrap_or_default(),
            image: r.image.as_deref().map(|p| media.url_for(p)),
            title: r.title,
            time_minutes: r.time_minutes,
            price: r.price,
        })
        .collect())
}

async fn summarize_one(
    pool: &PgPool,
    media: &MediaStore,
    recipe: Recipe,
) -> Result<RecipeResponse, AppError> {
    summarize(pool, media, vec![recipe])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Recipe summary missing".to_string()))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let filter = RecipeFilter {
        tags: parse_ids(query.tags.as_deref())?,
        ingredients: parse_ids(query.ingredients.as_deref())?,
    };

    let recipes = db::recipes::list(&state.pool, auth.user_id, &filter).await?;
    let response = summarize(&state.pool, &state.media, recipes).await?;
    Ok(Json(response))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    let fields = RecipeFields::validate(&req.title, req.time_minutes, req.price)?;

    let mut tx = state.pool.begin().await?;
    let recipe = db::recipes::create(
        &mut *tx,
        auth.user_id,
        &fields.title,
        fields.time_minutes,
        fields.price,
    )
    .await?;
    association::set_tags(&mut tx, auth.user_id, recipe.id, &req.tags).await?;
    association::set_ingredients(&mut tx, auth.user_id, recipe.id, &req.ingredients).await?;
    tx.commit().await?;

    let response = summarize_one(&state.pool, &state.media, recipe).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let recipe = db::recipes::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(not_found)?;

    let tags = db::attributes::list_for_recipe::<Tag>(&state.pool, recipe.id).await?;
    let ingredients = db::attributes::list_for_recipe::<Ingredient>(&state.pool, recipe.id).await?;

    Ok(Json(RecipeDetailResponse {
        id: recipe.id,
        image: recipe.image.as_deref().map(|p| state.media.url_for(p)),
        title: recipe.title,
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        tags,
        ingredients,
    }))
}

/// Full update: links missing from the payload are cleared.
pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let fields = RecipeFields::validate(&req.title, req.time_minutes, req.price)?;

    let mut tx = state.pool.begin().await?;
    let recipe = db::recipes::update(
        &mut *tx,
        id,
        auth.user_id,
        &fields.title,
        fields.time_minutes,
        fields.price,
    )
    .await?
    .ok_or_else(not_found)?;
    association::set_tags(&mut tx, auth.user_id, recipe.id, &req.tags).await?;
    association::set_ingredients(&mut tx, auth.user_id, recipe.id, &req.ingredients).await?;
    tx.commit().await?;

    let response = summarize_one(&state.pool, &state.media, recipe).await?;
    Ok(Json(response))
}

/// Partial update: only fields present in the payload change.
pub async fn patch(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PatchRecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let mut tx = state.pool.begin().await?;
    let current = db::recipes::find_by_id(&mut *tx, id, auth.user_id)
        .await?
        .ok_or_else(not_found)?;

    let fields = RecipeFields::validate(
        req.title.as_deref().unwrap_or(&current.title),
        req.time_minutes.unwrap_or(i64::from(current.time_minutes)),
        req.price.unwrap_or(current.price),
    )?;

    let recipe = db::recipes::update(
        &mut *tx,
        id,
        auth.user_id,
        &fields.title,
        fields.time_minutes,
        fields.price,
    )
    .await?
    .ok_or_else(not_found)?;

    if let Some(tags) = &req.tags {
        association::set_tags(&mut tx, auth.user_id, recipe.id, tags).await?;
    }
    if let Some(ingredients) = &req.ingredients {
        association::set_ingredients(&mut tx, auth.user_id, recipe.id, ingredients).await?;
    }
    tx.commit().await?;

    let response = summarize_one(&state.pool, &state.media, recipe).await?;
    Ok(Json(response))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let recipe = db::recipes::delete(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(not_found)?;

    if let Some(image) = recipe.image.as_deref() {
        state.media.remove(image).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_image(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Body(body): Body,
) -> Result<Json<ImageResponse>, AppError> {
    let recipe = db::recipes::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(not_found)?;

    let data = media::read_multipart_field(&headers, body, "image").await?;
    let image = association::attach_image(&state, auth.user_id, recipe.id, data).await?;

    Ok(Json(ImageResponse {
        id: recipe.id,
        image,
    }))
}
