//! Links between a recipe and its tags, ingredients and image.

use bytes::Bytes;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Attribute, Ingredient, Tag};
use crate::state::AppState;

pub async fn set_tags(
    conn: &mut PgConnection,
    owner_id: Uuid,
    recipe_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), AppError> {
    set_attributes::<Tag>(conn, owner_id, recipe_id, tag_ids).await
}

pub async fn set_ingredients(
    conn: &mut PgConnection,
    owner_id: Uuid,
    recipe_id: Uuid,
    ingredient_ids: &[Uuid],
) -> Result<(), AppError> {
    set_attributes::<Ingredient>(conn, owner_id, recipe_id, ingredient_ids).await
}

/// Replaces the recipe's links of kind `A`. Every id must name an attribute
/// owned by `owner_id`; otherwise nothing is written.
async fn set_attributes<A: Attribute>(
    conn: &mut PgConnection,
    owner_id: Uuid,
    recipe_id: Uuid,
    ids: &[Uuid],
) -> Result<(), AppError> {
    let mut wanted = ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    if !wanted.is_empty() {
        let owned = db::attributes::owned_ids::<A, _>(&mut *conn, owner_id, &wanted).await?;
        if let Some(missing) = ids.iter().find(|id| !owned.contains(id)) {
            return Err(AppError::BadRequest(format!(
                "Invalid pk \"{missing}\" - {} does not exist.",
                A::LABEL.to_lowercase()
            )));
        }
    }

    db::recipes::set_links::<A>(conn, recipe_id, &wanted).await?;
    Ok(())
}

/// Validates and stores an uploaded image for a recipe, replacing any
/// previous one. Returns the public URL of the stored file.
pub async fn attach_image(
    state: &AppState,
    owner_id: Uuid,
    recipe_id: Uuid,
    data: Bytes,
) -> Result<String, AppError> {
    let format = crate::media::validate_image(data.clone()).await?;
    let relative = state.media.save_recipe_image(&data, format).await?;

    let previous =
        match db::recipes::replace_image(&state.pool, recipe_id, owner_id, &relative).await {
            Ok(Some(previous)) => previous,
            Ok(None) => {
                state.media.remove(&relative).await;
                return Err(AppError::NotFound("Recipe not found".to_string()));
            }
            Err(e) => {
                state.media.remove(&relative).await;
                return Err(e.into());
            }
        };

    if let Some(previous) = previous.as_deref() {
        if previous != relative {
            state.media.remove(previous).await;
        }
    }

    tracing::info!(recipe_id = %recipe_id, "Stored recipe image {relative}");
    Ok(state.media.url_for(&relative))
}
