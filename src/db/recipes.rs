use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{Attribute, Recipe};

/// Narrows a recipe listing to recipes linked to any of the given tags and
/// any of the given ingredients. Empty lists do not filter.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    filter: &RecipeFilter,
) -> Result<Vec<Recipe>, sqlx::Error> {
    sqlx::query_as::<_, Recipe>(
        "SELECT r.* FROM recipes r
         WHERE r.user_id = $1
           AND (cardinality($2::uuid[]) = 0 OR EXISTS (
               SELECT 1 FROM recipe_tags rt
               WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)
           ))
           AND (cardinality($3::uuid[]) = 0 OR EXISTS (
               SELECT 1 FROM recipe_ingredients ri
               WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)
           ))
         ORDER BY r.id DESC",
    )
    .bind(user_id)
    .bind(filter.tags.as_slice())
    .bind(filter.ingredients.as_slice())
    .fetch_all(pool)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Recipe>, sqlx::Error> {
    sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    title: &str,
    time_minutes: i32,
    price: Decimal,
) -> Result<Recipe, sqlx::Error> {
    sqlx::query_as::<_, Recipe>(
        "INSERT INTO recipes (id, user_id, title, time_minutes, price)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(title)
    .bind(time_minutes)
    .bind(price)
    .fetch_one(executor)
    .await
}

/// Replaces the scalar fields. Returns `None` when absent or not owned.
pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    user_id: Uuid,
    title: &str,
    time_minutes: i32,
    price: Decimal,
) -> Result<Option<Recipe>, sqlx::Error> {
    sqlx::query_as::<_, Recipe>(
        "UPDATE recipes SET title = $3, time_minutes = $4, price = $5, updated_at = now()
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(time_minutes)
    .bind(price)
    .fetch_optional(executor)
    .await
}

/// Points the recipe at a new image and returns the path it replaced. The
/// row is locked while the old path is read, so concurrent uploads each see
/// their predecessor. Outer `None` when absent or not owned.
pub async fn replace_image(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    image: &str,
) -> Result<Option<Option<String>>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>(
        "WITH prev AS (
             SELECT id, image FROM recipes
             WHERE id = $1 AND user_id = $2
             FOR UPDATE
         )
         UPDATE recipes r SET image = $3, updated_at = now()
         FROM prev WHERE r.id = prev.id
         RETURNING prev.image",
    )
    .bind(id)
    .bind(user_id)
    .bind(image)
    .fetch_optional(pool)
    .await
}

/// Deletes and returns the removed row, so callers can clean up its image.
pub async fn delete(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Recipe>, sqlx::Error> {
    sqlx::query_as::<_, Recipe>("DELETE FROM recipes WHERE id = $1 AND user_id = $2 RETURNING *")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Replaces every link between `recipe_id` and attributes of kind `A`.
pub async fn set_links<A: Attribute>(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    let clear = format!("DELETE FROM {} WHERE recipe_id = $1", A::LINK_TABLE);
    sqlx::query(&clear)
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if ids.is_empty() {
        return Ok(());
    }

    let insert = format!(
        "INSERT INTO {} (recipe_id, {}) SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        A::LINK_TABLE,
        A::LINK_COLUMN
    );
    sqlx::query(&insert)
        .bind(recipe_id)
        .bind(ids)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// `(recipe_id, attribute_id)` pairs for all given recipes.
pub async fn link_ids<A: Attribute>(
    pool: &PgPool,
    recipe_ids: &[Uuid],
) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
    let sql = format!(
        "SELECT recipe_id, {column} FROM {link} WHERE recipe_id = ANY($1) ORDER BY {column}",
        column = A::LINK_COLUMN,
        link = A::LINK_TABLE,
    );
    sqlx::query_as::<_, (Uuid, Uuid)>(&sql)
        .bind(recipe_ids)
        .fetch_all(pool)
        .await
}
