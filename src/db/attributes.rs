//! Owner-scoped storage shared by tags and ingredients. Table names come from
//! the [`Attribute`] constants, never from user input.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Attribute;

/// Lists the owner's attributes, newest name first. With `assigned_only`,
/// keeps only those linked to at least one of the owner's recipes.
pub async fn list<A: Attribute>(
    pool: &PgPool,
    user_id: Uuid,
    assigned_only: bool,
) -> Result<Vec<A>, sqlx::Error> {
    let sql = format!(
        "SELECT a.* FROM {table} a
         WHERE a.user_id = $1
           AND (NOT $2 OR EXISTS (
               SELECT 1 FROM {link} l
               JOIN recipes r ON r.id = l.recipe_id
               WHERE l.{column} = a.id AND r.user_id = $1
           ))
         ORDER BY a.name DESC, a.id DESC",
        table = A::TABLE,
        link = A::LINK_TABLE,
        column = A::LINK_COLUMN,
    );
    sqlx::query_as::<_, A>(&sql)
        .bind(user_id)
        .bind(assigned_only)
        .fetch_all(pool)
        .await
}

pub async fn create<A: Attribute>(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
) -> Result<A, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (id, user_id, name) VALUES ($1, $2, $3) RETURNING *",
        A::TABLE
    );
    sqlx::query_as::<_, A>(&sql)
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id<A: Attribute>(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<A>, sqlx::Error> {
    let sql = format!("SELECT * FROM {} WHERE id = $1 AND user_id = $2", A::TABLE);
    sqlx::query_as::<_, A>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Returns `None` when the row is absent or owned by someone else.
pub async fn update<A: Attribute>(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    name: &str,
) -> Result<Option<A>, sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
        A::TABLE
    );
    sqlx::query_as::<_, A>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Returns the number of rows removed (0 when absent or not owned).
pub async fn delete<A: Attribute>(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", A::TABLE);
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Of the given ids, returns those that exist and belong to `user_id`.
pub async fn owned_ids<'e, A: Attribute, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, sqlx::Error> {
    let sql = format!(
        "SELECT id FROM {} WHERE user_id = $1 AND id = ANY($2)",
        A::TABLE
    );
    sqlx::query_scalar::<_, Uuid>(&sql)
        .bind(user_id)
        .bind(ids)
        .fetch_all(executor)
        .await
}

/// Attributes linked to a single recipe, in name order.
pub async fn list_for_recipe<A: Attribute>(
    pool: &PgPool,
    recipe_id: Uuid,
) -> Result<Vec<A>, sqlx::Error> {
    let sql = format!(
        "SELECT a.* FROM {table} a
         JOIN {link} l ON l.{column} = a.id
         WHERE l.recipe_id = $1
         ORDER BY a.name, a.id",
        table = A::TABLE,
        link = A::LINK_TABLE,
        column = A::LINK_COLUMN,
    );
    sqlx::query_as::<_, A>(&sql)
        .bind(recipe_id)
        .fetch_all(pool)
        .await
}
