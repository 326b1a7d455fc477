use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use uuid::Uuid;

/// A user-owned label a recipe can be linked to. Tags and ingredients share
/// the same shape and storage layout, differing only in table names.
pub trait Attribute: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static {
    /// Table holding the attribute rows.
    const TABLE: &'static str;
    /// Join table linking recipes to this attribute.
    const LINK_TABLE: &'static str;
    /// Column in `LINK_TABLE` referencing `TABLE`.
    const LINK_COLUMN: &'static str;
    /// Human-readable singular, used in error messages.
    const LABEL: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Tag {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
}

impl Attribute for Tag {
    const TABLE: &'static str = "tags";
    const LINK_TABLE: &'static str = "recipe_tags";
    const LINK_COLUMN: &'static str = "tag_id";
    const LABEL: &'static str = "Tag";
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Ingredient {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub name: String,
}

impl Attribute for Ingredient {
    const TABLE: &'static str = "ingredients";
    const LINK_TABLE: &'static str = "recipe_ingredients";
    const LINK_COLUMN: &'static str = "ingredient_id";
    const LABEL: &'static str = "Ingredient";
}
