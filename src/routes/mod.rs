pub mod attributes;
pub mod recipes;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::models::{Ingredient, Tag};
use crate::state::SharedState;

pub fn api_routes(max_upload_size: usize) -> Router<SharedState> {
    Router::new()
        // Users
        .route("/user/create", post(users::create))
        .route("/user/token", post(users::token))
        .route(
            "/user/me",
            get(users::me).put(users::replace_me).patch(users::update_me),
        )
        // Tags
        .route(
            "/recipe/tags",
            get(attributes::list::<Tag>).post(attributes::create::<Tag>),
        )
        .route(
            "/recipe/tags/{id}",
            get(attributes::get::<Tag>)
                .put(attributes::update::<Tag>)
                .patch(attributes::patch::<Tag>)
                .delete(attributes::delete::<Tag>),
        )
        // Ingredients
        .route(
            "/recipe/ingredients",
            get(attributes::list::<Ingredient>).post(attributes::create::<Ingredient>),
        )
        .route(
            "/recipe/ingredients/{id}",
            get(attributes::get::<Ingredient>)
                .put(attributes::update::<Ingredient>)
                .patch(attributes::patch::<Ingredient>)
                .delete(attributes::delete::<Ingredient>),
        )
        // Recipes
        .route("/recipe/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/recipe/recipes/{id}",
            get(recipes::get)
                .put(recipes::update)
                .patch(recipes::patch)
                .delete(recipes::delete),
        )
        .route(
            "/recipe/recipes/{id}/upload-image",
            post(recipes::upload_image).layer(DefaultBodyLimit::max(max_upload_size)),
        )
}
