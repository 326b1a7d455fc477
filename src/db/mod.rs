pub mod attributes;
pub mod auth_tokens;
pub mod recipes;
pub mod users;
