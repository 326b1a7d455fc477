pub mod attribute;
pub mod auth_token;
pub mod recipe;
pub mod user;

pub use attribute::{Attribute, Ingredient, Tag};
pub use auth_token::AuthToken;
pub use recipe::Recipe;
pub use user::User;
