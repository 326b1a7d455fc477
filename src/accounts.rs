//! User registration and credential checks.

use std::sync::LazyLock;

use regex::Regex;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::db;
use crate::error::{unique_violation, AppError};
use crate::models::User;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

const DUPLICATE_EMAIL: &str = "user with this email already exists.";

/// Emails are stored trimmed and lowercased so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() {
        return Err(AppError::BadRequest("Users must have an email address".to_string()));
    }
    if email.len() > 255 || !EMAIL_RE.is_match(email) {
        return Err(AppError::BadRequest("Enter a valid email address.".to_string()));
    }
    Ok(())
}

/// Fields a user may change on their own profile. `None` leaves a field as is.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<User, AppError> {
    insert_user(pool, email, password, name.unwrap_or(""), false).await
}

pub async fn create_superuser(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    insert_user(pool, email, password, "", true).await
}

async fn insert_user(
    pool: &PgPool,
    email: &str,
    raw_password: &str,
    name: &str,
    elevated: bool,
) -> Result<User, AppError> {
    let email = normalize_email(email);
    validate_email(&email)?;

    let pw_hash = password::hash(raw_password).map_err(AppError::Internal)?;

    db::users::create(pool, &email, &pw_hash, name.trim(), elevated, elevated)
        .await
        .map_err(|e| unique_violation(e, DUPLICATE_EMAIL))
}

/// Looks a user up by email and checks the password. Unknown emails,
/// inactive accounts and wrong passwords are reported identically.
pub async fn verify_credentials(
    pool: &PgPool,
    email: &str,
    raw_password: &str,
) -> Result<User, AppError> {
    let invalid = || {
        AppError::Unauthorized("Unable to authenticate with provided credentials".to_string())
    };

    let user = db::users::find_by_email(pool, &normalize_email(email))
        .await?
        .ok_or_else(invalid)?;

    let valid = password::verify(raw_password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid || !user.is_active {
        return Err(invalid());
    }

    Ok(user)
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    changes: ProfileChanges,
) -> Result<User, AppError> {
    let email = match changes.email {
        Some(raw) => {
            let email = normalize_email(&raw);
            validate_email(&email)?;
            Some(email)
        }
        None => None,
    };

    let pw_hash = match changes.password {
        Some(raw) => {
            password::validate(&raw).map_err(AppError::BadRequest)?;
            Some(password::hash(&raw).map_err(AppError::Internal)?)
        }
        None => None,
    };

    let name = changes.name.as_deref().map(str::trim);

    db::users::update_profile(pool, user_id, email.as_deref(), name, pw_hash.as_deref())
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("User not found".to_string()),
            e => unique_violation(e, DUPLICATE_EMAIL),
        })
}

/// Creates the configured administrative account unless that email is taken.
pub async fn ensure_superuser(pool: &PgPool, email: &str, password: &str) -> Result<(), AppError> {
    if db::users::find_by_email(pool, &normalize_email(email)).await?.is_some() {
        tracing::debug!("Superuser {email} already exists");
        return Ok(());
    }

    let user = create_superuser(pool, email, password).await?;
    tracing::info!(user_id = %user.id, "Created superuser {}", user.email);
    Ok(())
}
