use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub media_root: PathBuf,
    pub media_url: String,
    pub max_upload_size: usize,
    pub log_level: String,
    pub superuser: Option<SuperuserConfig>,
}

/// Credentials for the administrative account created at startup.
#[derive(Debug, Clone)]
pub struct SuperuserConfig {
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("RECIPE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid RECIPE_HOST: {e}"))?;

        let port: u16 = env_or("RECIPE_PORT", "8000")
            .parse()
            .map_err(|e| format!("Invalid RECIPE_PORT: {e}"))?;

        let base_url = env_or("RECIPE_BASE_URL", &format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let media_root = PathBuf::from(env_or("RECIPE_MEDIA_ROOT", "media"));

        let media_url = normalize_media_url(&env_or("RECIPE_MEDIA_URL", "/media"))?;

        let max_upload_size: usize = env_or("RECIPE_MAX_UPLOAD_SIZE", "5242880")
            .parse()
            .map_err(|e| format!("Invalid RECIPE_MAX_UPLOAD_SIZE: {e}"))?;

        let log_level = env_or("RECIPE_LOG_LEVEL", "info");

        let superuser = match (
            std::env::var("RECIPE_SUPERUSER_EMAIL").ok(),
            std::env::var("RECIPE_SUPERUSER_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) => Some(SuperuserConfig { email, password }),
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            base_url,
            media_root,
            media_url,
            max_upload_size,
            log_level,
            superuser,
        })
    }
}

/// Media URLs are mounted as a router prefix, so they need a leading slash
/// and no trailing one.
fn normalize_media_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "/" {
        return Err("Invalid RECIPE_MEDIA_URL: must not be the site root".to_string());
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
