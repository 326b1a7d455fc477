//! Uploaded image handling: multipart extraction, validation and storage
//! under the media root.

use std::path::{Path, PathBuf};

use axum::http::HeaderMap;
use bytes::Bytes;
use image::ImageFormat;
use uuid::Uuid;

use crate::error::AppError;

const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Directory, relative to the media root, that recipe images are written to.
const RECIPE_UPLOAD_DIR: &str = "uploads/recipe";

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str, media_url: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: format!("{}{}", base_url.trim_end_matches('/'), media_url),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL of a stored file.
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix, relative)
    }

    /// Writes an already validated image and returns its path relative to
    /// the media root.
    pub async fn save_recipe_image(
        &self,
        data: &[u8],
        format: ImageFormat,
    ) -> Result<String, AppError> {
        let ext = format.extensions_str().first().copied().unwrap_or("img");
        let relative = format!("{RECIPE_UPLOAD_DIR}/{}.{ext}", Uuid::now_v7());

        let dir = self.root.join(RECIPE_UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create {}: {e}", dir.display())))?;

        let path = self.root.join(&relative);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write {}: {e}", path.display())))?;

        Ok(relative)
    }

    /// Best-effort removal of a stored file. Failures are logged, not returned.
    pub async fn remove(&self, relative: &str) {
        if relative.split('/').any(|part| part == "..") {
            tracing::warn!("Refusing to remove media path outside root: {relative}");
            return;
        }

        let path = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove media file {}: {e}", path.display());
            }
        }
    }
}

/// Pulls the named file field out of a multipart body.
pub async fn read_multipart_field(
    headers: &HeaderMap,
    body: Bytes,
    field_name: &str,
) -> Result<Bytes, AppError> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| AppError::BadRequest("Missing multipart boundary".to_string()))?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some(field_name) {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Field read error: {e}")));
        }
    }

    Err(AppError::BadRequest(format!(
        "No file was submitted in the '{field_name}' field."
    )))
}

/// Checks that `data` is an image we can fully decode, returning its format.
pub async fn validate_image(data: Bytes) -> Result<ImageFormat, AppError> {
    tokio::task::spawn_blocking(move || decode(&data))
        .await
        .map_err(|e| AppError::Internal(format!("Image validation task failed: {e}")))?
        .map_err(|e| {
            tracing::debug!("Rejected upload: {e}");
            AppError::BadRequest(INVALID_IMAGE.to_string())
        })
}

fn decode(data: &[u8]) -> Result<ImageFormat, image::ImageError> {
    let format = image::guess_format(data)?;
    image::load_from_memory_with_format(data, format)?;
    Ok(format)
}
