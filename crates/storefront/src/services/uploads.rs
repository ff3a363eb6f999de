//! Product image files.
//!
//! Files live under `<uploads_dir>/products/<product_id>/` and are referenced
//! from the database by a relative URL starting with `uploads/`, which is also
//! the path they are served from.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use kedai_core::ProductId;

/// URL prefix under which uploaded files are served.
pub const URL_PREFIX: &str = "uploads/";

const MAX_FILENAME_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum UploadError {
    /// The stored URL does not point inside the uploads directory.
    #[error("invalid upload path: {0}")]
    InvalidPath(String),

    #[error("file i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem store for uploaded images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Write an uploaded file and return its public relative URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the directory or file cannot be written.
    pub async fn save(
        &self,
        product_id: ProductId,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let relative = format!(
            "products/{product_id}/{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(original_name)
        );
        let path = self.root.join(&relative);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Image stored");
        Ok(format!("{URL_PREFIX}{relative}"))
    }

    /// Delete the file behind a stored URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidPath` for URLs outside the store and
    /// `UploadError::Io` if the file cannot be removed.
    pub async fn remove(&self, url: &str) -> Result<(), UploadError> {
        let path = self.resolve(url)?;
        tokio::fs::remove_file(path).await?;
        Ok(())
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, UploadError> {
        let relative = url
            .strip_prefix(URL_PREFIX)
            .ok_or_else(|| UploadError::InvalidPath(url.to_owned()))?;
        let relative = Path::new(relative);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(UploadError::InvalidPath(url.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

/// Reduce a client-supplied filename to `[A-Za-z0-9._-]`.
///
/// Any directory part is dropped, other characters become `_`, leading dots
/// are stripped so the result is never hidden or `..`, and an empty result
/// becomes `image`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_owned()
    } else {
        cleaned.to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("latte art.JPG"), "latte_art.JPG");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\kopi.png"), "kopi.png");
        assert_eq!(sanitize_filename(".."), "image");
        assert_eq!(sanitize_filename(""), "image");
        assert_eq!(sanitize_filename("kopi susu☕.webp"), "kopi_susu_.webp");
        assert_eq!(sanitize_filename(&"a".repeat(300)).len(), MAX_FILENAME_CHARS);
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let store = ImageStore::new(PathBuf::from("/srv/uploads"));
        assert_eq!(
            store.resolve("uploads/products/x/1-a.png").unwrap(),
            PathBuf::from("/srv/uploads/products/x/1-a.png")
        );
        assert!(store.resolve("uploads/../secret").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("img/menu/1.jpg").is_err());
    }

    #[tokio::test]
    async fn test_save_then_remove() {
        let root = std::env::temp_dir().join(format!("kedai-uploads-{}", ProductId::new_v4()));
        let store = ImageStore::new(root.clone());
        let product_id = ProductId::new_v4();

        let url = store.save(product_id, "espresso.jpg", b"jpeg").await.unwrap();
        assert!(url.starts_with(&format!("uploads/products/{product_id}/")));
        assert!(url.ends_with("-espresso.jpg"));

        let path = store.resolve(&url).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"jpeg");

        store.remove(&url).await.unwrap();
        assert!(!path.exists());

        tokio::fs::remove_dir_all(root).await.unwrap();
    }
}
