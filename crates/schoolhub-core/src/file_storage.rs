//! Storage for uploaded school images.
//!
//! Services only see the [`FileStorage`] trait, so the local-disk backend
//! can later be replaced by an object store. [`LocalFileStorage`] writes
//! below a base directory and builds URLs below a public base URL that is
//! expected to serve that directory.
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_core::file_storage::{FileStorage, LocalFileStorage};
//!
//! let storage = LocalFileStorage::new("./storage/uploads".into(), "http://localhost:3000/files".into(), 5 << 20);
//! let key = storage.save("schools/abc.png", &bytes, "image/png").await?;
//! let url = storage.get_url(&key)?;
//! storage.delete(&key).await?;
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::BoxFuture;

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Jpeg,
    Webp,
}

impl ImageType {
    pub const ALL: [ImageType; 3] = [ImageType::Png, ImageType::Jpeg, ImageType::Webp];

    pub fn from_mime(content_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|image_type| image_type.mime() == content_type)
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used when naming a stored image.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

pub trait FileStorage: Send + Sync {
    /// Stores `content` under `key` and returns the key.
    ///
    /// Rejects content over the backend's size limit and MIME types that
    /// are not an [`ImageType`].
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>>;

    /// Removes the file under `key`. Removing a missing file succeeds.
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Public URL of the file under `key`.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

#[derive(Debug)]
pub enum StorageError {
    TooLarge { max_bytes: usize },
    UnsupportedType { received: String },
    InvalidKey(&'static str),
    Io(io::Error),
}

impl StorageError {
    /// Whether the uploaded content, not the backend, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::TooLarge { .. } | Self::UnsupportedType { .. })
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { max_bytes } => {
                write!(f, "Image exceeds the maximum size of {} bytes", max_bytes)
            }
            Self::UnsupportedType { received } => {
                let allowed: Vec<&str> = ImageType::ALL.iter().map(|t| t.mime()).collect();
                write!(
                    f,
                    "Image type '{}' not allowed. Allowed types: {}",
                    received,
                    allowed.join(", ")
                )
            }
            Self::InvalidKey(reason) => write!(f, "Invalid storage key: {}", reason),
            Self::Io(e) => write!(f, "Storage I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Keys are relative paths made of `[A-Za-z0-9._/-]` with no `..` segment.
fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key is empty"));
    }
    if key.starts_with('/') || key.contains("..") {
        return Err(StorageError::InvalidKey("key escapes the storage root"));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/');
    if !key.chars().all(allowed) {
        return Err(StorageError::InvalidKey("key contains invalid characters"));
    }
    Ok(())
}

/// Files on the local disk.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_file_size,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.base_dir.join(key))
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            let path = self.path_for(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::TooLarge {
                    max_bytes: self.max_file_size,
                });
            }
            if ImageType::from_mime(content_type).is_none() {
                return Err(StorageError::UnsupportedType {
                    received: content_type.to_string(),
                });
            }

            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).await?;
            }
            fs::write(&path, content).await?;

            tracing::debug!(storage.key = %key, bytes = content.len(), "Stored file");
            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let path = self.path_for(key)?;

            match fs::remove_file(&path).await {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        check_key(key)?;
        Ok(format!("{}/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage(max_file_size: usize) -> LocalFileStorage {
        let dir = std::env::temp_dir().join(format!("schoolhub-storage-{}", uuid::Uuid::new_v4()));
        LocalFileStorage::new(dir, "http://localhost:3000/files".to_string(), max_file_size)
    }

    #[test]
    fn test_image_type_from_mime() {
        assert_eq!(ImageType::from_mime("image/png"), Some(ImageType::Png));
        assert_eq!(ImageType::from_mime("image/jpeg"), Some(ImageType::Jpeg));
        assert_eq!(ImageType::from_mime("image/gif"), None);
        assert_eq!(ImageType::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("schools/abc-123_x.webp").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc/passwd").is_err());
        assert!(check_key("/etc/passwd").is_err());
        assert!(check_key("schools\\x.png").is_err());
        assert!(check_key("schools/a b.png").is_err());
    }

    #[test]
    fn test_get_url_strips_trailing_slash() {
        let storage = LocalFileStorage::new(
            PathBuf::from("./uploads"),
            "http://localhost:3000/files/".to_string(),
            1024,
        );

        assert_eq!(
            storage.get_url("schools/logo.png").unwrap(),
            "http://localhost:3000/files/schools/logo.png"
        );
    }

    #[tokio::test]
    async fn test_save_then_delete() {
        let storage = temp_storage(1024);

        let key = storage
            .save("schools/test.png", b"png-bytes", "image/png")
            .await
            .unwrap();
        let path = storage.base_dir().join(&key);
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");

        storage.delete(&key).await.unwrap();
        assert!(!path.exists());

        // already gone
        storage.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_file() {
        let storage = temp_storage(4);

        let err = storage
            .save("schools/big.png", b"12345", "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::TooLarge { max_bytes: 4 }));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_save_rejects_unsupported_type() {
        let storage = temp_storage(1024);

        let err = storage
            .save("schools/doc.pdf", b"%PDF", "application/pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::UnsupportedType { .. }));
        assert!(err.to_string().contains("not allowed"));
    }
}
