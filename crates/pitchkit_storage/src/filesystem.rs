//! Filesystem-based asset storage.
//!
//! Assets are downloaded from their provider URL and stored by content hash,
//! grouped by owner, session and media kind.

use async_trait::async_trait;
use pitchkit_core::{MediaKind, StoredAsset};
use pitchkit_error::{PitchkitResult, StorageError, StorageErrorKind};
use pitchkit_interface::{AssetStorage, StoreRequest};
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FILE_URL_PREFIX: &str = "file://";

/// Filesystem storage backend.
///
/// Layout: `{base_path}/{owner}/{session}/{images|animations}/{sha256}.{ext}`
///
/// ```text
/// pitchkit-assets/
/// └── marketing/
///     └── Acme/
///         ├── images/
///         │   └── 9f86d08188...png
///         └── animations/
///             └── 60303ae22b...mp4
/// ```
///
/// - **Content-addressable**: identical bytes are written once
/// - **Atomic writes**: temp file + rename
/// - Path components derived from keys are sanitised, so keys cannot escape
///   the base directory
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
    client: Client,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> PitchkitResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self {
            base_path,
            client: Client::new(),
        })
    }

    /// Root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Compute SHA-256 hash of data.
    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    /// Directory for one owner, session and kind.
    fn asset_dir(&self, request: &StoreRequest) -> Result<PathBuf, StorageError> {
        let type_dir = match request.kind {
            MediaKind::Image => "images",
            MediaKind::Animation => "animations",
        };

        Ok(self
            .base_path
            .join(sanitize_component(&request.owner_key)?)
            .join(sanitize_component(&request.session_key)?)
            .join(type_dir))
    }

    /// Download the bytes behind an asset URL.
    #[tracing::instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<Vec<u8>, StorageError> {
        let download_error =
            |message: String| StorageError::new(StorageErrorKind::Download(message));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(download_error(format!(
                "{}: HTTP {}",
                url,
                response.status().as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_error(format!("{}: {}", url, e)))?;

        tracing::debug!(size = bytes.len(), "Downloaded asset");
        Ok(bytes.to_vec())
    }

    /// Store already-downloaded asset bytes.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the keys are unusable as path components or
    /// the file cannot be written.
    #[tracing::instrument(
        skip(self, data, request),
        fields(size = data.len(), kind = %request.kind, session = %request.session_key)
    )]
    pub async fn store_bytes(
        &self,
        data: &[u8],
        request: &StoreRequest,
    ) -> PitchkitResult<StoredAsset> {
        let hash = Self::compute_hash(data);
        let dir = self.asset_dir(request)?;
        let path = dir.join(match extension(&request.file_name) {
            Some(ext) => format!("{}.{}", hash, ext),
            None => hash.clone(),
        });

        let stored = StoredAsset {
            id: Uuid::new_v4().to_string(),
            url: format!("{}{}", FILE_URL_PREFIX, path.display()),
            name: request.file_name.clone(),
            kind: request.kind,
        };

        // If file already exists, just return reference (deduplication)
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(hash = %hash, path = %path.display(), "Asset already stored");
            return Ok(stored);
        }

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = dir.join(format!("{}.{}.tmp", hash, Uuid::new_v4()));
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::info!(
            hash = %hash,
            path = %path.display(),
            size = data.len(),
            "Stored asset"
        );

        Ok(stored)
    }

    /// Read a stored asset back, verifying its content hash.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file is gone and `InvalidPath` if the
    /// reference is not a file in this store or its content changed.
    #[tracing::instrument(skip(self, stored), fields(url = %stored.url))]
    pub async fn retrieve(&self, stored: &StoredAsset) -> PitchkitResult<Vec<u8>> {
        let path = self.local_path(stored)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let expected = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        let actual = Self::compute_hash(&data);
        if actual != expected {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(format!(
                "Hash mismatch: expected {}, got {}",
                expected, actual
            )))
            .into());
        }

        Ok(data)
    }

    /// Check whether a stored asset is still on disk.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if the reference is not a file in this store.
    pub async fn exists(&self, stored: &StoredAsset) -> PitchkitResult<bool> {
        let path = self.local_path(stored)?;
        Ok(tokio::fs::try_exists(path).await.unwrap_or(false))
    }

    fn local_path(&self, stored: &StoredAsset) -> Result<PathBuf, StorageError> {
        stored
            .url
            .strip_prefix(FILE_URL_PREFIX)
            .map(PathBuf::from)
            .filter(|path| path.starts_with(&self.base_path))
            .ok_or_else(|| StorageError::new(StorageErrorKind::InvalidPath(stored.url.clone())))
    }
}

#[async_trait]
impl AssetStorage for FileSystemStorage {
    #[tracing::instrument(
        skip(self, request),
        fields(url = %request.asset_url, name = %request.file_name)
    )]
    async fn store(&self, request: &StoreRequest) -> PitchkitResult<StoredAsset> {
        let data = self.download(&request.asset_url).await?;
        self.store_bytes(&data, request).await
    }

    fn backend_name(&self) -> &str {
        "filesystem"
    }
}

/// Make a key safe to use as one path component.
fn sanitize_component(key: &str) -> Result<String, StorageError> {
    let cleaned: String = key
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == ' ').to_string();

    if cleaned.is_empty() {
        return Err(StorageError::new(StorageErrorKind::InvalidPath(format!(
            "unusable path component: {:?}",
            key
        ))));
    }
    Ok(cleaned)
}

/// Lowercased extension of a file name, if it has a short alphanumeric one.
fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_blocks_traversal() {
        assert_eq!(sanitize_component("../etc").unwrap(), "_etc");
        assert_eq!(sanitize_component("Acme Corp/Brand").unwrap(), "Acme Corp_Brand");
        assert!(sanitize_component("..").is_err());
        assert!(sanitize_component("   ").is_err());
    }

    #[test]
    fn test_extension_is_normalised() {
        assert_eq!(extension("clip.MP4").as_deref(), Some("mp4"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("weird.p n g"), None);
    }
}
