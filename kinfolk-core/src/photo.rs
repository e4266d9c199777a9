//! Photo object storage.
//!
//! Photos are stored under `{root}/{uploader}/{uuid}.{ext}` with a JSON
//! metadata sidecar next to each object.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KinError, KinResult};
use crate::store::validate_id;

const METADATA_SUFFIX: &str = ".meta.json";

/// Metadata for a stored photo (what a HEAD request returns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub key: String,
    pub content_type: String,
    pub size: u64,
    pub uploaded_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
    max_bytes: u64,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        PhotoStore {
            root: root.into(),
            max_bytes,
        }
    }

    /// `uploader/name.ext` keys only; anything else could escape the root.
    fn object_path(&self, key: &str) -> KinResult<PathBuf> {
        let mut parts = key.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) => {
                validate_id(owner).map_err(|_| KinError::Photo(format!("Invalid photo key '{key}'")))?;
                validate_id(name).map_err(|_| KinError::Photo(format!("Invalid photo key '{key}'")))?;
                Ok(self.root.join(owner).join(name))
            }
            _ => Err(KinError::Photo(format!("Invalid photo key '{key}'"))),
        }
    }

    fn metadata_path(object: &Path) -> PathBuf {
        let mut name = object.as_os_str().to_owned();
        name.push(METADATA_SUFFIX);
        PathBuf::from(name)
    }

    pub async fn put(
        &self,
        uploader: &str,
        content_type: &str,
        bytes: &[u8],
        caption: Option<String>,
    ) -> KinResult<Photo> {
        let ext = extension_for(content_type).ok_or_else(|| {
            KinError::Photo(format!("Unsupported content type '{content_type}'"))
        })?;

        if bytes.is_empty() {
            return Err(KinError::Photo("Empty upload".into()));
        }
        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(KinError::Photo(format!(
                "Photo is {size} bytes, the limit is {}",
                self.max_bytes
            )));
        }

        let key = format!("{}/{}.{}", uploader, uuid::Uuid::new_v4(), ext);
        let path = self.object_path(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let photo = Photo {
            key,
            content_type: content_type.to_ascii_lowercase(),
            size,
            uploaded_by: uploader.to_string(),
            caption,
            uploaded_at: Utc::now(),
        };

        tokio::fs::write(&path, bytes).await?;
        tokio::fs::write(Self::metadata_path(&path), serde_json::to_vec_pretty(&photo)?).await?;

        tracing::info!(key = %photo.key, size, "stored photo");
        Ok(photo)
    }

    /// Metadata for one photo, None if it does not exist.
    pub async fn head(&self, key: &str) -> KinResult<Option<Photo>> {
        let path = Self::metadata_path(&self.object_path(key)?);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Raw bytes of a photo.
    pub async fn get(&self, key: &str) -> KinResult<Vec<u8>> {
        let path = self.object_path(key)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => KinError::not_found("photo", key),
            _ => e.into(),
        })
    }

    /// Every photo whose key starts with `prefix`, newest first.
    pub async fn list(&self, prefix: Option<&str>) -> KinResult<Vec<Photo>> {
        let mut photos = Vec::new();

        let mut owners = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(photos),
            Err(e) => return Err(e.into()),
        };

        while let Some(owner) = owners.next_entry().await? {
            if !owner.file_type().await?.is_dir() {
                continue;
            }
            let mut files = tokio::fs::read_dir(owner.path()).await?;
            while let Some(file) = files.next_entry().await? {
                let path = file.path();
                if !path.to_string_lossy().ends_with(METADATA_SUFFIX) {
                    continue;
                }
                let parsed = tokio::fs::read(&path)
                    .await
                    .map_err(KinError::from)
                    .and_then(|bytes| serde_json::from_slice::<Photo>(&bytes).map_err(KinError::from));
                match parsed {
                    Ok(photo) if prefix.is_none_or(|p| photo.key.starts_with(p)) => photos.push(photo),
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable photo metadata")
                    }
                }
            }
        }

        photos.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then_with(|| a.key.cmp(&b.key)));
        Ok(photos)
    }
}
