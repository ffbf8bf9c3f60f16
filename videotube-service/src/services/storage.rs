//! Asset storage behind a capability trait so handlers never touch the
//! S3 client directly and tests can swap in an in-memory fake.

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{ApiError, Result};

/// What kind of asset an object holds; determines its key prefix and
/// whether a duration probe runs on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Image,
}

impl AssetKind {
    fn prefix(&self) -> &'static str {
        match self {
            AssetKind::Video => "videos",
            AssetKind::Image => "images",
        }
    }
}

/// A stored asset: its public URL plus the probed duration in seconds
/// for video assets.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub url: String,
    pub duration: f64,
}

#[async_trait]
pub trait AssetStorage: Send + Sync {
    /// Upload a local file and return its public URL. Video uploads also
    /// carry the probed duration.
    async fn upload(&self, local_path: &str, kind: AssetKind) -> Result<StoredAsset>;

    /// Delete a previously stored asset by its storage key.
    async fn delete(&self, asset_id: &str, kind: AssetKind) -> Result<()>;
}

/// Derive the storage key from a public asset URL, for deletes driven by
/// the URL we stored on the entity.
pub fn asset_id_from_url(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|s| !s.is_empty())
}

pub struct S3AssetStorage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3AssetStorage {
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "videotube-service",
        );

        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_key(kind: AssetKind, extension: Option<&str>) -> String {
        let id = Uuid::new_v4();
        match extension {
            Some(ext) => format!("{}/{}.{}", kind.prefix(), id, ext),
            None => format!("{}/{}", kind.prefix(), id),
        }
    }

    /// Probe a local video file's duration with ffprobe.
    async fn probe_duration(local_path: &str) -> Result<f64> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                local_path,
            ])
            .output()
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(ApiError::Internal(format!(
                "ffprobe failed for {local_path}"
            )));
        }

        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .map_err(|e| ApiError::Internal(format!("Unparseable ffprobe duration: {e}")))
    }
}

#[async_trait]
impl AssetStorage for S3AssetStorage {
    async fn upload(&self, local_path: &str, kind: AssetKind) -> Result<StoredAsset> {
        let extension = Path::new(local_path)
            .extension()
            .and_then(|e| e.to_str());
        let key = Self::object_key(kind, extension);

        let duration = match kind {
            AssetKind::Video => Self::probe_duration(local_path).await?,
            AssetKind::Image => 0.0,
        };

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to read {local_path}: {e}")))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("S3 upload failed: {e}")))?;

        tracing::info!(key = %key, "uploaded asset");

        Ok(StoredAsset {
            url: format!("{}/{}", self.public_base_url, key),
            duration,
        })
    }

    async fn delete(&self, asset_id: &str, kind: AssetKind) -> Result<()> {
        let key = format!("{}/{}", kind.prefix(), asset_id);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("S3 delete failed: {e}")))?;

        tracing::info!(key = %key, "deleted asset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_is_last_path_segment() {
        assert_eq!(
            asset_id_from_url("https://assets.example.com/videos/abc123.mp4"),
            Some("abc123.mp4")
        );
        assert_eq!(asset_id_from_url("https://assets.example.com/"), None);
    }
}
