// service/storage_service.rs
use std::{fmt::Debug, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

use crate::{models::profilemodel::MediaKind, service::error::ServiceError};

pub const MAX_AVATAR_BYTES: usize = 3 * 1024 * 1024;
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Where uploaded bytes end up. Returns the public URL of the stored object.
#[async_trait]
pub trait FileStorage: Send + Sync + Debug {
    async fn put(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, ServiceError>;
}

/// Files under a local directory, served back under `public_url`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn put(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, ServiceError> {
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::Storage(format!("create {}: {}", dir.display(), e)))?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Storage(format!("write {}: {}", path.display(), e)))?;

        Ok(format!("{}/{}/{}", self.public_url, folder, file_name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Jpeg,
    Png,
    Webp,
    Pdf,
}

impl FileType {
    pub fn extension(&self) -> &str {
        match self {
            FileType::Jpeg => "jpg",
            FileType::Png => "png",
            FileType::Webp => "webp",
            FileType::Pdf => "pdf",
        }
    }

    /// Identifies the file from its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<FileType> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(FileType::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(FileType::Png)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(FileType::Webp)
        } else if bytes.starts_with(b"%PDF-") {
            Some(FileType::Pdf)
        } else {
            None
        }
    }
}

struct MediaRules {
    folder: &'static str,
    max_bytes: usize,
    allowed: &'static [FileType],
    label: &'static str,
}

fn rules(kind: MediaKind) -> MediaRules {
    match kind {
        MediaKind::Avatar => MediaRules {
            folder: "avatars",
            max_bytes: MAX_AVATAR_BYTES,
            allowed: &[FileType::Jpeg, FileType::Png, FileType::Webp],
            label: "Avatar must be a JPEG, PNG or WebP image",
        },
        MediaKind::Resume => MediaRules {
            folder: "resumes",
            max_bytes: MAX_RESUME_BYTES,
            allowed: &[FileType::Pdf],
            label: "Resume must be a PDF document",
        },
    }
}

/// Accepts plain base64 or a `data:<mime>;base64,<payload>` URL.
pub fn decode_payload(data: &str) -> Result<Vec<u8>, ServiceError> {
    let data = data.trim();
    let payload = match data.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| ServiceError::Validation("Malformed data URL".to_string()))?,
        None => data,
    };

    STANDARD
        .decode(payload)
        .map_err(|_| ServiceError::Validation("File data is not valid base64".to_string()))
}

#[derive(Debug, Clone)]
pub struct StorageService {
    storage: Arc<dyn FileStorage>,
}

impl StorageService {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    /// Checks size and type, then stores the file under a fresh name.
    pub async fn store_media(
        &self,
        owner_id: Uuid,
        kind: MediaKind,
        data: &str,
    ) -> Result<String, ServiceError> {
        let bytes = decode_payload(data)?;
        let rules = rules(kind);

        if bytes.is_empty() {
            return Err(ServiceError::Validation("File is empty".to_string()));
        }
        if bytes.len() > rules.max_bytes {
            return Err(ServiceError::Validation(format!(
                "File is larger than {} MiB",
                rules.max_bytes / (1024 * 1024)
            )));
        }

        let file_type = FileType::sniff(&bytes)
            .filter(|t| rules.allowed.contains(t))
            .ok_or_else(|| ServiceError::Validation(rules.label.to_string()))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), file_type.extension());
        let url = self.storage.put(rules.folder, &file_name, bytes).await.map_err(|e| {
            tracing::error!("storing {:?} for {} failed: {}", kind, owner_id, e);
            e
        })?;

        tracing::info!("stored {:?} for {} at {}", kind, owner_id, url);
        Ok(url)
    }
}
