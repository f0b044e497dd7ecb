//! Media Host
//!
//! Uploaded files (post attachments, avatars) are stored on Cloudinary. The
//! rest of the crate sees only the [`MediaStore`] trait so services can be
//! tested without network access.

mod cloudinary;

use async_trait::async_trait;
use bytes::Bytes;

pub use cloudinary::CloudinaryStore;

/// Destination folder on the media host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFolder {
    PostFiles,
    ChannelPostFiles,
    Avatars,
}

impl MediaFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostFiles => "post_files",
            Self::ChannelPostFiles => "channel_post_files",
            Self::Avatars => "avatars",
        }
    }

    /// Cloudinary resource type used for uploads into this folder.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Avatars => "image",
            Self::PostFiles | Self::ChannelPostFiles => "auto",
        }
    }
}

/// A file received from a client, held in memory until uploaded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Where an upload ended up. `public_id` and `resource_type` are needed to destroy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
    pub resource_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Media host is not configured")]
    NotConfigured,

    #[error("Media host request failed: {0}")]
    Transport(String),

    #[error("Media host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, folder: MediaFolder, file: UploadFile) -> Result<StoredMedia, MediaError>;

    async fn destroy(&self, media: &StoredMedia) -> Result<(), MediaError>;
}

/// Best-effort removal of uploads whose database write did not happen.
pub async fn discard_uploads(store: &dyn MediaStore, uploads: &[StoredMedia]) {
    for media in uploads {
        if let Err(e) = store.destroy(media).await {
            tracing::warn!(public_id = %media.public_id, "Failed to destroy orphaned upload: {}", e);
        }
    }
}
