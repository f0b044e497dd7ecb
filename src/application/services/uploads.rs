//! Media upload helpers shared by the post and profile services.

use crate::domain::{FileKind, NewAttachment};
use crate::infrastructure::media::{discard_uploads, MediaError, MediaFolder, MediaStore, StoredMedia, UploadFile};

/// Width of the `file_name` attachment columns.
const MAX_FILE_NAME_CHARS: usize = 255;

/// Uploaded media plus the attachment rows describing it.
#[derive(Debug, Default)]
pub struct UploadedBatch {
    pub stored: Vec<StoredMedia>,
    pub attachments: Vec<NewAttachment>,
}

/// Upload every file in order. On the first failure the files already
/// uploaded are destroyed and the error is returned.
pub async fn upload_all(
    store: &dyn MediaStore,
    folder: MediaFolder,
    files: Vec<UploadFile>,
) -> Result<UploadedBatch, MediaError> {
    let mut batch = UploadedBatch::default();

    for file in files {
        let file_name = file.file_name.clone();
        match store.upload(folder, file).await {
            Ok(stored) => {
                batch.attachments.push(NewAttachment {
                    file_url: stored.url.clone(),
                    file_type: FileKind::from_file_name(&file_name).mime_type().to_string(),
                    file_name: cap_file_name(&file_name),
                });
                batch.stored.push(stored);
            }
            Err(e) => {
                tracing::warn!(file = %file_name, "Upload failed, discarding batch: {}", e);
                discard_uploads(store, &batch.stored).await;
                return Err(e);
            }
        }
    }

    Ok(batch)
}

/// Shorten a client file name to fit the column, keeping a short extension.
fn cap_file_name(name: &str) -> String {
    if name.chars().count() <= MAX_FILE_NAME_CHARS {
        return name.to_string();
    }

    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().count() <= 10);

    match ext {
        Some(ext) => {
            let keep = MAX_FILE_NAME_CHARS - ext.chars().count() - 1;
            let mut capped: String = name.chars().take(keep).collect();
            capped.push('.');
            capped.push_str(ext);
            capped
        }
        None => name.chars().take(MAX_FILE_NAME_CHARS).collect(),
    }
}
