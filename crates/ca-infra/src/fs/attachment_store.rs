use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ca_core::attachment::{AttachmentFile, AttachmentSlot, MimeType};
use ca_core::ports::{AttachmentStorePort, StorageError};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::OnceCell;
use tracing::{debug, info_span, warn, Instrument};

const ATTACHMENTS_DIR: &str = "attachments";
const META_FILE_NAME: &str = "meta.json";
const DATA_FILE_NAME: &str = "data.bin";
const STAGING_SUFFIX: &str = ".staging";
const REPLACED_SUFFIX: &str = ".replaced";

#[derive(Debug, Serialize, Deserialize)]
struct StoredMeta {
    name: String,
    mime: String,
    size: u64,
}

/// Attachment store on the local filesystem.
///
/// Layout: `<root>/attachments/<slot>/{meta.json,data.bin}`. A new document
/// is written to `<slot>.staging/` and renamed over the slot only once both
/// files are complete. A slot without `meta.json` is treated as empty.
pub struct FsAttachmentStore {
    root: PathBuf,
    opened: OnceCell<PathBuf>,
}

impl FsAttachmentStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            opened: OnceCell::new(),
        }
    }

    /// Creates the backing directory on first use. Safe to call repeatedly.
    pub async fn open(&self) -> Result<&Path, StorageError> {
        self.opened
            .get_or_try_init(|| async {
                let dir = self.root.join(ATTACHMENTS_DIR);
                fs::create_dir_all(&dir)
                    .await
                    .map_err(|err| unavailable(&dir, err))?;
                debug!(dir = %dir.display(), "attachment store opened");
                Ok::<_, StorageError>(dir)
            })
            .await
            .map(PathBuf::as_path)
    }

    async fn slot_dir(&self, slot: AttachmentSlot) -> Result<PathBuf, StorageError> {
        Ok(self.open().await?.join(slot.as_str()))
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Unavailable(format!("{}: {err}", path.display()))
}

fn with_suffix(dir: &Path, suffix: &str) -> PathBuf {
    let mut name = dir.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

async fn remove_dir_if_present(dir: &Path) -> Result<(), StorageError> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(unavailable(dir, err)),
    }
}

async fn write_slot_files(dir: &Path, file: &AttachmentFile) -> Result<(), StorageError> {
    let data_path = dir.join(DATA_FILE_NAME);
    fs::write(&data_path, &file.data)
        .await
        .map_err(|err| unavailable(&data_path, err))?;

    let meta = StoredMeta {
        name: file.name.clone(),
        mime: file.mime.0.clone(),
        size: file.size(),
    };
    let meta_bytes =
        serde_json::to_vec(&meta).map_err(|err| StorageError::Corrupt(err.to_string()))?;
    let meta_path = dir.join(META_FILE_NAME);
    fs::write(&meta_path, meta_bytes)
        .await
        .map_err(|err| unavailable(&meta_path, err))
}

/// Replaces `dir` with the fully written `staging` directory.
///
/// The current document is moved aside first and restored if the final
/// rename fails, so the slot never ends up half written.
async fn swap_into_place(staging: &Path, dir: &Path) -> Result<(), StorageError> {
    let replaced = with_suffix(dir, REPLACED_SUFFIX);
    remove_dir_if_present(&replaced).await?;

    let had_previous = match fs::rename(dir, &replaced).await {
        Ok(()) => true,
        Err(err) if err.kind() == ErrorKind::NotFound => false,
        Err(err) => {
            let _ = fs::remove_dir_all(staging).await;
            return Err(unavailable(dir, err));
        }
    };

    if let Err(err) = fs::rename(staging, dir).await {
        if had_previous {
            if let Err(restore_err) = fs::rename(&replaced, dir).await {
                warn!(error = %restore_err, dir = %dir.display(), "failed to restore previous document");
            }
        }
        let _ = fs::remove_dir_all(staging).await;
        return Err(unavailable(dir, err));
    }

    if had_previous {
        if let Err(err) = fs::remove_dir_all(&replaced).await {
            warn!(error = %err, dir = %replaced.display(), "failed to remove replaced document");
        }
    }
    Ok(())
}

#[async_trait]
impl AttachmentStorePort for FsAttachmentStore {
    async fn put(&self, slot: AttachmentSlot, file: &AttachmentFile) -> Result<(), StorageError> {
        let span = info_span!("infra.fs.attachment_store.put", slot = %slot, size = file.size());
        async {
            let dir = self.slot_dir(slot).await?;
            let staging = with_suffix(&dir, STAGING_SUFFIX);
            remove_dir_if_present(&staging).await?;
            fs::create_dir_all(&staging)
                .await
                .map_err(|err| unavailable(&staging, err))?;

            if let Err(err) = write_slot_files(&staging, file).await {
                let _ = fs::remove_dir_all(&staging).await;
                return Err(err);
            }

            swap_into_place(&staging, &dir).await
        }
        .instrument(span)
        .await
    }

    async fn get(&self, slot: AttachmentSlot) -> Result<Option<AttachmentFile>, StorageError> {
        let span = info_span!("infra.fs.attachment_store.get", slot = %slot);
        async {
            let dir = self.slot_dir(slot).await?;

            let meta_path = dir.join(META_FILE_NAME);
            let meta_bytes = match fs::read(&meta_path).await {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
                Err(err) => return Err(unavailable(&meta_path, err)),
            };
            let meta: StoredMeta = serde_json::from_slice(&meta_bytes)
                .map_err(|err| StorageError::Corrupt(format!("{}: {err}", meta_path.display())))?;

            let data_path = dir.join(DATA_FILE_NAME);
            let data = match fs::read(&data_path).await {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
                Err(err) => return Err(unavailable(&data_path, err)),
            };
            if data.len() as u64 != meta.size {
                return Err(StorageError::Corrupt(format!(
                    "{}: expected {} bytes, found {}",
                    data_path.display(),
                    meta.size,
                    data.len()
                )));
            }

            Ok(Some(AttachmentFile::new(meta.name, MimeType(meta.mime), data)))
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, slot: AttachmentSlot) -> Result<(), StorageError> {
        let span = info_span!("infra.fs.attachment_store.delete", slot = %slot);
        async {
            let dir = self.slot_dir(slot).await?;
            remove_dir_if_present(&with_suffix(&dir, STAGING_SUFFIX)).await?;
            remove_dir_if_present(&with_suffix(&dir, REPLACED_SUFFIX)).await?;
            remove_dir_if_present(&dir).await
        }
        .instrument(span)
        .await
    }
}
