use async_trait::async_trait;
use aviary_core::attachment::{attachment_filename, AttachmentStore, Upload};
use aviary_core::error::AttachmentError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Stores uploads as files in a single public directory.
///
/// Names are `<unix-millis><extension>`. A name already on disk is never
/// overwritten: the millisecond value is bumped until a free name is found.
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
    dir: PathBuf,
}

impl LocalAttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the upload directory if it is missing.
    pub async fn ensure_dir(&self) -> Result<(), AttachmentError> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            warn!(dir = %self.dir.display(), error = %e, "attachment store: create_dir_all failed");
            AttachmentError::from(e)
        })
    }
}

#[async_trait]
impl AttachmentStore for LocalAttachmentStore {
    async fn store(&self, upload: Upload) -> Result<String, AttachmentError> {
        self.ensure_dir().await?;

        let mut millis = Timestamp::now().as_millisecond();
        loop {
            let filename = attachment_filename(millis, &upload);
            let path = self.dir.join(&filename);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    millis += 1;
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "attachment store: create failed");
                    return Err(e.into());
                }
            };

            file.write_all(&upload.bytes).await?;
            file.sync_all().await?;

            debug!(filename = %filename, size = upload.bytes.len(), "stored attachment");
            return Ok(filename);
        }
    }
}

/// Keeps uploads in memory, keyed by generated name.
#[derive(Debug, Default)]
pub struct InMemoryAttachmentStore {
    files: DashMap<String, Vec<u8>>,
}

impl InMemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes stored under `filename`.
    pub fn get(&self, filename: &str) -> Option<Vec<u8>> {
        self.files.get(filename).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn store(&self, upload: Upload) -> Result<String, AttachmentError> {
        let mut millis = Timestamp::now().as_millisecond();
        loop {
            let filename = attachment_filename(millis, &upload);
            match self.files.entry(filename.clone()) {
                Entry::Occupied(_) => millis += 1,
                Entry::Vacant(slot) => {
                    slot.insert(upload.bytes);
                    return Ok(filename);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_file_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAttachmentStore::new(dir.path().join("images"));

        let filename = store
            .store(Upload::new("kiwi.jpg", b"jpeg-bytes".to_vec()))
            .await
            .unwrap();

        assert!(filename.ends_with(".jpg"));
        assert!(filename.trim_end_matches(".jpg").parse::<i64>().is_ok());
        let written = std::fs::read(dir.path().join("images").join(&filename)).unwrap();
        assert_eq!(written, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn never_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAttachmentStore::new(dir.path());

        let mut names = Vec::new();
        for n in 0..5u8 {
            names.push(store.store(Upload::new("a.png", vec![n])).await.unwrap());
        }

        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
        for name in &names {
            assert_eq!(std::fs::read(dir.path().join(name)).unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn in_memory_store_keeps_bytes() {
        let store = InMemoryAttachmentStore::new();

        let first = store.store(Upload::new("a.png", vec![1])).await.unwrap();
        let second = store.store(Upload::new("b.png", vec![2])).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&first), Some(vec![1]));
        assert_eq!(store.get(&second), Some(vec![2]));
    }
}
