//! Filesystem storage for product binaries.
//!
//! One attachment per product, stored under `<root>/products/` with a
//! generated unique name; the original filename and size live on the
//! product row. Callers write a new file before committing the row that
//! references it and delete the old file only after that commit, so no
//! reachable row ever points at a missing file.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use lichub_common::types::AttachmentMeta;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Accepted upload extensions (case-insensitive).
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "zip", "rar", "tar", "gz", "exe", "msi", "deb", "rpm", "pdf", "doc", "docx", "xls", "xlsx",
    "ppt", "pptx",
];

/// Maximum accepted upload size: 100 MB.
pub const MAX_FILE_SIZE: usize = 100 * 1024 * 1024;

const PRODUCTS_SUBDIR: &str = "products";

/// Filesystem-backed attachment storage rooted at the uploads directory.
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, stored_path: &str) -> PathBuf {
        self.root.join(stored_path)
    }

    /// Whether `file_name` carries an extension from the allow-list.
    pub fn extension_allowed(file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                ALLOWED_EXTENSIONS.iter().any(|a| *a == e)
            })
            .unwrap_or(false)
    }

    /// Store `content` under a generated unique name, returning the
    /// metadata to record on the product row. `file_path` in the result
    /// is relative to the store root.
    pub async fn save(&self, original_name: &str, content: Bytes) -> io::Result<AttachmentMeta> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let stored = format!(
            "{PRODUCTS_SUBDIR}/file-{}-{}{ext}",
            Utc::now().timestamp_millis(),
            rand::random::<u32>(),
        );

        let path = self.full_path(&stored);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(&path).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;

        Ok(AttachmentMeta {
            file_path: stored,
            file_name: original_name.to_string(),
            file_size: content.len() as i64,
        })
    }

    pub async fn read(&self, stored_path: &str) -> io::Result<Bytes> {
        let content = fs::read(self.full_path(stored_path)).await?;
        Ok(Bytes::from(content))
    }

    pub async fn exists(&self, stored_path: &str) -> bool {
        fs::try_exists(self.full_path(stored_path))
            .await
            .unwrap_or(false)
    }

    pub async fn delete(&self, stored_path: &str) -> io::Result<()> {
        fs::remove_file(self.full_path(stored_path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_read_delete_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = AttachmentStore::new(dir.path());

        let meta = store
            .save("setup.zip", Bytes::from_static(b"PK\x03\x04 payload"))
            .await
            .unwrap();
        assert_eq!(meta.file_name, "setup.zip");
        assert_eq!(meta.file_size, 12);
        assert!(meta.file_path.starts_with("products/file-"));
        assert!(meta.file_path.ends_with(".zip"));

        let content = store.read(&meta.file_path).await.unwrap();
        assert_eq!(content.as_ref(), b"PK\x03\x04 payload");
        assert!(store.exists(&meta.file_path).await);

        store.delete(&meta.file_path).await.unwrap();
        assert!(!store.exists(&meta.file_path).await);
        assert!(store.read(&meta.file_path).await.is_err());
    }

    #[tokio::test]
    async fn generated_names_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = AttachmentStore::new(dir.path());

        let a = store.save("a.pdf", Bytes::from_static(b"one")).await.unwrap();
        let b = store.save("a.pdf", Bytes::from_static(b"two")).await.unwrap();
        assert_ne!(a.file_path, b.file_path);
        assert_eq!(store.read(&a.file_path).await.unwrap().as_ref(), b"one");
        assert_eq!(store.read(&b.file_path).await.unwrap().as_ref(), b"two");
    }

    #[test]
    fn extension_allow_list() {
        assert!(AttachmentStore::extension_allowed("installer.ZIP"));
        assert!(AttachmentStore::extension_allowed("manual.pdf"));
        assert!(AttachmentStore::extension_allowed("archive.tar"));
        assert!(!AttachmentStore::extension_allowed("script.sh"));
        assert!(!AttachmentStore::extension_allowed("no_extension"));
        assert!(!AttachmentStore::extension_allowed("image.png"));
    }
}
