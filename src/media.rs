//! Storage for uploaded listing images

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::{distr::Alphanumeric, Rng};

/// Extensions accepted for the `image` upload
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// A file received with a form submission
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    /// File name as sent by the client
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Lowercased extension of the client file name, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: Arc<PathBuf>,
}

impl MediaStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Arc::new(root.as_ref().to_path_buf()),
        }
    }

    /// Writes `upload` under the media root and returns the stored file name.
    ///
    /// The stored name keeps a sanitized stem of the client name plus a random
    /// 6-character suffix, so two uploads of `photo.jpg` never collide.
    pub async fn save(&self, upload: &Upload) -> io::Result<String> {
        tokio::fs::create_dir_all(self.root.as_path()).await?;

        let stem: String = Path::new(&upload.file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("image")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .take(64)
            .collect();
        let stem = if stem.is_empty() { "image".to_string() } else { stem };

        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();

        let stored = match upload.extension() {
            Some(ext) => format!("{stem}_{suffix}.{ext}"),
            None => format!("{stem}_{suffix}"),
        };

        tokio::fs::write(self.root.join(&stored), &upload.bytes).await?;
        tracing::debug!(file = %stored, size = upload.bytes.len(), "image stored");

        Ok(stored)
    }

    /// Deletes a file written by [`MediaStore::save`] that no listing refers to.
    pub async fn discard(&self, stored: &str) {
        if let Err(err) = tokio::fs::remove_file(self.root.join(stored)).await {
            tracing::warn!(file = %stored, error = %err, "failed to remove unused image");
        } else {
            tracing::debug!(file = %stored, "unused image removed");
        }
    }
}
