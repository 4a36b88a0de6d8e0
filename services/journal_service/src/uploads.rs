use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

/// Upload destinations, each with its own subdirectory and permitted
/// extension set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadCategory {
    Profiles,
    Submissions,
    Media,
    Questions,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const DOCUMENT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf", "doc", "docx", "pptx"];

impl UploadCategory {
    pub fn subdirectory(&self) -> &'static str {
        match self {
            UploadCategory::Profiles => "profiles",
            UploadCategory::Submissions => "submissions",
            UploadCategory::Media => "media",
            UploadCategory::Questions => "questions",
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadCategory::Profiles => IMAGE_EXTENSIONS,
            _ => DOCUMENT_EXTENSIONS,
        }
    }
}

/// A file received from a client, already buffered off the wire.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file was provided.")]
    NoFile,

    #[error("This file type is not permitted.")]
    UnsupportedType,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes uploads under a root directory and hands back paths relative to it,
/// so stored references survive a relocation of the root.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Saves the upload and returns a guard that removes the file again on
    /// drop unless [`StoredFile::persist`] is called. Callers persist only
    /// after the matching database write commits, which closes the
    /// orphaned-file window of a failed commit.
    pub fn save(
        &self,
        category: UploadCategory,
        original_filename: &str,
        contents: &[u8],
    ) -> Result<StoredFile, UploadError> {
        if original_filename.is_empty() {
            return Err(UploadError::NoFile);
        }

        let extension = original_filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or(UploadError::UnsupportedType)?;
        if !category.allowed_extensions().contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedType);
        }

        // Second-resolution timestamps collide under load, so a short random
        // discriminator is appended.
        let discriminator = &Uuid::new_v4().simple().to_string()[..8];
        let unique_name = format!(
            "{}_{}_{}",
            Utc::now().format("%Y%m%d_%H%M%S"),
            discriminator,
            sanitize_filename(original_filename),
        );

        let directory = self.root.join(category.subdirectory());
        fs::create_dir_all(&directory)?;
        let absolute_path = directory.join(&unique_name);
        fs::write(&absolute_path, contents)?;

        Ok(StoredFile {
            relative_path: format!("{}/{}", category.subdirectory(), unique_name),
            absolute_path,
            committed: false,
        })
    }

    /// Best-effort removal of a previously stored file, used when an avatar
    /// is replaced. A missing file is not an error.
    pub fn remove(&self, relative_path: &str) {
        let path = self.root.join(relative_path);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove upload {}: {}", path.display(), e);
            }
        }
    }
}

/// A freshly written upload that has not been referenced from the database
/// yet. Dropping it without calling [`persist`](Self::persist) deletes the
/// file.
#[derive(Debug)]
pub struct StoredFile {
    relative_path: String,
    absolute_path: PathBuf,
    committed: bool,
}

impl StoredFile {
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Marks the file as owned by a committed database row and returns its
    /// stored reference.
    pub fn persist(mut self) -> String {
        self.committed = true;
        std::mem::take(&mut self.relative_path)
    }
}

impl Drop for StoredFile {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = fs::remove_file(&self.absolute_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to roll back upload {}: {}", self.absolute_path.display(), e);
                }
            }
        }
    }
}

/// Keeps the final path component and replaces anything outside a
/// conservative character set, so client-supplied names cannot traverse
/// directories.
fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
