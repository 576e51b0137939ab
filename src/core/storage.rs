//! Document upload validation and storage.
//!
//! Uploads are checked against an extension allow-list and a size limit before
//! anything is written. Accepted files land in `<media_root>/accounting/`; a name
//! that is already taken gets a short random suffix instead of overwriting.

use crate::errors::{Error, Result};
use std::path::{Component, Path};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// Directory under the media root that holds accounting documents
pub const UPLOAD_PREFIX: &str = "accounting";

/// Extensions accepted for document uploads (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "pdf", "doc", "docx", "txt", "xls", "xlsx",
];

/// A file received from a client, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original file name, e.g. `receipt.pdf`
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Wraps a named upload.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Upload size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension, if the name has one.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// A bare file name: one normal path component, no directories.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Checks the name, extension and size of an upload.
///
/// # Errors
/// - [`Error::InvalidFileName`] for empty names or names containing a path
/// - [`Error::UnsupportedFileType`] if the extension is not allowed
/// - [`Error::FileTooLarge`] if the upload exceeds `max_bytes`
pub fn validate_upload(upload: &FileUpload, max_bytes: u64) -> Result<()> {
    if !is_plain_file_name(&upload.name) {
        return Err(Error::InvalidFileName {
            name: upload.name.clone(),
        });
    }

    let extension = upload.extension().unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Error::UnsupportedFileType { extension });
    }

    if upload.size() > max_bytes {
        return Err(Error::FileTooLarge {
            size: upload.size(),
            max: max_bytes,
        });
    }

    Ok(())
}

fn suffixed_name(name: &str) -> String {
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();

    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{stem}_{suffix}"),
    }
}

/// Writes a validated upload below `media_root` and returns its storage path,
/// relative to the media root (`accounting/<name>`).
pub async fn store_upload(media_root: &Path, upload: &FileUpload) -> Result<String> {
    let directory = media_root.join(UPLOAD_PREFIX);
    tokio::fs::create_dir_all(&directory).await?;

    let mut name = upload.name.clone();
    let mut file = loop {
        let open = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(directory.join(&name))
            .await;

        match open {
            Ok(file) => break file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                name = suffixed_name(&upload.name);
            }
            Err(e) => return Err(e.into()),
        }
    };

    file.write_all(&upload.bytes).await?;
    file.flush().await?;

    let stored = format!("{UPLOAD_PREFIX}/{name}");
    debug!("Stored upload {:?} as {stored}", upload.name);
    Ok(stored)
}

/// Removes a stored upload; a file that is already gone is not an error.
pub async fn remove_upload(media_root: &Path, stored: &str) -> Result<()> {
    match tokio::fs::remove_file(media_root.join(stored)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
