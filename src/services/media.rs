//! Filesystem-backed media host for product image/video attachments.
//!
//! Uploads land under a configured root directory and are addressed by an
//! opaque public path, so the rest of the system only ever sees a
//! [`MediaRef`] and never the storage layout.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use actix_multipart::form::tempfile::TempFile;
use chrono::Utc;
use thiserror::Error;

use crate::domain::types::{MediaRef, TypeConstraintError};

/// Upper bound on accepted uploads, mirrored by the multipart field limit.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum MediaUploadError {
    #[error("Only images and MP4 videos are allowed")]
    UnsupportedType,
    #[error("uploaded file exceeds the 50MB limit")]
    TooLarge,
    #[error("uploaded file is empty")]
    Empty,
    #[error("invalid media reference: {0}")]
    Reference(#[from] TypeConstraintError),
    #[error("failed to store uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaUploadError {
    /// Whether the failure was caused by the upload itself (maps to 400)
    /// rather than by the storage backend (maps to 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType | Self::TooLarge | Self::Empty
        )
    }
}

/// Stores uploads on disk and hands out their public paths.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    public_path: String,
}

impl MediaStorage {
    /// Create the storage rooted at `root`, creating the directory if needed.
    /// `public_path` is the URL prefix the stored objects are served under.
    pub fn new(root: impl Into<PathBuf>, public_path: impl Into<String>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let mut public_path = public_path.into();
        while public_path.ends_with('/') {
            public_path.pop();
        }

        Ok(Self { root, public_path })
    }

    /// Persist an uploaded file and return its public reference.
    ///
    /// Accepts `image/*` and `video/mp4` payloads up to [`MAX_UPLOAD_BYTES`].
    pub fn store_upload(&self, file: &mut TempFile) -> Result<MediaRef, MediaUploadError> {
        if !is_supported(file) {
            return Err(MediaUploadError::UnsupportedType);
        }
        if file.size == 0 {
            return Err(MediaUploadError::Empty);
        }
        if file.size > MAX_UPLOAD_BYTES {
            return Err(MediaUploadError::TooLarge);
        }

        let object_name = object_name(file.file_name.as_deref());

        let handle = file.file.as_file_mut();
        handle.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::with_capacity(file.size);
        handle.read_to_end(&mut bytes)?;

        fs::write(self.root.join(&object_name), &bytes)?;

        Ok(MediaRef::new(format!(
            "{}/{object_name}",
            self.public_path
        ))?)
    }
}

fn is_supported(file: &TempFile) -> bool {
    match file.content_type.as_ref() {
        Some(mime) => {
            let essence = mime.essence_str();
            essence.starts_with("image/") || essence == "video/mp4"
        }
        None => false,
    }
}

/// Object names carry a millisecond timestamp prefix so re-uploads of the
/// same file never collide.
fn object_name(file_name: Option<&str>) -> String {
    let file_name = file_name.unwrap_or("upload");
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (file_name, None),
    };

    let stem = sanitize(stem);
    let millis = Utc::now().timestamp_millis();
    match extension {
        Some(extension) => format!("{millis}-{stem}.{}", sanitize(extension)),
        None => format!("{millis}-{stem}"),
    }
}

fn sanitize(value: &str) -> String {
    let cleaned = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect::<String>();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_upload(content_type: Option<&str>, file_name: Option<&str>, body: &[u8]) -> TempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body).unwrap();
        TempFile {
            file,
            content_type: content_type.map(|value| value.parse().unwrap()),
            file_name: file_name.map(str::to_string),
            size: body.len(),
        }
    }

    #[test]
    fn stores_images_and_returns_a_public_reference() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media/").unwrap();
        let mut upload = temp_upload(Some("image/png"), Some("My Widget.png"), b"png-bytes");

        let media_ref = storage.store_upload(&mut upload).unwrap();

        assert!(media_ref.as_str().starts_with("/media/"));
        assert!(media_ref.as_str().ends_with("-My-Widget.png"));
        let stored = dir
            .path()
            .join(media_ref.as_str().trim_start_matches("/media/"));
        assert_eq!(fs::read(stored).unwrap(), b"png-bytes");
    }

    #[test]
    fn rejects_unsupported_content_types() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media").unwrap();
        let mut upload = temp_upload(Some("application/pdf"), Some("doc.pdf"), b"%PDF");

        assert!(matches!(
            storage.store_upload(&mut upload).unwrap_err(),
            MediaUploadError::UnsupportedType
        ));
    }

    #[test]
    fn rejects_uploads_without_a_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media").unwrap();
        let mut upload = temp_upload(None, Some("mystery.bin"), b"??");

        assert!(matches!(
            storage.store_upload(&mut upload).unwrap_err(),
            MediaUploadError::UnsupportedType
        ));
    }

    #[test]
    fn accepts_mp4_videos() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media").unwrap();
        let mut upload = temp_upload(Some("video/mp4"), Some("clip.mp4"), b"mp4-bytes");

        assert!(storage.store_upload(&mut upload).is_ok());
    }

    #[test]
    fn rejects_empty_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media").unwrap();
        let mut upload = temp_upload(Some("image/png"), Some("empty.png"), b"");

        assert!(matches!(
            storage.store_upload(&mut upload).unwrap_err(),
            MediaUploadError::Empty
        ));
    }
}
