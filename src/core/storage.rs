//! File storage - Salvataggio su disco locale dei file caricati
//!
//! I file finiscono sotto `<root>/<kind>/<uuid>.<ext>` e vengono esposti
//! dal router sotto `/uploads`.

use crate::core::AppError;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "jpg", "jpeg", "png"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Contract,
    Certificate,
    ProductImage,
    PackagingImage,
}

impl UploadKind {
    pub fn directory(self) -> &'static str {
        match self {
            UploadKind::Contract => "contracts",
            UploadKind::Certificate => "certificates",
            UploadKind::ProductImage => "products",
            UploadKind::PackagingImage => "packaging",
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            UploadKind::Contract | UploadKind::Certificate => DOCUMENT_EXTENSIONS,
            UploadKind::ProductImage | UploadKind::PackagingImage => IMAGE_EXTENSIONS,
        }
    }

    /// Lower-cased extension of `file_name` if this kind accepts it
    pub fn accepted_extension(self, file_name: &str) -> Option<String> {
        let extension = Path::new(file_name)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        self.allowed_extensions()
            .contains(&extension.as_str())
            .then_some(extension)
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL under which the router serves a stored file
    pub fn public_url(relative_path: &str) -> String {
        format!("/uploads/{}", relative_path)
    }

    /// Writes the file and returns its path relative to the store root
    #[instrument(skip(self, bytes), fields(kind = ?kind, size = bytes.len()))]
    pub async fn save(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        if bytes.is_empty() {
            warn!("Rejected empty upload");
            return Err(AppError::bad_request("Uploaded file is empty"));
        }
        let extension = kind.accepted_extension(original_name).ok_or_else(|| {
            warn!("Rejected upload with unsupported extension: {}", original_name);
            AppError::bad_request("Unsupported file type").with_details(format!(
                "Allowed extensions: {}",
                kind.allowed_extensions().join(", ")
            ))
        })?;

        let directory = self.root.join(kind.directory());
        fs::create_dir_all(&directory).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(directory.join(&file_name), bytes).await?;

        let relative = format!("{}/{}", kind.directory(), file_name);
        info!("Stored upload at {}", relative);
        Ok(relative)
    }

    /// Removes a stored file; a file that is already gone is not an error
    #[instrument(skip(self))]
    pub async fn remove(&self, relative_path: &str) -> Result<(), AppError> {
        let relative = Path::new(relative_path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            warn!("Refusing to remove path outside the upload root");
            return Err(AppError::bad_request("Invalid file path"));
        }
        match fs::remove_file(self.root.join(relative)).await {
            Ok(()) => {
                debug!("Removed stored file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Stored file already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_listed_extensions() {
        assert_eq!(
            UploadKind::Contract.accepted_extension("Contract.PDF").as_deref(),
            Some("pdf")
        );
        assert_eq!(UploadKind::ProductImage.accepted_extension("photo.pdf"), None);
        assert_eq!(UploadKind::Certificate.accepted_extension("noextension"), None);
    }

    #[tokio::test]
    async fn save_then_remove_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        let relative = store
            .save(UploadKind::Certificate, "iso.pdf", b"%PDF-1.4")
            .await
            .expect("file saved");
        assert!(relative.starts_with("certificates/"));
        assert!(relative.ends_with(".pdf"));
        assert!(dir.path().join(&relative).exists());

        store.remove(&relative).await.expect("file removed");
        assert!(!dir.path().join(&relative).exists());
        // second removal is a no-op
        store.remove(&relative).await.expect("idempotent remove");
    }

    #[tokio::test]
    async fn rejects_empty_files_and_path_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        let err = store
            .save(UploadKind::Contract, "c.pdf", b"")
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let err = store.remove("../secrets.txt").await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
