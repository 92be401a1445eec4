//! Temporary images awaiting vision analysis.
//!
//! A `TempImage` owns its file: dropping the guard deletes it, whether the
//! backend call succeeded or not.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image file name: {0:?}")]
    InvalidName(String),
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct TempImage {
    path: PathBuf,
}

impl TempImage {
    /// Resolve a bare file name inside `dir` to an absolute path.
    /// A relative `dir` is taken from the working directory.
    /// Names with directory parts are rejected.
    pub fn resolve(dir: &Path, file_name: &str) -> Result<Self, ImageError> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(ImageError::InvalidName(file_name.to_string())),
        }

        let path = dir.join(file_name);
        let path = if path.is_absolute() {
            path
        } else {
            match std::env::current_dir() {
                Ok(cwd) => cwd.join(&path),
                Err(e) => {
                    tracing::warn!(
                        "Cannot resolve working directory ({}), using relative image path {}",
                        e,
                        path.display()
                    );
                    path
                }
            }
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the image and encode it the way the backend expects.
    pub async fn read_base64(&self) -> Result<String, ImageError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ImageError::Read {
                path: self.path.clone(),
                source,
            })?;
        Ok(STANDARD.encode(bytes))
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        cleanup(&self.path);
    }
}

/// Remove a temp image. A file that is already gone is not an error.
pub fn cleanup(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed temp image {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::trace!("Temp image {} already removed", path.display())
        }
        Err(e) => tracing::warn!("Failed to remove temp image {}: {}", path.display(), e),
    }
}
