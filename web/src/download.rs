// File download sink. A browser host triggers a download; headless hosts write to a
// directory or keep the blobs in memory.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::UiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

pub trait Downloader: Send + Sync {
    fn download(&self, blob: Blob) -> Result<(), UiError>;
}

/// Writes each blob into `dir`, keeping only the final component of its filename.
#[derive(Debug, Clone)]
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn target(&self, filename: &str) -> Result<PathBuf, UiError> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| UiError::DomError(format!("invalid download filename '{}'", filename)))?;
        Ok(self.dir.join(name))
    }
}

impl Downloader for DirectoryDownloader {
    fn download(&self, blob: Blob) -> Result<(), UiError> {
        let target = self.target(&blob.filename)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&target, &blob.bytes)?;
        tracing::info!(path = %target.display(), bytes = blob.bytes.len(), "Download saved");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingDownloader {
    blobs: Mutex<Vec<Blob>>,
}

impl RecordingDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blobs(&self) -> Vec<Blob> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Downloader for RecordingDownloader {
    fn download(&self, blob: Blob) -> Result<(), UiError> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).push(blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_downloader_writes_file() {
        let dir = TempDir::new().unwrap();
        let downloader = DirectoryDownloader::new(dir.path().join("descargas"));
        downloader
            .download(Blob::new("clientes.csv", "text/csv", b"a,b".to_vec()))
            .unwrap();
        let written = fs::read_to_string(dir.path().join("descargas/clientes.csv")).unwrap();
        assert_eq!(written, "a,b");
    }

    #[test]
    fn test_directory_downloader_strips_path_components() {
        let dir = TempDir::new().unwrap();
        let downloader = DirectoryDownloader::new(dir.path());
        downloader
            .download(Blob::new("../../escape.csv", "text/csv", b"x".to_vec()))
            .unwrap();
        assert!(dir.path().join("escape.csv").exists());
    }

    #[test]
    fn test_directory_downloader_rejects_empty_name() {
        let dir = TempDir::new().unwrap();
        let downloader = DirectoryDownloader::new(dir.path());
        let err = downloader.download(Blob::new("..", "text/csv", Vec::new())).unwrap_err();
        assert!(matches!(err, UiError::DomError(_)));
    }

    #[test]
    fn test_recording_downloader_keeps_blobs() {
        let downloader = RecordingDownloader::new();
        downloader.download(Blob::new("data.csv", "text/csv", b"1".to_vec())).unwrap();
        let blobs = downloader.blobs();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].text(), Some("1"));
    }
}
