//! Media directory scanning.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use slidereel_models::{MediaItem, MediaKind};

use crate::error::{MediaError, MediaResult};

/// List the supported media files of `dir` as ordered, indexed items.
///
/// Entries are sorted by file name, filtered to regular files with a supported
/// extension, and indexed from zero in that order. Subdirectories (including
/// the scratch workspace) are skipped. An empty result is not an error.
pub async fn scan_media_dir(dir: &Path) -> MediaResult<Vec<MediaItem>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| MediaError::directory(dir, format!("cannot read media directory: {e}")))?;

    let mut candidates: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        // Follows symlinks so linked files are included
        let is_file = fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false);
        if is_file && MediaKind::from_path(&path).is_some() {
            candidates.push(path);
        } else {
            debug!(path = %path.display(), "Skipping unsupported entry");
        }
    }

    candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    candidates
        .into_iter()
        .enumerate()
        .map(|(index, path)| MediaItem::new(path, index).map_err(MediaError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_sorts_filters_and_indexes() {
        let dir = TempDir::new().unwrap();
        for name in ["b.MOV", "a.jpg", "notes.txt", "c.jpeg", "d.mp4", "e.png", "A.JPG"] {
            touch(dir.path(), name).await;
        }
        fs::create_dir(dir.path().join("sandbox")).await.unwrap();
        fs::create_dir(dir.path().join("folder.jpg")).await.unwrap();

        let items = scan_media_dir(dir.path()).await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.file_name()).collect();
        assert_eq!(names, vec!["A.JPG", "a.jpg", "b.MOV", "c.jpeg", "d.mp4"]);

        for (expected, item) in items.iter().enumerate() {
            assert_eq!(item.index(), expected);
        }
        assert_eq!(items[2].kind(), MediaKind::Video);
        assert_eq!(items[3].kind(), MediaKind::Photo);
    }

    #[tokio::test]
    async fn test_scan_empty_dir_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "readme.md").await;
        let items = scan_media_dir(dir.path()).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_scan_missing_dir_is_directory_error() {
        let dir = TempDir::new().unwrap();
        let err = scan_media_dir(&dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, MediaError::Directory { .. }));
    }
}
