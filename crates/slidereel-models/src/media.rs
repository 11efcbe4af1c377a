//! Media items discovered in the input directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ModelError, ModelResult};

/// Photo extensions accepted by the inventory (lowercase, without dot).
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Video extensions accepted by the inventory (lowercase, without dot).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];

/// Kind of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image, rendered with a metadata caption
    Photo,
    /// Video clip, re-encoded without audio
    Video,
}

impl MediaKind {
    /// Classify a file extension (case-insensitive, with or without a leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Photo)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One supported file of the input directory.
///
/// `index` is the item's position in the sorted, filtered listing. It decides
/// the item's place in the assembled video and is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    path: PathBuf,
    kind: MediaKind,
    index: usize,
}

impl MediaItem {
    /// Create an item, classifying it by extension.
    pub fn new(path: impl Into<PathBuf>, index: usize) -> ModelResult<Self> {
        let path = path.into();
        let kind = MediaKind::from_path(&path)
            .ok_or_else(|| ModelError::unsupported_media(path.display().to_string()))?;
        Ok(Self { path, kind, index })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_photo(&self) -> bool {
        self.kind == MediaKind::Photo
    }

    /// File name for log output.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
