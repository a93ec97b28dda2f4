//! Asset naming convention and the gallery catalog.

use std::path::PathBuf;

pub const HERO_IMAGE: &str = "images/main.jpg";
pub const MAP_IMAGE: &str = "images/map.jpg";
pub const SHARE_PREVIEW_IMAGE: &str = "images/og-image.jpg";
pub const BACKGROUND_MUSIC: &str = "audio/background-music.mp3";

/// One gallery photo. `id` is 0-based while file names are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub id: usize,
    pub source: String,
}

impl ImageItem {
    /// File name shown when the photo cannot be loaded
    pub fn file_name(&self) -> String {
        gallery_file_name(self.id)
    }
}

/// Relative path of the gallery photo with the given 0-based id.
pub fn gallery_path(id: usize) -> String {
    format!("images/{}", gallery_file_name(id))
}

fn gallery_file_name(id: usize) -> String {
    format!("photo_{}.jpg", id + 1)
}

/// Resolves asset paths against a base that may be a directory or a URL
/// prefix, so the invitation can live under a sub-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocator {
    base: String,
}

impl AssetLocator {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Join `relative` onto the base with exactly one separator.
    pub fn resolve(&self, relative: &str) -> String {
        let relative = relative.trim_start_matches('/');
        format!("{}/{}", self.base, relative)
    }

    /// Filesystem location of an asset.
    pub fn local_path(&self, relative: &str) -> PathBuf {
        let relative = relative.trim_start_matches('/');
        if self.base.is_empty() {
            PathBuf::from(relative)
        } else {
            PathBuf::from(&self.base).join(relative)
        }
    }

    pub fn is_remote(&self) -> bool {
        self.base.starts_with("http://") || self.base.starts_with("https://")
    }

    pub fn hero(&self) -> String {
        self.resolve(HERO_IMAGE)
    }

    pub fn map(&self) -> String {
        self.resolve(MAP_IMAGE)
    }

    pub fn share_preview(&self) -> String {
        self.resolve(SHARE_PREVIEW_IMAGE)
    }

    pub fn background_music(&self) -> String {
        self.resolve(BACKGROUND_MUSIC)
    }
}

/// Build the ordered gallery catalog. Order defines carousel adjacency.
pub fn build_catalog(locator: &AssetLocator, count: usize) -> Vec<ImageItem> {
    (0..count)
        .map(|id| ImageItem {
            id,
            source: locator.resolve(&gallery_path(id)),
        })
        .collect()
}
