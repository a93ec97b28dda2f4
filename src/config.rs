use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::invitation::Invitation;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Program used to open links (e.g. "firefox"). If not set, uses the
    /// system default (xdg-open on Linux, open on macOS)
    #[serde(default)]
    pub opener: Option<String>,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub gallery: GalleryConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub share: ShareConfig,

    #[serde(default)]
    pub maps: MapsConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub invitation: Invitation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory (or URL prefix) holding `images/` and `audio/`
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Public address of the invitation, used for share and copy-link
    #[serde(default = "default_page_url")]
    pub page_url: String,
}

fn default_base_path() -> String {
    "public".to_string()
}

fn default_page_url() -> String {
    "https://wedding.example.com/".to_string()
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            page_url: default_page_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Number of `images/photo_N.jpg` files
    #[serde(default = "default_photo_count")]
    pub photo_count: usize,

    /// Slide transition length in milliseconds
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,
}

fn default_photo_count() -> usize {
    17
}

fn default_transition_ms() -> u64 {
    300
}

impl GalleryConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            photo_count: default_photo_count(),
            transition_ms: default_transition_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageProtocol {
    #[default]
    Auto,
    Halfblocks,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default)]
    pub protocol: ImageProtocol,

    /// Longest edge, in pixels, images are scaled to before display
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u32,
}

fn default_max_image_size() -> u32 {
    1024
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            protocol: ImageProtocol::default(),
            max_image_size: default_max_image_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShareConfig {
    /// Share-sheet helper, called as `<command..> <title> <url> <description>`
    #[serde(default)]
    pub share_command: Option<Vec<String>>,

    /// Enables Kakao sharing when set
    #[serde(default)]
    pub kakao_app_key: Option<String>,

    /// Overrides the clipboard command (e.g. ["wl-copy"])
    #[serde(default)]
    pub clipboard_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Wait before falling back to the web map, in milliseconds
    #[serde(default = "default_fallback_ms")]
    pub fallback_ms: u64,

    /// App identifier passed to Naver Map
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

fn default_fallback_ms() -> u64 {
    1000
}

fn default_app_name() -> String {
    "com.wedding.invitation".to_string()
}

impl MapsConfig {
    pub fn fallback_after(&self) -> Duration {
        Duration::from_millis(self.fallback_ms)
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            fallback_ms: default_fallback_ms(),
            app_name: default_app_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Player command; the track path is appended
    #[serde(default = "crate::audio::default_player")]
    pub player: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            player: crate::audio::default_player(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wedding-invite")
    }

    fn config_path() -> PathBuf {
        match std::env::var_os("WEDDING_INVITE_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => Self::config_dir().join("config.toml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.gallery.photo_count, 17);
        assert_eq!(config.gallery.transition(), Duration::from_millis(300));
        assert_eq!(config.maps.fallback_after(), Duration::from_millis(1000));
        assert_eq!(config.maps.app_name, "com.wedding.invitation");
        assert!(config.share.kakao_app_key.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
opener = "firefox"

[gallery]
photo_count = 5

[share]
kakao_app_key = "abc123"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.gallery.photo_count, 5);
        assert_eq!(config.gallery.transition_ms, 300);
        assert_eq!(config.share.kakao_app_key.as_deref(), Some("abc123"));
        assert_eq!(config.opener.as_deref(), Some("firefox"));
        assert_eq!(config.assets.base_path, "public");
        assert_eq!(config.invitation, Invitation::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.assets.base_path = "/srv/invite".to_string();
        config.preview.protocol = ImageProtocol::Halfblocks;
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.assets.base_path, "/srv/invite");
        assert_eq!(reloaded.preview.protocol, ImageProtocol::Halfblocks);
        assert_eq!(reloaded.audio.player, crate::audio::default_player());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gallery\nphoto_count = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
