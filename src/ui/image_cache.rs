//! Background decoding of invitation images into terminal graphics.
//!
//! Every request spawns a short-lived thread that decodes (and, for a URL
//! asset base, downloads) the image. Results come back over a channel that
//! the render loop drains once per frame.

use anyhow::{anyhow, Context, Result};
use image::{imageops::FilterType, DynamicImage};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use crate::assets::ImageItem;
use crate::carousel::Preloader;
use crate::config::ImageProtocol;

/// Cell size assumed when the terminal cannot report one.
pub const DEFAULT_FONT_SIZE: (u16, u16) = (8, 16);

const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REMOTE_BYTES: u64 = 20 * 1024 * 1024;

type LoadResult = (String, Result<DynamicImage, String>);

/// What the renderer can draw for a source right now
pub enum ImageSlot<'a> {
    Ready(&'a mut StatefulProtocol),
    Loading,
    /// Decoding failed; draw a placeholder
    Failed,
    /// The terminal has no graphics support
    Unsupported,
}

pub struct ImageCache {
    picker: Option<Picker>,
    /// Longest edge images are scaled to after decoding
    max_size: u32,
    images: HashMap<String, StatefulProtocol>,
    loading: HashSet<String>,
    failed: HashSet<String>,
    receiver: mpsc::Receiver<LoadResult>,
    sender: mpsc::Sender<LoadResult>,
}

impl ImageCache {
    pub fn new(protocol: ImageProtocol, max_size: u32) -> Self {
        Self::with_picker(create_picker(protocol), max_size)
    }

    pub fn with_picker(picker: Option<Picker>, max_size: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            picker,
            max_size,
            images: HashMap::new(),
            loading: HashSet::new(),
            failed: HashSet::new(),
            receiver: rx,
            sender: tx,
        }
    }

    /// Check if image preview is available
    pub fn is_available(&self) -> bool {
        self.picker.is_some()
    }

    /// Terminal cell size in pixels
    pub fn font_size(&self) -> (u16, u16) {
        self.picker
            .as_ref()
            .map(|p| p.font_size())
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Move finished decodes into the cache. Call once per frame.
    pub fn poll_async_loads(&mut self) {
        while let Ok((source, result)) = self.receiver.try_recv() {
            self.loading.remove(&source);
            match result {
                Ok(dyn_img) => {
                    if let Some(ref mut picker) = self.picker {
                        let protocol = picker.new_resize_protocol(dyn_img);
                        self.images.insert(source, protocol);
                    }
                }
                Err(e) => {
                    tracing::warn!(source = %source, "Failed to load image: {}", e);
                    self.failed.insert(source);
                }
            }
        }
    }

    /// Start loading `source` unless it is cached, in flight or known bad.
    /// Returns whether a load was started.
    pub fn request(&mut self, source: &str) -> bool {
        if self.picker.is_none()
            || self.images.contains_key(source)
            || self.loading.contains(source)
            || self.failed.contains(source)
        {
            return false;
        }

        self.loading.insert(source.to_string());
        let source = source.to_string();
        let sender = self.sender.clone();
        let max_size = self.max_size;

        std::thread::spawn(move || {
            let result = load_image(&source, max_size).map_err(|e| format!("{:#}", e));
            let _ = sender.send((source, result));
        });

        true
    }

    /// Look up `source`, starting a load on a miss.
    pub fn slot(&mut self, source: &str) -> ImageSlot<'_> {
        if self.picker.is_none() {
            return ImageSlot::Unsupported;
        }
        if self.failed.contains(source) {
            return ImageSlot::Failed;
        }
        if !self.images.contains_key(source) {
            self.request(source);
            return ImageSlot::Loading;
        }
        match self.images.get_mut(source) {
            Some(protocol) => ImageSlot::Ready(protocol),
            None => ImageSlot::Loading,
        }
    }

    pub fn is_ready(&self, source: &str) -> bool {
        self.images.contains_key(source)
    }

    pub fn is_loading(&self, source: &str) -> bool {
        self.loading.contains(source)
    }

    pub fn has_failed(&self, source: &str) -> bool {
        self.failed.contains(source)
    }
}

impl Preloader for ImageCache {
    fn preload(&mut self, item: &ImageItem) {
        if self.request(&item.source) {
            tracing::debug!(id = item.id, "Preloading {}", item.source);
        }
    }
}

fn create_picker(protocol: ImageProtocol) -> Option<Picker> {
    match protocol {
        ImageProtocol::None => None,
        ImageProtocol::Halfblocks => Some(Picker::from_fontsize(DEFAULT_FONT_SIZE)),
        ImageProtocol::Auto => match Picker::from_query_stdio() {
            Ok(picker) => Some(picker),
            Err(e) => {
                tracing::info!("Terminal graphics query failed ({}), using half blocks", e);
                Some(Picker::from_fontsize(DEFAULT_FONT_SIZE))
            }
        },
    }
}

/// Decode `source` (a file path or an http(s) URL) and scale it to fit
/// within `max_size` on both edges.
pub fn load_image(source: &str, max_size: u32) -> Result<DynamicImage> {
    let img = if source.starts_with("http://") || source.starts_with("https://") {
        let bytes = fetch_remote(source)?;
        image::load_from_memory(&bytes).with_context(|| format!("Failed to decode {}", source))?
    } else {
        image::ImageReader::open(Path::new(source))
            .with_context(|| format!("Failed to open {}", source))?
            .with_guessed_format()?
            .decode()
            .with_context(|| format!("Failed to decode {}", source))?
    };

    if img.width() > max_size || img.height() > max_size {
        Ok(img.resize(max_size, max_size, FilterType::Triangle))
    } else {
        Ok(img)
    }
}

fn fetch_remote(url: &str) -> Result<Vec<u8>> {
    let agent = ureq::AgentBuilder::new().timeout(REMOTE_TIMEOUT).build();
    let response = agent
        .get(url)
        .call()
        .map_err(|e| anyhow!("Request for {} failed: {}", url, e))?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_REMOTE_BYTES)
        .read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::time::Instant;
    use tempfile::tempdir;

    fn write_photo(dir: &Path, name: &str, width: u32, height: u32) -> String {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([200, 120, 80]))
            .save(&path)
            .unwrap();
        path.to_string_lossy().to_string()
    }

    fn wait_until(cache: &mut ImageCache, done: impl Fn(&ImageCache) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            cache.poll_async_loads();
            if done(cache) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("image load did not finish in time");
    }

    fn halfblocks_cache() -> ImageCache {
        ImageCache::with_picker(Some(Picker::from_fontsize(DEFAULT_FONT_SIZE)), 64)
    }

    #[test]
    fn test_load_image_scales_down_keeping_aspect() {
        let dir = tempdir().unwrap();
        let source = write_photo(dir.path(), "photo_1.png", 200, 100);
        let img = load_image(&source, 64).unwrap();
        assert_eq!((img.width(), img.height()), (64, 32));
    }

    #[test]
    fn test_load_image_keeps_small_images() {
        let dir = tempdir().unwrap();
        let source = write_photo(dir.path(), "photo_2.png", 20, 10);
        let img = load_image(&source, 64).unwrap();
        assert_eq!((img.width(), img.height()), (20, 10));
    }

    #[test]
    fn test_request_loads_in_background() {
        let dir = tempdir().unwrap();
        let source = write_photo(dir.path(), "photo_1.png", 32, 32);
        let mut cache = halfblocks_cache();

        assert!(cache.request(&source));
        assert!(!cache.request(&source), "duplicate request while loading");
        wait_until(&mut cache, |c| c.is_ready(&source));

        assert!(!cache.is_loading(&source));
        assert!(matches!(cache.slot(&source), ImageSlot::Ready(_)));
        assert!(!cache.request(&source));
    }

    #[test]
    fn test_missing_file_is_recorded_as_failed() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("photo_99.jpg").to_string_lossy().to_string();
        let mut cache = halfblocks_cache();

        assert!(matches!(cache.slot(&source), ImageSlot::Loading));
        wait_until(&mut cache, |c| c.has_failed(&source));

        assert!(matches!(cache.slot(&source), ImageSlot::Failed));
        assert!(!cache.request(&source));
    }

    #[test]
    fn test_without_graphics_nothing_loads() {
        let mut cache = ImageCache::with_picker(None, 64);
        assert!(!cache.is_available());
        assert_eq!(cache.font_size(), DEFAULT_FONT_SIZE);
        assert!(!cache.request("images/photo_1.jpg"));
        assert!(matches!(cache.slot("images/photo_1.jpg"), ImageSlot::Unsupported));
    }

    #[test]
    fn test_preload_requests_item_source() {
        let dir = tempdir().unwrap();
        let source = write_photo(dir.path(), "photo_3.png", 16, 16);
        let mut cache = halfblocks_cache();

        cache.preload(&ImageItem { id: 2, source: source.clone() });
        assert!(cache.is_loading(&source) || cache.is_ready(&source));
        wait_until(&mut cache, |c| c.is_ready(&source));
    }
}
