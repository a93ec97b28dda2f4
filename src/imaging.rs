//! Build-time image utilities: favicon generation and hero image optimization.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assets::HERO_IMAGE;

/// Edge length of the generated favicon.
pub const FAVICON_SIZE: u32 = 256;
/// Widest the hero image is allowed to be after optimization.
pub const MAX_MAIN_WIDTH: u32 = 1200;
pub const JPEG_QUALITY: u8 = 85;

const BACKUP_NAME: &str = "main-original.jpg";
const OPTIMIZED_NAME: &str = "main-optimized.jpg";

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("image not found: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to process {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ImagingError + '_ {
    move |source| ImagingError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn image_error(path: &Path) -> impl FnOnce(image::ImageError) -> ImagingError + '_ {
    move |source| ImagingError::Image {
        path: path.to_path_buf(),
        source,
    }
}

fn open_image(path: &Path) -> Result<DynamicImage, ImagingError> {
    if !path.exists() {
        return Err(ImagingError::MissingSource(path.to_path_buf()));
    }
    image::ImageReader::open(path)
        .map_err(io_error(path))?
        .with_guessed_format()
        .map_err(io_error(path))?
        .decode()
        .map_err(image_error(path))
}

/// Largest size with the same aspect ratio that fits in a `max` square.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width >= height {
        let h = (u64::from(height) * u64::from(max) / u64::from(width)).max(1);
        (max, h as u32)
    } else {
        let w = (u64::from(width) * u64::from(max) / u64::from(height)).max(1);
        (w as u32, max)
    }
}

/// Size after limiting the width to `max_width`. Never enlarges.
pub fn limit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let h = (f64::from(height) * f64::from(max_width) / f64::from(width)).round() as u32;
    (max_width, h.max(1))
}

/// Center `img` on a transparent square canvas, scaled to fit.
pub fn square_favicon(img: &DynamicImage, size: u32) -> RgbaImage {
    let (w, h) = fit_within(img.width(), img.height(), size);
    let resized = img.resize_exact(w, h, FilterType::Lanczos3).to_rgba8();

    let mut canvas = RgbaImage::new(size, size);
    let x = i64::from((size - w) / 2);
    let y = i64::from((size - h) / 2);
    imageops::overlay(&mut canvas, &resized, x, y);
    canvas
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconOutput {
    pub png: PathBuf,
    pub ico: PathBuf,
}

/// Write `favicon.png` and `favicon.ico` into `public_dir`.
pub fn generate_favicon(source: &Path, public_dir: &Path) -> Result<FaviconOutput, ImagingError> {
    let img = open_image(source)?;
    let canvas = square_favicon(&img, FAVICON_SIZE);

    fs::create_dir_all(public_dir).map_err(io_error(public_dir))?;
    let png = public_dir.join("favicon.png");
    let ico = public_dir.join("favicon.ico");

    canvas
        .save_with_format(&png, ImageFormat::Png)
        .map_err(image_error(&png))?;
    canvas
        .save_with_format(&ico, ImageFormat::Ico)
        .map_err(image_error(&ico))?;

    tracing::info!(source = %source.display(), "Favicon written to {}", public_dir.display());
    Ok(FaviconOutput { png, ico })
}

/// Before/after figures of a hero image optimization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeReport {
    pub original_size: (u32, u32),
    pub original_bytes: u64,
    pub optimized_size: (u32, u32),
    pub optimized_bytes: u64,
    /// A backup of the untouched image was written on this run
    pub backup_created: bool,
    pub backup: PathBuf,
}

impl OptimizeReport {
    /// Percentage of bytes saved; negative when the file grew.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.optimized_bytes as f64 / self.original_bytes as f64) * 100.0
    }
}

/// Shrink `images/main.jpg` under `public_dir` to at most `MAX_MAIN_WIDTH`
/// wide and re-encode it. The untouched image is kept as
/// `images/main-original.jpg` the first time this runs.
pub fn optimize_main(public_dir: &Path) -> Result<OptimizeReport, ImagingError> {
    let input = public_dir.join(HERO_IMAGE);
    if !input.exists() {
        return Err(ImagingError::MissingSource(input));
    }
    let images_dir = input.parent().unwrap_or(public_dir).to_path_buf();
    let backup = images_dir.join(BACKUP_NAME);
    let output = images_dir.join(OPTIMIZED_NAME);

    let backup_created = !backup.exists();
    if backup_created {
        fs::copy(&input, &backup).map_err(io_error(&backup))?;
        tracing::info!("Backed up original to {}", backup.display());
    }

    let original_bytes = fs::metadata(&input).map_err(io_error(&input))?.len();
    let img = open_image(&input)?;
    let original_size = (img.width(), img.height());

    let (w, h) = limit_width(img.width(), img.height(), MAX_MAIN_WIDTH);
    let resized = if (w, h) == original_size {
        img
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    };

    let result = write_jpeg(&resized, &output).and_then(|()| {
        let optimized_bytes = fs::metadata(&output).map_err(io_error(&output))?.len();
        fs::rename(&output, &input).map_err(io_error(&input))?;
        Ok(optimized_bytes)
    });
    let optimized_bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = fs::remove_file(&output);
            return Err(e);
        }
    };

    let report = OptimizeReport {
        original_size,
        original_bytes,
        optimized_size: (resized.width(), resized.height()),
        optimized_bytes,
        backup_created,
        backup,
    };
    tracing::info!(
        reduction = %format!("{:.1}%", report.reduction_percent()),
        "Optimized {}",
        input.display()
    );
    Ok(report)
}

fn write_jpeg(img: &DynamicImage, path: &Path) -> Result<(), ImagingError> {
    let file = fs::File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
        .encode_image(&img.to_rgb8())
        .map_err(image_error(path))?;
    // Dropping the writer would swallow a failed final flush
    writer.flush().map_err(io_error(path))
}
