use std::path::Path;

use egui::Color32;
use image::{ImageFormat, Rgb};
use thiserror::Error;

use crate::raster::Raster;

/// Errors that can occur while reading or writing image files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode or encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Image has no pixels")]
    Empty,
}

pub type IoResult<T> = Result<T, IoError>;

/// Extensions the editor offers to open and save
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// Whether `path` has one of the supported image extensions
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decodes the file at `path` into an RGB raster.
pub fn open_raster(path: impl AsRef<Path>) -> IoResult<Raster> {
    let path = path.as_ref();
    log::info!("Opening image {}", path.display());
    let raster = image::open(path)?.to_rgb8();
    non_empty(raster)
}

/// Decodes image file contents, guessing the format from the data.
pub fn decode_raster(bytes: &[u8]) -> IoResult<Raster> {
    let raster = image::load_from_memory(bytes)?.to_rgb8();
    non_empty(raster)
}

/// Encodes `raster` with the format implied by the extension of `path`.
pub fn save_raster(path: impl AsRef<Path>, raster: &Raster) -> IoResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)
        .map_err(|_| IoError::UnsupportedFormat(path.display().to_string()))?;
    if !format.can_write() {
        return Err(IoError::UnsupportedFormat(format!("{format:?}")));
    }
    raster.save_with_format(path, format)?;
    log::info!(
        "Saved {}x{} image to {}",
        raster.width(),
        raster.height(),
        path.display()
    );
    Ok(())
}

/// A raster of `width` x `height` filled with `color`. Alpha is ignored.
pub fn blank_raster(width: u32, height: u32, color: Color32) -> Raster {
    Raster::from_pixel(width, height, Rgb([color.r(), color.g(), color.b()]))
}

fn non_empty(raster: Raster) -> IoResult<Raster> {
    if raster.width() == 0 || raster.height() == 0 {
        return Err(IoError::Empty);
    }
    Ok(raster)
}
