use crate::raster::Raster;

/// Source of images for pasting
pub trait ImageClipboard {
    /// The current clipboard image, if there is one
    fn image(&mut self) -> Option<Raster>;
}

/// Clipboard holding a fixed image, for headless use
#[derive(Debug, Clone, Default)]
pub struct StaticClipboard {
    pub image: Option<Raster>,
}

impl StaticClipboard {
    pub fn new(image: Raster) -> Self {
        Self { image: Some(image) }
    }
}

impl ImageClipboard for StaticClipboard {
    fn image(&mut self) -> Option<Raster> {
        self.image.clone()
    }
}

/// The operating system clipboard
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ImageClipboard for SystemClipboard {
    fn image(&mut self) -> Option<Raster> {
        if self.inner.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.inner = Some(clipboard),
                Err(err) => {
                    log::warn!("Clipboard unavailable: {err}");
                    return None;
                }
            }
        }
        let data = self.inner.as_mut()?.get_image().ok()?;
        let rgba = image::RgbaImage::from_raw(
            data.width as u32,
            data.height as u32,
            data.bytes.into_owned(),
        )?;
        Some(image::DynamicImage::ImageRgba8(rgba).to_rgb8())
    }
}
