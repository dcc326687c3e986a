//! Whole-image filters fed through [`crate::Canvas::apply_filter`].

use image::{DynamicImage, GrayImage, Luma, Rgb, imageops};
use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// 3×3 sharpening kernel blended in by [`Adjustments::sharpness`]
const SHARPEN_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];
const LAPLACIAN_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
/// Laplacian response at or above this counts as an edge
const EDGE_THRESHOLD: u8 = 48;
const MEDIAN_RADIUS: u32 = 2;

/// Filters offered by the Image menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    FlipHorizontal,
    FlipVertical,
    RotateClockwise,
    RotateCounterClockwise,
    Grayscale,
    Sepia,
    Invert,
    Blur,
    MedianBlur,
    Sharpen,
    EqualizeHistogram,
    DetectEdges,
}

impl Filter {
    pub const ALL: [Filter; 12] = [
        Filter::FlipHorizontal,
        Filter::FlipVertical,
        Filter::RotateClockwise,
        Filter::RotateCounterClockwise,
        Filter::Grayscale,
        Filter::Sepia,
        Filter::Invert,
        Filter::Blur,
        Filter::MedianBlur,
        Filter::Sharpen,
        Filter::EqualizeHistogram,
        Filter::DetectEdges,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Filter::FlipHorizontal => "Flip horizontal",
            Filter::FlipVertical => "Flip vertical",
            Filter::RotateClockwise => "Rotate 90° clockwise",
            Filter::RotateCounterClockwise => "Rotate 90° counter-clockwise",
            Filter::Grayscale => "Grayscale",
            Filter::Sepia => "Sepia",
            Filter::Invert => "Invert colors",
            Filter::Blur => "Blur",
            Filter::MedianBlur => "Median blur",
            Filter::Sharpen => "Sharpen",
            Filter::EqualizeHistogram => "Equalize histogram",
            Filter::DetectEdges => "Detect edges",
        }
    }

    pub fn apply(self, raster: &Raster) -> Raster {
        match self {
            Filter::FlipHorizontal => imageops::flip_horizontal(raster),
            Filter::FlipVertical => imageops::flip_vertical(raster),
            Filter::RotateClockwise => imageops::rotate90(raster),
            Filter::RotateCounterClockwise => imageops::rotate270(raster),
            Filter::Grayscale => grayscale(raster),
            Filter::Sepia => sepia(raster),
            Filter::Invert => invert(raster),
            Filter::Blur => imageops::blur(raster, 2.0),
            Filter::MedianBlur => median_blur(raster, MEDIAN_RADIUS),
            Filter::Sharpen => imageops::unsharpen(raster, 1.5, 2),
            Filter::EqualizeHistogram => equalize_histogram(raster),
            Filter::DetectEdges => detect_edges(raster),
        }
    }
}

/// Tonal and color adjustments, applied in field order.
///
/// The default value leaves an image untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Added to every channel, -255..=255
    pub brightness: i32,
    /// Percent, -100..=100
    pub contrast: f32,
    /// Percent, -100 removes all color
    pub saturation: i32,
    /// Degrees, -180..=180
    pub hue: i32,
    /// Blend factor towards the sharpened image, 0..=1
    pub sharpness: f32,
    /// 1.0 is neutral; larger values lift the midtones
    pub gamma: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            brightness: 0,
            contrast: 0.0,
            saturation: 0,
            hue: 0,
            sharpness: 0.0,
            gamma: 1.0,
        }
    }
}

impl Adjustments {
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Same adjustments with every field forced into its valid range.
    pub fn clamped(self) -> Self {
        Self {
            brightness: self.brightness.clamp(-255, 255),
            contrast: self.contrast.clamp(-100.0, 100.0),
            saturation: self.saturation.clamp(-100, 100),
            hue: self.hue.clamp(-180, 180),
            sharpness: self.sharpness.clamp(0.0, 1.0),
            gamma: self.gamma.clamp(0.1, 10.0),
        }
    }

    pub fn apply(&self, raster: &Raster) -> Raster {
        let adjust = self.clamped();
        let mut out = raster.clone();
        if adjust.brightness != 0 {
            out = imageops::brighten(&out, adjust.brightness);
        }
        if adjust.contrast != 0.0 {
            out = imageops::contrast(&out, adjust.contrast);
        }
        if adjust.saturation != 0 {
            out = saturate(&out, 1.0 + adjust.saturation as f32 / 100.0);
        }
        if adjust.hue != 0 {
            out = imageops::huerotate(&out, adjust.hue);
        }
        if adjust.sharpness > 0.0 {
            out = sharpen_blend(&out, adjust.sharpness);
        }
        if adjust.gamma != 1.0 {
            out = gamma(&out, adjust.gamma);
        }
        out
    }
}

/// Luma conversion kept in three channels.
pub fn grayscale(raster: &Raster) -> Raster {
    DynamicImage::ImageLuma8(imageops::grayscale(raster)).to_rgb8()
}

pub fn sepia(raster: &Raster) -> Raster {
    const KERNEL: [[f32; 3]; 3] = [
        [0.393, 0.769, 0.189],
        [0.349, 0.686, 0.168],
        [0.272, 0.534, 0.131],
    ];
    let mut out = raster.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b] = pixel.0.map(f32::from);
        let channel = |row: [f32; 3]| (row[0] * r + row[1] * g + row[2] * b).round().min(255.0) as u8;
        *pixel = Rgb([channel(KERNEL[0]), channel(KERNEL[1]), channel(KERNEL[2])]);
    }
    out
}

pub fn invert(raster: &Raster) -> Raster {
    let mut out = raster.clone();
    imageops::invert(&mut out);
    out
}

/// Scales each pixel's distance from its luma by `factor`.
pub fn saturate(raster: &Raster, factor: f32) -> Raster {
    let mut out = raster.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b] = pixel.0.map(f32::from);
        let luma = 0.299 * r + 0.587 * g + 0.114 * b;
        *pixel = Rgb(pixel
            .0
            .map(|c| (luma + (f32::from(c) - luma) * factor).round().clamp(0.0, 255.0) as u8));
    }
    out
}

/// Border pixels are left as they are; `filter3x3` does not fill them.
fn sharpen_blend(raster: &Raster, amount: f32) -> Raster {
    let (width, height) = raster.dimensions();
    let sharpened: Raster = imageops::filter3x3(raster, &SHARPEN_KERNEL);
    let mut out = raster.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            continue;
        }
        for (c, s) in pixel.0.iter_mut().zip(sharpened.get_pixel(x, y).0) {
            let blended = f32::from(*c) * (1.0 - amount) + f32::from(s) * amount;
            *c = blended.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Gamma correction through a lookup table: `out = 255 * (in / 255)^(1 / gamma)`.
pub fn gamma(raster: &Raster, gamma: f32) -> Raster {
    let inverse = 1.0 / gamma.max(f32::EPSILON);
    let table: [u8; 256] =
        std::array::from_fn(|i| ((i as f32 / 255.0).powf(inverse) * 255.0).min(255.0) as u8);
    let mut out = raster.clone();
    for pixel in out.pixels_mut() {
        *pixel = Rgb(pixel.0.map(|c| table[usize::from(c)]));
    }
    out
}

/// Spreads the luma histogram over the full range. Chroma is kept, so every
/// channel moves by the same amount as its pixel's luma.
pub fn equalize_histogram(raster: &Raster) -> Raster {
    let luma = imageops::grayscale(raster);
    let mut histogram = [0u64; 256];
    for Luma([y]) in luma.pixels() {
        histogram[usize::from(*y)] += 1;
    }

    let mut cdf = [0u64; 256];
    let mut running = 0;
    for (slot, count) in cdf.iter_mut().zip(histogram) {
        running += count;
        *slot = running;
    }
    let total = running;
    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    if total <= cdf_min {
        // Single tone
        return raster.clone();
    }
    let range = (total - cdf_min) as f32;
    let table: [u8; 256] = std::array::from_fn(|i| {
        (cdf[i].saturating_sub(cdf_min) as f32 * 255.0 / range).round() as u8
    });

    let mut out = raster.clone();
    for (pixel, Luma([y])) in out.pixels_mut().zip(luma.pixels()) {
        let shift = i16::from(table[usize::from(*y)]) - i16::from(*y);
        *pixel = Rgb(pixel.0.map(|c| (i16::from(c) + shift).clamp(0, 255) as u8));
    }
    out
}

/// Per-channel median over a `(2 * radius + 1)` square window, edges clamped.
pub fn median_blur(raster: &Raster, radius: u32) -> Raster {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 || radius == 0 {
        return raster.clone();
    }
    let radius = radius as i64;
    let mut window: Vec<[u8; 3]> = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
    let mut out = raster.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        window.clear();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let sx = (i64::from(x) + dx).clamp(0, i64::from(width) - 1) as u32;
                let sy = (i64::from(y) + dy).clamp(0, i64::from(height) - 1) as u32;
                window.push(raster.get_pixel(sx, sy).0);
            }
        }
        let middle = window.len() / 2;
        let mut channels = [0u8; 3];
        for (channel, value) in channels.iter_mut().enumerate() {
            let mut samples: Vec<u8> = window.iter().map(|p| p[channel]).collect();
            samples.sort_unstable();
            *value = samples[middle];
        }
        *pixel = Rgb(channels);
    }
    out
}

/// White edges on black, from a thresholded Laplacian of the luma.
pub fn detect_edges(raster: &Raster) -> Raster {
    let luma = imageops::grayscale(raster);
    let response: GrayImage = imageops::filter3x3(&luma, &LAPLACIAN_KERNEL);
    let edges = GrayImage::from_fn(response.width(), response.height(), |x, y| {
        let Luma([value]) = *response.get_pixel(x, y);
        Luma([if value >= EDGE_THRESHOLD { 255 } else { 0 }])
    });
    DynamicImage::ImageLuma8(edges).to_rgb8()
}
