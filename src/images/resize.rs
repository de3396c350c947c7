use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, GenericImageView, ImageFormat};
use thiserror::Error;

pub const DEFAULT_JPEG_QUALITY: u8 = 75;

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("resize error: failed to decode image: {0}")]
    Decode(String),

    #[error("resize error: failed to encode image: {0}")]
    Encode(String),
}

/// Image codec used by the proxy: decode a JPEG, fit it inside a box, encode it back.
pub trait Resizer: Send + Sync {
    fn fit(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ResizeError>;
}

/// Lanczos3 resampling with a fixed JPEG output quality.
pub struct LanczosResizer {
    quality: u8,
}

impl LanczosResizer {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for LanczosResizer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl Resizer for LanczosResizer {
    fn fit(&self, data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ResizeError> {
        let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
            .map_err(|e| ResizeError::Decode(e.to_string()))?;

        let (current_width, current_height) = img.dimensions();
        let (target_width, target_height) =
            fit_dimensions(current_width, current_height, width, height);

        let img = if (target_width, target_height) == (current_width, current_height) {
            img
        } else {
            img.resize_exact(target_width, target_height, FilterType::Lanczos3)
        };

        let rgb = img.to_rgb8();
        let mut output = Vec::new();
        JpegEncoder::new_with_quality(&mut output, self.quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|e| ResizeError::Encode(e.to_string()))?;

        Ok(output)
    }
}

/// Largest size with the source aspect ratio that fits in `max_width` x `max_height`.
/// Images already inside the box keep their size.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let src_aspect = width as f64 / height as f64;
    let max_aspect = max_width as f64 / max_height as f64;

    let (w, h) = if src_aspect > max_aspect {
        (max_width, (max_width as f64 / src_aspect).round() as u32)
    } else {
        ((max_height as f64 * src_aspect).round() as u32, max_height)
    };

    (w.clamp(1, max_width), h.clamp(1, max_height))
}
