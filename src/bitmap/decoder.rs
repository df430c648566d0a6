use std::sync::Arc;

use crate::color::CompositeColorTransform;
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::foundation::math::StableHasher;
use crate::movie::model::{ImageDef, ImageFormat};

/// Decoded bitmap referenced by image fills.
///
/// Pixels are straight (not premultiplied) RGBA8 rows with the color transform already applied.
/// `key` is a content hash: two handles with equal keys hold the same pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ImageData {
    /// Content hash of dimensions and pixels.
    pub key: u64,
    /// Pixel width after downsampling.
    pub width: u32,
    /// Pixel height after downsampling.
    pub height: u32,
    /// RGBA8 pixels.
    #[serde(skip)]
    pub rgba: Arc<Vec<u8>>,
}

impl ImageData {
    /// Wrap decoded pixels and compute their key.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        let mut h = StableHasher::new();
        h.write_u32(width);
        h.write_u32(height);
        h.write_bytes(&rgba);
        Self {
            key: h.finish(),
            width,
            height,
            rgba: Arc::new(rgba),
        }
    }
}

/// Turns image definitions into image handles.
pub trait ImageDecoder: Send + Sync {
    /// Decode `def` under the color transform `colors`.
    ///
    /// `density` is the pixels per inch the image is drawn at, which the decoder may use to
    /// downsample.
    fn decode(
        &self,
        def: &ImageDef,
        colors: &CompositeColorTransform,
        density: f64,
        locator: &Locator,
    ) -> ConvertResult<Arc<ImageData>>;
}

/// [`ImageDecoder`] built on the `image` crate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RasterImageDecoder {
    /// Images drawn denser than this (pixels per inch) are downsampled to it.
    pub max_density: Option<f64>,
}

impl RasterImageDecoder {
    /// Decoder downsampling above `max_density`.
    pub fn new(max_density: Option<f64>) -> Self {
        Self { max_density }
    }

    fn target_size(&self, width: u32, height: u32, density: f64) -> Option<(u32, u32)> {
        let max = self.max_density?;
        if !density.is_finite() || density <= max {
            return None;
        }
        let scale = max / density;
        let w = ((f64::from(width) * scale).round() as u32).max(1);
        let h = ((f64::from(height) * scale).round() as u32).max(1);
        Some((w, h))
    }
}

impl ImageDecoder for RasterImageDecoder {
    fn decode(
        &self,
        def: &ImageDef,
        colors: &CompositeColorTransform,
        density: f64,
        locator: &Locator,
    ) -> ConvertResult<Arc<ImageData>> {
        let mut rgba = decode_rgba(def, locator)?;
        if rgba.dimensions() != (def.width, def.height) {
            return Err(ConvertError::resource(
                locator,
                format!(
                    "image {} decodes to {}x{}, declared {}x{}",
                    def.id,
                    rgba.width(),
                    rgba.height(),
                    def.width,
                    def.height
                ),
            ));
        }
        if let Some((w, h)) = self.target_size(def.width, def.height, density) {
            rgba = image::imageops::resize(&rgba, w, h, image::imageops::FilterType::Triangle);
        }
        let (width, height) = rgba.dimensions();
        let mut pixels = rgba.into_raw();
        colors.apply_rgba8(&mut pixels);
        Ok(Arc::new(ImageData::new(width, height, pixels)))
    }
}

fn decode_rgba(def: &ImageDef, locator: &Locator) -> ConvertResult<image::RgbaImage> {
    let format = match def.format {
        ImageFormat::Rgba => {
            return image::RgbaImage::from_raw(def.width, def.height, def.data.clone()).ok_or_else(
                || {
                    ConvertError::resource(
                        locator,
                        format!(
                            "image {} has {} bytes, expected {}x{} RGBA",
                            def.id,
                            def.data.len(),
                            def.width,
                            def.height
                        ),
                    )
                },
            );
        }
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
    };
    let img = image::load_from_memory_with_format(&def.data, format).map_err(|e| {
        ConvertError::resource(locator, format!("decode image {}: {e}", def.id))
    })?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/decoder.rs"]
mod tests;
