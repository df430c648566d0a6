use crate::bitmap::decoder::ImageDecoder;
use crate::color::CompositeColorTransform;
use crate::config::ConvertConfig;
use crate::foundation::core::{Affine, POINTS_PER_INCH};
use crate::foundation::error::{ConvertError, ConvertResult, Locator};
use crate::ir::path::{FillStyle, GradientStop, LineCap, LineJoin, LineStyle};
use crate::movie::model::{
    BitmapFillDef, Dictionary, FillStyleDef, GradientDef, InterpolationMode, LineStyleDef,
    SpreadMode,
};
use crate::shape::builder::StyleResolver;

const GRADIENT_MAX_RATIO: f64 = 255.0;

/// Resolves shape styles at one point of the scene tree.
///
/// Colors go through `colors`. `transform` is the cumulative transform to output points, used to
/// pick the density bitmap fills are decoded at.
pub struct StyleConverter<'a> {
    /// Effective color transform.
    pub colors: &'a CompositeColorTransform,
    /// Characters of the movie, for bitmap fills.
    pub dictionary: &'a Dictionary<'a>,
    /// Decoder of bitmap fills.
    pub images: &'a dyn ImageDecoder,
    /// Conversion settings.
    pub config: &'a ConvertConfig,
    /// Shape space to output points.
    pub transform: Affine,
    /// Shape being converted.
    pub locator: &'a Locator,
}

impl StyleConverter<'_> {
    fn gradient(&self, def: &GradientDef, kind: &str) -> ConvertResult<FillStyle> {
        if def.spread != SpreadMode::Pad {
            return Err(ConvertError::unsupported(
                self.locator,
                format!("{kind} gradient spread mode {:?}", def.spread),
            ));
        }
        if def.interpolation != InterpolationMode::Normal {
            return Err(ConvertError::unsupported(
                self.locator,
                format!("{kind} gradient interpolation mode {:?}", def.interpolation),
            ));
        }
        let stops = def
            .stops
            .iter()
            .map(|s| GradientStop {
                color: self.colors.apply(s.color),
                ratio: f64::from(s.ratio) / GRADIENT_MAX_RATIO,
            })
            .collect();
        Ok(FillStyle::Gradient {
            stops,
            transform: def.matrix.to_affine(),
        })
    }

    fn bitmap(&self, def: &BitmapFillDef) -> ConvertResult<FillStyle> {
        if !def.clipped || def.smoothed {
            return Err(ConvertError::unsupported(
                self.locator,
                "bitmap fill must be clipped and non-smoothed",
            ));
        }
        let image = self.dictionary.image(def.image_id).ok_or_else(|| {
            ConvertError::resource(self.locator, format!("invalid image ID {}", def.image_id))
        })?;

        let transform = self.config.bitmap_matrix_transform()
            * def.matrix.to_affine()
            * Affine::scale_non_uniform(f64::from(image.width), f64::from(image.height));
        let density = image_density(image.width, image.height, self.transform * transform);
        let data = self
            .images
            .decode(image, self.colors, density, self.locator)?;

        Ok(FillStyle::Image {
            id: image.id,
            transform,
            image: data,
            clip: !self.config.disable_clipping,
        })
    }
}

/// Pixels per inch an image of `width` x `height` pixels is drawn at under `total`, which maps the
/// unit square to output points. The smaller of both axes wins.
pub(crate) fn image_density(width: u32, height: u32, total: Affine) -> f64 {
    let [a, b, c, d, _, _] = total.as_coeffs();
    let width_in = a.hypot(b) / POINTS_PER_INCH;
    let height_in = c.hypot(d) / POINTS_PER_INCH;
    (f64::from(width) / width_in).min(f64::from(height) / height_in)
}

impl StyleResolver for StyleConverter<'_> {
    fn fill(&mut self, def: &FillStyleDef) -> ConvertResult<FillStyle> {
        match def {
            FillStyleDef::Solid { color } => Ok(FillStyle::Solid(self.colors.apply(*color))),
            FillStyleDef::LinearGradient(g) => self.gradient(g, "linear"),
            FillStyleDef::RadialGradient(g) => self.gradient(g, "radial"),
            FillStyleDef::FocalGradient(_) => Err(ConvertError::unsupported(
                self.locator,
                "focal gradient fill",
            )),
            FillStyleDef::Bitmap(b) => self.bitmap(b),
        }
    }

    fn line(&mut self, def: &LineStyleDef) -> ConvertResult<LineStyle> {
        if def.fill.is_some() {
            return Err(ConvertError::unsupported(self.locator, "line fill style"));
        }
        if def.start_cap != def.end_cap {
            return Err(ConvertError::unsupported(
                self.locator,
                "different start and end caps on line style",
            ));
        }
        Ok(LineStyle {
            color: self.colors.apply(def.color),
            width: f64::from(def.width),
            cap: def.start_cap.unwrap_or(LineCap::Butt),
            join: def.join.unwrap_or(LineJoin::Bevel),
            miter_limit: def.miter_limit,
        })
    }
}
