use crate::font::model::FontScale;
use crate::foundation::core::{Affine, Color, TWIPS_PER_INCH, YAxisDirection};
use crate::foundation::error::{ConvertError, ConvertResult};
use crate::ir::path::{LineCap, LineJoin, LineStyle};

/// Options of a conversion run.
///
/// Every field has a default, so a JSON config only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Direction of the output y axis.
    pub y_axis: YAxisDirection,
    /// Padding added around each frame, in inches.
    pub frame_padding: f64,
    /// Override of the frame size `[width, height]`, in inches.
    pub frame_size: Option<[f64; 2]>,
    /// Drop clip groups (clipped content is drawn unclipped).
    pub disable_clipping: bool,
    /// Ignore alpha masks (masked content is drawn unmasked, mask shapes are drawn).
    pub disable_masking: bool,
    /// Draw the declared bounds of every shape as an outline.
    pub draw_shape_bounds: bool,
    /// Draw the declared bounds of every text block as an outline.
    pub draw_text_bounds: bool,
    /// Stroke width of debug outlines, in twips.
    pub debug_line_width: f64,
    /// Stroke color of debug outlines.
    pub debug_line_color: Color,
    /// Merge compatible fonts.
    pub group_fonts: bool,
    /// Glyph advance corrections under this magnitude (em square units) are dropped.
    pub ignore_glyph_offsets_threshold: f64,
    /// Scale convention of version 2 fonts.
    pub font_scale2: FontScale,
    /// Scale convention of version 3 fonts.
    pub font_scale3: FontScale,
    /// Extra transform applied to bitmap fill matrices, `[a, b, c, d, e, f]`.
    pub bitmap_matrix_offset: [f64; 6],
    /// Lift every frame of sprites to the parent timeline instead of using only the first one.
    pub recursive_frames: bool,
    /// Emit axis-aligned rectangular subpaths as rectangle elements.
    pub allow_rectangles: bool,
    /// Upper bound of decoded image density, in pixels per inch.
    pub max_image_density: Option<f64>,
    /// Convert movies on a thread pool.
    pub parallel: bool,
    /// Worker threads of the pool. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            y_axis: YAxisDirection::Up,
            frame_padding: 0.0,
            frame_size: None,
            disable_clipping: false,
            disable_masking: false,
            draw_shape_bounds: false,
            draw_text_bounds: false,
            debug_line_width: 20.0,
            debug_line_color: Color::GREEN,
            group_fonts: true,
            ignore_glyph_offsets_threshold: 32.0,
            font_scale2: FontScale::new(1.0, -1.0, 1.0, 1.0),
            font_scale3: FontScale::new(0.05, -0.05, 1.0, 1.0),
            bitmap_matrix_offset: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            recursive_frames: false,
            allow_rectangles: false,
            max_image_density: None,
            parallel: true,
            threads: None,
        }
    }
}

impl ConvertConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(s: &str) -> ConvertResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| ConvertError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the converter cannot work with.
    pub fn validate(&self) -> ConvertResult<()> {
        if !self.frame_padding.is_finite() || self.frame_padding < 0.0 {
            return Err(ConvertError::config("frame_padding must be finite and >= 0"));
        }
        if let Some([w, h]) = self.frame_size
            && (!w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0)
        {
            return Err(ConvertError::config("frame_size must be finite and > 0"));
        }
        if !self.debug_line_width.is_finite() || self.debug_line_width <= 0.0 {
            return Err(ConvertError::config("debug_line_width must be finite and > 0"));
        }
        if !self.ignore_glyph_offsets_threshold.is_finite()
            || self.ignore_glyph_offsets_threshold < 0.0
        {
            return Err(ConvertError::config(
                "ignore_glyph_offsets_threshold must be finite and >= 0",
            ));
        }
        for (name, scale) in [("font_scale2", self.font_scale2), ("font_scale3", self.font_scale3)] {
            if !scale.is_valid() {
                return Err(ConvertError::config(format!(
                    "{name} components must be finite and non-zero"
                )));
            }
        }
        if self.bitmap_matrix_offset.iter().any(|v| !v.is_finite()) {
            return Err(ConvertError::config("bitmap_matrix_offset must be finite"));
        }
        if let Some(d) = self.max_image_density
            && (!d.is_finite() || d <= 0.0)
        {
            return Err(ConvertError::config("max_image_density must be finite and > 0"));
        }
        if self.threads == Some(0) {
            return Err(ConvertError::config("threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// Frame padding in twips.
    pub fn frame_padding_twips(&self) -> f64 {
        self.frame_padding * TWIPS_PER_INCH
    }

    /// Frame size override in twips, rounded to whole twips.
    pub fn frame_size_twips(&self) -> Option<(i32, i32)> {
        self.frame_size.map(|[w, h]| {
            (
                (w * TWIPS_PER_INCH).round() as i32,
                (h * TWIPS_PER_INCH).round() as i32,
            )
        })
    }

    /// Extra transform of bitmap fills.
    pub fn bitmap_matrix_transform(&self) -> Affine {
        Affine::new(self.bitmap_matrix_offset)
    }

    /// Stroke of debug bound outlines.
    pub fn debug_line_style(&self) -> LineStyle {
        LineStyle {
            color: self.debug_line_color,
            width: self.debug_line_width,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
