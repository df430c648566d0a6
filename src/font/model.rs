use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::core::{Point, WHITESPACE_ADVANCE_WIDTH};
use crate::foundation::math::StableHasher;
use crate::ir::path::{Path, PathElement};

/// Identifies a font across a movie collection: movie index plus font character id.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FontId {
    /// Index of the movie in the batch.
    pub file_index: usize,
    /// Font character id within the movie.
    pub font_id: u16,
}

/// Scale convention of a font tag version.
///
/// `scale_*` maps glyph outlines to em square units. `unscale_*` maps text space advances and
/// offsets back to text units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontScale {
    /// Horizontal outline scale.
    pub scale_x: f64,
    /// Vertical outline scale.
    pub scale_y: f64,
    /// Horizontal text unscale.
    pub unscale_x: f64,
    /// Vertical text unscale.
    pub unscale_y: f64,
}

impl FontScale {
    /// Build a scale from its four components.
    pub const fn new(scale_x: f64, scale_y: f64, unscale_x: f64, unscale_y: f64) -> Self {
        Self {
            scale_x,
            scale_y,
            unscale_x,
            unscale_y,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.scale_x, self.scale_y, self.unscale_x, self.unscale_y]
            .iter()
            .all(|v| v.is_finite() && *v != 0.0)
    }
}

/// Vertical metrics of a font.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FontMetrics {
    /// Ascent in em square units.
    pub ascent: f64,
    /// Descent in em square units.
    pub descent: f64,
    /// Scale convention the font was defined with.
    pub scale: FontScale,
}

/// Outline and advance of a glyph, in em square units.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphData {
    /// Default advance width.
    pub advance_width: f64,
    /// Closed contours, one `MoveTo` each.
    pub contours: Vec<Path>,
}

impl GlyphData {
    /// Blank glyph all whitespace collapses to.
    pub fn whitespace() -> Self {
        Self {
            advance_width: WHITESPACE_ADVANCE_WIDTH,
            contours: Vec::new(),
        }
    }

    /// A glyph without contours draws nothing.
    pub fn is_whitespace(&self) -> bool {
        self.contours.is_empty()
    }

    /// Content key: equal glyph data always yields equal keys.
    pub fn key(&self) -> u64 {
        let mut h = StableHasher::new();
        h.write_f64(self.advance_width);
        h.write_u32(self.contours.len() as u32);
        for c in &self.contours {
            h.write_u32(c.elements.len() as u32);
            for el in &c.elements {
                write_element(&mut h, el);
            }
        }
        h.finish()
    }
}

fn write_point(h: &mut StableHasher, p: Point) {
    h.write_f64(p.x);
    h.write_f64(p.y);
}

fn write_element(h: &mut StableHasher, el: &PathElement) {
    match *el {
        PathElement::MoveTo(p) => {
            h.write_u8(0);
            write_point(h, p);
        }
        PathElement::LineTo(p) => {
            h.write_u8(1);
            write_point(h, p);
        }
        PathElement::QuadTo(c, p) => {
            h.write_u8(2);
            write_point(h, c);
            write_point(h, p);
        }
        PathElement::CubicTo(c1, c2, p) => {
            h.write_u8(3);
            write_point(h, c1);
            write_point(h, c2);
            write_point(h, p);
        }
        PathElement::ClosePath => h.write_u8(4),
        PathElement::Rectangle(r) => {
            h.write_u8(5);
            for v in [r.x0, r.y0, r.x1, r.y1] {
                h.write_f64(v);
            }
        }
    }
}

/// Glyph table entry: assigned character plus glyph data.
#[derive(Clone, Debug, PartialEq)]
pub struct FontGlyph {
    /// Character the glyph is mapped to in the emitted font.
    pub ch: char,
    /// Outline and advance.
    pub data: GlyphData,
}

impl FontGlyph {
    /// See [`GlyphData::is_whitespace`].
    pub fn is_whitespace(&self) -> bool {
        self.data.is_whitespace()
    }
}

/// Physical font resource shared by every font of a merged group.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FontFile {
    /// Unique group name.
    pub name: String,
    /// Location of the written artifact, if the writer produced one on disk.
    pub path: Option<PathBuf>,
    /// Glyphs in the artifact.
    pub glyph_count: usize,
}

/// A font as defined by one movie.
///
/// Glyph indices are the ones of the source font, so text runs can keep referring to them after
/// merging. `name` and `file` are assigned when the font's group is ungrouped.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Source address.
    pub id: FontId,
    /// Declared name until ungrouping, unique group name afterwards.
    pub name: String,
    /// Vertical metrics.
    pub metrics: FontMetrics,
    /// Glyphs in source order.
    pub glyphs: Vec<FontGlyph>,
    /// Shared physical resource, set by ungrouping.
    pub file: Option<Arc<FontFile>>,
}

/// Ungrouped fonts by source address, shared read-only by every scene builder.
pub type FontMap = HashMap<FontId, Arc<Font>>;
