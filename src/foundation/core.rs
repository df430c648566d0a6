pub use kurbo::{Affine, Point, Rect, Vec2};

/// Twips in one point. Movie coordinates are expressed in twips.
pub const TWIPS_PER_POINT: f64 = 20.0;
/// Twips in one inch.
pub const TWIPS_PER_INCH: f64 = 1440.0;
/// Points in one inch.
pub const POINTS_PER_INCH: f64 = 72.0;
/// Size of the glyph em square used by IR fonts.
pub const EM_SQUARE_SIZE: f64 = 1024.0;
/// Advance width given to folded whitespace glyphs, in em square units.
pub const WHITESPACE_ADVANCE_WIDTH: f64 = 256.0;

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    /// Opaque black, the fallback fill of glyph outlines.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque green, the default debug outline color.
    pub const GREEN: Self = Self::rgb(0, 255, 0);

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Inverse of [`Color::to_array`].
    pub fn from_array(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

/// Direction of the output y axis.
///
/// Movies are y-down. With `Up`, the scene root flips the y axis and text transforms are
/// flipped back so glyphs stay upright.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxisDirection {
    /// Output y grows upwards (PDF convention).
    #[default]
    Up,
    /// Output y grows downwards (SVG convention).
    Down,
}

impl YAxisDirection {
    /// Sign applied to y components when going from movie space to output space.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Up => -1.0,
            Self::Down => 1.0,
        }
    }
}

pub(crate) fn is_identity(a: Affine) -> bool {
    a == Affine::IDENTITY
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
