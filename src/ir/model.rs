use std::sync::Arc;

use crate::font::model::Font;
use crate::foundation::core::{
    Affine, Color, Rect, TWIPS_PER_POINT, YAxisDirection,
};
use crate::ir::path::Path;

/// Blend mode of a [`GroupKind::Blend`] group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source over.
    #[default]
    Normal,
    /// Isolated layer, composited normally.
    Layer,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Lighten.
    Lighten,
    /// Darken.
    Darken,
    /// Difference.
    Difference,
    /// Additive.
    Add,
    /// Subtractive.
    Subtract,
    /// Invert the backdrop.
    Invert,
    /// Erase the backdrop using source alpha.
    Erase,
    /// Overlay.
    Overlay,
    /// Hard light.
    HardLight,
}

/// What a [`GroupObject`] does to its children.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Transparent container.
    Simple,
    /// Children are drawn under an affine transform.
    Transform(Affine),
    /// Children are composited with a blend mode.
    Blend(BlendMode),
    /// Children are restricted to the union of these outlines.
    Clip(Vec<Path>),
    /// Last child is an alpha mask over the preceding children, within these bounds.
    Masked(Rect),
}

/// Container node of the IR tree.
///
/// Children are in paint order (back to front). A finished tree never holds an empty group.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GroupObject {
    /// Source character id (diagnostics only).
    pub id: u16,
    /// Group behavior.
    pub kind: GroupKind,
    /// Children in paint order.
    pub objects: Vec<FrameObject>,
}

impl GroupObject {
    /// Empty group.
    pub fn new(id: u16, kind: GroupKind) -> Self {
        Self {
            id,
            kind,
            objects: Vec::new(),
        }
    }

    /// `true` when the group has no children.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The mask object of a [`GroupKind::Masked`] group.
    pub fn mask(&self) -> Option<&FrameObject> {
        match self.kind {
            GroupKind::Masked(_) => self.objects.last(),
            _ => None,
        }
    }
}

/// Shape made of styled paths.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShapeObject {
    /// Source character id.
    pub id: u16,
    /// Paths in paint order.
    pub paths: Vec<Path>,
}

/// A run of glyphs sharing font, size and color.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextObject {
    /// Source character id.
    pub id: u16,
    /// Baseline origin x, in text space.
    pub x: f64,
    /// Baseline origin y, in text space.
    pub y: f64,
    /// Font size in text space units.
    pub font_size: f64,
    /// Fill color, after the color transform.
    pub color: Color,
    /// Font the glyph indices refer to.
    #[serde(serialize_with = "serialize_font_name")]
    pub font: Arc<Font>,
    /// Characters of the run (one per glyph).
    pub text: String,
    /// Indices into the font glyph table (one per character).
    pub glyph_indices: Vec<u16>,
    /// Per-glyph advance corrections, in em square units. Empty when all are zero.
    pub glyph_offsets: Vec<f64>,
}

fn serialize_font_name<S: serde::Serializer>(font: &Arc<Font>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&font.name)
}

/// Node of the IR tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameObject {
    /// Group node.
    Group(GroupObject),
    /// Shape leaf.
    Shape(ShapeObject),
    /// Text leaf.
    Text(TextObject),
}

impl FrameObject {
    /// Source character id.
    pub fn id(&self) -> u16 {
        match self {
            Self::Group(g) => g.id,
            Self::Shape(s) => s.id,
            Self::Text(t) => t.id,
        }
    }
}

/// Root of one converted frame.
///
/// `group` is always a [`GroupKind::Transform`] mapping movie twips to output points, with the
/// frame padding applied and the y axis flipped when it points up.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameRoot {
    /// Frame width in twips, padding excluded.
    pub width: f64,
    /// Frame height in twips, padding excluded.
    pub height: f64,
    /// Padding on each side, in twips.
    pub padding: f64,
    /// Root transform group.
    pub group: GroupObject,
}

impl FrameRoot {
    /// Empty root for a frame of the given size (all values in twips).
    pub fn new(width: f64, height: f64, padding: f64, y_axis: YAxisDirection) -> Self {
        Self {
            width,
            height,
            padding,
            group: GroupObject::new(0, GroupKind::Transform(root_transform(height, padding, y_axis))),
        }
    }

    /// Output width in points, padding included.
    pub fn actual_width(&self) -> f64 {
        (self.width + 2.0 * self.padding) / TWIPS_PER_POINT
    }

    /// Output height in points, padding included.
    pub fn actual_height(&self) -> f64 {
        (self.height + 2.0 * self.padding) / TWIPS_PER_POINT
    }

    /// Twips-to-points transform of the root group.
    pub fn transform(&self) -> Affine {
        match self.group.kind {
            GroupKind::Transform(t) => t,
            _ => Affine::IDENTITY,
        }
    }
}

fn root_transform(height: f64, padding: f64, y_axis: YAxisDirection) -> Affine {
    let scale = 1.0 / TWIPS_PER_POINT;
    let (scale_y, offset_y) = match y_axis {
        YAxisDirection::Up => (-scale, height + padding),
        YAxisDirection::Down => (scale, padding),
    };
    Affine::new([scale, 0.0, 0.0, scale_y, padding * scale, offset_y * scale])
}
