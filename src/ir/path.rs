use std::sync::Arc;

use crate::bitmap::decoder::ImageData;
use crate::foundation::core::{Affine, Color, Point, Rect};

/// One drawing command of a [`Path`], in output coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathElement {
    /// Start a new subpath.
    MoveTo(Point),
    /// Straight segment to a point.
    LineTo(Point),
    /// Quadratic segment: control point, end point.
    QuadTo(Point, Point),
    /// Cubic segment: two control points, end point.
    CubicTo(Point, Point, Point),
    /// Close the current subpath.
    ClosePath,
    /// Whole axis-aligned rectangle subpath.
    Rectangle(Rect),
}

/// Paint of a filled path.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStyle {
    /// Uniform color.
    Solid(Color),
    /// Gradient with stops ordered by ratio.
    Gradient {
        /// Color stops, first ratio 0 and last ratio 1.
        stops: Vec<GradientStop>,
        /// Gradient square to shape space.
        transform: Affine,
    },
    /// Bitmap fill.
    Image {
        /// Character id of the image definition.
        id: u16,
        /// Unit square to shape space.
        transform: Affine,
        /// Decoded image handle.
        image: Arc<ImageData>,
        /// Clip the image to the path outline.
        clip: bool,
    },
}

/// A gradient color stop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GradientStop {
    /// Stop color, after the color transform.
    pub color: Color,
    /// Position in `[0, 1]`.
    pub ratio: f64,
}

/// Stroke end cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    /// Flat cap ending at the endpoint.
    #[default]
    Butt,
    /// Half-disc cap.
    Round,
    /// Flat cap extended by half the width.
    Square,
}

/// Stroke corner join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    /// Cut corner.
    #[default]
    Bevel,
    /// Rounded corner.
    Round,
    /// Sharp corner, limited by the miter limit.
    Miter,
}

/// Stroke parameters of a path.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LineStyle {
    /// Stroke color, after the color transform.
    pub color: Color,
    /// Stroke width in shape units.
    pub width: f64,
    /// End cap.
    pub cap: LineCap,
    /// Corner join.
    pub join: LineJoin,
    /// Only meaningful with [`LineJoin::Miter`].
    pub miter_limit: f64,
}

/// Geometry plus optional paint.
///
/// Styled paths always have a fill or a line style. Clip and glyph paths carry neither.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct Path {
    /// Drawing commands.
    pub elements: Vec<PathElement>,
    /// Fill paint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillStyle>,
    /// Stroke.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
}

impl Path {
    /// Path with geometry only.
    pub fn outline(elements: Vec<PathElement>) -> Self {
        Self {
            elements,
            fill: None,
            line: None,
        }
    }
}
