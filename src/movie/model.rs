use std::collections::HashMap;

use crate::color::ColorTransform;
use crate::foundation::core::{Affine, Color, Rect};
use crate::ir::model::BlendMode;
use crate::ir::path::{LineCap, LineJoin};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A decoded movie: header plus tags in file order.
///
/// This is the already-validated tag graph produced by an external binary decoder. All
/// coordinates are twips.
pub struct Movie {
    /// Frame size and declared frame count.
    pub header: MovieHeader,
    /// Definition and display-list tags, in file order.
    pub tags: Vec<Tag>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Movie header.
pub struct MovieHeader {
    /// Frame bounds.
    pub frame_size: TwipsRect,
    /// Declared number of frames.
    pub frame_count: u32,
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
/// Integer rectangle in twips.
pub struct TwipsRect {
    /// Left edge.
    pub min_x: i32,
    /// Top edge.
    pub min_y: i32,
    /// Right edge.
    pub max_x: i32,
    /// Bottom edge.
    pub max_y: i32,
}

impl TwipsRect {
    /// Width in twips.
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    /// Height in twips.
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Same rectangle as a float rect.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            f64::from(self.min_x),
            f64::from(self.min_y),
            f64::from(self.max_x),
            f64::from(self.max_y),
        )
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Placement/fill matrix.
///
/// Maps `(x, y)` to `(scale_x * x + rotate_skew1 * y + translate_x,
/// rotate_skew0 * x + scale_y * y + translate_y)`.
pub struct Matrix {
    /// Horizontal scale.
    #[serde(default = "one")]
    pub scale_x: f64,
    /// Vertical scale.
    #[serde(default = "one")]
    pub scale_y: f64,
    /// Skew of y by x.
    #[serde(default)]
    pub rotate_skew0: f64,
    /// Skew of x by y.
    #[serde(default)]
    pub rotate_skew1: f64,
    /// Horizontal translation, twips.
    #[serde(default)]
    pub translate_x: f64,
    /// Vertical translation, twips.
    #[serde(default)]
    pub translate_y: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            rotate_skew0: 0.0,
            rotate_skew1: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl Matrix {
    /// Same mapping as a kurbo affine.
    pub fn to_affine(&self) -> Affine {
        Affine::new([
            self.scale_x,
            self.rotate_skew0,
            self.rotate_skew1,
            self.scale_y,
            self.translate_x,
            self.translate_y,
        ])
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// One tag of a movie or sprite.
pub enum Tag {
    /// Shape character.
    DefineShape(ShapeDef),
    /// Font character.
    DefineFont(FontDef),
    /// Static text character.
    DefineText(TextDef),
    /// Bitmap character.
    DefineImage(ImageDef),
    /// Sprite (sub-movie) character.
    DefineSprite(SpriteDef),
    /// Add a character to the display list.
    PlaceObject(PlaceObject),
    /// Remove a character from the display list.
    RemoveObject(RemoveObject),
    /// End of the current frame.
    ShowFrame,
}

impl Tag {
    /// Character id of definition tags.
    pub fn character_id(&self) -> Option<u16> {
        match self {
            Self::DefineShape(d) => Some(d.id),
            Self::DefineFont(d) => Some(d.id),
            Self::DefineText(d) => Some(d.id),
            Self::DefineImage(d) => Some(d.id),
            Self::DefineSprite(d) => Some(d.id),
            Self::PlaceObject(_) | Self::RemoveObject(_) | Self::ShowFrame => None,
        }
    }

    /// Short tag name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::DefineShape(_) => "shape",
            Self::DefineFont(_) => "font",
            Self::DefineText(_) => "text",
            Self::DefineImage(_) => "image",
            Self::DefineSprite(_) => "sprite",
            Self::PlaceObject(_) => "place",
            Self::RemoveObject(_) => "remove",
            Self::ShowFrame => "show frame",
        }
    }
}

/// Characters of a movie by id.
#[derive(Clone, Debug, Default)]
pub struct Dictionary<'a> {
    chars: HashMap<u16, &'a Tag>,
}

impl<'a> Dictionary<'a> {
    /// Index the definition tags of `movie`. Later definitions win on duplicate ids.
    pub fn new(movie: &'a Movie) -> Self {
        let chars = movie
            .tags
            .iter()
            .filter_map(|t| t.character_id().map(|id| (id, t)))
            .collect();
        Self { chars }
    }

    /// Definition tag of `id`.
    pub fn get(&self, id: u16) -> Option<&'a Tag> {
        self.chars.get(&id).copied()
    }

    /// Image definition of `id`.
    pub fn image(&self, id: u16) -> Option<&'a ImageDef> {
        match self.get(id)? {
            Tag::DefineImage(img) => Some(img),
            _ => None,
        }
    }

    /// Sprite definition of `id`.
    pub fn sprite(&self, id: u16) -> Option<&'a SpriteDef> {
        match self.get(id)? {
            Tag::DefineSprite(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Shape definition.
pub struct ShapeDef {
    /// Character id.
    pub id: u16,
    /// Declared bounds.
    pub bounds: TwipsRect,
    /// Initial fill style table (indices start at 1).
    #[serde(default)]
    pub fill_styles: Vec<FillStyleDef>,
    /// Initial line style table (indices start at 1).
    #[serde(default)]
    pub line_styles: Vec<LineStyleDef>,
    /// Edge and style-change records.
    pub records: Vec<ShapeRecord>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
/// One record of a shape outline.
pub enum ShapeRecord {
    /// Style and/or pen position change.
    StyleChange(StyleChange),
    /// Straight edge relative to the pen.
    Line {
        /// Horizontal delta.
        dx: i32,
        /// Vertical delta.
        dy: i32,
    },
    /// Quadratic edge: control point relative to the pen, anchor relative to the control point.
    Curve {
        /// Control point x delta.
        control_dx: i32,
        /// Control point y delta.
        control_dy: i32,
        /// Anchor x delta from the control point.
        anchor_dx: i32,
        /// Anchor y delta from the control point.
        anchor_dy: i32,
    },
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Style-change record. `None` fields keep their current value.
pub struct StyleChange {
    /// Absolute pen move.
    pub move_to: Option<(i32, i32)>,
    /// Fill style on the left of the edge direction (0 = none).
    pub fill_style0: Option<u32>,
    /// Fill style on the right of the edge direction (0 = none).
    pub fill_style1: Option<u32>,
    /// Line style (0 = none).
    pub line_style: Option<u32>,
    /// Fill styles appended to the table.
    pub new_fill_styles: Vec<FillStyleDef>,
    /// Line styles appended to the table.
    pub new_line_styles: Vec<LineStyleDef>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
/// Fill style table entry.
pub enum FillStyleDef {
    /// Uniform color.
    Solid {
        /// Fill color.
        color: Color,
    },
    /// Linear gradient.
    LinearGradient(GradientDef),
    /// Radial gradient.
    RadialGradient(GradientDef),
    /// Radial gradient with a moved focal point.
    FocalGradient(GradientDef),
    /// Bitmap fill.
    Bitmap(BitmapFillDef),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Gradient parameters.
pub struct GradientDef {
    /// Gradient square to shape space.
    #[serde(default)]
    pub matrix: Matrix,
    /// Color stops.
    pub stops: Vec<GradientStopDef>,
    /// Behavior outside the gradient square.
    #[serde(default)]
    pub spread: SpreadMode,
    /// Color space of interpolation.
    #[serde(default)]
    pub interpolation: InterpolationMode,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Gradient stop.
pub struct GradientStopDef {
    /// Position, 0..=255.
    pub ratio: u8,
    /// Stop color.
    pub color: Color,
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Gradient spread.
pub enum SpreadMode {
    /// Extend the end colors.
    #[default]
    Pad,
    /// Mirror the gradient.
    Reflect,
    /// Repeat the gradient.
    Repeat,
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Gradient interpolation.
pub enum InterpolationMode {
    /// sRGB interpolation.
    #[default]
    Normal,
    /// Linear RGB interpolation.
    Linear,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Bitmap fill parameters.
pub struct BitmapFillDef {
    /// Image character id.
    pub image_id: u16,
    /// Image pixel space to shape space (twips per pixel).
    #[serde(default)]
    pub matrix: Matrix,
    /// Clipped (not repeated) fill.
    #[serde(default = "yes")]
    pub clipped: bool,
    /// Smoothed sampling.
    #[serde(default)]
    pub smoothed: bool,
}

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Line style table entry.
pub struct LineStyleDef {
    /// Stroke width in twips.
    pub width: u16,
    /// Stroke color.
    pub color: Color,
    /// Cap at the start of the stroke.
    #[serde(default)]
    pub start_cap: Option<LineCap>,
    /// Cap at the end of the stroke.
    #[serde(default)]
    pub end_cap: Option<LineCap>,
    /// Corner join.
    #[serde(default)]
    pub join: Option<LineJoin>,
    /// Miter limit factor.
    #[serde(default = "default_miter_limit")]
    pub miter_limit: f64,
    /// Fill used to paint the stroke instead of `color`.
    #[serde(default)]
    pub fill: Option<FillStyleDef>,
}

fn default_miter_limit() -> f64 {
    3.0
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Font definition with glyph outlines.
pub struct FontDef {
    /// Character id.
    pub id: u16,
    /// Declared font name.
    #[serde(default)]
    pub name: String,
    /// Font tag version (1 to 4).
    pub version: u8,
    /// Ascent in font units.
    #[serde(default)]
    pub ascent: f64,
    /// Descent in font units.
    #[serde(default)]
    pub descent: f64,
    /// Character code of each glyph.
    pub codes: Vec<u16>,
    /// Advance of each glyph. Empty when the font has no layout.
    #[serde(default)]
    pub advances: Vec<f64>,
    /// Outline records of each glyph.
    pub glyphs: Vec<Vec<ShapeRecord>>,
    /// Kerning pairs.
    #[serde(default)]
    pub kernings: Vec<KerningRecord>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Kerning pair.
pub struct KerningRecord {
    /// Left character code.
    pub left: u16,
    /// Right character code.
    pub right: u16,
    /// Advance adjustment.
    pub adjustment: i16,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Static text definition.
pub struct TextDef {
    /// Character id.
    pub id: u16,
    /// Declared bounds.
    pub bounds: TwipsRect,
    /// Text space to character space.
    #[serde(default)]
    pub matrix: Matrix,
    /// Styled runs.
    pub spans: Vec<TextSpanDef>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Styled run. Unset style fields inherit from the previous span.
pub struct TextSpanDef {
    /// Font character id.
    pub font_id: Option<u16>,
    /// Font size in twips.
    pub height: Option<f64>,
    /// Text color.
    pub color: Option<Color>,
    /// Absolute x position, replaces the running x.
    pub offset_x: Option<f64>,
    /// Absolute y position, replaces the running y.
    pub offset_y: Option<f64>,
    /// Glyphs of the run.
    pub glyphs: Vec<GlyphEntry>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// One glyph of a text run.
pub struct GlyphEntry {
    /// Index into the font glyph table.
    pub index: u16,
    /// Advance to the next glyph, in twips.
    pub advance: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Bitmap definition.
pub struct ImageDef {
    /// Character id.
    pub id: u16,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoding of `data`.
    pub format: ImageFormat,
    /// Encoded bytes, or raw straight RGBA8 for [`ImageFormat::Rgba`].
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Bitmap encoding.
pub enum ImageFormat {
    /// JPEG stream.
    Jpeg,
    /// PNG stream.
    Png,
    /// Raw straight RGBA8 rows.
    Rgba,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Sprite definition: a nested timeline.
pub struct SpriteDef {
    /// Character id.
    pub id: u16,
    /// Declared frame count.
    #[serde(default)]
    pub frame_count: u32,
    /// Display-list tags of the sprite.
    pub tags: Vec<Tag>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(default)]
/// Place tag.
pub struct PlaceObject {
    /// Display list depth.
    pub depth: u16,
    /// Character to place.
    pub id: Option<u16>,
    /// New character or modification of an existing one.
    pub mode: PlaceMode,
    /// Placement transform.
    pub matrix: Option<Matrix>,
    /// Color transform of the placed character.
    pub color_transform: Option<ColorTransform>,
    /// Morph ratio (motion tweens).
    pub ratio: Option<u16>,
    /// Last depth clipped by this character, making it a clip shape.
    pub clip_depth: Option<u16>,
    /// Blend mode.
    pub blend_mode: Option<BlendModeDef>,
    /// Filters.
    pub filters: Vec<FilterDef>,
    /// Instance name.
    pub name: Option<String>,
}

impl PlaceObject {
    /// Placement transform, identity when absent.
    pub fn transform(&self) -> Affine {
        self.matrix.map(|m| m.to_affine()).unwrap_or(Affine::IDENTITY)
    }
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// How a place tag interacts with the display list.
pub enum PlaceMode {
    /// Place a new character at an empty depth.
    #[default]
    New,
    /// Modify the character at the depth.
    Modify,
    /// Replace the character at the depth.
    Replace,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Blend mode of a placement.
pub enum BlendModeDef {
    /// Normal.
    Normal,
    /// Layer.
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
    /// Add.
    Add,
    /// Subtract.
    Subtract,
    /// Invert.
    Invert,
    /// The placement is an alpha mask over content below it.
    Alpha,
    /// Erase.
    Erase,
    /// Overlay.
    Overlay,
    /// Hard light.
    HardLight,
}

impl BlendModeDef {
    /// IR blend mode, or `None` for [`BlendModeDef::Alpha`] which becomes a mask instead.
    pub fn to_blend_mode(self) -> Option<BlendMode> {
        Some(match self {
            Self::Normal => BlendMode::Normal,
            Self::Layer => BlendMode::Layer,
            Self::Multiply => BlendMode::Multiply,
            Self::Screen => BlendMode::Screen,
            Self::Lighten => BlendMode::Lighten,
            Self::Darken => BlendMode::Darken,
            Self::Difference => BlendMode::Difference,
            Self::Add => BlendMode::Add,
            Self::Subtract => BlendMode::Subtract,
            Self::Invert => BlendMode::Invert,
            Self::Alpha => return None,
            Self::Erase => BlendMode::Erase,
            Self::Overlay => BlendMode::Overlay,
            Self::HardLight => BlendMode::HardLight,
        })
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
/// Placement filter.
pub enum FilterDef {
    /// 4x5 color matrix, row major.
    ColorMatrix {
        /// Matrix coefficients.
        matrix: Vec<f32>,
    },
    /// Drop shadow.
    DropShadow,
    /// Blur.
    Blur,
    /// Glow.
    Glow,
    /// Bevel.
    Bevel,
    /// Gradient glow.
    GradientGlow,
    /// Convolution.
    Convolution,
    /// Gradient bevel.
    GradientBevel,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
/// Remove tag.
pub struct RemoveObject {
    /// Depth to clear.
    pub depth: u16,
    /// Expected character id at that depth, when the tag carries one.
    #[serde(default)]
    pub id: Option<u16>,
}
